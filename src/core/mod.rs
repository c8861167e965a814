//! Core data structures for cowtools.
//!
//! - Byte quantities as written in resource requests
//! - Ordered HTCondor submit descriptions
//! - Worker pool specifications and the job scripts they render

pub mod cluster;
pub mod quantity;
pub mod submit;

pub use cluster::ClusterSpec;
pub use quantity::ByteSize;
pub use submit::SubmitDescription;
