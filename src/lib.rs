//! cowtools - worker pools and result post-processing for an HTCondor
//! analysis facility
//!
//! This crate provides the library behind the `cowtools` binary: turning
//! facility conventions into HTCondor worker jobs for dask, and scaling and
//! combining the analysis results those workers produce.

pub mod core;
pub mod datatools;
pub mod jobqueue;
pub mod ops;
pub mod util;

/// Test utilities and mocks for cowtools unit tests.
#[cfg(test)]
pub mod test_support;

pub use core::{ByteSize, ClusterSpec, SubmitDescription};
pub use jobqueue::{build_cluster_spec, CondorClientOptions, FacilityLayout, JobQueueError};
pub use util::context::GlobalContext;
