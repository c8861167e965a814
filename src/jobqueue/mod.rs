//! HTCondor worker pools on the analysis facility.
//!
//! The facility runs dask workers as HTCondor jobs inside a container. This
//! module decides what those jobs look like:
//! - which image they run in ([`image`])
//! - which credentials and packages travel with them ([`x509`], [`env`])
//! - how many may run at once ([`options`])
//!
//! [`builder::build_cluster_spec`] combines these into a [`ClusterSpec`] and
//! [`condor::CondorCluster`] submits it.
//!
//! [`ClusterSpec`]: crate::core::cluster::ClusterSpec

pub mod builder;
pub mod condor;
pub mod env;
pub mod errors;
pub mod facility;
pub mod image;
pub mod options;
pub mod probe;
pub mod x509;

pub use builder::build_cluster_spec;
pub use condor::CondorCluster;
pub use errors::JobQueueError;
pub use facility::FacilityLayout;
pub use options::CondorClientOptions;
pub use probe::{HostProbe, SystemProbe};
