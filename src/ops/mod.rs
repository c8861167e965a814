//! High-level operations.
//!
//! This module contains the implementation of cowtools commands.

pub mod cluster;
pub mod doctor;
pub mod results;

pub use cluster::{launch, plan_cluster, remove, write_plan, ClusterOptions, ClusterPlan};
pub use doctor::{doctor, format_report, CheckResult, DoctorReport};
pub use results::{combine_file, scale_files, ScaleOptions, ScaleSummary};
