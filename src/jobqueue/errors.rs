//! Errors raised while preparing or submitting worker jobs.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::quantity::QuantityError;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error preparing or submitting an HTCondor worker pool.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum JobQueueError {
    #[error("only one of `maximum` and `max_workers` may be set (got {maximum} and {max_workers})")]
    #[diagnostic(code(cowtools::jobqueue::conflicting_worker_limits))]
    ConflictingWorkerLimits { maximum: u32, max_workers: u32 },

    #[error("the USER environment variable is not set")]
    #[diagnostic(code(cowtools::jobqueue::missing_user))]
    MissingUser,

    #[error("invalid {field} request `{value}`")]
    #[diagnostic(code(cowtools::jobqueue::invalid_quantity))]
    InvalidQuantity {
        field: &'static str,
        value: String,
        #[source]
        source: QuantityError,
    },

    #[error("could not automatically find an image to ship to workers")]
    #[diagnostic(
        code(cowtools::jobqueue::no_image),
        help("pass the worker image explicitly with `--image`")
    )]
    NoImageFound { container_info: PathBuf },

    #[error("{path} is missing expected key 'container_source'")]
    #[diagnostic(code(cowtools::jobqueue::missing_container_source))]
    MissingContainerSource { path: PathBuf },

    #[error("failed to read container metadata {path}")]
    #[diagnostic(code(cowtools::jobqueue::container_info))]
    ContainerInfo { path: PathBuf, reason: String },

    #[error("x509 proxy could not be found")]
    #[diagnostic(
        code(cowtools::jobqueue::proxy_not_found),
        help("try creating it with 'voms-proxy-init'")
    )]
    ProxyNotFound { reason: String },

    #[error("looking for virtual environment at {path}, but none found")]
    #[diagnostic(code(cowtools::jobqueue::env_not_found))]
    EnvNotFound { path: PathBuf },

    #[error("could not read the Python module search path")]
    #[diagnostic(code(cowtools::jobqueue::python_search_path))]
    PythonSearchPath { reason: String },

    #[error("could not parse condor_submit output")]
    #[diagnostic(code(cowtools::jobqueue::submit_output))]
    UnexpectedSubmitOutput { output: String },
}

impl JobQueueError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            JobQueueError::ConflictingWorkerLimits { .. } => {
                diag.with_suggestion(suggestions::ONE_WORKER_LIMIT)
            }
            JobQueueError::MissingUser => diag
                .with_context("the scratch directory is /scratch/$USER")
                .with_suggestion(suggestions::SET_USER),
            JobQueueError::InvalidQuantity { source, .. } => diag
                .with_context(source.to_string())
                .with_suggestion("Use a size such as \"2 GB\" or \"512 MiB\""),
            JobQueueError::NoImageFound { container_info } => diag
                .with_context(format!(
                    "there is no custom notebook.sif in scratch and no metadata file {}",
                    container_info.display()
                ))
                .with_suggestion(suggestions::PASS_IMAGE),
            JobQueueError::MissingContainerSource { path } => diag
                .with_location(path)
                .with_suggestion(suggestions::PASS_IMAGE),
            JobQueueError::ContainerInfo { path, reason } => diag
                .with_location(path)
                .with_context(reason.clone())
                .with_suggestion(suggestions::PASS_IMAGE),
            JobQueueError::ProxyNotFound { reason } => diag
                .with_context(reason.clone())
                .with_suggestion(suggestions::CREATE_PROXY),
            JobQueueError::EnvNotFound { .. } => diag.with_suggestion(suggestions::CREATE_ENV),
            JobQueueError::PythonSearchPath { reason } => diag.with_context(reason.clone()),
            JobQueueError::UnexpectedSubmitOutput { output } => {
                diag.with_context(output.trim().to_string())
            }
        }
    }
}
