//! Errors raised while combining and scaling analysis results.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error post-processing analysis results.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum DataToolsError {
    #[error("cannot add {left} to {right}")]
    #[diagnostic(code(cowtools::datatools::shape_mismatch))]
    ShapeMismatch { left: String, right: String },

    #[error("results for `{dataset}` cannot be grouped into `{group}`: observable `{observable}` is not in the group")]
    #[diagnostic(
        code(cowtools::datatools::structure_mismatch),
        help("all datasets in a group must have the same set of observables")
    )]
    StructureMismatch {
        group: String,
        dataset: String,
        observable: String,
    },

    #[error("no cross section for dataset `{dataset}`")]
    #[diagnostic(code(cowtools::datatools::missing_xsec))]
    MissingCrossSection { dataset: String },

    #[error("no raw event count for dataset `{dataset}`")]
    #[diagnostic(code(cowtools::datatools::missing_event_count))]
    MissingEventCount { dataset: String },

    #[error("dataset `{dataset}` has a raw event count of zero")]
    #[diagnostic(code(cowtools::datatools::zero_event_count))]
    ZeroEventCount { dataset: String },

    #[error("data results for `{dataset}` have no scalar `Luminosity`")]
    #[diagnostic(code(cowtools::datatools::missing_luminosity))]
    MissingLuminosity { dataset: String },

    #[error("malformed histogram: {reason}")]
    #[diagnostic(code(cowtools::datatools::malformed_histogram))]
    MalformedHistogram { reason: String },

    #[error("dataset `{dataset}` is not in the fileset")]
    #[diagnostic(code(cowtools::datatools::missing_fileset_entry))]
    MissingFilesetEntry { dataset: String },

    #[error("failed to read or write {path}")]
    #[diagnostic(code(cowtools::datatools::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid results JSON")]
    #[diagnostic(code(cowtools::datatools::json))]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl DataToolsError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            DataToolsError::StructureMismatch { .. } => {
                diag.with_suggestion(suggestions::SAME_OBSERVABLES)
            }
            DataToolsError::MissingCrossSection { .. } => {
                diag.with_suggestion(suggestions::ADD_XSEC)
            }
            DataToolsError::MissingEventCount { .. } | DataToolsError::ZeroEventCount { .. } => {
                diag.with_context("the event count is read from the `RawEventCount` observable")
            }
            DataToolsError::MissingLuminosity { .. } => {
                diag.with_context("luminosity is read from each data dataset's `Luminosity` observable")
            }
            DataToolsError::Io { path, source } => {
                diag.with_location(path).with_context(source.to_string())
            }
            DataToolsError::Json { path, source } => {
                diag.with_location(path).with_context(source.to_string())
            }
            DataToolsError::MalformedHistogram { .. } => diag.with_context(
                "a histogram has one more edge than counts, and as many variances as counts",
            ),
            DataToolsError::ShapeMismatch { .. } | DataToolsError::MissingFilesetEntry { .. } => {
                diag
            }
        }
    }
}
