//! User-facing knobs for a worker pool.

use std::path::PathBuf;

use crate::core::quantity::ByteSize;
use crate::jobqueue::errors::JobQueueError;

/// Worker limit used when neither `maximum` nor `max_workers` is given.
pub const DEFAULT_MAX_WORKERS: u32 = 50;

/// Memory per worker used when none is given.
pub const DEFAULT_MEMORY: &str = "2 GB";

/// Disk per worker used when none is given.
pub const DEFAULT_DISK: &str = "1 GB";

/// Options for a facility worker pool.
#[derive(Debug, Clone)]
pub struct CondorClientOptions {
    /// Proxy to ship to workers; discovered with `voms-proxy-info` when unset
    pub x509_path: Option<PathBuf>,

    /// Image reference for the `container_image` directive; discovered when unset
    pub container_image: Option<String>,

    /// Upper bound on worker jobs
    pub maximum: Option<u32>,

    /// Synonym for `maximum`
    pub max_workers: Option<u32>,

    /// Memory per worker
    pub memory: String,

    /// Disk per worker
    pub disk: String,

    /// HTCondor Requirements expression
    pub requirements: Option<String>,

    /// Ship the local virtual environment's packages to workers
    pub ship_env: bool,

    /// Extra files sent to every worker
    pub transfer_input_files: Vec<String>,

    /// GPUs per worker; zero or unset requests none
    pub request_gpus: Option<u32>,
}

impl Default for CondorClientOptions {
    fn default() -> Self {
        CondorClientOptions {
            x509_path: None,
            container_image: None,
            maximum: None,
            max_workers: None,
            memory: DEFAULT_MEMORY.to_string(),
            disk: DEFAULT_DISK.to_string(),
            requirements: None,
            ship_env: false,
            transfer_input_files: Vec::new(),
            request_gpus: None,
        }
    }
}

impl CondorClientOptions {
    /// The effective worker limit. `maximum` and `max_workers` are synonyms;
    /// setting both is an error.
    pub fn resolve_maximum(&self) -> Result<u32, JobQueueError> {
        match (self.maximum, self.max_workers) {
            (None, None) => Ok(DEFAULT_MAX_WORKERS),
            (Some(maximum), None) => Ok(maximum),
            (None, Some(max_workers)) => Ok(max_workers),
            (Some(maximum), Some(max_workers)) => Err(JobQueueError::ConflictingWorkerLimits {
                maximum,
                max_workers,
            }),
        }
    }

    /// Parsed memory request.
    pub fn memory_size(&self) -> Result<ByteSize, JobQueueError> {
        ByteSize::parse(&self.memory).map_err(|source| JobQueueError::InvalidQuantity {
            field: "memory",
            value: self.memory.clone(),
            source,
        })
    }

    /// Parsed disk request.
    pub fn disk_size(&self) -> Result<ByteSize, JobQueueError> {
        ByteSize::parse(&self.disk).map_err(|source| JobQueueError::InvalidQuantity {
            field: "disk",
            value: self.disk.clone(),
            source,
        })
    }

    /// GPUs to request, if any.
    pub fn gpus(&self) -> Option<u32> {
        self.request_gpus.filter(|&n| n >= 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_maximum() {
        let opts = CondorClientOptions::default();
        assert_eq!(opts.resolve_maximum().unwrap(), DEFAULT_MAX_WORKERS);
    }

    #[test]
    fn test_maximum_synonyms() {
        let opts = CondorClientOptions {
            maximum: Some(10),
            ..Default::default()
        };
        assert_eq!(opts.resolve_maximum().unwrap(), 10);

        let opts = CondorClientOptions {
            max_workers: Some(20),
            ..Default::default()
        };
        assert_eq!(opts.resolve_maximum().unwrap(), 20);
    }

    #[test]
    fn test_both_limits_conflict() {
        let opts = CondorClientOptions {
            maximum: Some(10),
            max_workers: Some(10),
            ..Default::default()
        };
        assert!(matches!(
            opts.resolve_maximum(),
            Err(JobQueueError::ConflictingWorkerLimits {
                maximum: 10,
                max_workers: 10
            })
        ));
    }

    #[test]
    fn test_sizes() {
        let opts = CondorClientOptions::default();
        assert_eq!(opts.memory_size().unwrap().bytes(), 2_000_000_000);
        assert_eq!(opts.disk_size().unwrap().bytes(), 1_000_000_000);

        let opts = CondorClientOptions {
            memory: "lots".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            opts.memory_size(),
            Err(JobQueueError::InvalidQuantity { field: "memory", .. })
        ));
    }

    #[test]
    fn test_gpus() {
        let mut opts = CondorClientOptions::default();
        assert_eq!(opts.gpus(), None);
        opts.request_gpus = Some(0);
        assert_eq!(opts.gpus(), None);
        opts.request_gpus = Some(2);
        assert_eq!(opts.gpus(), Some(2));
    }
}
