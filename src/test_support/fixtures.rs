//! Test fixtures for common test scenarios.

use std::path::Path;

use crate::jobqueue::facility::FacilityLayout;

/// Facility layout rooted in a temporary directory.
///
/// Nothing is created on disk; tests create what they need.
pub fn facility_layout(root: &Path) -> FacilityLayout {
    FacilityLayout {
        user: "alice".to_string(),
        scratch_dir: root.join("scratch/alice"),
        container_info: root.join("container_info.yml"),
        cvmfs_dirs: vec![root.join("cvmfs/unpacked.cern.ch")],
        env_dir: root.join("home/alice/.af-env"),
        condor_config: root.join("condor_config"),
        worker_python: "/usr/local/bin/python3".to_string(),
        job_flavour: "tomorrow".to_string(),
    }
}

/// Simulated results for two ttbar samples and Drell-Yan.
pub const MC_RESULTS: &str = r#"{
    "/TTto2L2Nu": {"RawEventCount": 1000.0, "met": [10.0, 20.0]},
    "/TTtoLNu2Q": {"RawEventCount": 500.0, "met": [1.0, 1.0]},
    "/DYto2L": {"RawEventCount": 100.0, "met": [1.0, 0.0]}
}"#;

/// Fileset matching [`MC_RESULTS`], with both metadata layouts.
pub const MC_FILESET: &str = r#"{
    "/TTto2L2Nu": {"files": [], "metadata": {"xsec": 2.0}},
    "/TTtoLNu2Q": {"files": [], "metadata": {"metadata": {"xsec": 1.0}}},
    "/DYto2L": {"files": [], "metadata": {"xsec": 0.2, "short_name": "DY"}}
}"#;

/// Two muon data eras totalling 500 /pb.
pub const DATA_RESULTS: &str = r#"{
    "/Muon0/Run2023C": {"Luminosity": 300.0, "met": [5.0, 5.0]},
    "/Muon1/Run2023C": {"Luminosity": 200.0, "met": [1.0, 1.0]}
}"#;

/// Fileset matching [`DATA_RESULTS`].
pub const DATA_FILESET: &str = r#"{
    "/Muon0/Run2023C": {"files": [], "metadata": {"short_name": "Muon0"}},
    "/Muon1/Run2023C": {"files": [], "metadata": {}}
}"#;

/// Write `contents` to `dir/name` and return the path.
pub fn write_fixture(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, contents).unwrap();
    path
}
