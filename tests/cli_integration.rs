//! CLI integration tests for cowtools.
//!
//! These tests run the binary against a facility layout rooted in a
//! temporary directory. Nothing is submitted: cluster tests use `--dry-run`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const MC_RESULTS: &str = r#"{
    "/TTto2L2Nu": {"RawEventCount": 1000.0, "met": [10.0, 20.0]},
    "/TTtoLNu2Q": {"RawEventCount": 500.0, "met": [1.0, 1.0]},
    "/DYto2L": {"RawEventCount": 100.0, "met": [1.0, 0.0]}
}"#;

const MC_FILESET: &str = r#"{
    "/TTto2L2Nu": {"files": [], "metadata": {"xsec": 2.0}},
    "/TTtoLNu2Q": {"files": [], "metadata": {"xsec": 1.0}},
    "/DYto2L": {"files": [], "metadata": {"xsec": 0.2, "short_name": "DY"}}
}"#;

const DATA_RESULTS: &str = r#"{
    "/Muon0/Run2023C": {"Luminosity": 300.0, "met": [5.0, 5.0]},
    "/Muon1/Run2023C": {"Luminosity": 200.0, "met": [1.0, 1.0]}
}"#;

/// A fake facility: home, working directory and scratch under one root.
struct Facility {
    root: TempDir,
}

impl Facility {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("home/.cowtools")).unwrap();
        fs::create_dir_all(root.path().join("work")).unwrap();

        let config = format!(
            "[facility]\n\
             scratch_root = \"{}\"\n\
             container_info = \"{}\"\n\
             cvmfs_dirs = [\"{}\"]\n",
            root.path().join("scratch").display(),
            root.path().join("container_info.yml").display(),
            root.path().join("cvmfs").display(),
        );
        fs::write(root.path().join("home/.cowtools/config.toml"), config).unwrap();

        Facility { root }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    fn work(&self) -> PathBuf {
        self.path("work")
    }

    fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    fn cowtools(&self) -> Command {
        let mut cmd = Command::cargo_bin("cowtools").unwrap();
        cmd.current_dir(self.work())
            .env("HOME", self.path("home"))
            .env("USER", "alice")
            .env_remove("VIRTUAL_ENV")
            .env_remove("DASK_SCHEDULER_ADDRESS");
        cmd
    }
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// ============================================================================
// cowtools cluster
// ============================================================================

#[test]
fn test_cluster_dry_run_writes_job_files() {
    let facility = Facility::new();

    facility
        .cowtools()
        .args([
            "cluster",
            "--dry-run",
            "--scheduler",
            "tcp://10.0.0.1:8786",
            "--image",
            "/cvmfs/unpacked.cern.ch/registry.hub.docker.com/coffeateam/coffea-dask:latest",
            "--x509",
            "missing-proxy",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "container_image = /cvmfs/unpacked.cern.ch/registry.hub.docker.com/coffeateam/coffea-dask:latest",
        ))
        .stdout(predicate::str::contains("+JobFlavour = \"tomorrow\""))
        .stdout(predicate::str::contains("queue 1"))
        .stdout(predicate::str::contains("tcp://10.0.0.1:8786"))
        .stdout(predicate::str::contains("transfer_input_files").not())
        .stderr(predicate::str::contains("Could not find voms proxy"));

    let submit = fs::read_to_string(facility.path("scratch/alice/dask-worker.sub")).unwrap();
    assert!(submit.contains("InitialDir = "));
    assert!(facility.path("scratch/alice/dask-worker.sh").is_file());
}

#[test]
fn test_cluster_dry_run_clamps_workers() {
    let facility = Facility::new();

    facility
        .cowtools()
        .args([
            "cluster",
            "--dry-run",
            "--image",
            "docker://coffeateam/coffea-dask:latest",
            "--x509",
            "missing-proxy",
            "--max-workers",
            "3",
            "-n",
            "10",
        ])
        .env("DASK_SCHEDULER_ADDRESS", "tcp://127.0.0.1:8786")
        .assert()
        .success()
        .stdout(predicate::str::contains("queue 3"));
}

#[test]
fn test_cluster_transfers_proxy() {
    let facility = Facility::new();
    let proxy = facility.write("x509up_u1000", "proxy");

    facility
        .cowtools()
        .args([
            "cluster",
            "--dry-run",
            "--scheduler",
            "tcp://10.0.0.1:8786",
            "--image",
            "docker://coffeateam/coffea-dask:latest",
            "--x509",
        ])
        .arg(&proxy)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "transfer_input_files = {}",
            proxy.display()
        )))
        .stdout(predicate::str::contains("should_transfer_files = YES"))
        .stdout(predicate::str::contains("export X509_USER_PROXY=x509up_u1000"));
}

#[test]
fn test_cluster_conflicting_limits() {
    let facility = Facility::new();

    facility
        .cowtools()
        .args([
            "cluster",
            "--dry-run",
            "--scheduler",
            "tcp://10.0.0.1:8786",
            "--image",
            "docker://img",
            "--maximum",
            "5",
            "--max-workers",
            "6",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only one of `maximum` and `max_workers`"));
}

#[test]
fn test_cluster_requires_scheduler() {
    let facility = Facility::new();

    facility
        .cowtools()
        .args(["cluster", "--dry-run", "--image", "docker://img"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--scheduler"));
}

// ============================================================================
// cowtools remove
// ============================================================================

/// Put an executable shell script named `name` in `<root>/bin`.
#[cfg(unix)]
fn fake_tool(facility: &Facility, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = facility.write(&format!("bin/{}", name), &format!("#!/bin/sh\n{}\n", body));
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
fn path_with_bin(facility: &Facility) -> std::ffi::OsString {
    let mut paths = vec![facility.path("bin")];
    if let Some(path) = std::env::var_os("PATH") {
        paths.extend(std::env::split_paths(&path));
    }
    std::env::join_paths(paths).unwrap()
}

#[cfg(unix)]
#[test]
fn test_remove_runs_condor_rm() {
    let facility = Facility::new();
    let log = facility.path("removed");
    fake_tool(
        &facility,
        "condor_rm",
        &format!("echo \"$1 $CONDOR_CONFIG\" >> {}", log.display()),
    );

    facility
        .cowtools()
        .args(["remove", "4242", "4243"])
        .env("PATH", path_with_bin(&facility))
        .assert()
        .success()
        .stderr(predicate::str::contains("Removed cluster 4242"));

    assert_eq!(
        fs::read_to_string(&log).unwrap(),
        "4242 /etc/condor/condor_config\n4243 /etc/condor/condor_config\n"
    );
}

#[cfg(unix)]
#[test]
fn test_remove_reports_failure() {
    let facility = Facility::new();
    fake_tool(&facility, "condor_rm", "exit 1");

    facility
        .cowtools()
        .args(["remove", "4242"])
        .env("PATH", path_with_bin(&facility))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to remove cluster 4242"));
}

#[test]
fn test_remove_requires_cluster() {
    let facility = Facility::new();

    facility
        .cowtools()
        .arg("remove")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<CLUSTER>"));
}

// ============================================================================
// cowtools image
// ============================================================================

#[test]
fn test_image_from_container_info() {
    let facility = Facility::new();
    facility.write(
        "container_info.yml",
        "container_source: docker.io/coffeateam/coffea-base:v2024.1.2\n",
    );

    facility
        .cowtools()
        .arg("image")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "docker://docker.io/coffeateam/coffea-base:v2024.1.2",
        ));
}

#[test]
fn test_image_not_found() {
    let facility = Facility::new();

    facility
        .cowtools()
        .arg("image")
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not automatically find an image"));
}

// ============================================================================
// cowtools combine / scale
// ============================================================================

#[test]
fn test_combine_groups_and_renames() {
    let facility = Facility::new();
    facility.write("work/mc.json", MC_RESULTS);
    facility.write("work/fileset.json", MC_FILESET);

    facility
        .cowtools()
        .args(["combine", "mc.json", "-o", "out/combined.json", "--fileset", "fileset.json"])
        .assert()
        .success();

    let combined = read_json(&facility.path("work/out/combined.json"));
    assert_eq!(combined["ttbar"]["RawEventCount"], 1500.0);
    assert_eq!(combined["ttbar"]["met"], serde_json::json!([11.0, 21.0]));
    assert_eq!(combined["DY"]["RawEventCount"], 100.0);
}

#[test]
fn test_scale_to_data_luminosity() {
    let facility = Facility::new();
    facility.write("work/mc.json", MC_RESULTS);
    facility.write("work/fs_mc.json", MC_FILESET);
    facility.write("work/data.json", DATA_RESULTS);

    facility
        .cowtools()
        .args([
            "scale",
            "--data",
            "data.json",
            "--mc",
            "mc.json",
            "--fs-mc",
            "fs_mc.json",
            "-o",
            "scaled.json",
            "--no-combine",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("0.5 fb^-1"));

    // 500 /pb * 0.2 pb / 100 events
    let scaled = read_json(&facility.path("work/scaled.json"));
    assert_eq!(scaled["/DYto2L"]["met"], serde_json::json!([1.0, 0.0]));
    assert_eq!(scaled["/DYto2L"]["RawEventCount"], 100.0);
}

#[test]
fn test_scale_missing_xsec() {
    let facility = Facility::new();
    facility.write("work/mc.json", MC_RESULTS);
    facility.write(
        "work/fs_mc.json",
        &MC_FILESET.replace(r#""xsec": 0.2, "#, ""),
    );
    facility.write("work/data.json", DATA_RESULTS);

    facility
        .cowtools()
        .args([
            "scale", "--data", "data.json", "--mc", "mc.json", "--fs-mc", "fs_mc.json", "-o",
            "scaled.json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no cross section"));
}

// ============================================================================
// Misc
// ============================================================================

#[test]
fn test_completions_bash() {
    let facility = Facility::new();

    facility
        .cowtools()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cowtools"));
}

#[test]
fn test_help() {
    let facility = Facility::new();

    facility
        .cowtools()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("cluster"))
        .stdout(predicate::str::contains("scale"));
}
