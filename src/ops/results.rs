//! Combining and scaling result files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::datatools::accumulator::ResultSet;
use crate::datatools::combine::combine_rename_results;
use crate::datatools::fileset::{short_names, Fileset};
use crate::datatools::grouping::GroupingMap;
use crate::datatools::io::{load_fileset, load_results, save_results};
use crate::datatools::xsec::XSecScaler;
use crate::util::shell::Shell;

/// Group and rename the datasets of one result file.
///
/// Short names come from `fileset` when given.
pub fn combine_file(
    input: &Path,
    output: &Path,
    grouping: &GroupingMap,
    fileset: Option<&Path>,
) -> Result<ResultSet> {
    let results = load_results(input)?;
    let short = match fileset {
        Some(path) => short_names(&load_fileset(path)?, results.keys()),
        None => BTreeMap::new(),
    };

    let combined = combine_rename_results(&results, grouping, &short)
        .with_context(|| format!("failed to combine {}", input.display()))?;
    save_results(output, &combined)?;

    tracing::debug!(
        "combined {} datasets into {} in {}",
        results.len(),
        combined.len(),
        output.display()
    );
    Ok(combined)
}

/// Inputs and outputs for [`scale_files`].
#[derive(Debug, Clone)]
pub struct ScaleOptions {
    pub data: PathBuf,
    pub mc: PathBuf,
    pub fs_data: Option<PathBuf>,
    pub fs_mc: PathBuf,

    /// Where scaled simulation is written
    pub output_mc: PathBuf,

    /// Where combined data is written, if wanted
    pub output_data: Option<PathBuf>,

    /// Group and rename after scaling
    pub combine: bool,
}

/// What [`scale_files`] produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleSummary {
    /// Integrated luminosity in /pb
    pub lumi: f64,
    pub mc_datasets: usize,
    pub data_datasets: Option<usize>,
}

/// Scale simulated results to the luminosity of the data results.
pub fn scale_files(
    opts: &ScaleOptions,
    grouping_mc: GroupingMap,
    grouping_data: GroupingMap,
    shell: &Shell,
) -> Result<ScaleSummary> {
    let steps = 2 + u64::from(opts.output_data.is_some());
    let mut progress = shell.progress(steps, "Scaling");

    let data = load_results(&opts.data)?;
    let mc = load_results(&opts.mc)?;
    let fs_mc = load_fileset(&opts.fs_mc)?;
    let fs_data = match opts.fs_data {
        Some(ref path) => load_fileset(path)?,
        None => Fileset::new(),
    };
    progress.inc(1);

    let mut scaler = XSecScaler::new(data, mc, fs_data, fs_mc, grouping_mc, grouping_data)
        .with_context(|| format!("failed to read luminosity from {}", opts.data.display()))?;
    let lumi = scaler.lumi();

    let scaled = if opts.combine {
        scaler.scaled_combined_mc()?
    } else {
        scaler.scaled_mc()?
    };
    save_results(&opts.output_mc, scaled)?;
    let mc_datasets = scaled.len();
    progress.inc(1);

    let data_datasets = match opts.output_data {
        Some(ref path) => {
            let combined = scaler.combined_data()?;
            save_results(path, combined)?;
            progress.inc(1);
            Some(combined.len())
        }
        None => None,
    };
    progress.finish();

    Ok(ScaleSummary {
        lumi,
        mc_datasets,
        data_datasets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatools::accumulator::Accumulator;
    use crate::test_support::{
        write_fixture, DATA_FILESET, DATA_RESULTS, MC_FILESET, MC_RESULTS,
    };
    use crate::util::shell::ShellMode;
    use tempfile::TempDir;

    #[test]
    fn test_combine_file() {
        let tmp = TempDir::new().unwrap();
        let input = write_fixture(tmp.path(), "mc.json", MC_RESULTS);
        let fileset = write_fixture(tmp.path(), "fileset.json", MC_FILESET);
        let output = tmp.path().join("out/combined.json.gz");

        let combined =
            combine_file(&input, &output, &GroupingMap::default_mc(), Some(&fileset)).unwrap();

        assert_eq!(combined.keys().collect::<Vec<_>>(), vec!["ttbar", "DY"]);
        assert_eq!(load_results(&output).unwrap(), combined);
    }

    #[test]
    fn test_scale_files() {
        let tmp = TempDir::new().unwrap();
        let opts = ScaleOptions {
            data: write_fixture(tmp.path(), "data.json", DATA_RESULTS),
            mc: write_fixture(tmp.path(), "mc.json", MC_RESULTS),
            fs_data: Some(write_fixture(tmp.path(), "fs_data.json", DATA_FILESET)),
            fs_mc: write_fixture(tmp.path(), "fs_mc.json", MC_FILESET),
            output_mc: tmp.path().join("scaled_mc.json"),
            output_data: Some(tmp.path().join("data_out.json")),
            combine: true,
        };

        let summary = scale_files(
            &opts,
            GroupingMap::default_mc(),
            GroupingMap::new(),
            &Shell::new(ShellMode::Json),
        )
        .unwrap();

        assert_eq!(
            summary,
            ScaleSummary {
                lumi: 500.0,
                mc_datasets: 2,
                data_datasets: Some(2),
            }
        );

        let mc = load_results(&opts.output_mc).unwrap();
        assert_eq!(mc["ttbar"]["met"], Accumulator::Bins(vec![11.0, 21.0]));

        let data = load_results(&tmp.path().join("data_out.json")).unwrap();
        assert!(data.contains_key("Muon0"));
        assert!(data.contains_key("/Muon1/Run2023C"));
    }
}
