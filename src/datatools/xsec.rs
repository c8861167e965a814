//! Scaling simulation to the luminosity recorded in data.
//!
//! [`XSecScaler`] ties the pieces together for the common case: data results
//! carry a `Luminosity` observable, simulated results carry `RawEventCount`,
//! and the MC fileset carries cross sections. Units are pb for cross
//! sections and /pb for luminosity.

use std::collections::BTreeMap;

use crate::datatools::accumulator::ResultSet;
use crate::datatools::combine::combine_rename_results;
use crate::datatools::errors::DataToolsError;
use crate::datatools::fileset::{short_names, Fileset};
use crate::datatools::grouping::GroupingMap;
use crate::datatools::scale::{scale_results, DEFAULT_UNSCALED};

/// Observable holding the integrated luminosity of a data dataset.
pub const LUMINOSITY: &str = "Luminosity";

/// Observable holding the number of generated events of a simulated dataset.
pub const RAW_EVENT_COUNT: &str = "RawEventCount";

/// Scales and combines simulated and data results. Derived result sets are
/// computed on first use and cached.
#[derive(Debug)]
pub struct XSecScaler {
    data: ResultSet,
    mc: ResultSet,
    fs_data: Fileset,
    fs_mc: Fileset,
    grouping_mc: GroupingMap,
    grouping_data: GroupingMap,
    lumi: f64,

    scaled_mc: Option<ResultSet>,
    scaled_combined_mc: Option<ResultSet>,
    combined_data: Option<ResultSet>,
}

impl XSecScaler {
    /// Create a scaler. Fails if a data dataset has no scalar luminosity.
    pub fn new(
        data: ResultSet,
        mc: ResultSet,
        fs_data: Fileset,
        fs_mc: Fileset,
        grouping_mc: GroupingMap,
        grouping_data: GroupingMap,
    ) -> Result<Self, DataToolsError> {
        let lumi = total_luminosity(&data)?;

        Ok(XSecScaler {
            data,
            mc,
            fs_data,
            fs_mc,
            grouping_mc,
            grouping_data,
            lumi,
            scaled_mc: None,
            scaled_combined_mc: None,
            combined_data: None,
        })
    }

    /// Integrated luminosity of the data, in /pb.
    pub fn lumi(&self) -> f64 {
        self.lumi
    }

    /// Simulated results scaled to the data luminosity.
    pub fn scaled_mc(&mut self) -> Result<&ResultSet, DataToolsError> {
        let scaled = match self.scaled_mc.take() {
            Some(scaled) => scaled,
            None => self.scale_mc()?,
        };
        Ok(self.scaled_mc.insert(scaled))
    }

    /// Scaled simulated results, grouped and renamed.
    pub fn scaled_combined_mc(&mut self) -> Result<&ResultSet, DataToolsError> {
        let combined = match self.scaled_combined_mc.take() {
            Some(combined) => combined,
            None => {
                let short = short_names(&self.fs_mc, self.mc.keys());
                let scaled = match self.scaled_mc.take() {
                    Some(scaled) => scaled,
                    None => self.scale_mc()?,
                };
                let combined = combine_rename_results(&scaled, &self.grouping_mc, &short);
                self.scaled_mc = Some(scaled);
                combined?
            }
        };
        Ok(self.scaled_combined_mc.insert(combined))
    }

    /// Data results, grouped and renamed.
    pub fn combined_data(&mut self) -> Result<&ResultSet, DataToolsError> {
        let combined = match self.combined_data.take() {
            Some(combined) => combined,
            None => {
                let short = short_names(&self.fs_data, self.data.keys());
                combine_rename_results(&self.data, &self.grouping_data, &short)?
            }
        };
        Ok(self.combined_data.insert(combined))
    }

    fn scale_mc(&self) -> Result<ResultSet, DataToolsError> {
        tracing::info!("Scaling MC to luminosity {} fb^-1", self.lumi / 1000.0);

        let mut xsecs = BTreeMap::new();
        let mut event_counts = BTreeMap::new();

        for (dataset, observables) in &self.mc {
            let entry = self
                .fs_mc
                .get(dataset)
                .ok_or_else(|| DataToolsError::MissingFilesetEntry {
                    dataset: dataset.clone(),
                })?;
            let xsec = entry
                .xsec()
                .ok_or_else(|| DataToolsError::MissingCrossSection {
                    dataset: dataset.clone(),
                })?;
            let count = observables
                .get(RAW_EVENT_COUNT)
                .and_then(|count| count.as_scalar())
                .ok_or_else(|| DataToolsError::MissingEventCount {
                    dataset: dataset.clone(),
                })?;

            xsecs.insert(dataset.clone(), xsec);
            event_counts.insert(dataset.clone(), count);
        }

        scale_results(&self.mc, self.lumi, &xsecs, &event_counts, DEFAULT_UNSCALED)
    }
}

/// Sum of every data dataset's `Luminosity`.
pub fn total_luminosity(data: &ResultSet) -> Result<f64, DataToolsError> {
    data.iter().try_fold(0.0, |total, (dataset, observables)| {
        observables
            .get(LUMINOSITY)
            .and_then(|lumi| lumi.as_scalar())
            .map(|lumi| total + lumi)
            .ok_or_else(|| DataToolsError::MissingLuminosity {
                dataset: dataset.clone(),
            })
    })
}
