//! Scaling simulated results to a luminosity.

use std::collections::BTreeMap;

use crate::datatools::accumulator::{DatasetResults, ResultSet};
use crate::datatools::errors::DataToolsError;

/// Observables copied unchanged unless told otherwise.
pub const DEFAULT_UNSCALED: &[&str] = &["RawEventCount"];

/// Scale every dataset in `mc` by `xsec * lumi / event_count`.
///
/// Cross sections are in pb and `lumi` in /pb. Observables named in
/// `dont_scale` are copied as they are.
pub fn scale_results(
    mc: &ResultSet,
    lumi: f64,
    xsecs: &BTreeMap<String, f64>,
    event_counts: &BTreeMap<String, f64>,
    dont_scale: &[&str],
) -> Result<ResultSet, DataToolsError> {
    let mut out = ResultSet::new();

    for (dataset, observables) in mc {
        let factor = scale_factor(dataset, lumi, xsecs, event_counts)?;
        tracing::debug!("dataset {} has MC lumi-scaling weight {}", dataset, factor);

        let scaled: DatasetResults = observables
            .iter()
            .map(|(name, value)| {
                let value = if dont_scale.contains(&name.as_str()) {
                    value.clone()
                } else {
                    value.scaled(factor)
                };
                (name.clone(), value)
            })
            .collect();
        out.insert(dataset.clone(), scaled);
    }

    Ok(out)
}

fn scale_factor(
    dataset: &str,
    lumi: f64,
    xsecs: &BTreeMap<String, f64>,
    event_counts: &BTreeMap<String, f64>,
) -> Result<f64, DataToolsError> {
    let xsec = xsecs
        .get(dataset)
        .ok_or_else(|| DataToolsError::MissingCrossSection {
            dataset: dataset.to_string(),
        })?;
    let count = event_counts
        .get(dataset)
        .ok_or_else(|| DataToolsError::MissingEventCount {
            dataset: dataset.to_string(),
        })?;
    if *count == 0.0 {
        return Err(DataToolsError::ZeroEventCount {
            dataset: dataset.to_string(),
        });
    }
    Ok(xsec * lumi / count)
}
