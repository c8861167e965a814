//! Grouping and renaming datasets in a result set.

use std::collections::{BTreeMap, BTreeSet};

use crate::datatools::accumulator::ResultSet;
use crate::datatools::errors::DataToolsError;
use crate::datatools::grouping::GroupingMap;

/// Accumulate grouped datasets and rename the rest.
///
/// A dataset matching a rule in `grouping` is added into that group.
/// Every other dataset is stored under its entry in `short_names`, or its own
/// name. When two ungrouped datasets share a short name the one later in
/// `results` wins. Output keys appear in the order they are first produced.
pub fn combine_rename_results(
    results: &ResultSet,
    grouping: &GroupingMap,
    short_names: &BTreeMap<String, String>,
) -> Result<ResultSet, DataToolsError> {
    let groups: BTreeSet<&str> = grouping.names().collect();
    let overlap: Vec<&str> = short_names
        .values()
        .map(String::as_str)
        .filter(|name| groups.contains(name))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if !overlap.is_empty() {
        tracing::warn!(
            "group names and short names both produce {:?}; results may overwrite each other \
             unless every dataset with a shared short name is also in that group",
            overlap
        );
    }

    let mut out = ResultSet::new();

    for (dataset, observables) in results {
        let Some(group) = grouping.group_for(dataset) else {
            let name = short_names.get(dataset).unwrap_or(dataset);
            out.insert(name.clone(), observables.clone());
            continue;
        };

        let Some(accumulated) = out.get_mut(group) else {
            out.insert(group.to_string(), observables.clone());
            continue;
        };

        for (observable, value) in observables {
            let target = accumulated.get_mut(observable).ok_or_else(|| {
                DataToolsError::StructureMismatch {
                    group: group.to_string(),
                    dataset: dataset.clone(),
                    observable: observable.clone(),
                }
            })?;
            target.add_assign(value)?;
        }
    }

    Ok(out)
}
