//! Input filesets and the dataset metadata they carry.
//!
//! A fileset maps dataset names to their input files plus free-form
//! metadata. Only two metadata keys matter here: `xsec` (in pb) and
//! `short_name`. Filesets produced by dataset discovery tools nest the
//! metadata one level deeper, under `metadata.metadata`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Dataset name to entry.
pub type Fileset = BTreeMap<String, FilesetEntry>;

/// Input description of one dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilesetEntry {
    #[serde(default)]
    pub files: Value,

    #[serde(default)]
    pub metadata: Value,
}

impl FilesetEntry {
    /// Cross section in pb, from `metadata.xsec` or `metadata.metadata.xsec`.
    pub fn xsec(&self) -> Option<f64> {
        self.metadata
            .get("xsec")
            .and_then(Value::as_f64)
            .or_else(|| {
                self.metadata
                    .get("metadata")
                    .and_then(|inner| inner.get("xsec"))
                    .and_then(Value::as_f64)
            })
    }

    /// Short display name, from `metadata.short_name`.
    pub fn short_name(&self) -> Option<&str> {
        self.metadata.get("short_name").and_then(Value::as_str)
    }
}

/// Dataset name to short name, for every dataset in `datasets`.
///
/// Datasets without a short name keep their own name.
pub fn short_names<'a, I>(fileset: &Fileset, datasets: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = &'a String>,
{
    datasets
        .into_iter()
        .map(|dataset| {
            let short = fileset
                .get(dataset)
                .and_then(FilesetEntry::short_name)
                .unwrap_or(dataset);
            (dataset.clone(), short.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_xsec_lookup() {
        let flat: FilesetEntry = serde_json::from_value(json!({
            "files": {"root://xrootd/a.root": "Events"},
            "metadata": {"xsec": 6077.22, "short_name": "DY"}
        }))
        .unwrap();
        assert_eq!(flat.xsec(), Some(6077.22));
        assert_eq!(flat.short_name(), Some("DY"));

        let nested: FilesetEntry = serde_json::from_value(json!({
            "files": [],
            "metadata": {"metadata": {"xsec": 88.29}}
        }))
        .unwrap();
        assert_eq!(nested.xsec(), Some(88.29));
        assert_eq!(nested.short_name(), None);

        assert_eq!(FilesetEntry::default().xsec(), None);
    }

    #[test]
    fn test_short_names() {
        let mut fileset = Fileset::new();
        fileset.insert(
            "/DYto2L".to_string(),
            serde_json::from_value(json!({"metadata": {"short_name": "DY"}})).unwrap(),
        );

        let datasets = vec!["/DYto2L".to_string(), "/Unknown".to_string()];
        let names = short_names(&fileset, &datasets);
        assert_eq!(names["/DYto2L"], "DY");
        assert_eq!(names["/Unknown"], "/Unknown");
    }
}
