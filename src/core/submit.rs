//! HTCondor submit descriptions.
//!
//! A submit description is an ordered list of `key = value` commands followed
//! by a `queue` statement. Order is preserved so that rendered files are
//! stable and easy to diff.

use std::fmt::Write;

/// Ordered set of submit commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitDescription {
    entries: Vec<(String, String)>,
}

impl SubmitDescription {
    /// Create an empty description.
    pub fn new() -> Self {
        SubmitDescription {
            entries: Vec::new(),
        }
    }

    /// Set a command, replacing any previous value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a command's value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Remove a command, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over commands in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Apply every command of `other` on top of this description.
    pub fn extend_from(&mut self, other: &SubmitDescription) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }

    /// Render as submit-file text ending in `queue {count}`.
    pub fn render(&self, queue: u32) -> String {
        let mut output = String::new();
        for (key, value) in &self.entries {
            let _ = writeln!(output, "{} = {}", key, value);
        }
        let _ = writeln!(output, "queue {}", queue);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut desc = SubmitDescription::new()
            .with("universe", "vanilla")
            .with("log", "a.log")
            .with("InitialDir", "/scratch/alice");

        desc.insert("log", "b.log");

        let keys: Vec<_> = desc.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["universe", "log", "InitialDir"]);
        assert_eq!(desc.get("log"), Some("b.log"));
        assert_eq!(desc.len(), 3);
    }

    #[test]
    fn test_remove() {
        let mut desc = SubmitDescription::new().with("request_GPUs", "1");
        assert_eq!(desc.remove("request_GPUs"), Some("1".to_string()));
        assert!(desc.is_empty());
        assert_eq!(desc.remove("request_GPUs"), None);
    }

    #[test]
    fn test_render() {
        let desc = SubmitDescription::new()
            .with("universe", "vanilla")
            .with("+JobFlavour", "\"tomorrow\"");

        assert_eq!(
            desc.render(3),
            "universe = vanilla\n+JobFlavour = \"tomorrow\"\nqueue 3\n"
        );
    }

    #[test]
    fn test_extend_from_overrides() {
        let mut base = SubmitDescription::new()
            .with("RequestCpus", "1")
            .with("batch_name", "dask-worker");
        let extra = SubmitDescription::new()
            .with("batch_name", "analysis")
            .with("Requirements", "HasSingularityJobStart");

        base.extend_from(&extra);

        assert_eq!(base.get("batch_name"), Some("analysis"));
        assert_eq!(base.get("Requirements"), Some("HasSingularityJobStart"));
        assert_eq!(base.len(), 3);
    }
}
