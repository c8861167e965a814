//! Rules for accumulating several datasets under one name.

use indexmap::IndexMap;

/// A group and the dataset-name prefixes that belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRule {
    pub name: String,
    pub prefixes: Vec<String>,
}

impl GroupRule {
    pub fn matches(&self, dataset: &str) -> bool {
        self.prefixes.iter().any(|p| dataset.starts_with(p.as_str()))
    }
}

/// Ordered grouping rules. The first matching rule wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingMap {
    rules: Vec<GroupRule>,
}

impl GroupingMap {
    /// A map with no rules; every dataset stays ungrouped.
    pub fn new() -> Self {
        GroupingMap { rules: Vec::new() }
    }

    /// Standard groups for CMS Run 3 simulation.
    pub fn default_mc() -> Self {
        GroupingMap::new()
            .with_rule("QCD", ["/QCD"])
            .with_rule("ZJets", ["/Zto"])
            .with_rule("ttbar", ["/TTto"])
            .with_rule("SingleTop", ["/TWminus", "/TbarWplus"])
            .with_rule("Diboson", ["/WWto", "/WZ", "/ZZto"])
    }

    /// Build from config tables, keeping their order.
    pub fn from_rules(rules: IndexMap<String, Vec<String>>) -> Self {
        GroupingMap {
            rules: rules
                .into_iter()
                .map(|(name, prefixes)| GroupRule { name, prefixes })
                .collect(),
        }
    }

    pub fn with_rule<I, S>(mut self, name: impl Into<String>, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.push(GroupRule {
            name: name.into(),
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// The group `dataset` belongs to, if any.
    pub fn group_for(&self, dataset: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(dataset))
            .map(|rule| rule.name.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
