//! Parsed snapshot of an iptables-save dump.

use std::collections::BTreeMap;

use serde::Serialize;

/// Rules of one snapshot, grouped by table.
///
/// Keys are the raw section lines (`*filter`, `*nat`, ...). Rules keep the
/// order they had in the dump, though comparison treats them as a set.
/// Tables iterate in sorted order so every consumer sees a stable layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RuleSet {
    tables: BTreeMap<String, Vec<String>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a table section. Re-opening a known table keeps its rules.
    pub(crate) fn open_table(&mut self, name: &str) {
        if !self.tables.contains_key(name) {
            self.tables.insert(name.to_string(), Vec::new());
        }
    }

    pub(crate) fn push_rule(&mut self, table: &str, rule: &str) {
        if let Some(rules) = self.tables.get_mut(table) {
            rules.push(rule.to_string());
        }
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Rules recorded for `name`, or `None` if the table never appeared.
    pub fn rules(&self, name: &str) -> Option<&[String]> {
        self.tables.get(name).map(Vec::as_slice)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn tables(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.tables
            .iter()
            .map(|(name, rules)| (name.as_str(), rules.as_slice()))
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Total number of rule lines across all tables.
    pub fn rule_count(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }
}

impl<N, R> FromIterator<(N, Vec<R>)> for RuleSet
where
    N: Into<String>,
    R: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, Vec<R>)>>(iter: I) -> Self {
        let mut set = RuleSet::new();
        for (name, rules) in iter {
            set.tables
                .entry(name.into())
                .or_default()
                .extend(rules.into_iter().map(Into::into));
        }
        set
    }
}
