//! Table-by-table comparison of two snapshots.
//!
//! Rules are compared by presence only: a rule counts as unchanged if its
//! exact text appears anywhere in the same table on the other side, no
//! matter where or how often.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::ruleset::RuleSet;

/// What an [`Event`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Start of a table block.
    Header,
    /// The table exists only in the newer snapshot.
    TableAdded,
    /// The table exists only in the older snapshot.
    TableRemoved,
    RuleRemoved,
    RuleAdded,
}

/// One line of a comparison report.
///
/// `text` is the table name for header and table events, the rule text
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub kind: EventKind,
    pub table: String,
    pub text: String,
}

impl Event {
    fn table_event(kind: EventKind, table: &str) -> Self {
        Self {
            kind,
            table: table.to_string(),
            text: table.to_string(),
        }
    }

    fn rule_event(kind: EventKind, table: &str, rule: &str) -> Self {
        Self {
            kind,
            table: table.to_string(),
            text: rule.to_string(),
        }
    }

    /// True for everything but table headers.
    pub fn is_change(&self) -> bool {
        self.kind != EventKind::Header
    }
}

/// Ordered events produced by [`compare`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Report {
    events: Vec<Event>,
}

impl Report {
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether anything other than table headers was reported.
    pub fn has_changes(&self) -> bool {
        self.events.iter().any(Event::is_change)
    }

    /// Events of one kind, in report order.
    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for event in &self.events {
            match event.kind {
                EventKind::Header => summary.tables += 1,
                EventKind::TableAdded => summary.tables_added += 1,
                EventKind::TableRemoved => summary.tables_removed += 1,
                EventKind::RuleRemoved => summary.rules_removed += 1,
                EventKind::RuleAdded => summary.rules_added += 1,
            }
        }
        summary
    }

    fn push(&mut self, event: Event) {
        self.events.push(event);
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl IntoIterator for Report {
    type Item = Event;
    type IntoIter = std::vec::IntoIter<Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

/// Event counts for a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Tables compared (the union of both snapshots).
    pub tables: usize,
    pub tables_added: usize,
    pub tables_removed: usize,
    pub rules_added: usize,
    pub rules_removed: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} table(s) compared: {} added, {} removed; {} rule(s) added, {} removed",
            self.tables,
            self.tables_added,
            self.tables_removed,
            self.rules_added,
            self.rules_removed
        )
    }
}

/// Compare two snapshots table by table.
///
/// Tables are visited in sorted order. A table present on only one side is
/// reported as added or removed without looking at its rules. For shared
/// tables, removed rules follow the order of `before` and added rules the
/// order of `after`.
pub fn compare(before: &RuleSet, after: &RuleSet) -> Report {
    let universe: BTreeSet<&str> = before.table_names().chain(after.table_names()).collect();
    let mut report = Report::default();

    for table in universe {
        report.push(Event::table_event(EventKind::Header, table));

        match (before.rules(table), after.rules(table)) {
            (None, Some(_)) => report.push(Event::table_event(EventKind::TableAdded, table)),
            (Some(_), None) => report.push(Event::table_event(EventKind::TableRemoved, table)),
            (Some(old), Some(new)) => {
                for rule in missing_from(old, new) {
                    report.push(Event::rule_event(EventKind::RuleRemoved, table, rule));
                }
                for rule in missing_from(new, old) {
                    report.push(Event::rule_event(EventKind::RuleAdded, table, rule));
                }
            }
            // Every name in the universe comes from one side or the other.
            (None, None) => {}
        }
    }

    debug!(events = report.events.len(), "comparison finished");
    report
}

/// Rules of `rules` whose text does not occur anywhere in `other`.
fn missing_from<'a>(rules: &'a [String], other: &[String]) -> impl Iterator<Item = &'a str> {
    let present: HashSet<&str> = other.iter().map(String::as_str).collect();
    rules
        .iter()
        .map(String::as_str)
        .filter(move |rule| !present.contains(rule))
}
