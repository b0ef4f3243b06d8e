//! Presentation of comparison reports.
//!
//! The differ only produces kind-tagged events; this module decides how they
//! look. Styling is controlled by an explicit [`Presentation`] value.

use colored::Colorize;

use crate::differ::{Event, EventKind, Report};
use crate::error::DiffResult;

/// How a report should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    /// Use ANSI colors.
    pub color: bool,
}

impl Presentation {
    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn colored() -> Self {
        Self { color: true }
    }
}

impl Default for Presentation {
    fn default() -> Self {
        Self::colored()
    }
}

/// Trait for turning report pieces into display text.
pub trait Render {
    /// Render this item for a terminal.
    fn render(&self, presentation: &Presentation) -> String;
}

impl Render for Event {
    fn render(&self, presentation: &Presentation) -> String {
        let line = match self.kind {
            EventKind::Header => format!("Comparing table {}:", self.text),
            EventKind::TableAdded => format!("! Table {} has been added", self.text),
            EventKind::TableRemoved => format!("! Table {} has been removed", self.text),
            EventKind::RuleRemoved => format!("- {}", self.text),
            EventKind::RuleAdded => format!("+ {}", self.text),
        };

        if !presentation.color {
            return line;
        }

        match self.kind {
            EventKind::Header => line.cyan().to_string(),
            EventKind::TableAdded | EventKind::TableRemoved => line.yellow().to_string(),
            EventKind::RuleRemoved => line.red().to_string(),
            EventKind::RuleAdded => line.green().to_string(),
        }
    }
}

impl Render for Report {
    /// Every table block is preceded by a blank line. The result ends with a
    /// newline unless the report is empty.
    fn render(&self, presentation: &Presentation) -> String {
        let mut out = String::new();
        for event in self {
            if event.kind == EventKind::Header {
                out.push('\n');
            }
            out.push_str(&event.render(presentation));
            out.push('\n');
        }
        out
    }
}

/// Serialize a report as pretty-printed JSON.
pub fn to_json(report: &Report) -> DiffResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
