//! # iptables-diff
//!
//! > **What changed in the firewall?**
//!
//! Compares two `iptables-save` snapshots and reports, table by table, which
//! tables and rule lines were added or removed.
//!
//! ## Quick Example
//!
//! ```
//! use iptables_diff::prelude::*;
//!
//! let before = iptables_diff::parse("*filter\n-A INPUT -j DROP\nCOMMIT\n");
//! let after = iptables_diff::parse("*filter\n-A INPUT -j DROP\n-A INPUT -j ACCEPT\nCOMMIT\n");
//!
//! let report = compare(&before, &after);
//! let added: Vec<&str> = report
//!     .of_kind(EventKind::RuleAdded)
//!     .map(|e| e.text.as_str())
//!     .collect();
//! assert_eq!(added, vec!["-A INPUT -j ACCEPT"]);
//! ```
//!
//! ## Output
//!
//! | Prefix    | Event         |
//! |-----------|---------------|
//! | `-`       | Rule removed  |
//! | `+`       | Rule added    |
//! | `!`       | Table added or removed |

pub mod config;
pub mod differ;
pub mod error;
pub mod parser;
pub mod render;
pub mod ruleset;

pub mod prelude {
    pub use crate::config::{Config, OutputFormat};
    pub use crate::differ::{compare, Event, EventKind, Report, Summary};
    pub use crate::error::*;
    pub use crate::parser::load;
    pub use crate::render::{to_json, Presentation, Render};
    pub use crate::ruleset::RuleSet;
}

/// Parse an iptables-save dump into a [`ruleset::RuleSet`].
///
/// # Example
///
/// ```
/// use iptables_diff::parse;
///
/// let rules = parse("*nat\n-A POSTROUTING -o eth0 -j MASQUERADE\nCOMMIT\n");
/// assert_eq!(rules.rule_count(), 1);
/// ```
pub fn parse(input: &str) -> ruleset::RuleSet {
    parser::parse(input)
}
