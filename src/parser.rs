//! iptables-save parser using nom.
//!
//! Groups the lines of a dump by table section.
//!
//! # Format Overview
//!
//! ```text
//! # Generated by iptables-save      <- comment, skipped
//! *filter                           <- opens table "*filter"
//! :INPUT ACCEPT [0:0]               <- opaque rule line
//! -A INPUT -i lo -j ACCEPT          <- opaque rule line
//! COMMIT                            <- closes the open table
//! ```
//!
//! The format is read leniently: nothing in it is ever rejected. Lines that
//! show up while no table is open are dropped.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{map, recognize, rest, value},
    sequence::pair,
    IResult,
};
use tracing::debug;

use crate::error::{DiffError, DiffResult};
use crate::ruleset::RuleSet;

/// What a single trimmed, non-empty line means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line<'a> {
    Comment,
    Table(&'a str),
    Commit,
    Rule(&'a str),
}

/// Parse a complete dump held in memory.
pub fn parse(input: &str) -> RuleSet {
    parse_lines(input.lines())
}

/// Parse a sequence of raw lines.
pub fn parse_lines<'a, I>(lines: I) -> RuleSet
where
    I: IntoIterator<Item = &'a str>,
{
    let mut rules = RuleSet::new();
    let mut current: Option<&str> = None;

    for (number, raw) in lines.into_iter().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        match classify(line) {
            Line::Comment => {}
            Line::Table(name) => {
                debug!(table = name, line = number + 1, "table opened");
                rules.open_table(name);
                current = Some(name);
            }
            Line::Commit => current = None,
            Line::Rule(rule) => match current {
                Some(table) => rules.push_rule(table, rule),
                None => debug!(line = number + 1, "discarding line outside any table"),
            },
        }
    }

    rules
}

/// Read everything from `reader` and parse it.
///
/// `origin` names the input in errors. Bytes that are not valid UTF-8 are
/// replaced rather than rejected.
pub fn parse_reader<R: BufRead>(mut reader: R, origin: impl AsRef<Path>) -> DiffResult<RuleSet> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|e| DiffError::io(origin.as_ref(), e))?;
    Ok(parse(&String::from_utf8_lossy(&buf)))
}

/// Load and parse a dump from disk.
///
/// The file is read fully and closed before parsing starts.
pub fn load(path: impl AsRef<Path>) -> DiffResult<RuleSet> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| DiffError::io(path, e))?;
    let rules = parse_reader(BufReader::new(file), path)?;
    debug!(
        path = %path.display(),
        tables = rules.len(),
        rules = rules.rule_count(),
        "snapshot loaded"
    );
    Ok(rules)
}

fn classify(line: &str) -> Line<'_> {
    parse_line(line).map_or(Line::Rule(line), |(_, kind)| kind)
}

fn parse_line(input: &str) -> IResult<&str, Line<'_>> {
    alt((
        value(Line::Comment, pair(char('#'), rest)),
        map(recognize(pair(char('*'), rest)), Line::Table),
        value(Line::Commit, pair(tag("COMMIT"), rest)),
        map(rest, Line::Rule),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "\
# Generated by iptables-save v1.8.7 on Tue Mar  4 10:00:00 2025
*filter
:INPUT ACCEPT [0:0]
:FORWARD DROP [0:0]
-A INPUT -i lo -j ACCEPT
-A INPUT -p tcp --dport 22 -j ACCEPT
COMMIT
# Completed on Tue Mar  4 10:00:00 2025
*nat
:POSTROUTING ACCEPT [0:0]
-A POSTROUTING -o eth0 -j MASQUERADE
COMMIT
";

    #[test]
    fn test_parse_sections() {
        let set = parse(DUMP);
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.rules("*filter").unwrap(),
            &[
                ":INPUT ACCEPT [0:0]",
                ":FORWARD DROP [0:0]",
                "-A INPUT -i lo -j ACCEPT",
                "-A INPUT -p tcp --dport 22 -j ACCEPT",
            ]
        );
        assert_eq!(
            set.rules("*nat").unwrap(),
            &[":POSTROUTING ACCEPT [0:0]", "-A POSTROUTING -o eth0 -j MASQUERADE"]
        );
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let set = parse("*filter\n\n   \n# a comment\n  # indented comment\n-A INPUT -j DROP\nCOMMIT\n");
        assert_eq!(set.rules("*filter").unwrap(), &["-A INPUT -j DROP"]);
    }

    #[test]
    fn test_lines_are_trimmed() {
        let set = parse("  *filter  \r\n\t-A INPUT  -j DROP \r\nCOMMIT\r\n");
        assert!(set.contains_table("*filter"));
        // Inner whitespace is preserved.
        assert_eq!(set.rules("*filter").unwrap(), &["-A INPUT  -j DROP"]);
    }

    #[test]
    fn test_stray_lines_discarded() {
        let set = parse("-A INPUT -j LOG\n*filter\n-A INPUT -j DROP\nCOMMIT\n-A OUTPUT -j LOG\n");
        assert_eq!(set.len(), 1);
        assert_eq!(set.rules("*filter").unwrap(), &["-A INPUT -j DROP"]);
        assert!(!set.contains_table(""));
    }

    #[test]
    fn test_only_stray_lines_yields_empty_set() {
        let set = parse("-A INPUT -j LOG\nCOMMIT\n-A OUTPUT -j LOG\n");
        assert!(set.is_empty());
    }

    #[test]
    fn test_reopened_table_accumulates() {
        let set = parse("*filter\n-A INPUT -j DROP\nCOMMIT\n*filter\n-A OUTPUT -j ACCEPT\nCOMMIT\n");
        assert_eq!(
            set.rules("*filter").unwrap(),
            &["-A INPUT -j DROP", "-A OUTPUT -j ACCEPT"]
        );
    }

    #[test]
    fn test_commit_is_a_prefix_match() {
        let set = parse("*filter\n-A INPUT -j DROP\nCOMMIT # done\n-A INPUT -j LOG\n");
        assert_eq!(set.rules("*filter").unwrap(), &["-A INPUT -j DROP"]);
    }

    #[test]
    fn test_new_table_without_commit_switches_section() {
        let set = parse("*filter\n-A INPUT -j DROP\n*nat\n-A PREROUTING -j DNAT\n");
        assert_eq!(set.rules("*filter").unwrap(), &["-A INPUT -j DROP"]);
        assert_eq!(set.rules("*nat").unwrap(), &["-A PREROUTING -j DNAT"]);
    }

    #[test]
    fn test_unrecognized_lines_are_rules() {
        let set = parse("*mangle\nthis is not iptables syntax\nCOMMIT\n");
        assert_eq!(set.rules("*mangle").unwrap(), &["this is not iptables syntax"]);
    }

    #[test]
    fn test_empty_table_is_recorded() {
        let set = parse("*raw\nCOMMIT\n");
        assert_eq!(set.rules("*raw"), Some(&[][..]));
    }

    #[test]
    fn test_parse_reader_tolerates_invalid_utf8() {
        let bytes: &[u8] = b"*filter\n-A INPUT -m comment --comment \xff -j DROP\nCOMMIT\n";
        let set = parse_reader(bytes, "<stdin>").unwrap();
        assert_eq!(set.rules("*filter").unwrap().len(), 1);
    }

    struct BrokenPipe;

    impl std::io::Read for BrokenPipe {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"))
        }
    }

    #[test]
    fn test_parse_reader_read_failure() {
        let err = parse_reader(BufReader::new(BrokenPipe), "<stdin>").unwrap_err();
        match err {
            DiffError::Io { path, source } => {
                assert_eq!(path, Path::new("<stdin>"));
                assert_eq!(source.kind(), std::io::ErrorKind::BrokenPipe);
            }
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = load("/nonexistent/rules-before.txt").unwrap_err();
        assert!(matches!(err, DiffError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/rules-before.txt"));
    }
}
