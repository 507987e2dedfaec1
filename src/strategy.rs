//! Strategy tables for field heuristics.
//!
//! Each field is an ordered list of [`FieldRule`]s — a keyword set plus a
//! locate strategy — resolved first-non-empty-wins. Adding a heuristic for
//! a new document issuer is a data change, not a new code path, and every
//! rule stays independently testable.

use regex::Regex;
use tracing::warn;

use crate::layout::TextBlock;
use crate::proximity::{self, Direction};
use crate::scan;

/// Everything a locate strategy may consult for one document.
pub struct FieldContext<'a> {
    pub full_text: &'a str,
    pub lines: &'a [String],
    pub blocks: &'a [TextBlock],
}

/// How to turn a label keyword set into a value.
#[derive(Debug, Clone, Copy)]
pub enum Locate {
    /// Next `count` non-blank lines after the label line (see [`scan`]).
    LinesAfter {
        count: usize,
        stops: &'static [&'static str],
    },
    /// Nearest block below the label block.
    NearestBelow,
    /// First regex match within `window` lines after the label line.
    PatternAfter {
        pattern: &'static str,
        window: usize,
    },
    /// Regex match inside the nearest block below the label block.
    PatternBelow { pattern: &'static str },
    /// Regex match anywhere in the full text; keywords unused.
    PatternInText { pattern: &'static str },
}

pub struct FieldRule {
    pub keywords: &'static [&'static str],
    pub locate: Locate,
}

/// Run rules in order; the first non-empty result not on the reject list
/// wins. Rejected candidates are treated as not found so later rules still
/// get a chance.
pub fn resolve(rules: &[FieldRule], ctx: &FieldContext<'_>, reject: &[&str]) -> String {
    for rule in rules {
        let value = apply(rule, ctx);
        if value.is_empty() {
            continue;
        }
        if reject.iter().any(|r| value.eq_ignore_ascii_case(r)) {
            continue;
        }
        return value;
    }
    String::new()
}

fn apply(rule: &FieldRule, ctx: &FieldContext<'_>) -> String {
    match rule.locate {
        Locate::LinesAfter { count, stops } => {
            scan::scan_after(rule.keywords, ctx.lines, count, stops)
        }
        Locate::NearestBelow => {
            proximity::locate(rule.keywords, ctx.blocks, Direction::Below, 0.0)
        }
        Locate::PatternAfter { pattern, window } => {
            let Some(re) = compile(pattern) else {
                return String::new();
            };
            let Some(label_idx) = ctx
                .lines
                .iter()
                .position(|l| scan::contains_any(l, rule.keywords))
            else {
                return String::new();
            };
            ctx.lines
                .iter()
                .skip(label_idx + 1)
                .take(window)
                .find_map(|l| re.find(l))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        }
        Locate::PatternBelow { pattern } => {
            let Some(re) = compile(pattern) else {
                return String::new();
            };
            let nearby = proximity::locate(rule.keywords, ctx.blocks, Direction::Below, 0.0);
            re.find(&nearby)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        }
        Locate::PatternInText { pattern } => {
            let Some(re) = compile(pattern) else {
                return String::new();
            };
            re.find(ctx.full_text)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        }
    }
}

/// Compile a rule pattern, skipping invalid regexes with a warning.
fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Skipping invalid field pattern '{}': {}", pattern, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(full_text: &'a str, lines: &'a [String], blocks: &'a [TextBlock]) -> FieldContext<'a> {
        FieldContext {
            full_text,
            lines,
            blocks,
        }
    }

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn first_non_empty_rule_wins() {
        let lines = lines(&["DOCUMENT NUMBER", "HDMU2301456"]);
        let rules = [
            FieldRule {
                keywords: &["NO SUCH LABEL"],
                locate: Locate::LinesAfter { count: 1, stops: &[] },
            },
            FieldRule {
                keywords: &["DOCUMENT NUMBER"],
                locate: Locate::PatternAfter {
                    pattern: r"[A-Z]{3,}[0-9]{6,}",
                    window: 3,
                },
            },
        ];
        let c = ctx("", &lines, &[]);
        assert_eq!(resolve(&rules, &c, &[]), "HDMU2301456");
    }

    #[test]
    fn rejected_candidate_falls_through_to_next_rule() {
        let lines = lines(&["B/L NUMBER", "LADING", "continued"]);
        let rules = [
            FieldRule {
                keywords: &["B/L NUMBER"],
                locate: Locate::LinesAfter { count: 1, stops: &[] },
            },
            FieldRule {
                keywords: &[],
                locate: Locate::PatternInText { pattern: r"[A-Z]{4}\d{7}" },
            },
        ];
        let c = ctx("carrier ref MSCU1234567", &lines, &[]);
        assert_eq!(resolve(&rules, &c, &["LADING"]), "MSCU1234567");
    }

    #[test]
    fn invalid_pattern_is_skipped_not_fatal() {
        let rules = [FieldRule {
            keywords: &[],
            locate: Locate::PatternInText { pattern: r"[unclosed" },
        }];
        let c = ctx("anything", &[], &[]);
        assert_eq!(resolve(&rules, &c, &[]), "");
    }

    #[test]
    fn pattern_after_only_looks_within_window() {
        let lines = lines(&["B/L NUMBER", "one", "two", "three", "HDMU2301456"]);
        let rules = [FieldRule {
            keywords: &["B/L NUMBER"],
            locate: Locate::PatternAfter {
                pattern: r"[A-Z]{3,}[0-9]{6,}",
                window: 3,
            },
        }];
        let c = ctx("", &lines, &[]);
        assert_eq!(resolve(&rules, &c, &[]), "");
    }
}
