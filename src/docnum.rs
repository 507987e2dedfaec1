//! Document-number extraction.
//!
//! Ocean B/L numbers vary by carrier, so the lookup is an ordered fallback
//! chain over increasingly relaxed patterns. Air waybill numbers follow
//! the fixed IATA prefix-dash-serial format and need no chain.

use crate::strategy::{resolve, FieldContext, FieldRule, Locate};

/// Tokens that the number patterns can pick up out of label text itself.
/// "LADING" guards against matching inside "BILL OF LADING".
const REJECT: &[&str] = &["LADING"];

const BL_LABELS: &[&str] = &["B/L NUMBER", "DOCUMENT NUMBER"];
const BL_PATTERN: &str = r"[A-Z]{3,}[0-9]{6,}";
const RELAXED_PATTERN: &str = r"\d{10,}|[A-Z]{3}\d{6,}|\d{3}-\d{7,8}";
const AWB_PATTERN: &str = r"\d{3}-\d{7,8}";

const BL_RULES: &[FieldRule] = &[
    FieldRule {
        keywords: BL_LABELS,
        locate: Locate::PatternAfter {
            pattern: BL_PATTERN,
            window: 3,
        },
    },
    FieldRule {
        keywords: BL_LABELS,
        locate: Locate::PatternBelow { pattern: BL_PATTERN },
    },
    FieldRule {
        keywords: &[],
        locate: Locate::PatternInText {
            pattern: RELAXED_PATTERN,
        },
    },
];

const AWB_RULES: &[FieldRule] = &[FieldRule {
    keywords: &[],
    locate: Locate::PatternInText { pattern: AWB_PATTERN },
}];

/// Ocean bill-of-lading number: labeled-line scan, then proximity below
/// the label, then a relaxed full-text scan.
pub fn bl_number(ctx: &FieldContext<'_>) -> String {
    resolve(BL_RULES, ctx, REJECT)
}

/// Air waybill number: IATA prefix-dash-serial anywhere in the text.
pub fn awb_number(ctx: &FieldContext<'_>) -> String {
    resolve(AWB_RULES, ctx, REJECT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(full_text: &'a str, lines: &'a [String]) -> FieldContext<'a> {
        FieldContext {
            full_text,
            lines,
            blocks: &[],
        }
    }

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn labeled_line_scan_wins_first() {
        let lines = lines(&["B/L NUMBER", "HDMU2301456", "1234567890123"]);
        let c = ctx("", &lines);
        assert_eq!(bl_number(&c), "HDMU2301456");
    }

    #[test]
    fn relaxed_full_text_scan_is_last_resort() {
        let lines = lines(&["no labels here"]);
        let c = ctx("ref 1234567890 end", &lines);
        assert_eq!(bl_number(&c), "1234567890");
    }

    #[test]
    fn never_returns_lading_next_to_the_label() {
        // "BILL OF LADING" adjacent to the relaxed alternation must not
        // leak the literal token through any chain step.
        let lines = lines(&["BILL OF LADING", "DOCUMENT NUMBER", "LADING"]);
        let c = ctx("BILL OF LADING\nDOCUMENT NUMBER\nLADING", &lines);
        assert_eq!(bl_number(&c), "");
    }

    #[test]
    fn iata_format_matches_in_bl_fallback() {
        let c = ctx("carrier booking 160-12345678", &[]);
        assert_eq!(bl_number(&c), "160-12345678");
    }

    #[test]
    fn awb_number_is_prefix_dash_serial() {
        let c = ctx("AIR WAYBILL 123-4567890 NOT NEGOTIABLE", &[]);
        assert_eq!(awb_number(&c), "123-4567890");
        let c = ctx("no number here", &[]);
        assert_eq!(awb_number(&c), "");
    }
}
