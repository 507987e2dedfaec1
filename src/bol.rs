//! Ocean Bill of Lading field pipeline.
//!
//! Labels on ocean forms follow the numbered-box layout ("2. EXPORTER",
//! "3. CONSIGNED TO", ...), so every field here is a line-offset rule plus
//! field-specific cleanup. Container and document numbers use regex
//! extraction with validation.

use std::collections::BTreeSet;

use regex::Regex;
use tracing::warn;

use crate::docnum;
use crate::fields::{DocumentType, FieldMap};
use crate::scan::truncate_before;
use crate::strategy::{resolve, FieldContext, FieldRule, Locate};

/// Address continuation markers that end a consignee name.
const ADDRESS_STOPS: &[&str] = &["C/O", "ATTN", "ADDRESS", "TEL", "FAX"];
/// Charge lines that end a goods description.
const FREIGHT_STOP: &[&str] = &["freight"];

const CONTAINER_PATTERN: &str = r"[A-Z]{4}\d{7}";

const SHIPPER_RULES: &[FieldRule] = &[FieldRule {
    keywords: &["2. EXPORTER", "SHIPPER"],
    locate: Locate::LinesAfter { count: 1, stops: &[] },
}];

const CONSIGNEE_RULES: &[FieldRule] = &[FieldRule {
    keywords: &["3. CONSIGNED TO", "CONSIGNEE"],
    locate: Locate::LinesAfter {
        count: 2,
        stops: ADDRESS_STOPS,
    },
}];

const LOADING_PORT_RULES: &[FieldRule] = &[FieldRule {
    keywords: &["PORT OF LOADING", "PORT OF EXPORT"],
    locate: Locate::LinesAfter { count: 1, stops: &[] },
}];

const DISCHARGE_PORT_RULES: &[FieldRule] = &[FieldRule {
    keywords: &["PORT OF DISCHARGE", "PLACE OF DELIVERY", "FOREIGN PORT OF UNLOADING"],
    locate: Locate::LinesAfter { count: 1, stops: &[] },
}];

const VESSEL_RULES: &[FieldRule] = &[FieldRule {
    keywords: &["EXPORTING CARRIER", "VESSEL NAME"],
    locate: Locate::LinesAfter { count: 1, stops: &[] },
}];

const DESCRIPTION_RULES: &[FieldRule] = &[FieldRule {
    keywords: &["DESCRIPTION OF GOODS", "DESCRIPTION OF COMMODITIES"],
    locate: Locate::LinesAfter {
        count: 5,
        stops: FREIGHT_STOP,
    },
}];

pub fn parse_fields(ctx: &FieldContext<'_>) -> FieldMap {
    FieldMap {
        document_type: DocumentType::Bol.as_str().to_string(),
        shipper: truncate_before(&resolve(SHIPPER_RULES, ctx, &[]), &[',', '(']),
        consignee: resolve(CONSIGNEE_RULES, ctx, &[]),
        port_of_loading: truncate_before(&resolve(LOADING_PORT_RULES, ctx, &[]), &[',']),
        port_of_discharge: truncate_before(&resolve(DISCHARGE_PORT_RULES, ctx, &[]), &[',']),
        bl_number: docnum::bl_number(ctx),
        container_numbers: container_numbers(ctx.lines),
        flight_or_vessel: resolve(VESSEL_RULES, ctx, &[]),
        product_description: resolve(DESCRIPTION_RULES, ctx, &[]),
        raw_text: ctx.full_text.to_string(),
    }
}

/// Every ISO 6346-shaped token (4 letters + 7 digits) across all lines,
/// deduplicated and joined in sorted order so the result is stable under
/// line reordering.
pub fn container_numbers(lines: &[String]) -> String {
    let re = match Regex::new(CONTAINER_PATTERN) {
        Ok(re) => re,
        Err(e) => {
            warn!("container pattern failed to compile: {}", e);
            return String::new();
        }
    };

    let found: BTreeSet<String> = lines
        .iter()
        .flat_map(|line| re.find_iter(line))
        .map(|m| m.as_str().to_string())
        .collect();

    found.into_iter().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn ctx<'a>(full_text: &'a str, lines: &'a [String]) -> FieldContext<'a> {
        FieldContext {
            full_text,
            lines,
            blocks: &[],
        }
    }

    #[test]
    fn shipper_truncates_at_comma() {
        let lines = lines(&["2. EXPORTER", "Acme Trading Co., Unit 4"]);
        let fields = parse_fields(&ctx("", &lines));
        assert_eq!(fields.shipper, "Acme Trading Co.");
    }

    #[test]
    fn shipper_truncates_at_parenthesis() {
        let lines = lines(&["SHIPPER", "Acme Trading (Shenzhen) Co"]);
        let fields = parse_fields(&ctx("", &lines));
        assert_eq!(fields.shipper, "Acme Trading");
    }

    #[test]
    fn consignee_collects_two_lines_until_stop() {
        let lines = lines(&[
            "3. CONSIGNED TO",
            "GLOBAL IMPORTS LLC",
            "WEST COAST DIVISION",
            "45 HARBOR WAY",
        ]);
        let fields = parse_fields(&ctx("", &lines));
        assert_eq!(fields.consignee, "GLOBAL IMPORTS LLC WEST COAST DIVISION");

        let stopped = vec![
            "CONSIGNEE".to_string(),
            "GLOBAL IMPORTS LLC".to_string(),
            "TEL: 555-0100".to_string(),
        ];
        let fields = parse_fields(&ctx("", &stopped));
        assert_eq!(fields.consignee, "GLOBAL IMPORTS LLC");
    }

    #[test]
    fn ports_truncate_at_comma() {
        let lines = lines(&[
            "PORT OF LOADING",
            "SHANGHAI, CHINA",
            "PORT OF DISCHARGE",
            "LONG BEACH, CA",
        ]);
        let fields = parse_fields(&ctx("", &lines));
        assert_eq!(fields.port_of_loading, "SHANGHAI");
        assert_eq!(fields.port_of_discharge, "LONG BEACH");
    }

    #[test]
    fn vessel_is_next_line_after_carrier_label() {
        let lines = lines(&["EXPORTING CARRIER", "EVER GIVEN V.034E"]);
        let fields = parse_fields(&ctx("", &lines));
        assert_eq!(fields.flight_or_vessel, "EVER GIVEN V.034E");
    }

    #[test]
    fn description_stops_at_freight_line() {
        let lines = lines(&[
            "DESCRIPTION OF GOODS",
            "100 CARTONS",
            "PLASTIC HOUSEHOLD GOODS",
            "FREIGHT PREPAID",
            "MORE TEXT",
        ]);
        let fields = parse_fields(&ctx("", &lines));
        assert_eq!(fields.product_description, "100 CARTONS PLASTIC HOUSEHOLD GOODS");
    }

    #[test]
    fn container_numbers_deduplicated_and_order_independent() {
        let a = lines(&["MSCU1234567 ON BOARD", "TCLU7654321", "MSCU1234567 AGAIN"]);
        let mut b = a.clone();
        b.reverse();
        assert_eq!(container_numbers(&a), "MSCU1234567, TCLU7654321");
        assert_eq!(container_numbers(&a), container_numbers(&b));
    }

    #[test]
    fn missing_fields_are_empty_strings() {
        let lines = lines(&["AN UNRELATED DOCUMENT"]);
        let fields = parse_fields(&ctx("AN UNRELATED DOCUMENT", &lines));
        assert_eq!(fields.document_type, "BOL");
        assert_eq!(fields.shipper, "");
        assert_eq!(fields.container_numbers, "");
        assert_eq!(fields.bl_number, "");
        assert_eq!(fields.raw_text, "AN UNRELATED DOCUMENT");
    }
}
