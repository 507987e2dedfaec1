//! Air Waybill field pipeline.
//!
//! AWB forms are denser than ocean bills: party names sit in boxed areas
//! whose labels wrap, so shipper/consignee use an organization-name
//! heuristic, and airports come from geometry with a known-airport
//! fallback when the proximity search lands on noise.

use regex::Regex;
use tracing::warn;

use crate::docnum;
use crate::fields::{DocumentType, FieldMap};
use crate::scan::{contains_any, leading_upper_run};
use crate::strategy::{resolve, FieldContext, FieldRule, Locate};

const FREIGHT_STOP: &[&str] = &["freight"];

/// Airports seen on the supported carriers' waybills, used only when the
/// geometry search finds nothing usable under the airport label.
const KNOWN_AIRPORTS: &[&str] = &[
    "HONG KONG", "SHANGHAI", "NARITA", "INCHEON", "SINGAPORE", "FRANKFURT",
    "LOS ANGELES", "NEW YORK", "CHICAGO", "LAX", "JFK", "ORD", "HKG", "PVG",
];

const PIECES_PATTERN: &str = r"(?i)(\d{1,3})\s*(pieces|pkgs|packages|pcs)";

const DEPARTURE_RULES: &[FieldRule] = &[FieldRule {
    keywords: &["Airport of Departure"],
    locate: Locate::NearestBelow,
}];

const DESTINATION_RULES: &[FieldRule] = &[FieldRule {
    keywords: &["Airport of Destination"],
    locate: Locate::NearestBelow,
}];

const FLIGHT_RULES: &[FieldRule] = &[FieldRule {
    keywords: &["Requested Flight/Date", "Exporting Carrier"],
    locate: Locate::LinesAfter {
        count: 1,
        stops: FREIGHT_STOP,
    },
}];

const DESCRIPTION_RULES: &[FieldRule] = &[FieldRule {
    keywords: &["Nature and Quantity of Goods", "Description of Goods"],
    locate: Locate::LinesAfter {
        count: 4,
        stops: FREIGHT_STOP,
    },
}];

pub fn parse_fields(ctx: &FieldContext<'_>) -> FieldMap {
    FieldMap {
        document_type: DocumentType::Awb.as_str().to_string(),
        shipper: company_line(ctx.lines, &["Shipper's Name and Address"], &["Consignee"]),
        consignee: company_line(
            ctx.lines,
            &["Consignee's Name and Address"],
            &["Issuing Carrier", "Agent"],
        ),
        port_of_loading: airport(ctx, DEPARTURE_RULES),
        port_of_discharge: airport(ctx, DESTINATION_RULES),
        bl_number: docnum::awb_number(ctx),
        container_numbers: piece_count(ctx),
        flight_or_vessel: resolve(FLIGHT_RULES, ctx, &[]),
        product_description: resolve(DESCRIPTION_RULES, ctx, &[]),
        raw_text: ctx.full_text.to_string(),
    }
}

/// First line after the label that is not a stop line and looks like an
/// organization name (two consecutive uppercase letters).
fn company_line(lines: &[String], labels: &[&str], stops: &[&str]) -> String {
    let mut collecting = false;
    for line in lines {
        if contains_any(line, labels) {
            collecting = true;
            continue;
        }
        if collecting {
            if contains_any(line, stops) {
                break;
            }
            if has_upper_pair(line) {
                return line.trim().to_string();
            }
        }
    }
    String::new()
}

fn has_upper_pair(line: &str) -> bool {
    line.as_bytes()
        .windows(2)
        .any(|w| w[0].is_ascii_uppercase() && w[1].is_ascii_uppercase())
}

/// Airport below the label, trimmed to its uppercase run; falls back to
/// the known-airport allow-list anywhere in the text.
fn airport(ctx: &FieldContext<'_>, rules: &[FieldRule]) -> String {
    let trimmed = leading_upper_run(&resolve(rules, ctx, &[]));
    if !trimmed.is_empty() {
        return trimmed;
    }

    let upper = ctx.full_text.to_uppercase();
    KNOWN_AIRPORTS
        .iter()
        .find(|a| upper.contains(*a))
        .map(|a| a.to_string())
        .unwrap_or_default()
}

/// Piece count standing in for container numbers on air freight: first
/// "<n> pieces/pkgs/packages/pcs" match, else the digits preceding such a
/// unit scanning lines bottom-up (totals appear near the foot of the form).
fn piece_count(ctx: &FieldContext<'_>) -> String {
    let re = match Regex::new(PIECES_PATTERN) {
        Ok(re) => re,
        Err(e) => {
            warn!("piece pattern failed to compile: {}", e);
            return String::new();
        }
    };

    if let Some(cap) = re.captures(ctx.full_text) {
        return cap[1].to_string();
    }

    for line in ctx.lines.iter().rev() {
        if let Some(cap) = re.captures(line) {
            return cap[1].to_string();
        }
    }
    String::new()
}
