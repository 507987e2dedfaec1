//! Engine output types and the document-type classifier.

use serde::{Deserialize, Serialize};

/// The two supported shipment document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Bol,
    Awb,
}

impl DocumentType {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::Bol => "BOL",
            DocumentType::Awb => "AWB",
        }
    }
}

/// Select the pipeline from the recognized text. A single keyword test:
/// air waybills print "AIR WAYBILL" on the form face; everything else is
/// treated as an ocean bill of lading.
pub fn classify(full_text: &str) -> DocumentType {
    if full_text.to_lowercase().contains("air waybill") {
        DocumentType::Awb
    } else {
        DocumentType::Bol
    }
}

/// Structured shipment fields recovered from one document.
///
/// Every key is always present; a field the heuristics could not locate is
/// an empty string, never absent. Layout variance across issuers makes
/// partial extraction expected — a downstream human review step corrects
/// misses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMap {
    pub document_type: String,
    pub shipper: String,
    pub consignee: String,
    pub port_of_loading: String,
    pub port_of_discharge: String,
    pub bl_number: String,
    pub container_numbers: String,
    pub flight_or_vessel: String,
    pub product_description: String,
    pub raw_text: String,
}

/// Either a complete field map or a single-key error, never a mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractOutcome {
    Fields(FieldMap),
    Error { error: String },
}

impl ExtractOutcome {
    pub fn error(message: impl Into<String>) -> Self {
        ExtractOutcome::Error {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(classify("INTERNATIONAL AIR WAYBILL 123-4567890"), DocumentType::Awb);
        assert_eq!(classify("international air waybill"), DocumentType::Awb);
        assert_eq!(classify("BILL OF LADING"), DocumentType::Bol);
        assert_eq!(classify(""), DocumentType::Bol);
    }

    #[test]
    fn classify_is_idempotent() {
        let text = "some Air Waybill text";
        assert_eq!(classify(text), classify(text));
    }

    #[test]
    fn outcome_serializes_to_flat_shapes() {
        let fields = ExtractOutcome::Fields(FieldMap {
            document_type: "BOL".to_string(),
            ..FieldMap::default()
        });
        let json = serde_json::to_value(&fields).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 10);
        assert!(obj.get("error").is_none());
        assert_eq!(obj["document_type"], "BOL");
        assert_eq!(obj["shipper"], "");

        let err = ExtractOutcome::error("vision unavailable");
        let json = serde_json::to_value(&err).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["error"], "vision unavailable");
    }
}
