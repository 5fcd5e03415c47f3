//! Marker payload decoding.
//!
//! A marker encodes its own printed size as a JSON object, e.g.
//! `{"width": 5, "height": 5, "units": "cm"}`. Payload text comes from an
//! external decoder and is treated as untrusted.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::PayloadError;

/// Physical size encoded in a marker payload.
///
/// Values are carried through as decoded; the unit label is opaque and only
/// echoed back in measurement labels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerPhysicalSize {
    pub width: f64,
    pub height: f64,
    #[serde(rename = "units")]
    pub unit: String,
}

impl FromStr for MarkerPhysicalSize {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_payload(s)
    }
}

/// Decode a marker payload.
///
/// The text must be a JSON object with numeric `width` and `height` and a
/// string `units`; unknown keys are ignored.
pub fn parse_payload(text: &str) -> Result<MarkerPhysicalSize, PayloadError> {
    // Go through `Value` so that a JSON array is not accepted as a struct in
    // sequence form.
    let value: serde_json::Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(PayloadError::NotAnObject);
    }
    let size: MarkerPhysicalSize = serde_json::from_value(value)?;
    if size.unit.is_empty() {
        return Err(PayloadError::EmptyUnit);
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_and_float_fields() {
        let p = parse_payload(r#"{"width": 5, "height": 2.5, "units": "cm"}"#).expect("valid");
        assert_eq!(
            p,
            MarkerPhysicalSize {
                width: 5.0,
                height: 2.5,
                unit: "cm".to_string(),
            }
        );
    }

    #[test]
    fn ignores_unknown_keys() {
        let p = parse_payload(r#"{"width": 1, "height": 1, "units": "in", "id": 42}"#)
            .expect("valid");
        assert_eq!(p.unit, "in");
    }

    #[test]
    fn missing_units_is_rejected() {
        let err = parse_payload(r#"{"width":3,"height":4}"#).unwrap_err();
        assert!(matches!(err, PayloadError::Json(_)));
    }

    #[test]
    fn missing_dimensions_are_rejected() {
        assert!(parse_payload(r#"{"height": 4, "units": "cm"}"#).is_err());
        assert!(parse_payload(r#"{"width": 4, "units": "cm"}"#).is_err());
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(parse_payload(r#"{"width": "5", "height": 5, "units": "cm"}"#).is_err());
        assert!(parse_payload(r#"{"width": 5, "height": null, "units": "cm"}"#).is_err());
        assert!(parse_payload(r#"{"width": 5, "height": 5, "units": 7}"#).is_err());
    }

    #[test]
    fn non_object_json_is_rejected() {
        assert!(matches!(
            parse_payload(r#"[5, 5, "cm"]"#),
            Err(PayloadError::NotAnObject)
        ));
        assert!(matches!(parse_payload("42"), Err(PayloadError::NotAnObject)));
    }

    #[test]
    fn malformed_text_is_rejected() {
        assert!(parse_payload("").is_err());
        assert!(parse_payload("https://example.com/not-json").is_err());
        assert!(parse_payload(r#"{"width": 5, "height": 5, "units": "cm""#).is_err());
    }

    #[test]
    fn empty_unit_is_rejected() {
        assert!(matches!(
            parse_payload(r#"{"width": 5, "height": 5, "units": ""}"#),
            Err(PayloadError::EmptyUnit)
        ));
    }

    #[test]
    fn from_str_delegates_to_parser() {
        let p: MarkerPhysicalSize = r#"{"width": 2, "height": 3, "units": "mm"}"#
            .parse()
            .expect("valid");
        assert_eq!(p.width, 2.0);
        assert_eq!(p.height, 3.0);
    }
}
