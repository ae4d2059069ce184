// =============================================================================
// Decision Validator — the inbound trust boundary
// =============================================================================
//
// A response is accepted only if it is well-formed JSON, matches the strict
// schema exactly, decodes into `TradingDecision`, and carries a confidence in
// [0, 1]. Accepted decisions are returned untouched: no clamping, no repair.
// =============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::contract::schema::{self, SchemaViolation};
use crate::types::TradingDecision;

/// Why a raw engine response was rejected.
#[derive(Debug, Error)]
pub enum ValidationFailure {
    #[error("response is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("response violates schema at {0}")]
    Schema(SchemaViolation),

    #[error("response could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("confidence {0} outside [0, 1]")]
    ConfidenceOutOfRange(f64),
}

/// Validate raw engine output.
pub fn validate(raw: &str) -> Result<TradingDecision, ValidationFailure> {
    let value: Value = serde_json::from_str(raw).map_err(ValidationFailure::Json)?;

    schema::check(&value, &schema::signal_schema()).map_err(ValidationFailure::Schema)?;

    let decision: TradingDecision =
        serde_json::from_value(value).map_err(ValidationFailure::Decode)?;

    // NaN fails both comparisons and is rejected here too.
    if !(0.0..=1.0).contains(&decision.confidence) {
        return Err(ValidationFailure::ConfidenceOutOfRange(decision.confidence));
    }

    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safety_gate::veto_response;
    use crate::types::{Bias, Order, OrderType};

    fn decision() -> TradingDecision {
        TradingDecision {
            symbol: "XAUUSD".to_string(),
            timestamp_utc: "2024-05-01T14:30:00+00:00".to_string(),
            bias: Bias::Bearish,
            order: Order {
                order_type: OrderType::SellStop,
                entry: 2004.75,
                sl: 2019.5,
                tp: 1982.0,
                expiry_minutes: 240,
                comment: "support break".to_string(),
            },
            confidence: 0.66,
            veto: false,
            veto_reason: String::new(),
        }
    }

    #[test]
    fn round_trip_is_identity() {
        let original = decision();
        let raw = serde_json::to_string(&original).unwrap();
        assert_eq!(validate(&raw).unwrap(), original);
    }

    #[test]
    fn veto_round_trip_is_identity() {
        let original = veto_response("EURUSD", "no clear setup");
        let raw = serde_json::to_string(&original).unwrap();
        assert_eq!(validate(&raw).unwrap(), original);
    }

    #[test]
    fn full_precision_prices_round_trip_exactly() {
        let mut original = decision();
        original.order.entry = 1356.2493066635307;
        original.order.sl = 1340.0000000000002;
        original.order.tp = 1381.1234567890123;
        original.confidence = 0.6180339887498949;
        let raw = serde_json::to_string(&original).unwrap();
        assert_eq!(validate(&raw).unwrap(), original);
    }

    #[test]
    fn pseudo_random_prices_round_trip_exactly() {
        // Deterministic LCG over a realistic price band.
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        for _ in 0..20_000 {
            seed = seed
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let unit = (seed >> 11) as f64 / (1u64 << 53) as f64;
            let mut original = decision();
            original.order.entry = 1000.0 + unit * 2000.0;
            let raw = serde_json::to_string(&original).unwrap();
            assert_eq!(validate(&raw).unwrap(), original, "entry {}", original.order.entry);
        }
    }

    #[test]
    fn malformed_json_fails() {
        assert!(matches!(
            validate("{\"symbol\": \"XAUUSD\""),
            Err(ValidationFailure::Json(_))
        ));
        assert!(matches!(validate(""), Err(ValidationFailure::Json(_))));
    }

    #[test]
    fn missing_field_fails() {
        let mut v = serde_json::to_value(decision()).unwrap();
        v.as_object_mut().unwrap().remove("veto_reason");
        let err = validate(&v.to_string()).unwrap_err();
        match err {
            ValidationFailure::Schema(violation) => assert_eq!(violation.path, "$"),
            other => panic!("unexpected failure: {other}"),
        }
    }

    #[test]
    fn invalid_enum_fails() {
        let mut v = serde_json::to_value(decision()).unwrap();
        v["bias"] = serde_json::json!("sideways");
        assert!(matches!(
            validate(&v.to_string()),
            Err(ValidationFailure::Schema(_))
        ));
    }

    #[test]
    fn extra_field_fails() {
        let mut v = serde_json::to_value(decision()).unwrap();
        v["order"]["lots"] = serde_json::json!(0.1);
        assert!(matches!(
            validate(&v.to_string()),
            Err(ValidationFailure::Schema(_))
        ));
    }

    #[test]
    fn confidence_out_of_range_fails() {
        for bad in [1.01, -0.01, 7.0] {
            let mut d = decision();
            d.confidence = bad;
            let raw = serde_json::to_string(&d).unwrap();
            match validate(&raw) {
                Err(ValidationFailure::ConfidenceOutOfRange(c)) => assert_eq!(c, bad),
                other => panic!("expected range failure, got {other:?}"),
            }
        }
    }

    #[test]
    fn confidence_bounds_are_inclusive() {
        for ok in [0.0, 1.0] {
            let mut d = decision();
            d.confidence = ok;
            let raw = serde_json::to_string(&d).unwrap();
            assert_eq!(validate(&raw).unwrap().confidence, ok);
        }
    }

    #[test]
    fn non_object_fails() {
        assert!(matches!(
            validate("\"no trade\""),
            Err(ValidationFailure::Schema(_))
        ));
    }
}
