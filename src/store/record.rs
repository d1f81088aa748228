//! Conversion between stored documents and [`ServiceHealthState`].
//!
//! Decoding never fails: absent or wrongly-shaped fields fall back to the
//! initial-state defaults.

use crate::core::{Level, ServiceHealthState};
use serde_json::Value;

pub const SERVICE_ID_FIELD: &str = "serviceId";
pub const LEVEL_FIELD: &str = "currentLevel";
pub const ERRORS_FIELD: &str = "consecutiveErrors";
pub const HEALTHY_FIELD: &str = "consecutiveHealthy";

/// Decode the stored document for `service_id`.
///
/// The record's own `serviceId` field is ignored; the key it was stored
/// under is authoritative.
pub fn decode(service_id: &str, document: &Value) -> ServiceHealthState {
    let level = non_negative(document.get(LEVEL_FIELD))
        .and_then(|n| u8::try_from(n).ok())
        .and_then(Level::from_u8)
        .unwrap_or_default();

    ServiceHealthState {
        service_id: service_id.to_string(),
        current_level: level,
        consecutive_errors: counter(document.get(ERRORS_FIELD)),
        consecutive_healthy: counter(document.get(HEALTHY_FIELD)),
    }
}

/// Encode the full record for an overwrite.
pub fn encode(state: &ServiceHealthState) -> Value {
    serde_json::json!({
        SERVICE_ID_FIELD: state.service_id,
        LEVEL_FIELD: state.current_level.as_u8(),
        ERRORS_FIELD: state.consecutive_errors,
        HEALTHY_FIELD: state.consecutive_healthy,
    })
}

fn counter(value: Option<&Value>) -> u32 {
    non_negative(value)
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

// Integral numbers only; `3.0` is accepted because some stores only keep floats.
fn non_negative(value: Option<&Value>) -> Option<u64> {
    let value = value?;
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_complete_record() {
        let state = decode(
            "core-system",
            &json!({
                "serviceId": "core-system",
                "currentLevel": 2,
                "consecutiveErrors": 3,
                "consecutiveHealthy": 0,
            }),
        );

        assert_eq!(state.current_level, Level::Limited);
        assert_eq!(state.consecutive_errors, 3);
        assert_eq!(state.consecutive_healthy, 0);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let state = decode("core-system", &json!({ "currentLevel": 3 }));
        assert_eq!(state.current_level, Level::Minimal);
        assert_eq!(state.consecutive_errors, 0);
        assert_eq!(state.consecutive_healthy, 0);

        let empty = decode("core-system", &json!({}));
        assert_eq!(empty, ServiceHealthState::new("core-system"));
    }

    #[test]
    fn wrongly_shaped_fields_use_defaults() {
        let state = decode(
            "svc",
            &json!({
                "currentLevel": 7,
                "consecutiveErrors": "four",
                "consecutiveHealthy": -2,
            }),
        );
        assert_eq!(state, ServiceHealthState::new("svc"));

        let not_an_object = decode("svc", &json!([1, 2, 3]));
        assert_eq!(not_an_object, ServiceHealthState::new("svc"));
    }

    #[test]
    fn integral_floats_are_accepted() {
        let state = decode("svc", &json!({ "currentLevel": 2.0, "consecutiveErrors": 4.0 }));
        assert_eq!(state.current_level, Level::Limited);
        assert_eq!(state.consecutive_errors, 4);

        let fractional = decode("svc", &json!({ "consecutiveErrors": 4.5 }));
        assert_eq!(fractional.consecutive_errors, 0);
    }

    #[test]
    fn oversized_counters_saturate() {
        let state = decode("svc", &json!({ "consecutiveHealthy": u64::MAX }));
        assert_eq!(state.consecutive_healthy, u32::MAX);
    }

    #[test]
    fn stored_service_id_is_ignored() {
        let state = decode("core-system", &json!({ "serviceId": "other" }));
        assert_eq!(state.service_id, "core-system");
    }

    #[test]
    fn encode_then_decode_is_identity() {
        let state = ServiceHealthState {
            service_id: "svc".to_string(),
            current_level: Level::Minimal,
            consecutive_errors: 0,
            consecutive_healthy: 9,
        };
        assert_eq!(decode("svc", &encode(&state)), state);
    }
}
