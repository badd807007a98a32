//! Integration tests for domain payloads
//!
//! Covers the JSON shapes the panel exchanges with the application layer:
//! insertion requests coming in, notifications and errors going out.

use glyphbridge_domain::{
    Config, GlyphBridgeError, GlyphInsertRequest, Notification, NotificationAction,
    NotificationLevel, OperationKey,
};

/// Test a panel request decoded from camelCase JSON
#[test]
fn test_glyph_request_from_panel_json() {
    let request: GlyphInsertRequest =
        serde_json::from_str(r#"{"glyph":"arrow-right","fontFamily":"Glyphs Pro","size":24.0}"#)
            .expect("request parses");

    assert!(request.validate().is_ok());
    assert_eq!(request.font_family.as_deref(), Some("Glyphs Pro"));
    assert_eq!(request.operation_key(), OperationKey::scoped("insert_glyph", "arrow-right"));
}

/// Test a failure toast serialized for the panel
///
/// Scenario: an insertion exhausted its retries and the panel must render a
/// manual retry button bound to the same operation key.
#[test]
fn test_failure_toast_payload() {
    let key = OperationKey::insert_glyph("star");
    let toast = Notification::new(NotificationLevel::Error, "Operation failed", "host busy")
        .for_operation(key)
        .with_manual_retry();

    let json = serde_json::to_value(&toast).expect("toast serializes");
    assert_eq!(json["level"], "error");
    assert_eq!(json["operation"], "insert_glyph:star");
    assert_eq!(json["action"]["kind"], "manual_retry");
    assert_eq!(json["action"]["operation"], "insert_glyph:star");

    let back: Notification = serde_json::from_value(json).expect("toast deserializes");
    assert!(matches!(back.action, Some(NotificationAction::ManualRetry { .. })));
}

/// Test that errors survive a JSON round trip with their fields intact
#[test]
fn test_error_payload_round_trip() {
    let err = GlyphBridgeError::CircuitOpen {
        operation: "evaluate_script".to_string(),
        retry_after_ms: Some(12_000),
    };

    let json = serde_json::to_string(&err).expect("error serializes");
    let back: GlyphBridgeError = serde_json::from_str(&json).expect("error deserializes");
    assert_eq!(back, err);
    assert!(back.offers_manual_retry());
}

/// Test a TOML document covering every section
#[test]
fn test_config_from_full_toml() {
    let config: Config = toml::from_str(
        r#"
[retry]
max_retries = 5
base_delay_ms = 250
max_delay_ms = 4000
backoff_multiplier = 2.0
classifier = "transient"
notify_on_retry = false

[circuit]
enabled = true
failure_threshold = 3
reset_timeout_ms = 15000
half_open_policy = "reopen_immediately"

[bridge]
timeout_ms = 2500

[logging]
level = "debug"
format = "json"
"#,
    )
    .expect("config parses");

    assert!(config.validate().is_ok());
    assert_eq!(config.retry.max_retries, 5);
    assert!(!config.retry.notify_on_retry);
    assert_eq!(config.circuit.failure_threshold, 3);
    assert_eq!(config.bridge.timeout_ms, 2_500);
    assert_eq!(config.logging.format.to_string(), "json");
}
