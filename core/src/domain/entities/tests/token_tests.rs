//! Unit tests for token entities

use chrono::{TimeZone, Utc};
use crate::domain::entities::token::{TokenKind, TokenPayload};

#[test]
fn test_payload_wire_names() {
    let expires_at = Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap();
    let payload = TokenPayload::new(42, TokenKind::Refresh, expires_at, "n".repeat(32));

    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json["uid"], 42);
    assert_eq!(json["type"], "refresh");
    assert_eq!(json["exp"], expires_at.timestamp());
    assert_eq!(json["rand"].as_str().unwrap().len(), 32);
}

#[test]
fn test_expiry_is_strict() {
    let payload = TokenPayload {
        uid: 1,
        kind: TokenKind::Access,
        exp: 1_000,
        rand: "x".repeat(32),
    };

    assert!(!payload.is_expired_at(999));
    assert!(!payload.is_expired_at(1_000));
    assert!(payload.is_expired_at(1_001));
}

#[test]
fn test_kind_names() {
    assert_eq!(TokenKind::Access.to_string(), "access");
    assert_eq!(TokenKind::Refresh.as_str(), "refresh");
    assert_eq!(TokenKind::ALL.len(), 2);
}
