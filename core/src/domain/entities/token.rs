//! Token entities for opaque session tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which bucket a token belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived credential for ordinary API calls
    Access,
    /// Longer-lived, one-time-use credential that mints a new pair
    Refresh,
}

impl TokenKind {
    /// Both kinds, in the order buckets are cleared
    pub const ALL: [TokenKind; 2] = [TokenKind::Access, TokenKind::Refresh];

    /// Wire name used in payloads and bucket keys
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data embedded inside every opaque token string.
///
/// Field names are the wire names: `{"uid":..,"type":..,"exp":..,"rand":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Owning user id
    pub uid: i64,

    /// Token kind
    #[serde(rename = "type")]
    pub kind: TokenKind,

    /// Expiry, seconds since the Unix epoch
    pub exp: i64,

    /// Random nonce keeping tokens minted in the same second distinct
    pub rand: String,
}

impl TokenPayload {
    /// Creates a payload expiring at `expires_at`
    pub fn new(
        user_id: i64,
        kind: TokenKind,
        expires_at: DateTime<Utc>,
        nonce: impl Into<String>,
    ) -> Self {
        Self {
            uid: user_id,
            kind,
            exp: expires_at.timestamp(),
            rand: nonce.into(),
        }
    }

    /// A token is expired once `exp` lies strictly in the past
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp < now
    }
}

/// Access and refresh token issued together at login or rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Live tokens of a user, oldest first within each kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTokens {
    pub access_tokens: Vec<String>,
    pub refresh_tokens: Vec<String>,
}
