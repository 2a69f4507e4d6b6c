//! Opaque token encoding
//!
//! A token is the standard-base64 encoding of the JSON payload. The encoding is
//! reversible and unsigned: nothing in the string itself proves it was minted here.
//! Liveness is established only by membership in the user's token bucket.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{distributions::Alphanumeric, Rng};
use serde_json::json;

use crate::domain::entities::token::TokenPayload;
use crate::errors::TokenError;

/// Encoder/decoder for opaque token strings
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCodec;

impl TokenCodec {
    /// Encode a payload into a header-safe opaque string
    pub fn encode(payload: &TokenPayload) -> String {
        let body = json!({
            "uid": payload.uid,
            "type": payload.kind.as_str(),
            "exp": payload.exp,
            "rand": payload.rand,
        });
        STANDARD.encode(body.to_string())
    }

    /// Decode an opaque string back into its payload
    ///
    /// Never panics. Anything that is not base64 of a JSON object carrying all four
    /// fields with a recognised `type` is [`TokenError::MalformedToken`].
    pub fn decode(token: &str) -> Result<TokenPayload, TokenError> {
        let bytes = STANDARD
            .decode(token.as_bytes())
            .map_err(|_| TokenError::MalformedToken)?;
        serde_json::from_slice::<TokenPayload>(&bytes).map_err(|_| TokenError::MalformedToken)
    }
}

/// Random alphanumeric nonce of `length` characters
pub fn generate_nonce(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
