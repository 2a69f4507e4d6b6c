//! Common validation and log-masking helpers

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// Number of leading token characters kept when logging
const VISIBLE_TOKEN_CHARS: usize = 8;

/// Check if an email address is syntactically valid
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 255 && EMAIL_REGEX.is_match(email)
}

/// Shorten a bearer token for log output so the full secret never hits the logs
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(VISIBLE_TOKEN_CHARS).collect();
    if visible.len() < token.len() {
        format!("{}...", visible)
    } else {
        "***".to_string()
    }
}
