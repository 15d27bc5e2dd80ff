//! Domain Value Objects
//!
//! Immutable value types for the link domain.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::LinkError;

/// Alphabet for generated keys: 0-9, A-Z, a-z
const KEY_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Default length of generated keys
pub const KEY_DEFAULT_LENGTH: usize = 6;
/// Maximum key length, generated or custom
pub const KEY_MAX_LENGTH: usize = 20;

/// Short key - the path segment a short link lives under
///
/// Always 1 to 20 alphanumeric characters; case-sensitive, so `Ab3`
/// and `ab3` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortKey(String);

impl ShortKey {
    /// Generate a random key of the default length
    pub fn generate() -> Self {
        Self::generate_with_length(KEY_DEFAULT_LENGTH)
    }

    /// Generate a random key of the given length (capped at the max)
    pub fn generate_with_length(length: usize) -> Self {
        let length = length.clamp(1, KEY_MAX_LENGTH);
        let mut rng = rand::rng();
        let key: String = (0..length)
            .map(|_| KEY_ALPHABET[rng.random_range(0..KEY_ALPHABET.len())] as char)
            .collect();
        Self(key)
    }

    /// Validate a caller-chosen key
    pub fn new(input: &str) -> Result<Self, LinkError> {
        if input.is_empty() {
            return Err(LinkError::Validation("Key cannot be empty".to_string()));
        }
        if input.len() > KEY_MAX_LENGTH {
            return Err(LinkError::Validation(format!(
                "Key cannot exceed {KEY_MAX_LENGTH} characters"
            )));
        }
        if !input.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(LinkError::Validation(
                "Key may only contain letters and digits".to_string(),
            ));
        }
        Ok(Self(input.to_string()))
    }

    /// Reconstruct from a trusted database value
    pub fn from_db(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_db(self) -> String {
        self.0
    }
}

impl fmt::Display for ShortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ShortKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).map_err(|e| e.to_string())
    }
}

impl From<ShortKey> for String {
    fn from(key: ShortKey) -> Self {
        key.0
    }
}

/// Maximum accepted target URL length
pub const TARGET_URL_MAX_LENGTH: usize = 2048;

/// Target URL - where a short link redirects to
///
/// Only absolute http(s) URLs are accepted; everything else would let
/// a link smuggle `javascript:` or relative redirects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetUrl(String);

impl TargetUrl {
    pub fn new(input: &str) -> Result<Self, LinkError> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(LinkError::Validation("URL cannot be empty".to_string()));
        }
        if trimmed.len() > TARGET_URL_MAX_LENGTH {
            return Err(LinkError::Validation(format!(
                "URL cannot exceed {TARGET_URL_MAX_LENGTH} characters"
            )));
        }
        if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(LinkError::Validation(
                "URL cannot contain whitespace or control characters".to_string(),
            ));
        }

        let lower = trimmed.to_ascii_lowercase();
        let rest = lower
            .strip_prefix("https://")
            .or_else(|| lower.strip_prefix("http://"))
            .ok_or_else(|| {
                LinkError::Validation("URL must start with http:// or https://".to_string())
            })?;

        if rest.is_empty() || rest.starts_with('/') {
            return Err(LinkError::Validation("URL must have a host".to_string()));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Reconstruct from a trusted database value
    pub fn from_db(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_db(self) -> String {
        self.0
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for TargetUrl {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).map_err(|e| e.to_string())
    }
}

impl From<TargetUrl> for String {
    fn from(url: TargetUrl) -> Self {
        url.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_key_length_and_alphabet() {
        let key = ShortKey::generate();
        assert_eq!(key.as_str().len(), KEY_DEFAULT_LENGTH);
        assert!(key.as_str().bytes().all(|b| b.is_ascii_alphanumeric()));

        let long = ShortKey::generate_with_length(20);
        assert_eq!(long.as_str().len(), 20);

        // Requests beyond the max are capped
        let capped = ShortKey::generate_with_length(99);
        assert_eq!(capped.as_str().len(), KEY_MAX_LENGTH);
    }

    #[test]
    fn test_custom_key_validation() {
        assert!(ShortKey::new("abc123").is_ok());
        assert!(ShortKey::new("A").is_ok());
        assert!(ShortKey::new(&"x".repeat(20)).is_ok());

        assert!(ShortKey::new("").is_err());
        assert!(ShortKey::new(&"x".repeat(21)).is_err());
        assert!(ShortKey::new("has space").is_err());
        assert!(ShortKey::new("ha/sh").is_err());
        assert!(ShortKey::new("emoji🎉").is_err());
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let upper = ShortKey::new("Ab3").unwrap();
        let lower = ShortKey::new("ab3").unwrap();
        assert_ne!(upper, lower);
    }

    #[test]
    fn test_target_url_accepts_http_and_https() {
        assert!(TargetUrl::new("https://example.com/path?q=1").is_ok());
        assert!(TargetUrl::new("http://example.com").is_ok());
        assert!(TargetUrl::new("  https://example.com  ").is_ok());
    }

    #[test]
    fn test_target_url_rejects_other_schemes() {
        assert!(TargetUrl::new("ftp://example.com").is_err());
        assert!(TargetUrl::new("javascript:alert(1)").is_err());
        assert!(TargetUrl::new("//example.com").is_err());
        assert!(TargetUrl::new("example.com").is_err());
        assert!(TargetUrl::new("").is_err());
        assert!(TargetUrl::new("https://").is_err());
        assert!(TargetUrl::new(&format!(
            "https://example.com/{}",
            "a".repeat(TARGET_URL_MAX_LENGTH)
        ))
        .is_err());
    }
}
