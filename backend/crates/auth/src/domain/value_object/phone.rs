//! Phone Value Object
//!
//! Validated phone number in a loose E.164-style form. Input may contain
//! spaces, hyphens, and parentheses; the stored form keeps only digits
//! plus an optional leading `+`. Uniqueness checks use the stored form.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Minimum digit count after normalization
const PHONE_MIN_DIGITS: usize = 7;

/// Maximum digit count after normalization (E.164 allows 15, be lenient)
const PHONE_MAX_DIGITS: usize = 17;

/// Phone number value object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phone(String);

impl Phone {
    /// Create a new phone number with validation and normalization
    pub fn new(phone: impl Into<String>) -> AppResult<Self> {
        let raw = phone.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(AppError::bad_request("Phone number cannot be empty"));
        }

        let has_plus = trimmed.starts_with('+');
        let mut digits = String::new();

        for (pos, ch) in trimmed.chars().enumerate() {
            match ch {
                '0'..='9' => digits.push(ch),
                '+' if pos == 0 => {}
                ' ' | '-' | '(' | ')' | '.' => {}
                _ => {
                    return Err(AppError::bad_request(format!(
                        "Phone number contains invalid character '{}'",
                        ch
                    )));
                }
            }
        }

        let count = digits.len();
        if count < PHONE_MIN_DIGITS {
            return Err(AppError::bad_request(format!(
                "Phone number must have at least {} digits",
                PHONE_MIN_DIGITS
            )));
        }
        if count > PHONE_MAX_DIGITS {
            return Err(AppError::bad_request(format!(
                "Phone number must have at most {} digits",
                PHONE_MAX_DIGITS
            )));
        }

        let normalized = if has_plus {
            format!("+{}", digits)
        } else {
            digits
        };

        Ok(Self(normalized))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(phone: impl Into<String>) -> Self {
        Self(phone.into())
    }

    /// Get the normalized phone number
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to string for database storage
    pub fn into_db(self) -> String {
        self.0
    }
}

impl FromStr for Phone {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Phone::new(s)
    }
}

impl std::fmt::Display for Phone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_valid() {
        assert!(Phone::new("+81 90-1234-5678").is_ok());
        assert!(Phone::new("(555) 123-4567").is_ok());
        assert!(Phone::new("5551234567").is_ok());
    }

    #[test]
    fn test_phone_normalization() {
        let phone = Phone::new("+1 (555) 123-4567").unwrap();
        assert_eq!(phone.as_str(), "+15551234567");

        let phone = Phone::new("090-1234-5678").unwrap();
        assert_eq!(phone.as_str(), "09012345678");
    }

    #[test]
    fn test_phone_invalid() {
        assert!(Phone::new("").is_err());
        assert!(Phone::new("12345").is_err()); // too short
        assert!(Phone::new("123456789012345678901").is_err()); // too long
        assert!(Phone::new("555-CALL-NOW").is_err()); // letters
        assert!(Phone::new("555+123+4567").is_err()); // plus not leading
    }

    #[test]
    fn test_same_number_different_formatting_collides() {
        let a = Phone::new("+1 555 123 4567").unwrap();
        let b = Phone::new("+1(555)123-4567").unwrap();
        assert_eq!(a, b);
    }
}
