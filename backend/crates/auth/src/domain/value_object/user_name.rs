//! User Name Value Object
//!
//! The user name is the public handle used for login and display.
//!
//! ## Invariants
//! - Length: 3-32 characters (after normalization)
//! - ASCII only: a-z, 0-9, `_`, `.`, `-`
//! - Starts and ends with an alphanumeric or `_`
//! - No consecutive dots
//! - Contains at least one alphanumeric character
//! - Not a reserved word (route names, role names)
//!
//! Case is preserved for display; uniqueness uses the lowercase
//! canonical form. NFKC normalization runs before validation so that
//! full-width input collides with its ASCII equivalent.

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Minimum length for user name (in characters)
pub const USER_NAME_MIN_LENGTH: usize = 3;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 32;

/// Allowed special characters in user name
const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '-'];

/// Names that collide with routes or operational roles
const RESERVED_WORDS: &[&str] = &[
    "admin",
    "administrator",
    "root",
    "system",
    "support",
    "help",
    "api",
    "auth",
    "login",
    "logout",
    "register",
    "password",
    "reset",
    "verify",
    "account",
    "accounts",
    "profile",
    "settings",
    "dashboard",
    "links",
    "link",
    "go",
    "redirect",
    "short",
    "www",
    "mail",
    "test",
    "demo",
    "null",
    "undefined",
    "anonymous",
    "guest",
    "me",
    "self",
    "new",
    "edit",
    "delete",
    "official",
    "bot",
];

/// Error returned when user name validation fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    /// User name is empty after normalization
    Empty,

    /// User name is too short
    TooShort { length: usize, min: usize },

    /// User name is too long
    TooLong { length: usize, max: usize },

    /// User name contains invalid character
    InvalidCharacter { char: char, position: usize },

    /// User name starts with invalid character (must be alphanumeric or _)
    InvalidStart { char: char },

    /// User name ends with invalid character (must be alphanumeric or _)
    InvalidEnd { char: char },

    /// User name contains consecutive dots (..)
    ConsecutiveDots,

    /// User name contains no alphanumeric characters
    NoAlphanumeric,

    /// User name is a reserved word
    Reserved { word: String },
}

impl fmt::Display for UserNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "User name cannot be empty"),
            Self::TooShort { length, min } => {
                write!(f, "User name is too short ({length} chars, minimum {min})")
            }
            Self::TooLong { length, max } => {
                write!(f, "User name is too long ({length} chars, maximum {max})")
            }
            Self::InvalidCharacter { char, position } => {
                write!(
                    f,
                    "Invalid character '{char}' at position {position}. Only a-z, 0-9, _, ., - are allowed"
                )
            }
            Self::InvalidStart { char } => {
                write!(
                    f,
                    "User name cannot start with '{char}'. Must start with a-z, 0-9, or _"
                )
            }
            Self::InvalidEnd { char } => {
                write!(
                    f,
                    "User name cannot end with '{char}'. Must end with a-z, 0-9, or _"
                )
            }
            Self::ConsecutiveDots => {
                write!(f, "User name cannot contain consecutive dots (..)")
            }
            Self::NoAlphanumeric => {
                write!(f, "User name must contain at least one letter or digit")
            }
            Self::Reserved { word } => {
                write!(f, "'{word}' is a reserved user name")
            }
        }
    }
}

impl std::error::Error for UserNameError {}

/// Validated, normalized user name
///
/// # Storage
/// - `original`: The user's input (trimmed, NFKC normalized, preserves case)
/// - `canonical`: Lowercase form for uniqueness checks
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName {
    original: String,
    canonical: String,
}

impl UserName {
    /// Create a new UserName from raw input
    ///
    /// Applies NFKC normalization and trim, then validates the lowercase
    /// canonical form.
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let original: String = input.as_ref().nfkc().collect::<String>().trim().to_string();
        let canonical = original.to_lowercase();
        Self::validate(&canonical)?;
        Ok(Self {
            original,
            canonical,
        })
    }

    /// Get the original user name (preserves case)
    #[inline]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Get the canonical (lowercase) user name
    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Alias for canonical() for compatibility
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Create from database values (assumes already validated)
    pub fn from_db(original: &str) -> Self {
        Self {
            original: original.to_string(),
            canonical: original.to_lowercase(),
        }
    }

    fn validate(canonical: &str) -> Result<(), UserNameError> {
        if canonical.is_empty() {
            return Err(UserNameError::Empty);
        }

        let length = canonical.chars().count();
        if length < USER_NAME_MIN_LENGTH {
            return Err(UserNameError::TooShort {
                length,
                min: USER_NAME_MIN_LENGTH,
            });
        }
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        for (pos, ch) in canonical.chars().enumerate() {
            if !Self::is_valid_char(ch) {
                return Err(UserNameError::InvalidCharacter {
                    char: ch,
                    position: pos,
                });
            }
        }

        // chars() is non-empty here, checked above
        if let Some(first) = canonical.chars().next() {
            if !Self::is_valid_start_end_char(first) {
                return Err(UserNameError::InvalidStart { char: first });
            }
        }
        if let Some(last) = canonical.chars().next_back() {
            if !Self::is_valid_start_end_char(last) {
                return Err(UserNameError::InvalidEnd { char: last });
            }
        }

        if canonical.contains("..") {
            return Err(UserNameError::ConsecutiveDots);
        }

        if !canonical.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(UserNameError::NoAlphanumeric);
        }

        if RESERVED_WORDS.iter().any(|&w| w == canonical) {
            return Err(UserNameError::Reserved {
                word: canonical.to_string(),
            });
        }

        Ok(())
    }

    #[inline]
    fn is_valid_char(c: char) -> bool {
        c.is_ascii_lowercase() || c.is_ascii_digit() || ALLOWED_SPECIAL_CHARS.contains(&c)
    }

    #[inline]
    fn is_valid_start_end_char(c: char) -> bool {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserName")
            .field("original", &self.original)
            .field("canonical", &self.canonical)
            .finish()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.canonical
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_and_lowercase() {
        let name = UserName::new("  AlIcE_123  ").unwrap();
        assert_eq!(name.canonical(), "alice_123");
        assert_eq!(name.original(), "AlIcE_123");
    }

    #[test]
    fn test_nfkc_normalization() {
        // Full-width 'Ａ' (U+FF21) collides with ASCII 'a'
        let name = UserName::new("Ａlice").unwrap();
        assert_eq!(name.canonical(), "alice");
    }

    #[test]
    fn test_length_bounds() {
        assert!(matches!(UserName::new(""), Err(UserNameError::Empty)));
        assert!(matches!(
            UserName::new("ab"),
            Err(UserNameError::TooShort { length: 2, min: 3 })
        ));
        assert!(UserName::new("abc").is_ok());
        assert!(UserName::new("a".repeat(USER_NAME_MAX_LENGTH)).is_ok());
        assert!(matches!(
            UserName::new("a".repeat(USER_NAME_MAX_LENGTH + 1)),
            Err(UserNameError::TooLong { .. })
        ));
    }

    #[test]
    fn test_allowed_characters() {
        assert!(UserName::new("alice123").is_ok());
        assert!(UserName::new("alice_bob").is_ok());
        assert!(UserName::new("alice.bob").is_ok());
        assert!(UserName::new("alice-bob").is_ok());
        assert!(matches!(
            UserName::new("alice@bob"),
            Err(UserNameError::InvalidCharacter { char: '@', .. })
        ));
        assert!(matches!(
            UserName::new("日本語"),
            Err(UserNameError::InvalidCharacter { .. })
        ));
    }

    #[test]
    fn test_start_end_rules() {
        assert!(UserName::new("_alice").is_ok());
        assert!(matches!(
            UserName::new(".alice"),
            Err(UserNameError::InvalidStart { char: '.' })
        ));
        assert!(matches!(
            UserName::new("alice-"),
            Err(UserNameError::InvalidEnd { char: '-' })
        ));
    }

    #[test]
    fn test_consecutive_dots() {
        assert!(matches!(
            UserName::new("alice..bob"),
            Err(UserNameError::ConsecutiveDots)
        ));
        assert!(UserName::new("alice.bob.c").is_ok());
    }

    #[test]
    fn test_symbols_only_fails() {
        assert!(matches!(
            UserName::new("___"),
            Err(UserNameError::NoAlphanumeric)
        ));
    }

    #[test]
    fn test_reserved_words() {
        assert!(matches!(
            UserName::new("admin"),
            Err(UserNameError::Reserved { word }) if word == "admin"
        ));
        assert!(matches!(
            UserName::new("ADMIN"),
            Err(UserNameError::Reserved { .. })
        ));
        assert!(UserName::new("alice").is_ok());
    }

    #[test]
    fn test_case_insensitive_collision() {
        let a = UserName::new("Alice").unwrap();
        let b = UserName::new("aLiCe").unwrap();
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn test_serde_roundtrip() {
        let name = UserName::new("Alice").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"Alice\"");

        let back: UserName = serde_json::from_str("\"ALICE\"").unwrap();
        assert_eq!(back.canonical(), "alice");

        let bad: Result<UserName, _> = serde_json::from_str("\"ab\"");
        assert!(bad.is_err());
    }
}
