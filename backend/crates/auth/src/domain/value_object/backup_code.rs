//! Backup Code Value Object
//!
//! Single-use recovery codes issued when 2FA is enabled. Each code is
//! an 8-character alphanumeric string, shown to the user exactly once
//! and consumed atomically on use.

use rand::{Rng, distr::Alphanumeric};
use serde::{Deserialize, Serialize};

/// Number of backup codes issued per enrollment
pub const BACKUP_CODE_COUNT: usize = 10;

/// Length of each backup code
pub const BACKUP_CODE_LENGTH: usize = 8;

/// A single backup code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackupCode(String);

impl BackupCode {
    /// Generate a single random backup code
    pub fn generate() -> Self {
        let code: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(BACKUP_CODE_LENGTH)
            .map(char::from)
            .collect();
        Self(code)
    }

    /// Generate a fresh batch of backup codes
    pub fn generate_batch() -> Vec<Self> {
        (0..BACKUP_CODE_COUNT).map(|_| Self::generate()).collect()
    }

    /// Create from stored value (assumed already generated here)
    pub fn from_db(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Normalize user input before matching (trim only; codes are
    /// case-sensitive)
    pub fn normalize_input(input: &str) -> &str {
        input.trim()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_db(self) -> String {
        self.0
    }
}

impl std::fmt::Display for BackupCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_backup_code_shape() {
        let code = BackupCode::generate();
        assert_eq!(code.as_str().len(), BACKUP_CODE_LENGTH);
        assert!(code.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_batch_size_and_uniqueness() {
        let batch = BackupCode::generate_batch();
        assert_eq!(batch.len(), BACKUP_CODE_COUNT);

        // 62^8 space, duplicates within one batch would be astonishing
        let unique: HashSet<_> = batch.iter().map(|c| c.as_str()).collect();
        assert_eq!(unique.len(), BACKUP_CODE_COUNT);
    }

    #[test]
    fn test_normalize_input() {
        assert_eq!(BackupCode::normalize_input("  Ab3dEf9h  "), "Ab3dEf9h");
    }
}
