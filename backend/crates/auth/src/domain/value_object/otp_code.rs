//! OTP Code Value Object
//!
//! Six-digit numeric code used for password reset. Delivered out of
//! band and valid for a short window.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of digits in a reset OTP
pub const OTP_CODE_LENGTH: usize = 6;

/// Six-digit password reset code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OtpCode(String);

impl OtpCode {
    /// Generate a random 6-digit code (zero-padded)
    pub fn generate() -> Self {
        let n: u32 = rand::rng().random_range(0..1_000_000);
        Self(format!("{:06}", n))
    }

    /// Create from stored value
    pub fn from_db(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Validate the shape of user-supplied input
    pub fn is_well_formed(input: &str) -> bool {
        input.len() == OTP_CODE_LENGTH && input.chars().all(|c| c.is_ascii_digit())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_db(self) -> String {
        self.0
    }
}

impl std::fmt::Display for OtpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
