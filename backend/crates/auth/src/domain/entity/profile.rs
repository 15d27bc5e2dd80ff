//! Profile Entity
//!
//! Contact details for an account. Email and phone are unique across
//! all accounts; email is the delivery target for reset OTPs.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{account_id::AccountId, email::Email, phone::Phone};

/// Profile entity
#[derive(Debug, Clone)]
pub struct Profile {
    /// Reference to Account
    pub account_id: AccountId,
    /// Email address (unique)
    pub email: Email,
    /// Phone number (unique)
    pub phone: Phone,
    /// Display name
    pub full_name: String,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Create a new profile
    pub fn new(account_id: AccountId, email: Email, phone: Phone, full_name: String) -> Self {
        let now = Utc::now();
        Self {
            account_id,
            email,
            phone,
            full_name,
            created_at: now,
            updated_at: now,
        }
    }
}
