//! Authenticated Principal
//!
//! Identity of the account behind an authenticated request. Inserted
//! into request extensions by the session middleware and read by any
//! handler that needs to know who is calling.

use uuid::Uuid;

/// The account behind an authenticated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Internal account ID (never exposed in responses)
    pub account_id: Uuid,
    /// Public-facing opaque ID (safe to return to clients)
    pub public_id: String,
}

impl Principal {
    pub fn new(account_id: Uuid, public_id: impl Into<String>) -> Self {
        Self {
            account_id,
            public_id: public_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_holds_both_ids() {
        let id = Uuid::new_v4();
        let p = Principal::new(id, "pub_abc");
        assert_eq!(p.account_id, id);
        assert_eq!(p.public_id, "pub_abc");
    }
}
