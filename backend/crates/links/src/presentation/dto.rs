//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::domain::entities::ShortLink;

/// Create link request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    /// Caller-chosen key; omitted for a generated one
    pub custom_key: Option<String>,
    pub target_url: String,
    /// Optional expiry (Unix timestamp ms)
    pub expires_at_ms: Option<i64>,
}

/// Update link request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLinkRequest {
    pub target_url: Option<String>,
    pub expires_at_ms: Option<i64>,
    #[serde(default)]
    pub clear_expiry: bool,
}

/// Link response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub link_id: String,
    pub short_key: String,
    pub target_url: String,
    pub clicks: i64,
    pub expires_at_ms: Option<i64>,
    pub created_at_ms: i64,
}

impl From<ShortLink> for LinkResponse {
    fn from(link: ShortLink) -> Self {
        Self {
            link_id: link.link_id.to_string(),
            short_key: link.short_key.into_db(),
            target_url: link.target_url.into_db(),
            clicks: link.clicks,
            expires_at_ms: link.expires_at.map(|t| t.timestamp_millis()),
            created_at_ms: link.created_at.timestamp_millis(),
        }
    }
}

/// List links response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLinksResponse {
    pub links: Vec<LinkResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_camel_case() {
        let json = r#"{"customKey": "promo", "targetUrl": "https://example.com", "expiresAtMs": 123}"#;
        let req: CreateLinkRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.custom_key.as_deref(), Some("promo"));
        assert_eq!(req.expires_at_ms, Some(123));
    }

    #[test]
    fn test_update_request_defaults() {
        let json = r#"{}"#;
        let req: UpdateLinkRequest = serde_json::from_str(json).unwrap();
        assert!(req.target_url.is_none());
        assert!(req.expires_at_ms.is_none());
        assert!(!req.clear_expiry);
    }
}
