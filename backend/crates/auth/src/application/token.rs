//! Signed Tokens
//!
//! HMAC-SHA256 signed tokens handed to clients:
//! - session token: `{session_id}.{signature}` stored in the cookie
//! - reset token: `{account_id}.{expires_ms}.{signature}` issued after
//!   a reset OTP is verified, consumed when the password is replaced
//!
//! Tokens carry no secret state; the database row is the source of
//! truth for sessions, and reset tokens expire on their own.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

fn sign(secret: &[u8], payload: &str) -> AuthResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AuthError::Internal(format!("HMAC key error: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}

fn verify_signature(secret: &[u8], payload: &str, signature_b64: &str) -> bool {
    let Ok(expected) = sign(secret, payload) else {
        return false;
    };
    platform::crypto::constant_time_eq(expected.as_bytes(), signature_b64.as_bytes())
}

/// Generate a signed session token
pub fn sign_session_token(secret: &[u8], session_id: Uuid) -> AuthResult<String> {
    let session_id = session_id.to_string();
    let signature = sign(secret, &session_id)?;
    Ok(format!("{}.{}", session_id, signature))
}

/// Parse and verify a session token, returning the session ID
pub fn parse_session_token(secret: &[u8], token: &str) -> AuthResult<Uuid> {
    let (session_id, signature) = token
        .split_once('.')
        .ok_or(AuthError::SessionInvalid)?;

    if !verify_signature(secret, session_id, signature) {
        return Err(AuthError::SessionInvalid);
    }

    Uuid::parse_str(session_id).map_err(|_| AuthError::SessionInvalid)
}

/// Generate a signed, short-lived password reset token
pub fn sign_reset_token(secret: &[u8], account_id: Uuid, expires_at_ms: i64) -> AuthResult<String> {
    let payload = format!("reset:{}:{}", account_id, expires_at_ms);
    let signature = sign(secret, &payload)?;
    Ok(format!("{}.{}.{}", account_id, expires_at_ms, signature))
}

/// Parse and verify a reset token, returning the account ID
///
/// Rejects both tampered and expired tokens with the same error.
pub fn parse_reset_token(secret: &[u8], token: &str) -> AuthResult<Uuid> {
    let mut parts = token.splitn(3, '.');
    let (Some(account_id), Some(expires_ms), Some(signature)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return Err(AuthError::InvalidOrExpiredOtp);
    };

    let payload = format!("reset:{}:{}", account_id, expires_ms);
    if !verify_signature(secret, &payload, signature) {
        return Err(AuthError::InvalidOrExpiredOtp);
    }

    let expires_at_ms: i64 = expires_ms
        .parse()
        .map_err(|_| AuthError::InvalidOrExpiredOtp)?;
    if Utc::now().timestamp_millis() > expires_at_ms {
        return Err(AuthError::InvalidOrExpiredOtp);
    }

    Uuid::parse_str(account_id).map_err(|_| AuthError::InvalidOrExpiredOtp)
}
