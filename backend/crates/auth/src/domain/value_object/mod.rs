//! Value Object Module

pub mod account_id;
pub mod backup_code;
pub mod email;
pub mod otp_code;
pub mod phone;
pub mod public_id;
pub mod totp_secret;
pub mod user_name;
pub mod user_password;
