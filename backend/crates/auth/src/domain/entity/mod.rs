//! Entity Module

pub mod account;
pub mod auth_session;
pub mod credentials;
pub mod pending_login;
pub mod profile;
pub mod reset_otp;
pub mod two_factor;
