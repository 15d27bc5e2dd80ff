//! Application Layer
//!
//! Use cases and application services.

pub mod check_session;
pub mod config;
pub mod login;
pub mod logout;
pub mod notify;
pub mod password_reset;
pub mod register;
pub mod token;
pub mod totp_setup;

#[cfg(test)]
mod tests;

// Re-exports
pub use check_session::CheckSessionUseCase;
pub use config::AuthConfig;
pub use login::{ClientFingerprint, LoginInput, LoginOutput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use notify::{NotificationSender, TracingNotifier};
pub use password_reset::PasswordResetUseCase;
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use totp_setup::{TotpSetupOutput, TotpSetupUseCase};
