//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{account::Account, auth_session::AuthSession, credentials::Credentials};
pub use repository::{
    AccountRepository, CredentialsRepository, PendingLoginRepository, ProfileRepository,
    ResetOtpRepository, SessionRepository, TwoFactorRepository,
};
