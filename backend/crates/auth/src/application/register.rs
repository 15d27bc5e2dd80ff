//! Register Use Case
//!
//! Creates an account with profile and credentials. Uniqueness of
//! user name, email, and phone is enforced by the store in the same
//! transaction as the insert, so two concurrent registrations with the
//! same field cannot both succeed.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::{account::Account, credentials::Credentials, profile::Profile};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    email::Email, phone::Phone, user_name::UserName, user_password::RawPassword,
    user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

/// Registration input
pub struct RegisterInput {
    pub user_name: String,
    pub email: String,
    pub phone: String,
    pub full_name: String,
    pub password: String,
}

/// Registration output
pub struct RegisterOutput {
    /// Public ID of the new account
    pub public_id: String,
    /// Display form of the user name
    pub user_name: String,
}

/// Register use case
pub struct RegisterUseCase<A>
where
    A: AccountRepository,
{
    account_repo: Arc<A>,
    config: Arc<AuthConfig>,
}

impl<A> RegisterUseCase<A>
where
    A: AccountRepository,
{
    pub fn new(account_repo: Arc<A>, config: Arc<AuthConfig>) -> Self {
        Self {
            account_repo,
            config,
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        // Validation failures here name the offending field; duplicates
        // are reported by the repository with field-specific errors.
        let user_name =
            UserName::new(&input.user_name).map_err(|e| AuthError::Validation(e.to_string()))?;
        let email = Email::new(&input.email).map_err(|e| AuthError::Validation(e.to_string()))?;
        let phone = Phone::new(&input.phone).map_err(|e| AuthError::Validation(e.to_string()))?;

        let full_name = input.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(AuthError::Validation("Full name cannot be empty".into()));
        }

        let raw_password = RawPassword::new(input.password)
            .map_err(|e| AuthError::PasswordValidation(e.to_string()))?;
        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())?;

        let account = Account::new(user_name);
        let profile = Profile::new(account.account_id, email, phone, full_name);
        let credentials = Credentials::new(account.account_id, password_hash);

        self.account_repo
            .register(&account, &profile, &credentials)
            .await?;

        tracing::info!(
            public_id = %account.public_id,
            user_name = %account.user_name,
            "Account registered"
        );

        Ok(RegisterOutput {
            public_id: account.public_id.to_string(),
            user_name: account.user_name.original().to_string(),
        })
    }
}
