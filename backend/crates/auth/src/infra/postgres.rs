//! PostgreSQL Repository Implementations

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    account::Account,
    auth_session::AuthSession,
    credentials::Credentials,
    pending_login::PendingLogin,
    profile::Profile,
    reset_otp::{OTP_VALID_MINUTES, ResetOtp},
    two_factor::{TwoFactor, TwoFactorSetup},
};
use crate::domain::repository::{
    AccountRepository, CredentialsRepository, PendingLoginRepository, ProfileRepository,
    ResetOtpRepository, SessionRepository, TwoFactorRepository,
};
use crate::domain::value_object::{
    account_id::AccountId, backup_code::BackupCode, email::Email, phone::Phone,
    public_id::PublicId, totp_secret::TotpSecret, user_name::UserName, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clean up expired sessions, pending logins, and stale OTPs
    pub async fn cleanup_expired_all(&self) -> AuthResult<u64> {
        let sessions = SessionRepository::cleanup_expired(self).await?;
        let pending = PendingLoginRepository::cleanup_expired(self).await?;
        let otps = ResetOtpRepository::cleanup_expired(self).await?;

        tracing::info!(
            sessions_deleted = sessions,
            pending_deleted = pending,
            otps_deleted = otps,
            "Cleaned up expired auth records"
        );

        Ok(sessions + pending + otps)
    }

    /// Map a unique-violation on registration to a field-specific error
    fn map_register_error(e: sqlx::Error) -> AuthError {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some("23505") {
                return match db_err.constraint() {
                    Some("accounts_user_name_canonical_key") => AuthError::DuplicateUserName,
                    Some("profiles_email_key") => AuthError::DuplicateEmail,
                    Some("profiles_phone_key") => AuthError::DuplicatePhone,
                    _ => AuthError::Database(e),
                };
            }
        }
        AuthError::Database(e)
    }
}

// ============================================================================
// Account Repository Implementation
// ============================================================================

impl AccountRepository for PgAuthRepository {
    async fn register(
        &self,
        account: &Account,
        profile: &Profile,
        credentials: &Credentials,
    ) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO accounts (
                account_id,
                public_id,
                user_name,
                user_name_canonical,
                last_login_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.public_id.as_str())
        .bind(account.user_name.original())
        .bind(account.user_name.canonical())
        .bind(account.last_login_at)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(Self::map_register_error)?;

        sqlx::query(
            r#"
            INSERT INTO profiles (
                account_id,
                email,
                phone,
                full_name,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(profile.account_id.as_uuid())
        .bind(profile.email.as_str())
        .bind(profile.phone.as_str())
        .bind(&profile.full_name)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(Self::map_register_error)?;

        sqlx::query(
            r#"
            INSERT INTO credentials (
                account_id,
                password_hash,
                login_failed_count,
                last_failed_at,
                locked_until,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(credentials.account_id.as_uuid())
        .bind(credentials.password_hash.as_phc_string())
        .bind(credentials.login_failed_count as i16)
        .bind(credentials.last_failed_at)
        .bind(credentials.locked_until)
        .bind(credentials.created_at)
        .bind(credentials.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                account_id,
                public_id,
                user_name,
                user_name_canonical,
                last_login_at,
                created_at,
                updated_at
            FROM accounts
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                account_id,
                public_id,
                user_name,
                user_name_canonical,
                last_login_at,
                created_at,
                updated_at
            FROM accounts
            WHERE user_name_canonical = $1
            "#,
        )
        .bind(user_name.canonical())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn update(&self, account: &Account) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE accounts SET
                user_name = $2,
                user_name_canonical = $3,
                last_login_at = $4,
                updated_at = $5
            WHERE account_id = $1
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.user_name.original())
        .bind(account.user_name.canonical())
        .bind(account.last_login_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Profile Repository Implementation
// ============================================================================

impl ProfileRepository for PgAuthRepository {
    async fn find_by_account_id(&self, account_id: &AccountId) -> AuthResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT
                account_id,
                email,
                phone,
                full_name,
                created_at,
                updated_at
            FROM profiles
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_profile()))
    }

    async fn find_account_id_by_email(&self, email: &Email) -> AuthResult<Option<AccountId>> {
        let account_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT account_id FROM profiles WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(account_id.map(AccountId::from_uuid))
    }
}

// ============================================================================
// Credentials Repository Implementation
// ============================================================================

impl CredentialsRepository for PgAuthRepository {
    async fn find_by_account_id(&self, account_id: &AccountId) -> AuthResult<Option<Credentials>> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r#"
            SELECT
                account_id,
                password_hash,
                login_failed_count,
                last_failed_at,
                locked_until,
                created_at,
                updated_at
            FROM credentials
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_credentials()).transpose()
    }

    async fn update(&self, credentials: &Credentials) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE credentials SET
                password_hash = $2,
                login_failed_count = $3,
                last_failed_at = $4,
                locked_until = $5,
                updated_at = $6
            WHERE account_id = $1
            "#,
        )
        .bind(credentials.account_id.as_uuid())
        .bind(credentials.password_hash.as_phc_string())
        .bind(credentials.login_failed_count as i16)
        .bind(credentials.last_failed_at)
        .bind(credentials.locked_until)
        .bind(credentials.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Two-Factor Repository Implementation
// ============================================================================

impl TwoFactorRepository for PgAuthRepository {
    async fn find_by_account_id(&self, account_id: &AccountId) -> AuthResult<Option<TwoFactor>> {
        let row = sqlx::query_as::<_, TwoFactorRow>(
            r#"
            SELECT
                account_id,
                secret_base32,
                backup_codes,
                created_at,
                updated_at
            FROM two_factor
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_two_factor()).transpose()
    }

    async fn enable(&self, state: &TwoFactor) -> AuthResult<()> {
        let codes: Vec<String> = state
            .backup_codes
            .iter()
            .map(|c| c.as_str().to_string())
            .collect();

        sqlx::query(
            r#"
            INSERT INTO two_factor (
                account_id,
                secret_base32,
                backup_codes,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (account_id) DO UPDATE SET
                secret_base32 = EXCLUDED.secret_base32,
                backup_codes = EXCLUDED.backup_codes,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(state.account_id.as_uuid())
        .bind(state.secret.as_base32())
        .bind(&codes)
        .bind(state.created_at)
        .bind(state.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn disable(&self, account_id: &AccountId) -> AuthResult<()> {
        // Single statement clears secret and remaining codes together
        sqlx::query("DELETE FROM two_factor WHERE account_id = $1")
            .bind(account_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn consume_backup_code(&self, account_id: &AccountId, code: &str) -> AuthResult<bool> {
        // The predicate and the removal run in one statement, so two
        // logins racing on the same code cannot both succeed
        let updated = sqlx::query(
            r#"
            UPDATE two_factor SET
                backup_codes = array_remove(backup_codes, $2),
                updated_at = NOW()
            WHERE account_id = $1 AND $2 = ANY(backup_codes)
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(code)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated == 1)
    }

    async fn store_setup(&self, setup: &TwoFactorSetup) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO two_factor_setup (
                session_id,
                account_id,
                secret_base32,
                created_at
            ) VALUES ($1, $2, $3, $4)
            ON CONFLICT (session_id) DO UPDATE SET
                account_id = EXCLUDED.account_id,
                secret_base32 = EXCLUDED.secret_base32,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(setup.session_id)
        .bind(setup.account_id.as_uuid())
        .bind(setup.secret.as_base32())
        .bind(setup.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_setup(&self, session_id: Uuid) -> AuthResult<Option<TwoFactorSetup>> {
        let row = sqlx::query_as::<_, TwoFactorSetupRow>(
            r#"
            SELECT
                session_id,
                account_id,
                secret_base32,
                created_at
            FROM two_factor_setup
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_setup()).transpose()
    }

    async fn delete_setup(&self, session_id: Uuid) -> AuthResult<()> {
        sqlx::query("DELETE FROM two_factor_setup WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Pending Login Repository Implementation
// ============================================================================

impl PendingLoginRepository for PgAuthRepository {
    async fn create(&self, pending: &PendingLogin) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO pending_logins (
                pending_id,
                account_id,
                expires_at_ms,
                created_at
            ) VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(pending.pending_id)
        .bind(pending.account_id.as_uuid())
        .bind(pending.expires_at_ms)
        .bind(pending.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_for_account(&self, account_id: &AccountId) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM pending_logins WHERE account_id = $1")
            .bind(account_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM pending_logins WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Reset OTP Repository Implementation
// ============================================================================

impl ResetOtpRepository for PgAuthRepository {
    async fn create(&self, otp: &ResetOtp) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO password_reset_otps (
                otp_id,
                account_id,
                code,
                used,
                created_at
            ) VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(otp.otp_id.as_uuid())
        .bind(otp.account_id.as_uuid())
        .bind(otp.code.as_str())
        .bind(otp.used)
        .bind(otp.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn invalidate_outstanding(&self, account_id: &AccountId) -> AuthResult<u64> {
        let updated = sqlx::query(
            "UPDATE password_reset_otps SET used = TRUE WHERE account_id = $1 AND used = FALSE",
        )
        .bind(account_id.as_uuid())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated)
    }

    async fn consume(&self, account_id: &AccountId, code: &str) -> AuthResult<bool> {
        let window_start = Utc::now() - Duration::minutes(OTP_VALID_MINUTES);

        // Mark-used happens in the same statement as the match, so a
        // replayed code loses the race deterministically
        let updated = sqlx::query(
            r#"
            UPDATE password_reset_otps SET used = TRUE
            WHERE otp_id = (
                SELECT otp_id FROM password_reset_otps
                WHERE account_id = $1
                  AND code = $2
                  AND used = FALSE
                  AND created_at > $3
                ORDER BY created_at DESC
                LIMIT 1
            ) AND used = FALSE
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(code)
        .bind(window_start)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated == 1)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let window_start = Utc::now() - Duration::minutes(OTP_VALID_MINUTES);

        let deleted = sqlx::query("DELETE FROM password_reset_otps WHERE created_at < $1")
            .bind(window_start)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn create(&self, session: &AuthSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_sessions (
                session_id,
                account_id,
                public_id,
                expires_at_ms,
                remember_me,
                client_fingerprint_hash,
                client_ip,
                user_agent,
                created_at,
                last_activity_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(session.session_id)
        .bind(session.account_id.as_uuid())
        .bind(session.public_id.as_str())
        .bind(session.expires_at_ms)
        .bind(session.remember_me)
        .bind(&session.client_fingerprint_hash)
        .bind(&session.client_ip)
        .bind(&session.user_agent)
        .bind(session.created_at)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthSession>> {
        let now_ms = Utc::now().timestamp_millis();

        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            SELECT
                session_id,
                account_id,
                public_id,
                expires_at_ms,
                remember_me,
                client_fingerprint_hash,
                client_ip,
                user_agent,
                created_at,
                last_activity_at
            FROM auth_sessions
            WHERE session_id = $1 AND expires_at_ms > $2
            "#,
        )
        .bind(session_id)
        .bind(now_ms)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => {
                if r.client_fingerprint_hash != fingerprint_hash {
                    tracing::warn!(
                        session_id = %session_id,
                        "Auth session fingerprint mismatch"
                    );
                    return Err(AuthError::SessionFingerprintMismatch);
                }
                Ok(Some(r.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn update(&self, session: &AuthSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE auth_sessions SET
                expires_at_ms = $2,
                last_activity_at = $3
            WHERE session_id = $1
            "#,
        )
        .bind(session.session_id)
        .bind(session.expires_at_ms)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_all_for_account(
        &self,
        account_id: &AccountId,
        except: Option<Uuid>,
    ) -> AuthResult<u64> {
        let deleted = match except {
            Some(except_id) => {
                sqlx::query("DELETE FROM auth_sessions WHERE account_id = $1 AND session_id != $2")
                    .bind(account_id.as_uuid())
                    .bind(except_id)
                    .execute(&self.pool)
                    .await?
                    .rows_affected()
            }
            None => {
                sqlx::query("DELETE FROM auth_sessions WHERE account_id = $1")
                    .bind(account_id.as_uuid())
                    .execute(&self.pool)
                    .await?
                    .rows_affected()
            }
        };

        Ok(deleted)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    public_id: String,
    user_name: String,
    #[allow(dead_code)]
    user_name_canonical: String,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        let public_id = PublicId::parse_str(&self.public_id)
            .map_err(|e| AuthError::Internal(format!("Invalid public_id: {}", e)))?;

        Ok(Account {
            account_id: AccountId::from_uuid(self.account_id),
            public_id,
            user_name: UserName::from_db(&self.user_name),
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    account_id: Uuid,
    email: String,
    phone: String,
    full_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_profile(self) -> Profile {
        Profile {
            account_id: AccountId::from_uuid(self.account_id),
            email: Email::from_db(self.email),
            phone: Phone::from_db(self.phone),
            full_name: self.full_name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    account_id: Uuid,
    password_hash: String,
    login_failed_count: i16,
    last_failed_at: Option<DateTime<Utc>>,
    locked_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CredentialsRow {
    fn into_credentials(self) -> AuthResult<Credentials> {
        let password_hash = UserPassword::from_phc_string(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Credentials {
            account_id: AccountId::from_uuid(self.account_id),
            password_hash,
            login_failed_count: self.login_failed_count as u16,
            last_failed_at: self.last_failed_at,
            locked_until: self.locked_until,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TwoFactorRow {
    account_id: Uuid,
    secret_base32: String,
    backup_codes: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TwoFactorRow {
    fn into_two_factor(self) -> AuthResult<TwoFactor> {
        let secret = TotpSecret::from_base32(self.secret_base32)
            .map_err(|e| AuthError::Internal(format!("Invalid TOTP secret: {}", e)))?;

        Ok(TwoFactor {
            account_id: AccountId::from_uuid(self.account_id),
            secret,
            backup_codes: self.backup_codes.into_iter().map(BackupCode::from_db).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TwoFactorSetupRow {
    session_id: Uuid,
    account_id: Uuid,
    secret_base32: String,
    created_at: DateTime<Utc>,
}

impl TwoFactorSetupRow {
    fn into_setup(self) -> AuthResult<TwoFactorSetup> {
        let secret = TotpSecret::from_base32(self.secret_base32)
            .map_err(|e| AuthError::Internal(format!("Invalid TOTP secret: {}", e)))?;

        Ok(TwoFactorSetup {
            session_id: self.session_id,
            account_id: AccountId::from_uuid(self.account_id),
            secret,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuthSessionRow {
    session_id: Uuid,
    account_id: Uuid,
    public_id: String,
    expires_at_ms: i64,
    remember_me: bool,
    client_fingerprint_hash: Vec<u8>,
    client_ip: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl AuthSessionRow {
    fn into_session(self) -> AuthResult<AuthSession> {
        let public_id = PublicId::parse_str(&self.public_id)
            .map_err(|e| AuthError::Internal(format!("Invalid public_id: {}", e)))?;

        Ok(AuthSession {
            session_id: self.session_id,
            account_id: AccountId::from_uuid(self.account_id),
            public_id,
            expires_at_ms: self.expires_at_ms,
            remember_me: self.remember_me,
            client_fingerprint_hash: self.client_fingerprint_hash,
            client_ip: self.client_ip,
            user_agent: self.user_agent,
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
        })
    }
}
