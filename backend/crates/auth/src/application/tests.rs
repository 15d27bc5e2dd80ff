//! Use-case tests against the in-memory repository

use std::sync::{Arc, Mutex};

use platform::client::ClientFingerprint;

use crate::application::check_session::CheckSessionUseCase;
use crate::application::config::AuthConfig;
use crate::application::login::{LoginInput, LoginUseCase};
use crate::application::notify::NotificationSender;
use crate::application::password_reset::PasswordResetUseCase;
use crate::application::register::{RegisterInput, RegisterUseCase};
use crate::application::totp_setup::TotpSetupUseCase;
use crate::domain::repository::{AccountRepository, ResetOtpRepository, TwoFactorRepository};
use crate::domain::value_object::{totp_secret::TotpSecret, user_name::UserName};
use crate::error::{AuthError, AuthResult};
use crate::infra::memory::InMemoryAuthRepository;

const PASSWORD: &str = "Sunrise#42aa";

/// Notifier that records every delivered body
#[derive(Clone, Default)]
struct CapturingNotifier {
    bodies: Arc<Mutex<Vec<String>>>,
}

impl NotificationSender for CapturingNotifier {
    async fn send(&self, _to: &str, _subject: &str, body: &str) -> AuthResult<()> {
        self.bodies.lock().unwrap().push(body.to_string());
        Ok(())
    }
}

impl CapturingNotifier {
    /// Wait for the fire-and-forget delivery task and pull the OTP
    /// out of the message body
    async fn last_code(&self) -> String {
        for _ in 0..100 {
            tokio::task::yield_now().await;
            let bodies = self.bodies.lock().unwrap();
            if let Some(body) = bodies.last() {
                return body
                    .chars()
                    .filter(|c| c.is_ascii_digit())
                    .take(6)
                    .collect();
            }
        }
        panic!("no notification delivered");
    }
}

fn test_config() -> Arc<AuthConfig> {
    Arc::new(AuthConfig::development())
}

fn fp() -> ClientFingerprint {
    ClientFingerprint::new([7u8; 32], None, Some("test-agent".to_string()))
}

fn other_fp() -> ClientFingerprint {
    ClientFingerprint::new([9u8; 32], None, Some("other-agent".to_string()))
}

fn login_use_case(
    repo: &Arc<InMemoryAuthRepository>,
    config: &Arc<AuthConfig>,
) -> LoginUseCase<
    InMemoryAuthRepository,
    InMemoryAuthRepository,
    InMemoryAuthRepository,
    InMemoryAuthRepository,
    InMemoryAuthRepository,
> {
    LoginUseCase::new(
        repo.clone(),
        repo.clone(),
        repo.clone(),
        repo.clone(),
        repo.clone(),
        config.clone(),
    )
}

fn reset_use_case(
    repo: &Arc<InMemoryAuthRepository>,
    notifier: &Arc<CapturingNotifier>,
    config: &Arc<AuthConfig>,
) -> PasswordResetUseCase<
    InMemoryAuthRepository,
    InMemoryAuthRepository,
    InMemoryAuthRepository,
    InMemoryAuthRepository,
    CapturingNotifier,
> {
    PasswordResetUseCase::new(
        repo.clone(),
        repo.clone(),
        repo.clone(),
        repo.clone(),
        notifier.clone(),
        config.clone(),
    )
}

async fn register(
    repo: &Arc<InMemoryAuthRepository>,
    config: &Arc<AuthConfig>,
    user_name: &str,
    email: &str,
    phone: &str,
) {
    RegisterUseCase::new(repo.clone(), config.clone())
        .execute(RegisterInput {
            user_name: user_name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            full_name: "Test Account".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap();
}

fn login_input(user_name: &str, password: &str, totp_code: Option<String>) -> LoginInput {
    LoginInput {
        user_name: user_name.to_string(),
        password: password.to_string(),
        remember_me: false,
        totp_code,
    }
}

/// Enable 2FA for the account and return (secret, backup codes)
async fn enable_two_factor(
    repo: &Arc<InMemoryAuthRepository>,
    user_name: &str,
) -> (TotpSecret, Vec<String>) {
    let account = repo
        .find_by_user_name(&UserName::new(user_name).unwrap())
        .await
        .unwrap()
        .unwrap();

    let use_case = TotpSetupUseCase::new(repo.clone(), repo.clone(), repo.clone());
    let session_id = uuid::Uuid::new_v4();

    let setup = use_case.begin(session_id, &account.account_id).await.unwrap();
    let secret = TotpSecret::from_base32(setup.secret).unwrap();
    let code = secret.generate_current(user_name).unwrap();

    let backup_codes = use_case
        .confirm(session_id, &account.account_id, &code)
        .await
        .unwrap();

    (
        secret,
        backup_codes
            .into_iter()
            .map(|c| c.as_str().to_string())
            .collect(),
    )
}

#[tokio::test]
async fn test_register_rejects_duplicates_per_field() {
    let repo = Arc::new(InMemoryAuthRepository::new());
    let config = test_config();
    register(&repo, &config, "alice", "alice@example.com", "+15550000001").await;

    let use_case = RegisterUseCase::new(repo.clone(), config.clone());

    let same_name = use_case
        .execute(RegisterInput {
            user_name: "Alice".to_string(), // canonicalizes to the same name
            email: "other@example.com".to_string(),
            phone: "+15550000002".to_string(),
            full_name: "Other".to_string(),
            password: PASSWORD.to_string(),
        })
        .await;
    assert!(matches!(same_name, Err(AuthError::DuplicateUserName)));

    let same_email = use_case
        .execute(RegisterInput {
            user_name: "bob".to_string(),
            email: "alice@example.com".to_string(),
            phone: "+15550000002".to_string(),
            full_name: "Other".to_string(),
            password: PASSWORD.to_string(),
        })
        .await;
    assert!(matches!(same_email, Err(AuthError::DuplicateEmail)));

    let same_phone = use_case
        .execute(RegisterInput {
            user_name: "bob".to_string(),
            email: "bob@example.com".to_string(),
            // Same digits as alice's phone, different formatting
            phone: "+1 (555) 000-0001".to_string(),
            full_name: "Other".to_string(),
            password: PASSWORD.to_string(),
        })
        .await;
    assert!(matches!(same_phone, Err(AuthError::DuplicatePhone)));
}

#[tokio::test]
async fn test_login_creates_session_bound_to_fingerprint() {
    let repo = Arc::new(InMemoryAuthRepository::new());
    let config = test_config();
    register(&repo, &config, "alice", "alice@example.com", "+15550000001").await;

    let output = login_use_case(&repo, &config)
        .execute(login_input("alice", PASSWORD, None), fp())
        .await
        .unwrap();

    assert!(!output.requires_2fa);
    assert!(!output.session_token.is_empty());

    let check = CheckSessionUseCase::new(repo.clone(), config.clone());
    let info = check.execute(&output.session_token, &fp().hash).await.unwrap();
    assert_eq!(info.public_id, output.public_id);

    // Another client cannot reuse the token
    let hijack = check.execute(&output.session_token, &other_fp().hash).await;
    assert!(hijack.is_err());
}

#[tokio::test]
async fn test_login_unknown_user_and_wrong_password_look_alike() {
    let repo = Arc::new(InMemoryAuthRepository::new());
    let config = test_config();
    register(&repo, &config, "alice", "alice@example.com", "+15550000001").await;

    let use_case = login_use_case(&repo, &config);

    let unknown = use_case
        .execute(login_input("nobody", PASSWORD, None), fp())
        .await;
    assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));

    let wrong = use_case
        .execute(login_input("alice", "WrongPass99!", None), fp())
        .await;
    assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_repeated_failures_lock_the_account() {
    let repo = Arc::new(InMemoryAuthRepository::new());
    let config = test_config();
    register(&repo, &config, "alice", "alice@example.com", "+15550000001").await;

    let use_case = login_use_case(&repo, &config);

    for _ in 0..5 {
        let result = use_case
            .execute(login_input("alice", "WrongPass99!", None), fp())
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    // Correct password no longer helps while locked
    let locked = use_case
        .execute(login_input("alice", PASSWORD, None), fp())
        .await;
    assert!(matches!(locked, Err(AuthError::AccountLocked)));
}

#[tokio::test]
async fn test_two_factor_login_parks_until_code_arrives() {
    let repo = Arc::new(InMemoryAuthRepository::new());
    let config = test_config();
    register(&repo, &config, "alice", "alice@example.com", "+15550000001").await;
    let (secret, _) = enable_two_factor(&repo, "alice").await;

    let use_case = login_use_case(&repo, &config);

    // Password alone: no session
    let pending = use_case
        .execute(login_input("alice", PASSWORD, None), fp())
        .await
        .unwrap();
    assert!(pending.requires_2fa);
    assert!(pending.session_token.is_empty());

    // Password plus current code: session issued
    let code = secret.generate_current("alice").unwrap();
    let output = use_case
        .execute(login_input("alice", PASSWORD, Some(code)), fp())
        .await
        .unwrap();
    assert!(!output.requires_2fa);
    assert!(!output.session_token.is_empty());

    // Garbage code is rejected
    let bad = use_case
        .execute(login_input("alice", PASSWORD, Some("notacode".to_string())), fp())
        .await;
    assert!(matches!(bad, Err(AuthError::InvalidTwoFactorCode)));
}

#[tokio::test]
async fn test_backup_code_works_exactly_once() {
    let repo = Arc::new(InMemoryAuthRepository::new());
    let config = test_config();
    register(&repo, &config, "alice", "alice@example.com", "+15550000001").await;
    let (_, backup_codes) = enable_two_factor(&repo, "alice").await;
    assert_eq!(backup_codes.len(), 10);
    assert!(backup_codes.iter().all(|c| c.len() == 8));

    let use_case = login_use_case(&repo, &config);
    let code = backup_codes[0].clone();

    let first = use_case
        .execute(login_input("alice", PASSWORD, Some(code.clone())), fp())
        .await
        .unwrap();
    assert!(!first.session_token.is_empty());

    let replay = use_case
        .execute(login_input("alice", PASSWORD, Some(code.clone())), fp())
        .await;
    assert!(matches!(replay, Err(AuthError::InvalidTwoFactorCode)));

    // The spent code cannot authorize a disable either
    let account = repo
        .find_by_user_name(&UserName::new("alice").unwrap())
        .await
        .unwrap()
        .unwrap();
    let disable = TotpSetupUseCase::new(repo.clone(), repo.clone(), repo.clone())
        .disable(&account.account_id, &code)
        .await;
    assert!(matches!(disable, Err(AuthError::InvalidTwoFactorCode)));
}

#[tokio::test]
async fn test_totp_confirm_rejects_wrong_code_and_wrong_session() {
    let repo = Arc::new(InMemoryAuthRepository::new());
    let config = test_config();
    register(&repo, &config, "alice", "alice@example.com", "+15550000001").await;

    let account = repo
        .find_by_user_name(&UserName::new("alice").unwrap())
        .await
        .unwrap()
        .unwrap();

    let use_case = TotpSetupUseCase::new(repo.clone(), repo.clone(), repo.clone());
    let session_id = uuid::Uuid::new_v4();
    let setup = use_case.begin(session_id, &account.account_id).await.unwrap();

    let wrong_code = use_case
        .confirm(session_id, &account.account_id, "notacode")
        .await;
    assert!(matches!(wrong_code, Err(AuthError::InvalidTwoFactorCode)));

    // A different session has no candidate secret
    let secret = TotpSecret::from_base32(setup.secret).unwrap();
    let code = secret.generate_current("alice").unwrap();
    let wrong_session = use_case
        .confirm(uuid::Uuid::new_v4(), &account.account_id, &code)
        .await;
    assert!(matches!(wrong_session, Err(AuthError::TwoFactorNotSetup)));

    // The right session and code still succeed
    let backup_codes = use_case
        .confirm(session_id, &account.account_id, &code)
        .await
        .unwrap();
    assert_eq!(backup_codes.len(), 10);

    // And a second enrollment is refused
    let again = use_case.begin(uuid::Uuid::new_v4(), &account.account_id).await;
    assert!(matches!(again, Err(AuthError::TwoFactorAlreadyEnabled)));
}

#[tokio::test]
async fn test_totp_provisioning_uri_labels_email_with_user_name_fallback() {
    let repo = Arc::new(InMemoryAuthRepository::new());
    let config = test_config();
    register(&repo, &config, "alice", "alice@example.com", "+15550000001").await;

    let account = repo
        .find_by_user_name(&UserName::new("alice").unwrap())
        .await
        .unwrap()
        .unwrap();

    let use_case = TotpSetupUseCase::new(repo.clone(), repo.clone(), repo.clone());
    let setup = use_case
        .begin(uuid::Uuid::new_v4(), &account.account_id)
        .await
        .unwrap();
    assert!(setup.otpauth_url.contains("example.com"));

    // An account that lost its profile row still enrolls, labeled by
    // user name
    let orphan = crate::domain::entity::account::Account::new(UserName::new("orphan").unwrap());
    repo.update(&orphan).await.unwrap();

    let setup = use_case
        .begin(uuid::Uuid::new_v4(), &orphan.account_id)
        .await
        .unwrap();
    assert!(setup.otpauth_url.contains("orphan"));
    assert!(!setup.otpauth_url.contains("example.com"));
}

#[tokio::test]
async fn test_totp_disable_clears_secret_and_backup_codes() {
    let repo = Arc::new(InMemoryAuthRepository::new());
    let config = test_config();
    register(&repo, &config, "alice", "alice@example.com", "+15550000001").await;
    let (_, backup_codes) = enable_two_factor(&repo, "alice").await;

    let account = repo
        .find_by_user_name(&UserName::new("alice").unwrap())
        .await
        .unwrap()
        .unwrap();

    let use_case = TotpSetupUseCase::new(repo.clone(), repo.clone(), repo.clone());
    use_case
        .disable(&account.account_id, &backup_codes[3])
        .await
        .unwrap();

    assert!(repo
        .find_by_account_id(&account.account_id)
        .await
        .unwrap()
        .is_none());

    // Login no longer asks for a second factor
    let output = login_use_case(&repo, &config)
        .execute(login_input("alice", PASSWORD, None), fp())
        .await
        .unwrap();
    assert!(!output.requires_2fa);
}

#[tokio::test]
async fn test_password_reset_full_flow_revokes_sessions() {
    let repo = Arc::new(InMemoryAuthRepository::new());
    let config = test_config();
    let notifier = Arc::new(CapturingNotifier::default());
    register(&repo, &config, "alice", "alice@example.com", "+15550000001").await;

    // An open session that the reset must revoke
    let session = login_use_case(&repo, &config)
        .execute(login_input("alice", PASSWORD, None), fp())
        .await
        .unwrap();

    let reset = reset_use_case(&repo, &notifier, &config);
    reset.request("alice@example.com").await.unwrap();
    let code = notifier.last_code().await;

    let reset_token = reset.verify("alice@example.com", &code).await.unwrap();
    reset
        .complete(&reset_token, "NewSecret#77zz".to_string())
        .await
        .unwrap();

    let use_case = login_use_case(&repo, &config);
    let old = use_case
        .execute(login_input("alice", PASSWORD, None), fp())
        .await;
    assert!(matches!(old, Err(AuthError::InvalidCredentials)));

    let new = use_case
        .execute(login_input("alice", "NewSecret#77zz", None), fp())
        .await
        .unwrap();
    assert!(!new.session_token.is_empty());

    let check = CheckSessionUseCase::new(repo.clone(), config.clone());
    assert!(!check.is_valid(&session.session_token, &fp().hash).await);
}

#[tokio::test]
async fn test_new_otp_supersedes_outstanding_one() {
    let repo = Arc::new(InMemoryAuthRepository::new());
    let config = test_config();
    let notifier = Arc::new(CapturingNotifier::default());
    register(&repo, &config, "alice", "alice@example.com", "+15550000001").await;

    let reset = reset_use_case(&repo, &notifier, &config);

    reset.request("alice@example.com").await.unwrap();
    let first_code = notifier.last_code().await;

    reset.request("alice@example.com").await.unwrap();
    // Wait until the second delivery lands
    let second_code = loop {
        tokio::task::yield_now().await;
        let bodies = notifier.bodies.lock().unwrap();
        if bodies.len() >= 2 {
            break bodies[1]
                .chars()
                .filter(|c| c.is_ascii_digit())
                .take(6)
                .collect::<String>();
        }
    };

    let stale = reset.verify("alice@example.com", &first_code).await;
    if first_code != second_code {
        assert!(matches!(stale, Err(AuthError::InvalidOrExpiredOtp)));
    }

    let token = reset.verify("alice@example.com", &second_code).await;
    assert!(token.is_ok());

    // A consumed code cannot be replayed
    let replay = reset.verify("alice@example.com", &second_code).await;
    assert!(matches!(replay, Err(AuthError::InvalidOrExpiredOtp)));
}

#[tokio::test]
async fn test_aged_otp_fails_even_with_correct_code() {
    use crate::domain::entity::reset_otp::ResetOtp;

    let repo = Arc::new(InMemoryAuthRepository::new());
    let config = test_config();
    let notifier = Arc::new(CapturingNotifier::default());
    register(&repo, &config, "alice", "alice@example.com", "+15550000001").await;

    let account = repo
        .find_by_user_name(&UserName::new("alice").unwrap())
        .await
        .unwrap()
        .unwrap();

    // Plant an OTP created just past the 10-minute window
    let mut otp = ResetOtp::issue(account.account_id);
    otp.created_at -= chrono::Duration::minutes(11);
    let code = otp.code.as_str().to_string();
    ResetOtpRepository::create(repo.as_ref(), &otp).await.unwrap();

    let reset = reset_use_case(&repo, &notifier, &config);
    let stale = reset.verify("alice@example.com", &code).await;
    assert!(matches!(stale, Err(AuthError::InvalidOrExpiredOtp)));
}

#[tokio::test]
async fn test_reset_request_never_reveals_account_existence() {
    let repo = Arc::new(InMemoryAuthRepository::new());
    let config = test_config();
    let notifier = Arc::new(CapturingNotifier::default());

    let reset = reset_use_case(&repo, &notifier, &config);

    // Unknown and malformed emails both report success
    assert!(reset.request("nobody@example.com").await.is_ok());
    assert!(reset.request("not-an-email").await.is_ok());

    // And verification failures are uniform
    let unknown = reset.verify("nobody@example.com", "123456").await;
    assert!(matches!(unknown, Err(AuthError::InvalidOrExpiredOtp)));

    let malformed = reset.verify("nobody@example.com", "12x456").await;
    assert!(matches!(malformed, Err(AuthError::InvalidOrExpiredOtp)));
}
