use std::net::IpAddr;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::Credentials,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::Inserted,
        repo_types::User,
    },
    error::AppError,
    state::AppState,
};

lazy_static! {
    /// Verified against on unknown usernames so that path costs one Argon2 run too.
    static ref DUMMY_HASH: Option<String> = hash_password("no-such-user-placeholder").ok();
}

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.-]{1,64}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

fn validate(creds: &Credentials) -> Result<(), AppError> {
    if !is_valid_username(&creds.username) {
        return Err(AppError::Validation("Invalid username".into()));
    }
    if creds.password.is_empty() {
        return Err(AppError::Validation("Password is required".into()));
    }
    Ok(())
}

async fn check_captcha(
    state: &AppState,
    creds: &Credentials,
    remote_ip: Option<IpAddr>,
    flow: &'static str,
) -> Result<(), AppError> {
    if state.captcha.verify(&creds.captcha, remote_ip).await {
        Ok(())
    } else {
        warn!(username = %creds.username, flow, "captcha failed");
        Err(AppError::Unauthorized("Invalid CAPTCHA".into()))
    }
}

/// Creates the account unless the username is taken.
pub async fn register_user(
    state: &AppState,
    creds: Credentials,
    remote_ip: Option<IpAddr>,
) -> Result<(), AppError> {
    validate(&creds)?;
    check_captcha(state, &creds, remote_ip, "register").await?;

    if state.users.find(&creds.username).await?.is_some() {
        warn!(username = %creds.username, "username already registered");
        return Err(AppError::Conflict("User already exists".into()));
    }

    let user = User {
        username: creds.username,
        password_hash: hash_password(&creds.password)?,
    };
    match state.users.insert(user.clone()).await? {
        Inserted::Created => {
            info!(username = %user.username, "user registered");
            Ok(())
        }
        Inserted::AlreadyExists => {
            warn!(username = %user.username, "username registered concurrently");
            Err(AppError::Conflict("User already exists".into()))
        }
    }
}

/// Returns a signed bearer token on valid credentials.
pub async fn login_user(
    state: &AppState,
    creds: Credentials,
    remote_ip: Option<IpAddr>,
) -> Result<String, AppError> {
    validate(&creds)?;
    check_captcha(state, &creds, remote_ip, "login").await?;

    let invalid = || AppError::Unauthorized("Invalid credentials".into());

    let Some(user) = state.users.find(&creds.username).await? else {
        if let Some(dummy) = DUMMY_HASH.as_deref() {
            let _ = verify_password(&creds.password, dummy);
        }
        warn!(username = %creds.username, "login unknown user");
        return Err(invalid());
    };

    if !verify_password(&creds.password, &user.password_hash)? {
        warn!(username = %user.username, "login invalid password");
        return Err(invalid());
    }

    let token = JwtKeys::new(&state.config.jwt).sign(&user.username)?;
    info!(username = %user.username, "user logged in");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(username: &str, password: &str, captcha: &str) -> Credentials {
        Credentials {
            username: username.into(),
            password: password.into(),
            captcha: captcha.into(),
        }
    }

    #[test]
    fn username_rules() {
        assert!(is_valid_username("alice"));
        assert!(is_valid_username("a.b-c_1"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username("../etc"));
        assert!(!is_valid_username(&"x".repeat(65)));
    }

    #[tokio::test]
    async fn register_once_then_conflict_regardless_of_password() {
        let state = AppState::fake();
        register_user(&state, creds("alice", "pw-one", "ok"), None)
            .await
            .expect("first registration");

        let err = register_user(&state, creds("alice", "pw-two", "ok"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let stored = state.users.find("alice").await.unwrap().unwrap();
        assert!(verify_password("pw-one", &stored.password_hash).unwrap());
        assert!(!stored.password_hash.contains("pw-one"));
    }

    #[tokio::test]
    async fn register_with_failing_captcha_stores_nothing() {
        let state = AppState::fake_with_captcha(false);
        let err = register_user(&state, creds("alice", "pw", "tok"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert!(state.users.find("alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn login_issues_token_for_username() {
        let state = AppState::fake();
        register_user(&state, creds("alice", "pw", "ok"), None).await.unwrap();

        let token = login_user(&state, creds("alice", "pw", "ok"), None).await.unwrap();
        let claims = JwtKeys::new(&state.config.jwt).verify(&token).unwrap();
        assert_eq!(claims.sub, "alice");
    }

    #[tokio::test]
    async fn login_failures_do_not_reveal_which_part_was_wrong() {
        let state = AppState::fake();
        register_user(&state, creds("alice", "pw", "ok"), None).await.unwrap();

        let wrong_pw = login_user(&state, creds("alice", "nope", "ok"), None)
            .await
            .unwrap_err();
        let unknown = login_user(&state, creds("mallory", "pw", "ok"), None)
            .await
            .unwrap_err();
        assert_eq!(wrong_pw.to_string(), unknown.to_string());
        assert!(matches!(wrong_pw, AppError::Unauthorized(_)));
    }

    #[test]
    fn unknown_user_path_has_a_real_hash_to_verify() {
        let dummy = DUMMY_HASH.as_deref().expect("dummy hash built");
        assert!(dummy.starts_with("$argon2"));
        assert!(!verify_password("pw", dummy).unwrap());
    }

    #[tokio::test]
    async fn login_unknown_user_on_empty_store_is_unauthorized() {
        let state = AppState::fake();
        let err = login_user(&state, creds("ghost", "pw", "ok"), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn login_with_failing_captcha_never_succeeds() {
        let state = AppState::fake();
        register_user(&state, creds("alice", "pw", "ok"), None).await.unwrap();

        let err = login_user(&state, creds("alice", "pw", ""), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid CAPTCHA");
    }

    #[tokio::test]
    async fn validation_runs_before_captcha() {
        let state = AppState::fake_with_captcha(false);
        let err = register_user(&state, creds("bad name", "pw", "tok"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
