use anyhow::Context;
use serde::Deserialize;

/// Upper bound for `JWT_TTL_HOURS`: one hundred years.
pub const MAX_JWT_TTL_HOURS: i64 = 24 * 365 * 100;

pub const DEFAULT_TURNSTILE_VERIFY_URL: &str =
    "https://challenges.cloudflare.com/turnstile/v0/siteverify";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptchaConfig {
    pub secret: String,
    pub verify_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub users_file: String,
    pub todos_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub jwt: JwtConfig,
    pub captcha: CaptchaConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "todo-turnstile".into()),
            ttl_hours: ttl_hours(std::env::var("JWT_TTL_HOURS").ok().as_deref())?,
        };
        let captcha = CaptchaConfig {
            secret: required("TURNSTILE_SECRET")?,
            verify_url: std::env::var("TURNSTILE_VERIFY_URL")
                .unwrap_or_else(|_| DEFAULT_TURNSTILE_VERIFY_URL.into()),
            timeout_secs: std::env::var("TURNSTILE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(10),
        };
        let store = StoreConfig {
            users_file: std::env::var("USERS_FILE").unwrap_or_else(|_| "users.json".into()),
            todos_file: std::env::var("TODOS_FILE").unwrap_or_else(|_| "todos.json".into()),
        };
        Ok(Self {
            jwt,
            captcha,
            store,
        })
    }
}

/// `JWT_TTL_HOURS`, 72 when unset, rejected unless within `1..=MAX_JWT_TTL_HOURS`.
fn ttl_hours(raw: Option<&str>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(72);
    };
    let hours = raw
        .trim()
        .parse::<i64>()
        .with_context(|| format!("JWT_TTL_HOURS is not an integer: {raw}"))?;
    if !(1..=MAX_JWT_TTL_HOURS).contains(&hours) {
        anyhow::bail!("JWT_TTL_HOURS must be between 1 and {MAX_JWT_TTL_HOURS}, got {hours}");
    }
    Ok(hours)
}

/// Reads a variable that must be present and non-blank.
fn required(key: &str) -> anyhow::Result<String> {
    let value = std::env::var(key).with_context(|| format!("{key} must be set"))?;
    if value.trim().is_empty() {
        anyhow::bail!("{key} must not be empty");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_missing_and_blank() {
        std::env::remove_var("TODO_TURNSTILE_TEST_MISSING");
        let err = required("TODO_TURNSTILE_TEST_MISSING").unwrap_err();
        assert!(err.to_string().contains("must be set"));

        std::env::set_var("TODO_TURNSTILE_TEST_BLANK", "   ");
        let err = required("TODO_TURNSTILE_TEST_BLANK").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn ttl_hours_defaults_and_bounds() {
        assert_eq!(ttl_hours(None).unwrap(), 72);
        assert_eq!(ttl_hours(Some("24")).unwrap(), 24);
        assert_eq!(ttl_hours(Some(" 1 ")).unwrap(), 1);
        assert_eq!(ttl_hours(Some("876000")).unwrap(), MAX_JWT_TTL_HOURS);

        for bad in ["0", "-5", "876001", "100000000", "9223372036854775807", "abc", ""] {
            assert!(ttl_hours(Some(bad)).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn required_returns_value() {
        std::env::set_var("TODO_TURNSTILE_TEST_SET", "s3cret");
        assert_eq!(required("TODO_TURNSTILE_TEST_SET").unwrap(), "s3cret");
    }
}
