use serde::{Deserialize, Serialize};

/// Body of `/register` and `/login`, JSON or form encoded.
/// No `Debug`: it carries the plaintext password.
#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// Turnstile widgets post the token as `cf-turnstile-response`.
    #[serde(alias = "cf-turnstile-response")]
    pub captcha: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub username: String,
}
