use serde::{Deserialize, Serialize};

/// User record as persisted in the users file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,       // unique user key
    #[serde(rename = "password")]
    pub password_hash: String,  // Argon2 PHC string, never the plaintext
}
