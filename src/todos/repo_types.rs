use serde::{Deserialize, Serialize};

/// Todo record as persisted in the todos file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,          // unique across the whole store
    pub username: String, // owner
    pub task: String,
    #[serde(default)]
    pub done: bool,
}
