use serde::{Deserialize, Serialize};

/// Body of `POST /todos/:username`; the page posts it as a form field.
#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub task: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}
