use serde::{Deserialize, Serialize};
use serde_json::Value;

// Every endpoint answers with this envelope, success and failure alike
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub message: String,
    pub data: Value,
}

impl ApiResponse {
    pub fn new(message: impl Into<String>, data: Value) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}
