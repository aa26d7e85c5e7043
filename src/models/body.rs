//! Inbound request DTOs. Fields are optional and loosely typed on purpose;
//! handlers apply the documented coercion rules instead of relying on
//! implicit conversions.

use serde::Deserialize;
use serde_json::Value;

use crate::errors::{AppError, AppResult};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    pub name: Option<String>,
    pub email: Option<String>,
    // Scalar or list of task ids; coerced to a deduplicated string list
    pub pending_tasks: Option<Value>,
    // Creation-time override, re-parsed as a timestamp (re-import support)
    pub date_created: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskBody {
    pub name: Option<String>,
    pub description: Option<String>,
    // Epoch milliseconds (number or numeric string) or a calendar date string
    pub deadline: Option<Value>,
    // Bool or "true"/"false"-style string
    pub completed: Option<Value>,
    pub assigned_user: Option<Value>,
    // Accepted for wire compatibility but always recomputed server-side
    pub assigned_user_name: Option<String>,
}

// Extract a required, non-empty string field or fail validation naming it
pub fn require_string(value: &Option<String>, field: &str) -> AppResult<String> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s.clone()),
        _ => Err(AppError::Validation(format!("{} is required", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_string_present() {
        assert_eq!(
            require_string(&Some("Ada".to_string()), "name").unwrap(),
            "Ada"
        );
    }

    #[test]
    fn test_require_string_missing_or_blank() {
        let err = require_string(&None, "name").unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "name is required"));

        let err = require_string(&Some("   ".to_string()), "email").unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "email is required"));
    }
}
