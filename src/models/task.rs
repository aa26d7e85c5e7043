use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Placeholder assignee name for tasks with no assigned user
pub const UNASSIGNED: &str = "unassigned";

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub completed: bool,
    // User id, or empty string when unassigned
    pub assigned_user: String,
    // Denormalized copy of the assignee's name, always recomputed server-side
    pub assigned_user_name: String,
    pub date_created: DateTime<Utc>,
}
