use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    // Ids of incomplete tasks assigned to this user; a derived index, the
    // tasks' assignedUser field is authoritative
    pub pending_tasks: Vec<String>,
    pub date_created: DateTime<Utc>,
}
