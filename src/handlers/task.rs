use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::{
    coerce, parse_timestamp, require_string, ApiResponse, ListQuery, SelectQuery, Task, TaskBody,
    User, UNASSIGNED,
};
use crate::services::{DocumentStore, FindOptions, TASKS, USERS};

pub async fn list_tasks(
    State((store, config)): State<(DocumentStore, Config)>,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    let options = query.parse()?;

    if options.count {
        let total = store.count(TASKS, options.filter.as_ref()).await?;
        tracing::debug!("Counted {} tasks", total);
        return Ok(Json(ApiResponse::new("OK", json!(total))).into_response());
    }

    // Unlike users, task listings get a default limit to protect against
    // unbounded scans of a large ledger
    let find = FindOptions {
        filter: options.filter,
        sort: options.sort,
        select: options.select,
        skip: options.skip,
        limit: options.limit.or(Some(config.api.task_list_limit)),
    };
    let tasks = store.find(TASKS, &find).await?;
    Ok(Json(ApiResponse::new("OK", Value::Array(tasks))).into_response())
}

pub async fn create_task(
    State((store, _)): State<(DocumentStore, Config)>,
    Json(body): Json<TaskBody>,
) -> AppResult<Response> {
    let name = require_string(&body.name, "name")?;
    let deadline = parse_deadline(body.deadline.as_ref())?;
    let description = body.description.clone().unwrap_or_default();
    let completed = body
        .completed
        .as_ref()
        .map_or(false, |v| coerce::coerce_bool(v, false));
    let assigned_user = body
        .assigned_user
        .as_ref()
        .map(coerce::value_to_string)
        .unwrap_or_default();

    if body.assigned_user_name.is_some() {
        tracing::debug!("Ignoring client-supplied assignedUserName");
    }
    let assigned_user_name = resolve_assignee_name(&store, &assigned_user).await?;

    let task = Task {
        id: uuid::Uuid::new_v4().to_string(),
        name,
        description,
        deadline,
        completed,
        assigned_user,
        assigned_user_name,
        date_created: Utc::now(),
    };

    let doc = store.insert(TASKS, &task).await?;
    if !task.assigned_user.is_empty() && !task.completed {
        add_pending_task(&store, &task.assigned_user, &task.id).await?;
    }

    tracing::info!("Created task {}", task.id);
    Ok((StatusCode::CREATED, Json(ApiResponse::new("Task created", doc))).into_response())
}

pub async fn get_task(
    State((store, _)): State<(DocumentStore, Config)>,
    Path(id): Path<String>,
    Query(query): Query<SelectQuery>,
) -> AppResult<Response> {
    let select = query.parse()?;
    let doc = store
        .find_by_id(TASKS, &id, select.as_ref())
        .await?
        .ok_or_else(|| {
            tracing::warn!("Task not found: {}", id);
            AppError::NotFound(format!("Task {} not found", id))
        })?;
    Ok(Json(ApiResponse::new("OK", doc)).into_response())
}

pub async fn update_task(
    State((store, _)): State<(DocumentStore, Config)>,
    Path(id): Path<String>,
    Json(body): Json<TaskBody>,
) -> AppResult<Response> {
    let existing: Task = store
        .find_by_id_as(TASKS, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task {} not found", id)))?;

    let name = require_string(&body.name, "name")?;
    let deadline = parse_deadline(body.deadline.as_ref())?;
    let description = body.description.clone().unwrap_or_default();

    // completed falls back to the prior value here, unlike create
    let completed = body
        .completed
        .as_ref()
        .map_or(existing.completed, |v| coerce::coerce_bool(v, existing.completed));

    // An absent assignedUser keeps the prior assignee; an explicit empty
    // value (or null) clears the assignment
    let assigned_user = match body.assigned_user.as_ref() {
        None => existing.assigned_user.clone(),
        Some(value) => coerce::value_to_string(value),
    };
    let assigned_user_name = resolve_assignee_name(&store, &assigned_user).await?;

    let updated = Task {
        id: existing.id.clone(),
        name,
        description,
        deadline,
        completed,
        assigned_user,
        assigned_user_name,
        date_created: existing.date_created,
    };
    store.replace_by_id(TASKS, &id, &updated).await?;

    // Old assignee: drop the id unless the assignment is unchanged and the
    // task was open before and stays open now
    if !existing.assigned_user.is_empty() {
        let unchanged_and_open = existing.assigned_user == updated.assigned_user
            && !existing.completed
            && !updated.completed;
        if !unchanged_and_open {
            remove_pending_task(&store, &existing.assigned_user, &id).await?;
        }
    }

    // New assignee: an open task belongs on their pending list
    if !updated.assigned_user.is_empty() && !updated.completed {
        add_pending_task(&store, &updated.assigned_user, &id).await?;
    }

    tracing::info!("Updated task {}", id);
    let doc = serde_json::to_value(&updated)?;
    Ok(Json(ApiResponse::new("Task updated", doc)).into_response())
}

pub async fn delete_task(
    State((store, _)): State<(DocumentStore, Config)>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let existing: Task = store
        .find_by_id_as(TASKS, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task {} not found", id)))?;

    if !existing.assigned_user.is_empty() {
        remove_pending_task(&store, &existing.assigned_user, &id).await?;
    }

    store.delete_by_id(TASKS, &id).await?;
    tracing::info!("Deleted task {}", id);
    Ok(Json(ApiResponse::new("Task deleted", json!({}))).into_response())
}

// Helper function to resolve the denormalized assignee name. An empty
// assignment forces the placeholder; a non-empty one must reference a live
// user, whose current name is always used
async fn resolve_assignee_name(store: &DocumentStore, assigned_user: &str) -> AppResult<String> {
    if assigned_user.is_empty() {
        return Ok(UNASSIGNED.to_string());
    }
    let user: Option<User> = store.find_by_id_as(USERS, assigned_user).await?;
    user.map(|u| u.name).ok_or_else(|| {
        tracing::warn!("Assigned user not found: {}", assigned_user);
        AppError::UnknownReference(format!("assigned user {} not found", assigned_user))
    })
}

// Helper function to add a task id to a user's pending list. Idempotent
// set-add; a missing user is a no-op so cascades stay best-effort
async fn add_pending_task(store: &DocumentStore, user_id: &str, task_id: &str) -> AppResult<()> {
    let Some(mut user) = store.find_by_id_as::<User>(USERS, user_id).await? else {
        tracing::warn!("Skipping pending-task add, user {} not found", user_id);
        return Ok(());
    };
    if !user.pending_tasks.iter().any(|t| t == task_id) {
        user.pending_tasks.push(task_id.to_string());
        store.replace_by_id(USERS, user_id, &user).await?;
    }
    Ok(())
}

// Helper function to remove a task id from a user's pending list; the
// conditional-remove twin of add_pending_task
async fn remove_pending_task(store: &DocumentStore, user_id: &str, task_id: &str) -> AppResult<()> {
    let Some(mut user) = store.find_by_id_as::<User>(USERS, user_id).await? else {
        tracing::warn!("Skipping pending-task removal, user {} not found", user_id);
        return Ok(());
    };
    if user.pending_tasks.iter().any(|t| t == task_id) {
        user.pending_tasks.retain(|t| t != task_id);
        store.replace_by_id(USERS, user_id, &user).await?;
    }
    Ok(())
}

fn parse_deadline(value: Option<&Value>) -> AppResult<DateTime<Utc>> {
    let value = value.ok_or_else(|| AppError::Validation("deadline is required".to_string()))?;
    let blank = match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    };
    if blank {
        return Err(AppError::Validation("deadline is required".to_string()));
    }
    parse_timestamp(value)
        .ok_or_else(|| AppError::Validation(format!("invalid deadline value: {}", value)))
}
