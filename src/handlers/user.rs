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
    coerce, parse_timestamp, require_string, ApiResponse, ListQuery, SelectQuery, User, UserBody,
    UNASSIGNED,
};
use crate::services::{DocumentStore, FindOptions, TASKS, USERS};

pub async fn list_users(
    State((store, _)): State<(DocumentStore, Config)>,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    let options = query.parse()?;

    if options.count {
        let total = store.count(USERS, options.filter.as_ref()).await?;
        tracing::debug!("Counted {} users", total);
        return Ok(Json(ApiResponse::new("OK", json!(total))).into_response());
    }

    // User listings are unbounded unless the caller asks for a limit
    let find = FindOptions {
        filter: options.filter,
        sort: options.sort,
        select: options.select,
        skip: options.skip,
        limit: options.limit,
    };
    let users = store.find(USERS, &find).await?;
    Ok(Json(ApiResponse::new("OK", Value::Array(users))).into_response())
}

pub async fn create_user(
    State((store, _)): State<(DocumentStore, Config)>,
    Json(body): Json<UserBody>,
) -> AppResult<Response> {
    let name = require_string(&body.name, "name")?;
    let email = require_string(&body.email, "email")?;
    ensure_email_available(&store, &email, None).await?;

    // Intentional one-way write: referenced task ids are neither verified nor
    // back-filled at creation time
    let pending_tasks = body
        .pending_tasks
        .as_ref()
        .map(coerce::coerce_string_list)
        .unwrap_or_default();

    let mut user = User {
        id: uuid::Uuid::new_v4().to_string(),
        name,
        email,
        pending_tasks,
        date_created: Utc::now(),
    };
    if let Some(raw) = body.date_created.as_ref().filter(|v| !v.is_null()) {
        user.date_created = parse_date_created(raw)?;
    }

    let doc = store.insert(USERS, &user).await?;
    tracing::info!("Created user {}", user.id);
    Ok((StatusCode::CREATED, Json(ApiResponse::new("User created", doc))).into_response())
}

pub async fn get_user(
    State((store, _)): State<(DocumentStore, Config)>,
    Path(id): Path<String>,
    Query(query): Query<SelectQuery>,
) -> AppResult<Response> {
    let select = query.parse()?;
    let doc = store
        .find_by_id(USERS, &id, select.as_ref())
        .await?
        .ok_or_else(|| {
            tracing::warn!("User not found: {}", id);
            AppError::NotFound(format!("User {} not found", id))
        })?;
    Ok(Json(ApiResponse::new("OK", doc)).into_response())
}

pub async fn update_user(
    State((store, _)): State<(DocumentStore, Config)>,
    Path(id): Path<String>,
    Json(body): Json<UserBody>,
) -> AppResult<Response> {
    let existing: User = store
        .find_by_id_as(USERS, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

    let name = require_string(&body.name, "name")?;
    let email = require_string(&body.email, "email")?;
    ensure_email_available(&store, &email, Some(&id)).await?;

    // PUT is a full replacement; an absent pendingTasks means the empty list
    let pending_tasks = body
        .pending_tasks
        .as_ref()
        .map(coerce::coerce_string_list)
        .unwrap_or_default();

    let mut updated = existing.clone();
    updated.name = name;
    updated.email = email;
    updated.pending_tasks = pending_tasks;
    if let Some(raw) = body.date_created.as_ref().filter(|v| !v.is_null()) {
        updated.date_created = parse_date_created(raw)?;
    }

    store.replace_by_id(USERS, &id, &updated).await?;
    reconcile_pending_tasks(&store, &existing, &updated).await?;

    tracing::info!("Updated user {}", id);
    let doc = serde_json::to_value(&updated)?;
    Ok(Json(ApiResponse::new("User updated", doc)).into_response())
}

pub async fn delete_user(
    State((store, _)): State<(DocumentStore, Config)>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let user: User = store
        .find_by_id_as(USERS, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

    // Unassign every task still pointing at this user, completed ones included,
    // before the record disappears
    let cleared = store
        .update_many(
            TASKS,
            &json!({"assignedUser": user.id}),
            &json!({"assignedUser": "", "assignedUserName": UNASSIGNED}),
        )
        .await?;
    tracing::debug!("Unassigned {} tasks for user {}", cleared, id);

    store.delete_by_id(USERS, &id).await?;
    tracing::info!("Deleted user {}", id);
    Ok(Json(ApiResponse::new("User deleted", json!({}))).into_response())
}

// Helper function to diff the old and new pendingTasks lists and push the
// result out to the task ledger. Added ids are assigned to this user and
// reopened; removed ids are only unassigned while they still point here, so a
// task reassigned elsewhere in the interim is left alone. Both directions are
// best-effort: an id with no matching task is a no-op.
async fn reconcile_pending_tasks(
    store: &DocumentStore,
    before: &User,
    after: &User,
) -> AppResult<()> {
    for task_id in &after.pending_tasks {
        if before.pending_tasks.contains(task_id) {
            continue;
        }
        tracing::debug!("Assigning task {} to user {}", task_id, after.id);
        store
            .update_many(
                TASKS,
                &json!({"id": task_id}),
                &json!({
                    "assignedUser": after.id,
                    "assignedUserName": after.name,
                    "completed": false,
                }),
            )
            .await?;
    }

    for task_id in &before.pending_tasks {
        if after.pending_tasks.contains(task_id) {
            continue;
        }
        tracing::debug!("Unassigning task {} from user {}", task_id, after.id);
        store
            .update_many(
                TASKS,
                &json!({"id": task_id, "assignedUser": after.id}),
                &json!({"assignedUser": "", "assignedUserName": UNASSIGNED}),
            )
            .await?;
    }

    Ok(())
}

// Helper function to reject an email already held by another user
async fn ensure_email_available(
    store: &DocumentStore,
    email: &str,
    exclude_id: Option<&str>,
) -> AppResult<()> {
    let existing: Option<User> = store.find_one_as(USERS, &json!({"email": email})).await?;
    match existing {
        Some(user) if exclude_id != Some(user.id.as_str()) => Err(AppError::Duplicate(format!(
            "A user with email {} already exists",
            email
        ))),
        _ => Ok(()),
    }
}

fn parse_date_created(value: &Value) -> AppResult<DateTime<Utc>> {
    parse_timestamp(value)
        .ok_or_else(|| AppError::Validation(format!("invalid dateCreated value: {}", value)))
}
