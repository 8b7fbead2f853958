use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use uuid::Uuid;

use pulse_types::api::{AdminMessageQuery, Claims, CreateAdminMessageRequest};
use pulse_types::envelope::Pagination;
use pulse_types::models::Role;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::notify::{self, kind};
use crate::policy;
use crate::respond::{self, clamp_limit};
use crate::views;

/// Direct messages from an admin to a user, with a companion notification.

pub async fn create_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateAdminMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    policy::require_role(&claims, Role::Admin)?;

    if req.subject.trim().is_empty() {
        return Err(ApiError::validation("subject is required"));
    }
    if req.body.trim().is_empty() {
        return Err(ApiError::validation("body is required"));
    }
    if state.db.get_user_by_id(&req.recipient_id)?.is_none() {
        return Err(ApiError::NotFound("recipient"));
    }

    let id = Uuid::new_v4().to_string();
    state.db.insert_admin_message(
        &id,
        &claims.sub.to_string(),
        &req.recipient_id,
        &req.subject,
        &req.body,
    )?;

    let row = state
        .db
        .get_admin_message(&id)?
        .ok_or_else(|| anyhow::anyhow!("admin message vanished after insert"))?;

    notify::notify_user(
        &state.db,
        &req.recipient_id,
        kind::ADMIN_MESSAGE,
        "Message from the care team",
        &req.subject,
        Some(&id),
    );

    Ok(respond::created(views::admin_message(&row), "message sent"))
}

pub async fn list_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<AdminMessageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let recipient_scope = if claims.role >= Role::Admin {
        None
    } else {
        Some(claims.sub.to_string())
    };

    let limit = clamp_limit(query.limit);
    let (rows, total) = state.db.list_admin_messages(
        recipient_scope.as_deref(),
        query.page,
        limit,
    )?;

    let messages: Vec<_> = rows.iter().map(views::admin_message).collect();
    Ok(respond::page(
        messages,
        "messages listed",
        Pagination::new(query.page, limit, total),
    ))
}

/// Reading a new message as its recipient marks it read, exactly once.
pub async fn get_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_admin_message(&id)?
        .ok_or(ApiError::NotFound("message"))?;
    policy::owner_or(&claims, &row.recipient_id, Role::Admin)?;

    state
        .db
        .mark_admin_message_read_if_new(&id, &claims.sub.to_string())?;

    let row = state
        .db
        .get_admin_message(&id)?
        .ok_or(ApiError::NotFound("message"))?;
    Ok(respond::ok(views::admin_message(&row), "message"))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_admin_message(&id)?
        .ok_or(ApiError::NotFound("message"))?;
    policy::owner_or(&claims, &row.recipient_id, Role::Admin)?;

    state.db.delete_admin_message(&id)?;
    Ok(respond::ok((), "message deleted"))
}
