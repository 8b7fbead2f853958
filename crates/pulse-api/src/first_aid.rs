use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use uuid::Uuid;

use pulse_types::api::{Claims, CreateFirstAidRequest, FirstAidQuery, UpdateFirstAidRequest};
use pulse_types::envelope::Pagination;
use pulse_types::models::Role;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::policy;
use crate::respond::{self, clamp_limit};
use crate::views;

/// First-aid reference entries: readable by any authenticated user,
/// maintained by admins.

pub async fn create_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateFirstAidRequest>,
) -> Result<impl IntoResponse, ApiError> {
    policy::require_role(&claims, Role::Admin)?;

    if req.title.trim().is_empty() {
        return Err(ApiError::validation("title is required"));
    }
    if req.content.trim().is_empty() {
        return Err(ApiError::validation("content is required"));
    }

    let id = Uuid::new_v4().to_string();
    state
        .db
        .insert_first_aid(&id, &req.title, &req.content, &req.category)?;

    let row = state
        .db
        .get_first_aid(&id)?
        .ok_or_else(|| anyhow::anyhow!("first-aid entry vanished after insert"))?;
    Ok(respond::created(views::first_aid(&row), "entry created"))
}

pub async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<FirstAidQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = clamp_limit(query.limit);
    let (rows, total) = state.db.list_first_aid(
        query.category.as_deref(),
        query.search.as_deref(),
        query.page,
        limit,
    )?;

    let entries: Vec<_> = rows.iter().map(views::first_aid).collect();
    Ok(respond::page(
        entries,
        "entries listed",
        Pagination::new(query.page, limit, total),
    ))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_first_aid(&id)?
        .ok_or(ApiError::NotFound("first-aid entry"))?;
    Ok(respond::ok(views::first_aid(&row), "entry"))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<UpdateFirstAidRequest>,
) -> Result<impl IntoResponse, ApiError> {
    policy::require_role(&claims, Role::Admin)?;

    if !state.db.update_first_aid(
        &id,
        req.title.as_deref(),
        req.content.as_deref(),
        req.category.as_deref(),
    )? {
        return Err(ApiError::NotFound("first-aid entry"));
    }

    let row = state
        .db
        .get_first_aid(&id)?
        .ok_or(ApiError::NotFound("first-aid entry"))?;
    Ok(respond::ok(views::first_aid(&row), "entry updated"))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    policy::require_role(&claims, Role::Admin)?;

    if !state.db.delete_first_aid(&id)? {
        return Err(ApiError::NotFound("first-aid entry"));
    }
    Ok(respond::ok((), "entry deleted"))
}
