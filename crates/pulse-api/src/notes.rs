use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use uuid::Uuid;

use pulse_types::api::{Claims, CreateNoteRequest, NoteQuery, UpdateNoteRequest};
use pulse_types::envelope::Pagination;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::policy;
use crate::respond::{self, clamp_limit};
use crate::views;

/// Personal health notes. Strictly owner-scoped: no doctor or admin bypass.

pub async fn create_note(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::validation("title is required"));
    }

    let id = Uuid::new_v4().to_string();
    state.db.insert_note(
        &id,
        &claims.sub.to_string(),
        &req.title,
        &req.content,
        &req.category,
    )?;

    let row = state
        .db
        .get_note(&id)?
        .ok_or_else(|| anyhow::anyhow!("note vanished after insert"))?;
    Ok(respond::created(views::note(&row), "note created"))
}

pub async fn list_notes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<NoteQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = clamp_limit(query.limit);
    let (rows, total) = state.db.list_notes(
        &claims.sub.to_string(),
        query.category.as_deref(),
        query.archived,
        query.search.as_deref(),
        query.page,
        limit,
    )?;

    let notes: Vec<_> = rows.iter().map(views::note).collect();
    Ok(respond::page(
        notes,
        "notes listed",
        Pagination::new(query.page, limit, total),
    ))
}

pub async fn get_note(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.db.get_note(&id)?.ok_or(ApiError::NotFound("note"))?;
    policy::owner_only(&claims, &row.owner_id)?;

    Ok(respond::ok(views::note(&row), "note"))
}

pub async fn update_note(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<UpdateNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.db.get_note(&id)?.ok_or(ApiError::NotFound("note"))?;
    policy::owner_only(&claims, &row.owner_id)?;

    if let Some(title) = &req.title {
        if title.trim().is_empty() {
            return Err(ApiError::validation("title cannot be empty"));
        }
    }

    state.db.update_note(
        &id,
        req.title.as_deref(),
        req.content.as_deref(),
        req.category.as_deref(),
        req.archived,
    )?;

    let row = state.db.get_note(&id)?.ok_or(ApiError::NotFound("note"))?;
    Ok(respond::ok(views::note(&row), "note updated"))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.db.get_note(&id)?.ok_or(ApiError::NotFound("note"))?;
    policy::owner_only(&claims, &row.owner_id)?;

    state.db.delete_note(&id)?;
    Ok(respond::ok((), "note deleted"))
}
