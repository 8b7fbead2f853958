use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Serialize;
use uuid::Uuid;

use pulse_types::api::{
    Claims, ConsultationQuery, CreateConsultationRequest, RespondConsultationRequest,
    UpdateConsultationRequest,
};
use pulse_types::envelope::Pagination;
use pulse_types::models::{Consultation, Role, StatusCount};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::notify::{self, kind};
use crate::policy;
use crate::respond::{self, clamp_limit};
use crate::views;

#[derive(Debug, Serialize)]
pub struct ConsultationListData {
    pub consultations: Vec<Consultation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_counts: Option<Vec<StatusCount>>,
}

pub async fn create_consultation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateConsultationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.question.trim().is_empty() {
        return Err(ApiError::validation("question is required"));
    }

    let id = Uuid::new_v4().to_string();
    state.db.insert_consultation(
        &id,
        &claims.sub.to_string(),
        &req.question,
        &req.category,
    )?;

    let row = state
        .db
        .get_consultation(&id)?
        .ok_or_else(|| anyhow::anyhow!("consultation vanished after insert"))?;

    notify::notify_admins(
        &state.db,
        kind::CONSULTATION_CREATED,
        "New consultation request",
        &format!("from {}", claims.username),
        Some(&id),
    );

    Ok(respond::created(
        views::consultation(&row),
        "consultation submitted",
    ))
}

pub async fn list_consultations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ConsultationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let patient_scope = if claims.role >= Role::Doctor {
        None
    } else {
        Some(claims.sub.to_string())
    };

    let limit = clamp_limit(query.limit);
    let (rows, total) = state.db.list_consultations(
        patient_scope.as_deref(),
        query.status.map(|s| s.as_str()),
        query.category.as_deref(),
        query.page,
        limit,
    )?;

    let status_counts = if claims.role >= Role::Doctor {
        Some(state.db.consultation_status_counts()?)
    } else {
        None
    };

    let data = ConsultationListData {
        consultations: rows.iter().map(views::consultation).collect(),
        status_counts,
    };
    Ok(respond::page(
        data,
        "consultations listed",
        Pagination::new(query.page, limit, total),
    ))
}

pub async fn get_consultation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_consultation(&id)?
        .ok_or(ApiError::NotFound("consultation"))?;
    policy::owner_or(&claims, &row.patient_id, Role::Doctor)?;

    Ok(respond::ok(views::consultation(&row), "consultation"))
}

/// Record a doctor's answer. A consultation is answered at most once; only an
/// admin may amend an existing response.
pub async fn respond_consultation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<RespondConsultationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    policy::require_role(&claims, Role::Doctor)?;
    if req.response.trim().is_empty() {
        return Err(ApiError::validation("response is required"));
    }

    let row = state
        .db
        .get_consultation(&id)?
        .ok_or(ApiError::NotFound("consultation"))?;

    let overwrite = claims.role >= Role::Admin;
    if !state.db.set_consultation_response(
        &id,
        &req.response,
        &claims.sub.to_string(),
        overwrite,
    )? {
        return Err(ApiError::conflict("consultation has already been answered"));
    }

    notify::notify_user(
        &state.db,
        &row.patient_id,
        kind::CONSULTATION_ANSWERED,
        "Your consultation was answered",
        &format!("Dr. {} responded to your question", claims.username),
        Some(&id),
    );

    let row = state
        .db
        .get_consultation(&id)?
        .ok_or(ApiError::NotFound("consultation"))?;
    Ok(respond::ok(views::consultation(&row), "response recorded"))
}

pub async fn update_consultation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<UpdateConsultationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_consultation(&id)?
        .ok_or(ApiError::NotFound("consultation"))?;
    policy::owner_or(&claims, &row.patient_id, Role::Admin)?;

    // once answered, the patient can no longer reshape the question
    if claims.role < Role::Admin && row.response.is_some() {
        return Err(ApiError::conflict(
            "consultation can no longer be edited once answered",
        ));
    }
    // status changes are administrative
    if req.status.is_some() {
        policy::require_role(&claims, Role::Admin)?;
    }

    state.db.update_consultation(
        &id,
        req.question.as_deref(),
        req.category.as_deref(),
        req.status.map(|s| s.as_str()),
    )?;

    let row = state
        .db
        .get_consultation(&id)?
        .ok_or(ApiError::NotFound("consultation"))?;
    Ok(respond::ok(views::consultation(&row), "consultation updated"))
}

pub async fn delete_consultation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_consultation(&id)?
        .ok_or(ApiError::NotFound("consultation"))?;
    policy::owner_or(&claims, &row.patient_id, Role::Admin)?;

    state.db.delete_consultation(&id)?;
    Ok(respond::ok((), "consultation deleted"))
}
