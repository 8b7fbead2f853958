use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use pulse_types::api::{Claims, CreateDoctorRequestRequest, DoctorRequestQuery, RejectDoctorRequestRequest};
use pulse_types::envelope::Pagination;
use pulse_types::models::{DoctorRequest, RequestStatus, Role, StatusCount};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::notify::{self, kind};
use crate::policy;
use crate::respond::{self, clamp_limit};
use crate::views;

#[derive(Debug, Serialize)]
pub struct DoctorRequestListData {
    pub requests: Vec<DoctorRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_counts: Option<Vec<StatusCount>>,
}

pub async fn create_doctor_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateDoctorRequestRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.specialty.trim().is_empty() {
        return Err(ApiError::validation("specialty is required"));
    }
    if req.license_number.trim().is_empty() {
        return Err(ApiError::validation("license number is required"));
    }
    if claims.role >= Role::Doctor {
        return Err(ApiError::conflict("account already has doctor privileges"));
    }

    let applicant_id = claims.sub.to_string();
    if state.db.has_pending_doctor_request(&applicant_id)? {
        return Err(ApiError::conflict("a pending application already exists"));
    }

    let id = Uuid::new_v4().to_string();
    state.db.insert_doctor_request(
        &id,
        &applicant_id,
        &req.specialty,
        &req.license_number,
        &req.credentials,
    )?;

    let row = state
        .db
        .get_doctor_request(&id)?
        .ok_or_else(|| anyhow::anyhow!("doctor request vanished after insert"))?;

    notify::notify_user(
        &state.db,
        &applicant_id,
        kind::DOCTOR_REQUEST_SUBMITTED,
        "Application received",
        "Your doctor application is under review",
        Some(&id),
    );
    notify::notify_admins(
        &state.db,
        kind::DOCTOR_REQUEST_RECEIVED,
        "New doctor application",
        &format!("{} applied ({})", claims.username, req.specialty),
        Some(&id),
    );

    Ok(respond::created(
        views::doctor_request(&row),
        "application submitted",
    ))
}

pub async fn list_doctor_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<DoctorRequestQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let applicant_scope = if claims.role >= Role::Admin {
        None
    } else {
        Some(claims.sub.to_string())
    };

    let limit = clamp_limit(query.limit);
    let (rows, total) = state.db.list_doctor_requests(
        applicant_scope.as_deref(),
        query.status.map(|s| s.as_str()),
        query.page,
        limit,
    )?;

    let status_counts = if claims.role >= Role::Admin {
        Some(state.db.doctor_request_status_counts()?)
    } else {
        None
    };

    let data = DoctorRequestListData {
        requests: rows.iter().map(views::doctor_request).collect(),
        status_counts,
    };
    Ok(respond::page(
        data,
        "applications listed",
        Pagination::new(query.page, limit, total),
    ))
}

pub async fn get_doctor_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_doctor_request(&id)?
        .ok_or(ApiError::NotFound("doctor request"))?;
    policy::owner_or(&claims, &row.applicant_id, Role::Admin)?;

    Ok(respond::ok(views::doctor_request(&row), "application"))
}

/// Approve a pending application and promote the applicant.
///
/// Two independent writes: the status flip and the role update. A crash in
/// between leaves an approved request with an unpromoted user; the admin role
/// endpoint is the manual remedy.
pub async fn approve_doctor_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    policy::require_role(&claims, Role::Admin)?;

    let row = state
        .db
        .get_doctor_request(&id)?
        .ok_or(ApiError::NotFound("doctor request"))?;

    if !state.db.review_doctor_request(
        &id,
        RequestStatus::Approved.as_str(),
        &claims.sub.to_string(),
        None,
    )? {
        return Err(ApiError::conflict("only pending applications can be approved"));
    }

    if !state
        .db
        .update_user_role(&row.applicant_id, Role::Doctor.as_str())?
    {
        warn!(
            "approved request {} but applicant {} no longer exists",
            id, row.applicant_id
        );
    }

    notify::notify_user(
        &state.db,
        &row.applicant_id,
        kind::DOCTOR_REQUEST_APPROVED,
        "Application approved",
        "Your account now has doctor privileges",
        Some(&id),
    );

    let row = state
        .db
        .get_doctor_request(&id)?
        .ok_or(ApiError::NotFound("doctor request"))?;
    Ok(respond::ok(views::doctor_request(&row), "application approved"))
}

pub async fn reject_doctor_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<RejectDoctorRequestRequest>,
) -> Result<impl IntoResponse, ApiError> {
    policy::require_role(&claims, Role::Admin)?;

    let reason = rejection_reason(&req.reason)?;

    let row = state
        .db
        .get_doctor_request(&id)?
        .ok_or(ApiError::NotFound("doctor request"))?;

    if !state.db.review_doctor_request(
        &id,
        RequestStatus::Rejected.as_str(),
        &claims.sub.to_string(),
        Some(reason),
    )? {
        return Err(ApiError::conflict("only pending applications can be rejected"));
    }

    notify::notify_user(
        &state.db,
        &row.applicant_id,
        kind::DOCTOR_REQUEST_REJECTED,
        "Application rejected",
        reason,
        Some(&id),
    );

    let row = state
        .db
        .get_doctor_request(&id)?
        .ok_or(ApiError::NotFound("doctor request"))?;
    Ok(respond::ok(views::doctor_request(&row), "application rejected"))
}

pub async fn delete_doctor_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_doctor_request(&id)?
        .ok_or(ApiError::NotFound("doctor request"))?;
    policy::owner_or(&claims, &row.applicant_id, Role::Admin)?;

    // applicants may only withdraw while the application is still open
    if claims.role < Role::Admin && row.status != RequestStatus::Pending.as_str() {
        return Err(ApiError::conflict("reviewed applications cannot be withdrawn"));
    }

    state.db.delete_doctor_request(&id)?;
    Ok(respond::ok((), "application deleted"))
}

/// Every rejection carries a reason; it lands on the request row and in the
/// applicant's notification.
fn rejection_reason(reason: &str) -> Result<&str, ApiError> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("a rejection reason is required"));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::rejection_reason;

    #[test]
    fn test_rejection_requires_a_reason() {
        assert!(rejection_reason("").is_err());
        assert!(rejection_reason("   \n\t").is_err());
        assert_eq!(
            rejection_reason("  license could not be verified ").unwrap(),
            "license could not be verified"
        );
    }
}
