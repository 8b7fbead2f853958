use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Serialize;
use uuid::Uuid;

use pulse_types::api::{Claims, CreateReportRequest, NearbyQuery, ReportQuery, UpdateReportRequest};
use pulse_types::envelope::Pagination;
use pulse_types::models::{NearbyReport, Report, ReportStatus, Role, StatusCount};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::geo;
use crate::notify::{self, kind};
use crate::policy;
use crate::respond::{self, clamp_limit};
use crate::views;

#[derive(Debug, Serialize)]
pub struct ReportListData {
    pub reports: Vec<Report>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_counts: Option<Vec<StatusCount>>,
}

pub async fn create_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateReportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.report_type.trim().is_empty() {
        return Err(ApiError::validation("report type is required"));
    }
    if req.description.trim().is_empty() {
        return Err(ApiError::validation("description is required"));
    }
    let [lng, lat] = req.location;
    validate_coords(lat, lng)?;

    let id = Uuid::new_v4().to_string();
    state.db.insert_report(
        &id,
        &claims.sub.to_string(),
        &req.report_type,
        &req.description,
        lat,
        lng,
        req.urgency.as_str(),
    )?;

    let row = state
        .db
        .get_report(&id)?
        .ok_or_else(|| anyhow::anyhow!("report vanished after insert"))?;

    notify::notify_admins(
        &state.db,
        kind::REPORT_CREATED,
        "New incident report",
        &format!("{} report ({} urgency)", req.report_type, req.urgency),
        Some(&id),
    );

    Ok(respond::created(views::report(&row), "report submitted"))
}

pub async fn list_reports(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    // plain users only see their own reports
    let author_scope = if claims.role >= Role::Doctor {
        None
    } else {
        Some(claims.sub.to_string())
    };

    let limit = clamp_limit(query.limit);
    let (rows, total) = state.db.list_reports(
        author_scope.as_deref(),
        query.status.map(|s| s.as_str()),
        query.report_type.as_deref(),
        query.urgency.map(|u| u.as_str()),
        query.page,
        limit,
    )?;

    let status_counts = if claims.role >= Role::Doctor {
        Some(state.db.report_status_counts()?)
    } else {
        None
    };

    let data = ReportListData {
        reports: rows.iter().map(views::report).collect(),
        status_counts,
    };
    Ok(respond::page(
        data,
        "reports listed",
        Pagination::new(query.page, limit, total),
    ))
}

pub async fn nearby_reports(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<NearbyQuery>,
) -> Result<impl IntoResponse, ApiError> {
    // incident locations are sensitive; responders only
    policy::require_role(&claims, Role::Doctor)?;
    validate_coords(query.latitude, query.longitude)?;
    if query.radius_km <= 0.0 {
        return Err(ApiError::validation("radius must be positive"));
    }

    let (min_lat, max_lat, min_lng, max_lng) =
        geo::bounding_box(query.latitude, query.longitude, query.radius_km);
    let rows = state.db.reports_in_box(min_lat, max_lat, min_lng, max_lng)?;

    let nearby: Vec<NearbyReport> = geo::rank_within(
        rows,
        query.latitude,
        query.longitude,
        query.radius_km,
        |row| (row.latitude, row.longitude),
    )
    .into_iter()
    .map(|(row, distance_km)| NearbyReport {
        report: views::report(&row),
        distance_km,
    })
    .collect();

    Ok(respond::ok(nearby, "nearby reports"))
}

pub async fn get_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_report(&id)?
        .ok_or(ApiError::NotFound("report"))?;
    policy::owner_or(&claims, &row.author_id, Role::Doctor)?;

    Ok(respond::ok(views::report(&row), "report"))
}

pub async fn update_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<UpdateReportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_report(&id)?
        .ok_or(ApiError::NotFound("report"))?;

    // status changes are for responders; content edits for the owner while
    // the report is still pending (admins may always edit)
    if req.status.is_some() {
        policy::require_role(&claims, Role::Doctor)?;
    }
    if req.description.is_some() || req.urgency.is_some() {
        policy::owner_or(&claims, &row.author_id, Role::Admin)?;
        if claims.role < Role::Admin && row.status != ReportStatus::Pending.as_str() {
            return Err(ApiError::conflict(
                "report can no longer be edited once handled",
            ));
        }
    }

    state.db.update_report(
        &id,
        req.description.as_deref(),
        req.urgency.map(|u| u.as_str()),
        req.status.map(|s| s.as_str()),
    )?;

    let row = state
        .db
        .get_report(&id)?
        .ok_or(ApiError::NotFound("report"))?;
    Ok(respond::ok(views::report(&row), "report updated"))
}

pub async fn delete_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_report(&id)?
        .ok_or(ApiError::NotFound("report"))?;
    policy::owner_or(&claims, &row.author_id, Role::Admin)?;

    state.db.delete_report(&id)?;
    Ok(respond::ok((), "report deleted"))
}

pub(crate) fn validate_coords(lat: f64, lng: f64) -> Result<(), ApiError> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(ApiError::validation("coordinates out of range"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_coords;

    #[test]
    fn test_coordinate_bounds() {
        assert!(validate_coords(36.8, 10.18).is_ok());
        assert!(validate_coords(90.0, 180.0).is_ok());
        assert!(validate_coords(91.0, 0.0).is_err());
        assert!(validate_coords(0.0, -180.5).is_err());
    }
}
