use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use uuid::Uuid;

use pulse_types::api::{Claims, CreateHospitalRequest, HospitalQuery, NearbyQuery, UpdateHospitalRequest};
use pulse_types::envelope::Pagination;
use pulse_types::models::{NearbyHospital, Role};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::geo;
use crate::policy;
use crate::reports::validate_coords;
use crate::respond::{self, clamp_limit};
use crate::views;

pub async fn create_hospital(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateHospitalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    policy::require_role(&claims, Role::Admin)?;

    if req.name.trim().is_empty() {
        return Err(ApiError::validation("name is required"));
    }
    if req.address.trim().is_empty() {
        return Err(ApiError::validation("address is required"));
    }
    let [lng, lat] = req.location;
    validate_coords(lat, lng)?;

    let id = Uuid::new_v4().to_string();
    state
        .db
        .insert_hospital(&id, &req.name, &req.address, &req.phone, lat, lng)?;

    let row = state
        .db
        .get_hospital(&id)?
        .ok_or_else(|| anyhow::anyhow!("hospital vanished after insert"))?;
    Ok(respond::created(views::hospital(&row), "hospital created"))
}

pub async fn list_hospitals(
    State(state): State<AppState>,
    Query(query): Query<HospitalQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = clamp_limit(query.limit);
    let (rows, total) = state
        .db
        .list_hospitals(query.search.as_deref(), query.page, limit)?;

    let hospitals: Vec<_> = rows.iter().map(views::hospital).collect();
    Ok(respond::page(
        hospitals,
        "hospitals listed",
        Pagination::new(query.page, limit, total),
    ))
}

/// Hospitals within a radius of the caller, each with its computed
/// great-circle distance, closest first, capped at 50.
pub async fn nearby_hospitals(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<impl IntoResponse, ApiError> {
    validate_coords(query.latitude, query.longitude)?;
    if query.radius_km <= 0.0 {
        return Err(ApiError::validation("radius must be positive"));
    }

    let (min_lat, max_lat, min_lng, max_lng) =
        geo::bounding_box(query.latitude, query.longitude, query.radius_km);
    let rows = state
        .db
        .hospitals_in_box(min_lat, max_lat, min_lng, max_lng)?;

    let nearby: Vec<NearbyHospital> = geo::rank_within(
        rows,
        query.latitude,
        query.longitude,
        query.radius_km,
        |row| (row.latitude, row.longitude),
    )
    .into_iter()
    .map(|(row, distance_km)| NearbyHospital {
        hospital: views::hospital(&row),
        distance_km,
    })
    .collect();

    Ok(respond::ok(nearby, "nearby hospitals"))
}

pub async fn get_hospital(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_hospital(&id)?
        .ok_or(ApiError::NotFound("hospital"))?;
    Ok(respond::ok(views::hospital(&row), "hospital"))
}

pub async fn update_hospital(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<UpdateHospitalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    policy::require_role(&claims, Role::Admin)?;

    let (lat, lng) = match req.location {
        Some([lng, lat]) => {
            validate_coords(lat, lng)?;
            (Some(lat), Some(lng))
        }
        None => (None, None),
    };

    if !state.db.update_hospital(
        &id,
        req.name.as_deref(),
        req.address.as_deref(),
        req.phone.as_deref(),
        lat,
        lng,
    )? {
        return Err(ApiError::NotFound("hospital"));
    }

    let row = state
        .db
        .get_hospital(&id)?
        .ok_or(ApiError::NotFound("hospital"))?;
    Ok(respond::ok(views::hospital(&row), "hospital updated"))
}

pub async fn delete_hospital(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    policy::require_role(&claims, Role::Admin)?;

    if !state.db.delete_hospital(&id)? {
        return Err(ApiError::NotFound("hospital"));
    }
    Ok(respond::ok((), "hospital deleted"))
}
