use axum::{
    Extension,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Serialize;

use pulse_types::api::{Claims, NotificationQuery};
use pulse_types::envelope::Pagination;
use pulse_types::models::Notification;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::respond::{self, clamp_limit};
use crate::views;

#[derive(Debug, Serialize)]
pub struct NotificationListData {
    pub notifications: Vec<Notification>,
    pub unread: u64,
}

pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<NotificationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let recipient = claims.sub.to_string();
    let limit = clamp_limit(query.limit);
    let (rows, total) = state.db.list_notifications(&recipient, query.page, limit)?;
    let unread = state.db.unread_notification_count(&recipient)?;

    let data = NotificationListData {
        notifications: rows.iter().map(views::notification).collect(),
        unread,
    };
    Ok(respond::page(
        data,
        "notifications listed",
        Pagination::new(query.page, limit, total),
    ))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state
        .db
        .mark_notification_read(&id, &claims.sub.to_string())?
    {
        return Err(ApiError::NotFound("notification"));
    }
    Ok(respond::ok((), "notification marked read"))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .db
        .mark_all_notifications_read(&claims.sub.to_string())?;
    Ok(respond::ok(
        serde_json::json!({ "updated": updated }),
        "all notifications marked read",
    ))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state
        .db
        .delete_notification(&id, &claims.sub.to_string())?
    {
        return Err(ApiError::NotFound("notification"));
    }
    Ok(respond::ok((), "notification deleted"))
}
