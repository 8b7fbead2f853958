use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use pulse_types::api::{Claims, UpdateProfileRequest, UpdateRoleRequest, UserQuery};
use pulse_types::envelope::Pagination;
use pulse_types::models::Role;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::policy;
use crate::respond::{self, clamp_limit};
use crate::views;

pub async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse, ApiError> {
    policy::require_role(&claims, Role::Admin)?;

    let limit = clamp_limit(query.limit);
    let (rows, total) = state.db.list_users(
        query.role.map(|r| r.as_str()),
        query.search.as_deref(),
        query.page,
        limit,
    )?;

    let users: Vec<_> = rows.iter().map(views::user).collect();
    Ok(respond::page(
        users,
        "users listed",
        Pagination::new(query.page, limit, total),
    ))
}

pub async fn get_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_user_by_id(&claims.sub.to_string())?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(respond::ok(views::user(&row), "profile"))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    policy::require_role(&claims, Role::Admin)?;

    let row = state
        .db
        .get_user_by_id(&id)?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(respond::ok(views::user(&row), "user"))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(username) = &req.username {
        if username.len() < 3 || username.len() > 32 {
            return Err(ApiError::validation("username must be 3-32 characters"));
        }
        // uniqueness check against everyone but the caller
        if let Some(existing) = state.db.get_user_by_username(username)? {
            if existing.id != claims.sub.to_string() {
                return Err(ApiError::conflict("username is already taken"));
            }
        }
    }
    if let Some(email) = &req.email {
        if !email.contains('@') {
            return Err(ApiError::validation("email address is invalid"));
        }
    }

    let id = claims.sub.to_string();
    // the uniqueness pre-check races with concurrent updates; the UNIQUE
    // constraint is the arbiter
    let updated = state
        .db
        .update_user_profile(&id, req.username.as_deref(), req.email.as_deref())
        .map_err(|e| {
            if pulse_db::is_constraint_violation(&e) {
                ApiError::conflict("username is already taken")
            } else {
                ApiError::Internal(e)
            }
        })?;
    if !updated {
        return Err(ApiError::NotFound("user"));
    }

    let row = state
        .db
        .get_user_by_id(&id)?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(respond::ok(views::user(&row), "profile updated"))
}

/// Direct role assignment. The usual user-to-doctor transition flows through
/// doctor request approval; this endpoint exists for admin corrections.
pub async fn update_role(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    policy::require_role(&claims, Role::Admin)?;

    if !state.db.update_user_role(&id, req.role.as_str())? {
        return Err(ApiError::NotFound("user"));
    }

    let row = state
        .db
        .get_user_by_id(&id)?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(respond::ok(views::user(&row), "role updated"))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    policy::require_role(&claims, Role::Admin)?;

    let target = state
        .db
        .get_user_by_id(&id)?
        .ok_or(ApiError::NotFound("user"))?;
    deletion_guard(&claims, &id, &target.role)?;

    state.db.delete_user(&id)?;
    Ok(respond::ok((), "user deleted"))
}

/// Deletion is never allowed against the caller's own account or any admin
/// account; demote first, then delete.
fn deletion_guard(claims: &Claims, target_id: &str, target_role: &str) -> Result<(), ApiError> {
    if target_id == claims.sub.to_string() {
        return Err(ApiError::validation("cannot delete your own account"));
    }
    if target_role == Role::Admin.as_str() {
        return Err(ApiError::validation("admin accounts cannot be deleted"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn claims(role: Role) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            username: "tester".into(),
            role,
            exp: 0,
        }
    }

    #[test]
    fn test_cannot_delete_own_account() {
        let c = claims(Role::Admin);
        let own = c.sub.to_string();
        assert!(matches!(
            deletion_guard(&c, &own, "admin"),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_admin_accounts_cannot_be_deleted() {
        let c = claims(Role::Admin);
        assert!(matches!(
            deletion_guard(&c, "someone-else", "admin"),
            Err(ApiError::Validation(_))
        ));
        assert!(deletion_guard(&c, "someone-else", "doctor").is_ok());
        assert!(deletion_guard(&c, "someone-else", "user").is_ok());
    }
}
