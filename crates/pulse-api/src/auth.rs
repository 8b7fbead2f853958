use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State};
use uuid::Uuid;

use pulse_db::Database;
use pulse_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest};
use pulse_types::models::Role;

use crate::error::ApiError;
use crate::respond;
use crate::storage::Storage;
use crate::views;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub storage: Storage,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    if req.username.len() < 3 || req.username.len() > 32 {
        return Err(ApiError::validation("username must be 3-32 characters"));
    }
    if req.password.len() < 8 {
        return Err(ApiError::validation("password must be at least 8 characters"));
    }
    if !req.email.contains('@') {
        return Err(ApiError::validation("email address is invalid"));
    }

    if state
        .db
        .get_user_by_username(&req.username)?
        .is_some()
    {
        return Err(ApiError::conflict("username is already taken"));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
        .to_string();

    let user_id = Uuid::new_v4();

    // the pre-check above races with concurrent registration; the UNIQUE
    // constraint is the arbiter
    state
        .db
        .create_user(
            &user_id.to_string(),
            &req.username,
            &req.email,
            &password_hash,
            Role::User.as_str(),
        )
        .map_err(|e| {
            if pulse_db::is_constraint_violation(&e) {
                ApiError::conflict("username is already taken")
            } else {
                ApiError::Internal(e)
            }
        })?;

    let row = state
        .db
        .get_user_by_id(&user_id.to_string())?
        .ok_or_else(|| anyhow::anyhow!("user vanished after insert"))?;
    let user = views::user(&row);

    let token = create_token(&state.jwt_secret, user_id, &req.username, Role::User)?;

    Ok(respond::created(
        AuthResponse { user, token },
        "account created",
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let row = state
        .db
        .get_user_by_username(&req.username)?
        .ok_or(ApiError::Unauthorized)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&row.password)
        .map_err(|e| anyhow::anyhow!("stored hash unreadable: {}", e))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let user_id: Uuid = row
        .id
        .parse()
        .map_err(|e| anyhow::anyhow!("corrupt user id '{}': {}", row.id, e))?;
    let user = views::user(&row);

    let token = create_token(&state.jwt_secret, user_id, &user.username, user.role)?;

    Ok(respond::ok(AuthResponse { user, token }, "logged in"))
}

fn create_token(secret: &str, user_id: Uuid, username: &str, role: Role) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        role,
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        // salt generation needs an OS entropy source behind OsRng
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(b"correct-horse-battery", &salt)
            .unwrap()
            .to_string();

        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"correct-horse-battery", &parsed)
                .is_ok()
        );
        assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
    }

    #[test]
    fn test_token_round_trips_role_claim() {
        let id = Uuid::new_v4();
        let token = create_token("test-secret", id, "amira", Role::Doctor).unwrap();

        let decoded = jsonwebtoken::decode::<Claims>(
            &token,
            &jsonwebtoken::DecodingKey::from_secret(b"test-secret"),
            &jsonwebtoken::Validation::default(),
        )
        .unwrap();
        assert_eq!(decoded.claims.sub, id);
        assert_eq!(decoded.claims.role, Role::Doctor);
    }
}
