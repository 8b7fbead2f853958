use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
};
use serde::Serialize;
use uuid::Uuid;

use pulse_types::api::{Claims, ContactQuery, UpdateContactRequest};
use pulse_types::envelope::Pagination;
use pulse_types::models::{Contact, Role, StatusCount};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::notify::{self, kind};
use crate::policy;
use crate::respond::{self, clamp_limit};
use crate::views;

#[derive(Debug, Serialize)]
pub struct ContactListData {
    pub contacts: Vec<Contact>,
    pub status_counts: Vec<StatusCount>,
}

const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

/// Public contact form. Multipart so the sender can attach a file; the file is
/// written to disk and only its stored name lands on the contact document.
pub async fn create_contact(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut name = None;
    let mut email = None;
    let mut subject = None;
    let mut message = None;
    let mut attachment = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("malformed multipart body: {}", e)))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "name" => name = Some(read_text(field).await?),
            "email" => email = Some(read_text(field).await?),
            "subject" => subject = Some(read_text(field).await?),
            "message" => message = Some(read_text(field).await?),
            "attachment" => {
                let original_name = field.file_name().unwrap_or("attachment").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(format!("attachment unreadable: {}", e)))?;
                if data.is_empty() {
                    continue;
                }
                if data.len() > MAX_ATTACHMENT_BYTES {
                    return Err(ApiError::validation("attachment exceeds 5 MB"));
                }
                let stored = state
                    .storage
                    .save_attachment(&original_name, &data)
                    .await?;
                attachment = Some(stored);
            }
            // unknown fields are ignored
            _ => {}
        }
    }

    let name = required(name, "name")?;
    let email = required(email, "email")?;
    let subject = required(subject, "subject")?;
    let message = required(message, "message")?;
    if !email.contains('@') {
        return Err(ApiError::validation("email address is invalid"));
    }

    let id = Uuid::new_v4().to_string();
    state.db.insert_contact(
        &id,
        &name,
        &email,
        &subject,
        &message,
        attachment.as_deref(),
    )?;

    let row = state
        .db
        .get_contact(&id)?
        .ok_or_else(|| anyhow::anyhow!("contact vanished after insert"))?;

    notify::notify_admins(
        &state.db,
        kind::CONTACT_RECEIVED,
        "New contact message",
        &format!("{}: {}", name, subject),
        Some(&id),
    );

    Ok(respond::created(views::contact(&row), "message received"))
}

pub async fn list_contacts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ContactQuery>,
) -> Result<impl IntoResponse, ApiError> {
    policy::require_role(&claims, Role::Admin)?;

    let limit = clamp_limit(query.limit);
    let (rows, total) = state.db.list_contacts(
        query.status.map(|s| s.as_str()),
        query.search.as_deref(),
        query.page,
        limit,
    )?;

    let data = ContactListData {
        contacts: rows.iter().map(views::contact).collect(),
        status_counts: state.db.contact_status_counts()?,
    };
    Ok(respond::page(
        data,
        "contacts listed",
        Pagination::new(query.page, limit, total),
    ))
}

/// Reading a new contact marks it read as a side effect, exactly once.
pub async fn get_contact(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    policy::require_role(&claims, Role::Admin)?;

    state.db.mark_contact_read_if_new(&id)?;
    let row = state
        .db
        .get_contact(&id)?
        .ok_or(ApiError::NotFound("contact"))?;

    Ok(respond::ok(views::contact(&row), "contact"))
}

pub async fn update_contact(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<UpdateContactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    policy::require_role(&claims, Role::Admin)?;

    if !state.db.update_contact_status(&id, req.status.as_str())? {
        return Err(ApiError::NotFound("contact"));
    }

    let row = state
        .db
        .get_contact(&id)?
        .ok_or(ApiError::NotFound("contact"))?;
    Ok(respond::ok(views::contact(&row), "contact updated"))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    policy::require_role(&claims, Role::Admin)?;

    let row = state
        .db
        .get_contact(&id)?
        .ok_or(ApiError::NotFound("contact"))?;
    if let Some(stored) = &row.attachment {
        state.storage.delete_attachment(stored).await?;
    }

    state.db.delete_contact(&id)?;
    Ok(respond::ok((), "contact deleted"))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::validation(format!("malformed multipart field: {}", e)))
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::validation(format!("{} is required", field))),
    }
}
