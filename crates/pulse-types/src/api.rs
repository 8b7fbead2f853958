use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    ConsultationStatus, ContactStatus, LngLat, ReportStatus, Role, Urgency, User,
};

// -- JWT Claims --

/// JWT claims shared between the REST middleware and token issuance.
/// Canonical definition lives here in pulse-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: Role,
    pub exp: usize,
}

// -- Pagination defaults --
//
// Query structs carry page/limit inline (rather than a flattened struct)
// because urlencoded deserialization does not handle flattened numerics.

pub fn default_page() -> u32 {
    1
}

pub fn default_limit() -> u32 {
    20
}

pub const MAX_LIMIT: u32 = 100;

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

// -- Users --

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub role: Option<Role>,
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

// -- Reports --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateReportRequest {
    pub report_type: String,
    pub description: String,
    /// [longitude, latitude]
    pub location: LngLat,
    pub urgency: Urgency,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateReportRequest {
    pub description: Option<String>,
    pub urgency: Option<Urgency>,
    pub status: Option<ReportStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub status: Option<ReportStatus>,
    pub report_type: Option<String>,
    pub urgency: Option<Urgency>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Query parameters for nearby searches (hospitals, reports).
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
}

pub fn default_radius_km() -> f64 {
    10.0
}

// -- Contacts --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateContactRequest {
    pub status: ContactStatus,
}

#[derive(Debug, Deserialize)]
pub struct ContactQuery {
    pub status: Option<ContactStatus>,
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

// -- Notes --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub archived: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct NoteQuery {
    pub category: Option<String>,
    pub archived: Option<bool>,
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

// -- Consultations --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateConsultationRequest {
    pub question: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RespondConsultationRequest {
    pub response: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateConsultationRequest {
    pub question: Option<String>,
    pub category: Option<String>,
    pub status: Option<ConsultationStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ConsultationQuery {
    pub status: Option<ConsultationStatus>,
    pub category: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

// -- Doctor requests --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateDoctorRequestRequest {
    pub specialty: String,
    pub license_number: String,
    #[serde(default)]
    pub credentials: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RejectDoctorRequestRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct DoctorRequestQuery {
    pub status: Option<crate::models::RequestStatus>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

// -- First aid --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateFirstAidRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateFirstAidRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FirstAidQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

// -- Hospitals --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateHospitalRequest {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub phone: String,
    /// [longitude, latitude]
    pub location: LngLat,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateHospitalRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub location: Option<LngLat>,
}

#[derive(Debug, Deserialize)]
pub struct HospitalQuery {
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

// -- Notifications --

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

// -- Admin messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateAdminMessageRequest {
    pub recipient_id: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminMessageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}
