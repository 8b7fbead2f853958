/// Database row types — these map directly to SQLite rows.
/// Distinct from pulse-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub created_at: String,
}

pub struct ReportRow {
    pub id: String,
    pub author_id: String,
    pub report_type: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub urgency: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct ContactRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub attachment: Option<String>,
    pub status: String,
    pub created_at: String,
}

pub struct NoteRow {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub archived: bool,
    pub created_at: String,
    pub updated_at: String,
}

pub struct ConsultationRow {
    pub id: String,
    pub patient_id: String,
    pub question: String,
    pub category: String,
    pub status: String,
    pub response: Option<String>,
    pub responder_id: Option<String>,
    pub responded_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct DoctorRequestRow {
    pub id: String,
    pub applicant_id: String,
    pub specialty: String,
    pub license_number: String,
    pub credentials: String,
    pub status: String,
    pub reviewer_id: Option<String>,
    pub reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct FirstAidRow {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct HospitalRow {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: String,
}

pub struct NotificationRow {
    pub id: String,
    pub recipient_id: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub entity_id: Option<String>,
    pub created_at: String,
}

pub struct AdminMessageRow {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub subject: String,
    pub body: String,
    pub status: String,
    pub created_at: String,
}
