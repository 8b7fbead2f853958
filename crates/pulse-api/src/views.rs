use std::str::FromStr;

use tracing::warn;

use pulse_db::models::{
    AdminMessageRow, ConsultationRow, ContactRow, DoctorRequestRow, FirstAidRow, HospitalRow,
    NoteRow, NotificationRow, ReportRow, UserRow,
};
use pulse_types::models::{
    AdminMessage, Consultation, ConsultationStatus, Contact, ContactStatus, DoctorRequest,
    FirstAidEntry, Hospital, MessageStatus, Note, Notification, Report, ReportStatus,
    RequestStatus, Role, Urgency, User,
};

/// Row-to-API conversions. Enumerated columns only ever hold values written by
/// validated requests; a corrupt value is logged and mapped to a safe default
/// rather than failing the whole response.
fn parse_or<T: FromStr + Copy>(raw: &str, fallback: T, field: &str, id: &str) -> T {
    match raw.parse::<T>() {
        Ok(v) => v,
        Err(_) => {
            warn!("Corrupt {} '{}' on row '{}'", field, raw, id);
            fallback
        }
    }
}

pub fn user(row: &UserRow) -> User {
    User {
        id: row.id.clone(),
        username: row.username.clone(),
        email: row.email.clone(),
        role: parse_or(&row.role, Role::User, "role", &row.id),
        created_at: row.created_at.clone(),
    }
}

pub fn report(row: &ReportRow) -> Report {
    Report {
        id: row.id.clone(),
        author_id: row.author_id.clone(),
        report_type: row.report_type.clone(),
        description: row.description.clone(),
        location: [row.longitude, row.latitude],
        urgency: parse_or(&row.urgency, Urgency::Low, "urgency", &row.id),
        status: parse_or(&row.status, ReportStatus::Pending, "status", &row.id),
        created_at: row.created_at.clone(),
        updated_at: row.updated_at.clone(),
    }
}

pub fn contact(row: &ContactRow) -> Contact {
    Contact {
        id: row.id.clone(),
        name: row.name.clone(),
        email: row.email.clone(),
        subject: row.subject.clone(),
        message: row.message.clone(),
        attachment: row.attachment.clone(),
        status: parse_or(&row.status, ContactStatus::New, "status", &row.id),
        created_at: row.created_at.clone(),
    }
}

pub fn note(row: &NoteRow) -> Note {
    Note {
        id: row.id.clone(),
        owner_id: row.owner_id.clone(),
        title: row.title.clone(),
        content: row.content.clone(),
        category: row.category.clone(),
        archived: row.archived,
        created_at: row.created_at.clone(),
        updated_at: row.updated_at.clone(),
    }
}

pub fn consultation(row: &ConsultationRow) -> Consultation {
    Consultation {
        id: row.id.clone(),
        patient_id: row.patient_id.clone(),
        question: row.question.clone(),
        category: row.category.clone(),
        status: parse_or(&row.status, ConsultationStatus::Pending, "status", &row.id),
        response: row.response.clone(),
        responder_id: row.responder_id.clone(),
        responded_at: row.responded_at.clone(),
        created_at: row.created_at.clone(),
        updated_at: row.updated_at.clone(),
    }
}

pub fn doctor_request(row: &DoctorRequestRow) -> DoctorRequest {
    DoctorRequest {
        id: row.id.clone(),
        applicant_id: row.applicant_id.clone(),
        specialty: row.specialty.clone(),
        license_number: row.license_number.clone(),
        credentials: row.credentials.clone(),
        status: parse_or(&row.status, RequestStatus::Pending, "status", &row.id),
        reviewer_id: row.reviewer_id.clone(),
        reason: row.reason.clone(),
        created_at: row.created_at.clone(),
        updated_at: row.updated_at.clone(),
    }
}

pub fn first_aid(row: &FirstAidRow) -> FirstAidEntry {
    FirstAidEntry {
        id: row.id.clone(),
        title: row.title.clone(),
        content: row.content.clone(),
        category: row.category.clone(),
        created_at: row.created_at.clone(),
        updated_at: row.updated_at.clone(),
    }
}

pub fn hospital(row: &HospitalRow) -> Hospital {
    Hospital {
        id: row.id.clone(),
        name: row.name.clone(),
        address: row.address.clone(),
        phone: row.phone.clone(),
        location: [row.longitude, row.latitude],
        created_at: row.created_at.clone(),
    }
}

pub fn notification(row: &NotificationRow) -> Notification {
    Notification {
        id: row.id.clone(),
        recipient_id: row.recipient_id.clone(),
        kind: row.kind.clone(),
        title: row.title.clone(),
        message: row.message.clone(),
        read: row.read,
        entity_id: row.entity_id.clone(),
        created_at: row.created_at.clone(),
    }
}

pub fn admin_message(row: &AdminMessageRow) -> AdminMessage {
    AdminMessage {
        id: row.id.clone(),
        sender_id: row.sender_id.clone(),
        recipient_id: row.recipient_id.clone(),
        subject: row.subject.clone(),
        body: row.body.clone(),
        status: parse_or(&row.status, MessageStatus::New, "status", &row.id),
        created_at: row.created_at.clone(),
    }
}
