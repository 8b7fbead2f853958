use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Actor roles, ordered by privilege: user < doctor < admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Doctor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Doctor => "doctor",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "doctor" => Ok(Role::Doctor),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!(concat!("invalid ", stringify!($name), " '{}'"), other)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(
    /// Incident report urgency.
    Urgency {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
);

string_enum!(
    ReportStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Resolved => "resolved",
        Dismissed => "dismissed",
    }
);

string_enum!(
    ContactStatus {
        New => "new",
        Read => "read",
        Resolved => "resolved",
    }
);

string_enum!(
    ConsultationStatus {
        Pending => "pending",
        Answered => "answered",
        Closed => "closed",
    }
);

string_enum!(
    /// Direct message read state. Unlike contacts there is no resolution step;
    /// a message is new until its recipient opens it.
    MessageStatus {
        New => "new",
        Read => "read",
    }
);

string_enum!(
    /// Doctor application lifecycle.
    RequestStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
);

// -- Public-facing models --
//
// Ids and timestamps are carried as strings: ids are UUIDv4 text and timestamps
// are SQLite datetime text, both passed through to the client unchanged.

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: String,
}

/// Geolocation payloads are always [longitude, latitude] pairs.
pub type LngLat = [f64; 2];

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub id: String,
    pub author_id: String,
    pub report_type: String,
    pub description: String,
    pub location: LngLat,
    pub urgency: Urgency,
    pub status: ReportStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// A report returned from a nearby query, with the computed great-circle
/// distance from the query point.
#[derive(Debug, Clone, Serialize)]
pub struct NearbyReport {
    #[serde(flatten)]
    pub report: Report,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub attachment: Option<String>,
    pub status: ContactStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Note {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub archived: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Consultation {
    pub id: String,
    pub patient_id: String,
    pub question: String,
    pub category: String,
    pub status: ConsultationStatus,
    pub response: Option<String>,
    pub responder_id: Option<String>,
    pub responded_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorRequest {
    pub id: String,
    pub applicant_id: String,
    pub specialty: String,
    pub license_number: String,
    pub credentials: String,
    pub status: RequestStatus,
    pub reviewer_id: Option<String>,
    pub reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FirstAidEntry {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hospital {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub location: LngLat,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NearbyHospital {
    #[serde(flatten)]
    pub hospital: Hospital,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: String,
    pub recipient_id: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub entity_id: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminMessage {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub subject: String,
    pub body: String,
    pub status: MessageStatus,
    pub created_at: String,
}

/// Per-status document counts attached to some list responses.
#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ordering() {
        assert!(Role::User < Role::Doctor);
        assert!(Role::Doctor < Role::Admin);
    }

    #[test]
    fn test_string_enum_round_trip() {
        assert_eq!("in_progress".parse::<ReportStatus>().unwrap(), ReportStatus::InProgress);
        assert_eq!(ReportStatus::InProgress.as_str(), "in_progress");
        assert!("urgent".parse::<Urgency>().is_err());
    }

    #[test]
    fn test_message_status_has_no_resolved_state() {
        assert!("resolved".parse::<MessageStatus>().is_err());
        assert_eq!("read".parse::<MessageStatus>().unwrap(), MessageStatus::Read);
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let v = serde_json::to_value(ConsultationStatus::Answered).unwrap();
        assert_eq!(v, serde_json::json!("answered"));
        let parsed: RequestStatus = serde_json::from_value(serde_json::json!("rejected")).unwrap();
        assert_eq!(parsed, RequestStatus::Rejected);
    }
}
