use tracing::warn;
use uuid::Uuid;

use pulse_db::Database;

/// Notification kinds, one per originating write.
pub mod kind {
    pub const REPORT_CREATED: &str = "report_created";
    pub const CONTACT_RECEIVED: &str = "contact_received";
    pub const CONSULTATION_CREATED: &str = "consultation_created";
    pub const CONSULTATION_ANSWERED: &str = "consultation_answered";
    pub const DOCTOR_REQUEST_SUBMITTED: &str = "doctor_request_submitted";
    pub const DOCTOR_REQUEST_RECEIVED: &str = "doctor_request_received";
    pub const DOCTOR_REQUEST_APPROVED: &str = "doctor_request_approved";
    pub const DOCTOR_REQUEST_REJECTED: &str = "doctor_request_rejected";
    pub const ADMIN_MESSAGE: &str = "admin_message";
}

/// Insert one notification for a single recipient.
///
/// Fan-out is a side effect of an already-committed primary write and is not
/// atomic with it: a failed insert is logged and swallowed, never rolled back
/// or retried.
pub fn notify_user(
    db: &Database,
    recipient_id: &str,
    kind: &str,
    title: &str,
    message: &str,
    entity_id: Option<&str>,
) {
    let id = Uuid::new_v4().to_string();
    if let Err(e) = db.insert_notification(&id, recipient_id, kind, title, message, entity_id) {
        warn!(
            "notification insert failed for recipient {}: {:#}",
            recipient_id, e
        );
    }
}

/// Fan a notification out to every admin-role user: explicit query for the
/// recipient set, then one insert per admin.
pub fn notify_admins(db: &Database, kind: &str, title: &str, message: &str, entity_id: Option<&str>) {
    let admin_ids = match db.get_admin_ids() {
        Ok(ids) => ids,
        Err(e) => {
            warn!("admin lookup for notification fan-out failed: {:#}", e);
            return;
        }
    };

    for admin_id in &admin_ids {
        notify_user(db, admin_id, kind, title, message, entity_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_db::Database;

    #[test]
    fn test_fan_out_reaches_every_admin() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("a1", "root", "r@example.com", "h", "admin").unwrap();
        db.create_user("a2", "ops", "o@example.com", "h", "admin").unwrap();
        db.create_user("u1", "amira", "a@example.com", "h", "user").unwrap();

        notify_admins(&db, kind::CONTACT_RECEIVED, "New contact", "from Nadia", Some("c1"));

        assert_eq!(db.unread_notification_count("a1").unwrap(), 1);
        assert_eq!(db.unread_notification_count("a2").unwrap(), 1);
        assert_eq!(db.unread_notification_count("u1").unwrap(), 0);

        let (rows, _) = db.list_notifications("a1", 1, 20).unwrap();
        assert_eq!(rows[0].kind, kind::CONTACT_RECEIVED);
        assert_eq!(rows[0].entity_id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_failed_insert_is_swallowed() {
        let db = Database::open_in_memory().unwrap();
        // recipient does not exist; the FK violation must not panic or surface
        notify_user(&db, "ghost", kind::ADMIN_MESSAGE, "t", "m", None);
    }
}
