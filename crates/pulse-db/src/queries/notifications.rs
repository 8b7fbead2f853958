use anyhow::Result;

use super::users::count_where;
use super::{SqlFilter, page_offset};
use crate::Database;
use crate::models::NotificationRow;

const COLS: &str = "id, recipient_id, kind, title, message, read, entity_id, created_at";

impl Database {
    pub fn insert_notification(
        &self,
        id: &str,
        recipient_id: &str,
        kind: &str,
        title: &str,
        message: &str,
        entity_id: Option<&str>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO notifications (id, recipient_id, kind, title, message, entity_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (id, recipient_id, kind, title, message, entity_id),
            )?;
            Ok(())
        })
    }

    pub fn list_notifications(
        &self,
        recipient_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<NotificationRow>, u64)> {
        let mut filter = SqlFilter::new();
        filter.eq("recipient_id", recipient_id.to_string());

        self.with_conn(|conn| {
            let total = count_where(conn, "notifications", &filter)?;

            let sql = format!(
                "SELECT {} FROM notifications{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
                COLS,
                filter.where_clause()
            );
            filter.push_param(limit as i64);
            filter.push_param(page_offset(page, limit));

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(filter.params()), map_notification)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok((rows, total))
        })
    }

    pub fn unread_notification_count(&self, recipient_id: &str) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM notifications WHERE recipient_id = ?1 AND read = 0",
                [recipient_id],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
    }

    /// Recipient-scoped so one user cannot mark another's notification.
    pub fn mark_notification_read(&self, id: &str, recipient_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE notifications SET read = 1 WHERE id = ?1 AND recipient_id = ?2",
                (id, recipient_id),
            )?;
            Ok(n > 0)
        })
    }

    pub fn mark_all_notifications_read(&self, recipient_id: &str) -> Result<u64> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE notifications SET read = 1 WHERE recipient_id = ?1 AND read = 0",
                [recipient_id],
            )?;
            Ok(n as u64)
        })
    }

    pub fn delete_notification(&self, id: &str, recipient_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM notifications WHERE id = ?1 AND recipient_id = ?2",
                (id, recipient_id),
            )?;
            Ok(n > 0)
        })
    }
}

fn map_notification(
    row: &rusqlite::Row<'_>,
) -> std::result::Result<NotificationRow, rusqlite::Error> {
    Ok(NotificationRow {
        id: row.get(0)?,
        recipient_id: row.get(1)?,
        kind: row.get(2)?,
        title: row.get(3)?,
        message: row.get(4)?,
        read: row.get::<_, i64>(5)? != 0,
        entity_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::Database;

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "amira", "a@example.com", "h", "user").unwrap();
        db.create_user("u2", "omar", "o@example.com", "h", "user").unwrap();
        db.insert_notification("n1", "u1", "report_created", "Report received", "...", Some("r1"))
            .unwrap();
        db.insert_notification("n2", "u1", "admin_message", "New message", "...", None).unwrap();
        db
    }

    #[test]
    fn test_unread_count_and_mark_read() {
        let db = seeded();
        assert_eq!(db.unread_notification_count("u1").unwrap(), 2);

        assert!(db.mark_notification_read("n1", "u1").unwrap());
        assert_eq!(db.unread_notification_count("u1").unwrap(), 1);

        // another user cannot mark or delete someone else's notification
        assert!(!db.mark_notification_read("n2", "u2").unwrap());
        assert!(!db.delete_notification("n2", "u2").unwrap());

        assert_eq!(db.mark_all_notifications_read("u1").unwrap(), 1);
        assert_eq!(db.unread_notification_count("u1").unwrap(), 0);
    }

    #[test]
    fn test_list_is_recipient_scoped() {
        let db = seeded();
        let (rows, total) = db.list_notifications("u1", 1, 20).unwrap();
        assert_eq!(total, 2);
        assert_eq!(rows.len(), 2);

        let (_, total) = db.list_notifications("u2", 1, 20).unwrap();
        assert_eq!(total, 0);
    }
}
