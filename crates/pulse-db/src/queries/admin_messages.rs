use anyhow::Result;

use super::users::count_where;
use super::{OptionalExt, SqlFilter, page_offset};
use crate::Database;
use crate::models::AdminMessageRow;

const COLS: &str = "id, sender_id, recipient_id, subject, body, status, created_at";

impl Database {
    pub fn insert_admin_message(
        &self,
        id: &str,
        sender_id: &str,
        recipient_id: &str,
        subject: &str,
        body: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO admin_messages (id, sender_id, recipient_id, subject, body)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, sender_id, recipient_id, subject, body),
            )?;
            Ok(())
        })
    }

    pub fn get_admin_message(&self, id: &str) -> Result<Option<AdminMessageRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {} FROM admin_messages WHERE id = ?1", COLS))?;
            stmt.query_row([id], map_message).optional()
        })
    }

    /// First read by the recipient flips a new message to read, exactly once.
    pub fn mark_admin_message_read_if_new(&self, id: &str, recipient_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE admin_messages SET status = 'read'
                 WHERE id = ?1 AND recipient_id = ?2 AND status = 'new'",
                (id, recipient_id),
            )?;
            Ok(n > 0)
        })
    }

    pub fn list_admin_messages(
        &self,
        recipient_id: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<AdminMessageRow>, u64)> {
        let mut filter = SqlFilter::new();
        if let Some(recipient_id) = recipient_id {
            filter.eq("recipient_id", recipient_id.to_string());
        }

        self.with_conn(|conn| {
            let total = count_where(conn, "admin_messages", &filter)?;

            let sql = format!(
                "SELECT {} FROM admin_messages{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
                COLS,
                filter.where_clause()
            );
            filter.push_param(limit as i64);
            filter.push_param(page_offset(page, limit));

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(filter.params()), map_message)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok((rows, total))
        })
    }

    pub fn delete_admin_message(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM admin_messages WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }
}

fn map_message(
    row: &rusqlite::Row<'_>,
) -> std::result::Result<AdminMessageRow, rusqlite::Error> {
    Ok(AdminMessageRow {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        recipient_id: row.get(2)?,
        subject: row.get(3)?,
        body: row.get(4)?,
        status: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn test_recipient_read_transition_fires_once() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("adm", "root", "r@example.com", "h", "admin").unwrap();
        db.create_user("u1", "amira", "a@example.com", "h", "user").unwrap();
        db.insert_admin_message("m1", "adm", "u1", "Follow-up", "please update your report").unwrap();

        // a non-recipient read does not transition
        assert!(!db.mark_admin_message_read_if_new("m1", "adm").unwrap());
        assert_eq!(db.get_admin_message("m1").unwrap().unwrap().status, "new");

        assert!(db.mark_admin_message_read_if_new("m1", "u1").unwrap());
        assert!(!db.mark_admin_message_read_if_new("m1", "u1").unwrap());
        assert_eq!(db.get_admin_message("m1").unwrap().unwrap().status, "read");
    }
}
