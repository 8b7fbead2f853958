use anyhow::Result;
use pulse_types::models::StatusCount;

use super::reports::status_counts;
use super::users::count_where;
use super::{OptionalExt, SqlFilter, page_offset};
use crate::Database;
use crate::models::ContactRow;

const COLS: &str = "id, name, email, subject, message, attachment, status, created_at";

impl Database {
    pub fn insert_contact(
        &self,
        id: &str,
        name: &str,
        email: &str,
        subject: &str,
        message: &str,
        attachment: Option<&str>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO contacts (id, name, email, subject, message, attachment)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (id, name, email, subject, message, attachment),
            )?;
            Ok(())
        })
    }

    pub fn get_contact(&self, id: &str) -> Result<Option<ContactRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {} FROM contacts WHERE id = ?1", COLS))?;
            stmt.query_row([id], map_contact).optional()
        })
    }

    /// First read of a new contact flips it to read. The UPDATE is conditional
    /// on the current status, so the transition fires exactly once.
    pub fn mark_contact_read_if_new(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE contacts SET status = 'read' WHERE id = ?1 AND status = 'new'",
                [id],
            )?;
            Ok(n > 0)
        })
    }

    pub fn list_contacts(
        &self,
        status: Option<&str>,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<ContactRow>, u64)> {
        let mut filter = SqlFilter::new();
        if let Some(status) = status {
            filter.eq("status", status.to_string());
        }
        if let Some(search) = search {
            filter.like(&["subject", "name", "email"], search);
        }

        self.with_conn(|conn| {
            let total = count_where(conn, "contacts", &filter)?;

            let sql = format!(
                "SELECT {} FROM contacts{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
                COLS,
                filter.where_clause()
            );
            filter.push_param(limit as i64);
            filter.push_param(page_offset(page, limit));

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(filter.params()), map_contact)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok((rows, total))
        })
    }

    pub fn contact_status_counts(&self) -> Result<Vec<StatusCount>> {
        self.with_conn(|conn| status_counts(conn, "contacts"))
    }

    pub fn update_contact_status(&self, id: &str, status: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE contacts SET status = ?2 WHERE id = ?1",
                (id, status),
            )?;
            Ok(n > 0)
        })
    }

    pub fn delete_contact(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM contacts WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }
}

fn map_contact(row: &rusqlite::Row<'_>) -> std::result::Result<ContactRow, rusqlite::Error> {
    Ok(ContactRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        subject: row.get(3)?,
        message: row.get(4)?,
        attachment: row.get(5)?,
        status: row.get(6)?,
        created_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn test_read_transition_fires_exactly_once() {
        let db = Database::open_in_memory().unwrap();
        db.insert_contact("c1", "Nadia", "n@example.com", "ambulance delay", "...", None)
            .unwrap();

        assert_eq!(db.get_contact("c1").unwrap().unwrap().status, "new");

        // first read transitions, second does not
        assert!(db.mark_contact_read_if_new("c1").unwrap());
        assert!(!db.mark_contact_read_if_new("c1").unwrap());
        assert_eq!(db.get_contact("c1").unwrap().unwrap().status, "read");

        // an explicitly resolved contact is never flipped back
        assert!(db.update_contact_status("c1", "resolved").unwrap());
        assert!(!db.mark_contact_read_if_new("c1").unwrap());
        assert_eq!(db.get_contact("c1").unwrap().unwrap().status, "resolved");
    }

    #[test]
    fn test_list_and_counts() {
        let db = Database::open_in_memory().unwrap();
        db.insert_contact("c1", "Nadia", "n@example.com", "ambulance delay", "m", None).unwrap();
        db.insert_contact("c2", "Omar", "o@example.com", "billing question", "m", None).unwrap();
        db.mark_contact_read_if_new("c2").unwrap();

        let (rows, total) = db.list_contacts(Some("new"), None, 1, 20).unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].id, "c1");

        let (_, total) = db.list_contacts(None, Some("ambulance"), 1, 20).unwrap();
        assert_eq!(total, 1);

        let counts = db.contact_status_counts().unwrap();
        assert_eq!(counts.len(), 2);
    }
}
