use anyhow::Result;
use pulse_types::models::StatusCount;

use super::reports::status_counts;
use super::users::count_where;
use super::{OptionalExt, SqlFilter, page_offset};
use crate::Database;
use crate::models::ConsultationRow;

const COLS: &str = "id, patient_id, question, category, status, response, responder_id, responded_at, created_at, updated_at";

impl Database {
    pub fn insert_consultation(
        &self,
        id: &str,
        patient_id: &str,
        question: &str,
        category: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO consultations (id, patient_id, question, category)
                 VALUES (?1, ?2, ?3, ?4)",
                (id, patient_id, question, category),
            )?;
            Ok(())
        })
    }

    pub fn get_consultation(&self, id: &str) -> Result<Option<ConsultationRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {} FROM consultations WHERE id = ?1", COLS))?;
            stmt.query_row([id], map_consultation).optional()
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn list_consultations(
        &self,
        patient_id: Option<&str>,
        status: Option<&str>,
        category: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<ConsultationRow>, u64)> {
        let mut filter = SqlFilter::new();
        if let Some(patient_id) = patient_id {
            filter.eq("patient_id", patient_id.to_string());
        }
        if let Some(status) = status {
            filter.eq("status", status.to_string());
        }
        if let Some(category) = category {
            filter.eq("category", category.to_string());
        }

        self.with_conn(|conn| {
            let total = count_where(conn, "consultations", &filter)?;

            let sql = format!(
                "SELECT {} FROM consultations{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
                COLS,
                filter.where_clause()
            );
            filter.push_param(limit as i64);
            filter.push_param(page_offset(page, limit));

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(filter.params()), map_consultation)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok((rows, total))
        })
    }

    pub fn consultation_status_counts(&self) -> Result<Vec<StatusCount>> {
        self.with_conn(|conn| status_counts(conn, "consultations"))
    }

    /// Record a response. When `overwrite` is false the UPDATE only fires if no
    /// response exists yet; an admin amending an answer passes true.
    pub fn set_consultation_response(
        &self,
        id: &str,
        response: &str,
        responder_id: &str,
        overwrite: bool,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let guard = if overwrite { "" } else { " AND response IS NULL" };
            let n = conn.execute(
                &format!(
                    "UPDATE consultations SET
                        response = ?2,
                        responder_id = ?3,
                        responded_at = datetime('now'),
                        status = 'answered',
                        updated_at = datetime('now')
                     WHERE id = ?1{}",
                    guard
                ),
                (id, response, responder_id),
            )?;
            Ok(n > 0)
        })
    }

    pub fn update_consultation(
        &self,
        id: &str,
        question: Option<&str>,
        category: Option<&str>,
        status: Option<&str>,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE consultations SET
                    question = COALESCE(?2, question),
                    category = COALESCE(?3, category),
                    status = COALESCE(?4, status),
                    updated_at = datetime('now')
                 WHERE id = ?1",
                (id, question, category, status),
            )?;
            Ok(n > 0)
        })
    }

    pub fn delete_consultation(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM consultations WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }
}

fn map_consultation(
    row: &rusqlite::Row<'_>,
) -> std::result::Result<ConsultationRow, rusqlite::Error> {
    Ok(ConsultationRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        question: row.get(2)?,
        category: row.get(3)?,
        status: row.get(4)?,
        response: row.get(5)?,
        responder_id: row.get(6)?,
        responded_at: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::Database;

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_user("p1", "amira", "a@example.com", "h", "user").unwrap();
        db.create_user("d1", "dr-sami", "s@example.com", "h", "doctor").unwrap();
        db.insert_consultation("q1", "p1", "persistent headaches", "neurology").unwrap();
        db
    }

    #[test]
    fn test_response_set_at_most_once() {
        let db = seeded();

        assert!(db.set_consultation_response("q1", "see a specialist", "d1", false).unwrap());
        let row = db.get_consultation("q1").unwrap().unwrap();
        assert_eq!(row.status, "answered");
        assert_eq!(row.response.as_deref(), Some("see a specialist"));
        assert!(row.responded_at.is_some());

        // a second non-overwriting respond is a no-op
        assert!(!db.set_consultation_response("q1", "other advice", "d1", false).unwrap());
        let row = db.get_consultation("q1").unwrap().unwrap();
        assert_eq!(row.response.as_deref(), Some("see a specialist"));

        // admin amendment goes through
        assert!(db.set_consultation_response("q1", "amended advice", "d1", true).unwrap());
        let row = db.get_consultation("q1").unwrap().unwrap();
        assert_eq!(row.response.as_deref(), Some("amended advice"));
    }

    #[test]
    fn test_list_scoping_and_counts() {
        let db = seeded();
        db.insert_consultation("q2", "p1", "rash on arm", "dermatology").unwrap();
        db.set_consultation_response("q2", "apply ointment", "d1", false).unwrap();

        let (rows, total) = db.list_consultations(Some("p1"), None, None, 1, 20).unwrap();
        assert_eq!(total, 2);
        assert_eq!(rows.len(), 2);

        let (_, pending) = db
            .list_consultations(None, Some("pending"), None, 1, 20)
            .unwrap();
        assert_eq!(pending, 1);

        let counts = db.consultation_status_counts().unwrap();
        assert_eq!(counts.iter().map(|c| c.count).sum::<u64>(), 2);
    }
}
