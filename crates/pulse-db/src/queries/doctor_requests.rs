use anyhow::Result;
use pulse_types::models::StatusCount;

use super::reports::status_counts;
use super::users::count_where;
use super::{OptionalExt, SqlFilter, page_offset};
use crate::Database;
use crate::models::DoctorRequestRow;

const COLS: &str = "id, applicant_id, specialty, license_number, credentials, status, reviewer_id, reason, created_at, updated_at";

impl Database {
    pub fn insert_doctor_request(
        &self,
        id: &str,
        applicant_id: &str,
        specialty: &str,
        license_number: &str,
        credentials: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO doctor_requests (id, applicant_id, specialty, license_number, credentials)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, applicant_id, specialty, license_number, credentials),
            )?;
            Ok(())
        })
    }

    pub fn get_doctor_request(&self, id: &str) -> Result<Option<DoctorRequestRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {} FROM doctor_requests WHERE id = ?1", COLS))?;
            stmt.query_row([id], map_request).optional()
        })
    }

    /// An applicant may have at most one open request.
    pub fn has_pending_doctor_request(&self, applicant_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM doctor_requests WHERE applicant_id = ?1 AND status = 'pending'",
                [applicant_id],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    pub fn list_doctor_requests(
        &self,
        applicant_id: Option<&str>,
        status: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<DoctorRequestRow>, u64)> {
        let mut filter = SqlFilter::new();
        if let Some(applicant_id) = applicant_id {
            filter.eq("applicant_id", applicant_id.to_string());
        }
        if let Some(status) = status {
            filter.eq("status", status.to_string());
        }

        self.with_conn(|conn| {
            let total = count_where(conn, "doctor_requests", &filter)?;

            let sql = format!(
                "SELECT {} FROM doctor_requests{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
                COLS,
                filter.where_clause()
            );
            filter.push_param(limit as i64);
            filter.push_param(page_offset(page, limit));

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(filter.params()), map_request)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok((rows, total))
        })
    }

    pub fn doctor_request_status_counts(&self) -> Result<Vec<StatusCount>> {
        self.with_conn(|conn| status_counts(conn, "doctor_requests"))
    }

    /// Move a pending request to approved/rejected. Conditional on the current
    /// status, so reviewing a non-pending request is a no-op and reports false.
    pub fn review_doctor_request(
        &self,
        id: &str,
        status: &str,
        reviewer_id: &str,
        reason: Option<&str>,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE doctor_requests SET
                    status = ?2,
                    reviewer_id = ?3,
                    reason = ?4,
                    updated_at = datetime('now')
                 WHERE id = ?1 AND status = 'pending'",
                (id, status, reviewer_id, reason),
            )?;
            Ok(n > 0)
        })
    }

    pub fn delete_doctor_request(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM doctor_requests WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }
}

fn map_request(
    row: &rusqlite::Row<'_>,
) -> std::result::Result<DoctorRequestRow, rusqlite::Error> {
    Ok(DoctorRequestRow {
        id: row.get(0)?,
        applicant_id: row.get(1)?,
        specialty: row.get(2)?,
        license_number: row.get(3)?,
        credentials: row.get(4)?,
        status: row.get(5)?,
        reviewer_id: row.get(6)?,
        reason: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::Database;

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "amira", "a@example.com", "h", "user").unwrap();
        db.create_user("adm", "root", "r@example.com", "h", "admin").unwrap();
        db.insert_doctor_request("dr1", "u1", "cardiology", "LIC-4411", "10y practice").unwrap();
        db
    }

    #[test]
    fn test_review_only_from_pending() {
        let db = seeded();

        assert!(db.review_doctor_request("dr1", "approved", "adm", None).unwrap());
        let row = db.get_doctor_request("dr1").unwrap().unwrap();
        assert_eq!(row.status, "approved");
        assert_eq!(row.reviewer_id.as_deref(), Some("adm"));

        // re-reviewing an already-decided request is rejected
        assert!(!db.review_doctor_request("dr1", "rejected", "adm", Some("nope")).unwrap());
        assert_eq!(db.get_doctor_request("dr1").unwrap().unwrap().status, "approved");
    }

    #[test]
    fn test_rejection_records_reason() {
        let db = seeded();
        assert!(db
            .review_doctor_request("dr1", "rejected", "adm", Some("license expired"))
            .unwrap());
        let row = db.get_doctor_request("dr1").unwrap().unwrap();
        assert_eq!(row.status, "rejected");
        assert_eq!(row.reason.as_deref(), Some("license expired"));
    }

    #[test]
    fn test_single_open_request_per_applicant() {
        let db = seeded();
        assert!(db.has_pending_doctor_request("u1").unwrap());

        db.review_doctor_request("dr1", "rejected", "adm", Some("incomplete")).unwrap();
        assert!(!db.has_pending_doctor_request("u1").unwrap());
    }
}
