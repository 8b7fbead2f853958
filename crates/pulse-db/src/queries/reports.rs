use anyhow::Result;
use pulse_types::models::StatusCount;

use super::users::count_where;
use super::{OptionalExt, SqlFilter, page_offset};
use crate::Database;
use crate::models::ReportRow;

const COLS: &str =
    "id, author_id, report_type, description, latitude, longitude, urgency, status, created_at, updated_at";

impl Database {
    #[allow(clippy::too_many_arguments)]
    pub fn insert_report(
        &self,
        id: &str,
        author_id: &str,
        report_type: &str,
        description: &str,
        latitude: f64,
        longitude: f64,
        urgency: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO reports (id, author_id, report_type, description, latitude, longitude, urgency)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                (id, author_id, report_type, description, latitude, longitude, urgency),
            )?;
            Ok(())
        })
    }

    pub fn get_report(&self, id: &str) -> Result<Option<ReportRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {} FROM reports WHERE id = ?1", COLS))?;
            stmt.query_row([id], map_report).optional()
        })
    }

    /// List reports, optionally scoped to one author (non-privileged callers).
    #[allow(clippy::too_many_arguments)]
    pub fn list_reports(
        &self,
        author_id: Option<&str>,
        status: Option<&str>,
        report_type: Option<&str>,
        urgency: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<ReportRow>, u64)> {
        let mut filter = SqlFilter::new();
        if let Some(author_id) = author_id {
            filter.eq("author_id", author_id.to_string());
        }
        if let Some(status) = status {
            filter.eq("status", status.to_string());
        }
        if let Some(report_type) = report_type {
            filter.eq("report_type", report_type.to_string());
        }
        if let Some(urgency) = urgency {
            filter.eq("urgency", urgency.to_string());
        }

        self.with_conn(|conn| {
            let total = count_where(conn, "reports", &filter)?;

            let sql = format!(
                "SELECT {} FROM reports{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
                COLS,
                filter.where_clause()
            );
            filter.push_param(limit as i64);
            filter.push_param(page_offset(page, limit));

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(filter.params()), map_report)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok((rows, total))
        })
    }

    pub fn report_status_counts(&self) -> Result<Vec<StatusCount>> {
        self.with_conn(|conn| status_counts(conn, "reports"))
    }

    pub fn update_report(
        &self,
        id: &str,
        description: Option<&str>,
        urgency: Option<&str>,
        status: Option<&str>,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE reports SET
                    description = COALESCE(?2, description),
                    urgency = COALESCE(?3, urgency),
                    status = COALESCE(?4, status),
                    updated_at = datetime('now')
                 WHERE id = ?1",
                (id, description, urgency, status),
            )?;
            Ok(n > 0)
        })
    }

    pub fn delete_report(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM reports WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    /// Bounding-box prefilter for nearby queries; the caller refines with the
    /// haversine distance and sorts.
    pub fn reports_in_box(
        &self,
        min_lat: f64,
        max_lat: f64,
        min_lng: f64,
        max_lng: f64,
    ) -> Result<Vec<ReportRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM reports
                 WHERE latitude BETWEEN ?1 AND ?2 AND longitude BETWEEN ?3 AND ?4",
                COLS
            ))?;
            let rows = stmt
                .query_map((min_lat, max_lat, min_lng, max_lng), map_report)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

pub(crate) fn status_counts(
    conn: &rusqlite::Connection,
    table: &str,
) -> Result<Vec<StatusCount>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT status, COUNT(*) FROM {} GROUP BY status",
        table
    ))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(StatusCount {
                status: row.get(0)?,
                count: row.get::<_, i64>(1)? as u64,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn map_report(row: &rusqlite::Row<'_>) -> std::result::Result<ReportRow, rusqlite::Error> {
    Ok(ReportRow {
        id: row.get(0)?,
        author_id: row.get(1)?,
        report_type: row.get(2)?,
        description: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        urgency: row.get(6)?,
        status: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::Database;

    fn db_with_user() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "amira", "a@example.com", "h", "user").unwrap();
        db
    }

    #[test]
    fn test_status_defaults_to_pending() {
        let db = db_with_user();
        db.insert_report("r1", "u1", "accident", "pileup on ring road", 36.8, 10.18, "high")
            .unwrap();

        let row = db.get_report("r1").unwrap().unwrap();
        assert_eq!(row.status, "pending");

        // and it is visible through a status=pending listing
        let (rows, total) = db
            .list_reports(None, Some("pending"), None, None, 1, 20)
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].id, "r1");
    }

    #[test]
    fn test_list_respects_limit_and_total() {
        let db = db_with_user();
        for i in 0..5 {
            db.insert_report(&format!("r{}", i), "u1", "fire", "desc", 36.8, 10.18, "low")
                .unwrap();
        }

        let (rows, total) = db.list_reports(None, None, None, None, 1, 2).unwrap();
        assert_eq!(total, 5);
        assert_eq!(rows.len(), 2);

        let (rows, _) = db.list_reports(None, None, None, None, 3, 2).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_update_and_bounding_box() {
        let db = db_with_user();
        db.insert_report("r1", "u1", "accident", "d", 36.80, 10.18, "high").unwrap();
        db.insert_report("r2", "u1", "accident", "d", 48.85, 2.35, "low").unwrap();

        assert!(db.update_report("r1", None, None, Some("resolved")).unwrap());
        assert_eq!(db.get_report("r1").unwrap().unwrap().status, "resolved");

        let rows = db.reports_in_box(36.0, 37.0, 10.0, 11.0).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "r1");
    }
}
