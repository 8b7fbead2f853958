use anyhow::Result;

use super::users::count_where;
use super::{OptionalExt, SqlFilter, page_offset};
use crate::Database;
use crate::models::HospitalRow;

const COLS: &str = "id, name, address, phone, latitude, longitude, created_at";

impl Database {
    pub fn insert_hospital(
        &self,
        id: &str,
        name: &str,
        address: &str,
        phone: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO hospitals (id, name, address, phone, latitude, longitude)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (id, name, address, phone, latitude, longitude),
            )?;
            Ok(())
        })
    }

    pub fn get_hospital(&self, id: &str) -> Result<Option<HospitalRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {} FROM hospitals WHERE id = ?1", COLS))?;
            stmt.query_row([id], map_hospital).optional()
        })
    }

    pub fn list_hospitals(
        &self,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<HospitalRow>, u64)> {
        let mut filter = SqlFilter::new();
        if let Some(search) = search {
            filter.like(&["name", "address"], search);
        }

        self.with_conn(|conn| {
            let total = count_where(conn, "hospitals", &filter)?;

            let sql = format!(
                "SELECT {} FROM hospitals{} ORDER BY name ASC LIMIT ? OFFSET ?",
                COLS,
                filter.where_clause()
            );
            filter.push_param(limit as i64);
            filter.push_param(page_offset(page, limit));

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(filter.params()), map_hospital)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok((rows, total))
        })
    }

    pub fn update_hospital(
        &self,
        id: &str,
        name: Option<&str>,
        address: Option<&str>,
        phone: Option<&str>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE hospitals SET
                    name = COALESCE(?2, name),
                    address = COALESCE(?3, address),
                    phone = COALESCE(?4, phone),
                    latitude = COALESCE(?5, latitude),
                    longitude = COALESCE(?6, longitude)
                 WHERE id = ?1",
                (id, name, address, phone, latitude, longitude),
            )?;
            Ok(n > 0)
        })
    }

    pub fn delete_hospital(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM hospitals WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    /// Bounding-box prefilter for nearby queries; the caller refines with the
    /// haversine distance and sorts.
    pub fn hospitals_in_box(
        &self,
        min_lat: f64,
        max_lat: f64,
        min_lng: f64,
        max_lng: f64,
    ) -> Result<Vec<HospitalRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM hospitals
                 WHERE latitude BETWEEN ?1 AND ?2 AND longitude BETWEEN ?3 AND ?4",
                COLS
            ))?;
            let rows = stmt
                .query_map((min_lat, max_lat, min_lng, max_lng), map_hospital)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn map_hospital(row: &rusqlite::Row<'_>) -> std::result::Result<HospitalRow, rusqlite::Error> {
    Ok(HospitalRow {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        phone: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn test_bounding_box_excludes_far_hospitals() {
        let db = Database::open_in_memory().unwrap();
        db.insert_hospital("h1", "Charles Nicolle", "Tunis", "+216", 36.806, 10.171).unwrap();
        db.insert_hospital("h2", "Sahloul", "Sousse", "+216", 35.839, 10.584).unwrap();

        let rows = db.hospitals_in_box(36.7, 36.9, 10.0, 10.3).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "h1");
    }

    #[test]
    fn test_list_search_and_update() {
        let db = Database::open_in_memory().unwrap();
        db.insert_hospital("h1", "Charles Nicolle", "Tunis", "", 36.806, 10.171).unwrap();

        let (rows, total) = db.list_hospitals(Some("nicolle"), 1, 20).unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].id, "h1");

        assert!(db.update_hospital("h1", None, None, Some("+216 71 000 000"), None, None).unwrap());
        assert_eq!(
            db.get_hospital("h1").unwrap().unwrap().phone,
            "+216 71 000 000"
        );
    }
}
