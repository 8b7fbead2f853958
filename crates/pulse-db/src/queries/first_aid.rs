use anyhow::Result;

use super::users::count_where;
use super::{OptionalExt, SqlFilter, page_offset};
use crate::Database;
use crate::models::FirstAidRow;

const COLS: &str = "id, title, content, category, created_at, updated_at";

impl Database {
    pub fn insert_first_aid(
        &self,
        id: &str,
        title: &str,
        content: &str,
        category: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO first_aid (id, title, content, category) VALUES (?1, ?2, ?3, ?4)",
                (id, title, content, category),
            )?;
            Ok(())
        })
    }

    pub fn get_first_aid(&self, id: &str) -> Result<Option<FirstAidRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {} FROM first_aid WHERE id = ?1", COLS))?;
            stmt.query_row([id], map_entry).optional()
        })
    }

    pub fn list_first_aid(
        &self,
        category: Option<&str>,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<FirstAidRow>, u64)> {
        let mut filter = SqlFilter::new();
        if let Some(category) = category {
            filter.eq("category", category.to_string());
        }
        if let Some(search) = search {
            filter.like(&["title", "content"], search);
        }

        self.with_conn(|conn| {
            let total = count_where(conn, "first_aid", &filter)?;

            let sql = format!(
                "SELECT {} FROM first_aid{} ORDER BY title ASC LIMIT ? OFFSET ?",
                COLS,
                filter.where_clause()
            );
            filter.push_param(limit as i64);
            filter.push_param(page_offset(page, limit));

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(filter.params()), map_entry)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok((rows, total))
        })
    }

    pub fn update_first_aid(
        &self,
        id: &str,
        title: Option<&str>,
        content: Option<&str>,
        category: Option<&str>,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE first_aid SET
                    title = COALESCE(?2, title),
                    content = COALESCE(?3, content),
                    category = COALESCE(?4, category),
                    updated_at = datetime('now')
                 WHERE id = ?1",
                (id, title, content, category),
            )?;
            Ok(n > 0)
        })
    }

    pub fn delete_first_aid(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM first_aid WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }
}

fn map_entry(row: &rusqlite::Row<'_>) -> std::result::Result<FirstAidRow, rusqlite::Error> {
    Ok(FirstAidRow {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        category: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn test_search_matches_title_and_content() {
        let db = Database::open_in_memory().unwrap();
        db.insert_first_aid("f1", "Burns", "cool the burn under running water", "injuries").unwrap();
        db.insert_first_aid("f2", "Choking", "five back blows", "airway").unwrap();

        let (rows, total) = db.list_first_aid(None, Some("running water"), 1, 20).unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].id, "f1");

        let (_, total) = db.list_first_aid(Some("airway"), None, 1, 20).unwrap();
        assert_eq!(total, 1);
    }
}
