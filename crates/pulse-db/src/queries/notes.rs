use anyhow::Result;

use super::users::count_where;
use super::{OptionalExt, SqlFilter, page_offset};
use crate::Database;
use crate::models::NoteRow;

const COLS: &str = "id, owner_id, title, content, category, archived, created_at, updated_at";

impl Database {
    pub fn insert_note(
        &self,
        id: &str,
        owner_id: &str,
        title: &str,
        content: &str,
        category: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO notes (id, owner_id, title, content, category)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, owner_id, title, content, category),
            )?;
            Ok(())
        })
    }

    pub fn get_note(&self, id: &str) -> Result<Option<NoteRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {} FROM notes WHERE id = ?1", COLS))?;
            stmt.query_row([id], map_note).optional()
        })
    }

    /// Notes are strictly per-owner; every listing is scoped.
    #[allow(clippy::too_many_arguments)]
    pub fn list_notes(
        &self,
        owner_id: &str,
        category: Option<&str>,
        archived: Option<bool>,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<NoteRow>, u64)> {
        let mut filter = SqlFilter::new();
        filter.eq("owner_id", owner_id.to_string());
        if let Some(category) = category {
            filter.eq("category", category.to_string());
        }
        if let Some(archived) = archived {
            filter.eq("archived", archived as i64);
        }
        if let Some(search) = search {
            filter.like(&["title", "content"], search);
        }

        self.with_conn(|conn| {
            let total = count_where(conn, "notes", &filter)?;

            let sql = format!(
                "SELECT {} FROM notes{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
                COLS,
                filter.where_clause()
            );
            filter.push_param(limit as i64);
            filter.push_param(page_offset(page, limit));

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(filter.params()), map_note)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok((rows, total))
        })
    }

    pub fn update_note(
        &self,
        id: &str,
        title: Option<&str>,
        content: Option<&str>,
        category: Option<&str>,
        archived: Option<bool>,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE notes SET
                    title = COALESCE(?2, title),
                    content = COALESCE(?3, content),
                    category = COALESCE(?4, category),
                    archived = COALESCE(?5, archived),
                    updated_at = datetime('now')
                 WHERE id = ?1",
                (id, title, content, category, archived.map(|a| a as i64)),
            )?;
            Ok(n > 0)
        })
    }

    pub fn delete_note(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM notes WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }
}

fn map_note(row: &rusqlite::Row<'_>) -> std::result::Result<NoteRow, rusqlite::Error> {
    Ok(NoteRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        category: row.get(4)?,
        archived: row.get::<_, i64>(5)? != 0,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn test_notes_are_owner_scoped() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "amira", "a@example.com", "h", "user").unwrap();
        db.create_user("u2", "omar", "o@example.com", "h", "user").unwrap();
        db.insert_note("n1", "u1", "allergies", "penicillin", "medical").unwrap();
        db.insert_note("n2", "u2", "bp log", "120/80", "medical").unwrap();

        let (rows, total) = db.list_notes("u1", None, None, None, 1, 20).unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].id, "n1");
    }

    #[test]
    fn test_archive_flag_round_trip() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "amira", "a@example.com", "h", "user").unwrap();
        db.insert_note("n1", "u1", "t", "c", "").unwrap();

        assert!(!db.get_note("n1").unwrap().unwrap().archived);
        assert!(db.update_note("n1", None, None, None, Some(true)).unwrap());
        assert!(db.get_note("n1").unwrap().unwrap().archived);

        let (_, active) = db.list_notes("u1", None, Some(false), None, 1, 20).unwrap();
        assert_eq!(active, 0);
        let (_, archived) = db.list_notes("u1", None, Some(true), None, 1, 20).unwrap();
        assert_eq!(archived, 1);
    }
}
