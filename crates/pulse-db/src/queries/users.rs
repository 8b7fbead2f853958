use anyhow::Result;
use rusqlite::Connection;

use super::{OptionalExt, SqlFilter, page_offset};
use crate::Database;
use crate::models::UserRow;

const COLS: &str = "id, username, email, password, role, created_at";

impl Database {
    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password, role) VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, username, email, password_hash, role),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {} FROM users WHERE username = ?1", COLS))?;
            stmt.query_row([username], map_user).optional()
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {} FROM users WHERE id = ?1", COLS))?;
            stmt.query_row([id], map_user).optional()
        })
    }

    pub fn list_users(
        &self,
        role: Option<&str>,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<UserRow>, u64)> {
        let mut filter = SqlFilter::new();
        if let Some(role) = role {
            filter.eq("role", role.to_string());
        }
        if let Some(search) = search {
            filter.like(&["username", "email"], search);
        }

        self.with_conn(|conn| {
            let total = count_where(conn, "users", &filter)?;

            let sql = format!(
                "SELECT {} FROM users{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
                COLS,
                filter.where_clause()
            );
            filter.push_param(limit as i64);
            filter.push_param(page_offset(page, limit));

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(filter.params()), map_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok((rows, total))
        })
    }

    pub fn update_user_profile(
        &self,
        id: &str,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE users SET username = COALESCE(?2, username), email = COALESCE(?3, email)
                 WHERE id = ?1",
                (id, username, email),
            )?;
            Ok(n > 0)
        })
    }

    pub fn update_user_role(&self, id: &str, role: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("UPDATE users SET role = ?2 WHERE id = ?1", (id, role))?;
            Ok(n > 0)
        })
    }

    pub fn delete_user(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    /// Recipient set for admin-wide notification fan-out.
    pub fn get_admin_ids(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id FROM users WHERE role = 'admin'")?;
            let ids = stmt
                .query_map([], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ids)
        })
    }
}

pub(crate) fn count_where(conn: &Connection, table: &str, filter: &SqlFilter) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {}{}", table, filter.where_clause());
    let count: i64 = conn.query_row(&sql, rusqlite::params_from_iter(filter.params()), |row| {
        row.get(0)
    })?;
    Ok(count as u64)
}

fn map_user(row: &rusqlite::Row<'_>) -> std::result::Result<UserRow, rusqlite::Error> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        role: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn test_create_then_get_is_stable() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "amira", "amira@example.com", "hash", "user")
            .unwrap();

        let row = db.get_user_by_id("u1").unwrap().unwrap();
        assert_eq!(row.username, "amira");
        assert_eq!(row.role, "user");

        let by_name = db.get_user_by_username("amira").unwrap().unwrap();
        assert_eq!(by_name.id, "u1");
    }

    #[test]
    fn test_duplicate_username_is_a_constraint_violation() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "amira", "a@example.com", "h", "user").unwrap();

        let err = db
            .create_user("u2", "amira", "b@example.com", "h", "user")
            .unwrap_err();
        assert!(crate::is_constraint_violation(&err));

        // an ordinary failure is not misclassified
        assert!(!crate::is_constraint_violation(&anyhow::anyhow!("disk full")));
    }

    #[test]
    fn test_list_users_filters_and_counts() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "amira", "amira@example.com", "h", "user").unwrap();
        db.create_user("u2", "dr-sami", "sami@example.com", "h", "doctor").unwrap();
        db.create_user("u3", "root", "root@example.com", "h", "admin").unwrap();

        let (rows, total) = db.list_users(Some("doctor"), None, 1, 20).unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].id, "u2");

        let (rows, total) = db.list_users(None, Some("example.com"), 1, 2).unwrap();
        assert_eq!(total, 3);
        assert!(rows.len() <= 2);
    }

    #[test]
    fn test_role_update_and_admin_ids() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "amira", "a@example.com", "h", "user").unwrap();
        db.create_user("u2", "root", "r@example.com", "h", "admin").unwrap();

        assert!(db.update_user_role("u1", "doctor").unwrap());
        assert_eq!(db.get_user_by_id("u1").unwrap().unwrap().role, "doctor");
        assert!(!db.update_user_role("missing", "doctor").unwrap());

        assert_eq!(db.get_admin_ids().unwrap(), vec!["u2".to_string()]);
    }
}
