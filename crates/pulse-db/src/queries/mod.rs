pub mod admin_messages;
pub mod consultations;
pub mod contacts;
pub mod doctor_requests;
pub mod first_aid;
pub mod hospitals;
pub mod notes;
pub mod notifications;
pub mod reports;
pub mod users;

use anyhow::Result;
use rusqlite::types::ToSql;

/// Incrementally built WHERE clause for list filters.
///
/// Filters are ANDed; `like` ORs a substring match across several columns.
pub(crate) struct SqlFilter {
    clauses: Vec<String>,
    params: Vec<Box<dyn ToSql>>,
}

impl SqlFilter {
    pub fn new() -> Self {
        Self {
            clauses: Vec::new(),
            params: Vec::new(),
        }
    }

    pub fn eq<T: ToSql + 'static>(&mut self, column: &str, value: T) {
        self.clauses.push(format!("{} = ?", column));
        self.params.push(Box::new(value));
    }

    pub fn like(&mut self, columns: &[&str], needle: &str) {
        let ors: Vec<String> = columns.iter().map(|c| format!("{} LIKE ?", c)).collect();
        self.clauses.push(format!("({})", ors.join(" OR ")));
        let pattern = format!("%{}%", needle);
        for _ in columns {
            self.params.push(Box::new(pattern.clone()));
        }
    }

    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn push_param<T: ToSql + 'static>(&mut self, value: T) {
        self.params.push(Box::new(value));
    }

    pub fn params(&self) -> impl Iterator<Item = &dyn ToSql> {
        self.params.iter().map(|p| p.as_ref())
    }
}

/// Offset for a 1-based page.
pub(crate) fn page_offset(page: u32, limit: u32) -> i64 {
    (page.saturating_sub(1) as i64) * (limit as i64)
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_builds_where_clause() {
        let mut f = SqlFilter::new();
        assert_eq!(f.where_clause(), "");

        f.eq("status", "pending".to_string());
        f.like(&["subject", "name"], "burn");
        assert_eq!(
            f.where_clause(),
            " WHERE status = ? AND (subject LIKE ? OR name LIKE ?)"
        );
        assert_eq!(f.params().count(), 3);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(3, 20), 40);
        assert_eq!(page_offset(0, 20), 0); // clamped, page is 1-based
    }
}
