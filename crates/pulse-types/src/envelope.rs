use serde::Serialize;

/// Uniform response wrapper carried by every endpoint: the HTTP status code,
/// the payload (or null), and a human-readable message.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: u16,
    pub data: Option<T>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            status: 200,
            data: Some(data),
            message: message.into(),
            pagination: None,
        }
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self {
            status: 201,
            data: Some(data),
            message: message.into(),
            pagination: None,
        }
    }

    pub fn page(data: T, message: impl Into<String>, pagination: Pagination) -> Self {
        Self {
            status: 200,
            data: Some(data),
            message: message.into(),
            pagination: Some(pagination),
        }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            data: None,
            message: message.into(),
            pagination: None,
        }
    }
}

/// Pagination block attached to list responses.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let pages = if limit == 0 {
            0
        } else {
            total.div_ceil(limit as u64)
        };
        Self { page, limit, total, pages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_rounding() {
        assert_eq!(Pagination::new(1, 20, 0).pages, 0);
        assert_eq!(Pagination::new(1, 20, 20).pages, 1);
        assert_eq!(Pagination::new(1, 20, 21).pages, 2);
        assert_eq!(Pagination::new(1, 20, 40).pages, 2);
    }

    #[test]
    fn test_envelope_shape() {
        let env = Envelope::ok(vec![1, 2, 3], "listed");
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["status"], 200);
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["message"], "listed");
        // pagination omitted when absent
        assert!(json.get("pagination").is_none());

        let err = Envelope::<()>::error(404, "report not found");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["data"], serde_json::Value::Null);
    }
}
