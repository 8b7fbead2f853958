use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

use pulse_types::envelope::{Envelope, Pagination};

/// Envelope constructors paired with the matching HTTP status code.
/// Handlers return these directly; the envelope's `status` field and the
/// response status always agree.

pub fn ok<T: Serialize>(data: T, message: &str) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::OK, Json(Envelope::ok(data, message)))
}

pub fn created<T: Serialize>(data: T, message: &str) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::CREATED, Json(Envelope::created(data, message)))
}

pub fn page<T: Serialize>(
    data: T,
    message: &str,
    pagination: Pagination,
) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::OK, Json(Envelope::page(data, message, pagination)))
}

/// Clamp a caller-supplied page size to the allowed maximum.
pub fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(1, pulse_types::api::MAX_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(0), 1);
        assert_eq!(clamp_limit(20), 20);
        assert_eq!(clamp_limit(10_000), 100);
    }
}
