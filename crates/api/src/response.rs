//! JSON response envelope.
//!
//! Every successful response is `{success: true, data, count?}`; errors are
//! shaped by [`crate::error::AppError`] into `{success: false, error}`.

use serde::Serialize;

/// Success envelope wrapped around every response body.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Serialized as `null` for responses without a payload (e.g. deletes).
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Envelope around a single entity.
    #[must_use]
    pub const fn data(data: T) -> Self {
        Self {
            success: true,
            count: None,
            data: Some(data),
        }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// Envelope around a collection, with `count` set to its length.
    #[must_use]
    pub fn list(items: Vec<T>) -> Self {
        Self {
            success: true,
            count: Some(items.len()),
            data: Some(items),
        }
    }
}

impl ApiResponse<serde_json::Value> {
    /// Envelope with a `null` payload, used by deletions.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            success: true,
            count: None,
            data: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_data_envelope() {
        let json = serde_json::to_value(ApiResponse::data(serde_json::json!({"id": 1}))).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": {"id": 1}}));
    }

    #[test]
    fn test_list_envelope_carries_count() {
        let json = serde_json::to_value(ApiResponse::list(vec![1, 2, 3])).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "count": 3, "data": [1, 2, 3]})
        );
    }

    #[test]
    fn test_empty_envelope_has_null_data() {
        let json = serde_json::to_value(ApiResponse::empty()).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": null}));
    }
}
