//! Standard API response types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Response for single data item
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data, meta: None }
    }

    pub fn with_meta(data: T, meta: serde_json::Value) -> Self {
        Self {
            data,
            meta: Some(meta),
        }
    }
}

impl<T: Serialize> IntoResponse for DataResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Helper for no content responses
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_response_omits_empty_meta() {
        let body = serde_json::to_value(DataResponse::new(vec![1, 2, 3])).unwrap();
        assert_eq!(body, serde_json::json!({ "data": [1, 2, 3] }));
    }

    #[test]
    fn data_response_carries_meta() {
        let body = serde_json::to_value(DataResponse::with_meta(
            "ok",
            serde_json::json!({ "min_price": 0 }),
        ))
        .unwrap();
        assert_eq!(body["meta"]["min_price"], 0);
    }
}
