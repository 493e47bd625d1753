use crate::error::{Error, Result};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

/// The `{success, data, error}` envelope every resource call resolves to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    /// Set when `data` is demo content standing in for a failed call.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub demo: bool,
    /// HTTP status of the failed upstream call, if any.
    #[serde(skip)]
    pub status: Option<u16>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            demo: false,
            status: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            demo: false,
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            demo: self.demo,
            status: self.status,
        }
    }

    pub fn into_result(self) -> Result<T> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(Error::Upstream {
                status: self.status.unwrap_or(502),
                message: "Backend returned an empty payload".to_string(),
            }),
            (false, _) => Err(Error::Upstream {
                status: self.status.unwrap_or(502),
                message: self
                    .error
                    .unwrap_or_else(|| "Backend request failed".to_string()),
            }),
        }
    }
}

/// Data that may have been substituted with demo content after a failed call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sourced<T> {
    pub data: T,
    pub demo: bool,
}

impl<T> Sourced<T> {
    pub fn live(data: T) -> Self {
        Self { data, demo: false }
    }

    pub fn demo(data: T) -> Self {
        Self { data, demo: true }
    }
}

impl<T> From<Sourced<T>> for ApiResponse<T> {
    fn from(sourced: Sourced<T>) -> Self {
        Self {
            demo: sourced.demo,
            ..ApiResponse::ok(sourced.data)
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = match (self.success, self.status) {
            (true, _) => StatusCode::OK,
            (false, Some(code)) => {
                StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            (false, None) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(self)).into_response()
    }
}

impl<T> ApiResponse<T> {
    /// Resolves to the payload, or to `fallback()` flagged as demo data.
    pub fn or_demo(self, what: &str, fallback: impl FnOnce() -> T) -> Sourced<T> {
        match self.into_result() {
            Ok(data) => Sourced::live(data),
            Err(e) => {
                tracing::warn!(resource = what, error = %e, "backend call failed, serving demo data");
                Sourced::demo(fallback())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_response_becomes_upstream_error() {
        let resp: ApiResponse<u32> = ApiResponse::err("job not found").with_status(404);
        match resp.into_result() {
            Err(Error::Upstream { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "job not found");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn or_demo_prefers_live_data() {
        let live = ApiResponse::ok(vec![1, 2]).or_demo("numbers", || vec![9]);
        assert_eq!(live, Sourced::live(vec![1, 2]));

        let demo = ApiResponse::<Vec<i32>>::err("down").or_demo("numbers", || vec![9]);
        assert_eq!(demo, Sourced::demo(vec![9]));
    }

    #[test]
    fn demo_flag_only_appears_when_set() {
        let json = serde_json::to_value(ApiResponse::from(Sourced::demo(vec![1]))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "data": [1], "error": null, "demo": true})
        );
    }

    #[test]
    fn envelope_serializes_uniformly() {
        let json = serde_json::to_value(ApiResponse::ok("x")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "data": "x", "error": null})
        );
    }
}
