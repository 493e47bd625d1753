use crate::dto::envelope::ApiResponse;
use crate::error::{Error, Result};
use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as JsonValue;
use url::Url;

/// Thin wrapper over the platform REST backend. Every call resolves to an
/// [`ApiResponse`]; transport and HTTP failures land in `error`, never in `Err`.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
    bearer: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: &str, client: Client) -> Result<Self> {
        // a trailing slash keeps `join` from dropping the last path segment
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| Error::Config(format!("Invalid BACKEND_API_URL {}: {}", base_url, e)))?;
        Ok(Self {
            client,
            base_url,
            bearer: None,
        })
    }

    /// Same client, forwarding the caller's token to the backend.
    pub fn with_bearer(&self, token: Option<&str>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            bearer: token.map(str::to_string),
        }
    }

    pub fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::BadRequest(format!("Invalid resource path {}: {}", path, e)))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResponse<T> {
        self.send(Method::GET, path, None::<&()>, &[]).await
    }

    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResponse<T> {
        self.send(Method::GET, path, None::<&()>, query).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResponse<T> {
        self.send(Method::POST, path, Some(body), &[]).await
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResponse<T> {
        self.send(Method::PATCH, path, Some(body), &[]).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResponse<T> {
        self.send(Method::DELETE, path, None::<&()>, &[]).await
    }

    async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        query: &[(&str, String)],
    ) -> ApiResponse<T> {
        let url = match self.url(path) {
            Ok(url) => url,
            Err(e) => return ApiResponse::err(e.to_string()).with_status(400),
        };

        let mut req: RequestBuilder = self.client.request(method.clone(), url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(token) = &self.bearer {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let res = match req.send().await {
            Ok(res) => res,
            Err(e) => {
                tracing::warn!(%method, path, error = %e, "backend request failed");
                return ApiResponse::err(format!("Backend unreachable: {}", e));
            }
        };

        let status = res.status();
        let text = res.text().await.unwrap_or_default();

        if !status.is_success() {
            let message = error_message_from_body(&text)
                .unwrap_or_else(|| format!("Backend responded with {}", status));
            tracing::warn!(%method, path, status = status.as_u16(), %message, "backend error");
            return ApiResponse::err(message).with_status(status.as_u16());
        }

        match decode_payload::<T>(&text) {
            Ok(data) => ApiResponse::ok(data),
            Err(e) => {
                tracing::warn!(%method, path, error = %e, "unexpected backend payload");
                ApiResponse::err(e.to_string()).with_status(status.as_u16())
            }
        }
    }
}

/// Accepts both bare payloads and payloads already wrapped as
/// `{success, data, error}` (or `{data}`) by the backend.
pub fn decode_payload<T: DeserializeOwned>(text: &str) -> Result<T> {
    let value: JsonValue = if text.trim().is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_str(text)?
    };

    if let Some(obj) = value.as_object() {
        if obj.get("success").and_then(|s| s.as_bool()) == Some(false) {
            let message = error_message_from_value(&value)
                .unwrap_or_else(|| "Backend reported failure".to_string());
            return Err(Error::Upstream {
                status: 200,
                message,
            });
        }
        if let Some(data) = obj.get("data") {
            if let Ok(parsed) = serde_json::from_value::<T>(data.clone()) {
                return Ok(parsed);
            }
        }
    }

    Ok(serde_json::from_value(value)?)
}

/// Pulls a human message out of an error body: `message`, then `error`,
/// then the raw text.
pub fn error_message_from_body(text: &str) -> Option<String> {
    match serde_json::from_str::<JsonValue>(text) {
        Ok(value) => error_message_from_value(&value),
        Err(_) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.chars().take(300).collect())
        }
    }
}

fn error_message_from_value(value: &JsonValue) -> Option<String> {
    value
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| value.get("error").and_then(|m| m.as_str()))
        .or_else(|| {
            value
                .get("data")
                .and_then(|d| d.get("message"))
                .and_then(|m| m.as_str())
        })
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wrapped_and_bare_payloads() {
        let wrapped: Vec<u32> = decode_payload(r#"{"success":true,"data":[1,2]}"#).unwrap();
        assert_eq!(wrapped, vec![1, 2]);
        let bare: Vec<u32> = decode_payload("[3]").unwrap();
        assert_eq!(bare, vec![3]);
    }

    #[test]
    fn wrapped_failure_is_an_error() {
        let res = decode_payload::<JsonValue>(r#"{"success":false,"message":"nope"}"#);
        assert!(matches!(res, Err(Error::Upstream { message, .. }) if message == "nope"));
    }

    #[test]
    fn error_message_prefers_message_field() {
        assert_eq!(
            error_message_from_body(r#"{"message":"Ya postulaste","error":"dup"}"#),
            Some("Ya postulaste".to_string())
        );
        assert_eq!(
            error_message_from_body(r#"{"error":"dup"}"#),
            Some("dup".to_string())
        );
        assert_eq!(error_message_from_body("Bad Gateway"), Some("Bad Gateway".to_string()));
        assert_eq!(error_message_from_body(""), None);
    }

    #[test]
    fn joins_paths_under_base() {
        let client = BackendClient::new("http://localhost:4000/api", Client::new()).unwrap();
        assert_eq!(
            client.url("/jobs/42").unwrap().as_str(),
            "http://localhost:4000/api/jobs/42"
        );
    }
}
