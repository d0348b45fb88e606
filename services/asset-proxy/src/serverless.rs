//! Function-as-a-service entry point.
//!
//! Serverless runtimes hand the function a JSON event and expect a single
//! JSON response value, so the asset is read whole and returned base64
//! encoded instead of streamed.

use crate::api::AppState;
use crate::error::{ErrorResponse, ProxyError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::instrument;

/// Incoming function event; only the query string is read
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
}

impl FunctionEvent {
    pub fn with_id(id: &str) -> Self {
        Self {
            query_string_parameters: Some(HashMap::from([("id".to_string(), id.to_string())])),
        }
    }

    fn id(&self) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|params| params.get("id"))
            .map(String::as_str)
    }
}

/// Function response value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    pub body: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_base64_encoded: bool,
}

impl From<ProxyError> for FunctionResponse {
    fn from(error: ProxyError) -> Self {
        let body = serde_json::to_string(&ErrorResponse {
            error: error.public_message(),
        })
        .unwrap_or_else(|_| "{\"error\":\"Failed to fetch asset\"}".to_string());

        Self {
            status_code: error.status().as_u16(),
            headers: BTreeMap::new(),
            body,
            is_base64_encoded: false,
        }
    }
}

/// Handle one function invocation
#[instrument(skip(state))]
pub async fn handle_event(state: &AppState, event: FunctionEvent) -> FunctionResponse {
    match buffered_asset(state, event.id()).await {
        Ok(response) => {
            metrics::counter!("asset_proxy_requests_total", "outcome" => "ok").increment(1);
            response
        }
        Err(e) => {
            metrics::counter!("asset_proxy_requests_total", "outcome" => e.outcome()).increment(1);
            e.into()
        }
    }
}

async fn buffered_asset(state: &AppState, identifier: Option<&str>) -> Result<FunctionResponse, ProxyError> {
    let asset = state.fetch_asset(identifier).await?;
    let headers = state
        .success_headers(asset.content_type())
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((canonical_header_name(name.as_str()), value.to_string()))
        })
        .collect();
    let body = asset.into_bytes().await?;

    Ok(FunctionResponse {
        status_code: 200,
        headers,
        body: STANDARD.encode(&body),
        is_base64_encoded: true,
    })
}

/// `content-type` -> `Content-Type`
fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, UpstreamConfig};
    use mockito::Matcher;

    fn state_for(base_url: String, api_key: Option<&str>) -> AppState {
        AppState::from_config(&Config {
            upstream: UpstreamConfig {
                base_url,
                api_key: api_key.map(str::to_string),
                timeout_secs: Some(5),
            },
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_canonical_header_name() {
        assert_eq!(canonical_header_name("content-type"), "Content-Type");
        assert_eq!(canonical_header_name("cache-control"), "Cache-Control");
        assert_eq!(
            canonical_header_name("access-control-allow-origin"),
            "Access-Control-Allow-Origin"
        );
    }

    #[test]
    fn test_event_parsing() {
        let event: FunctionEvent =
            serde_json::from_str(r#"{"queryStringParameters": {"id": "abc"}, "httpMethod": "GET"}"#).unwrap();
        assert_eq!(event.id(), Some("abc"));

        let event: FunctionEvent = serde_json::from_str(r#"{"queryStringParameters": null}"#).unwrap();
        assert_eq!(event.id(), None);
    }

    #[tokio::test]
    async fn test_missing_id() {
        let state = state_for("http://127.0.0.1:9/files".to_string(), Some("k"));
        let response = handle_event(&state, FunctionEvent::default()).await;

        assert_eq!(response.status_code, 400);
        assert_eq!(response.body, r#"{"error":"Missing file ID"}"#);
        assert!(!response.is_base64_encoded);
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let state = state_for("http://127.0.0.1:9/files".to_string(), None);
        let response = handle_event(&state, FunctionEvent::with_id("abc")).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, r#"{"error":"API key not configured"}"#);
    }

    #[tokio::test]
    async fn test_base64_payload() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/files/img1")
            .match_query(Matcher::UrlEncoded("key".into(), "k".into()))
            .with_status(200)
            .with_header("content-type", "image/jpeg")
            .with_body([0xFFu8, 0xD8, 0xFF, 0xE0])
            .create_async()
            .await;

        let state = state_for(format!("{}/files", server.url()), Some("k"));
        let response = handle_event(&state, FunctionEvent::with_id("img1")).await;

        assert_eq!(response.status_code, 200);
        assert!(response.is_base64_encoded);
        assert_eq!(response.body, "/9j/4A==");
        assert_eq!(response.headers["Content-Type"], "image/jpeg");
        assert_eq!(response.headers["Cache-Control"], "public, max-age=3600");
        assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["isBase64Encoded"], true);
    }

    #[tokio::test]
    async fn test_upstream_rejection() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/files/gone")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let state = state_for(format!("{}/files", server.url()), Some("k"));
        let response = handle_event(&state, FunctionEvent::with_id("gone")).await;

        assert_eq!(response.status_code, 404);
        assert_eq!(response.body, r#"{"error":"Failed to fetch asset: Not Found"}"#);
    }
}
