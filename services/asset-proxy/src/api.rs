use crate::config::{ApiConfig, Config, DeliveryMode};
use crate::error::ProxyError;
use crate::upstream::{Credential, UpstreamAsset, UpstreamClient, FALLBACK_CONTENT_TYPE};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::{rejection::PathRejection, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub credential: Option<Credential>,
    pub cache_control: HeaderValue,
    pub delivery: DeliveryMode,
}

impl AppState {
    pub fn new(upstream: Arc<UpstreamClient>, credential: Option<Credential>, api: &ApiConfig) -> Self {
        let cache_control = HeaderValue::from_str(&format!("public, max-age={}", api.cache_max_age_secs))
            .unwrap_or_else(|_| HeaderValue::from_static("public, max-age=3600"));

        Self {
            upstream,
            credential,
            cache_control,
            delivery: api.delivery,
        }
    }

    /// Build state from configuration. A missing credential is not an
    /// error here; every asset request answers 500 until one is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let upstream = UpstreamClient::new(&config.upstream).context("Failed to initialize upstream client")?;
        let credential = config.upstream.api_key.as_deref().and_then(Credential::new);

        if credential.is_none() {
            warn!("Upstream API key not configured; asset requests will fail");
        }

        Ok(Self::new(Arc::new(upstream), credential, &config.api))
    }

    /// Validate the request and fetch the asset from upstream
    pub async fn fetch_asset(&self, identifier: Option<&str>) -> Result<UpstreamAsset, ProxyError> {
        let identifier = identifier
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(ProxyError::MissingIdentifier)?;

        let credential = self.credential.as_ref().ok_or_else(|| {
            warn!("Rejecting asset request: API key not configured");
            ProxyError::MissingCredential
        })?;

        self.upstream.fetch(identifier, credential).await
    }

    /// Headers attached to every successful asset response. Assets are
    /// public, so the origin is always `*`.
    pub fn success_headers(&self, content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_str(content_type)
                .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_CONTENT_TYPE)),
        );
        headers.insert(header::CACHE_CONTROL, self.cache_control.clone());
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers
    }
}

/// Query form of the asset request
#[derive(Debug, Deserialize)]
pub struct AssetQuery {
    pub id: Option<String>,
}

/// Create the API router
pub fn create_router(state: AppState, config: &ApiConfig) -> Router {
    let cors = if config.cors_enabled {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/asset", get(get_asset_by_query))
        .route("/asset/:identifier", get(get_asset))
        .route("/drive-image/:identifier", get(get_asset))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "asset-proxy"
    }))
}

/// `GET /asset/{identifier}`
#[instrument(skip(state))]
async fn get_asset(
    State(state): State<AppState>,
    identifier: Result<Path<String>, PathRejection>,
) -> Response {
    match identifier {
        Ok(Path(identifier)) => serve_asset(&state, Some(&identifier)).await,
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "Rejecting undecodable identifier");
            reject(ProxyError::InvalidIdentifier)
        }
    }
}

/// `GET /asset?id={identifier}`
#[instrument(skip(state))]
async fn get_asset_by_query(State(state): State<AppState>, Query(query): Query<AssetQuery>) -> Response {
    serve_asset(&state, query.id.as_deref()).await
}

async fn serve_asset(state: &AppState, identifier: Option<&str>) -> Response {
    match deliver(state, identifier).await {
        Ok(response) => {
            metrics::counter!("asset_proxy_requests_total", "outcome" => "ok").increment(1);
            response
        }
        Err(e) => reject(e),
    }
}

fn reject(error: ProxyError) -> Response {
    metrics::counter!("asset_proxy_requests_total", "outcome" => error.outcome()).increment(1);
    error.into_response()
}

async fn deliver(state: &AppState, identifier: Option<&str>) -> Result<Response, ProxyError> {
    let asset = state.fetch_asset(identifier).await?;
    let headers = state.success_headers(asset.content_type());

    let body = match state.delivery {
        DeliveryMode::Stream => Body::from_stream(asset.into_stream()),
        DeliveryMode::Buffered => Body::from(asset.into_bytes().await?),
    };

    Ok((StatusCode::OK, headers, body).into_response())
}

/// Bind the API listen address. Called before the server task is spawned
/// so that an address already in use fails startup.
pub async fn bind_api_listener(config: &ApiConfig) -> Result<TcpListener> {
    let addr = format!("{}:{}", config.host, config.port);

    TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", addr))
}

/// Serve the asset API on an already-bound listener
pub async fn serve_api(listener: TcpListener, state: AppState, config: &ApiConfig) -> Result<()> {
    let router = create_router(state, config);

    if let Ok(addr) = listener.local_addr() {
        info!(address = %addr, "Starting asset proxy API server");
    }

    axum::serve(listener, router)
        .await
        .context("API server error")?;

    Ok(())
}
