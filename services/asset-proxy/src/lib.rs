//! Folio Asset Proxy
//!
//! Serves portfolio assets (avatars, covers, images, videos) out of an
//! external blob-storage service whose media endpoint requires an API key.
//! The key lives only in this service; browsers request assets by opaque
//! identifier and receive the bytes with the upstream content type.
//!
//! ## Features
//!
//! - **Credential isolation**: the upstream key is read from configuration
//!   at startup, never accepted from callers, and never logged
//! - **Streaming passthrough**: asset bytes are forwarded chunk by chunk, or
//!   buffered when configured for runtimes that cannot stream
//! - **Serverless entry point**: a function-event handler returning the
//!   asset as a base64 body
//! - **Error translation**: upstream statuses are forwarded, transport
//!   failures become a generic 500
//!
//! ## Architecture
//!
//! ```text
//!   Browser                  Asset Proxy                    Blob Storage
//! ┌──────────┐  GET /asset/{id}  ┌──────────────┐  GET /{id}?alt=media&key=…  ┌──────────┐
//! │ <img>    │──────────────────▶│ api          │────────────────────────────▶│ media    │
//! │ <video>  │◀──────────────────│ upstream     │◀────────────────────────────│ endpoint │
//! └──────────┘  bytes + headers  └──────────────┘        bytes                └──────────┘
//!                                       ▲
//!                                       │ FunctionEvent
//!                                ┌──────────────┐
//!                                │ serverless   │
//!                                └──────────────┘
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod serverless;
pub mod upstream;

pub use api::{bind_api_listener, create_router, serve_api, AppState};
pub use config::{Config, DeliveryMode};
pub use error::{ErrorResponse, ProxyError};
pub use serverless::{handle_event, FunctionEvent, FunctionResponse};
pub use upstream::{Credential, UpstreamAsset, UpstreamClient};
