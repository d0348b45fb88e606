//! Folio Media
//!
//! Rendering-side asset logic for the Folio portfolio viewer. Portfolio
//! documents reference their avatars, covers, images and videos by opaque
//! blob-store identifiers; this crate turns those identifiers into URLs and
//! decides what to show when a URL fails to load.
//!
//! ## Components
//!
//! - **Color decoding**: packed `0xAARRGGBB` integers to `#rrggbb` and
//!   `rgba(...)` strings
//! - **Identifier resolution**: identifier + media kind to an ordered list of
//!   candidate URLs (direct view, then thumbnail; videos get one preview URL)
//! - **Fallback**: a per-slot reducer that walks the candidate list on
//!   delivery failures and ends in a placeholder state
//! - **Media lists**: a project's images and videos merged into one
//!   wrap-around carousel sequence
//! - **Ambient presentation**: header background and avatar computed once
//!   per document
//!
//! ```text
//!  identifier ──▶ Resolver ──▶ CandidateList ──▶ FallbackState ◀── delivery reports
//!                                                      │
//!                                                      ▼
//!                                                  Directive ──▶ renderer
//! ```
//!
//! Everything here is synchronous and performs no I/O.

pub mod color;
pub mod config;
pub mod document;
pub mod fallback;
pub mod media_list;
pub mod presentation;
pub mod resolver;

pub use color::{decode_hex, decode_rgba, PackedColor};
pub use config::{ResolverConfig, TemplateError};
pub use document::{ColorValue, PortfolioDocument, Project};
pub use fallback::{
    DeliveryOutcome, DeliveryReport, Directive, FallbackController, FallbackState,
    PlaceholderReason, SlotPhase,
};
pub use media_list::{Carousel, EntryKind, MediaEntry, MediaList};
pub use presentation::{AmbientPresentation, AvatarPresentation, HeaderBackground};
pub use resolver::{resolve, AssetIdentifier, CandidateList, MediaKind, Resolver};
