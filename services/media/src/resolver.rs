//! Identifier resolution.
//!
//! Turns an opaque blob-store identifier into the ordered list of URLs a
//! renderer should try for it. Resolution is string formatting only: no
//! network access and no caching, so it is safe to call on every render.

use crate::config::{ResolverConfig, ID_PLACEHOLDER, SIZE_PLACEHOLDER};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;
use std::sync::OnceLock;

/// Opaque identifier naming a blob in the upstream store.
///
/// Construction goes through [`AssetIdentifier::parse`], so a value of this
/// type is never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AssetIdentifier(String);

impl AssetIdentifier {
    /// Trim and accept any non-empty token. Blank input means "no asset".
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Stricter form used when filtering document lists: rejects tokens
    /// that would corrupt a URL template.
    pub fn parse_well_formed(raw: &str) -> Option<Self> {
        let id = Self::parse(raw)?;
        let malformed = id
            .0
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '?' | '#' | '&'));

        if malformed {
            None
        } else {
            Some(id)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AssetIdentifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| serde::de::Error::custom("blank asset identifier"))
    }
}

/// What a slot renders; decides which templates apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Icon,
    Avatar,
    Cover,
}

impl MediaKind {
    pub fn is_video(self) -> bool {
        matches!(self, MediaKind::Video)
    }
}

/// Ordered retrieval URLs for one (identifier, kind) pair, highest
/// fidelity first. Never reordered once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateList(Vec<String>);

impl CandidateList {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Index<usize> for CandidateList {
    type Output = str;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Resolver bound to a set of URL templates
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    config: ResolverConfig,
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Candidate URLs for a raw identifier. Blank or absent identifiers
    /// yield an empty list, which callers treat as "no asset".
    pub fn resolve(&self, identifier: Option<&str>, kind: MediaKind) -> CandidateList {
        match identifier.and_then(AssetIdentifier::parse) {
            Some(id) => self.resolve_id(&id, kind),
            None => CandidateList::empty(),
        }
    }

    /// Candidate URLs for an already-parsed identifier
    pub fn resolve_id(&self, id: &AssetIdentifier, kind: MediaKind) -> CandidateList {
        if kind.is_video() {
            // Videos have no thumbnail tier
            return CandidateList(vec![fill(&self.config.preview_template, id)]);
        }

        let thumbnail = fill(&self.config.thumbnail_template, id)
            .replace(SIZE_PLACEHOLDER, &self.config.thumbnail_size);

        CandidateList(vec![fill(&self.config.view_template, id), thumbnail])
    }
}

fn fill(template: &str, id: &AssetIdentifier) -> String {
    template.replace(ID_PLACEHOLDER, id.as_str())
}

/// Resolve against the built-in templates
pub fn resolve(identifier: Option<&str>, kind: MediaKind) -> CandidateList {
    static DEFAULT: OnceLock<Resolver> = OnceLock::new();
    DEFAULT.get_or_init(Resolver::default).resolve(identifier, kind)
}
