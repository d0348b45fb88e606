//! Page-wide presentation derived once from a portfolio document and handed
//! to the renderer as a value.

use crate::document::{ColorValue, PortfolioDocument};
use crate::resolver::{CandidateList, MediaKind, Resolver};

/// Header color used when the document specifies none
pub const DEFAULT_HEADER_COLOR: &str = "#6200ea";

/// Header background
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderBackground {
    /// Image candidates, with the color to show once they are exhausted
    Image {
        candidates: CandidateList,
        fallback_color: String,
    },
    Color(String),
}

/// Avatar candidates plus the placeholder shown when none load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarPresentation {
    pub candidates: CandidateList,
    pub initials: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbientPresentation {
    pub header: HeaderBackground,
    pub avatar: AvatarPresentation,
}

impl AmbientPresentation {
    pub fn from_document(doc: &PortfolioDocument, resolver: &Resolver) -> Self {
        let color = header_color(doc.header_background_color.as_ref());
        let background = resolver.resolve(doc.header_background_image.as_deref(), MediaKind::Cover);

        let header = if background.is_empty() {
            HeaderBackground::Color(color)
        } else {
            HeaderBackground::Image {
                candidates: background,
                fallback_color: color,
            }
        };

        let avatar = AvatarPresentation {
            candidates: resolver.resolve(doc.avatar.as_deref(), MediaKind::Avatar),
            initials: initials(doc.name.as_deref().unwrap_or_default()),
        };

        Self { header, avatar }
    }
}

fn header_color(value: Option<&ColorValue>) -> String {
    match value {
        Some(ColorValue::Packed(color)) => color.rgba(),
        Some(ColorValue::Css(css)) if !css.trim().is_empty() => css.trim().to_string(),
        _ => DEFAULT_HEADER_COLOR.to_string(),
    }
}

/// Up to two uppercase initials from a display name
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}
