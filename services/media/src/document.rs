//! Portfolio document model.
//!
//! Only the parts the asset layer reads are modelled. Every field is
//! optional and unknown fields are ignored; the document is not validated.
//! A value of the wrong shape reads as absent, and a malformed list entry is
//! skipped, so one bad field never rejects the whole document.

use crate::color::PackedColor;
use crate::media_list::MediaList;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortfolioDocument {
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub bio: Option<String>,
    /// Avatar identifier
    #[serde(alias = "avatarId", deserialize_with = "lenient")]
    pub avatar: Option<String>,
    /// Header background image identifier
    #[serde(deserialize_with = "lenient")]
    pub header_background_image: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub header_background_color: Option<ColorValue>,
    #[serde(deserialize_with = "lenient_list")]
    pub contact_links: Vec<ContactLink>,
    #[serde(deserialize_with = "lenient_list")]
    pub categories: Vec<Category>,
}

/// Header color as written in the document
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Packed(PackedColor),
    Css(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactLink {
    #[serde(deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub url: Option<String>,
    /// Icon identifier
    #[serde(deserialize_with = "lenient")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    /// Cover image identifier
    #[serde(deserialize_with = "lenient")]
    pub cover: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(alias = "images", deserialize_with = "lenient_list")]
    pub image_ids: Vec<String>,
    #[serde(alias = "videos", deserialize_with = "lenient_list")]
    pub video_ids: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub links: Vec<ProjectLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectLink {
    #[serde(deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub url: Option<String>,
}

impl PortfolioDocument {
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.categories.iter().flat_map(|c| c.projects.iter())
    }
}

impl Project {
    /// Carousel sequence for this project
    pub fn media_list(&self) -> MediaList {
        MediaList::build(&self.image_ids, &self.video_ids)
    }
}

/// Field value, or the default when it has the wrong shape
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// List entries that parse as `T`; anything else is skipped, and a
/// non-list value reads as empty.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(values) => Ok(values
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}
