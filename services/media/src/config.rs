use serde::Deserialize;
use thiserror::Error;

/// Placeholder substituted with the asset identifier in every template.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Placeholder substituted with the thumbnail size hint.
pub const SIZE_PLACEHOLDER: &str = "{size}";

pub const DEFAULT_VIEW_TEMPLATE: &str = "https://drive.google.com/uc?export=view&id={id}";
pub const DEFAULT_THUMBNAIL_TEMPLATE: &str = "https://drive.google.com/thumbnail?id={id}&sz={size}";
pub const DEFAULT_PREVIEW_TEMPLATE: &str = "https://drive.google.com/file/d/{id}/preview";
pub const DEFAULT_THUMBNAIL_SIZE: &str = "w1000";

/// Errors raised while loading resolver templates
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template `{name}` is missing the {{id}} placeholder")]
    MissingPlaceholder { name: &'static str },

    #[error("Failed to load resolver configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// URL templates used by the identifier resolver
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Full-resolution direct view URL
    #[serde(default = "default_view_template")]
    pub view_template: String,
    /// Reduced-fidelity thumbnail URL
    #[serde(default = "default_thumbnail_template")]
    pub thumbnail_template: String,
    /// Embeddable video preview page
    #[serde(default = "default_preview_template")]
    pub preview_template: String,
    /// Size hint substituted into the thumbnail template
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: String,
}

fn default_view_template() -> String {
    DEFAULT_VIEW_TEMPLATE.to_string()
}

fn default_thumbnail_template() -> String {
    DEFAULT_THUMBNAIL_TEMPLATE.to_string()
}

fn default_preview_template() -> String {
    DEFAULT_PREVIEW_TEMPLATE.to_string()
}

fn default_thumbnail_size() -> String {
    DEFAULT_THUMBNAIL_SIZE.to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            view_template: default_view_template(),
            thumbnail_template: default_thumbnail_template(),
            preview_template: default_preview_template(),
            thumbnail_size: default_thumbnail_size(),
        }
    }
}

impl ResolverConfig {
    /// Load templates from config files and environment
    pub fn load() -> Result<Self, TemplateError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/media").required(false))
            .add_source(config::File::with_name("/etc/folio/media").required(false))
            // MEDIA__VIEW_TEMPLATE -> view_template
            .add_source(config::Environment::with_prefix("MEDIA").separator("__"))
            .build()?;

        let resolver: ResolverConfig = settings.try_deserialize()?;
        resolver.validate()?;
        Ok(resolver)
    }

    /// Every template must embed the identifier
    pub fn validate(&self) -> Result<(), TemplateError> {
        let templates = [
            ("view_template", &self.view_template),
            ("thumbnail_template", &self.thumbnail_template),
            ("preview_template", &self.preview_template),
        ];

        for (name, template) in templates {
            if !template.contains(ID_PLACEHOLDER) {
                return Err(TemplateError::MissingPlaceholder { name });
            }
        }

        Ok(())
    }
}
