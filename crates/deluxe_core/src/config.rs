use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

pub const DEFAULT_ENVIRONMENT: &str = "master";
pub const DELIVERY_HOST: &str = "cdn.contentful.com";
pub const PREVIEW_HOST: &str = "preview.contentful.com";

/// Which delivery API a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMode {
    Delivery,
    Preview,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    pub space_id: String,
    pub environment: String,
    pub access_token: Option<String>,
    pub preview_token: Option<String>,
    pub preview_secret: Option<String>,
    pub use_preview: bool,
}

#[derive(Debug, Default, Deserialize)]
struct DeliveryConfigRaw {
    space_id: Option<String>,
    environment: Option<String>,
    access_token: Option<String>,
    preview_token: Option<String>,
    preview_secret: Option<String>,
    use_preview: Option<bool>,
}

impl DeliveryConfig {
    pub fn default_mode(&self) -> ApiMode {
        if self.use_preview {
            ApiMode::Preview
        } else {
            ApiMode::Delivery
        }
    }

    pub fn host(&self, mode: ApiMode) -> &'static str {
        match mode {
            ApiMode::Delivery => DELIVERY_HOST,
            ApiMode::Preview => PREVIEW_HOST,
        }
    }

    pub fn token(&self, mode: ApiMode) -> Result<&str> {
        let (token, key) = match mode {
            ApiMode::Delivery => (&self.access_token, "CONTENTFUL_ACCESS_TOKEN"),
            ApiMode::Preview => (&self.preview_token, "CONTENTFUL_PREVIEW_TOKEN"),
        };
        match token.as_deref() {
            Some(token) => Ok(token),
            None => bail!("missing {key} for {mode:?} API"),
        }
    }

    pub fn entries_url(&self, mode: ApiMode) -> String {
        format!(
            "https://{}/spaces/{}/environments/{}/entries",
            self.host(mode),
            self.space_id,
            self.environment
        )
    }
}

/// Loads settings from an optional YAML file, then applies the process environment.
pub fn load_delivery_config(path: Option<&Path>) -> Result<DeliveryConfig> {
    let raw = match path {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
        ),
        None => None,
    };
    parse_delivery_config(raw.as_deref(), |key| std::env::var(key).ok())
}

/// Environment values, as returned by `env`, override values from the file.
pub fn parse_delivery_config<F>(yaml: Option<&str>, env: F) -> Result<DeliveryConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let file: DeliveryConfigRaw = match yaml {
        Some(text) => serde_yaml::from_str(text).context("failed to parse YAML config")?,
        None => DeliveryConfigRaw::default(),
    };
    let pick = |key: &str, fallback: Option<String>| {
        env(key)
            .filter(|value| !value.trim().is_empty())
            .or(fallback)
            .filter(|value| !value.trim().is_empty())
    };

    let Some(space_id) = pick("CONTENTFUL_SPACE_ID", file.space_id) else {
        bail!("missing required setting: space_id (CONTENTFUL_SPACE_ID)");
    };
    let use_preview = match env("USE_CONTENTFUL_PREVIEW") {
        Some(value) => value == "true",
        None => file.use_preview.unwrap_or(false),
    };

    Ok(DeliveryConfig {
        space_id,
        environment: pick("CONTENTFUL_ENVIRONMENT", file.environment)
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
        access_token: pick("CONTENTFUL_ACCESS_TOKEN", file.access_token),
        preview_token: pick("CONTENTFUL_PREVIEW_TOKEN", file.preview_token),
        preview_secret: pick("CONTENTFUL_PREVIEW_SECRET", file.preview_secret),
        use_preview,
    })
}
