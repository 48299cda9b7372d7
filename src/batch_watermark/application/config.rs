use super::error::ApplicationError;
use crate::domain::batch::BatchRequest;
use crate::domain::image_processor_trait::RenderSettings;
use crate::domain::layout::LayoutConfig;
use crate::domain::overlay_asset::{AssetPaths, AssetRole};
use crate::domain::text_style::TextStyle;
use crate::infrastructure::font_resolver::FontConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Watermark opacity, 0.0 (invisible) to 1.0 (as drawn).
    pub opacity: f32,
    pub directories: DirectoryConfig,
    pub assets: AssetPaths,
    pub layout: LayoutConfig,
    pub text: Option<TextStyle>,
    pub fonts: FontConfig,
    pub server: ServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            opacity: 0.8,
            directories: DirectoryConfig::default(),
            assets: AssetPaths::default(),
            layout: LayoutConfig::default(),
            text: None,
            fonts: FontConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub raw: PathBuf,
    pub done: PathBuf,
    pub archive: PathBuf,
    pub assets: PathBuf,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            raw: PathBuf::from("RAW"),
            done: PathBuf::from("Done"),
            archive: PathBuf::from("Archive"),
            assets: PathBuf::from("assets"),
        }
    }
}

impl DirectoryConfig {
    pub fn all(&self) -> [&Path; 4] {
        [
            self.raw.as_path(),
            self.done.as_path(),
            self.archive.as_path(),
            self.assets.as_path(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3300,
        }
    }
}

impl AppConfig {
    /// Reads a TOML config file. A missing file means all defaults.
    pub fn load(path: &Path) -> Result<Self, ApplicationError> {
        if !path.exists() {
            info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            ApplicationError::ConfigurationError(format!("cannot read {:?}: {}", path, e))
        })?;
        let config = Self::from_toml(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ApplicationError> {
        let config: AppConfig = toml_edit::de::from_str(content)
            .map_err(|e| ApplicationError::ConfigurationError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ApplicationError> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ApplicationError::ConfigurationError(format!(
                "opacity must be between 0 and 1, got {}",
                self.opacity
            )));
        }
        Ok(())
    }

    /// Explicit asset paths, falling back to `<assets dir>/<role>.png`.
    pub fn asset_paths(&self) -> AssetPaths {
        let resolve = |role: AssetRole| {
            let path = self.assets.get(role).cloned();
            Some(path.unwrap_or_else(|| self.directories.assets.join(role.default_file_name())))
        };
        AssetPaths {
            watermark: resolve(AssetRole::Watermark),
            header: resolve(AssetRole::Header),
            footer: resolve(AssetRole::Footer),
        }
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            layout: self.layout,
            text: self.text.clone(),
        }
    }

    pub fn batch_request(&self, inputs: Vec<PathBuf>) -> BatchRequest {
        BatchRequest {
            inputs,
            assets: self.asset_paths(),
            layout: self.layout,
            opacity: self.opacity,
            text: self.text.clone(),
            output_dir: self.directories.done.clone(),
            archive_dir: self.directories.archive.clone(),
        }
    }
}
