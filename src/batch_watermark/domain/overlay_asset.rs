use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetRole {
    Watermark,
    Header,
    Footer,
}

impl AssetRole {
    pub fn default_file_name(&self) -> &'static str {
        match self {
            AssetRole::Watermark => "watermark.png",
            AssetRole::Header => "header.png",
            AssetRole::Footer => "footer.png",
        }
    }
}

impl fmt::Display for AssetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetRole::Watermark => "watermark",
            AssetRole::Header => "header",
            AssetRole::Footer => "footer",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct OverlayAsset {
    pub role: AssetRole,
    pub image: RgbaImage,
}

impl OverlayAsset {
    pub fn new(role: AssetRole, image: RgbaImage) -> Self {
        Self { role, image }
    }
}

/// Overlays prepared once per batch and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct OverlaySet {
    pub watermark: Option<OverlayAsset>,
    pub header: Option<OverlayAsset>,
    pub footer: Option<OverlayAsset>,
}

impl OverlaySet {
    pub fn is_empty(&self) -> bool {
        self.watermark.is_none() && self.header.is_none() && self.footer.is_none()
    }
}

/// Where each overlay file lives; `None` slots are simply not composited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub watermark: Option<PathBuf>,
    pub header: Option<PathBuf>,
    pub footer: Option<PathBuf>,
}

impl AssetPaths {
    pub fn get(&self, role: AssetRole) -> Option<&PathBuf> {
        match role {
            AssetRole::Watermark => self.watermark.as_ref(),
            AssetRole::Header => self.header.as_ref(),
            AssetRole::Footer => self.footer.as_ref(),
        }
    }
}
