use super::error::InfrastructureError;
use crate::domain::overlay_asset::{AssetPaths, AssetRole, OverlayAsset, OverlaySet};
use image::RgbaImage;
use std::path::Path;
use tracing::{info, warn};

pub struct AssetStore;

impl AssetStore {
    pub fn new() -> Self {
        Self
    }

    fn decode_asset(&self, path: &Path) -> Result<RgbaImage, InfrastructureError> {
        let img = image::open(path).map_err(|e| InfrastructureError::AssetLoadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(img.to_rgba8())
    }

    /// Loads one overlay. Missing or undecodable files are logged and
    /// reported as absent.
    pub fn load(&self, role: AssetRole, path: &Path) -> Option<OverlayAsset> {
        if !path.exists() {
            warn!("No {} asset at {:?}, skipping it", role, path);
            return None;
        }
        match self.decode_asset(path) {
            Ok(image) => {
                info!(
                    "Loaded {} asset {:?} ({}x{})",
                    role,
                    path,
                    image.width(),
                    image.height()
                );
                Some(OverlayAsset::new(role, image))
            }
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    /// Loads every configured overlay once and fades the watermark by
    /// `opacity`. Header and footer keep their own alpha.
    pub fn load_overlays(&self, paths: &AssetPaths, opacity: f32) -> OverlaySet {
        let load = |role: AssetRole| paths.get(role).and_then(|path| self.load(role, path));

        let watermark = load(AssetRole::Watermark).map(|asset| OverlayAsset {
            image: scale_alpha(&asset.image, opacity),
            ..asset
        });

        OverlaySet {
            watermark,
            header: load(AssetRole::Header),
            footer: load(AssetRole::Footer),
        }
    }
}

/// Multiplies every alpha value by `factor`, keeping whatever partial
/// transparency the source already had. Factors outside `[0, 1]` leave the
/// image untouched.
pub fn scale_alpha(image: &RgbaImage, factor: f32) -> RgbaImage {
    let mut scaled = image.clone();
    if !(0.0..=1.0).contains(&factor) {
        warn!("Opacity {} is outside 0..=1, keeping the asset's own alpha", factor);
        return scaled;
    }
    for pixel in scaled.pixels_mut() {
        pixel[3] = (pixel[3] as f32 * factor).round() as u8;
    }
    scaled
}
