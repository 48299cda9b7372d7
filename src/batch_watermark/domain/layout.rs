use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};

/// Vertical gap between the header (or top margin) and the watermark.
pub const WATERMARK_GAP: u32 = 20;
/// Images shorter than this get the watermark pushed further down.
pub const SMALL_IMAGE_HEIGHT: u32 = 600;
pub const SMALL_IMAGE_WATERMARK_OFFSET: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub side_margin: u32,
    pub footer_bottom_margin: u32,
    pub header_top_margin: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            side_margin: 20,
            footer_bottom_margin: 10,
            header_top_margin: 10,
        }
    }
}

impl LayoutConfig {
    /// Width a header or footer is stretched to on a `raw_width` wide image.
    pub fn banner_width(&self, raw_width: u32) -> Result<u32, DomainError> {
        self.side_margin
            .checked_mul(2)
            .and_then(|margins| raw_width.checked_sub(margins))
            .filter(|w| *w > 0)
            .ok_or_else(|| {
                DomainError::InvalidGeometry(format!(
                    "image width {} leaves no room between side margins of {}",
                    raw_width, self.side_margin
                ))
            })
    }

    pub fn header_origin(&self) -> (i64, i64) {
        (self.side_margin as i64, self.header_top_margin as i64)
    }

    pub fn footer_origin(&self, raw_height: u32, footer_height: u32) -> (i64, i64) {
        let y = raw_height as i64 - footer_height as i64 - self.footer_bottom_margin as i64;
        (self.side_margin as i64, y)
    }

    pub fn watermark_origin(
        &self,
        raw_width: u32,
        raw_height: u32,
        watermark_width: u32,
        header_height: u32,
    ) -> (i64, i64) {
        let x = (raw_width as i64 - watermark_width as i64).div_euclid(2);
        let mut y = self.header_top_margin as i64 + header_height as i64 + WATERMARK_GAP as i64;
        if raw_height < SMALL_IMAGE_HEIGHT {
            y += SMALL_IMAGE_WATERMARK_OFFSET as i64;
        }
        (x, y)
    }
}

/// Size of an overlay stretched to `target_width`, keeping its aspect ratio.
/// The height is rounded down.
pub fn scaled_to_width(width: u32, height: u32, target_width: u32) -> Result<(u32, u32), DomainError> {
    if width == 0 || height == 0 {
        return Err(DomainError::InvalidGeometry(format!(
            "overlay has empty dimensions {}x{}",
            width, height
        )));
    }
    let scaled_height = (height as u64 * target_width as u64 / width as u64) as u32;
    if target_width == 0 || scaled_height == 0 {
        return Err(DomainError::InvalidGeometry(format!(
            "overlay {}x{} collapses when scaled to width {}",
            width, height, target_width
        )));
    }
    Ok((target_width, scaled_height))
}
