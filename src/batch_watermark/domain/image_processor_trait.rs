use crate::domain::image::OutputFormat;
use crate::domain::layout::LayoutConfig;
use crate::domain::overlay_asset::OverlaySet;
use crate::domain::text_style::TextStyle;
use crate::infrastructure::error::InfrastructureError;
use image::RgbaImage;

/// Per-batch knobs applied to every image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderSettings {
    pub layout: LayoutConfig,
    pub text: Option<TextStyle>,
}

#[cfg_attr(test, mockall::automock)]
pub trait ImageProcessor {
    fn decode(&self, image_bytes: &[u8]) -> Result<RgbaImage, InfrastructureError>;

    /// Paints header, footer, watermark and text onto `raw`, in that order.
    /// The result always has the dimensions of `raw`.
    fn composite(
        &self,
        raw: RgbaImage,
        overlays: &OverlaySet,
        settings: &RenderSettings,
    ) -> Result<RgbaImage, InfrastructureError>;

    fn encode(&self, image: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>, InfrastructureError>;
}
