use crate::domain::color::Color;
use crate::domain::font_resolver_trait::{FontFace, FontResolver};
use crate::domain::image::{OutputFormat, JPEG_QUALITY};
use crate::domain::image_processor_trait::{ImageProcessor, RenderSettings};
use crate::domain::layout::{scaled_to_width, LayoutConfig};
use crate::domain::overlay_asset::{OverlayAsset, OverlaySet};
use crate::domain::text_style::TextStyle;
use super::error::InfrastructureError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use rusttype::{Font, Scale};
use std::io::Cursor;
use std::sync::Arc;
use tracing::debug;

/// Padding around the text box when a background is painted.
const TEXT_BACKGROUND_PADDING: i32 = 10;

pub struct DefaultImageProcessor {
    fonts: Arc<dyn FontResolver + Send + Sync>,
}

impl DefaultImageProcessor {
    pub fn new(fonts: Arc<dyn FontResolver + Send + Sync>) -> Self {
        Self { fonts }
    }

    fn resize_to_width(
        &self,
        asset: &OverlayAsset,
        target_width: u32,
    ) -> Result<RgbaImage, InfrastructureError> {
        let (width, height) =
            scaled_to_width(asset.image.width(), asset.image.height(), target_width)?;
        debug!(
            "Resizing {} from {}x{} to {}x{}",
            asset.role,
            asset.image.width(),
            asset.image.height(),
            width,
            height
        );
        Ok(imageops::resize(&asset.image, width, height, FilterType::Lanczos3))
    }

    /// Paints header, footer and watermark. Returns the header height the
    /// watermark was positioned against.
    fn paste_overlays(
        &self,
        canvas: &mut RgbaImage,
        overlays: &OverlaySet,
        layout: &LayoutConfig,
    ) -> Result<u32, InfrastructureError> {
        let (raw_width, raw_height) = canvas.dimensions();
        let mut header_height = 0;

        if let Some(header) = &overlays.header {
            let resized = self.resize_to_width(header, layout.banner_width(raw_width)?)?;
            let (x, y) = layout.header_origin();
            imageops::overlay(canvas, &resized, x, y);
            header_height = resized.height();
        }

        if let Some(footer) = &overlays.footer {
            let resized = self.resize_to_width(footer, layout.banner_width(raw_width)?)?;
            let (x, y) = layout.footer_origin(raw_height, resized.height());
            imageops::overlay(canvas, &resized, x, y);
        }

        if let Some(watermark) = &overlays.watermark {
            let resized = self.resize_to_width(watermark, raw_width)?;
            let (x, y) =
                layout.watermark_origin(raw_width, raw_height, resized.width(), header_height);
            debug!("Watermark at ({}, {})", x, y);
            imageops::overlay(canvas, &resized, x, y);
        }

        Ok(header_height)
    }

    fn draw_styled_text(
        &self,
        canvas: &mut RgbaImage,
        style: &TextStyle,
    ) -> Result<(), InfrastructureError> {
        let text = style.trimmed_content();
        let text_color = style.color.parse::<Color>()?.to_rgba();

        let font: Font<'static> = self.fonts.resolve(FontFace::from_flags(style.bold, style.italic));
        let scale = Scale::uniform(style.font_size as f32);
        let (text_width, text_height) = text_size(scale, &font, text);
        let (text_width, text_height) = (text_width.max(0) as u32, text_height.max(0) as u32);

        let (x, y) = style
            .position
            .anchor(canvas.width(), canvas.height(), text_width, text_height);
        debug!(
            "Text '{}' {}x{} at ({}, {}) anchored {}",
            text, text_width, text_height, x, y, style.position
        );

        if style.background {
            let background = style.background_color.parse::<Color>()?.to_rgba();
            let pad = TEXT_BACKGROUND_PADDING;
            // Both far edges are painted, one pixel past the padded text box.
            let rect = Rect::at(x - pad, y - pad)
                .of_size(text_width + 2 * pad as u32 + 1, text_height + 2 * pad as u32 + 1);
            draw_filled_rect_mut(canvas, rect, background);
        }

        if style.shadow {
            let offset = style.shadow_offset();
            draw_text_mut(
                canvas,
                Color::BLACK.to_rgba(),
                x + offset,
                y + offset,
                scale,
                &font,
                text,
            );
        }

        if style.outline {
            let outline = style.outline_color.parse::<Color>()?.to_rgba();
            let width = style.outline_width();
            for dx in -width..=width {
                for dy in -width..=width {
                    if dx != 0 || dy != 0 {
                        draw_text_mut(canvas, outline, x + dx, y + dy, scale, &font, text);
                    }
                }
            }
        }

        draw_text_mut(canvas, text_color, x, y, scale, &font, text);
        Ok(())
    }
}

impl ImageProcessor for DefaultImageProcessor {
    fn decode(&self, image_bytes: &[u8]) -> Result<RgbaImage, InfrastructureError> {
        let reader = image::io::Reader::new(Cursor::new(image_bytes))
            .with_guessed_format()
            .map_err(|e| InfrastructureError::DecodeError(e.to_string()))?;
        let img = reader
            .decode()
            .map_err(|e| InfrastructureError::DecodeError(e.to_string()))?;
        Ok(img.to_rgba8())
    }

    fn composite(
        &self,
        raw: RgbaImage,
        overlays: &OverlaySet,
        settings: &RenderSettings,
    ) -> Result<RgbaImage, InfrastructureError> {
        let mut canvas = raw;
        self.paste_overlays(&mut canvas, overlays, &settings.layout)?;

        if let Some(style) = settings.text.as_ref().filter(|style| !style.is_empty()) {
            self.draw_styled_text(&mut canvas, style)?;
        }

        Ok(canvas)
    }

    fn encode(&self, image: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>, InfrastructureError> {
        let mut buffer = Cursor::new(Vec::new());
        match format {
            OutputFormat::Jpeg => {
                // JPEG has no alpha channel.
                let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
                let mut encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
                encoder.encode_image(&rgb)?;
            }
            OutputFormat::Png => {
                image.write_to(&mut buffer, format.image_format())?;
            }
        }
        Ok(buffer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::overlay_asset::AssetRole;
    use crate::domain::position::Position;
    use crate::infrastructure::asset_store::scale_alpha;
    use crate::infrastructure::font_resolver::{FileSystemFontResolver, FontConfig};
    use image::{GenericImageView, Rgba};

    const GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);

    fn processor() -> DefaultImageProcessor {
        // No search directories: always the embedded face, whatever the host has installed.
        let config = FontConfig {
            search_dirs: vec![],
            ..FontConfig::default()
        };
        DefaultImageProcessor::new(Arc::new(FileSystemFontResolver::new(config).unwrap()))
    }

    fn solid(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(width, height, color)
    }

    fn settings(text: Option<TextStyle>) -> RenderSettings {
        RenderSettings {
            layout: LayoutConfig::default(),
            text,
        }
    }

    fn close(a: u8, b: u8, tolerance: u8) -> bool {
        a.abs_diff(b) <= tolerance
    }

    fn near(p: &Rgba<u8>, expected: Rgba<u8>) -> bool {
        (0..4).all(|i| close(p[i], expected[i], 8))
    }

    #[test]
    fn test_no_overlays_no_text_is_identity() {
        let mut raw = solid(64, 48, GRAY);
        raw.put_pixel(3, 4, Rgba([1, 2, 3, 4]));
        let out = processor()
            .composite(raw.clone(), &OverlaySet::default(), &settings(None))
            .unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn test_blank_text_is_identity() {
        let raw = solid(64, 48, GRAY);
        let style = TextStyle::new("   ", Position::Center);
        let out = processor()
            .composite(raw.clone(), &OverlaySet::default(), &settings(Some(style)))
            .unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn test_header_is_stretched_between_side_margins() {
        let overlays = OverlaySet {
            header: Some(OverlayAsset::new(AssetRole::Header, solid(400, 100, Rgba([0, 0, 255, 255])))),
            ..Default::default()
        };
        let out = processor()
            .composite(solid(1000, 800, GRAY), &overlays, &settings(None))
            .unwrap();

        assert_eq!(out.dimensions(), (1000, 800));
        // 960 wide, 240 tall, starting at (20, 10).
        assert!(out.get_pixel(20, 10)[2] > 250);
        assert!(out.get_pixel(979, 249)[2] > 250);
        assert_eq!(*out.get_pixel(19, 10), GRAY);
        assert_eq!(*out.get_pixel(980, 10), GRAY);
        assert_eq!(*out.get_pixel(500, 9), GRAY);
        assert_eq!(*out.get_pixel(500, 250), GRAY);
    }

    #[test]
    fn test_footer_sits_above_bottom_margin() {
        let overlays = OverlaySet {
            footer: Some(OverlayAsset::new(AssetRole::Footer, solid(480, 50, Rgba([0, 255, 0, 255])))),
            ..Default::default()
        };
        let out = processor()
            .composite(solid(1000, 800, GRAY), &overlays, &settings(None))
            .unwrap();

        // 960x100 pasted at y = 800 - 100 - 10 = 690.
        assert!(out.get_pixel(500, 690)[1] > 250);
        assert!(out.get_pixel(500, 789)[1] > 250);
        assert_eq!(*out.get_pixel(500, 689), GRAY);
        assert_eq!(*out.get_pixel(500, 790), GRAY);
    }

    #[test]
    fn test_header_respects_own_alpha() {
        let overlays = OverlaySet {
            header: Some(OverlayAsset::new(AssetRole::Header, solid(480, 50, Rgba([0, 0, 255, 0])))),
            ..Default::default()
        };
        let out = processor()
            .composite(solid(1000, 800, GRAY), &overlays, &settings(None))
            .unwrap();
        assert_eq!(*out.get_pixel(500, 50), GRAY);
    }

    #[test]
    fn test_too_narrow_for_margins_fails() {
        let overlays = OverlaySet {
            header: Some(OverlayAsset::new(AssetRole::Header, solid(10, 10, GRAY))),
            ..Default::default()
        };
        let result = processor().composite(solid(30, 30, GRAY), &overlays, &settings(None));
        assert!(matches!(result, Err(InfrastructureError::DomainErrorWrapper(_))));
    }

    #[test]
    fn test_huge_side_margin_fails_instead_of_overflowing() {
        let overlays = OverlaySet {
            header: Some(OverlayAsset::new(AssetRole::Header, solid(10, 10, GRAY))),
            ..Default::default()
        };
        let settings = RenderSettings {
            layout: LayoutConfig {
                side_margin: 3_000_000_000,
                ..LayoutConfig::default()
            },
            text: None,
        };
        let result = processor().composite(solid(100, 100, GRAY), &overlays, &settings);
        assert!(matches!(result, Err(InfrastructureError::DomainErrorWrapper(_))));
    }

    #[test]
    fn test_layers_paint_footer_then_watermark_then_text() {
        const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
        const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
        const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

        // 400x300 raw: footer 360x160 at (20, 130), watermark 400x40 at (0, 130).
        let overlays = OverlaySet {
            footer: Some(OverlayAsset::new(AssetRole::Footer, solid(360, 160, GREEN))),
            watermark: Some(OverlayAsset::new(AssetRole::Watermark, solid(400, 40, RED))),
            ..Default::default()
        };
        let mut style = TextStyle::new("Top", Position::Center);
        style.shadow = false;
        style.background = true;
        style.background_color = "#0000FF".to_string();

        let processor = processor();
        let out = processor
            .composite(solid(400, 300, GRAY), &overlays, &settings(Some(style.clone())))
            .unwrap();

        // Watermark wins over the footer where they overlap.
        assert!(near(out.get_pixel(10, 150), RED));
        assert!(near(out.get_pixel(30, 150), RED));
        assert_eq!(*out.get_pixel(30, 129), GRAY);
        assert!(near(out.get_pixel(200, 250), GREEN));

        let font = processor.fonts.resolve(FontFace::Regular);
        let (tw, th) = text_size(Scale::uniform(style.font_size as f32), &font, "Top");
        let (x, y) = Position::Center.anchor(400, 300, tw as u32, th as u32);
        let band_y = (y + th / 2) as u32;
        assert!((130..170).contains(&band_y));
        assert_eq!(*out.get_pixel((x - 5) as u32, band_y), BLUE);
    }

    #[test]
    fn test_outline_is_painted_over_shadow() {
        const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
        const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

        let mut style = TextStyle::new("Outlined", Position::Center);
        style.font_size = 90;
        style.outline = true;
        style.outline_color = "#FF0000".to_string();
        assert!(style.shadow_offset() > style.outline_width());

        let processor = processor();
        let render = |shadow: bool| {
            let mut style = style.clone();
            style.shadow = shadow;
            processor
                .composite(solid(600, 300, GRAY), &OverlaySet::default(), &settings(Some(style)))
                .unwrap()
        };
        let without_shadow = render(false);
        let with_shadow = render(true);

        assert!(with_shadow.pixels().any(|p| p[0] < 20 && p[1] < 20 && p[2] < 20));

        // Solid outline and main-text pixels keep their color once the shadow is on.
        let mut outline_pixels = 0;
        let mut text_pixels = 0;
        for (x, y, p) in without_shadow.enumerate_pixels() {
            if *p == RED || *p == WHITE {
                if *p == RED {
                    outline_pixels += 1;
                } else {
                    text_pixels += 1;
                }
                let shadowed = with_shadow.get_pixel(x, y);
                assert!(near(shadowed, *p), "pixel ({}, {}) became {:?}", x, y, shadowed);
            }
        }
        assert!(outline_pixels > 0);
        assert!(text_pixels > 0);
    }

    #[test]
    fn test_watermark_small_image_is_pushed_down() {
        let watermark = solid(200, 20, Rgba([255, 0, 0, 255]));
        let overlays = OverlaySet {
            watermark: Some(OverlayAsset::new(AssetRole::Watermark, watermark)),
            ..Default::default()
        };
        // 400x500 raw: watermark scaled to 400x40 at y = 10 + 20 + 100.
        let out = processor()
            .composite(solid(400, 500, GRAY), &overlays, &settings(None))
            .unwrap();
        assert_eq!(*out.get_pixel(200, 129), GRAY);
        assert!(out.get_pixel(200, 130)[0] > 250);
        assert!(out.get_pixel(200, 169)[0] > 250);
        assert_eq!(*out.get_pixel(200, 170), GRAY);
    }

    #[test]
    fn test_invalid_text_color_fails_image() {
        let mut style = TextStyle::new("Hello", Position::Center);
        style.color = "not-a-color".to_string();
        let result = processor().composite(solid(200, 200, GRAY), &OverlaySet::default(), &settings(Some(style)));
        assert!(matches!(result, Err(InfrastructureError::DomainErrorWrapper(_))));
    }

    #[test]
    fn test_background_box_is_padded() {
        let mut style = TextStyle::new("Hi", Position::TopLeft);
        style.shadow = false;
        style.background = true;
        style.background_color = "#00FF00".to_string();
        let out = processor()
            .composite(solid(300, 200, GRAY), &OverlaySet::default(), &settings(Some(style)))
            .unwrap();
        // Text anchored at (50, 50); the box starts 10px earlier.
        assert_eq!(*out.get_pixel(40, 40), Rgba([0, 255, 0, 255]));
        assert_eq!(*out.get_pixel(39, 40), GRAY);
        assert_eq!(*out.get_pixel(40, 39), GRAY);
    }

    #[test]
    fn test_background_box_includes_far_edges() {
        let mut style = TextStyle::new("Hi", Position::TopLeft);
        style.shadow = false;
        style.background = true;
        style.background_color = "#00FF00".to_string();
        let processor = processor();
        let out = processor
            .composite(solid(300, 200, GRAY), &OverlaySet::default(), &settings(Some(style.clone())))
            .unwrap();

        let font = processor.fonts.resolve(FontFace::Regular);
        let (tw, th) = text_size(Scale::uniform(style.font_size as f32), &font, "Hi");
        let right = (50 + tw + TEXT_BACKGROUND_PADDING) as u32;
        let bottom = (50 + th + TEXT_BACKGROUND_PADDING) as u32;
        assert_eq!(*out.get_pixel(right, 45), Rgba([0, 255, 0, 255]));
        assert_eq!(*out.get_pixel(right + 1, 45), GRAY);
        assert_eq!(*out.get_pixel(45, bottom), Rgba([0, 255, 0, 255]));
        assert_eq!(*out.get_pixel(45, bottom + 1), GRAY);
    }

    #[test]
    fn test_outline_draws_around_text() {
        let mut style = TextStyle::new("Outlined", Position::Center);
        style.shadow = false;
        style.outline = true;
        style.outline_color = "#FF0000".to_string();
        style.font_size = 40;
        let out = processor()
            .composite(solid(400, 200, GRAY), &OverlaySet::default(), &settings(Some(style)))
            .unwrap();
        assert!(out.pixels().any(|p| p[0] > 230 && p[1] < 30 && p[2] < 30));
        assert!(out.pixels().any(|p| p[0] > 230 && p[1] > 230 && p[2] > 230));
    }

    #[test]
    fn test_end_to_end_watermark_and_shadowed_text() {
        let fonts_processor = processor();

        // Native 500x50 opaque red watermark, scaled to 1000x100 on the raw image.
        let native = solid(500, 50, Rgba([255, 0, 0, 255]));
        let overlays = OverlaySet {
            watermark: Some(OverlayAsset::new(AssetRole::Watermark, scale_alpha(&native, 0.5))),
            ..Default::default()
        };
        let style = TextStyle::new("Sample", Position::BottomLeft);
        assert!(style.shadow);

        let out = fonts_processor
            .composite(solid(1000, 800, GRAY), &overlays, &settings(Some(style.clone())))
            .unwrap();
        assert_eq!(out.dimensions(), (1000, 800));

        // Watermark band spans the full width from y = 30 to y = 129, blended at half alpha.
        for x in [0, 500, 999] {
            let p = out.get_pixel(x, 80);
            assert!(close(p[0], 191, 4), "red at {} was {:?}", x, p);
            assert!(close(p[1], 64, 4), "green at {} was {:?}", x, p);
        }
        assert_eq!(*out.get_pixel(500, 29), GRAY);
        assert_eq!(*out.get_pixel(500, 130), GRAY);

        // Text near the bottom-left corner: white glyphs plus black shadow pixels.
        let font = fonts_processor.fonts.resolve(FontFace::Regular);
        let (tw, th) = text_size(Scale::uniform(30.0), &font, "Sample");
        let (x, y) = Position::BottomLeft.anchor(1000, 800, tw as u32, th as u32);
        let offset = style.shadow_offset();
        let region = out.view(
            x as u32,
            y as u32,
            tw as u32 + offset as u32 + 1,
            th as u32 + offset as u32 + 1,
        );
        let pixels: Vec<_> = region.pixels().map(|(_, _, p)| p).collect();
        assert!(pixels.iter().any(|p| p[0] > 240 && p[1] > 240 && p[2] > 240));
        assert!(pixels.iter().any(|p| p[0] < 20 && p[1] < 20 && p[2] < 20));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = processor().decode(&[1, 2, 3, 4]);
        assert!(matches!(result, Err(InfrastructureError::DecodeError(_))));
    }

    #[test]
    fn test_encode_jpeg_drops_alpha() {
        let processor = processor();
        let bytes = processor
            .encode(&solid(16, 16, Rgba([10, 200, 30, 100])), OutputFormat::Jpeg)
            .unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
    }

    #[test]
    fn test_encode_png_keeps_alpha() {
        let processor = processor();
        let original = solid(16, 16, Rgba([10, 200, 30, 100]));
        let bytes = processor.encode(&original, OutputFormat::Png).unwrap();
        assert_eq!(processor.decode(&bytes).unwrap(), original);
    }
}
