use image::ImageFormat;
use std::path::{Path, PathBuf};

/// Extensions picked up from the raw directory.
pub const SUPPORTED_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "bmp", "gif", "tiff", "webp"];

pub const JPEG_QUALITY: u8 = 95;

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

pub fn is_supported_input(path: &Path) -> bool {
    extension_of(path)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Encoding used for a finished image. JPEG inputs stay JPEG, everything
/// else is written as PNG so the alpha channel survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn for_input(path: &Path) -> Self {
        match extension_of(path).as_deref() {
            Some("jpg") | Some("jpeg") => OutputFormat::Jpeg,
            _ => OutputFormat::Png,
        }
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }

    /// File name of the output written for `input` into `output_dir`.
    pub fn output_path(&self, input: &Path, output_dir: &Path) -> Option<PathBuf> {
        match self {
            OutputFormat::Jpeg => input.file_name().map(|name| output_dir.join(name)),
            OutputFormat::Png => input
                .file_stem()
                .map(|stem| output_dir.join(format!("{}.png", stem.to_string_lossy()))),
        }
    }
}
