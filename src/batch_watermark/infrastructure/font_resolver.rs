use super::error::InfrastructureError;
use crate::domain::font_resolver_trait::{FontFace, FontResolver};
use rusttype::Font;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};

static BUILTIN_FONT: &[u8] = include_bytes!("../../../DejaVu_Sans/DejaVuSans.ttf");

/// Where to look for font files and which file names to try per face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub search_dirs: Vec<PathBuf>,
    pub regular: Vec<String>,
    pub bold: Vec<String>,
    pub italic: Vec<String>,
    pub bold_italic: Vec<String>,
    /// Tried for any face once its own candidates are exhausted.
    pub fallback: Vec<String>,
}

impl Default for FontConfig {
    fn default() -> Self {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            search_dirs: vec![
                PathBuf::from("fonts"),
                PathBuf::from("/usr/share/fonts/truetype/dejavu"),
                PathBuf::from("/usr/share/fonts/TTF"),
                PathBuf::from("/Library/Fonts"),
                PathBuf::from("C:\\Windows\\Fonts"),
            ],
            regular: names(&["arial.ttf", "DejaVuSans.ttf"]),
            bold: names(&["arialbd.ttf", "DejaVuSans-Bold.ttf"]),
            italic: names(&["ariali.ttf", "DejaVuSans-Oblique.ttf"]),
            bold_italic: names(&["arialbi.ttf", "DejaVuSans-BoldOblique.ttf"]),
            fallback: names(&["calibri.ttf"]),
        }
    }
}

impl FontConfig {
    fn candidates(&self, face: FontFace) -> impl Iterator<Item = &String> {
        let own = match face {
            FontFace::Regular => &self.regular,
            FontFace::Bold => &self.bold,
            FontFace::Italic => &self.italic,
            FontFace::BoldItalic => &self.bold_italic,
        };
        own.iter().chain(self.fallback.iter())
    }
}

pub fn builtin_font() -> Result<Font<'static>, InfrastructureError> {
    Font::try_from_bytes(BUILTIN_FONT)
        .ok_or_else(|| InfrastructureError::RenderError("Failed to load built-in font".to_string()))
}

/// Probes the configured directories for each face and remembers what it
/// found, so every image in a batch reuses the same parsed font.
pub struct FileSystemFontResolver {
    config: FontConfig,
    builtin: Font<'static>,
    cache: Mutex<HashMap<FontFace, Font<'static>>>,
}

impl FileSystemFontResolver {
    pub fn new(config: FontConfig) -> Result<Self, InfrastructureError> {
        Ok(Self {
            config,
            builtin: builtin_font()?,
            cache: Mutex::new(HashMap::new()),
        })
    }

    fn find_face(&self, face: FontFace) -> Option<Font<'static>> {
        for name in self.config.candidates(face) {
            for dir in &self.config.search_dirs {
                let path = dir.join(name);
                let Ok(data) = std::fs::read(&path) else {
                    continue;
                };
                match Font::try_from_vec(data) {
                    Some(font) => {
                        debug!("Using {:?} for {:?} text", path, face);
                        return Some(font);
                    }
                    None => warn!("Ignoring unparsable font file {:?}", path),
                }
            }
        }
        None
    }
}

impl FontResolver for FileSystemFontResolver {
    fn resolve(&self, face: FontFace) -> Font<'static> {
        if let Ok(cache) = self.cache.lock() {
            if let Some(font) = cache.get(&face) {
                return font.clone();
            }
        }

        let font = self.find_face(face).unwrap_or_else(|| {
            debug!("No font file found for {:?}, using the built-in face", face);
            self.builtin.clone()
        });

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(face, font.clone());
        }
        font
    }
}
