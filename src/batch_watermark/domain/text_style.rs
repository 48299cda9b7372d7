use crate::domain::position::Position;
use serde::{Deserialize, Serialize};

/// Styled text painted on top of every composited image.
///
/// Colors stay as hex strings until render time so a bad value fails only
/// the files it is applied to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub content: String,
    pub font_size: u32,
    pub bold: bool,
    pub italic: bool,
    pub shadow: bool,
    pub outline: bool,
    pub background: bool,
    pub color: String,
    pub background_color: String,
    pub outline_color: String,
    pub position: Position,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            content: String::new(),
            font_size: 30,
            bold: false,
            italic: false,
            shadow: true,
            outline: false,
            background: false,
            color: "#FFFFFF".to_string(),
            background_color: "#000000".to_string(),
            outline_color: "#000000".to_string(),
            position: Position::BottomLeft,
        }
    }
}

impl TextStyle {
    pub fn new(content: impl Into<String>, position: Position) -> Self {
        Self {
            content: content.into(),
            position,
            ..Self::default()
        }
    }

    /// Content with surrounding whitespace removed; empty means nothing to draw.
    pub fn trimmed_content(&self) -> &str {
        self.content.trim()
    }

    pub fn is_empty(&self) -> bool {
        self.trimmed_content().is_empty()
    }

    pub fn shadow_offset(&self) -> i32 {
        (self.font_size / 15).max(2) as i32
    }

    pub fn outline_width(&self) -> i32 {
        (self.font_size / 20).max(1) as i32
    }
}
