use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Distance in pixels between an edge-anchored text box and the image edge.
pub const TEXT_MARGIN: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    #[default]
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Position {
    pub const ALL: [Position; 9] = [
        Position::TopLeft,
        Position::TopCenter,
        Position::TopRight,
        Position::CenterLeft,
        Position::Center,
        Position::CenterRight,
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::TopLeft => "top-left",
            Position::TopCenter => "top-center",
            Position::TopRight => "top-right",
            Position::CenterLeft => "center-left",
            Position::Center => "center",
            Position::CenterRight => "center-right",
            Position::BottomLeft => "bottom-left",
            Position::BottomCenter => "bottom-center",
            Position::BottomRight => "bottom-right",
        }
    }

    /// Top-left corner of a `text_width` x `text_height` box anchored in a
    /// `width` x `height` image. May be negative when the text is wider than
    /// the image.
    pub fn anchor(&self, width: u32, height: u32, text_width: u32, text_height: u32) -> (i32, i32) {
        let (w, h) = (width as i32, height as i32);
        let (tw, th) = (text_width as i32, text_height as i32);
        let m = TEXT_MARGIN;

        let left = m;
        let center_x = (w - tw).div_euclid(2);
        let right = w - tw - m;
        let top = m;
        let center_y = (h - th).div_euclid(2);
        let bottom = h - th - m;

        match self {
            Position::TopLeft => (left, top),
            Position::TopCenter => (center_x, top),
            Position::TopRight => (right, top),
            Position::CenterLeft => (left, center_y),
            Position::Center => (center_x, center_y),
            Position::CenterRight => (right, center_y),
            Position::BottomLeft => (left, bottom),
            Position::BottomCenter => (center_x, bottom),
            Position::BottomRight => (right, bottom),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Position::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| DomainError::InvalidInput(format!("unknown text position '{}'", s)))
    }
}
