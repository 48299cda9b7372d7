use rusttype::Font;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontFace {
    pub fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (true, true) => FontFace::BoldItalic,
            (true, false) => FontFace::Bold,
            (false, true) => FontFace::Italic,
            (false, false) => FontFace::Regular,
        }
    }
}

/// Turns style flags into a usable font. Implementations never fail: when
/// nothing matches they hand back a built-in face.
pub trait FontResolver {
    fn resolve(&self, face: FontFace) -> Font<'static>;
}
