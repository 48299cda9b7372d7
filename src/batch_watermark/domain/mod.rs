pub mod batch;
pub mod color;
pub mod error;
pub mod font_resolver_trait;
pub mod image;
pub mod image_processor_trait;
pub mod layout;
pub mod overlay_asset;
pub mod position;
pub mod text_style;
