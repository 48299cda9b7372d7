pub mod asset_store;
pub mod axum_handler;
pub mod error;
pub mod file_storage;
pub mod font_resolver;
pub mod image_processor;
