pub mod batch_service;
pub mod config;
pub mod error;
