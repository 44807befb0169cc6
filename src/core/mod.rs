pub mod config;
pub mod crop;
pub mod extractor;
pub mod label;
pub mod walker;
