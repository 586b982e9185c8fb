//! Core library modules for douyin-dl
//!
//! This module contains the internal implementation details of the douyin-dl library.

pub mod error;
pub mod source;
pub mod patterns;
pub mod fetch;
pub mod render;
pub mod extract;
pub mod stream;
pub mod downloader;

// Re-export main types for internal use
pub use downloader::MediaDownloader;
pub use extract::{ExtractionResult, Extractor, ExtractorConfig, Strategy};
pub use source::SourceConfig;
