//! Medcap Core Library
//!
//! This crate provides the domain models, error types, configuration, and the
//! pure caption engine (filename extraction, attribute merging, size and
//! duration humanization, template rendering) shared across all medcap
//! components.

pub mod config;
pub mod error;
pub mod extract;
pub mod format;
pub mod merge;
pub mod models;
pub mod render;
pub mod wish;

// Re-export commonly used types
pub use config::{Config, DEFAULT_CAPTION_TEMPLATE};
pub use error::AppError;
pub use extract::{ExtractionRule, FilenameExtractor, RuleSet, DEFAULT_RULES};
pub use format::{format_duration, format_size};
pub use merge::merge_attributes;
pub use models::{CaptionRecord, FieldMapping, MediaAttributes, CANONICAL_FIELDS};
pub use render::{render_caption, template_placeholders, validate_template};
pub use wish::{current_wish, wish_for_hour};
