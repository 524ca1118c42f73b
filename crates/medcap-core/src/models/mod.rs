pub mod attributes;
pub mod field_mapping;
pub mod record;

pub use attributes::MediaAttributes;
pub use field_mapping::{FieldMapping, CANONICAL_FIELDS};
pub use record::CaptionRecord;
