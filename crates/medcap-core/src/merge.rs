//! Attribute merging.
//!
//! Precedence, lowest to highest: filename-derived values already in the
//! mapping, platform-reported attributes, probed attributes. Each source
//! only overwrites the fields it actually supplies; afterward `duration`,
//! `width`, `height` and `mime_type` are always present, so the mapping is
//! total over the canonical set once the pipeline adds its own fields.

use crate::format::format_duration;
use crate::models::{FieldMapping, MediaAttributes};

/// Value used for A/V fields no source supplied.
const ABSENT: &str = "N/A";

/// Merge technical attributes into `fields`. Pure; no side effects beyond
/// the mapping itself.
pub fn merge_attributes(
    fields: &mut FieldMapping,
    platform: Option<&MediaAttributes>,
    probed: Option<&MediaAttributes>,
) {
    for attrs in [platform, probed].into_iter().flatten() {
        apply(fields, attrs);
    }

    for field in ["duration", "width", "height", "mime_type"] {
        if !fields.contains(field) {
            fields.set(field, ABSENT);
        }
    }
}

fn apply(fields: &mut FieldMapping, attrs: &MediaAttributes) {
    if let Some(secs) = attrs.duration_secs {
        fields.set("duration", format_duration(secs));
    }
    if let Some(width) = attrs.width {
        fields.set("width", width.to_string());
    }
    if let Some(height) = attrs.height {
        fields.set("height", height.to_string());
    }
    if let Some(resolution) = attrs.resolution() {
        fields.set("resolution", resolution);
    }
    if let Some(mime) = &attrs.mime_type {
        fields.set("mime_type", mime.clone());
    }
}
