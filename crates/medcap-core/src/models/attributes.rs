use serde::{Deserialize, Serialize};

/// Technical attributes reported for a media item, either by the platform
/// message or by probing the container. Every field is optional: a source
/// only overwrites the fields it actually supplies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaAttributes {
    /// Duration in seconds. Platform messages report whole seconds; the
    /// probe reports fractional seconds.
    pub duration_secs: Option<f64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub mime_type: Option<String>,
}

impl MediaAttributes {
    /// `WxH` when both dimensions are known.
    pub fn resolution(&self) -> Option<String> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(format!("{}x{}", w, h)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.duration_secs.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.mime_type.is_none()
    }
}
