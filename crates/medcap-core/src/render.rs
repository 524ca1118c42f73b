//! Caption template rendering.
//!
//! Templates name fields with `{field}` placeholders. Whether a template is
//! renderable is a configuration-time question: [`validate_template`] runs at
//! startup against the canonical field set, so per-item rendering over a
//! total mapping cannot fail. No escaping is applied to substituted values;
//! the caller owns the destination channel's formatting rules.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::AppError;
use crate::models::{FieldMapping, CANONICAL_FIELDS};

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("placeholder pattern is valid")
    })
}

/// Field names referenced by `{name}` placeholders, in order of appearance.
pub fn template_placeholders(template: &str) -> Vec<String> {
    placeholder_regex()
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Check every placeholder against the canonical field set. Call once at
/// startup; a template naming an unknown field must never be discovered per
/// item.
pub fn validate_template(template: &str) -> Result<(), AppError> {
    for name in template_placeholders(template) {
        if !CANONICAL_FIELDS.contains(&name.as_str()) {
            return Err(AppError::InvalidTemplate(format!(
                "unknown field '{}'",
                name
            )));
        }
    }
    Ok(())
}

/// Substitute every `{field}` placeholder with its value from `fields`.
///
/// The mapping must be total over the template's placeholders; a missing
/// field is a contract violation reported as [`AppError::MissingField`].
pub fn render_caption(template: &str, fields: &FieldMapping) -> Result<String, AppError> {
    let mut rendered = String::with_capacity(template.len());
    let mut last = 0;
    for caps in placeholder_regex().captures_iter(template) {
        let (whole, name) = match (caps.get(0), caps.get(1)) {
            (Some(whole), Some(name)) => (whole, name),
            _ => continue,
        };
        let value = fields
            .get(name.as_str())
            .ok_or_else(|| AppError::MissingField {
                field: name.as_str().to_string(),
            })?;
        rendered.push_str(&template[last..whole.start()]);
        rendered.push_str(value);
        last = whole.end();
    }
    rendered.push_str(&template[last..]);
    Ok(rendered)
}
