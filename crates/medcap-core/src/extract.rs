//! Filename metadata extraction.
//!
//! An ordered table of `(pattern, target field)` rules runs against the whole
//! filename; each matching rule's first capture group overwrites its target
//! field in a mapping seeded with defaults. Two rules targeting the same
//! field would make the result depend on iteration order, so
//! [`RuleSet::compile`] rejects such tables outright.

use chrono::{Datelike, Local};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use std::path::Path;

use crate::error::AppError;
use crate::models::FieldMapping;

/// One `(pattern, target field)` extraction rule. Patterns are
/// case-insensitive searches; only the first capture group is used.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRule {
    pub pattern: &'static str,
    pub field: &'static str,
}

/// The built-in rule table, in application order.
///
/// A `1080p` token matches both the resolution pattern and the quality
/// pattern, but the two rules target different fields, so both fire. The
/// `S`/`E` captures keep their letter (`S05`, `E09`).
pub const DEFAULT_RULES: &[ExtractionRule] = &[
    ExtractionRule { pattern: r"\[(\d{4})\]", field: "year" },
    ExtractionRule { pattern: r"(\d{3,4}p)", field: "resolution" },
    ExtractionRule { pattern: r"(S\d{2})", field: "season" },
    ExtractionRule { pattern: r"(E\d{2})", field: "episode" },
    ExtractionRule { pattern: r"(720p|1080p|2160p|4K|HD|SD)", field: "quality" },
    ExtractionRule { pattern: r"\[([A-Za-z]+)\]", field: "language" },
    ExtractionRule { pattern: r"-(.+?)-", field: "artist" },
    ExtractionRule { pattern: r"^(.+?)\s*[\[\(]", field: "title" },
];

/// A compiled, validated rule table.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<(Regex, &'static str)>,
}

impl RuleSet {
    /// Compile a rule table, rejecting tables where two rules target the
    /// same field (ambiguous precedence) or a pattern fails to compile.
    pub fn compile(rules: &[ExtractionRule]) -> Result<Self, AppError> {
        let mut seen = HashSet::new();
        for rule in rules {
            if !seen.insert(rule.field) {
                return Err(AppError::InvalidRuleTable(format!(
                    "two rules target field '{}'",
                    rule.field
                )));
            }
        }

        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let regex = RegexBuilder::new(rule.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|err| {
                    AppError::InvalidRuleTable(format!(
                        "pattern '{}' for field '{}': {}",
                        rule.pattern, rule.field, err
                    ))
                })?;
            compiled.push((regex, rule.field));
        }
        Ok(Self { rules: compiled })
    }

    /// The built-in table.
    pub fn default_set() -> Result<Self, AppError> {
        Self::compile(DEFAULT_RULES)
    }

    fn iter(&self) -> impl Iterator<Item = (&Regex, &'static str)> {
        self.rules.iter().map(|(regex, field)| (regex, *field))
    }
}

/// Filename-to-metadata extractor.
///
/// Construction validates the rule table, so extraction itself never fails:
/// a filename matching nothing yields exactly the seeded defaults.
#[derive(Debug, Clone)]
pub struct FilenameExtractor {
    rules: RuleSet,
}

impl FilenameExtractor {
    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            rules: RuleSet::default_set()?,
        })
    }

    pub fn with_rules(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Seed the default mapping, then let each matching rule overwrite its
    /// target field.
    pub fn extract(&self, filename: &str) -> FieldMapping {
        let mut fields = seed_defaults(filename);
        for (regex, field) in self.rules.iter() {
            if let Some(value) = regex.captures(filename).and_then(|caps| caps.get(1)) {
                fields.set(field, value.as_str());
            }
        }
        fields
    }
}

fn seed_defaults(filename: &str) -> FieldMapping {
    let path = Path::new(filename);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_uppercase())
        .unwrap_or_default();
    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    let mut fields = FieldMapping::new();
    fields.set("language", "Unknown");
    fields.set("year", Local::now().year().to_string());
    fields.set("quality", "HD");
    fields.set("season", "01");
    fields.set("episode", "01");
    fields.set("ext", ext);
    fields.set("artist", "Unknown");
    fields.set("title", title);
    fields.set("resolution", "1920x1080");
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> FilenameExtractor {
        FilenameExtractor::new().unwrap()
    }

    #[test]
    fn pattern_free_filename_yields_the_documented_defaults() {
        let fields = extractor().extract("holiday_footage.mp4");
        let current_year = Local::now().year().to_string();
        assert_eq!(fields.get("language"), Some("Unknown"));
        assert_eq!(fields.get("year"), Some(current_year.as_str()));
        assert_eq!(fields.get("quality"), Some("HD"));
        assert_eq!(fields.get("season"), Some("01"));
        assert_eq!(fields.get("episode"), Some("01"));
        assert_eq!(fields.get("ext"), Some("MP4"));
        assert_eq!(fields.get("artist"), Some("Unknown"));
        assert_eq!(fields.get("title"), Some("holiday_footage"));
        assert_eq!(fields.get("resolution"), Some("1920x1080"));
        assert_eq!(fields.len(), 9);
    }

    #[test]
    fn reference_filename_extracts_every_tagged_field() {
        let fields = extractor().extract("Movie.Title.[2021].1080p.[English]-Artist-.mkv");
        assert_eq!(fields.get("year"), Some("2021"));
        assert_eq!(fields.get("resolution"), Some("1080p"));
        assert_eq!(fields.get("quality"), Some("1080p"));
        assert_eq!(fields.get("language"), Some("English"));
        assert_eq!(fields.get("artist"), Some("Artist"));
        assert_eq!(fields.get("ext"), Some("MKV"));
        assert_eq!(fields.get("title"), Some("Movie.Title."));
    }

    #[test]
    fn season_and_episode_keep_their_letter() {
        let fields = extractor().extract("Show.Name.S05E09.720p.mkv");
        assert_eq!(fields.get("season"), Some("S05"));
        assert_eq!(fields.get("episode"), Some("E09"));
        assert_eq!(fields.get("resolution"), Some("720p"));
        assert_eq!(fields.get("quality"), Some("720p"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let fields = extractor().extract("show.s02e03.2160P.mkv");
        assert_eq!(fields.get("season"), Some("s02"));
        assert_eq!(fields.get("episode"), Some("e03"));
        assert_eq!(fields.get("quality"), Some("2160P"));
    }

    #[test]
    fn bracketed_year_beats_the_current_year_default() {
        let fields = extractor().extract("Old.Film.[1974].mp4");
        assert_eq!(fields.get("year"), Some("1974"));
    }

    #[test]
    fn title_stops_at_the_first_bracket_or_paren() {
        let fields = extractor().extract("My Film (Director Cut).mkv");
        assert_eq!(fields.get("title"), Some("My Film"));
    }

    #[test]
    fn no_extension_leaves_ext_empty_and_title_whole() {
        let fields = extractor().extract("raw_dump");
        assert_eq!(fields.get("ext"), Some(""));
        assert_eq!(fields.get("title"), Some("raw_dump"));
    }

    #[test]
    fn duplicate_target_fields_are_rejected() {
        const AMBIGUOUS: &[ExtractionRule] = &[
            ExtractionRule { pattern: r"(\d{3,4}p)", field: "quality" },
            ExtractionRule { pattern: r"(HD|SD)", field: "quality" },
        ];
        let err = RuleSet::compile(AMBIGUOUS).unwrap_err();
        assert!(matches!(err, AppError::InvalidRuleTable(_)));
    }

    #[test]
    fn bad_pattern_is_rejected_at_compile_time() {
        const BROKEN: &[ExtractionRule] = &[ExtractionRule {
            pattern: r"([unclosed",
            field: "title",
        }];
        assert!(RuleSet::compile(BROKEN).is_err());
    }

    #[test]
    fn default_table_passes_validation() {
        assert!(RuleSet::default_set().is_ok());
    }
}
