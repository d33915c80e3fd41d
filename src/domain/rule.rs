//! Declarative redaction rules and their validation.
//!
//! Rules arrive as JSON using the wire names of the upstream service
//! (`fieldName`, `ruleType`, `pageNumber`, `text_find`, ...). A batch is
//! validated as a whole before any rule is resolved.

use super::geometry::Rect;
use crate::error::{RedactorError, RedactorResult};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

/// Regions are expressed at twice the page resolution; every edge is halved.
pub const REGION_SCALE: f64 = 0.5;

/// Day offset applied when a date-shift rule carries none.
pub const DEFAULT_SHIFT_DAYS: i64 = -7;

/// Rectangle in the caller's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The region in page coordinates.
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.x * REGION_SCALE,
            self.y * REGION_SCALE,
            (self.x + self.width) * REGION_SCALE,
            (self.y + self.height) * REGION_SCALE,
        )
    }
}

/// What a rule asks for. Unknown kinds are kept verbatim and resolved by
/// the generic fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleKind {
    AllText,
    Table,
    HaveValue,
    ColumnByName,
    DateShift,
    ShiftDays,
    FullLine,
    FullColumn,
    Generic(String),
}

impl RuleKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::AllText => "all-text",
            Self::Table => "table",
            Self::HaveValue => "have-value",
            Self::ColumnByName => "column_by_name",
            Self::DateShift => "date-shift",
            Self::ShiftDays => "shift_days",
            Self::FullLine => "full-line",
            Self::FullColumn => "full-column",
            Self::Generic(raw) => raw,
        }
    }

    pub fn is_date_shift(&self) -> bool {
        matches!(self, Self::DateShift | Self::ShiftDays)
    }
}

impl From<String> for RuleKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "all-text" => Self::AllText,
            "table" => Self::Table,
            "have-value" => Self::HaveValue,
            "column_by_name" => Self::ColumnByName,
            "date-shift" => Self::DateShift,
            "shift_days" => Self::ShiftDays,
            "full-line" => Self::FullLine,
            "full-column" => Self::FullColumn,
            _ => Self::Generic(raw),
        }
    }
}

impl From<RuleKind> for String {
    fn from(kind: RuleKind) -> Self {
        kind.as_str().to_string()
    }
}

/// How the anchor found by a text search is widened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum PatternType {
    #[serde(rename = "full-line")]
    FullLine,
    #[serde(rename = "full-column")]
    FullColumn,
    #[default]
    #[serde(rename = "none")]
    None,
}

impl PatternType {
    fn parse(raw: &str) -> Self {
        match raw.trim() {
            "full-line" => Self::FullLine,
            "full-column" => Self::FullColumn,
            _ => Self::None,
        }
    }
}

fn lenient_pattern_type<'de, D>(deserializer: D) -> Result<PatternType, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().map(PatternType::parse).unwrap_or_default())
}

/// One declarative redaction instruction scoped to a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Informational label.
    #[serde(rename = "fieldName", default)]
    pub field_name: String,

    #[serde(rename = "ruleType")]
    pub kind: RuleKind,

    pub region: Region,

    /// 1-based page number.
    #[serde(rename = "pageNumber")]
    pub page_number: usize,

    #[serde(
        rename = "patternType",
        default,
        deserialize_with = "lenient_pattern_type"
    )]
    pub pattern_type: PatternType,

    #[serde(rename = "text_find", default, skip_serializing_if = "Option::is_none")]
    pub text_find: Option<String>,

    #[serde(
        rename = "dateShiftDays",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub date_shift_days: Option<i64>,

    #[serde(
        rename = "customPattern",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_pattern: Option<String>,
}

impl Rule {
    pub fn new(kind: RuleKind, region: Region, page_number: usize) -> Self {
        Self {
            field_name: String::new(),
            kind,
            region,
            page_number,
            pattern_type: PatternType::None,
            text_find: None,
            date_shift_days: None,
            custom_pattern: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_find = Some(text.into());
        self
    }

    pub fn with_pattern_type(mut self, pattern_type: PatternType) -> Self {
        self.pattern_type = pattern_type;
        self
    }

    pub fn with_shift_days(mut self, days: i64) -> Self {
        self.date_shift_days = Some(days);
        self
    }

    pub fn with_custom_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.custom_pattern = Some(pattern.into());
        self
    }

    pub fn with_field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = name.into();
        self
    }

    /// Region in page coordinates.
    pub fn rect(&self) -> Rect {
        self.region.to_rect()
    }

    /// Trimmed search phrase, if any non-blank one was given.
    pub fn search_text(&self) -> Option<&str> {
        self.text_find
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    pub fn shift_days(&self) -> i64 {
        self.date_shift_days.unwrap_or(DEFAULT_SHIFT_DAYS)
    }

    /// Column label: the search phrase, else the field name.
    pub fn label(&self) -> Option<&str> {
        self.search_text().or_else(|| {
            let name = self.field_name.trim();
            (!name.is_empty()).then_some(name)
        })
    }

    /// Structural checks; `index` is the rule's position in its batch.
    pub fn validate(&self, index: usize) -> RedactorResult<()> {
        let invalid = |field: &str, reason: String| RedactorError::InvalidRule {
            index,
            field: field.to_string(),
            reason,
        };

        if self.page_number == 0 {
            return Err(invalid("pageNumber", "page numbers start at 1".to_string()));
        }

        let r = &self.region;
        if ![r.x, r.y, r.width, r.height].iter().all(|v| v.is_finite()) {
            return Err(invalid("region", "coordinates must be finite".to_string()));
        }
        if r.width < 0.0 || r.height < 0.0 {
            return Err(invalid(
                "region",
                format!("negative size {}x{}", r.width, r.height),
            ));
        }

        if let Some(pattern) = &self.custom_pattern {
            Regex::new(pattern).map_err(|e| RedactorError::PatternError {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
        }

        Ok(())
    }
}

/// Validates a whole batch, failing on the first invalid rule.
pub fn validate_rules(rules: &[Rule]) -> RedactorResult<()> {
    rules
        .iter()
        .enumerate()
        .try_for_each(|(index, rule)| rule.validate(index))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RuleDocument {
    Bare(Vec<Rule>),
    Wrapped { rules: Vec<Rule> },
}

/// Parses and validates a JSON rule list: either a bare array or `{"rules": [...]}`.
pub fn parse_rules(json: &str) -> RedactorResult<Vec<Rule>> {
    let rules = match serde_json::from_str::<RuleDocument>(json)? {
        RuleDocument::Bare(rules) | RuleDocument::Wrapped { rules } => rules,
    };
    validate_rules(&rules)?;
    Ok(rules)
}
