//! Date shifting with in-place replacement geometry.
//!
//! Date-shaped substrings inside a region are parsed, moved by a signed
//! number of days and re-rendered in the format they were parsed with.
//! The replacement is written back over the original, so each hit also
//! carries a tight cover rectangle and an insertion point.

use super::geometry::{rect_overlaps, Rect};
use super::token::{FontDescriptor, FontFamily, PageContent, Token};
use chrono::{Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Matches shorter than this must span the whole token.
const MIN_PARTIAL_MATCH: usize = 8;
/// Replacement text is rendered slightly smaller than the detected size.
pub const INSERT_SIZE_FACTOR: f64 = 0.85;
/// Baseline position as a fraction of token height.
const BASELINE_FACTOR: f64 = 0.76;
const BOX_PADDING: f64 = 0.2;

/// Numeric `DD/DD/DD` or `DD/DD/DDDD` dates.
pub fn default_date_pattern() -> &'static Regex {
    static PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\b\d{2}/\d{2}/(?:\d{4}|\d{2})\b").expect("Valid date regex pattern")
    });
    &PATTERN
}

/// Supported date layouts, listed in parse precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateFormat {
    /// `MM/DD/YYYY`
    MonthDayYear,
    /// `MM/DD/YY`
    MonthDayShortYear,
    /// `YYYY-MM-DD`
    Iso,
    /// `DD/MM/YYYY`
    DayMonthYear,
    /// `DD/MM/YY`
    DayMonthShortYear,
}

impl DateFormat {
    pub const PRECEDENCE: [DateFormat; 5] = [
        DateFormat::MonthDayYear,
        DateFormat::MonthDayShortYear,
        DateFormat::Iso,
        DateFormat::DayMonthYear,
        DateFormat::DayMonthShortYear,
    ];

    /// chrono format string.
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::MonthDayYear => "%m/%d/%Y",
            Self::MonthDayShortYear => "%m/%d/%y",
            Self::Iso => "%Y-%m-%d",
            Self::DayMonthYear => "%d/%m/%Y",
            Self::DayMonthShortYear => "%d/%m/%y",
        }
    }

    // chrono's %Y happily reads two digits, so year width is checked up front.
    fn shape(&self) -> &'static Regex {
        static LONG: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("Valid date shape"));
        static SHORT: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{2}$").expect("Valid date shape"));
        static ISO: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}$").expect("Valid date shape"));
        match self {
            Self::MonthDayYear | Self::DayMonthYear => &LONG,
            Self::MonthDayShortYear | Self::DayMonthShortYear => &SHORT,
            Self::Iso => &ISO,
        }
    }

    pub fn parse(&self, text: &str) -> Option<NaiveDate> {
        if !self.shape().is_match(text) {
            return None;
        }
        NaiveDate::parse_from_str(text, self.pattern()).ok()
    }

    pub fn format(&self, date: NaiveDate) -> String {
        date.format(self.pattern()).to_string()
    }

    /// First format in precedence order that parses `text`.
    pub fn detect(text: &str) -> Option<(NaiveDate, DateFormat)> {
        let text = text.trim();
        Self::PRECEDENCE
            .iter()
            .find_map(|format| format.parse(text).map(|date| (date, *format)))
    }
}

/// Moves `date` by `days`, `None` on calendar overflow.
pub fn shift_date(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    let magnitude = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    }
}

/// Parses `text`, shifts it and renders it back in the same format.
pub fn shift_date_text(text: &str, days: i64) -> Option<String> {
    let (date, format) = DateFormat::detect(text)?;
    shift_date(date, days).map(|shifted| format.format(shifted))
}

/// Font metrics query. `None` means the family could not be measured.
pub trait TextMeasure {
    fn measure(&self, text: &str, family: FontFamily, size_pt: f64) -> Option<f64>;
}

/// Width estimate of half an em per character.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicMeasure;

impl TextMeasure for HeuristicMeasure {
    fn measure(&self, text: &str, _family: FontFamily, size_pt: f64) -> Option<f64> {
        Some(estimated_width(text, size_pt))
    }
}

/// One shifted date ready to be painted over and re-inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateReplacement {
    /// Box to cover.
    pub rect: Rect,
    pub original: String,
    pub replacement: String,
    /// Font for re-insertion, already scaled by [`INSERT_SIZE_FACTOR`].
    pub font: FontDescriptor,
    /// Baseline start of the inserted text.
    pub insertion_point: (f64, f64),
    pub format: DateFormat,
}

/// Finds and shifts dates inside a region.
pub struct DateShiftResolver<'m> {
    measure: &'m dyn TextMeasure,
    pattern: Regex,
}

impl<'m> DateShiftResolver<'m> {
    pub fn new(measure: &'m dyn TextMeasure) -> Self {
        Self {
            measure,
            pattern: default_date_pattern().clone(),
        }
    }

    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn resolve(&self, page: &PageContent, region: &Rect, days: i64) -> Vec<DateReplacement> {
        page.tokens
            .iter()
            .filter(|token| rect_overlaps(region, &token.bbox))
            .filter_map(|token| self.resolve_token(page, token, days))
            .collect()
    }

    fn resolve_token(&self, page: &PageContent, token: &Token, days: i64) -> Option<DateReplacement> {
        let found = self.pattern.find(&token.text)?;
        let matched = found.as_str();
        if matched.chars().count() < MIN_PARTIAL_MATCH && matched != token.text.trim() {
            debug!(token = %token.text, matched, "skipping partial date match");
            return None;
        }

        let Some((date, format)) = DateFormat::detect(matched) else {
            debug!(matched, "unparseable date");
            return None;
        };
        let replacement = format.format(shift_date(date, days)?);

        let detected = page.font_for(token);
        let bbox = token.bbox.normalized();
        let (family, width) = match self.measure_width(matched, &detected) {
            Some(measured) => measured,
            None => {
                warn!(text = matched, "no usable font metrics, estimating width");
                (detected.family, estimated_width(matched, detected.size_pt))
            }
        };
        let rect = tight_box(&bbox, width, detected.size_pt);

        Some(DateReplacement {
            rect,
            original: matched.to_string(),
            replacement,
            font: FontDescriptor {
                family,
                size_pt: detected.size_pt * INSERT_SIZE_FACTOR,
                color: detected.color,
            },
            insertion_point: (bbox.x1, bbox.y1 + BASELINE_FACTOR * bbox.height()),
            format,
        })
    }

    fn measure_width(&self, text: &str, font: &FontDescriptor) -> Option<(FontFamily, f64)> {
        font.family.fallback_chain().into_iter().find_map(|family| {
            self.measure
                .measure(text, family, font.size_pt)
                .filter(|w| w.is_finite() && *w > 0.0)
                .map(|w| (family, w))
        })
    }
}

/// Half an em per character.
fn estimated_width(text: &str, size_pt: f64) -> f64 {
    0.5 * size_pt * text.chars().count() as f64
}

/// Box of `width` centered in `bbox`, as tall as the font.
fn tight_box(bbox: &Rect, width: f64, size_pt: f64) -> Rect {
    let half_w = width / 2.0 + BOX_PADDING;
    let half_h = (0.9 * size_pt).max(0.25 * bbox.height()) / 2.0 + BOX_PADDING;
    let (cx, cy) = (bbox.center_x(), bbox.center_y());
    Rect::new(cx - half_w, cy - half_h, cx + half_w, cy + half_h)
}
