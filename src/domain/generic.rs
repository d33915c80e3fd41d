//! Anchor-and-sweep fallback used by every rule kind without a dedicated
//! resolver.

use super::geometry::{point_in_rect, Rect};
use super::rule::{PatternType, RuleKind};
use super::search::find_text_coordinates;
use super::token::Token;

/// Left inset for `all-text` rules.
pub const ALL_TEXT_INSET: f64 = 2.0;
/// Left inset for every other kind; skips a label column left of the data.
pub const LABELLED_INSET: f64 = 40.0;

/// Left inset applied to the sweep rectangle for a rule kind.
pub fn left_inset(kind: &RuleKind) -> f64 {
    match kind {
        RuleKind::AllText => ALL_TEXT_INSET,
        _ => LABELLED_INSET,
    }
}

/// Sweep parameters of a generic rule.
#[derive(Debug, Clone, Copy)]
pub struct GenericSweep<'a> {
    pub region: Rect,
    pub search: Option<&'a str>,
    pub pattern: PatternType,
    pub inset: f64,
}

impl<'a> GenericSweep<'a> {
    pub fn new(region: Rect, kind: &RuleKind) -> Self {
        Self {
            region: region.normalized(),
            search: None,
            pattern: PatternType::None,
            inset: left_inset(kind),
        }
    }

    pub fn with_search(mut self, search: Option<&'a str>) -> Self {
        self.search = search;
        self
    }

    pub fn with_pattern(mut self, pattern: PatternType) -> Self {
        self.pattern = pattern;
        self
    }

    /// Rectangle to sweep, or `None` when the anchor phrase is absent.
    pub fn area(&self, tokens: &[Token]) -> Option<Rect> {
        let Some(phrase) = self.search else {
            return Some(self.region);
        };
        let anchor = find_text_coordinates(tokens, phrase, &self.region)?.normalized();
        let r = self.region;
        Some(match self.pattern {
            PatternType::FullLine => Rect::new(r.x1, anchor.y1, r.x2, anchor.y2),
            PatternType::FullColumn => Rect::new(anchor.x1, r.y1, anchor.x2, r.y2),
            PatternType::None => r,
        })
    }

    /// Boxes of every token whose top-left corner lies in the inset area.
    pub fn resolve(&self, tokens: &[Token]) -> Vec<Rect> {
        let Some(area) = self.area(tokens) else {
            return Vec::new();
        };
        let (x1, y1, x2, y2) = (area.x1 + self.inset, area.y1 - 1.0, area.x2 + 2.0, area.y2 + 1.0);

        tokens
            .iter()
            .map(|t| t.bbox.normalized())
            .filter(|b| point_in_rect(x1, y1, x2, y2, b.x1, b.y1))
            .collect()
    }
}
