//! Redaction targets and the PDF engine contract.
//!
//! The resolvers only ever see [`PageContent`]; everything that touches the
//! PDF container goes through [`PdfEngine`], so a different backend can be
//! swapped in without changing rule semantics.

use crate::domain::{FontDescriptor, FontSpan, PageContent, Rect, TextMeasure, Token};
use crate::error::RedactorResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Text to write back after a target has been blacked out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replacement {
    pub text: String,
    pub font: FontDescriptor,
    /// Baseline start, page coordinates.
    pub insertion_point: (f64, f64),
}

/// A resolved rectangle to mark opaque, with optional replacement text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionTarget {
    pub rect: Rect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement: Option<Replacement>,
}

impl RedactionTarget {
    pub fn fill(rect: Rect) -> Self {
        Self {
            rect,
            replacement: None,
        }
    }

    pub fn replace(rect: Rect, replacement: Replacement) -> Self {
        Self {
            rect,
            replacement: Some(replacement),
        }
    }
}

/// Colour of the opaque mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillColor {
    #[default]
    Black,
    White,
}

impl FillColor {
    pub fn rgb(&self) -> (f64, f64, f64) {
        match self {
            Self::Black => (0.0, 0.0, 0.0),
            Self::White => (1.0, 1.0, 1.0),
        }
    }
}

impl std::str::FromStr for FillColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "black" => Ok(Self::Black),
            "white" => Ok(Self::White),
            other => Err(format!("unknown fill colour '{}'", other)),
        }
    }
}

/// Statistics about a redaction operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RedactionResult {
    /// Number of rectangles blacked out
    pub instances_redacted: usize,

    /// Number of those that also received replacement text
    pub text_replacements: usize,

    /// Pages processed
    pub pages_processed: usize,

    /// Pages with redactions
    pub pages_modified: usize,

    /// Rules skipped because their page does not exist
    pub rules_skipped: usize,

    /// Whether text was physically removed (vs visually obscured)
    pub secure: bool,
}

impl RedactionResult {
    /// Creates a result indicating no redactions were needed.
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns true if any redactions were applied.
    pub fn has_redactions(&self) -> bool {
        self.instances_redacted > 0
    }
}

/// Operations required from the PDF backend. Pages are 1-based.
pub trait PdfEngine {
    fn page_count(&self) -> RedactorResult<usize>;

    /// `(width, height)` in page coordinates.
    fn page_size(&self, page: usize) -> RedactorResult<(f64, f64)>;

    /// Word tokens in reading order.
    fn extract_tokens(&self, page: usize) -> RedactorResult<Vec<Token>>;

    fn extract_font_spans(&self, page: usize) -> RedactorResult<Vec<FontSpan>>;

    /// Font metrics used for replacement-text geometry.
    fn measurer(&self) -> &dyn TextMeasure;

    fn apply_opaque_fill(&mut self, page: usize, rect: &Rect) -> RedactorResult<()>;

    fn insert_text(
        &mut self,
        page: usize,
        point: (f64, f64),
        text: &str,
        font: &FontDescriptor,
    ) -> RedactorResult<()>;

    /// Writes the modified document.
    fn save(&mut self, output: &Path) -> RedactorResult<()>;

    /// Returns a human-readable name for this engine.
    fn name(&self) -> &str;

    /// Returns whether covered text is physically removed.
    fn is_secure(&self) -> bool;

    /// Everything the resolvers need for one page.
    fn page_content(&self, page: usize) -> RedactorResult<PageContent> {
        let (width, height) = self.page_size(page)?;
        Ok(PageContent::new(page, width, height)
            .with_tokens(self.extract_tokens(page)?)
            .with_spans(self.extract_font_spans(page)?))
    }
}
