//! Page content as delivered by the PDF engine.

use super::geometry::{rect_contains, Rect};
use serde::{Deserialize, Serialize};

/// A word-level text run with its bounding box in page coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub bbox: Rect,
    pub text: String,
}

impl Token {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64, text: impl Into<String>) -> Self {
        Self {
            bbox: Rect::new(x1, y1, x2, y2),
            text: text.into(),
        }
    }
}

/// Font families a replacement string may be rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Helv,
    Tiro,
    Cour,
}

impl FontFamily {
    /// Defaults tried in order when the preferred family cannot be measured.
    pub const DEFAULTS: [FontFamily; 3] = [FontFamily::Helv, FontFamily::Tiro, FontFamily::Cour];

    /// Short name used in rule files and logs.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Helv => "helv",
            Self::Tiro => "tiro",
            Self::Cour => "cour",
        }
    }

    /// Matching PDF base-14 font name.
    pub fn base14_name(&self) -> &'static str {
        match self {
            Self::Helv => "Helvetica",
            Self::Tiro => "Times-Roman",
            Self::Cour => "Courier",
        }
    }

    /// Maps an engine-reported font name onto the closest allowed family.
    pub fn from_font_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.contains("cour") || lower.contains("mono") {
            Self::Cour
        } else if lower.contains("times")
            || lower.contains("tiro")
            || (lower.contains("serif") && !lower.contains("sans"))
        {
            Self::Tiro
        } else {
            Self::Helv
        }
    }

    /// The preferred family followed by the remaining defaults, without duplicates.
    pub fn fallback_chain(self) -> Vec<FontFamily> {
        let mut chain = vec![self];
        chain.extend(Self::DEFAULTS.iter().copied().filter(|f| *f != self));
        chain
    }
}

/// Font used to re-insert replacement text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontDescriptor {
    pub family: FontFamily,
    pub size_pt: f64,
    /// Packed `0xRRGGBB`.
    pub color: u32,
}

impl FontDescriptor {
    pub const BLACK: u32 = 0x000000;

    /// Fallback when no layout span encloses the token: size follows the token height.
    pub fn synthetic(token: &Token) -> Self {
        Self {
            family: FontFamily::default(),
            size_pt: token.bbox.height(),
            color: Self::BLACK,
        }
    }

    /// Colour as `(r, g, b)` components in `0.0..=1.0`.
    pub fn rgb(&self) -> (f64, f64, f64) {
        let r = ((self.color >> 16) & 0xff) as f64 / 255.0;
        let g = ((self.color >> 8) & 0xff) as f64 / 255.0;
        let b = (self.color & 0xff) as f64 / 255.0;
        (r, g, b)
    }
}

/// Text-layout span metadata used for font inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpan {
    pub bbox: Rect,
    pub family: FontFamily,
    pub size_pt: f64,
    pub color: u32,
}

/// Everything the resolvers need to know about one page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageContent {
    /// 1-based page number.
    pub number: usize,
    pub width: f64,
    pub height: f64,
    /// Word tokens in reading order.
    pub tokens: Vec<Token>,
    pub spans: Vec<FontSpan>,
}

impl PageContent {
    pub fn new(number: usize, width: f64, height: f64) -> Self {
        Self {
            number,
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_tokens(mut self, tokens: Vec<Token>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_spans(mut self, spans: Vec<FontSpan>) -> Self {
        self.spans = spans;
        self
    }

    /// Font of the first span whose box fully contains the token, or a
    /// synthetic estimate when none does.
    pub fn font_for(&self, token: &Token) -> FontDescriptor {
        self.spans
            .iter()
            .find(|span| rect_contains(&span.bbox, &token.bbox))
            .map(|span| FontDescriptor {
                family: span.family,
                size_pt: span.size_pt,
                color: span.color,
            })
            .unwrap_or_else(|| FontDescriptor::synthetic(token))
    }
}
