//! MuPDF-backed engine.
//!
//! Extraction reads MuPDF's structured text. Applying targets is two-phase:
//! text under every fill is physically removed through PDF redaction
//! annotations, then the saved file is reopened and the fills and
//! replacement text are painted (see [`super::overlay`]).

use super::overlay::{paint_document, PagePaint, PaintOp};
use super::strategy::{FillColor, PdfEngine};
use crate::domain::{FontDescriptor, FontFamily, FontSpan, PageContent, Rect, TextMeasure, Token};
use crate::error::{RedactorError, RedactorResult};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

use mupdf::pdf::{PdfAnnotationType, PdfDocument, PdfPage};
use mupdf::{Font, Page, Quad, Rect as MuRect, TextPageFlags};

/// Glyph advances of the base-14 families, loaded once per engine.
pub struct Base14Metrics {
    fonts: Vec<(FontFamily, Font)>,
}

impl Base14Metrics {
    pub fn load() -> Self {
        let fonts = FontFamily::DEFAULTS
            .iter()
            .filter_map(|family| match Font::new(family.base14_name()) {
                Ok(font) => Some((*family, font)),
                Err(e) => {
                    warn!(font = family.base14_name(), error = %e, "font unavailable for metrics");
                    None
                }
            })
            .collect();
        Self { fonts }
    }
}

impl TextMeasure for Base14Metrics {
    fn measure(&self, text: &str, family: FontFamily, size_pt: f64) -> Option<f64> {
        let (_, font) = self.fonts.iter().find(|(f, _)| *f == family)?;
        let mut advance = 0.0f64;
        for c in text.chars() {
            let glyph = font.encode_character(c as i32).ok()?;
            if glyph == 0 {
                return None;
            }
            advance += font.advance_glyph(glyph).ok()? as f64;
        }
        Some(advance * size_pt)
    }
}

fn quad_rect(quad: &Quad) -> Rect {
    Rect::new(
        quad.ul.x.min(quad.ll.x).min(quad.ur.x).min(quad.lr.x) as f64,
        quad.ul.y.min(quad.ll.y).min(quad.ur.y).min(quad.lr.y) as f64,
        quad.ul.x.max(quad.ll.x).max(quad.ur.x).max(quad.lr.x) as f64,
        quad.ul.y.max(quad.ll.y).max(quad.ur.y).max(quad.lr.y) as f64,
    )
}

fn mu_rect(rect: &Rect) -> MuRect {
    let r = rect.normalized();
    MuRect {
        x0: r.x1 as f32,
        y0: r.y1 as f32,
        x1: r.x2 as f32,
        y1: r.y2 as f32,
    }
}

#[derive(Default)]
struct WordBuilder {
    text: String,
    bbox: Option<Rect>,
}

impl WordBuilder {
    fn push(&mut self, c: char, rect: Rect) {
        self.text.push(c);
        self.bbox = Some(match self.bbox {
            Some(b) => b.union(&rect),
            None => rect,
        });
    }

    fn flush(&mut self, tokens: &mut Vec<Token>) {
        if let Some(bbox) = self.bbox.take() {
            tokens.push(Token {
                bbox,
                text: std::mem::take(&mut self.text),
            });
        }
        self.text.clear();
    }
}

/// Secure engine that physically removes text using MuPDF.
pub struct MupdfEngine {
    document: PdfDocument,
    metrics: Base14Metrics,
    fill: FillColor,
    pending: BTreeMap<usize, PagePaint>,
}

impl MupdfEngine {
    pub fn open(input: &Path) -> RedactorResult<Self> {
        let input_str = input.to_str().ok_or_else(|| RedactorError::InvalidInput {
            parameter: "input".to_string(),
            reason: "Path contains invalid UTF-8".to_string(),
        })?;

        let document = PdfDocument::open(input_str).map_err(|e| RedactorError::PdfProcessing {
            message: "Failed to open PDF with MuPDF".to_string(),
            page: None,
            source: Some(Box::new(e)),
        })?;

        Ok(Self {
            document,
            metrics: Base14Metrics::load(),
            fill: FillColor::default(),
            pending: BTreeMap::new(),
        })
    }

    pub fn with_fill(mut self, fill: FillColor) -> Self {
        self.fill = fill;
        self
    }

    fn load_page(&self, page: usize) -> RedactorResult<Page> {
        let count = self.page_count()?;
        if page == 0 || page > count {
            return Err(RedactorError::InvalidInput {
                parameter: "page".to_string(),
                reason: format!("page {} outside 1..={}", page, count),
            });
        }
        self.document
            .load_page(page as i32 - 1)
            .map_err(|e| RedactorError::PdfProcessing {
                message: format!("Failed to load page {}", page),
                page: Some(page),
                source: Some(Box::new(e)),
            })
    }

    /// Tokens and line spans from one structured-text pass.
    fn read_page(&self, page: usize) -> RedactorResult<(Vec<Token>, Vec<FontSpan>)> {
        let text_page = self
            .load_page(page)?
            .to_text_page(TextPageFlags::empty())
            .map_err(|e| RedactorError::mupdf(format!("Text extraction failed on page {}", page), e))?;

        let mut tokens = Vec::new();
        let mut spans = Vec::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                let mut word = WordBuilder::default();
                let (mut size_sum, mut size_count) = (0.0f64, 0usize);
                for ch in line.chars() {
                    size_sum += ch.size() as f64;
                    size_count += 1;
                    match ch.char() {
                        Some(c) if !c.is_whitespace() => word.push(c, quad_rect(&ch.quad())),
                        _ => word.flush(&mut tokens),
                    }
                }
                word.flush(&mut tokens);

                if size_count > 0 {
                    let b = line.bounds();
                    spans.push(FontSpan {
                        bbox: Rect::new(b.x0 as f64, b.y0 as f64, b.x1 as f64, b.y1 as f64),
                        family: FontFamily::default(),
                        size_pt: size_sum / size_count as f64,
                        color: FontDescriptor::BLACK,
                    });
                }
            }
        }
        Ok((tokens, spans))
    }

    fn queue(&mut self, page: usize, op: PaintOp) -> RedactorResult<()> {
        if !self.pending.contains_key(&page) {
            let (_, height) = self.page_size(page)?;
            self.pending.insert(
                page,
                PagePaint {
                    height,
                    ops: Vec::new(),
                },
            );
        }
        if let Some(paint) = self.pending.get_mut(&page) {
            paint.ops.push(op);
        }
        Ok(())
    }

    /// Physically removes text under every queued fill.
    fn remove_covered_text(&self) -> RedactorResult<()> {
        for (page_number, paint) in &self.pending {
            let fills: Vec<&Rect> = paint
                .ops
                .iter()
                .filter_map(|op| match op {
                    PaintOp::Fill(rect) => Some(rect),
                    PaintOp::Text { .. } => None,
                })
                .collect();
            if fills.is_empty() {
                continue;
            }

            let page = self.load_page(*page_number)?;
            let mut pdf_page = match PdfPage::try_from(page.clone()) {
                Ok(p) => p,
                Err(_) => continue, // Skip non-PDF pages
            };

            for rect in &fills {
                let annot = pdf_page
                    .create_annotation(PdfAnnotationType::Redact)
                    .map_err(|e| RedactorError::PdfProcessing {
                        message: "Failed to create redaction annotation".to_string(),
                        page: Some(*page_number),
                        source: Some(Box::new(e)),
                    })?;

                unsafe {
                    ffi::set_annotation_rect(&annot, mu_rect(rect));
                }
            }

            pdf_page
                .redact()
                .map_err(|e| RedactorError::PdfProcessing {
                    message: format!("Failed to apply redactions on page {}", page_number),
                    page: Some(*page_number),
                    source: Some(Box::new(e)),
                })?;
            debug!(page = page_number, regions = fills.len(), "removed covered text");
        }
        Ok(())
    }
}

impl PdfEngine for MupdfEngine {
    fn page_count(&self) -> RedactorResult<usize> {
        self.document
            .page_count()
            .map(|n| n.max(0) as usize)
            .map_err(|e| RedactorError::mupdf("Failed to get page count", e))
    }

    fn page_size(&self, page: usize) -> RedactorResult<(f64, f64)> {
        let bounds = self
            .load_page(page)?
            .bounds()
            .map_err(|e| RedactorError::mupdf(format!("Failed to get bounds for page {}", page), e))?;
        Ok(((bounds.x1 - bounds.x0) as f64, (bounds.y1 - bounds.y0) as f64))
    }

    fn extract_tokens(&self, page: usize) -> RedactorResult<Vec<Token>> {
        self.read_page(page).map(|(tokens, _)| tokens)
    }

    fn extract_font_spans(&self, page: usize) -> RedactorResult<Vec<FontSpan>> {
        self.read_page(page).map(|(_, spans)| spans)
    }

    fn measurer(&self) -> &dyn TextMeasure {
        &self.metrics
    }

    fn apply_opaque_fill(&mut self, page: usize, rect: &Rect) -> RedactorResult<()> {
        self.queue(page, PaintOp::Fill(*rect))
    }

    fn insert_text(
        &mut self,
        page: usize,
        point: (f64, f64),
        text: &str,
        font: &FontDescriptor,
    ) -> RedactorResult<()> {
        self.queue(
            page,
            PaintOp::Text {
                point,
                text: text.to_string(),
                font: *font,
            },
        )
    }

    fn save(&mut self, output: &Path) -> RedactorResult<()> {
        self.remove_covered_text()?;

        let output_str = output.to_str().ok_or_else(|| RedactorError::InvalidInput {
            parameter: "output".to_string(),
            reason: "Path contains invalid UTF-8".to_string(),
        })?;
        self.document
            .save(output_str)
            .map_err(|e| RedactorError::PdfProcessing {
                message: "Failed to save redacted PDF".to_string(),
                page: None,
                source: Some(Box::new(e)),
            })?;

        if !self.pending.is_empty() {
            paint_document(output, &self.pending, self.fill)?;
        }
        self.pending.clear();
        Ok(())
    }

    fn name(&self) -> &str {
        "MuPDF"
    }

    fn is_secure(&self) -> bool {
        true
    }

    fn page_content(&self, page: usize) -> RedactorResult<PageContent> {
        let (width, height) = self.page_size(page)?;
        let (tokens, spans) = self.read_page(page)?;
        Ok(PageContent::new(page, width, height)
            .with_tokens(tokens)
            .with_spans(spans))
    }
}

/// FFI helpers for MuPDF annotation operations.
mod ffi {
    use mupdf::pdf::PdfAnnotation;
    use mupdf::Rect;

    /// Sets the rectangle for a PDF annotation via FFI.
    ///
    /// # Safety
    /// The annotation must be valid and the MuPDF context initialized.
    pub unsafe fn set_annotation_rect(annot: &PdfAnnotation, rect: Rect) {
        #[repr(C)]
        struct PdfAnnotRaw {
            inner: *mut mupdf_sys::pdf_annot,
        }

        let annot_raw = std::mem::transmute::<&PdfAnnotation, &PdfAnnotRaw>(annot);
        let ctx = mupdf_sys::mupdf_new_base_context();

        if !ctx.is_null() {
            let fz_rect = mupdf_sys::fz_rect {
                x0: rect.x0,
                y0: rect.y0,
                x1: rect.x1,
                y1: rect.y1,
            };

            mupdf_sys::pdf_set_annot_rect(ctx, annot_raw.inner, fz_rect);
            mupdf_sys::mupdf_drop_base_context(ctx);
        }
    }
}
