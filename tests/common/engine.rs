//! In-memory engine that records every drawing call.

use rule_redactor::domain::{
    FontDescriptor, FontSpan, HeuristicMeasure, PageContent, Rect, TextMeasure, Token,
};
use rule_redactor::{PdfEngine, RedactorResult};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Fill { page: usize, rect: Rect },
    Text { page: usize, point: (f64, f64), text: String, font: FontDescriptor },
}

pub struct RecordingEngine {
    pages: Vec<PageContent>,
    measure: HeuristicMeasure,
    pub calls: Vec<Call>,
    pub saved: bool,
}

impl RecordingEngine {
    pub fn new(pages: Vec<PageContent>) -> Self {
        Self {
            pages,
            measure: HeuristicMeasure,
            calls: Vec::new(),
            saved: false,
        }
    }

    fn page(&self, page: usize) -> &PageContent {
        &self.pages[page - 1]
    }

    pub fn fills(&self) -> Vec<Rect> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Fill { rect, .. } => Some(*rect),
                Call::Text { .. } => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Text { text, .. } => Some(text.clone()),
                Call::Fill { .. } => None,
            })
            .collect()
    }
}

impl PdfEngine for RecordingEngine {
    fn page_count(&self) -> RedactorResult<usize> {
        Ok(self.pages.len())
    }

    fn page_size(&self, page: usize) -> RedactorResult<(f64, f64)> {
        let p = self.page(page);
        Ok((p.width, p.height))
    }

    fn extract_tokens(&self, page: usize) -> RedactorResult<Vec<Token>> {
        Ok(self.page(page).tokens.clone())
    }

    fn extract_font_spans(&self, page: usize) -> RedactorResult<Vec<FontSpan>> {
        Ok(self.page(page).spans.clone())
    }

    fn measurer(&self) -> &dyn TextMeasure {
        &self.measure
    }

    fn apply_opaque_fill(&mut self, page: usize, rect: &Rect) -> RedactorResult<()> {
        self.calls.push(Call::Fill { page, rect: *rect });
        Ok(())
    }

    fn insert_text(
        &mut self,
        page: usize,
        point: (f64, f64),
        text: &str,
        font: &FontDescriptor,
    ) -> RedactorResult<()> {
        self.calls.push(Call::Text {
            page,
            point,
            text: text.to_string(),
            font: *font,
        });
        Ok(())
    }

    fn save(&mut self, _output: &Path) -> RedactorResult<()> {
        self.saved = true;
        Ok(())
    }

    fn name(&self) -> &str {
        "Recording"
    }

    fn is_secure(&self) -> bool {
        false
    }
}
