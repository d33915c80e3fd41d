//! Generated PDFs and MuPDF helpers.

use anyhow::Result;
use printpdf::*;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

// MuPDF font loading is not thread-safe; tests that open documents in
// process take this lock.
static MUPDF_LOCK: Mutex<()> = Mutex::new(());

pub fn mupdf_lock() -> MutexGuard<'static, ()> {
    MUPDF_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Builder for single-font test PDFs, one text line per entry.
#[derive(Debug, Clone)]
pub struct TestPdfBuilder {
    pages: Vec<Vec<(f32, String)>>,
}

impl TestPdfBuilder {
    pub fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
        }
    }

    /// Adds a line whose baseline sits `mm_from_top` below the top edge.
    pub fn with_line(mut self, mm_from_top: f32, text: &str) -> Self {
        if let Some(page) = self.pages.last_mut() {
            page.push((mm_from_top, text.to_string()));
        }
        self
    }

    pub fn with_page(mut self) -> Self {
        self.pages.push(Vec::new());
        self
    }

    pub fn build(self, output_path: &Path) -> Result<PathBuf> {
        let (doc, page1, layer1) = PdfDocument::new("Test", Mm(210.0), Mm(297.0), "Layer 1");
        let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;

        for (i, lines) in self.pages.iter().enumerate() {
            let (page, layer) = if i == 0 {
                (page1, layer1)
            } else {
                doc.add_page(Mm(210.0), Mm(297.0), "Layer 1")
            };
            let current_layer = doc.get_page(page).get_layer(layer);
            for (mm_from_top, text) in lines {
                current_layer.use_text(text.as_str(), 12.0, Mm(20.0), Mm(297.0 - mm_from_top), &font);
            }
        }

        doc.save(&mut BufWriter::new(fs::File::create(output_path)?))?;
        Ok(output_path.to_path_buf())
    }
}

impl Default for TestPdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Claim form used by the round-trip tests.
pub fn create_claim_form(path: &Path) -> Result<PathBuf> {
    TestPdfBuilder::new()
        .with_line(20.0, "Name: John Doe")
        .with_line(40.0, "DOB 01/15/2024")
        .build(path)
}

/// All token texts of every page, concatenated.
pub fn page_texts(pages: &[rule_redactor::PageContent]) -> Vec<String> {
    pages
        .iter()
        .flat_map(|p| p.tokens.iter().map(|t| t.text.clone()))
        .collect()
}
