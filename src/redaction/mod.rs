//! Rule dispatch, PDF engines and the service layer.
//!
//! [`RedactionService`] drives a [`PdfEngine`]: every rule is resolved
//! against its page through the [`RuleDispatcher`], the resulting targets
//! are applied in batch order, and the document is saved.

pub mod dispatch;
pub mod overlay;
pub mod secure;
pub mod strategy;

pub use dispatch::{targets_by_page, RuleDispatcher, RuleOutcome, RuleResolution, SkipReason};
pub use secure::MupdfEngine;
pub use strategy::{FillColor, PdfEngine, RedactionResult, RedactionTarget, Replacement};

use crate::domain::{validate_rules, PageContent, Rule};
use crate::error::{RedactorError, RedactorResult};
use crate::storage::{StorageDriver, StorageUri};
use std::path::Path;
use tracing::{debug, info, warn};

/// Redaction service coordinating rule resolution and engine calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedactionService {
    fill: FillColor,
}

fn check_input(input: &Path) -> RedactorResult<()> {
    if !input.exists() {
        return Err(RedactorError::Io {
            path: input.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "Input file does not exist"),
        });
    }
    Ok(())
}

impl RedactionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fill(mut self, fill: FillColor) -> Self {
        self.fill = fill;
        self
    }

    pub fn fill(&self) -> FillColor {
        self.fill
    }

    /// Redacts `input` into `output` with the MuPDF engine.
    ///
    /// The whole batch is validated first; one invalid rule rejects all of them.
    pub fn redact(&self, input: &Path, output: &Path, rules: &[Rule]) -> RedactorResult<RedactionResult> {
        check_input(input)?;
        validate_rules(rules)?;

        let mut engine = MupdfEngine::open(input)?.with_fill(self.fill);
        let result = self.apply(&mut engine, rules)?;
        engine.save(output)?;

        info!(
            input = %input.display(),
            output = %output.display(),
            redacted = result.instances_redacted,
            replaced = result.text_replacements,
            skipped = result.rules_skipped,
            "redaction complete"
        );
        Ok(result)
    }

    /// Resolves `rules` and issues the fills and text insertions on `engine`.
    /// Does not save.
    pub fn apply(&self, engine: &mut dyn PdfEngine, rules: &[Rule]) -> RedactorResult<RedactionResult> {
        validate_rules(rules)?;
        let page_count = engine.page_count()?;
        let resolutions = self.resolve(&*engine, page_count, rules)?;

        let mut result = RedactionResult {
            pages_processed: page_count,
            secure: engine.is_secure(),
            rules_skipped: resolutions.iter().filter(|r| r.outcome.is_skipped()).count(),
            ..Default::default()
        };

        for (page, targets) in targets_by_page(&resolutions) {
            for target in &targets {
                engine.apply_opaque_fill(page, &target.rect)?;
                if let Some(replacement) = &target.replacement {
                    engine.insert_text(
                        page,
                        replacement.insertion_point,
                        &replacement.text,
                        &replacement.font,
                    )?;
                    result.text_replacements += 1;
                }
            }
            debug!(page, targets = targets.len(), engine = engine.name(), "page applied");
            result.instances_redacted += targets.len();
            result.pages_modified += 1;
        }

        if !result.has_redactions() {
            warn!("no rule produced a redaction target");
        }
        Ok(result)
    }

    fn resolve(
        &self,
        engine: &dyn PdfEngine,
        page_count: usize,
        rules: &[Rule],
    ) -> RedactorResult<Vec<RuleResolution>> {
        RuleDispatcher::new(engine.measurer())
            .resolve_document(page_count, rules, |page| engine.page_content(page))
    }

    /// Resolves rules against `input` without modifying anything.
    pub fn plan(&self, input: &Path, rules: &[Rule]) -> RedactorResult<Vec<RuleResolution>> {
        check_input(input)?;
        validate_rules(rules)?;
        let engine = MupdfEngine::open(input)?;
        self.resolve(&engine, engine.page_count()?, rules)
    }

    /// Extracted tokens and font spans of every page.
    pub fn tokens(&self, input: &Path) -> RedactorResult<Vec<PageContent>> {
        check_input(input)?;
        let engine = MupdfEngine::open(input)?;
        (1..=engine.page_count()?)
            .map(|page| engine.page_content(page))
            .collect()
    }

    /// Downloads `uri`, redacts it and uploads the result back to the same URI.
    pub fn redact_uri(
        &self,
        storage: &dyn StorageDriver,
        uri: &str,
        rules: &[Rule],
        work_dir: &Path,
    ) -> RedactorResult<(String, RedactionResult)> {
        validate_rules(rules)?;
        let parsed = StorageUri::parse(uri)?;

        let scratch = tempfile::Builder::new()
            .prefix("redact-")
            .tempdir_in(work_dir)
            .map_err(|e| RedactorError::Io {
                path: work_dir.to_path_buf(),
                source: e,
            })?;
        let source = scratch.path().join(format!("source-{}", parsed.file_name()));
        let redacted = scratch.path().join(format!("redacted-{}", parsed.file_name()));

        storage.download(&parsed, &source)?;
        let result = self.redact(&source, &redacted, rules)?;
        storage.upload(&redacted, &parsed)?;

        info!(uri = %parsed, driver = storage.name(), "uploaded redacted document");
        Ok((parsed.to_string(), result))
    }
}
