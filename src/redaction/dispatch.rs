//! Rule dispatch: picks a resolver per rule and records what happened.

use super::strategy::{RedactionTarget, Replacement};
use crate::domain::{
    ColumnByNameResolver, DateShiftResolver, GenericSweep, PageContent, PatternType, Rule,
    RuleKind, TableColumnResolver, TextMeasure,
};
use crate::error::{RedactorError, RedactorResult};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Why a rule produced nothing without being evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    PageOutOfRange { page: usize, page_count: usize },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PageOutOfRange { page, page_count } => write!(
                f,
                "page {} is out of range (document has {} page(s))",
                page, page_count
            ),
        }
    }
}

/// Result of evaluating one rule. An empty `Resolved` means "no match".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum RuleOutcome {
    Resolved(Vec<RedactionTarget>),
    Skipped(SkipReason),
}

impl RuleOutcome {
    pub fn targets(&self) -> &[RedactionTarget] {
        match self {
            Self::Resolved(targets) => targets,
            Self::Skipped(_) => &[],
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

/// One rule's outcome, tagged with its position in the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleResolution {
    pub index: usize,
    #[serde(rename = "fieldName")]
    pub field_name: String,
    #[serde(rename = "ruleType")]
    pub kind: RuleKind,
    pub page: usize,
    pub outcome: RuleOutcome,
}

/// Evaluates rules against page content.
pub struct RuleDispatcher<'m> {
    measure: &'m dyn TextMeasure,
    table: TableColumnResolver,
    columns: ColumnByNameResolver,
}

impl<'m> RuleDispatcher<'m> {
    pub fn new(measure: &'m dyn TextMeasure) -> Self {
        Self {
            measure,
            table: TableColumnResolver::new(),
            columns: ColumnByNameResolver::new(),
        }
    }

    pub fn with_table_resolver(mut self, table: TableColumnResolver) -> Self {
        self.table = table;
        self
    }

    /// Resolves one rule against the page it names.
    pub fn resolve_rule(&self, page: &PageContent, rule: &Rule) -> RedactorResult<Vec<RedactionTarget>> {
        let region = rule.rect();

        if rule.kind.is_date_shift() {
            return self.resolve_dates(page, rule);
        }

        if rule.pattern_type != PatternType::None {
            return Ok(self.sweep(page, rule, rule.pattern_type));
        }

        let targets = match &rule.kind {
            RuleKind::Table => match rule.label() {
                Some(label) => fills(self.table.resolve(&page.tokens, &region, label)),
                None => Vec::new(),
            },
            RuleKind::ColumnByName => match rule.label() {
                Some(label) => {
                    let column = self.columns.resolve(&page.tokens, label);
                    if column.is_empty() {
                        debug!(label, "no tokens under column header, sweeping region");
                        self.sweep(page, rule, PatternType::None)
                    } else {
                        fills(column)
                    }
                }
                None => Vec::new(),
            },
            RuleKind::FullLine => self.sweep(page, rule, PatternType::FullLine),
            RuleKind::FullColumn => self.sweep(page, rule, PatternType::FullColumn),
            _ => self.sweep(page, rule, PatternType::None),
        };
        Ok(targets)
    }

    fn sweep(&self, page: &PageContent, rule: &Rule, pattern: PatternType) -> Vec<RedactionTarget> {
        let sweep = GenericSweep::new(rule.rect(), &rule.kind)
            .with_search(rule.search_text())
            .with_pattern(pattern);
        fills(sweep.resolve(&page.tokens))
    }

    fn resolve_dates(&self, page: &PageContent, rule: &Rule) -> RedactorResult<Vec<RedactionTarget>> {
        let mut resolver = DateShiftResolver::new(self.measure);
        if let Some(pattern) = &rule.custom_pattern {
            let regex = Regex::new(pattern).map_err(|e| RedactorError::PatternError {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
            resolver = resolver.with_pattern(regex);
        }

        Ok(resolver
            .resolve(page, &rule.rect(), rule.shift_days())
            .into_iter()
            .map(|hit| {
                RedactionTarget::replace(
                    hit.rect,
                    Replacement {
                        text: hit.replacement,
                        font: hit.font,
                        insertion_point: hit.insertion_point,
                    },
                )
            })
            .collect())
    }

    /// Resolves a batch in order. Pages are loaded once, on first use.
    pub fn resolve_document<F>(
        &self,
        page_count: usize,
        rules: &[Rule],
        mut load_page: F,
    ) -> RedactorResult<Vec<RuleResolution>>
    where
        F: FnMut(usize) -> RedactorResult<PageContent>,
    {
        let mut pages: BTreeMap<usize, PageContent> = BTreeMap::new();
        let mut resolutions = Vec::with_capacity(rules.len());

        for (index, rule) in rules.iter().enumerate() {
            let page_number = rule.page_number;
            let outcome = if page_number == 0 || page_number > page_count {
                let reason = SkipReason::PageOutOfRange {
                    page: page_number,
                    page_count,
                };
                info!(rule = index, %reason, "skipping rule");
                RuleOutcome::Skipped(reason)
            } else {
                if !pages.contains_key(&page_number) {
                    pages.insert(page_number, load_page(page_number)?);
                }
                let page = &pages[&page_number];
                let targets = self.resolve_rule(page, rule)?;
                debug!(
                    rule = index,
                    kind = rule.kind.as_str(),
                    page = page_number,
                    targets = targets.len(),
                    "rule resolved"
                );
                RuleOutcome::Resolved(targets)
            };

            resolutions.push(RuleResolution {
                index,
                field_name: rule.field_name.clone(),
                kind: rule.kind.clone(),
                page: page_number,
                outcome,
            });
        }

        Ok(resolutions)
    }
}

fn fills(rects: Vec<crate::domain::Rect>) -> Vec<RedactionTarget> {
    rects.into_iter().map(RedactionTarget::fill).collect()
}

/// Targets grouped by page, each page keeping batch order.
pub fn targets_by_page(resolutions: &[RuleResolution]) -> BTreeMap<usize, Vec<&RedactionTarget>> {
    let mut pages: BTreeMap<usize, Vec<&RedactionTarget>> = BTreeMap::new();
    for resolution in resolutions {
        let targets = resolution.outcome.targets();
        if !targets.is_empty() {
            pages.entry(resolution.page).or_default().extend(targets);
        }
    }
    pages
}
