//! Rule-driven PDF redaction.
//!
//! Declarative rules ("redact everything under the column named X", "the
//! full line containing this phrase", "shift every date in this region by
//! N days") are resolved against a page's word tokens into exact redaction
//! boxes, then applied with MuPDF so covered text is physically removed.
//!
//! # Architecture
//!
//! - [`domain`]: pure resolution logic (geometry, search, table, date shift)
//! - [`redaction`]: rule dispatch, PDF engines and the service layer
//! - [`storage`]: `<scheme>://<bucket>/<path>` object storage
//! - [`config`]: environment configuration
//! - [`error`]: error taxonomy
//!
//! # Quick Start
//!
//! ```no_run
//! use rule_redactor::{parse_rules, RedactionService};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rules = parse_rules(r#"[{
//!     "fieldName": "Visit date",
//!     "ruleType": "date-shift",
//!     "region": {"x": 0, "y": 0, "width": 1224, "height": 400},
//!     "pageNumber": 1,
//!     "dateShiftDays": -7
//! }]"#)?;
//!
//! let result = RedactionService::new().redact(
//!     Path::new("claim.pdf"),
//!     Path::new("claim-redacted.pdf"),
//!     &rules,
//! )?;
//! println!("{} box(es) redacted", result.instances_redacted);
//! # Ok(())
//! # }
//! ```
//!
//! Resolution works without a PDF at all:
//!
//! ```
//! use rule_redactor::domain::{HeuristicMeasure, PageContent, Region, Rule, RuleKind, Token};
//! use rule_redactor::RuleDispatcher;
//!
//! let page = PageContent::new(1, 612.0, 792.0).with_tokens(vec![
//!     Token::new(10.0, 5.0, 30.0, 15.0, "Name:"),
//!     Token::new(60.0, 5.0, 100.0, 15.0, "Jane"),
//! ]);
//! let rule = Rule::new(RuleKind::HaveValue, Region::new(0.0, 0.0, 400.0, 40.0), 1);
//!
//! let measure = HeuristicMeasure;
//! let targets = RuleDispatcher::new(&measure).resolve_rule(&page, &rule).unwrap();
//! assert_eq!(targets.len(), 1);
//! assert_eq!(targets[0].rect.x1, 60.0);
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod redaction;
pub mod storage;

pub use config::Config;
pub use domain::{parse_rules, validate_rules, PageContent, Rect, Rule, RuleKind, Token};
pub use error::{RedactorError, RedactorResult};
pub use redaction::{
    FillColor, MupdfEngine, PdfEngine, RedactionResult, RedactionService, RedactionTarget,
    RuleDispatcher, RuleOutcome, RuleResolution, SkipReason,
};
pub use storage::{LocalStorage, StorageDriver, StorageUri};
