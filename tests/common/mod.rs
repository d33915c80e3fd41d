//! Shared fixtures for the integration tests.
//!
//! - token layouts for the resolver tests
//! - a recording [`PdfEngine`](rule_redactor::PdfEngine)
//! - a printpdf builder for MuPDF round trips

#![allow(dead_code)]

pub mod engine;
pub mod fixtures;
pub mod pdf_helpers;

pub use engine::*;
pub use fixtures::*;
pub use pdf_helpers::*;
