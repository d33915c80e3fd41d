//! Pure resolution logic: geometry, search and the per-kind resolvers.
//!
//! Nothing in this module performs I/O or holds state between calls; every
//! resolver is a function of the page content and one rule.

pub mod date_shift;
pub mod generic;
pub mod geometry;
pub mod rule;
pub mod search;
pub mod table;
pub mod token;

pub use date_shift::{
    shift_date_text, DateFormat, DateReplacement, DateShiftResolver, HeuristicMeasure, TextMeasure,
};
pub use generic::GenericSweep;
pub use geometry::{point_in_rect, rect_contains, rect_overlaps, Rect};
pub use rule::{parse_rules, validate_rules, PatternType, Region, Rule, RuleKind};
pub use search::find_text_coordinates;
pub use table::{ColumnByNameResolver, TableColumnResolver, TableLayout};
pub use token::{FontDescriptor, FontFamily, FontSpan, PageContent, Token};
