//! Table column resolution.
//!
//! A table region is reduced to a header row and column bands derived from
//! header token centers; the requested column is then cut into one target
//! per visual row.

use super::geometry::{rect_contains, Rect};
use super::token::Token;
use std::collections::BTreeMap;

/// Median token height assumed when a region holds no tokens.
const DEFAULT_TOKEN_HEIGHT: f64 = 12.0;
/// Minimum vertical slack for header membership.
const MIN_HEADER_SLACK: f64 = 6.0;
/// Height of the bands rows are quantized into.
const ROW_BAND: f64 = 5.0;

/// Horizontal extent of one detected column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBounds {
    pub left: f64,
    pub right: f64,
    /// The header token that defined this column.
    pub header: Token,
}

impl ColumnBounds {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }
}

/// Header row and column bands of a table region.
#[derive(Debug, Clone)]
pub struct TableLayout<'a> {
    region: Rect,
    /// Tokens fully inside the region, in reading order.
    pub tokens: Vec<&'a Token>,
    /// Columns ordered left to right.
    pub columns: Vec<ColumnBounds>,
    /// Lowest edge of the header row.
    pub header_bottom: f64,
}

impl<'a> TableLayout<'a> {
    /// Detects the header row and column bands. `None` when the region
    /// holds no tokens.
    pub fn detect(tokens: &'a [Token], region: &Rect) -> Option<Self> {
        let region = region.normalized();
        let inside: Vec<&Token> = tokens
            .iter()
            .filter(|token| rect_contains(&region, &token.bbox))
            .collect();
        if inside.is_empty() {
            return None;
        }

        let min_top = inside
            .iter()
            .map(|t| t.bbox.normalized().y1)
            .fold(f64::INFINITY, f64::min);
        let slack = MIN_HEADER_SLACK.max(1.5 * median_height(&inside));

        let mut header: Vec<&Token> = inside
            .iter()
            .copied()
            .filter(|t| t.bbox.normalized().y1 <= min_top + slack)
            .collect();
        header.sort_by(|a, b| a.bbox.center_x().total_cmp(&b.bbox.center_x()));

        let header_bottom = header
            .iter()
            .map(|t| t.bbox.normalized().y2)
            .fold(f64::NEG_INFINITY, f64::max);

        let centers: Vec<f64> = header.iter().map(|t| t.bbox.center_x()).collect();
        let columns = header
            .iter()
            .enumerate()
            .map(|(i, token)| ColumnBounds {
                left: if i == 0 {
                    region.x1
                } else {
                    (centers[i - 1] + centers[i]) / 2.0
                },
                right: if i + 1 == centers.len() {
                    region.x2
                } else {
                    (centers[i] + centers[i + 1]) / 2.0
                },
                header: (*token).clone(),
            })
            .collect();

        Some(Self {
            region,
            tokens: inside,
            columns,
            header_bottom,
        })
    }

    /// First column (left to right) whose header contains `label`, case-insensitive.
    pub fn column(&self, label: &str) -> Option<&ColumnBounds> {
        let needle = label.trim().to_lowercase();
        self.columns
            .iter()
            .find(|c| c.header.text.to_lowercase().contains(&needle))
    }

    /// Widens a column: 15% (at least 5) to the left, never past the
    /// header's own left edge minus 3, and 10% (at least 3) to the right.
    /// Both sides stay inside the region.
    pub fn expanded(&self, column: &ColumnBounds) -> (f64, f64) {
        let width = column.width();
        let header_left = column.header.bbox.normalized().x1 - 3.0;

        let left = (column.left - (0.15 * width).max(5.0))
            .max(header_left.min(column.left))
            .max(self.region.x1);
        let right = (column.right + (0.10 * width).max(3.0)).min(self.region.x2);
        (left, right)
    }

    fn body(&self) -> impl Iterator<Item = &&'a Token> + '_ {
        let bottom = self.header_bottom;
        self.tokens
            .iter()
            .filter(move |t| t.bbox.center_y() > bottom)
    }

    /// Top edge of the first region token, in reading order, containing `marker`.
    /// A header cell can stop the table too.
    pub fn stop_row(&self, marker: &str) -> Option<f64> {
        let needle = marker.to_uppercase();
        self.tokens
            .iter()
            .find(|t| t.text.to_uppercase().contains(&needle))
            .map(|t| t.bbox.normalized().y1)
    }
}

fn median_height(tokens: &[&Token]) -> f64 {
    let mut heights: Vec<f64> = tokens.iter().map(|t| t.bbox.height()).collect();
    if heights.is_empty() {
        return DEFAULT_TOKEN_HEIGHT;
    }
    heights.sort_by(f64::total_cmp);
    heights[heights.len() / 2]
}

/// Redacts the body cells of one named column, one target per row.
#[derive(Debug, Clone)]
pub struct TableColumnResolver {
    stop_marker: Option<String>,
}

impl TableColumnResolver {
    pub fn new() -> Self {
        Self {
            stop_marker: Some("TOTAL".to_string()),
        }
    }

    /// Replaces the row-stop marker; `None` disables the stop row.
    pub fn with_stop_marker(mut self, marker: Option<&str>) -> Self {
        self.stop_marker = marker.map(str::to_string);
        self
    }

    pub fn resolve(&self, tokens: &[Token], region: &Rect, label: &str) -> Vec<Rect> {
        let Some(layout) = TableLayout::detect(tokens, region) else {
            return Vec::new();
        };
        let Some(column) = layout.column(label) else {
            return Vec::new();
        };

        let (left, right) = layout.expanded(column);
        let stop = self
            .stop_marker
            .as_deref()
            .and_then(|marker| layout.stop_row(marker));

        let mut rows: BTreeMap<i64, Vec<&Token>> = BTreeMap::new();
        for token in layout.body() {
            let cx = token.bbox.center_x();
            let cy = token.bbox.center_y();
            if cx <= left + 1.0 || cx >= right - 1.0 {
                continue;
            }
            if stop.is_some_and(|stop_y| cy >= stop_y) {
                continue;
            }
            let key = (cy / ROW_BAND).round() as i64 * ROW_BAND as i64;
            rows.entry(key).or_default().push(*token);
        }

        rows.values()
            .filter_map(|row| {
                let mut cells = row.iter();
                let first = cells.next()?.bbox.normalized();
                Some(cells.fold(first, |acc, t| acc.union(&t.bbox)).expand(2.0, 1.0))
            })
            .collect()
    }
}

impl Default for TableColumnResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Page-wide column lookup by header label, one target per token.
#[derive(Debug, Clone, Default)]
pub struct ColumnByNameResolver;

impl ColumnByNameResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, tokens: &[Token], label: &str) -> Vec<Rect> {
        let needle = label.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let header = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.text.to_lowercase().contains(&needle))
            .min_by(|(_, a), (_, b)| a.bbox.normalized().y1.total_cmp(&b.bbox.normalized().y1));
        let Some((header_idx, header)) = header else {
            return Vec::new();
        };

        let hb = header.bbox.normalized();
        let pad = 0.3 * hb.width();
        let (left, right) = (hb.x1 - pad, hb.x2 + pad);

        tokens
            .iter()
            .enumerate()
            .filter(|(i, t)| {
                let b = t.bbox.normalized();
                *i != header_idx && b.center_y() > hb.y2 && b.x2 >= left && b.x1 <= right
            })
            .map(|(_, t)| t.bbox.normalized())
            .collect()
    }
}
