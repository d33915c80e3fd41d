//! Content-stream painting: opaque fills and replacement text.
//!
//! Works on a saved document with lopdf. Paint operations are given in
//! top-left page coordinates and converted to PDF user space against the
//! page's MediaBox.

use super::strategy::FillColor;
use crate::domain::{FontDescriptor, FontFamily, Rect};
use crate::error::{RedactorError, RedactorResult};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, warn};

/// One queued drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    Fill(Rect),
    Text {
        point: (f64, f64),
        text: String,
        font: FontDescriptor,
    },
}

/// Queued paint calls for one page, in issue order.
#[derive(Debug, Clone, Default)]
pub struct PagePaint {
    /// Page height as reported by the extraction backend; used when the
    /// MediaBox cannot be read.
    pub height: f64,
    pub ops: Vec<PaintOp>,
}

impl PagePaint {
    fn families(&self) -> Vec<FontFamily> {
        let mut families = Vec::new();
        for op in &self.ops {
            if let PaintOp::Text { font, .. } = op {
                if !families.contains(&font.family) {
                    families.push(font.family);
                }
            }
        }
        families
    }
}

fn resource_name(family: FontFamily) -> String {
    format!("RR{}", family.short_name())
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// `(llx, lly, urx, ury)`, following `Parent` links for inherited boxes.
fn media_box(doc: &Document, page_id: ObjectId) -> Option<(f64, f64, f64, f64)> {
    let mut current = Some(page_id);
    while let Some(id) = current {
        let dict = doc.get_object(id).ok()?.as_dict().ok()?;
        if let Ok(Object::Array(values)) = dict.get(b"MediaBox") {
            let nums: Vec<f64> = values.iter().filter_map(number).collect();
            if nums.len() == 4 {
                return Some((nums[0], nums[1], nums[2], nums[3]));
            }
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

fn inherited_resources(doc: &Document, page_id: ObjectId) -> Option<Object> {
    let mut current = doc
        .get_object(page_id)
        .ok()?
        .as_dict()
        .ok()?
        .get(b"Parent")
        .and_then(Object::as_reference)
        .ok();
    while let Some(id) = current {
        let dict = doc.get_object(id).ok()?.as_dict().ok()?;
        if let Ok(resources) = dict.get(b"Resources") {
            return Some(resources.clone());
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

/// Returns the page's resources dictionary, creating it when missing.
fn resources_mut(doc: &mut Document, page_id: ObjectId) -> RedactorResult<&mut Dictionary> {
    let referenced = doc
        .get_object(page_id)?
        .as_dict()?
        .get(b"Resources")
        .ok()
        .map(|obj| obj.as_reference().ok());

    match referenced {
        Some(Some(id)) => Ok(doc.get_object_mut(id)?.as_dict_mut()?),
        Some(None) => Ok(doc
            .get_object_mut(page_id)?
            .as_dict_mut()?
            .get_mut(b"Resources")?
            .as_dict_mut()?),
        None => {
            let inherited = match inherited_resources(doc, page_id) {
                Some(Object::Reference(id)) => doc.get_object(id)?.clone(),
                Some(other) => other,
                None => Object::Dictionary(Dictionary::new()),
            };
            let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
            page.set("Resources", inherited);
            Ok(page.get_mut(b"Resources")?.as_dict_mut()?)
        }
    }
}

/// Adds a base-14 font under `name` to the page's `/Font` resources.
fn register_font(
    doc: &mut Document,
    page_id: ObjectId,
    name: &str,
    font_id: ObjectId,
) -> RedactorResult<()> {
    let font_dict_ref = resources_mut(doc, page_id)?
        .get(b"Font")
        .ok()
        .and_then(|obj| obj.as_reference().ok());

    let fonts = match font_dict_ref {
        Some(id) => doc.get_object_mut(id)?.as_dict_mut()?,
        None => {
            let resources = resources_mut(doc, page_id)?;
            if !resources.has(b"Font") {
                resources.set("Font", Dictionary::new());
            }
            resources.get_mut(b"Font")?.as_dict_mut()?
        }
    };
    fonts.set(name, Object::Reference(font_id));
    Ok(())
}

fn page_operations(
    paint: &PagePaint,
    bounds: (f64, f64, f64, f64),
    fill: FillColor,
) -> Vec<Operation> {
    let (llx, _, _, ury) = bounds;
    let to_pdf = |x: f64, y: f64| (llx + x, ury - y);
    let (fr, fg, fb) = fill.rgb();

    let mut ops = Vec::new();
    for op in &paint.ops {
        match op {
            PaintOp::Fill(rect) => {
                let r = rect.normalized();
                let (x, y) = to_pdf(r.x1, r.y2);
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new("rg", vec![fr.into(), fg.into(), fb.into()]));
                ops.push(Operation::new(
                    "re",
                    vec![x.into(), y.into(), r.width().into(), r.height().into()],
                ));
                ops.push(Operation::new("f", vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
            PaintOp::Text { point, text, font } => {
                let (x, y) = to_pdf(point.0, point.1);
                let (r, g, b) = font.rgb();
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![
                        Object::Name(resource_name(font.family).into_bytes()),
                        font.size_pt.into(),
                    ],
                ));
                ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
                ops.push(Operation::new("Td", vec![x.into(), y.into()]));
                ops.push(Operation::new("Tj", vec![Object::string_literal(text.as_str())]));
                ops.push(Operation::new("ET", vec![]));
            }
        }
    }
    ops
}

/// Paints queued operations into `path` in place.
pub fn paint_document(
    path: &Path,
    pages: &BTreeMap<usize, PagePaint>,
    fill: FillColor,
) -> RedactorResult<()> {
    let mut doc = Document::load(path).map_err(|e| RedactorError::PdfProcessing {
        message: format!("Failed to reopen '{}' for painting", path.display()),
        page: None,
        source: Some(Box::new(e)),
    })?;
    let page_ids = doc.get_pages();
    let mut font_ids: HashMap<FontFamily, ObjectId> = HashMap::new();

    for (page_number, paint) in pages {
        if paint.ops.is_empty() {
            continue;
        }
        let Some(&page_id) = page_ids.get(&(*page_number as u32)) else {
            warn!(page = page_number, "page vanished before painting");
            continue;
        };

        for family in paint.families() {
            let font_id = *font_ids.entry(family).or_insert_with(|| {
                doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => family.base14_name(),
                    "Encoding" => "WinAnsiEncoding",
                })
            });
            register_font(&mut doc, page_id, &resource_name(family), font_id)?;
        }

        let bounds = media_box(&doc, page_id).unwrap_or((0.0, 0.0, 0.0, paint.height));
        let overlay = Content {
            operations: page_operations(paint, bounds, fill),
        }
        .encode()?;

        let existing = doc.get_page_content(page_id)?;
        let mut content = Vec::with_capacity(existing.len() + overlay.len() + 8);
        content.extend_from_slice(b"q\n");
        content.extend_from_slice(&existing);
        content.extend_from_slice(b"\nQ\n");
        content.extend_from_slice(&overlay);
        doc.change_page_content(page_id, content)?;

        debug!(page = page_number, ops = paint.ops.len(), "painted overlay");
    }

    doc.save(path).map_err(|e| RedactorError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}
