//! SVG rendering of a strip layout
//!
//! Sheets are drawn one below the other in a single document, in millimetres.
//! Tooth 0 sits at the bottom edge of every page, as on the punched card.

use crate::renderers::display_list::{GuideKind, Page, StripLayout};
use crate::transcription::TranscribeError;
use serde::Serialize;

const STRIP_TEMPLATE: &str = include_str!("templates/strip.svg.mustache");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SvgContext {
    title: String,
    width: String,
    height: String,
    sheets: Vec<SvgSheet>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SvgSheet {
    index: usize,
    offset: String,
    sheet_width: String,
    sheet_height: String,
    pages: Vec<SvgPage>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SvgPage {
    index: usize,
    x: String,
    y: String,
    width: String,
    height: String,
    guides: Vec<SvgGuide>,
    holes: Vec<SvgHole>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SvgGuide {
    y: String,
    x2: String,
    stroke_width: String,
    dashed: bool,
}

#[derive(Debug, Clone, Serialize)]
struct SvgHole {
    cx: String,
    cy: String,
    r: String,
}

/// Format a length for SVG attributes
fn mm(value: f64) -> String {
    let text = format!("{:.3}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn guide_stroke(kind: GuideKind) -> (&'static str, bool) {
    match kind {
        GuideKind::Tonic => ("0.4", false),
        GuideKind::Diatonic => ("0.2", false),
        GuideKind::Chromatic => ("0.2", true),
    }
}

fn page_context(layout: &StripLayout, page: &Page) -> SvgPage {
    let flip = |y: f64| mm(page.height - y);

    SvgPage {
        index: page.index,
        x: mm(page.origin_x),
        y: mm(page.origin_y),
        width: mm(page.width),
        height: mm(page.height),
        guides: layout
            .guides
            .iter()
            .map(|guide| {
                let (stroke_width, dashed) = guide_stroke(guide.kind);
                SvgGuide {
                    y: flip(guide.y),
                    x2: mm(page.width),
                    stroke_width: stroke_width.to_string(),
                    dashed,
                }
            })
            .collect(),
        holes: page
            .holes
            .iter()
            .map(|hole| SvgHole {
                cx: mm(hole.x),
                cy: flip(hole.y),
                r: mm(layout.hole_radius),
            })
            .collect(),
    }
}

fn build_context(layout: &StripLayout, title: &str) -> SvgContext {
    let sheets = (0..layout.sheet_count)
        .map(|index| SvgSheet {
            index,
            offset: mm(index as f64 * layout.sheet_height),
            sheet_width: mm(layout.sheet_width),
            sheet_height: mm(layout.sheet_height),
            pages: layout
                .pages
                .iter()
                .filter(|p| p.sheet == index)
                .map(|p| page_context(layout, p))
                .collect(),
        })
        .collect();

    SvgContext {
        title: title.to_string(),
        width: mm(layout.sheet_width),
        height: mm(layout.sheet_count as f64 * layout.sheet_height),
        sheets,
    }
}

/// Render the layout as one SVG document
pub fn render_svg(layout: &StripLayout) -> Result<String, TranscribeError> {
    let title = format!("{} strip", layout.model);
    let context = build_context(layout, &title);

    let template = mustache::compile_str(STRIP_TEMPLATE)
        .map_err(|e| TranscribeError::Template(e.to_string()))?;
    let svg = template
        .render_to_string(&context)
        .map_err(|e| TranscribeError::Template(e.to_string()))?;

    log::debug!("rendered {} sheets to {} bytes of SVG", layout.sheet_count, svg.len());
    Ok(svg)
}
