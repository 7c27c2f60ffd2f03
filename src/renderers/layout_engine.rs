//! Layout Engine - turns tooth bands into hole positions and pages
//!
//! Ticks map linearly onto the strip, scaled so that the shortest repetition
//! interval (`mindelta`) becomes one mechanical step of the model. The strip is
//! then cut into pages no wider than the printable sheet width. Cuts go in the
//! middle of a gap wide enough that no cluster of close holes is split.

use crate::models::{InstrumentModel, ToothBands};
use crate::transcription::TranscribeError;
use super::display_list::*;
use serde::{Deserialize, Serialize};

/// Configuration for layout calculations, in millimetres
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutSettings {
    /// Sheet width; pages run along it
    pub page_width: f64,

    /// Sheet height; pages are stacked down it
    pub sheet_height: f64,

    /// Margin around and between pages
    pub border: f64,

    /// Blank strip before the first hole
    pub lead_in: f64,

    /// Blank strip after the last hole
    pub lead_out: f64,
}

impl Default for LayoutSettings {
    /// A3 landscape
    fn default() -> Self {
        Self {
            page_width: 420.0,
            sheet_height: 297.0,
            border: 10.0,
            lead_in: 20.0,
            lead_out: 20.0,
        }
    }
}

impl LayoutSettings {
    /// Width available for one page
    pub fn printable_width(&self) -> f64 {
        self.page_width - 2.0 * self.border
    }

    pub fn validate(&self) -> Result<(), TranscribeError> {
        let values = [
            ("pageWidth", self.page_width),
            ("sheetHeight", self.sheet_height),
            ("border", self.border),
            ("leadIn", self.lead_in),
            ("leadOut", self.lead_out),
        ];
        if let Some((name, value)) = values.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            return Err(TranscribeError::Configuration(format!(
                "layout {} must be a non-negative number, got {}",
                name, value
            )));
        }
        if self.printable_width() <= 0.0 {
            return Err(TranscribeError::Configuration(format!(
                "page width {} leaves no room inside a {} border",
                self.page_width, self.border
            )));
        }
        Ok(())
    }
}

/// Mapping from ticks to strip positions
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StripScale {
    pub start_tick: u64,
    /// Millimetres per tick
    pub step: f64,
    pub lead_in: f64,
}

impl StripScale {
    pub fn x(&self, tick: u64) -> f64 {
        self.lead_in + (tick - self.start_tick) as f64 * self.step
    }

    /// Position halfway between two ticks
    pub fn midpoint(&self, a: u64, b: u64) -> f64 {
        (self.x(a) + self.x(b)) / 2.0
    }
}

/// Split points for a strip of `length` holding holes at `ticks`
///
/// `ticks` must be sorted and distinct. The result starts at 0, ends at
/// `length` and is strictly increasing, so consecutive points partition the
/// strip. A break goes at the last gap wider than four hole radii; only when a
/// dense passage is longer than a whole page is it cut at the page width.
pub fn split_points(ticks: &[u64], scale: &StripScale, radius: f64, printable_width: f64, length: f64) -> Vec<f64> {
    let mut splits = vec![0.0];
    let mut page_start = 0.0;
    let mut last_safe_break = 0.0;

    for pair in ticks.windows(2) {
        let middle = scale.midpoint(pair[0], pair[1]);
        close_pages(&mut splits, &mut page_start, last_safe_break, middle, printable_width);

        if (pair[1] - pair[0]) as f64 * scale.step > radius * 4.0 {
            last_safe_break = middle;
        }
    }

    close_pages(&mut splits, &mut page_start, last_safe_break, length, printable_width);
    splits.push(length);
    splits
}

fn close_pages(splits: &mut Vec<f64>, page_start: &mut f64, last_safe_break: f64, position: f64, printable_width: f64) {
    while position - *page_start > printable_width {
        let cut = if last_safe_break > *page_start {
            last_safe_break
        } else {
            *page_start + printable_width
        };
        splits.push(cut);
        *page_start = cut;
    }
}

/// Main layout engine for computing strip layouts
pub struct LayoutEngine<'a> {
    model: &'a InstrumentModel,
    settings: &'a LayoutSettings,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(model: &'a InstrumentModel, settings: &'a LayoutSettings) -> Self {
        Self { model, settings }
    }

    /// Compute the complete layout for a set of bands
    pub fn compute_layout(&self, bands: &ToothBands, mindelta: u64) -> Result<StripLayout, TranscribeError> {
        if mindelta == 0 {
            return Err(TranscribeError::Configuration("mindelta must be at least 1 tick".to_string()));
        }

        let ticks = bands.distinct_ticks();
        let (start_tick, end_tick) = match (ticks.first(), ticks.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(TranscribeError::EmptyPerformance),
        };

        let radius = self.model.hole_radius();
        let scale = StripScale {
            start_tick,
            step: self.model.step / mindelta as f64,
            lead_in: self.settings.lead_in,
        };
        let length = (end_tick - start_tick) as f64 * scale.step
            + radius * 2.0
            + self.settings.lead_in
            + self.settings.lead_out;

        let splits = split_points(&ticks, &scale, radius, self.settings.printable_width(), length);
        log::debug!("strip length {:.1} mm, splits {:?}", length, splits);

        let mut pages = self.build_pages(&splits);
        self.place_holes(bands, &scale, &splits, &mut pages);
        let sheet_count = self.arrange_sheets(&mut pages);

        log::info!(
            "layout: {:.1} mm strip, {} holes on {} pages ({} sheets)",
            length,
            bands.hole_count(),
            pages.len(),
            sheet_count
        );

        Ok(StripLayout {
            model: self.model.name.clone(),
            length,
            strip_height: self.model.strip_height,
            hole_radius: radius,
            step: scale.step,
            start_tick,
            end_tick,
            splits,
            pages,
            guides: self.guide_lines(),
            sheet_width: self.settings.page_width,
            sheet_height: self.settings.sheet_height,
            sheet_count,
        })
    }

    fn tooth_y(&self, tooth: usize) -> f64 {
        tooth as f64 * self.model.tooth_spacing + self.model.base_offset
    }

    fn build_pages(&self, splits: &[f64]) -> Vec<Page> {
        splits
            .windows(2)
            .enumerate()
            .map(|(index, bounds)| Page {
                index,
                x0: bounds[0],
                x1: bounds[1],
                width: bounds[1] - bounds[0],
                height: self.model.strip_height,
                sheet: 0,
                origin_x: self.settings.border,
                origin_y: 0.0,
                holes: Vec::new(),
            })
            .collect()
    }

    fn place_holes(&self, bands: &ToothBands, scale: &StripScale, splits: &[f64], pages: &mut [Page]) {
        let mut holes: Vec<(f64, Hole)> = bands
            .iter()
            .flat_map(|(tooth, ticks)| {
                ticks.iter().map(move |tick| {
                    let x = scale.x(*tick);
                    (
                        x,
                        Hole {
                            tooth,
                            tick: *tick,
                            x,
                            y: self.tooth_y(tooth),
                        },
                    )
                })
            })
            .collect();
        holes.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.tooth.cmp(&b.1.tooth)));

        for (x, mut hole) in holes {
            let index = splits.partition_point(|s| *s <= x).saturating_sub(1).min(pages.len() - 1);
            hole.x = x - pages[index].x0;
            pages[index].holes.push(hole);
        }
    }

    /// Stack pages down each sheet; returns the number of sheets
    fn arrange_sheets(&self, pages: &mut [Page]) -> usize {
        let border = self.settings.border;
        let height = self.model.strip_height;
        let mut sheet = 0;
        let mut top = border;

        for (i, page) in pages.iter_mut().enumerate() {
            if i > 0 && top + height + border > self.settings.sheet_height {
                sheet += 1;
                top = border;
            }
            page.sheet = sheet;
            page.origin_y = top;
            top += height + border;
        }

        if pages.is_empty() {
            0
        } else {
            sheet + 1
        }
    }

    fn guide_lines(&self) -> Vec<GuideLine> {
        (0..self.model.tooth_count())
            .map(|tooth| {
                GuideLine {
                    tooth,
                    pitch: self.model.tooth_pitch(tooth),
                    y: self.tooth_y(tooth),
                    kind: GuideKind::for_offset(self.model.playable_offsets[tooth]),
                }
            })
            .collect()
    }
}
