//! Display list for strip rendering
//!
//! This module defines the output structure returned from the layout engine.
//! It carries every position a renderer needs; renderers do no layout
//! calculations of their own. All lengths are millimetres.

use serde::{Deserialize, Serialize};

/// Complete layout of one punched strip
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StripLayout {
    /// Instrument model the strip is punched for
    pub model: String,

    /// Total strip length including lead-in and lead-out
    pub length: f64,

    /// Strip height (distance across the strip)
    pub strip_height: f64,

    pub hole_radius: f64,

    /// Strip advance per tick
    pub step: f64,

    /// First and last punched tick
    pub start_tick: u64,
    pub end_tick: u64,

    /// Page boundaries along the strip, from 0 to `length`
    pub splits: Vec<f64>,

    pub pages: Vec<Page>,

    /// One guide row per tooth, shared by every page
    pub guides: Vec<GuideLine>,

    /// Sheet size the pages are arranged on
    pub sheet_width: f64,
    pub sheet_height: f64,
    pub sheet_count: usize,
}

impl StripLayout {
    pub fn hole_count(&self) -> usize {
        self.pages.iter().map(|p| p.holes.len()).sum()
    }
}

/// One printable piece of the strip covering `[x0, x1)`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub index: usize,

    /// Start and end along the strip
    pub x0: f64,
    pub x1: f64,

    pub width: f64,
    pub height: f64,

    /// Sheet this page is printed on
    pub sheet: usize,

    /// Top-left corner of the page on its sheet
    pub origin_x: f64,
    pub origin_y: f64,

    /// Holes inside this page, x relative to `x0`
    pub holes: Vec<Hole>,
}

/// A punch position
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hole {
    pub tooth: usize,
    pub tick: u64,

    /// Position along the page
    pub x: f64,

    /// Position across the strip, measured from the tooth 0 edge
    pub y: f64,
}

/// Guide row styling, by the tooth's interval above the lowest tooth
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum GuideKind {
    /// Octaves of the comb's lowest note, drawn heavier
    Tonic,
    /// Other degrees of the comb's major scale
    Diatonic,
    /// Notes outside that scale, drawn dashed
    Chromatic,
}

impl GuideKind {
    /// Classify a tooth by its offset in semitones from the comb's lowest note
    pub fn for_offset(offset: u8) -> Self {
        match offset % 12 {
            0 => GuideKind::Tonic,
            2 | 4 | 5 | 7 | 9 | 11 => GuideKind::Diatonic,
            _ => GuideKind::Chromatic,
        }
    }
}

/// A guide row across every page
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GuideLine {
    pub tooth: usize,
    pub pitch: u8,
    pub y: f64,
    pub kind: GuideKind,
}
