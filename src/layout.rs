//! Pixel to millimetre conversions for print output.
//!
//! Template layouts are authored in CSS pixels. A4 is 210mm wide and an A4
//! page at 96 DPI is 794px wide, which gives the fixed 0.264 ratio below.

use serde::Serialize;

use crate::config::LayoutSettings;

/// Millimetres per CSS pixel.
pub const MM_PER_PX: f64 = 0.264;

/// Line height multiplier used by the templates' body text.
pub const LINE_HEIGHT: f64 = 1.4;

/// Convert a pixel measurement to millimetres.
pub fn px_to_mm(px: f64) -> f64 {
    px * MM_PER_PX
}

/// Distance between baselines for text set at `font_size_px`.
pub fn line_spacing_mm(font_size_px: f64) -> f64 {
    font_size_px * LINE_HEIGHT * MM_PER_PX
}

/// Page geometry in millimetres, ready for the PDF stage.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageLayout {
    pub margin_mm: f64,
    pub header_height_mm: f64,
    pub spacing_mm: f64,
    pub font_size_pt: f64,
    pub line_spacing_mm: f64,
}

impl PageLayout {
    pub fn from_settings(settings: &LayoutSettings) -> Self {
        Self {
            margin_mm: px_to_mm(settings.padding_px),
            header_height_mm: px_to_mm(settings.header_height_px),
            spacing_mm: px_to_mm(settings.content_spacing_px),
            // 1px = 0.75pt
            font_size_pt: settings.font_size_px * 0.75,
            line_spacing_mm: line_spacing_mm(settings.font_size_px),
        }
    }
}
