use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::CellValue;

fn hsl_to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// `n` visually distinct colours using evenly spaced hues.
pub fn categorical_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| hsl_to_color32(Hsl::new((i as f32 / n as f32) * 360.0, 0.75, 0.55)))
        .collect()
}

/// Sequential blue scale for heatmap cells; `t` in `[0, 1]`, darker is more.
pub fn blues(t: f32) -> Color32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    hsl_to_color32(Hsl::new(210.0, 0.75, 0.95 - 0.65 * t))
}

// ---------------------------------------------------------------------------
// Series colours: cell value → Color32
// ---------------------------------------------------------------------------

/// Assigns each distinct value of a chart's colour column its own hue.
#[derive(Debug, Clone)]
pub struct SeriesColors {
    mapping: BTreeMap<CellValue, Color32>,
}

impl SeriesColors {
    pub fn new<'a>(values: impl IntoIterator<Item = &'a CellValue>) -> Self {
        let distinct: Vec<&CellValue> = values
            .into_iter()
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        let mapping = distinct
            .iter()
            .zip(categorical_palette(distinct.len()))
            .map(|(v, c)| ((*v).clone(), c))
            .collect();
        SeriesColors { mapping }
    }

    pub fn color_for(&self, value: &CellValue) -> Color32 {
        self.mapping.get(value).copied().unwrap_or(Color32::GRAY)
    }
}
