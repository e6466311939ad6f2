use std::collections::HashMap;

use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot, PlotPoint, Polygon, Text};

use crate::color::{blues, categorical_palette, SeriesColors};
use crate::data::histogram::Histogram;
use crate::data::model::CellValue;
use crate::data::table::Table;
use crate::views::ChartKind;

const CHART_HEIGHT: f32 = 340.0;

/// Axis labels for integer positions, blank in between.
fn category_formatter(labels: Vec<String>) -> impl Fn(GridMark, &std::ops::RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let i = mark.value.round();
        if (mark.value - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        labels.get(i as usize).cloned().unwrap_or_default()
    }
}

/// Draw a recipe result the way its view asks for.
pub fn chart(ui: &mut Ui, id: &str, kind: &ChartKind, table: &Table) {
    if table.is_empty() {
        ui.label("No rows to chart.");
        return;
    }
    match kind {
        ChartKind::Bar { x, y, color } => bar_chart(ui, id, table, x, y, color.as_deref()),
        ChartKind::Heatmap { x, y, z } => heatmap(ui, id, table, x, y, z),
        ChartKind::Pie { names, values } => share_chart(ui, id, table, names, values),
    }
}

// ---------------------------------------------------------------------------
// Bars
// ---------------------------------------------------------------------------

fn bar_chart(ui: &mut Ui, id: &str, table: &Table, x: &str, y: &str, color: Option<&str>) {
    let (Some(xi), Some(yi)) = (table.column_index(x), table.column_index(y)) else {
        ui.label(format!("Chart columns {x}/{y} not in result."));
        return;
    };
    let ci = color.and_then(|c| table.column_index(c));

    let labels: Vec<String> = table.rows().iter().map(|r| r[xi].to_string()).collect();

    // One BarChart per colour value so each gets a legend entry.
    let mut series: Vec<(String, Color32, Vec<Bar>)> = Vec::new();
    let colors = ci.map(|ci| SeriesColors::new(table.column_cells(ci)));
    let mut series_index: HashMap<String, usize> = HashMap::new();

    for (pos, row) in table.rows().iter().enumerate() {
        let value = row[yi].as_f64().unwrap_or(0.0);
        let (name, fill) = match (ci, &colors) {
            (Some(ci), Some(colors)) => (row[ci].to_string(), colors.color_for(&row[ci])),
            _ => (y.to_string(), Color32::from_rgb(99, 110, 250)),
        };
        let bar = Bar::new(pos as f64, value)
            .name(format!("{}: {}", labels[pos], format_number(value)))
            .fill(fill)
            .width(0.7);
        let idx = *series_index.entry(name.clone()).or_insert_with(|| {
            series.push((name, fill, Vec::new()));
            series.len() - 1
        });
        series[idx].2.push(bar);
    }

    Plot::new(id)
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label(x)
        .y_axis_label(y)
        .x_axis_formatter(category_formatter(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (name, fill, bars) in series {
                plot_ui.bar_chart(BarChart::new(bars).name(name).color(fill));
            }
        });
}

/// Pie-style distribution: each value's share of the total, as horizontal
/// bars labelled with percentages.
fn share_chart(ui: &mut Ui, id: &str, table: &Table, names: &str, values: &str) {
    let (Some(ni), Some(vi)) = (table.column_index(names), table.column_index(values)) else {
        ui.label(format!("Chart columns {names}/{values} not in result."));
        return;
    };
    let total: f64 = table.rows().iter().filter_map(|r| r[vi].as_f64()).sum();
    let palette = categorical_palette(table.row_count());

    let mut labels = Vec::with_capacity(table.row_count());
    let bars: Vec<Bar> = table
        .rows()
        .iter()
        .enumerate()
        .map(|(pos, row)| {
            let count = row[vi].as_f64().unwrap_or(0.0);
            let pct = if total > 0.0 { count / total * 100.0 } else { 0.0 };
            let label = format!("{} ({pct:.1}%)", row[ni]);
            labels.push(label.clone());
            Bar::new(pos as f64, pct)
                .name(format!("{label}: {}", format_number(count)))
                .fill(palette[pos])
                .width(0.7)
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label("% of sales")
        .y_axis_formatter(category_formatter(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().name(names));
        });
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

fn heatmap(ui: &mut Ui, id: &str, table: &Table, x: &str, y: &str, z: &str) {
    let (Some(xi), Some(yi), Some(zi)) = (
        table.column_index(x),
        table.column_index(y),
        table.column_index(z),
    ) else {
        ui.label(format!("Chart columns {x}/{y}/{z} not in result."));
        return;
    };

    let x_labels = sorted_labels(table.column_cells(xi));
    let y_labels = sorted_labels(table.column_cells(yi));
    let x_pos: HashMap<&str, usize> = x_labels.iter().enumerate().map(|(i, l)| (l.as_str(), i)).collect();
    let y_pos: HashMap<&str, usize> = y_labels.iter().enumerate().map(|(i, l)| (l.as_str(), i)).collect();

    let max = table
        .column_cells(zi)
        .filter_map(CellValue::as_f64)
        .fold(0.0_f64, f64::max);

    let cells: Vec<(f64, f64, f64)> = table
        .rows()
        .iter()
        .filter_map(|row| {
            let cx = *x_pos.get(row[xi].to_string().as_str())?;
            let cy = *y_pos.get(row[yi].to_string().as_str())?;
            Some((cx as f64, cy as f64, row[zi].as_f64().unwrap_or(0.0)))
        })
        .collect();
    let annotate = cells.len() <= 400;

    Plot::new(id)
        .height(CHART_HEIGHT + 80.0)
        .x_axis_label(x)
        .y_axis_label(y)
        .x_axis_formatter(category_formatter(x_labels.clone()))
        .y_axis_formatter(category_formatter(y_labels.clone()))
        .show_grid(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for &(cx, cy, value) in &cells {
                let t = if max > 0.0 { (value / max) as f32 } else { 0.0 };
                let rect = vec![
                    [cx - 0.5, cy - 0.5],
                    [cx + 0.5, cy - 0.5],
                    [cx + 0.5, cy + 0.5],
                    [cx - 0.5, cy + 0.5],
                ];
                plot_ui.polygon(
                    Polygon::new(rect)
                        .fill_color(blues(t))
                        .stroke(Stroke::new(0.5, Color32::WHITE)),
                );
                if annotate {
                    let ink = if t > 0.5 { Color32::WHITE } else { Color32::BLACK };
                    plot_ui.text(
                        Text::new(PlotPoint::new(cx, cy), format_number(value)).color(ink),
                    );
                }
            }
        });
}

fn sorted_labels<'a>(cells: impl Iterator<Item = &'a CellValue>) -> Vec<String> {
    let set: std::collections::BTreeSet<&CellValue> = cells.filter(|c| !c.is_missing()).collect();
    set.into_iter().map(|c| c.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

pub fn histogram_chart(ui: &mut Ui, hist: &Histogram) {
    if hist.bars.is_empty() {
        ui.label("Column has no values.");
        return;
    }
    let labels: Vec<String> = hist.bars.iter().map(|b| b.label.clone()).collect();
    let bars: Vec<Bar> = hist
        .bars
        .iter()
        .enumerate()
        .map(|(pos, b)| {
            Bar::new(pos as f64, b.count as f64)
                .name(format!("{}: {}", b.label, b.count))
                .width(0.95)
        })
        .collect();

    Plot::new(format!("histogram_{}", hist.column))
        .height(CHART_HEIGHT + 60.0)
        .x_axis_label(hist.column.as_str())
        .y_axis_label("count")
        .x_axis_formatter(category_formatter(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name(hist.column.as_str())
                    .color(Color32::from_rgb(99, 110, 250)),
            );
        });
}

/// `12345.6` → `"12,346"`.
pub fn format_number(v: f64) -> String {
    if !v.is_finite() {
        return "–".to_string();
    }
    let rounded = v.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0 {
        out.insert(0, '-');
    }
    out
}
