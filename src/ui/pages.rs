use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::histogram::histogram;
use crate::data::model::ColumnKind;
use crate::data::table::Table;
use crate::state::AppState;
use crate::ui::plot::{self, format_number};
use crate::views::ViewOutcome;

const ROW_HEIGHT: f32 = 18.0;

/// Shown instead of every page until a dataset has loaded.
pub fn no_dataset(ui: &mut Ui, state: &AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(80.0);
        ui.heading("No dataset loaded");
        ui.label(format!(
            "Tried {}. Use File → Open… to pick a CSV, JSON or Parquet file.",
            state.config.data_path.display()
        ));
        if let Some(msg) = &state.status_message {
            ui.add_space(8.0);
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).small().weak());
        ui.label(RichText::new(value).size(22.0).strong());
    });
    ui.add_space(24.0);
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

pub fn overview(ui: &mut Ui, state: &AppState) {
    let Some(table) = state.dataset.as_deref() else {
        return;
    };

    ui.horizontal(|ui: &mut Ui| {
        metric(ui, "Rows", format_number(table.row_count() as f64));
        metric(ui, "Columns", format_number(table.column_count() as f64));
        metric(
            ui,
            "Missing cells",
            format_number(table.missing_cell_count() as f64),
        );
    });

    ui.add_space(8.0);
    ui.heading("Preview");
    data_table(ui, "preview", &table.head(state.config.preview_rows), state.config.preview_rows);

    ui.add_space(8.0);
    ui.heading("Describe (Categorical)");
    let categorical = table.describe(ColumnKind::Categorical);
    data_table(ui, "describe_categorical", &categorical, categorical.row_count());

    ui.add_space(8.0);
    ui.heading("Describe (Numeric)");
    let numeric = table.describe(ColumnKind::Numeric);
    data_table(ui, "describe_numeric", &numeric, numeric.row_count());
}

// ---------------------------------------------------------------------------
// Univariate
// ---------------------------------------------------------------------------

pub fn univariate(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = state.dataset.clone() else {
        return;
    };
    ui.heading("Visuals (Histograms)");

    let columns = state.histogram_columns();
    let selected_text = state.histogram_column.clone().unwrap_or_default();
    egui::ComboBox::from_label("Choose a column to view histogram")
        .selected_text(selected_text)
        .show_ui(ui, |ui: &mut Ui| {
            for column in &columns {
                ui.selectable_value(&mut state.histogram_column, Some(column.clone()), column);
            }
        });

    let Some(column) = &state.histogram_column else {
        return;
    };
    match histogram(&table, column, state.config.histogram_bins) {
        Ok(hist) => {
            ui.label(format!("{} ({}, {} values)", hist.column, hist.kind, hist.total()));
            plot::histogram_chart(ui, &hist);
        }
        Err(e) => {
            ui.label(RichText::new(format!("⚠ {e}")).color(Color32::YELLOW));
        }
    }
}

// ---------------------------------------------------------------------------
// Bivariate
// ---------------------------------------------------------------------------

pub fn bivariate(ui: &mut Ui, state: &AppState) {
    let Some(table) = state.dataset.as_deref() else {
        return;
    };

    for (view, outcome) in state.registry.evaluate(table) {
        ui.heading(view.title);
        match &outcome {
            ViewOutcome::Ready(result) => plot::chart(ui, view.key, &view.chart, result),
            ViewOutcome::Missing(missing) => {
                ui.label(
                    RichText::new(format!("⚠ Required columns not found: {}", missing.columns.join(", ")))
                        .color(Color32::YELLOW),
                );
            }
        }
        if let Some(caption) = view.caption {
            ui.label(RichText::new(caption).small().weak());
        }
        ui.separator();
    }
}

// ---------------------------------------------------------------------------
// Explorer
// ---------------------------------------------------------------------------

pub fn explorer(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🧾 Data Explorer (Filters & Table)");

    let filtered = match &state.filtered {
        Ok(table) => table,
        Err(e) => {
            ui.label(RichText::new(format!("⚠ {e}")).color(Color32::YELLOW));
            return;
        }
    };

    ui.add_space(4.0);
    ui.strong("📌 Results");
    let average_price = filtered.mean(&state.config.price_column).ok();
    let all_columns = filtered.columns().to_vec();
    ui.horizontal(|ui: &mut Ui| {
        metric(ui, "Filtered Rows", format_number(filtered.row_count() as f64));
        metric(ui, "Filtered Columns", format_number(filtered.column_count() as f64));
        if let Some(mean) = average_price {
            let shown = mean.map_or_else(|| "–".to_string(), format_number);
            metric(ui, "Avg Price (Filtered)", shown);
        }
    });

    ui.add_space(8.0);
    ui.strong("🧱 Table View");
    column_chooser(ui, state, &all_columns);

    let rows = state.config.display_rows;
    ui.add(
        egui::Slider::new(&mut state.max_rows, rows.min..=rows.max)
            .step_by(rows.step as f64)
            .text("Rows to display"),
    );

    match state.explorer_view() {
        Ok(view) => {
            data_table(ui, "explorer_table", &view, state.max_rows);
            ui.add_space(6.0);
            if ui.button("⬇️ Download filtered data as CSV").clicked() {
                crate::ui::panels::save_file_dialog(state);
            }
        }
        Err(e) => {
            ui.label(RichText::new(format!("⚠ {e}")).color(Color32::YELLOW));
        }
    }
}

fn column_chooser(ui: &mut Ui, state: &mut AppState, all_columns: &[String]) {
    // An empty choice means every column.
    let mut chosen: Vec<String> = if state.display_columns.is_empty() {
        all_columns.to_vec()
    } else {
        state.display_columns.clone()
    };
    let mut changed = false;

    egui::CollapsingHeader::new(format!(
        "Choose columns to display ({}/{})",
        chosen.len(),
        all_columns.len()
    ))
    .id_salt("explorer_columns")
    .show(ui, |ui: &mut Ui| {
        ui.horizontal_wrapped(|ui: &mut Ui| {
            for column in all_columns {
                let mut on = chosen.contains(column);
                if ui.checkbox(&mut on, column).changed() {
                    changed = true;
                    if on {
                        chosen.push(column.clone());
                    } else {
                        chosen.retain(|c| c != column);
                    }
                }
            }
        });
    });

    if changed {
        // Keep source column order.
        let ordered = all_columns
            .iter()
            .filter(|c| chosen.contains(c))
            .cloned()
            .collect();
        state.set_display_columns(ordered);
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Render the first `max_rows` rows of `table` with a sticky header.
pub fn data_table(ui: &mut Ui, id: &str, table: &Table, max_rows: usize) {
    if table.column_count() == 0 {
        ui.label("No columns.");
        return;
    }
    let shown = table.row_count().min(max_rows);

    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(360.0)
            .columns(Column::auto().at_least(70.0).clip(true), table.column_count())
            .header(ROW_HEIGHT + 4.0, |mut header| {
                for name in table.columns() {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, shown, |mut row| {
                    let cells = &table.rows()[row.index()];
                    for cell in cells {
                        row.col(|ui: &mut Ui| {
                            if cell.is_missing() {
                                ui.label(RichText::new(cell.to_string()).weak());
                            } else {
                                ui.label(cell.to_string());
                            }
                        });
                    }
                });
            });
    });

    if table.row_count() > shown {
        ui.label(
            RichText::new(format!("Showing {shown} of {} rows", table.row_count()))
                .small()
                .weak(),
        );
    }
}
