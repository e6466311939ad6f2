use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;
use crate::views::Page;

// ---------------------------------------------------------------------------
// Left side panel – navigation and explorer filters
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("📌 Navigation");
    ui.separator();

    for page in Page::ALL {
        ui.radio_value(&mut state.page, page, page.title());
    }

    if state.page != Page::Explorer || state.dataset.is_none() {
        return;
    }

    ui.add_space(8.0);
    ui.heading("🔎 Table Filters");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| explorer_filters(ui, state));
}

fn explorer_filters(ui: &mut Ui, state: &mut AppState) {
    // Clone what we need so we can mutate state inside the loop.
    let controls = state.controls.clone();

    // ---- Multi-selects (collapsible) ----
    for control in &controls.memberships {
        let n_selected = state
            .selections
            .memberships
            .get(&control.column)
            .map_or(0, |s| s.len());
        let header_text = format!(
            "{}  ({n_selected}/{})",
            control.label,
            control.options.len()
        );

        egui::CollapsingHeader::new(RichText::new(header_text).strong())
            .id_salt(&control.column)
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                if ui.small_button("Clear").clicked() {
                    state.clear_filter(&control.column);
                }
                for value in &control.options {
                    let mut checked = state
                        .selections
                        .memberships
                        .get(&control.column)
                        .is_some_and(|s| s.contains(value));
                    if ui.checkbox(&mut checked, value.to_string()).changed() {
                        state.toggle_filter_value(&control.column, value);
                    }
                }
            });
    }

    // ---- Price range ----
    if let Some(range) = &controls.range {
        ui.add_space(6.0);
        ui.strong("Price Range");
        let (mut low, mut high) = state.selections.price.unwrap_or((range.min, range.max));
        let low_changed = ui
            .add(
                egui::Slider::new(&mut low, range.min..=range.max)
                    .step_by(1.0)
                    .text("min"),
            )
            .changed();
        let high_changed = ui
            .add(
                egui::Slider::new(&mut high, range.min..=range.max)
                    .step_by(1.0)
                    .text("max"),
            )
            .changed();
        if low_changed || high_changed {
            state.set_price_range(low, high);
        }
    }

    // ---- Free-text search ----
    if !state.config.search_enabled {
        return;
    }
    ui.add_space(6.0);
    let mut search = state.selections.search.clone();
    let response = ui.add(
        egui::TextEdit::singleline(&mut search).hint_text("Search (any text in row)"),
    );
    if response.changed() {
        state.set_search(search);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.dataset.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export filtered view…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.strong("🚗 Car Sales Exploratory Data Analysis");

        if let (Some(ds), Some(path)) = (&state.dataset, &state.source) {
            ui.separator();
            ui.label(format!(
                "{} — {} rows, {} columns",
                path.display(),
                ds.row_count(),
                ds.column_count()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::LIGHT_GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open used-car sales data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        // Errors are logged and put in the status line by `load_path`.
        let _ = state.load_path(&path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Download filtered data as CSV")
        .set_file_name(state.config.export_file_name.as_str())
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        let _ = state.export_view(&path);
    }
}
