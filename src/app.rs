use eframe::egui;

use crate::state::AppState;
use crate::ui::{pages, panels};
use crate::views::Page;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CarSalesApp {
    pub state: AppState,
}

impl CarSalesApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for CarSalesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation + explorer filters ----
        egui::SidePanel::left("nav_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: current page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset.is_none() {
                pages::no_dataset(ui, &self.state);
                return;
            }
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.state.page {
                    Page::Overview => pages::overview(ui, &self.state),
                    Page::Univariate => pages::univariate(ui, &mut self.state),
                    Page::Bivariate => pages::bivariate(ui, &self.state),
                    Page::Explorer => pages::explorer(ui, &mut self.state),
                });
        });
    }
}
