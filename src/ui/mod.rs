//! egui rendering. Reads [`crate::state::AppState`] and forwards widget
//! changes back through its setters; no data logic lives here.

pub mod pages;
pub mod panels;
pub mod plot;
