//! mdremix - heading navigation for a dual-pane Markdown editor
//!
//! The crate is split into a GUI-free engine and the egui host around it:
//!
//! - [`outline`] parses headings and assigns stable IDs
//! - [`navigation`] tracks the active heading and scrolls panes to headings
//! - [`preview`] flattens the Markdown AST into drawable blocks
//! - [`config`] loads and saves user settings
//! - [`app`] and [`ui`] wire everything into an eframe window

pub mod app;
pub mod config;
pub mod error;
pub mod navigation;
pub mod outline;
pub mod preview;
pub mod ui;
