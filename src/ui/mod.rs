//! UI components for mdremix
//!
//! This module contains the egui widgets the application window is built from.

mod editor_pane;
mod outline_panel;
mod preview_pane;

pub use editor_pane::{show_editor, EditorPaneOutput};
pub use outline_panel::OutlinePanel;
pub use preview_pane::show_blocks;

use crate::navigation::Rect;

/// Convert an egui rectangle into the engine's geometry type.
pub fn to_nav_rect(rect: egui::Rect) -> Rect {
    Rect::new(rect.min.y, rect.min.x, rect.width(), rect.height())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_nav_rect() {
        let rect = egui::Rect::from_min_size(egui::pos2(10.0, 40.0), egui::vec2(200.0, 30.0));
        assert_eq!(to_nav_rect(rect), Rect::new(40.0, 10.0, 200.0, 30.0));
    }
}
