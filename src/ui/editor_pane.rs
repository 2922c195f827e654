//! Plain-text editor pane
//!
//! A multiline `TextEdit` inside a vertical `ScrollArea`. The pane applies
//! scroll offsets and caret moves requested through its [`EditorSurface`],
//! paints the navigation line highlight, and reports its geometry back so
//! the engine sees the real scroll state on the next frame.

use super::to_nav_rect;
use crate::navigation::{EditorSurface, LayoutMap, LineHighlight, Rect, ScrollSurface};
use crate::outline::{line_char_offset, HeadingIndex};
use eframe::egui::{self, text::CCursor, text::CCursorRange, FontId, ScrollArea, TextEdit, Ui};
use std::time::Instant;

/// Output of one editor frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditorPaneOutput {
    /// The text was edited this frame
    pub changed: bool,
    /// The scroll offset differs from the previous frame
    pub scrolled: bool,
}

/// Draw the editor pane.
///
/// Heading lines are recorded into `layout` so the scroll spy can run
/// against the editor when the preview is hidden.
#[allow(clippy::too_many_arguments)]
pub fn show_editor(
    ui: &mut Ui,
    text: &mut String,
    index: &HeadingIndex,
    surface: &mut EditorSurface,
    layout: &mut LayoutMap,
    highlight: Option<LineHighlight>,
    font_size: f32,
    now: Instant,
) -> EditorPaneOutput {
    let font_id = FontId::monospace(font_size);
    let line_height = ui.fonts(|f| f.row_height(&font_id));
    surface.set_line_height(line_height);

    let editor_id = egui::Id::new("mdremix_editor_text");
    let caret = surface.take_caret();
    let previous_offset = surface.pane().scroll_offset();

    let mut scroll_area = ScrollArea::vertical()
        .id_source("editor_scroll")
        .auto_shrink([false, false]);
    if let Some(offset) = surface.pane_mut().frame_offset(now) {
        scroll_area = scroll_area.vertical_scroll_offset(offset);
    }

    let scroll_output = scroll_area.show(ui, |ui| {
        let mut output = TextEdit::multiline(text)
            .id(editor_id)
            .font(font_id)
            .lock_focus(true)
            .desired_width(f32::INFINITY)
            .show(ui);

        let galley_pos = output.galley_pos;
        let galley_width = output.galley.size().x;

        for item in index.items() {
            let pos = output.galley.pos_from_ccursor(CCursor::new(item.char_offset));
            layout.record(
                item.id.clone(),
                Rect::new(
                    galley_pos.y + pos.min.y,
                    galley_pos.x,
                    galley_width.max(1.0),
                    pos.height().max(line_height),
                ),
            );
        }

        if let Some(row) = highlight.and_then(|h| line_char_offset(text.as_str(), h.line)) {
            let pos = output.galley.pos_from_ccursor(CCursor::new(row));
            let rect = egui::Rect::from_min_size(
                egui::pos2(ui.max_rect().min.x, galley_pos.y + pos.min.y),
                egui::vec2(ui.max_rect().width(), pos.height().max(line_height)),
            );
            ui.painter().rect_filled(
                rect,
                2.0,
                egui::Color32::from_rgba_unmultiplied(255, 210, 0, 60),
            );
        }

        if let Some(char_offset) = caret {
            output
                .state
                .cursor
                .set_char_range(Some(CCursorRange::one(CCursor::new(char_offset))));
            output.state.store(ui.ctx(), editor_id);
            output.response.request_focus();
        }

        output.response.changed()
    });

    let offset = scroll_output.state.offset.y;
    surface.pane_mut().sync(
        offset,
        to_nav_rect(scroll_output.inner_rect),
        scroll_output.content_size.y,
    );

    EditorPaneOutput {
        changed: scroll_output.inner,
        scrolled: (offset - previous_offset).abs() > f32::EPSILON,
    }
}
