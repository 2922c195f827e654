//! Document Outline Panel Component
//!
//! This module implements a side panel that lists the document headings
//! (H1-H6). The entry for the heading the reader is currently in is
//! highlighted, and clicking an entry requests navigation to it.

use crate::config::OutlinePanelSide;
use crate::outline::{HeadingIndex, HeadingItem};
use eframe::egui::{self, Color32, Response, RichText, ScrollArea, Sense, Ui, Vec2};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Minimum width for the outline panel.
const MIN_PANEL_WIDTH: f32 = 120.0;

/// Maximum width for the outline panel.
const MAX_PANEL_WIDTH: f32 = 500.0;

/// Indentation per heading level.
const INDENT_PER_LEVEL: f32 = 14.0;

/// Height of each outline item.
const ITEM_HEIGHT: f32 = 24.0;

// ─────────────────────────────────────────────────────────────────────────────
// OutlinePanelOutput
// ─────────────────────────────────────────────────────────────────────────────

/// Output from the outline panel indicating user actions.
#[derive(Debug, Clone, Default)]
pub struct OutlinePanelOutput {
    /// Heading ID to navigate to, if an entry was clicked
    pub navigate_to: Option<String>,
    /// Whether the close button was clicked
    pub close_requested: bool,
    /// New panel width if resized
    pub new_width: Option<f32>,
}

// ─────────────────────────────────────────────────────────────────────────────
// OutlinePanel
// ─────────────────────────────────────────────────────────────────────────────

/// The document outline panel widget.
#[derive(Debug, Clone)]
pub struct OutlinePanel {
    /// Current panel width
    width: f32,
    /// Which side the panel is on
    side: OutlinePanelSide,
}

impl Default for OutlinePanel {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlinePanel {
    /// Create a new outline panel.
    pub fn new() -> Self {
        Self {
            width: 220.0,
            side: OutlinePanelSide::Left,
        }
    }

    /// Set the panel width.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width.clamp(MIN_PANEL_WIDTH, MAX_PANEL_WIDTH);
        self
    }

    /// Set which side the panel is on.
    pub fn with_side(mut self, side: OutlinePanelSide) -> Self {
        self.side = side;
        self
    }

    pub fn set_side(&mut self, side: OutlinePanelSide) {
        self.side = side;
    }

    /// Render the outline panel.
    ///
    /// `is_active` decides which entry gets the highlight, normally
    /// [`ScrollSpy::is_active`](crate::navigation::ScrollSpy::is_active).
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        index: &HeadingIndex,
        is_active: impl Fn(&str) -> bool,
    ) -> OutlinePanelOutput {
        let mut output = OutlinePanelOutput::default();
        let is_dark = ctx.style().visuals.dark_mode;

        let muted_color = if is_dark {
            Color32::from_rgb(130, 130, 130)
        } else {
            Color32::from_rgb(120, 120, 120)
        };

        let panel = match self.side {
            OutlinePanelSide::Left => egui::SidePanel::left("outline_panel"),
            OutlinePanelSide::Right => egui::SidePanel::right("outline_panel"),
        };

        panel
            .resizable(true)
            .default_width(self.width)
            .min_width(MIN_PANEL_WIDTH)
            .max_width(MAX_PANEL_WIDTH)
            .show(ctx, |ui| {
                let current_width = ui.available_width();
                if (current_width - self.width).abs() > 1.0 {
                    self.width = current_width;
                    output.new_width = Some(current_width);
                }

                ui.spacing_mut().item_spacing = Vec2::new(0.0, 2.0);

                ui.horizontal(|ui| {
                    ui.label(RichText::new("Outline").strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .small_button("✕")
                            .on_hover_text("Close outline")
                            .clicked()
                        {
                            output.close_requested = true;
                        }
                    });
                });
                ui.separator();

                ScrollArea::vertical()
                    .id_source("outline_scroll")
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        if index.is_empty() {
                            ui.add_space(20.0);
                            ui.vertical_centered(|ui| {
                                ui.label(
                                    RichText::new("No headings found")
                                        .size(11.0)
                                        .color(muted_color)
                                        .italics(),
                                );
                            });
                            return;
                        }

                        for item in index.items() {
                            let active = is_active(&item.id);
                            let response = render_outline_item(ui, item, active, is_dark);
                            if response.clicked() {
                                log::debug!(
                                    "Outline: clicked heading '{}' at line {}",
                                    item.text,
                                    item.line_number
                                );
                                output.navigate_to = Some(item.id.clone());
                            }
                        }
                    });
            });

        output
    }
}

fn render_outline_item(ui: &mut Ui, item: &HeadingItem, is_active: bool, is_dark: bool) -> Response {
    let indent = item.indent_level() as f32 * INDENT_PER_LEVEL;

    let (rect, response) =
        ui.allocate_exact_size(Vec2::new(ui.available_width(), ITEM_HEIGHT), Sense::click());

    let highlight_bg = if is_dark {
        Color32::from_rgb(60, 80, 110)
    } else {
        Color32::from_rgb(220, 235, 250)
    };
    let hover_bg = if is_dark {
        Color32::from_rgb(50, 50, 55)
    } else {
        Color32::from_rgb(235, 235, 240)
    };

    if is_active {
        ui.painter()
            .rect_filled(rect, egui::Rounding::same(3.0), highlight_bg);
    } else if response.hovered() {
        ui.painter()
            .rect_filled(rect, egui::Rounding::same(3.0), hover_bg);
    }

    let level_pos = egui::pos2(rect.min.x + 8.0 + indent, rect.center().y);
    ui.painter().text(
        level_pos,
        egui::Align2::LEFT_CENTER,
        format!("H{}", item.level),
        egui::FontId::proportional(9.0),
        heading_level_color(item.level, is_dark),
    );

    let title_x = level_pos.x + 22.0;
    let title = truncate_text(&item.text, rect.max.x - title_x - 8.0, 11.0);
    let title_color = if is_active {
        ui.visuals().strong_text_color()
    } else {
        ui.visuals().text_color()
    };
    ui.painter().text(
        egui::pos2(title_x, rect.center().y),
        egui::Align2::LEFT_CENTER,
        title,
        egui::FontId::proportional(11.0),
        title_color,
    );

    response.on_hover_text(format!(
        "{}\nLine {} • Click to navigate",
        item.text,
        item.line_number + 1
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Get a color for the heading level indicator.
fn heading_level_color(level: u8, is_dark: bool) -> Color32 {
    if is_dark {
        match level {
            1 => Color32::from_rgb(130, 180, 255),
            2 => Color32::from_rgb(150, 220, 150),
            3 => Color32::from_rgb(220, 180, 120),
            _ => Color32::from_rgb(170, 170, 170),
        }
    } else {
        match level {
            1 => Color32::from_rgb(40, 100, 180),
            2 => Color32::from_rgb(50, 140, 50),
            3 => Color32::from_rgb(180, 120, 40),
            _ => Color32::from_rgb(110, 110, 110),
        }
    }
}

/// Truncate text to fit within a given width.
fn truncate_text(text: &str, max_width: f32, font_size: f32) -> String {
    // Rough per-character width estimate
    let char_width = font_size * 0.55;
    let max_chars = (max_width / char_width).max(0.0) as usize;

    if text.chars().count() <= max_chars || max_chars < 4 {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars - 1).collect();
        format!("{}…", kept)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_panel_width_clamping() {
        let panel = OutlinePanel::new().with_width(50.0);
        assert_eq!(panel.width, MIN_PANEL_WIDTH);

        let panel = OutlinePanel::new().with_width(1000.0);
        assert_eq!(panel.width, MAX_PANEL_WIDTH);
    }

    #[test]
    fn test_outline_panel_with_side() {
        let mut panel = OutlinePanel::new().with_side(OutlinePanelSide::Right);
        assert_eq!(panel.side, OutlinePanelSide::Right);

        panel.set_side(panel.side.toggle());
        assert_eq!(panel.side, OutlinePanelSide::Left);
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("Hello", 100.0, 11.0), "Hello");

        let long = "This is a very long heading that should be truncated";
        let truncated = truncate_text(long, 100.0, 11.0);
        assert!(truncated.ends_with('…'));
        assert!(truncated.chars().count() < long.chars().count());
    }

    #[test]
    fn test_truncate_multibyte_text() {
        let long = "Überschrift für die Navigation über Kapitel";
        let truncated = truncate_text(long, 60.0, 11.0);
        assert!(truncated.ends_with('…'));
    }
}
