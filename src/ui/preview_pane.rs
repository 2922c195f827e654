//! Rendered preview pane
//!
//! Draws the flattened [`PreviewBlock`] list and records the on-screen
//! rectangle of every heading so the navigation engine can locate it.

use super::to_nav_rect;
use crate::navigation::LayoutMap;
use crate::preview::PreviewBlock;
use eframe::egui::{self, Color32, RichText, Ui};

/// Heading size multipliers relative to body text, H1 through H6.
const HEADING_SCALE: [f32; 6] = [2.0, 1.6, 1.35, 1.2, 1.05, 1.0];

/// Size of a heading of `level` for body text of `font_size`.
pub fn heading_size(level: u8, font_size: f32) -> f32 {
    let index = usize::from(level.clamp(1, 6)) - 1;
    font_size * HEADING_SCALE[index]
}

/// Draw every block and record heading rects into `layout`.
pub fn show_blocks(ui: &mut Ui, blocks: &[PreviewBlock], font_size: f32, layout: &mut LayoutMap) {
    let muted = ui.visuals().weak_text_color();

    for (index, block) in blocks.iter().enumerate() {
        match block {
            PreviewBlock::Heading { level, text, id } => {
                ui.add_space(font_size * 0.6);
                let response = ui.label(
                    RichText::new(text)
                        .size(heading_size(*level, font_size))
                        .strong(),
                );
                layout.record(id.clone(), to_nav_rect(response.rect));
                if *level <= 2 {
                    ui.separator();
                }
            }
            PreviewBlock::Paragraph(text) => {
                ui.label(RichText::new(text).size(font_size));
                ui.add_space(font_size * 0.4);
            }
            PreviewBlock::CodeBlock { info, literal } => {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    if !info.is_empty() {
                        ui.label(RichText::new(info).size(font_size * 0.8).color(muted));
                    }
                    ui.label(RichText::new(literal).monospace().size(font_size * 0.9));
                });
                ui.add_space(font_size * 0.4);
            }
            PreviewBlock::ListItem {
                depth,
                number,
                checked,
                text,
            } => {
                ui.horizontal_wrapped(|ui| {
                    ui.add_space(*depth as f32 * font_size * 1.5);
                    let marker = match (checked, number) {
                        (Some(true), _) => "☑".to_string(),
                        (Some(false), _) => "☐".to_string(),
                        (None, Some(n)) => format!("{}.", n),
                        (None, None) => "•".to_string(),
                    };
                    ui.label(RichText::new(marker).size(font_size));
                    ui.label(RichText::new(text).size(font_size));
                });
            }
            PreviewBlock::Quote(text) => {
                ui.horizontal(|ui| {
                    let (rect, _) = ui.allocate_exact_size(
                        egui::vec2(3.0, font_size * 1.4),
                        egui::Sense::hover(),
                    );
                    ui.painter().rect_filled(rect, 0.0, muted);
                    ui.label(RichText::new(text).size(font_size).italics().color(muted));
                });
                ui.add_space(font_size * 0.4);
            }
            PreviewBlock::Table(rows) => {
                egui::Grid::new(("preview_table", index))
                    .striped(true)
                    .show(ui, |ui| {
                        for (row_index, row) in rows.iter().enumerate() {
                            for cell in row {
                                let text = RichText::new(cell).size(font_size);
                                ui.label(if row_index == 0 { text.strong() } else { text });
                            }
                            ui.end_row();
                        }
                    });
                ui.add_space(font_size * 0.4);
            }
            PreviewBlock::Html(html) => {
                ui.label(
                    RichText::new(html)
                        .monospace()
                        .size(font_size * 0.85)
                        .color(Color32::GRAY),
                );
            }
            PreviewBlock::Rule => {
                ui.separator();
            }
        }
    }
}
