//! Main application module for mdremix
//!
//! This module implements the eframe App trait. Each frame it lays out the
//! outline, editor and preview panes, feeds their geometry into the
//! navigation engine, and applies whatever scrolls the engine requested.

use crate::config::{save_config_silent, Settings};
use crate::navigation::{
    EditorSurface, LayoutMap, NavigationDispatcher, NavigationSurfaces, PaneSurface,
    ScrollBehavior, ScrollSpy, ScrollSurface,
};
use crate::outline::{HeadingIdCache, HeadingIndex};
use crate::preview::{build_blocks, PreviewBlock};
use crate::ui::{show_blocks, show_editor, to_nav_rect, OutlinePanel};
use eframe::egui;
use log::{debug, info};
use std::time::{Duration, Instant};

/// Document shown when no file is given on the command line.
pub const SAMPLE_DOCUMENT: &str = "# Welcome to mdremix

Scroll either pane and watch the outline follow along. Click an outline
entry to jump to that heading in the editor and the preview.

## Getting Started

Open a file by passing its path on the command line:

```text
mdremix notes.md
```

## Navigation

### Scroll Spy

The outline highlights the heading nearest the top of the preview.

### Jumping

Clicking an entry scrolls the visible panes and briefly highlights the
heading line in the editor.

## Settings

Toggle panes from the top bar. Preferences are saved when the window closes.

## Notes

- Headings inside fenced code blocks are ignored
- Duplicate headings get distinct IDs
";

/// Keyboard shortcut actions detected during input handling.
#[derive(Debug, Clone, Copy)]
enum KeyboardAction {
    /// Toggle outline panel (Ctrl+Shift+O)
    ToggleOutline,
    /// Toggle editor pane (Ctrl+Shift+E)
    ToggleEditor,
    /// Toggle preview pane (Ctrl+Shift+P)
    TogglePreview,
}

/// Which pane the scroll spy is watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpyTarget {
    Editor,
    Preview,
}

/// The main application struct.
pub struct MdRemixApp {
    settings: Settings,
    document: String,
    index: HeadingIndex,
    id_cache: HeadingIdCache,
    blocks: Vec<PreviewBlock>,

    spy: ScrollSpy,
    dispatcher: NavigationDispatcher,
    editor: EditorSurface,
    preview: PaneSurface,
    editor_layout: LayoutMap,
    preview_layout: LayoutMap,

    outline_panel: OutlinePanel,
    spy_target: Option<SpyTarget>,
}

impl MdRemixApp {
    /// Create a new application instance showing `document`.
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings, document: String) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let nav = &settings.navigation;
        let mut spy = ScrollSpy::new(nav.spy_config());
        spy.subscribe(Box::new(|id: Option<&str>| match id {
            Some(id) => debug!("Active heading: {}", id),
            None => debug!("Active heading cleared"),
        }));
        let dispatcher = NavigationDispatcher::new(nav.navigation_options())
            .with_highlight_duration(nav.highlight_duration());
        let outline_panel = OutlinePanel::new()
            .with_width(settings.outline_width)
            .with_side(settings.outline_side);

        let mut app = Self {
            document,
            index: HeadingIndex::default(),
            id_cache: HeadingIdCache::default(),
            blocks: Vec::new(),
            spy,
            dispatcher,
            editor: EditorSurface::new(settings.font_size),
            preview: PaneSurface::new("preview"),
            editor_layout: LayoutMap::new(),
            preview_layout: LayoutMap::new(),
            outline_panel,
            spy_target: None,
            settings,
        };
        app.reload_document();
        app
    }

    /// Re-derive the outline and preview after the text changed.
    fn reload_document(&mut self) {
        self.id_cache.clear();
        self.index = HeadingIndex::from_document(&self.document);
        self.blocks = build_blocks(&self.document, &self.index, &mut self.id_cache);
        debug!(
            "Document reloaded: {} headings, {} preview blocks",
            self.index.len(),
            self.blocks.len()
        );
    }

    /// Push navigation settings into the engine after they were edited.
    fn apply_navigation_settings(&mut self) {
        let nav = &self.settings.navigation;
        self.spy.set_config(nav.spy_config());
        self.dispatcher.set_options(nav.navigation_options());
        self.dispatcher
            .set_highlight_duration(nav.highlight_duration());
    }

    fn navigate_to(&mut self, id: &str) {
        let surfaces = NavigationSurfaces {
            editor: &mut self.editor,
            preview: &mut self.preview,
            locator: &self.preview_layout,
        };
        if !self
            .dispatcher
            .navigate(id, &self.index, surfaces, &mut self.spy)
        {
            debug!("Navigation to {} had no effect", id);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        let action = ctx.input(|i| {
            if !(i.modifiers.command && i.modifiers.shift) {
                return None;
            }
            if i.key_pressed(egui::Key::O) {
                Some(KeyboardAction::ToggleOutline)
            } else if i.key_pressed(egui::Key::E) {
                Some(KeyboardAction::ToggleEditor)
            } else if i.key_pressed(egui::Key::P) {
                Some(KeyboardAction::TogglePreview)
            } else {
                None
            }
        });

        match action {
            Some(KeyboardAction::ToggleOutline) => {
                self.settings.show_outline = !self.settings.show_outline
            }
            Some(KeyboardAction::ToggleEditor) => {
                self.settings.show_editor = !self.settings.show_editor;
                self.keep_a_pane(false);
            }
            Some(KeyboardAction::TogglePreview) => {
                self.settings.show_preview = !self.settings.show_preview;
                self.keep_a_pane(true);
            }
            None => {}
        }
    }

    /// Re-show one pane if both content panes ended up hidden.
    fn keep_a_pane(&mut self, prefer_editor: bool) {
        if !self.settings.show_editor && !self.settings.show_preview {
            if prefer_editor {
                self.settings.show_editor = true;
            } else {
                self.settings.show_preview = true;
            }
        }
    }

    fn update_window_state(&mut self, ctx: &egui::Context) {
        let (inner_rect, maximized) =
            ctx.input(|i| (i.viewport().inner_rect, i.viewport().maximized));
        if let Some(maximized) = maximized {
            self.settings.window_size.maximized = maximized;
        }
        if self.settings.window_size.maximized {
            return;
        }
        if let Some(rect) = inner_rect {
            self.settings.window_size.width = rect.width();
            self.settings.window_size.height = rect.height();
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Panels
    // ─────────────────────────────────────────────────────────────────────────

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let before = self.settings.navigation.clone();

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.toggle_value(&mut self.settings.show_outline, "Outline");
                if ui
                    .small_button(self.settings.outline_side.label())
                    .on_hover_text("Move the outline to the other side")
                    .clicked()
                {
                    self.settings.outline_side = self.settings.outline_side.toggle();
                    self.outline_panel.set_side(self.settings.outline_side);
                    debug!("Outline moved to {}", self.settings.outline_side.label());
                }
                if ui
                    .toggle_value(&mut self.settings.show_editor, "Editor")
                    .changed()
                {
                    self.keep_a_pane(false);
                }
                if ui
                    .toggle_value(&mut self.settings.show_preview, "Preview")
                    .changed()
                {
                    self.keep_a_pane(true);
                }
                ui.separator();

                let nav = &mut self.settings.navigation;
                ui.checkbox(&mut nav.prefer_editor, "Prefer editor");
                egui::ComboBox::from_id_source("scroll_behavior")
                    .selected_text(match nav.behavior {
                        ScrollBehavior::Smooth => "Smooth",
                        ScrollBehavior::Auto => "Instant",
                    })
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut nav.behavior, ScrollBehavior::Smooth, "Smooth");
                        ui.selectable_value(&mut nav.behavior, ScrollBehavior::Auto, "Instant");
                    });
                ui.separator();

                ui.add(
                    egui::Slider::new(
                        &mut self.settings.font_size,
                        Settings::MIN_FONT_SIZE..=Settings::MAX_FONT_SIZE,
                    )
                    .text("Font"),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let active = self
                        .spy
                        .active_id()
                        .and_then(|id| self.index.find(id))
                        .map(|item| item.text.as_str())
                        .unwrap_or("");
                    ui.label(egui::RichText::new(active).weak());
                });
            });
        });

        if self.settings.navigation != before {
            self.apply_navigation_settings();
        }
    }

    fn render_outline(&mut self, ctx: &egui::Context) {
        if !self.settings.show_outline {
            return;
        }
        let spy = &self.spy;
        let output = self
            .outline_panel
            .show(ctx, &self.index, |id| spy.is_active(id));

        if let Some(width) = output.new_width {
            self.settings.outline_width = width;
        }
        if output.close_requested {
            self.settings.show_outline = false;
        }
        if let Some(id) = output.navigate_to {
            self.navigate_to(&id);
        }
    }

    fn render_panes(&mut self, ctx: &egui::Context, now: Instant) -> bool {
        self.editor.pane_mut().set_visible(self.settings.show_editor);
        self.preview.set_visible(self.settings.show_preview);
        self.editor_layout.begin_frame();
        self.preview_layout.begin_frame();

        let mut scrolled = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            match (self.settings.show_editor, self.settings.show_preview) {
                (true, true) => {
                    ui.columns(2, |columns| {
                        scrolled |= self.render_editor(&mut columns[0], now);
                        scrolled |= self.render_preview(&mut columns[1], now);
                    });
                }
                (true, false) => scrolled |= self.render_editor(ui, now),
                _ => scrolled |= self.render_preview(ui, now),
            }
        });
        scrolled
    }

    fn render_editor(&mut self, ui: &mut egui::Ui, now: Instant) -> bool {
        let highlight = self.dispatcher.active_highlight(now);
        let output = show_editor(
            ui,
            &mut self.document,
            &self.index,
            &mut self.editor,
            &mut self.editor_layout,
            highlight,
            self.settings.font_size,
            now,
        );
        if output.changed {
            self.reload_document();
        }
        output.scrolled && self.spy_target == Some(SpyTarget::Editor)
    }

    fn render_preview(&mut self, ui: &mut egui::Ui, now: Instant) -> bool {
        let previous_offset = self.preview.scroll_offset();

        let mut scroll_area = egui::ScrollArea::vertical()
            .id_source("preview_scroll")
            .auto_shrink([false, false]);
        if let Some(offset) = self.preview.frame_offset(now) {
            scroll_area = scroll_area.vertical_scroll_offset(offset);
        }

        let blocks = &self.blocks;
        let layout = &mut self.preview_layout;
        let font_size = self.settings.font_size;
        let output = scroll_area.show(ui, |ui| {
            ui.set_width(ui.available_width());
            show_blocks(ui, blocks, font_size, layout);
        });

        let offset = output.state.offset.y;
        self.preview
            .sync(offset, to_nav_rect(output.inner_rect), output.content_size.y);

        (offset - previous_offset).abs() > f32::EPSILON
            && self.spy_target == Some(SpyTarget::Preview)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scroll Spy
    // ─────────────────────────────────────────────────────────────────────────

    /// Feed this frame's geometry to the spy.
    fn update_spy(&mut self, scrolled: bool, now: Instant) {
        let target = if self.settings.show_preview {
            SpyTarget::Preview
        } else {
            SpyTarget::Editor
        };
        if self.spy_target != Some(target) {
            debug!("Scroll spy now watching the {:?} pane", target);
            self.spy.teardown();
            self.spy_target = Some(target);
        }

        let (surface, layout): (&dyn ScrollSurface, &LayoutMap) = match target {
            SpyTarget::Preview => (&self.preview, &self.preview_layout),
            SpyTarget::Editor => (&self.editor, &self.editor_layout),
        };

        self.spy.set_headings(self.index.ids(), surface, layout);
        if scrolled {
            self.spy.on_scroll(surface, layout, now);
        } else {
            self.spy.poll(surface, layout, now);
        }
    }

    fn request_repaint_if_busy(&self, ctx: &egui::Context) {
        if self.editor.pane().is_scrolling() || self.preview.is_scrolling() {
            ctx.request_repaint();
        } else if self.spy.is_update_pending() {
            ctx.request_repaint_after(self.spy.config().throttle_delay);
        } else if self.dispatcher.has_highlight() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

impl eframe::App for MdRemixApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.update_window_state(ctx);
        self.handle_keyboard_shortcuts(ctx);

        self.render_top_bar(ctx);
        self.render_outline(ctx);
        let scrolled = self.render_panes(ctx, now);

        self.update_spy(scrolled, now);
        self.request_repaint_if_busy(ctx);
    }

    /// Called when the application is about to close.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application exiting");
        self.settings.sanitize();
        save_config_silent(&self.settings);
    }
}
