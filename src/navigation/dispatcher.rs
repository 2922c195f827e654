//! Navigation dispatcher: scroll the right pane(s) to a heading
//!
//! A navigation request (an outline click) is resolved against the current
//! pane visibility into one of four states, each with its own transition:
//!
//! | State             | Action                                           |
//! |-------------------|--------------------------------------------------|
//! | `BothVisible`     | scroll editor and preview, success if either did |
//! | `EditorOnly`      | caret + centered line scroll in the editor       |
//! | `PreviewOnly`     | offset-based element scroll in the preview       |
//! | `NeitherResolved` | attempt both anyway, failures isolated           |
//!
//! Failures never escape: the dispatcher logs them and reports `false`.

use super::geometry::{Rect, ScrollBehavior};
use super::locator::ElementLocator;
use super::spy::{ScrollSpy, DEFAULT_SPY_OFFSET};
use super::surface::{ScrollSurface, TextSurface};
use crate::error::{Error, Result};
use crate::outline::{HeadingIndex, HeadingItem};
use log::{debug, warn};
use std::time::{Duration, Instant};

/// How long the editor line highlight stays after a navigation.
pub const DEFAULT_HIGHLIGHT_DURATION: Duration = Duration::from_millis(2000);

// ─────────────────────────────────────────────────────────────────────────────
// Options and States
// ─────────────────────────────────────────────────────────────────────────────

/// Options for a navigation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationOptions {
    /// Distance to keep between the target heading and the top of the preview
    pub offset: f32,
    /// Scroll animation mode
    pub behavior: ScrollBehavior,
    /// Scroll only the editor when both panes are visible
    pub prefer_editor: bool,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            offset: DEFAULT_SPY_OFFSET,
            behavior: ScrollBehavior::Smooth,
            prefer_editor: false,
        }
    }
}

/// Which surfaces a navigation request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    BothVisible,
    EditorOnly,
    PreviewOnly,
    NeitherResolved,
}

impl SurfaceState {
    pub fn resolve(editor_visible: bool, preview_visible: bool, prefer_editor: bool) -> Self {
        match (editor_visible, preview_visible) {
            (true, true) if prefer_editor => SurfaceState::EditorOnly,
            (true, true) => SurfaceState::BothVisible,
            (true, false) => SurfaceState::EditorOnly,
            (false, true) => SurfaceState::PreviewOnly,
            (false, false) => SurfaceState::NeitherResolved,
        }
    }
}

/// A transient editor line highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineHighlight {
    /// 0-indexed source line
    pub line: usize,
    pub expires_at: Instant,
}

/// The panes a navigation may move, plus the preview's element lookup.
pub struct NavigationSurfaces<'a> {
    pub editor: &'a mut dyn TextSurface,
    pub preview: &'a mut dyn ScrollSurface,
    pub locator: &'a dyn ElementLocator,
}

// ─────────────────────────────────────────────────────────────────────────────
// Target Math
// ─────────────────────────────────────────────────────────────────────────────

/// Editor offset that centers a line in the viewport.
pub fn editor_scroll_target(line_number: usize, line_height: f32, viewport_height: f32) -> f32 {
    let line_top = line_number as f32 * line_height;
    (line_top + line_height / 2.0 - viewport_height / 2.0).max(0.0)
}

/// Preview offset that puts an element `offset` pixels below the pane top.
pub fn preview_scroll_target(element: Rect, container: Rect, scroll_top: f32, offset: f32) -> f32 {
    (element.top - container.top + scroll_top - offset).max(0.0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct NavigationDispatcher {
    options: NavigationOptions,
    highlight_duration: Duration,
    highlight: Option<LineHighlight>,
    last_state: Option<SurfaceState>,
}

impl Default for NavigationDispatcher {
    fn default() -> Self {
        Self::new(NavigationOptions::default())
    }
}

impl NavigationDispatcher {
    pub fn new(options: NavigationOptions) -> Self {
        Self {
            options,
            highlight_duration: DEFAULT_HIGHLIGHT_DURATION,
            highlight: None,
            last_state: None,
        }
    }

    pub fn with_highlight_duration(mut self, duration: Duration) -> Self {
        self.highlight_duration = duration;
        self
    }

    pub fn options(&self) -> &NavigationOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: NavigationOptions) {
        self.options = options;
    }

    pub fn set_highlight_duration(&mut self, duration: Duration) {
        self.highlight_duration = duration;
    }

    /// State chosen by the most recent navigation.
    pub fn last_state(&self) -> Option<SurfaceState> {
        self.last_state
    }

    /// Navigate to a heading. Returns true if at least one pane scrolled.
    ///
    /// On success the heading becomes the spy's active heading.
    pub fn navigate(
        &mut self,
        heading_id: &str,
        index: &HeadingIndex,
        surfaces: NavigationSurfaces<'_>,
        spy: &mut ScrollSpy,
    ) -> bool {
        let Some(heading) = index.find(heading_id) else {
            warn!(
                "{}",
                Error::HeadingNotFound {
                    id: heading_id.to_string()
                }
            );
            return false;
        };

        let state = SurfaceState::resolve(
            surfaces.editor.is_visible(),
            surfaces.preview.is_visible(),
            self.options.prefer_editor,
        );
        self.last_state = Some(state);
        debug!("Navigating to '{}' ({:?})", heading_id, state);

        let result = match state {
            SurfaceState::BothVisible => self.scroll_both_visible(heading, surfaces),
            SurfaceState::EditorOnly => self.scroll_editor_only(heading, surfaces),
            SurfaceState::PreviewOnly => self.scroll_preview_only(heading, surfaces),
            SurfaceState::NeitherResolved => self.scroll_fallback(heading, surfaces),
        };

        match result {
            Ok(()) => {
                spy.set_active_heading(heading_id);
                true
            }
            Err(err) => {
                warn!("{}", err);
                false
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    fn scroll_both_visible(
        &mut self,
        heading: &HeadingItem,
        surfaces: NavigationSurfaces<'_>,
    ) -> Result<()> {
        self.scroll_each(heading, surfaces)
    }

    fn scroll_editor_only(
        &mut self,
        heading: &HeadingItem,
        surfaces: NavigationSurfaces<'_>,
    ) -> Result<()> {
        self.scroll_editor(heading, surfaces.editor)
    }

    fn scroll_preview_only(
        &mut self,
        heading: &HeadingItem,
        surfaces: NavigationSurfaces<'_>,
    ) -> Result<()> {
        self.scroll_preview(heading, surfaces.preview, surfaces.locator)
    }

    fn scroll_fallback(
        &mut self,
        heading: &HeadingItem,
        surfaces: NavigationSurfaces<'_>,
    ) -> Result<()> {
        debug!("No pane resolved for '{}', trying both", heading.id);
        self.scroll_each(heading, surfaces)
    }

    /// Try both panes independently; succeed if either does.
    fn scroll_each(&mut self, heading: &HeadingItem, surfaces: NavigationSurfaces<'_>) -> Result<()> {
        let editor = self.scroll_editor(heading, surfaces.editor);
        let preview = self.scroll_preview(heading, surfaces.preview, surfaces.locator);

        for err in [&editor, &preview].into_iter().filter_map(|r| r.as_ref().err()) {
            debug!("Partial navigation failure: {}", err);
        }
        if editor.is_ok() || preview.is_ok() {
            Ok(())
        } else {
            Err(Error::NavigationFailed {
                id: heading.id.clone(),
            })
        }
    }

    fn scroll_editor(&mut self, heading: &HeadingItem, editor: &mut dyn TextSurface) -> Result<()> {
        if !editor.is_visible() {
            return Err(Error::SurfaceUnavailable {
                surface: editor.name(),
            });
        }
        let line_height = editor.line_height();
        if line_height <= 0.0 {
            return Err(Error::SurfaceUnavailable {
                surface: editor.name(),
            });
        }

        editor.set_caret(heading.char_offset)?;
        let viewport = editor.bounding_rect();
        let target = editor_scroll_target(heading.line_number, line_height, viewport.height);
        editor.scroll_to(target, self.options.behavior)?;

        self.highlight = Some(LineHighlight {
            line: heading.line_number,
            expires_at: Instant::now() + self.highlight_duration,
        });
        Ok(())
    }

    fn scroll_preview(
        &mut self,
        heading: &HeadingItem,
        preview: &mut dyn ScrollSurface,
        locator: &dyn ElementLocator,
    ) -> Result<()> {
        if !preview.is_visible() {
            return Err(Error::SurfaceUnavailable {
                surface: preview.name(),
            });
        }
        let element = locator
            .element_rect(&heading.id)
            .ok_or_else(|| Error::HeadingNotFound {
                id: heading.id.clone(),
            })?;
        let target = preview_scroll_target(
            element,
            preview.bounding_rect(),
            preview.scroll_offset(),
            self.options.offset,
        );
        preview.scroll_to(target, self.options.behavior)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Highlight
    // ─────────────────────────────────────────────────────────────────────────

    /// The current line highlight, dropping it once expired.
    pub fn active_highlight(&mut self, now: Instant) -> Option<LineHighlight> {
        match self.highlight {
            Some(highlight) if now < highlight.expires_at => Some(highlight),
            Some(_) => {
                self.highlight = None;
                None
            }
            None => None,
        }
    }

    /// Whether a highlight is set, expired or not.
    pub fn has_highlight(&self) -> bool {
        self.highlight.is_some()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
