//! Scroll surfaces and the scroll position probe
//!
//! A scroll surface is anything that scrolls independently: the whole window,
//! the editor pane, or the preview pane. The engine only talks to surfaces
//! through [`ScrollSurface`], so the window case and the element case are two
//! implementations rather than identity checks.
//!
//! Surfaces never move immediately. `scroll_to` records a target (and, for
//! smooth scrolling, an ease-out animation); the host reads
//! [`PaneSurface::frame_offset`] at the start of the next frame and feeds the
//! real offset and geometry back with [`PaneSurface::sync`] once layout has
//! settled.

use super::geometry::{Rect, ScrollBehavior};
use crate::error::{Error, Result};
use log::debug;
use std::time::{Duration, Instant};

/// Duration of a smooth scroll animation.
pub const SMOOTH_SCROLL_DURATION: Duration = Duration::from_millis(250);

// ─────────────────────────────────────────────────────────────────────────────
// Traits
// ─────────────────────────────────────────────────────────────────────────────

/// An independently scrollable container.
pub trait ScrollSurface {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Whether the surface is currently shown.
    fn is_visible(&self) -> bool;

    /// Current vertical scroll offset in pixels.
    fn scroll_offset(&self) -> f32;

    /// Visible bounds of the container in screen coordinates.
    fn bounding_rect(&self) -> Rect;

    /// Request a scroll to `offset`.
    fn scroll_to(&mut self, offset: f32, behavior: ScrollBehavior) -> Result<()>;
}

/// A scroll surface showing plain text lines with a caret.
pub trait TextSurface: ScrollSurface {
    /// Height of one text line in pixels.
    fn line_height(&self) -> f32;

    /// Move the caret to a character offset.
    fn set_caret(&mut self, char_offset: usize) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Probe
// ─────────────────────────────────────────────────────────────────────────────

/// Snapshot of a surface's scroll position and geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollProbe {
    pub scroll_top: f32,
    pub container_rect: Rect,
}

/// Read the scroll offset and bounds of a surface.
pub fn probe(surface: &dyn ScrollSurface) -> Result<ScrollProbe> {
    if !surface.is_visible() {
        return Err(Error::SurfaceUnavailable {
            surface: surface.name(),
        });
    }
    Ok(ScrollProbe {
        scroll_top: surface.scroll_offset(),
        container_rect: surface.bounding_rect(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Animation
// ─────────────────────────────────────────────────────────────────────────────

/// Ease-out scroll from one offset to another.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScrollAnimation {
    from: f32,
    to: f32,
    started: Instant,
    duration: Duration,
}

impl ScrollAnimation {
    /// Offset at `now` and whether the animation has finished.
    fn offset_at(&self, now: Instant) -> (f32, bool) {
        let elapsed = now.saturating_duration_since(self.started).as_secs_f32();
        let total = self.duration.as_secs_f32();
        let progress = if total <= 0.0 {
            1.0
        } else {
            (elapsed / total).min(1.0)
        };
        if progress >= 1.0 {
            return (self.to, true);
        }
        // Ease-out quad
        let eased = 1.0 - (1.0 - progress).powi(2);
        (self.from + (self.to - self.from) * eased, false)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Window Surface
// ─────────────────────────────────────────────────────────────────────────────

/// The whole window as a scroll surface. Its bounds are synthesized from the
/// viewport size, no layout measurement involved.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportSurface {
    viewport_width: f32,
    viewport_height: f32,
    offset: f32,
    pending: Option<f32>,
}

impl ViewportSurface {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            viewport_width,
            viewport_height,
            offset: 0.0,
            pending: None,
        }
    }

    /// Record the window's current size and scroll offset.
    pub fn sync(&mut self, viewport_width: f32, viewport_height: f32, offset: f32) {
        self.viewport_width = viewport_width;
        self.viewport_height = viewport_height;
        self.offset = offset;
    }

    /// Take the requested offset, if any.
    pub fn take_pending(&mut self) -> Option<f32> {
        self.pending.take()
    }
}

impl ScrollSurface for ViewportSurface {
    fn name(&self) -> &'static str {
        "window"
    }

    fn is_visible(&self) -> bool {
        true
    }

    fn scroll_offset(&self) -> f32 {
        self.offset
    }

    fn bounding_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.viewport_width, self.viewport_height)
    }

    fn scroll_to(&mut self, offset: f32, _behavior: ScrollBehavior) -> Result<()> {
        self.pending = Some(offset.max(0.0));
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pane Surface
// ─────────────────────────────────────────────────────────────────────────────

/// A scrollable pane inside the window (editor or preview).
#[derive(Debug, Clone, PartialEq)]
pub struct PaneSurface {
    name: &'static str,
    visible: bool,
    offset: f32,
    rect: Rect,
    content_height: f32,
    animation: Option<ScrollAnimation>,
    jump: Option<f32>,
}

impl PaneSurface {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            visible: false,
            offset: 0.0,
            rect: Rect::default(),
            content_height: 0.0,
            animation: None,
            jump: None,
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if !visible {
            self.animation = None;
            self.jump = None;
        }
    }

    /// Record the pane's real offset and geometry after layout.
    pub fn sync(&mut self, offset: f32, rect: Rect, content_height: f32) {
        self.offset = offset;
        self.rect = rect;
        self.content_height = content_height;
    }

    /// Largest offset the content allows.
    pub fn max_offset(&self) -> f32 {
        (self.content_height - self.rect.height).max(0.0)
    }

    /// Offset to force on the pane this frame, if a scroll is in flight.
    pub fn frame_offset(&mut self, now: Instant) -> Option<f32> {
        if let Some(target) = self.jump.take() {
            return Some(target);
        }
        let animation = self.animation?;
        let (offset, done) = animation.offset_at(now);
        if done {
            self.animation = None;
        }
        Some(offset)
    }

    /// Whether a requested scroll has not been applied yet.
    pub fn is_scrolling(&self) -> bool {
        self.jump.is_some() || self.animation.is_some()
    }

    /// Final offset of the in-flight scroll, if any.
    pub fn target_offset(&self) -> Option<f32> {
        self.jump.or(self.animation.map(|a| a.to))
    }
}

impl ScrollSurface for PaneSurface {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn scroll_offset(&self) -> f32 {
        self.offset
    }

    fn bounding_rect(&self) -> Rect {
        self.rect
    }

    fn scroll_to(&mut self, offset: f32, behavior: ScrollBehavior) -> Result<()> {
        if !self.visible || self.rect.is_degenerate() {
            return Err(Error::SurfaceUnavailable { surface: self.name });
        }
        let target = offset.clamp(0.0, self.max_offset());
        debug!("Scrolling {} pane to {:.1}px ({:?})", self.name, target, behavior);
        match behavior {
            ScrollBehavior::Auto => {
                self.animation = None;
                self.jump = Some(target);
            }
            ScrollBehavior::Smooth => {
                self.jump = None;
                self.animation = Some(ScrollAnimation {
                    from: self.offset,
                    to: target,
                    started: Instant::now(),
                    duration: SMOOTH_SCROLL_DURATION,
                });
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Editor Surface
// ─────────────────────────────────────────────────────────────────────────────

/// The plain-text editor pane: a pane plus line metrics and a caret request.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSurface {
    pane: PaneSurface,
    line_height: f32,
    caret: Option<usize>,
}

impl EditorSurface {
    pub fn new(line_height: f32) -> Self {
        Self {
            pane: PaneSurface::new("editor"),
            line_height,
            caret: None,
        }
    }

    pub fn pane(&self) -> &PaneSurface {
        &self.pane
    }

    pub fn pane_mut(&mut self) -> &mut PaneSurface {
        &mut self.pane
    }

    pub fn set_line_height(&mut self, line_height: f32) {
        self.line_height = line_height;
    }

    /// Take the caret position requested by the last navigation.
    pub fn take_caret(&mut self) -> Option<usize> {
        self.caret.take()
    }
}

impl ScrollSurface for EditorSurface {
    fn name(&self) -> &'static str {
        self.pane.name()
    }

    fn is_visible(&self) -> bool {
        self.pane.is_visible()
    }

    fn scroll_offset(&self) -> f32 {
        self.pane.scroll_offset()
    }

    fn bounding_rect(&self) -> Rect {
        self.pane.bounding_rect()
    }

    fn scroll_to(&mut self, offset: f32, behavior: ScrollBehavior) -> Result<()> {
        self.pane.scroll_to(offset, behavior)
    }
}

impl TextSurface for EditorSurface {
    fn line_height(&self) -> f32 {
        self.line_height
    }

    fn set_caret(&mut self, char_offset: usize) -> Result<()> {
        if !self.pane.is_visible() {
            return Err(Error::SurfaceUnavailable {
                surface: self.pane.name(),
            });
        }
        self.caret = Some(char_offset);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn visible_pane() -> PaneSurface {
        let mut pane = PaneSurface::new("preview");
        pane.set_visible(true);
        pane.sync(40.0, Rect::new(100.0, 0.0, 400.0, 300.0), 2000.0);
        pane
    }

    #[test]
    fn test_probe_element_uses_live_rect() {
        let pane = visible_pane();
        let snapshot = probe(&pane).unwrap();
        assert_eq!(snapshot.scroll_top, 40.0);
        assert_eq!(snapshot.container_rect, Rect::new(100.0, 0.0, 400.0, 300.0));
    }

    #[test]
    fn test_probe_window_synthesizes_rect() {
        let mut window = ViewportSurface::new(1024.0, 768.0);
        window.sync(1280.0, 720.0, 15.0);
        let snapshot = probe(&window).unwrap();
        assert_eq!(snapshot.scroll_top, 15.0);
        assert_eq!(snapshot.container_rect, Rect::new(0.0, 0.0, 1280.0, 720.0));
    }

    #[test]
    fn test_probe_hidden_surface_fails() {
        let pane = PaneSurface::new("preview");
        assert!(matches!(
            probe(&pane),
            Err(Error::SurfaceUnavailable { surface: "preview" })
        ));
    }

    #[test]
    fn test_auto_scroll_jumps_next_frame() {
        let mut pane = visible_pane();
        pane.scroll_to(500.0, ScrollBehavior::Auto).unwrap();
        assert!(pane.is_scrolling());
        assert_eq!(pane.frame_offset(Instant::now()), Some(500.0));
        assert!(!pane.is_scrolling());
        assert_eq!(pane.frame_offset(Instant::now()), None);
    }

    #[test]
    fn test_scroll_target_is_clamped() {
        let mut pane = visible_pane();
        pane.scroll_to(5000.0, ScrollBehavior::Auto).unwrap();
        assert_eq!(pane.target_offset(), Some(1700.0));
        pane.scroll_to(-20.0, ScrollBehavior::Auto).unwrap();
        assert_eq!(pane.target_offset(), Some(0.0));
    }

    #[test]
    fn test_smooth_scroll_eases_to_target() {
        let mut pane = visible_pane();
        pane.scroll_to(440.0, ScrollBehavior::Smooth).unwrap();
        let start = Instant::now();

        let (mid, done) = pane
            .animation
            .map(|a| a.offset_at(start + SMOOTH_SCROLL_DURATION / 2))
            .unwrap();
        assert!(!done);
        assert!(mid > 40.0 && mid < 440.0);

        let end = start + SMOOTH_SCROLL_DURATION * 2;
        assert_eq!(pane.frame_offset(end), Some(440.0));
        assert!(!pane.is_scrolling());
    }

    #[test]
    fn test_hidden_pane_refuses_scroll() {
        let mut pane = visible_pane();
        pane.set_visible(false);
        assert!(pane.scroll_to(100.0, ScrollBehavior::Auto).is_err());
    }

    #[test]
    fn test_editor_caret_request() {
        let mut editor = EditorSurface::new(20.0);
        assert!(editor.set_caret(12).is_err());

        editor.pane_mut().set_visible(true);
        editor.set_caret(12).unwrap();
        assert_eq!(editor.take_caret(), Some(12));
        assert_eq!(editor.take_caret(), None);
    }
}
