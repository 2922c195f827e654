//! User settings and preferences for mdremix
//!
//! This module defines the `Settings` struct that holds all user-configurable
//! options, with serde support for JSON persistence. Navigation options map
//! one-to-one onto the engine's [`SpyConfig`] and [`NavigationOptions`].

use crate::navigation::{
    NavigationOptions, RootMargin, ScrollBehavior, SpyConfig, DEFAULT_ROOT_MARGIN,
    DEFAULT_SPY_OFFSET, DEFAULT_THRESHOLD,
};
use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Navigation Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Scroll-spy and heading navigation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationSettings {
    /// Distance between the pane top and the active-heading line (pixels)
    pub offset: f32,
    /// Fraction of a heading that must be visible (0.0 to 1.0)
    pub threshold: f32,
    /// CSS-like margin applied to the observer root
    pub root_margin: String,
    /// Minimum spacing between scroll-driven updates (milliseconds)
    pub throttle_delay_ms: u64,
    /// Scroll animation mode
    pub behavior: ScrollBehavior,
    /// Scroll only the editor when both panes are visible
    pub prefer_editor: bool,
    /// How long the editor keeps the navigated line highlighted (milliseconds)
    pub highlight_duration_ms: u64,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            offset: DEFAULT_SPY_OFFSET,
            threshold: DEFAULT_THRESHOLD,
            root_margin: DEFAULT_ROOT_MARGIN.to_string(),
            throttle_delay_ms: 100,
            behavior: ScrollBehavior::Smooth,
            prefer_editor: false,
            highlight_duration_ms: 2000,
        }
    }
}

impl NavigationSettings {
    /// Maximum detection offset.
    pub const MAX_OFFSET: f32 = 2000.0;
    /// Maximum throttle delay and highlight duration.
    pub const MAX_DELAY_MS: u64 = 2000;

    /// Clamp every option to a valid range.
    pub fn sanitize(&mut self) {
        self.offset = if self.offset.is_finite() {
            self.offset.clamp(0.0, Self::MAX_OFFSET)
        } else {
            DEFAULT_SPY_OFFSET
        };

        self.threshold = if self.threshold.is_finite() {
            self.threshold.clamp(0.0, 1.0)
        } else {
            DEFAULT_THRESHOLD
        };

        self.throttle_delay_ms = self.throttle_delay_ms.min(Self::MAX_DELAY_MS);
        self.highlight_duration_ms = self.highlight_duration_ms.min(Self::MAX_DELAY_MS);

        if let Err(err) = self.root_margin.parse::<RootMargin>() {
            warn!("{}. Using default root margin.", err);
            self.root_margin = DEFAULT_ROOT_MARGIN.to_string();
        }
    }

    /// Scroll-spy configuration derived from these settings.
    pub fn spy_config(&self) -> SpyConfig {
        SpyConfig {
            offset: self.offset,
            threshold: self.threshold,
            root_margin: self.root_margin.clone(),
            throttle_delay: Duration::from_millis(self.throttle_delay_ms),
        }
    }

    /// Dispatcher options derived from these settings.
    pub fn navigation_options(&self) -> NavigationOptions {
        NavigationOptions {
            offset: self.offset,
            behavior: self.behavior,
            prefer_editor: self.prefer_editor,
        }
    }

    pub fn highlight_duration(&self) -> Duration {
        Duration::from_millis(self.highlight_duration_ms)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Outline Panel Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Which side of the window the outline panel should appear on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutlinePanelSide {
    /// Outline panel on the left side (default)
    #[default]
    Left,
    /// Outline panel on the right side
    Right,
}

impl OutlinePanelSide {
    /// Toggle between left and right.
    pub fn toggle(&self) -> Self {
        match self {
            OutlinePanelSide::Left => OutlinePanelSide::Right,
            OutlinePanelSide::Right => OutlinePanelSide::Left,
        }
    }

    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            OutlinePanelSide::Left => "Left",
            OutlinePanelSide::Right => "Right",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Window Size Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Window dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSize {
    /// Window width in pixels
    pub width: f32,
    /// Window height in pixels
    pub height: f32,
    /// Whether the window was maximized
    #[serde(default)]
    pub maximized: bool,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            maximized: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// User preferences and application settings.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────
    /// Scroll-spy and heading navigation options
    pub navigation: NavigationSettings,

    // ─────────────────────────────────────────────────────────────────────────
    // Layout
    // ─────────────────────────────────────────────────────────────────────────
    /// Font size for the editor (in points)
    pub font_size: f32,

    /// Whether the plain-text editor pane is shown
    pub show_editor: bool,

    /// Whether the rendered preview pane is shown
    pub show_preview: bool,

    /// Whether the outline panel is shown
    pub show_outline: bool,

    /// Which side the outline panel appears on
    pub outline_side: OutlinePanelSide,

    /// Width of the outline panel in pixels
    pub outline_width: f32,

    // ─────────────────────────────────────────────────────────────────────────
    // Window State
    // ─────────────────────────────────────────────────────────────────────────
    /// Window size
    pub window_size: WindowSize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            navigation: NavigationSettings::default(),

            font_size: 14.0,
            show_editor: true,
            show_preview: true,
            show_outline: true,
            outline_side: OutlinePanelSide::default(),
            outline_width: 220.0,

            window_size: WindowSize::default(),
        }
    }
}

impl Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Validation Constants and Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    /// Minimum allowed font size.
    pub const MIN_FONT_SIZE: f32 = 8.0;
    /// Maximum allowed font size.
    pub const MAX_FONT_SIZE: f32 = 32.0;
    /// Minimum window dimension.
    pub const MIN_WINDOW_SIZE: f32 = 200.0;
    /// Maximum window dimension.
    pub const MAX_WINDOW_SIZE: f32 = 10000.0;
    /// Minimum outline panel width.
    pub const MIN_OUTLINE_WIDTH: f32 = 120.0;
    /// Maximum outline panel width.
    pub const MAX_OUTLINE_WIDTH: f32 = 500.0;

    /// Sanitize settings by clamping values to valid ranges.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        self.navigation.sanitize();

        self.font_size = self
            .font_size
            .clamp(Self::MIN_FONT_SIZE, Self::MAX_FONT_SIZE);

        self.window_size.width = self
            .window_size
            .width
            .clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE);
        self.window_size.height = self
            .window_size
            .height
            .clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE);

        self.outline_width = self
            .outline_width
            .clamp(Self::MIN_OUTLINE_WIDTH, Self::MAX_OUTLINE_WIDTH);

        // Never hide both content panes
        if !self.show_editor && !self.show_preview {
            self.show_editor = true;
        }
    }

    /// Load settings and sanitize them to ensure validity.
    ///
    /// This is a convenience method that deserializes and then sanitizes.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_navigation_settings() {
        let nav = NavigationSettings::default();
        assert_eq!(nav.threshold, 0.6);
        assert_eq!(nav.root_margin, "-20% 0px -35% 0px");
        assert_eq!(nav.throttle_delay_ms, 100);
        assert_eq!(nav.behavior, ScrollBehavior::Smooth);
        assert!(!nav.prefer_editor);
    }

    #[test]
    fn test_spy_config_mapping() {
        let nav = NavigationSettings {
            offset: 120.0,
            throttle_delay_ms: 40,
            ..NavigationSettings::default()
        };
        let config = nav.spy_config();
        assert_eq!(config.offset, 120.0);
        assert_eq!(config.throttle_delay, Duration::from_millis(40));
        assert_eq!(config.root_margin, nav.root_margin);
    }

    #[test]
    fn test_navigation_options_mapping() {
        let nav = NavigationSettings {
            behavior: ScrollBehavior::Auto,
            prefer_editor: true,
            ..NavigationSettings::default()
        };
        let options = nav.navigation_options();
        assert_eq!(options.behavior, ScrollBehavior::Auto);
        assert!(options.prefer_editor);
        assert_eq!(options.offset, nav.offset);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_sanitize_threshold_and_offset() {
        let mut nav = NavigationSettings {
            threshold: 1.7,
            offset: -30.0,
            ..NavigationSettings::default()
        };
        nav.sanitize();
        assert_eq!(nav.threshold, 1.0);
        assert_eq!(nav.offset, 0.0);

        nav.threshold = f32::NAN;
        nav.sanitize();
        assert_eq!(nav.threshold, DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_sanitize_delays() {
        let mut nav = NavigationSettings {
            throttle_delay_ms: 60_000,
            highlight_duration_ms: 90_000,
            ..NavigationSettings::default()
        };
        nav.sanitize();
        assert_eq!(nav.throttle_delay_ms, NavigationSettings::MAX_DELAY_MS);
        assert_eq!(nav.highlight_duration_ms, NavigationSettings::MAX_DELAY_MS);
    }

    #[test]
    fn test_sanitize_bad_root_margin() {
        let mut nav = NavigationSettings {
            root_margin: "lots".to_string(),
            ..NavigationSettings::default()
        };
        nav.sanitize();
        assert_eq!(nav.root_margin, DEFAULT_ROOT_MARGIN);
    }

    #[test]
    fn test_sanitize_font_size() {
        let mut settings = Settings {
            font_size: 4.0,
            ..Settings::default()
        };
        settings.sanitize();
        assert_eq!(settings.font_size, Settings::MIN_FONT_SIZE);

        settings.font_size = 100.0;
        settings.sanitize();
        assert_eq!(settings.font_size, Settings::MAX_FONT_SIZE);
    }

    #[test]
    fn test_sanitize_keeps_a_content_pane() {
        let mut settings = Settings {
            show_editor: false,
            show_preview: false,
            ..Settings::default()
        };
        settings.sanitize();
        assert!(settings.show_editor);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Serialization
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            Settings::from_json_sanitized(r#"{"navigation": {"prefer_editor": true}}"#).unwrap();
        assert!(settings.navigation.prefer_editor);
        assert_eq!(settings.navigation.throttle_delay_ms, 100);
        assert_eq!(settings.font_size, 14.0);
    }

    #[test]
    fn test_behavior_accepts_instant_alias() {
        let settings =
            Settings::from_json_sanitized(r#"{"navigation": {"behavior": "instant"}}"#).unwrap();
        assert_eq!(settings.navigation.behavior, ScrollBehavior::Auto);
    }

    #[test]
    fn test_outline_side_toggle() {
        assert_eq!(OutlinePanelSide::Left.toggle(), OutlinePanelSide::Right);
        assert_eq!(OutlinePanelSide::Right.label(), "Right");
    }
}
