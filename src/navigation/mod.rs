//! Navigation synchronization engine for mdremix
//!
//! This module keeps the outline, the editor pane and the preview pane in
//! agreement about where the reader is:
//!
//! - scroll surfaces and the scroll position probe
//! - closest-heading detection and intersection tracking
//! - the throttled scroll spy that owns the active heading
//! - the dispatcher that scrolls one or both panes to a heading
//!
//! Nothing here touches a GUI toolkit directly. The host feeds geometry in
//! through [`PaneSurface::sync`] and [`LayoutMap::record`] each frame and
//! applies requested offsets from [`PaneSurface::frame_offset`].

mod dispatcher;
mod distance;
mod geometry;
mod intersection;
mod locator;
mod spy;
mod surface;
mod throttle;

pub use dispatcher::{
    editor_scroll_target, preview_scroll_target, LineHighlight, NavigationDispatcher,
    NavigationOptions, NavigationSurfaces, SurfaceState, DEFAULT_HIGHLIGHT_DURATION,
};
pub use distance::{find_closest_heading, DETECTION_TOLERANCE};
pub use geometry::{Rect, ScrollBehavior, ScrollDirection, ScrollState};
pub use intersection::{
    IntersectionEntry, IntersectionTracker, MarginValue, RootMargin, DEFAULT_ROOT_MARGIN,
    DEFAULT_THRESHOLD,
};
pub use locator::{ElementLocator, LayoutMap};
pub use spy::{
    ActiveHeadingListener, ScrollSpy, SpyConfig, DEFAULT_SPY_OFFSET, DEFAULT_THROTTLE_DELAY,
};
pub use surface::{
    probe, EditorSurface, PaneSurface, ScrollProbe, ScrollSurface, TextSurface, ViewportSurface,
    SMOOTH_SCROLL_DURATION,
};
pub use throttle::Throttle;
