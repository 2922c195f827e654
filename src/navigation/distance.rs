//! Closest-heading detection from scroll geometry
//!
//! A heading counts only once it has reached the detection line
//! (`scroll_top + offset`, plus a fixed tolerance). Among those, the one
//! nearest to the line wins, which yields "most recently passed heading"
//! semantics rather than "nearest heading in either direction".

use super::locator::ElementLocator;
use super::surface::ScrollProbe;
use log::warn;

/// Slack below the detection line within which a heading still counts.
pub const DETECTION_TOLERANCE: f32 = 50.0;

/// Pick the active heading for a scroll position.
///
/// Headings without a laid-out element are skipped. Returns `None` when no
/// heading is eligible; callers treat that as "no change".
pub fn find_closest_heading(
    heading_ids: &[String],
    probe: &ScrollProbe,
    locator: &dyn ElementLocator,
    offset: f32,
) -> Option<String> {
    let detection_line = probe.scroll_top + offset;
    let mut best: Option<(&String, f32)> = None;
    let mut missing = 0usize;

    for id in heading_ids {
        let Some(rect) = locator.element_rect(id) else {
            missing += 1;
            continue;
        };
        // Position within the scrolled content, independent of scroll offset
        let element_top = rect.top - probe.container_rect.top + probe.scroll_top;
        if element_top > detection_line + DETECTION_TOLERANCE {
            continue;
        }
        let distance = (element_top - detection_line).abs();
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((id, distance));
        }
    }

    if missing > 0 {
        warn!(
            "{} of {} headings have no laid-out element; skipped",
            missing,
            heading_ids.len()
        );
    }

    best.map(|(id, _)| id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::geometry::Rect;
    use crate::navigation::locator::LayoutMap;

    /// Lay out headings at content offsets, seen through a container at
    /// screen y = 100 scrolled by `scroll_top`.
    fn layout(positions: &[(&str, f32)], scroll_top: f32) -> (Vec<String>, LayoutMap, ScrollProbe) {
        let container = Rect::new(100.0, 0.0, 600.0, 400.0);
        let mut map = LayoutMap::new();
        let mut ids = Vec::new();
        for (id, y) in positions {
            map.record(*id, Rect::new(container.top + y - scroll_top, 0.0, 600.0, 24.0));
            ids.push(id.to_string());
        }
        let probe = ScrollProbe {
            scroll_top,
            container_rect: container,
        };
        (ids, map, probe)
    }

    #[test]
    fn test_only_headings_above_line_are_eligible() {
        let (ids, map, probe) = layout(&[("a", 0.0), ("b", 100.0), ("c", 300.0)], 150.0);
        assert_eq!(
            find_closest_heading(&ids, &probe, &map, 50.0),
            Some("b".to_string())
        );
    }

    #[test]
    fn test_tolerance_admits_heading_just_below_line() {
        let (ids, map, probe) = layout(&[("a", 0.0), ("b", 240.0)], 150.0);
        // Line at 200, b is 40px below it but within tolerance
        assert_eq!(
            find_closest_heading(&ids, &probe, &map, 50.0),
            Some("b".to_string())
        );
    }

    #[test]
    fn test_nothing_eligible_returns_none() {
        let (ids, map, probe) = layout(&[("a", 500.0), ("b", 900.0)], 0.0);
        assert_eq!(find_closest_heading(&ids, &probe, &map, 50.0), None);
    }

    #[test]
    fn test_missing_element_is_skipped() {
        let (mut ids, map, probe) = layout(&[("a", 0.0), ("b", 100.0)], 150.0);
        ids.insert(1, "ghost".to_string());
        assert_eq!(
            find_closest_heading(&ids, &probe, &map, 50.0),
            Some("b".to_string())
        );
    }

    #[test]
    fn test_nothing_mounted_returns_none() {
        let map = LayoutMap::new();
        let probe = ScrollProbe {
            scroll_top: 0.0,
            container_rect: Rect::new(0.0, 0.0, 100.0, 100.0),
        };
        let ids = vec!["a".to_string(), "b".to_string()];
        assert_eq!(find_closest_heading(&ids, &probe, &map, 80.0), None);
    }

    #[test]
    fn test_top_of_document_selects_first() {
        let (ids, map, probe) = layout(&[("a", 0.0), ("b", 400.0)], 0.0);
        assert_eq!(
            find_closest_heading(&ids, &probe, &map, 80.0),
            Some("a".to_string())
        );
    }
}
