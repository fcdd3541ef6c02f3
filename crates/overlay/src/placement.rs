//! Initial selection geometry for a new session

use crate::selection::SelectionRect;
use capture::{Rect, VirtualDesktop};

/// Geometry remembered from the last confirmed session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedGeometry {
    /// Selection in virtual-desktop coordinates
    pub rect: Rect,
    /// Native bounds of the monitor the selection was saved on, if recorded
    pub monitor: Option<Rect>,
}

/// Pick the session's starting rectangle
///
/// The saved geometry is reused only if it is non-empty, its monitor is still
/// attached and it lies fully inside `monitor` (the one under the pointer).
/// Otherwise a rectangle half the monitor's size is centred on it.
pub fn initial_selection(
    saved: Option<&SavedGeometry>,
    monitor: &Rect,
    monitors: &[Rect],
    desktop: &VirtualDesktop,
) -> SelectionRect {
    let target = desktop.native_rect_to_virtual(monitor);

    if let Some(saved) = saved {
        let monitor_present = saved
            .monitor
            .map_or(true, |m| monitors.contains(&m));

        if !saved.rect.is_empty() && monitor_present && target.encloses(&saved.rect) {
            return SelectionRect::from_rect(&saved.rect);
        }
        log::info!("Saved selection {:?} is not usable here, resetting", saved);
    }

    centered_default(&target)
}

/// Rectangle of half the monitor's size, centred on it
pub fn centered_default(monitor: &Rect) -> SelectionRect {
    let width = (monitor.width / 2).max(1) as i32;
    let height = (monitor.height / 2).max(1) as i32;
    let x = monitor.x + monitor.width as i32 / 2 - width / 2;
    let y = monitor.y + monitor.height as i32 / 2 - height / 2;
    SelectionRect::normalized(x, y, x + width, y + height)
}

/// Geometry to remember for `selection`, confirmed on `monitor`
pub fn saved_geometry(selection: &SelectionRect, monitor: &Rect) -> SavedGeometry {
    SavedGeometry {
        rect: selection.to_rect(),
        monitor: Some(*monitor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture::compute_virtual_desktop;

    #[test]
    fn disconnected_monitor_resets_to_centered_default() {
        let monitors = vec![Rect::new(0, 0, 1280, 800)];
        let desktop = compute_virtual_desktop(&monitors).unwrap();
        let saved = SavedGeometry {
            rect: Rect::new(100, 100, 400, 300),
            monitor: Some(Rect::new(1280, 0, 1920, 1080)),
        };

        let sel = initial_selection(Some(&saved), &monitors[0], &monitors, &desktop);

        assert_eq!(sel, SelectionRect { x1: 320, y1: 200, x2: 960, y2: 600 });
        assert_eq!((sel.width(), sel.height()), (640, 400));
    }

    #[test]
    fn oversized_saved_width_resets_to_centered_default() {
        let monitors = vec![Rect::new(0, 0, 1280, 800)];
        let desktop = compute_virtual_desktop(&monitors).unwrap();
        let saved = SavedGeometry {
            rect: Rect::new(100, 100, 3_000_000_000, 300),
            monitor: None,
        };

        let sel = initial_selection(Some(&saved), &monitors[0], &monitors, &desktop);

        assert_eq!(sel, SelectionRect { x1: 320, y1: 200, x2: 960, y2: 600 });
    }

    #[test]
    fn first_run_uses_centered_default() {
        let monitors = vec![Rect::new(0, 0, 1920, 1080)];
        let desktop = compute_virtual_desktop(&monitors).unwrap();
        let sel = initial_selection(None, &monitors[0], &monitors, &desktop);
        assert_eq!(sel, SelectionRect { x1: 480, y1: 270, x2: 1440, y2: 810 });
    }

    #[test]
    fn off_screen_or_empty_geometry_resets() {
        let monitors = vec![Rect::new(0, 0, 1280, 800)];
        let desktop = compute_virtual_desktop(&monitors).unwrap();
        let default = centered_default(&monitors[0]);

        for rect in [
            Rect::new(1200, 100, 400, 300),
            Rect::new(-50, 100, 400, 300),
            Rect::new(100, 100, 0, 300),
            Rect::new(100, i32::MAX - 100, 400, 300),
        ] {
            let saved = SavedGeometry { rect, monitor: None };
            assert_eq!(
                initial_selection(Some(&saved), &monitors[0], &monitors, &desktop),
                default
            );
        }
    }

    #[test]
    fn saved_geometry_round_trips_on_same_configuration() {
        let monitors = vec![Rect::new(0, 0, 1920, 1080), Rect::new(-1920, 0, 1920, 1080)];
        let desktop = compute_virtual_desktop(&monitors).unwrap();
        // Left monitor spans virtual x 0..1920
        let selection = SelectionRect { x1: 10, y1: 20, x2: 1920, y2: 1080 };

        let saved = saved_geometry(&selection, &monitors[1]);
        let restored = initial_selection(Some(&saved), &monitors[1], &monitors, &desktop);

        assert_eq!(restored, selection);
    }

    #[test]
    fn geometry_on_other_monitor_than_pointer_resets() {
        let monitors = vec![Rect::new(0, 0, 1920, 1080), Rect::new(1920, 0, 1920, 1080)];
        let desktop = compute_virtual_desktop(&monitors).unwrap();
        let saved = SavedGeometry { rect: Rect::new(100, 100, 400, 300), monitor: Some(monitors[0]) };

        let sel = initial_selection(Some(&saved), &monitors[1], &monitors, &desktop);
        assert_eq!(sel, centered_default(&monitors[1]));
        assert_eq!(sel.x1, 1920 + 480);
    }
}
