//! Window geometry.
//!
//! Pure functions over work areas and stored bounds; the engine supplies the
//! display list and the focused window.

use spaces_protocol::{DisplayInfo, StoredBounds, Window, WindowBounds};

/// Inset applied when stored bounds are unusable.
pub const RESTORE_INSET: i32 = 100;

/// Geometry for restoring a session onto `work_area`.
///
/// Stored bounds are used verbatim only when all four fields are present and
/// the rectangle lies entirely inside the work area.
pub fn compute_bounds(work_area: &WindowBounds, stored: Option<&StoredBounds>) -> WindowBounds {
	compute_bounds_with_inset(work_area, stored, RESTORE_INSET)
}

pub fn compute_bounds_with_inset(work_area: &WindowBounds, stored: Option<&StoredBounds>, inset: i32) -> WindowBounds {
	match stored.and_then(StoredBounds::complete) {
		Some(bounds) if work_area.contains(&bounds) => bounds,
		_ => WindowBounds {
			left: work_area.left,
			top: work_area.top,
			width: work_area.width - inset,
			height: work_area.height - inset,
		},
	}
}

/// Work area of the display showing the focused window's centre.
///
/// Falls back to the primary display, then to the first display. Returns
/// `None` only when no display is attached.
pub fn select_work_area(displays: &[DisplayInfo], focused: Option<&Window>) -> Option<WindowBounds> {
	let center = focused.and_then(|window| window.bounds().complete()).map(|bounds| bounds.center());
	center
		.and_then(|(x, y)| displays.iter().find(|display| display.work_area.contains_point(x, y)))
		.or_else(|| displays.iter().find(|display| display.is_primary))
		.or_else(|| displays.first())
		.map(|display| display.work_area)
}

/// Dashboard geometry: pinned to the work area's top-left corner.
pub fn dashboard_bounds(work_area: &WindowBounds, max_width: i32) -> WindowBounds {
	WindowBounds {
		left: work_area.left,
		top: work_area.top,
		width: (work_area.width - RESTORE_INSET).min(max_width),
		height: (f64::from(work_area.height) * 0.9).round() as i32,
	}
}

/// Popup geometry: anchored to the work area's bottom-right corner.
pub fn popup_bounds(work_area: &WindowBounds, width: i32, height: i32) -> WindowBounds {
	WindowBounds {
		left: work_area.left + work_area.width - width,
		top: work_area.top + work_area.height - height,
		width,
		height,
	}
}
