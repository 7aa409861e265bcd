#![forbid(unsafe_code)]

//! Pixel ↔ line coordinate mapping.
//!
//! Two regimes, selected by comparing the raster's logical height to the
//! panel height:
//!
//! - **1:1** (`logical_height <= panel_height`): the raster fits, nothing
//!   scrolls, pixel row `y` is line `y / 2`. Equality is deliberately 1:1 so
//!   the compressed branch — whose scroll-percent divisor is zero when the
//!   whole document is visible — is never evaluated at the boundary.
//! - **Compressed** (`logical_height > panel_height`): the raster scrolls by
//!   a fraction of its off-screen overhang, and clicks map by relative
//!   position within the whole document, independent of the current offset.

use minimap_render::raster::LINE_PIXEL_HEIGHT;

/// Whether the raster displays without scrolling.
#[inline]
pub fn is_one_to_one(logical_height: u32, panel_height: u32) -> bool {
    logical_height <= panel_height
}

/// Vertical pixel offset into the raster for the current scroll position.
///
/// `first_visible` / `last_visible` are the editor's visible line range
/// (inclusive), `total_lines` the document line count. In the 1:1 regime the
/// offset is always zero. A degenerate divisor (visible span covering the
/// whole document while the raster still overhangs) clamps to zero.
pub fn scroll_offset(
    logical_height: u32,
    panel_height: u32,
    first_visible: u32,
    last_visible: u32,
    total_lines: u32,
) -> u32 {
    if is_one_to_one(logical_height, panel_height) {
        return 0;
    }

    let visible_span = last_visible.saturating_sub(first_visible);
    let divisor = i64::from(total_lines) - i64::from(visible_span);
    if divisor <= 0 {
        return 0;
    }

    let percent = (first_visible as f32 / divisor as f32).clamp(0.0, 1.0);
    ((logical_height - panel_height) as f32 * percent) as u32
}

/// Map a panel-relative click `y` to a document line.
///
/// Always relative-position based: the vertical fraction of the panel maps
/// to the same fraction of the whole raster, ignoring the render offset.
/// Out-of-panel coordinates are clamped; degenerate inputs yield line 0.
pub fn line_for_click(y: i32, panel_height: u32, logical_height: u32) -> u32 {
    if panel_height == 0 || logical_height == 0 {
        return 0;
    }
    let y = y.clamp(0, panel_height as i32) as u32;

    let raster_y = if is_one_to_one(logical_height, panel_height) {
        y
    } else {
        (y as f32 / panel_height as f32 * logical_height as f32) as u32
    };
    raster_y / LINE_PIXEL_HEIGHT
}
