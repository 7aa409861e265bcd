#![forbid(unsafe_code)]

//! Editor provider contract.
//!
//! The text-editing component is an external collaborator. The panel pulls
//! everything it needs through this trait: an owned text snapshot per render
//! (never a live reference, so a render can't race concurrent edits), the
//! scroll state for offset math, and a scroll command for click-to-navigate.
//!
//! Change notifications are push-based on the host side: the host forwards
//! document mutations to `MinimapPanel::document_changed` and visible-area
//! moves to `MinimapPanel::visible_area_changed`.

use crate::color::ColorScheme;

/// Capability surface the editor must expose to the minimap.
pub trait EditorSource: Send + Sync {
    /// An owned copy of the full document text, or `None` if no document is
    /// resolvable yet (e.g. the editor tab is still loading).
    fn snapshot(&self) -> Option<String>;

    /// Total number of lines in the document.
    fn line_count(&self) -> u32;

    /// The current theme, snapshotted per call.
    fn color_scheme(&self) -> ColorScheme;

    /// First and last document lines currently visible in the editor,
    /// inclusive.
    fn visible_lines(&self) -> (u32, u32);

    /// Scroll the editor so `line` is centered.
    ///
    /// `animate = false` suppresses scroll animation; drags use it so the
    /// viewport tracks the pointer without lag.
    fn scroll_to_line(&self, line: u32, animate: bool);
}
