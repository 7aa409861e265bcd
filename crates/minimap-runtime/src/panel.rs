#![forbid(unsafe_code)]

//! The double-buffered panel controller.
//!
//! [`MinimapPanel`] owns two raster buffer slots and a three-state schedule:
//!
//! - `Idle` — nothing in flight, nothing owed.
//! - `Pending` — one job in flight, no follow-up owed.
//! - `PendingDirty` — one job in flight, a follow-up owed because changes
//!   arrived meanwhile.
//!
//! Update requests while a job is in flight collapse into a single trailing
//! re-render, so in-flight work stays bounded under fast typing while the
//! last document state is always eventually rendered.
//!
//! Completion runs on the worker: it stores the fresh buffer into the slot
//! the job targeted, flips the active index, and swaps the published handle.
//! The repaint signal and any dirty reschedule cross back to the interactive
//! thread through [`PanelHost`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwapOption;
use minimap_core::color::Rgba;
use minimap_core::editor::EditorSource;
use minimap_core::geometry::Rect;
use minimap_core::token::TokenClassifier;
use minimap_render::raster::{LINE_PIXEL_HEIGHT, RasterBuffer};
use minimap_render::surface::Surface;
use tracing::{debug, warn};

use crate::coords;
use crate::job::{JobOutcome, RenderJob};
use crate::task_runner::RunnerHandle;

/// Hard cap on the panel's preferred width, in pixels.
pub const MAX_WIDTH: u32 = 100;

/// Overlay fill alpha (~10%).
const OVERLAY_FILL_ALPHA: u8 = 26;

/// Overlay outline alpha (~30%).
const OVERLAY_OUTLINE_ALPHA: u8 = 77;

const OVERLAY_GRAY: Rgba = Rgba::rgb(128, 128, 128);

/// Preferred panel width: a tenth of the host container, capped at
/// [`MAX_WIDTH`].
#[inline]
pub fn preferred_width(container_width: u32) -> u32 {
    (container_width / 10).min(MAX_WIDTH)
}

/// Host shell callbacks.
///
/// `post` must run the closure on the interactive thread; it is the seam
/// that marshals completion work off the render worker.
pub trait PanelHost: Send + Sync {
    /// Ask the host to repaint the panel.
    fn request_repaint(&self);

    /// Run `task` on the interactive thread.
    fn post(&self, task: Box<dyn FnOnce() + Send>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Schedule {
    Idle,
    Pending,
    PendingDirty,
}

struct PanelState {
    schedule: Schedule,
    /// Slot safe to display, `None` until the first publication.
    active: Option<usize>,
    /// Slot the next job will target.
    next: usize,
    slots: [Option<Arc<RasterBuffer>>; 2],
    seq: u64,
}

/// Controller for one editor's minimap.
///
/// Construction schedules the initial render. All scheduling entry points
/// (`document_changed`, the dirty reschedule) are interactive-thread calls;
/// completion accounting is safe from the worker because every transition
/// happens under one tightly scoped mutex.
pub struct MinimapPanel {
    state: Mutex<PanelState>,
    /// Lock-free read path for paint and click mapping.
    published: ArcSwapOption<RasterBuffer>,
    /// Last known panel pixel size, fed by `resized`.
    size: Mutex<(u32, u32)>,
    editor: Arc<dyn EditorSource>,
    classifier: Arc<dyn TokenClassifier>,
    host: Arc<dyn PanelHost>,
    runner: RunnerHandle,
}

impl MinimapPanel {
    /// Create the panel and schedule the initial render.
    pub fn new(
        editor: Arc<dyn EditorSource>,
        classifier: Arc<dyn TokenClassifier>,
        host: Arc<dyn PanelHost>,
        runner: RunnerHandle,
    ) -> Arc<Self> {
        let panel = Arc::new(Self {
            state: Mutex::new(PanelState {
                schedule: Schedule::Idle,
                active: None,
                next: 0,
                slots: [None, None],
                seq: 0,
            }),
            published: ArcSwapOption::const_empty(),
            size: Mutex::new((0, 0)),
            editor,
            classifier,
            host,
            runner,
        });
        panel.request_update();
        panel
    }

    fn lock_state(&self) -> MutexGuard<'_, PanelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The editor document changed; render it (or coalesce into the job
    /// already in flight).
    pub fn document_changed(self: &Arc<Self>) {
        self.request_update();
    }

    /// The editor's visible area moved. Repaint only — the raster does not
    /// depend on scroll position.
    pub fn visible_area_changed(&self) {
        self.host.request_repaint();
    }

    /// The host panel was resized. Repaint only — never a re-render.
    pub fn resized(&self, width: u32, height: u32) {
        *self
            .size
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = (width, height);
        self.host.request_repaint();
    }

    /// Schedule a render of the current document state.
    ///
    /// In `Idle`, snapshots the editor and submits one job targeting the
    /// inactive slot. While a job is in flight the request is swallowed into
    /// `PendingDirty`; completion schedules exactly one follow-up.
    pub fn request_update(self: &Arc<Self>) {
        // Claim the in-flight token before snapshotting, so a concurrent
        // request can only coalesce, never double-submit.
        {
            let mut st = self.lock_state();
            match st.schedule {
                Schedule::Pending => {
                    st.schedule = Schedule::PendingDirty;
                    return;
                }
                Schedule::PendingDirty => return,
                Schedule::Idle => st.schedule = Schedule::Pending,
            }
        }

        // Snapshot outside the lock; it copies the whole document.
        let Some(text) = self.editor.snapshot() else {
            debug!("no document to render yet");
            self.lock_state().schedule = Schedule::Idle;
            return;
        };
        let scheme = self.editor.color_scheme();

        let (slot, seq) = {
            let mut st = self.lock_state();
            if let Some(active) = st.active {
                st.next = 1 - active;
            }
            st.seq += 1;
            (st.next, st.seq)
        };

        debug!(slot, seq, "scheduling render job");
        let panel = Arc::clone(self);
        let job = RenderJob::new(
            seq,
            slot,
            text,
            scheme,
            Arc::clone(&self.classifier),
            move |outcome| panel.job_completed(outcome),
        );
        if let Err(error) = self.runner.submit(job) {
            debug_assert!(false, "{error}");
            warn!(%error, slot, seq, "dropping render job");
            self.lock_state().schedule = Schedule::Idle;
        }
    }

    /// Worker-side completion: publish, repaint, reschedule if dirty.
    fn job_completed(self: &Arc<Self>, outcome: JobOutcome) {
        let JobOutcome { seq, slot, buffer } = outcome;
        let dirty = {
            let mut st = self.lock_state();
            if let Some(buffer) = buffer {
                let buffer = Arc::new(buffer);
                st.slots[slot] = Some(Arc::clone(&buffer));
                st.active = Some(slot);
                self.published.store(Some(buffer));
                debug!(slot, seq, "published render");
            } else {
                debug!(slot, seq, "render completed without an image");
            }
            let dirty = st.schedule == Schedule::PendingDirty;
            st.schedule = Schedule::Idle;
            dirty
        };

        self.host.request_repaint();

        if dirty {
            let panel = Arc::clone(self);
            self.host.post(Box::new(move || panel.request_update()));
        }
    }

    /// The most recently published buffer, if any.
    ///
    /// Hosts that composite the raster themselves read it from here; the
    /// handle is atomically swapped at publication, so the returned buffer
    /// is always a complete render.
    pub fn published(&self) -> Option<Arc<RasterBuffer>> {
        self.published.load_full()
    }

    /// Logical raster height used for mapping and overlay math.
    ///
    /// Click mapping uses the published buffer's height; before the first
    /// publication it falls back to the live line count so early clicks
    /// still navigate.
    fn logical_height(&self) -> u32 {
        match self.published.load_full() {
            Some(buffer) => buffer.logical_height(),
            None => self.editor.line_count() * LINE_PIXEL_HEIGHT,
        }
    }

    /// Composite the minimap onto `surface`.
    ///
    /// Background first, then the active raster scaled to the panel (skipped
    /// if nothing has been published yet), then the translucent viewport
    /// overlay.
    pub fn paint(&self, surface: &mut dyn Surface) {
        let scheme = self.editor.color_scheme();
        let panel_w = surface.width();
        let panel_h = surface.height();
        surface.fill(Rect::from_size(panel_w, panel_h), scheme.background());

        let (first, last) = self.editor.visible_lines();
        let total = self.editor.line_count();
        // The offset tracks the live document height, so the overlay stays
        // aligned with the editor even while a render is still in flight.
        let offset = coords::scroll_offset(
            total * LINE_PIXEL_HEIGHT,
            panel_h,
            first,
            last,
            total,
        );

        if let Some(buffer) = self.published.load_full() {
            surface.blit_scaled(&buffer, offset, panel_h, Rect::from_size(panel_w, panel_h));
        }

        let top = (first * LINE_PIXEL_HEIGHT) as i32 - offset as i32;
        let bottom = (last * LINE_PIXEL_HEIGHT) as i32 - offset as i32;
        let overlay = Rect::new(0, top, panel_w, (bottom - top).max(0) as u32);
        surface.stroke(overlay, OVERLAY_GRAY.with_alpha(OVERLAY_OUTLINE_ALPHA));
        surface.fill(overlay, OVERLAY_GRAY.with_alpha(OVERLAY_FILL_ALPHA));
    }

    fn line_at(&self, y: i32) -> u32 {
        let (_, panel_h) = *self.size.lock().unwrap_or_else(PoisonError::into_inner);
        coords::line_for_click(y, panel_h, self.logical_height())
    }

    /// Pointer press: scroll to the mapped line, animated.
    pub fn pointer_pressed(&self, _x: i32, y: i32) {
        self.editor.scroll_to_line(self.line_at(y), true);
    }

    /// Pointer click: scroll to the mapped line, animated.
    pub fn pointer_clicked(&self, _x: i32, y: i32) {
        self.editor.scroll_to_line(self.line_at(y), true);
    }

    /// Pointer drag: scroll to the mapped line with animation suppressed so
    /// the viewport tracks the pointer.
    pub fn pointer_dragged(&self, _x: i32, y: i32) {
        self.editor.scroll_to_line(self.line_at(y), false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minimap_core::color::ColorScheme;
    use minimap_core::token::{ClassifyError, TokenSpan};
    use minimap_render::surface::PixelSurface;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::{Receiver, Sender, channel};
    use std::time::Duration;

    struct FakeEditor {
        text: Mutex<Option<String>>,
        visible: Mutex<(u32, u32)>,
        scrolls: Mutex<Vec<(u32, bool)>>,
    }

    impl FakeEditor {
        fn with_text(text: &str) -> Arc<Self> {
            Arc::new(Self {
                text: Mutex::new(Some(text.to_string())),
                visible: Mutex::new((0, 0)),
                scrolls: Mutex::new(Vec::new()),
            })
        }

        fn empty() -> Arc<Self> {
            Arc::new(Self {
                text: Mutex::new(None),
                visible: Mutex::new((0, 0)),
                scrolls: Mutex::new(Vec::new()),
            })
        }
    }

    impl EditorSource for FakeEditor {
        fn snapshot(&self) -> Option<String> {
            self.text.lock().unwrap().clone()
        }

        fn line_count(&self) -> u32 {
            self.text
                .lock()
                .unwrap()
                .as_deref()
                .map_or(0, |t| t.lines().count() as u32)
        }

        fn color_scheme(&self) -> ColorScheme {
            ColorScheme::default()
        }

        fn visible_lines(&self) -> (u32, u32) {
            *self.visible.lock().unwrap()
        }

        fn scroll_to_line(&self, line: u32, animate: bool) {
            self.scrolls.lock().unwrap().push((line, animate));
        }
    }

    struct CountingClassifier(AtomicUsize);

    impl TokenClassifier for CountingClassifier {
        fn classify(&self, _text: &str) -> Result<Vec<TokenSpan>, ClassifyError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    /// Host that runs posted tasks inline and signals each repaint request.
    struct InlineHost {
        repaints: Sender<()>,
    }

    impl PanelHost for InlineHost {
        fn request_repaint(&self) {
            let _ = self.repaints.send(());
        }

        fn post(&self, task: Box<dyn FnOnce() + Send>) {
            task();
        }
    }

    fn host() -> (Arc<InlineHost>, Receiver<()>) {
        let (tx, rx) = channel();
        (Arc::new(InlineHost { repaints: tx }), rx)
    }

    fn wait_repaint(rx: &Receiver<()>) {
        rx.recv_timeout(Duration::from_secs(5))
            .expect("repaint requested");
    }

    #[test]
    fn preferred_width_is_a_tenth_capped_at_max() {
        assert_eq!(preferred_width(500), 50);
        assert_eq!(preferred_width(5000), MAX_WIDTH);
        assert_eq!(preferred_width(0), 0);
    }

    #[test]
    fn initial_render_publishes_a_buffer() {
        let runner = crate::task_runner::TaskRunner::start().unwrap();
        let (host, repaints) = host();
        let editor = FakeEditor::with_text("a\nb\nc");
        let panel = MinimapPanel::new(
            editor,
            Arc::new(CountingClassifier(AtomicUsize::new(0))),
            host,
            runner.handle(),
        );
        wait_repaint(&repaints);

        let buffer = panel.published.load_full().expect("published");
        assert_eq!(buffer.logical_height(), 6);
        assert_eq!(panel.lock_state().active, Some(0));
    }

    #[test]
    fn no_document_skips_the_render_and_stays_idle() {
        let runner = crate::task_runner::TaskRunner::start().unwrap();
        let (host, _repaints) = host();
        let classifier = Arc::new(CountingClassifier(AtomicUsize::new(0)));
        let panel = MinimapPanel::new(
            FakeEditor::empty(),
            Arc::clone(&classifier) as Arc<dyn TokenClassifier>,
            host,
            runner.handle(),
        );

        // drain the worker to prove nothing was submitted
        runner.shutdown();
        assert_eq!(classifier.0.load(Ordering::SeqCst), 0);
        assert_eq!(panel.lock_state().schedule, Schedule::Idle);
        assert!(panel.published.load_full().is_none());
    }

    #[test]
    fn successive_renders_alternate_slots() {
        let runner = crate::task_runner::TaskRunner::start().unwrap();
        let (host, repaints) = host();
        let editor = FakeEditor::with_text("one\ntwo");
        let panel = MinimapPanel::new(
            Arc::clone(&editor) as Arc<dyn EditorSource>,
            Arc::new(CountingClassifier(AtomicUsize::new(0))),
            host,
            runner.handle(),
        );
        wait_repaint(&repaints);
        assert_eq!(panel.lock_state().active, Some(0));

        panel.document_changed();
        wait_repaint(&repaints);
        assert_eq!(panel.lock_state().active, Some(1));

        panel.document_changed();
        wait_repaint(&repaints);
        let st = panel.lock_state();
        assert_eq!(st.active, Some(0));
        assert!(st.slots[0].is_some() && st.slots[1].is_some());
    }

    #[test]
    fn paint_without_a_buffer_draws_background_and_overlay_only() {
        let runner = crate::task_runner::TaskRunner::start().unwrap();
        let (host, _repaints) = host();
        let panel = MinimapPanel::new(
            FakeEditor::empty(),
            Arc::new(CountingClassifier(AtomicUsize::new(0))),
            host,
            runner.handle(),
        );

        let mut surface = PixelSurface::new(50, 100);
        panel.paint(&mut surface);
        let background = ColorScheme::default().background();
        // center pixel is plain background (overlay is zero-height here)
        assert_eq!(surface.pixel(25, 50), Some(background));
    }

    #[test]
    fn paint_overlays_the_visible_range() {
        let runner = crate::task_runner::TaskRunner::start().unwrap();
        let (host, repaints) = host();
        let editor = FakeEditor::with_text(&"x\n".repeat(40));
        *editor.visible.lock().unwrap() = (10, 20);
        let panel = MinimapPanel::new(
            Arc::clone(&editor) as Arc<dyn EditorSource>,
            Arc::new(CountingClassifier(AtomicUsize::new(0))),
            host,
            runner.handle(),
        );
        wait_repaint(&repaints);

        // 40 lines => logical 80 <= panel 100 => 1:1, overlay spans y 20..40
        let mut surface = PixelSurface::new(50, 100);
        panel.paint(&mut surface);
        let background = ColorScheme::default().background();
        let inside = surface.pixel(25, 30).unwrap();
        let outside = surface.pixel(25, 60).unwrap();
        assert_ne!(inside, background, "overlay fill should tint the pixel");
        assert_eq!(outside, background);
    }

    #[test]
    fn clicks_scroll_animated_and_drags_do_not() {
        let runner = crate::task_runner::TaskRunner::start().unwrap();
        let (host, repaints) = host();
        let editor = FakeEditor::with_text(&"x\n".repeat(10));
        let panel = MinimapPanel::new(
            Arc::clone(&editor) as Arc<dyn EditorSource>,
            Arc::new(CountingClassifier(AtomicUsize::new(0))),
            host,
            runner.handle(),
        );
        wait_repaint(&repaints);
        panel.resized(50, 200);

        // 10 lines, panel 200 => 1:1; y=6 maps to line 3
        panel.pointer_clicked(4, 6);
        panel.pointer_dragged(4, 6);
        panel.pointer_pressed(4, 6);

        let scrolls = editor.scrolls.lock().unwrap();
        assert_eq!(*scrolls, vec![(3, true), (3, false), (3, true)]);
    }

    #[test]
    fn resize_requests_repaint_but_never_a_render() {
        let runner = crate::task_runner::TaskRunner::start().unwrap();
        let (host, repaints) = host();
        let classifier = Arc::new(CountingClassifier(AtomicUsize::new(0)));
        let panel = MinimapPanel::new(
            FakeEditor::with_text("a"),
            Arc::clone(&classifier) as Arc<dyn TokenClassifier>,
            host,
            runner.handle(),
        );
        wait_repaint(&repaints);
        let renders_after_initial = classifier.0.load(Ordering::SeqCst);

        panel.resized(80, 400);
        panel.visible_area_changed();
        wait_repaint(&repaints);
        wait_repaint(&repaints);

        runner.shutdown();
        assert_eq!(classifier.0.load(Ordering::SeqCst), renders_after_initial);
    }
}
