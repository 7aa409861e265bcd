#![forbid(unsafe_code)]

//! Render jobs.
//!
//! A [`RenderJob`] bundles everything one render pass needs — an owned text
//! snapshot, a color-scheme snapshot, the classifier handle — plus the slot
//! it targets and a completion continuation. The snapshot is taken at
//! scheduling time, so a job never races concurrent edits; edits arriving
//! mid-render are coalesced into the next job instead.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use minimap_core::color::ColorScheme;
use minimap_core::token::TokenClassifier;
use minimap_render::raster::{RasterBuffer, render_minimap};
use tracing::error;

/// Result of one executed job, handed to the completion continuation.
#[derive(Debug)]
pub struct JobOutcome {
    /// Monotonic job sequence number, for in-flight accounting and logs.
    pub seq: u64,
    /// The buffer slot this job targeted.
    pub slot: usize,
    /// The rendered buffer, or `None` if the render panicked.
    pub buffer: Option<RasterBuffer>,
}

/// A unit of work for the [`TaskRunner`](crate::task_runner::TaskRunner).
pub struct RenderJob {
    seq: u64,
    slot: usize,
    text: String,
    scheme: ColorScheme,
    classifier: Arc<dyn TokenClassifier>,
    done: Box<dyn FnOnce(JobOutcome) + Send>,
}

impl RenderJob {
    /// Bundle a render pass targeting `slot`.
    ///
    /// `done` fires exactly once, on the worker thread, after the pass
    /// finishes — whether or not it produced a buffer.
    pub fn new(
        seq: u64,
        slot: usize,
        text: String,
        scheme: ColorScheme,
        classifier: Arc<dyn TokenClassifier>,
        done: impl FnOnce(JobOutcome) + Send + 'static,
    ) -> Self {
        Self {
            seq,
            slot,
            text,
            scheme,
            classifier,
            done: Box::new(done),
        }
    }

    /// Job sequence number.
    #[inline]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Execute the render pass and fire the completion continuation.
    ///
    /// Classifier errors are already absorbed inside `render_minimap`; a
    /// panic anywhere in the pass is caught here so a poisoned render can
    /// never stall the worker or leak an unfired continuation.
    pub(crate) fn run(self) {
        let Self {
            seq,
            slot,
            text,
            scheme,
            classifier,
            done,
        } = self;

        let rendered = panic::catch_unwind(AssertUnwindSafe(|| {
            render_minimap(&text, &scheme, classifier.as_ref())
        }));
        let buffer = match rendered {
            Ok(buffer) => Some(buffer),
            Err(_) => {
                error!(seq, slot, "render job panicked, completing without an image");
                None
            }
        };

        done(JobOutcome { seq, slot, buffer });
    }
}

impl std::fmt::Debug for RenderJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderJob")
            .field("seq", &self.seq)
            .field("slot", &self.slot)
            .field("text_len", &self.text.len())
            .finish_non_exhaustive()
    }
}
