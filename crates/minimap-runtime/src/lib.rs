#![forbid(unsafe_code)]

//! Async minimap pipeline: worker, jobs, and the panel controller.
//!
//! # Role in the system
//! `minimap-runtime` keeps the rendered minimap, the viewport overlay, and
//! the pixel↔line coordinate mapping synchronized with the editor without
//! ever blocking the interactive thread.
//!
//! # Primary responsibilities
//! - **TaskRunner**: one background worker executing [`RenderJob`]s strictly
//!   in submission order, one at a time. A single runner is shared by every
//!   panel in the process and injected, never a singleton.
//! - **MinimapPanel**: the double-buffered controller. Update requests are
//!   coalesced through an `Idle | Pending | PendingDirty` state machine so
//!   at most one job is ever in flight and the latest document state is
//!   always eventually rendered.
//! - **coords**: the pure 1:1 / compressed coordinate mapping.
//!
//! # Threading
//! Two threads matter: the interactive thread (input, paint, scheduling)
//! and the worker. Shared controller state lives behind one mutex scoped
//! tightly around check-and-set transitions; the published buffer is an
//! atomically swapped handle so paint never contends with scheduling.
//! Completion crosses back to the interactive thread through
//! [`PanelHost::post`].

pub mod coords;
pub mod job;
pub mod panel;
pub mod task_runner;

pub use job::{JobOutcome, RenderJob};
pub use panel::{MAX_WIDTH, MinimapPanel, PanelHost, preferred_width};
pub use task_runner::{RunnerHandle, SubmitError, TaskRunner};
