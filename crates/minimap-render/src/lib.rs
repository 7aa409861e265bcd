#![forbid(unsafe_code)]

//! Render kernel: raster buffers, the minimap render pass, and paint surfaces.
//!
//! # Role in the system
//! `minimap-render` is the deterministic half of the pipeline. It turns a
//! text snapshot plus a color scheme and a token classifier into an owned
//! [`RasterBuffer`], and defines the [`Surface`] every paint composites onto.
//!
//! # Primary responsibilities
//! - **RasterBuffer**: row-major RGBA grid, two pixel rows per source line,
//!   immutable once built.
//! - **render_minimap**: the pure render pass. Classifier failures degrade
//!   to a single-color render; the pass itself never fails.
//! - **Surface / PixelSurface**: paint-target contract plus a software
//!   implementation with clipping and source-over blending.
//!
//! # How it fits in the system
//! `minimap-runtime` runs `render_minimap` on a background worker and blits
//! the published buffer onto the host's `Surface` each paint. Buffers are
//! replace-then-publish: a reader never observes a partially drawn image.

pub mod raster;
pub mod surface;

pub use raster::{LINE_PIXEL_HEIGHT, RENDER_WIDTH, RasterBuffer, render_minimap};
pub use surface::{PixelSurface, Surface};
