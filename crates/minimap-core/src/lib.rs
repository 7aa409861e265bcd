#![forbid(unsafe_code)]

//! Shared vocabulary for the minimap pipeline.
//!
//! # Role in the system
//! `minimap-core` is the dependency-light base layer. It defines the pixel
//! geometry, color, and color-scheme types the render kernel draws with, and
//! the capability traits the host must satisfy: where document text comes
//! from ([`EditorSource`]) and how it is classified into colored spans
//! ([`TokenClassifier`]).
//!
//! # How it fits in the system
//! `minimap-render` consumes these types to build raster images;
//! `minimap-runtime` uses the provider traits to take snapshots and to push
//! scroll commands back to the editor. Nothing in this crate spawns threads
//! or performs I/O.

pub mod color;
pub mod editor;
pub mod geometry;
pub mod token;

pub use color::{ColorScheme, Rgba};
pub use editor::EditorSource;
pub use geometry::Rect;
pub use token::{ClassifyError, TokenClassifier, TokenKind, TokenSpan};
