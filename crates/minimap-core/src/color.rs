#![forbid(unsafe_code)]

//! RGBA color and color-scheme snapshots.
//!
//! A [`ColorScheme`] is a value snapshot of the editor's current theme: a
//! background, a default foreground, and per-token-kind foreground
//! overrides. Render jobs copy the scheme at scheduling time so a theme
//! switch mid-render can't tear the raster.

use ahash::AHashMap;

use crate::token::TokenKind;

/// An 8-bit-per-channel RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Fully opaque color from RGB components.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from RGBA components.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The same color with a replaced alpha channel.
    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Fully transparent black.
    pub const TRANSPARENT: Rgba = Rgba::rgba(0, 0, 0, 0);

    /// Source-over blend of `self` onto `dst`.
    ///
    /// The destination is treated as opaque (paint always lays down an
    /// opaque background first); a translucent source mixes the color
    /// channels and the result is opaque.
    #[must_use]
    pub fn over(self, dst: Rgba) -> Rgba {
        match self.a {
            255 => self,
            0 => dst,
            a => {
                let blend = |s: u8, d: u8| -> u8 {
                    let s = u32::from(s) * u32::from(a);
                    let d = u32::from(d) * (255 - u32::from(a));
                    ((s + d + 127) / 255) as u8
                };
                Rgba::rgb(
                    blend(self.r, dst.r),
                    blend(self.g, dst.g),
                    blend(self.b, dst.b),
                )
            }
        }
    }
}

/// Snapshot of the editor theme used for one render pass.
#[derive(Debug, Clone)]
pub struct ColorScheme {
    background: Rgba,
    default_foreground: Rgba,
    token_colors: AHashMap<TokenKind, Rgba>,
}

impl ColorScheme {
    /// A scheme with no per-token overrides.
    pub fn new(background: Rgba, default_foreground: Rgba) -> Self {
        Self {
            background,
            default_foreground,
            token_colors: AHashMap::new(),
        }
    }

    /// Register a foreground for a token kind, replacing any previous entry.
    pub fn set_token_color(&mut self, kind: TokenKind, color: Rgba) {
        self.token_colors.insert(kind, color);
    }

    /// The editor background color.
    #[inline]
    pub fn background(&self) -> Rgba {
        self.background
    }

    /// The foreground used when a token kind has no override.
    #[inline]
    pub fn default_foreground(&self) -> Rgba {
        self.default_foreground
    }

    /// Resolve the foreground for a token kind.
    #[inline]
    pub fn foreground(&self, kind: TokenKind) -> Rgba {
        self.token_colors
            .get(&kind)
            .copied()
            .unwrap_or(self.default_foreground)
    }
}

impl Default for ColorScheme {
    /// A dark-theme placeholder scheme.
    fn default() -> Self {
        Self::new(Rgba::rgb(30, 30, 30), Rgba::rgb(212, 212, 212))
    }
}
