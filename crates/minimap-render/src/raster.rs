#![forbid(unsafe_code)]

//! The minimap render pass.
//!
//! One source line maps to [`LINE_PIXEL_HEIGHT`] pixel rows; one display
//! column maps to one pixel column, truncated at [`RENDER_WIDTH`]. The pass
//! is pure: the same text, scheme, and classifier output produce the same
//! buffer. Paint scales the result to the panel, so the raster width is
//! fixed regardless of panel size.

use minimap_core::color::{ColorScheme, Rgba};
use minimap_core::token::{TokenClassifier, TokenKind, TokenSpan};
use smallvec::SmallVec;
use tracing::warn;
use unicode_width::UnicodeWidthChar;

/// Pixel rows per source line.
pub const LINE_PIXEL_HEIGHT: u32 = 2;

/// Fixed raster width in pixels; longer lines are truncated.
pub const RENDER_WIDTH: u32 = 100;

/// Columns per tab stop.
const TAB_STOP: u32 = 4;

/// A rendered minimap image.
///
/// Row-major RGBA grid plus the logical content height in mapped pixel
/// units. The grid height equals the logical height; the logical height may
/// exceed the panel height, in which case paint scrolls within the raster.
/// Buffers are immutable after construction and published wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl RasterBuffer {
    fn filled(width: u32, height: u32, color: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Grid width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Logical content height in mapped pixel units.
    #[inline]
    pub fn logical_height(&self) -> u32 {
        self.height
    }

    /// Sample a pixel, or `None` outside the grid.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    #[inline]
    fn set_run(&mut self, y: u32, x0: u32, x1: u32, color: Rgba) {
        let x1 = x1.min(self.width);
        if y >= self.height || x0 >= x1 {
            return;
        }
        let row = (y * self.width) as usize;
        self.pixels[row + x0 as usize..row + x1 as usize].fill(color);
    }
}

/// A horizontal run of same-colored columns within one line.
type Run = (u32, u32, Rgba);

/// Render `text` into a fresh [`RasterBuffer`].
///
/// Non-blank display columns take the classified token's foreground from
/// `scheme`; everything else keeps the scheme background. If the classifier
/// fails, the failure is logged and the whole text renders with the default
/// foreground — a single-color minimap beats no minimap.
///
/// Empty text yields a zero-height buffer.
pub fn render_minimap(
    text: &str,
    scheme: &ColorScheme,
    classifier: &dyn TokenClassifier,
) -> RasterBuffer {
    let line_count = text.lines().count() as u32;
    let mut buffer = RasterBuffer::filled(
        RENDER_WIDTH,
        line_count * LINE_PIXEL_HEIGHT,
        scheme.background(),
    );

    let spans = match classifier.classify(text) {
        Ok(mut spans) => {
            spans.sort_by_key(|s| s.range.start);
            spans
        }
        Err(error) => {
            warn!(%error, "classifier failed, rendering unclassified");
            Vec::new()
        }
    };
    let mut lookup = SpanLookup::new(&spans);

    // Runs are accumulated per line and stamped into both of the line's
    // pixel rows at once. Most lines hold a handful of tokens, so the run
    // list stays inline.
    let mut runs: SmallVec<[Run; 8]> = SmallVec::new();
    let mut line: u32 = 0;
    let mut col: u32 = 0;

    for (offset, ch) in text.char_indices() {
        match ch {
            '\n' => {
                flush_line(&mut buffer, line, &runs);
                runs.clear();
                line += 1;
                col = 0;
            }
            '\t' => {
                col = (col / TAB_STOP + 1) * TAB_STOP;
            }
            _ => {
                let advance = ch.width().unwrap_or(0) as u32;
                if !ch.is_whitespace() && advance > 0 && col < RENDER_WIDTH {
                    let color = scheme.foreground(lookup.kind_at(offset));
                    push_run(&mut runs, col, col + advance, color);
                }
                col += advance;
            }
        }
    }
    flush_line(&mut buffer, line, &runs);

    buffer
}

fn push_run(runs: &mut SmallVec<[Run; 8]>, x0: u32, x1: u32, color: Rgba) {
    if let Some(last) = runs.last_mut()
        && last.1 == x0
        && last.2 == color
    {
        last.1 = x1;
        return;
    }
    runs.push((x0, x1, color));
}

fn flush_line(buffer: &mut RasterBuffer, line: u32, runs: &[Run]) {
    let y = line * LINE_PIXEL_HEIGHT;
    for &(x0, x1, color) in runs {
        for dy in 0..LINE_PIXEL_HEIGHT {
            buffer.set_run(y + dy, x0, x1, color);
        }
    }
}

/// Cursor over spans sorted by start offset.
///
/// `kind_at` is called with monotonically increasing offsets, so the cursor
/// only ever moves forward.
struct SpanLookup<'a> {
    spans: &'a [TokenSpan],
    idx: usize,
}

impl<'a> SpanLookup<'a> {
    fn new(spans: &'a [TokenSpan]) -> Self {
        Self { spans, idx: 0 }
    }

    fn kind_at(&mut self, offset: usize) -> TokenKind {
        while let Some(span) = self.spans.get(self.idx) {
            if span.range.end > offset {
                break;
            }
            self.idx += 1;
        }
        match self.spans.get(self.idx) {
            Some(span) if span.range.start <= offset => span.kind,
            _ => TokenKind::Plain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minimap_core::token::ClassifyError;

    struct PlainClassifier;

    impl TokenClassifier for PlainClassifier {
        fn classify(&self, text: &str) -> Result<Vec<TokenSpan>, ClassifyError> {
            Ok(vec![TokenSpan::new(0..text.len(), TokenKind::Plain)])
        }
    }

    struct FailingClassifier;

    impl TokenClassifier for FailingClassifier {
        fn classify(&self, _text: &str) -> Result<Vec<TokenSpan>, ClassifyError> {
            Err(ClassifyError::new("broken grammar"))
        }
    }

    struct KeywordPrefix(usize);

    impl TokenClassifier for KeywordPrefix {
        fn classify(&self, _text: &str) -> Result<Vec<TokenSpan>, ClassifyError> {
            Ok(vec![TokenSpan::new(0..self.0, TokenKind::Keyword)])
        }
    }

    fn scheme() -> ColorScheme {
        let mut scheme = ColorScheme::new(Rgba::rgb(0, 0, 0), Rgba::rgb(200, 200, 200));
        scheme.set_token_color(TokenKind::Keyword, Rgba::rgb(255, 0, 0));
        scheme
    }

    #[test]
    fn height_is_two_pixels_per_line() {
        let buf = render_minimap("a\nb\nc", &scheme(), &PlainClassifier);
        assert_eq!(buf.height(), 6);
        assert_eq!(buf.logical_height(), 6);
        assert_eq!(buf.width(), RENDER_WIDTH);
    }

    #[test]
    fn empty_text_yields_minimal_buffer() {
        let buf = render_minimap("", &scheme(), &PlainClassifier);
        assert_eq!(buf.height(), 0);
        assert_eq!(buf.pixel(0, 0), None);
    }

    #[test]
    fn both_pixel_rows_of_a_line_are_stamped() {
        let buf = render_minimap("x", &scheme(), &PlainClassifier);
        assert_eq!(buf.pixel(0, 0), Some(Rgba::rgb(200, 200, 200)));
        assert_eq!(buf.pixel(0, 1), Some(Rgba::rgb(200, 200, 200)));
        assert_eq!(buf.pixel(1, 0), Some(Rgba::rgb(0, 0, 0)));
    }

    #[test]
    fn token_spans_pick_scheme_colors() {
        // "fn main" with the first two bytes classified as a keyword.
        let buf = render_minimap("fn main", &scheme(), &KeywordPrefix(2));
        assert_eq!(buf.pixel(0, 0), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(buf.pixel(1, 0), Some(Rgba::rgb(255, 0, 0)));
        // space column keeps the background
        assert_eq!(buf.pixel(2, 0), Some(Rgba::rgb(0, 0, 0)));
        assert_eq!(buf.pixel(3, 0), Some(Rgba::rgb(200, 200, 200)));
    }

    #[test]
    fn classifier_failure_degrades_to_single_color() {
        let buf = render_minimap("let x = 1;", &scheme(), &FailingClassifier);
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.pixel(0, 0), Some(Rgba::rgb(200, 200, 200)));
        assert_eq!(buf.pixel(4, 0), Some(Rgba::rgb(200, 200, 200)));
    }

    #[test]
    fn tabs_advance_to_the_next_stop() {
        let buf = render_minimap("\tx", &scheme(), &PlainClassifier);
        for col in 0..4 {
            assert_eq!(buf.pixel(col, 0), Some(Rgba::rgb(0, 0, 0)), "col {col}");
        }
        assert_eq!(buf.pixel(4, 0), Some(Rgba::rgb(200, 200, 200)));
    }

    #[test]
    fn wide_characters_occupy_two_columns() {
        let buf = render_minimap("中x", &scheme(), &PlainClassifier);
        assert_eq!(buf.pixel(0, 0), Some(Rgba::rgb(200, 200, 200)));
        assert_eq!(buf.pixel(1, 0), Some(Rgba::rgb(200, 200, 200)));
        assert_eq!(buf.pixel(2, 0), Some(Rgba::rgb(200, 200, 200)));
    }

    #[test]
    fn long_lines_truncate_at_render_width() {
        let text = "x".repeat(300);
        let buf = render_minimap(&text, &scheme(), &PlainClassifier);
        assert_eq!(buf.width(), RENDER_WIDTH);
        assert_eq!(
            buf.pixel(RENDER_WIDTH - 1, 0),
            Some(Rgba::rgb(200, 200, 200))
        );
        assert_eq!(buf.pixel(RENDER_WIDTH, 0), None);
    }

    #[test]
    fn same_inputs_produce_equal_buffers() {
        let a = render_minimap("fn main() {}\n", &scheme(), &KeywordPrefix(2));
        let b = render_minimap("fn main() {}\n", &scheme(), &KeywordPrefix(2));
        assert_eq!(a, b);
    }
}
