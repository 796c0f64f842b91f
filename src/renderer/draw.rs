//! Log renderer
//!
//! Composites the ring buffer into one or more text columns of a surface.
//! Rendering runs bottom-up: the newest message lands in the bottom line of
//! the rightmost column, older messages stack above it, and a full column
//! continues at the bottom of the column to its left. Starting from the
//! newest message means no line has to be measured before it is drawn except
//! the message currently being placed.
//!
//! A logical message (head line plus its continuations) is re-wrapped to the
//! column width. Its last screen line is the partial one: text stays
//! left-aligned and the trailing cells are cleared.
//!
//! Whatever was not painted when the walk ends (screen full, log exhausted,
//! or lines shortened under us by a best-effort writer) is cleared to the
//! background, so every render overwrites the whole surface.

use super::font::Font;
use super::glyph::draw_glyph;
use super::pixel::{Color, Encoded};
use super::surface::Surface;
use crate::core::{Entry, RingBuffer};

/// Minimum number of cells per column
pub const MIN_COLUMN_CELLS: usize = 80;

/// Default separator width between columns, in pixels
pub const DEFAULT_COLUMN_PADDING: usize = 5;

/// Column geometry derived from a surface and a font
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Number of columns after clamping
    pub columns: usize,
    /// Cells per screen line
    pub chars_per_line: usize,
    /// Width of the text area of one column in pixels
    pub column_width: usize,
    /// Distance between the left edges of two columns in pixels
    pub column_pitch: usize,
    /// Screen lines per column
    pub lines_per_column: usize,
    /// Screen lines over all columns
    pub lines_per_screen: usize,
    /// Separator width in pixels
    pub padding: usize,
}

impl ColumnLayout {
    /// Compute the layout of `requested` columns over a `width` x `height`
    /// surface.
    ///
    /// The column count is reduced until every column, separators
    /// included, is at least [`MIN_COLUMN_CELLS`] cells wide, but never
    /// below one.
    pub fn compute(
        width: usize,
        height: usize,
        requested: usize,
        font: &Font,
        padding: usize,
    ) -> Self {
        let fw = font.width().max(1);
        let fh = font.height().max(1);

        let fit = (width + padding) / (fw * MIN_COLUMN_CELLS + padding);
        let columns = requested.min(fit).max(1);
        let text_width = width.saturating_sub(padding * (columns - 1)) / columns;
        let chars_per_line = text_width / fw;
        let column_width = chars_per_line * fw;
        let column_pitch = column_width + padding;
        let lines_per_column = height / fh;

        Self {
            columns,
            chars_per_line,
            column_width,
            column_pitch,
            lines_per_column,
            lines_per_screen: lines_per_column * columns,
            padding,
        }
    }
}

/// Walk position: which screen line the next message line goes to
struct Cursor {
    line: usize,
    column: usize,
    column_line: usize,
}

/// Render `buf` into `surface`.
///
/// Never allocates and never blocks. Unsupported formats are a no-op.
pub fn render(buf: &RingBuffer, font: &Font, surface: &mut Surface<'_>, padding: usize) {
    render_entries(buf.entries(), buf, font, surface, padding);
}

fn render_entries<I>(
    entries: I,
    buf: &RingBuffer,
    font: &Font,
    surface: &mut Surface<'_>,
    padding: usize,
) where
    I: Iterator<Item = Entry>,
{
    let format = surface.format();
    let (Some(bg), Some(fg)) = (format.encode(Color::BLACK), format.encode(Color::WHITE)) else {
        return;
    };

    let layout = ColumnLayout::compute(
        surface.width(),
        surface.height(),
        surface.geometry().columns,
        font,
        padding,
    );

    let mut cursor = Cursor {
        line: 0,
        column: 0,
        column_line: 0,
    };
    if layout.chars_per_line > 0 {
        draw_lines(entries, buf, font, surface, &layout, &mut cursor, &bg, &fg);
    }
    clear_unpainted(font, surface, &layout, &cursor, &bg);
}

#[allow(clippy::too_many_arguments)]
fn draw_lines<I>(
    entries: I,
    buf: &RingBuffer,
    font: &Font,
    surface: &mut Surface<'_>,
    layout: &ColumnLayout,
    cursor: &mut Cursor,
    bg: &Encoded,
    fg: &Encoded,
) where
    I: Iterator<Item = Entry>,
{
    let (fw, fh) = (font.width(), font.height());
    let cpl = layout.chars_per_line;

    for entry in entries {
        if cursor.line >= layout.lines_per_screen {
            return;
        }

        let needed = entry.len.div_ceil(cpl);
        let tail = entry.len % cpl;
        let blanks = if tail == 0 { 0 } else { cpl - tail };
        let mut chars = entry.chars_rev(buf);

        for k in 0..needed {
            let x0 = (layout.columns - cursor.column - 1) * layout.column_pitch;
            let y0 = (layout.lines_per_column - cursor.column_line - 1) * fh;

            // The first line drawn is the bottom one, which holds the tail
            let skip = if k == 0 { blanks } else { 0 };
            if skip > 0 {
                surface.fill(x0 + (cpl - skip) * fw, y0, skip * fw, fh, bg);
            }

            for l in skip..cpl {
                let Some(ch) = chars.next() else {
                    // Lines got shorter since measuring; the next render fixes it
                    return;
                };
                let x = x0 + (cpl - l - 1) * fw;
                surface.fill(x, y0, fw, fh, bg);
                draw_glyph(surface, font, ch, x, y0, fg);
            }

            cursor.column_line += 1;
            if cursor.column_line >= layout.lines_per_column {
                cursor.column_line = 0;
                cursor.column += 1;
            }

            cursor.line += 1;
            if cursor.line >= layout.lines_per_screen {
                return;
            }
        }
    }
}

fn clear_unpainted(
    font: &Font,
    surface: &mut Surface<'_>,
    layout: &ColumnLayout,
    cursor: &Cursor,
    bg: &Encoded,
) {
    let (width, height) = (surface.width(), surface.height());
    let fh = font.height();
    let mut column = cursor.column;

    // Rest of the partially used column, including a line cut short
    if cursor.column_line > 0 && column < layout.columns {
        let x = (layout.columns - column - 1) * layout.column_pitch;
        let rows = (layout.lines_per_column - cursor.column_line) * fh;
        surface.fill(x, 0, layout.column_width, rows, bg);
        column += 1;
    }

    // Columns never reached
    if column < layout.columns {
        let span = (layout.columns - column) * layout.column_pitch;
        surface.fill(0, 0, span.min(width), height, bg);
    }

    // Right margin
    let used = layout.columns * layout.column_pitch - layout.padding;
    if used < width {
        surface.fill(used, 0, width - used, height, bg);
    }

    // Bottom margin
    let used = layout.lines_per_column * fh;
    if used < height {
        surface.fill(0, used, width, height - used, bg);
    }

    for k in 1..layout.columns {
        let x = k * layout.column_pitch - layout.padding;
        surface.fill(x, 0, layout.padding, height, bg);
    }
}
