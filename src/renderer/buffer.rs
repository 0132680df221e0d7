//! FrameBuffer and drawing primitives.
//!
//! The FrameBuffer is a 2D grid of Cells. Native surfaces are frame buffers,
//! and so is the composed image the backend pushes to the terminal.
//!
//! Coordinates are signed; anything outside the buffer is clipped, so
//! callers never have to pre-clip widget geometry. Wide characters occupy
//! two cells, the second holding the continuation marker `'\0'`.

use crate::text::char_width;
use crate::types::{Attr, BorderStyle, Cell, Point, Rect, Size};

/// Character stored in the second cell of a wide character.
pub const CONTINUATION: char = '\0';

/// A 2D buffer of terminal cells.
///
/// Uses flat storage with row-major indexing: `index = y * width + x`
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// Create a new buffer filled with blank cells.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Get the full buffer bounds.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Check if coordinates are in bounds.
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Get a cell reference (returns None if out of bounds).
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// Get a mutable cell reference (returns None if out of bounds).
    #[inline]
    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    /// Raw cells, row-major.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Clear the entire buffer to blank cells.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    /// Resize the buffer (clears content).
    pub fn resize(&mut self, width: i32, height: i32) {
        *self = FrameBuffer::new(width, height);
    }

    // =========================================================================
    // Drawing Primitives
    // =========================================================================

    /// Set a single cell. Returns true if the cell was inside the buffer.
    pub fn set(&mut self, x: i32, y: i32, ch: char, attrs: Attr) -> bool {
        match self.get_mut(x, y) {
            Some(cell) => {
                *cell = Cell::new(ch, attrs);
                true
            }
            None => false,
        }
    }

    /// Fill a rectangle with one character.
    pub fn fill(&mut self, rect: Rect, ch: char, attrs: Attr) {
        let Some(area) = rect.intersect(&self.bounds()) else {
            return;
        };
        for y in area.y..area.bottom() {
            let start = self.index(area.x, y);
            let end = self.index(area.right(), y);
            self.cells[start..end].fill(Cell::new(ch, attrs));
        }
    }

    /// Draw text at a position.
    ///
    /// Returns the number of cells the text spans (handles wide characters),
    /// whether or not they were clipped.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, attrs: Attr) -> i32 {
        let mut col = x;

        for ch in text.chars() {
            let width = char_width(ch);
            if width == 0 {
                continue;
            }
            if col >= self.width {
                break;
            }

            self.set(col, y, ch, attrs);
            if width == 2 {
                self.set(col + 1, y, CONTINUATION, attrs);
            }

            col += width;
        }

        col - x
    }

    /// Draw a horizontal run of `ch`.
    pub fn hline(&mut self, x: i32, y: i32, len: i32, ch: char, attrs: Attr) {
        self.fill(Rect::new(x, y, len, 1), ch, attrs);
    }

    /// Draw a vertical run of `ch`.
    pub fn vline(&mut self, x: i32, y: i32, len: i32, ch: char, attrs: Attr) {
        self.fill(Rect::new(x, y, 1, len), ch, attrs);
    }

    /// Draw a border around a rectangle.
    pub fn draw_border(&mut self, rect: Rect, style: BorderStyle, attrs: Attr) {
        if rect.width < 2 || rect.height < 2 {
            return;
        }

        let (horiz, vert, tl, tr, br, bl) = style.chars();
        let x2 = rect.right() - 1;
        let y2 = rect.bottom() - 1;

        self.hline(rect.x + 1, rect.y, rect.width - 2, horiz, attrs);
        self.hline(rect.x + 1, y2, rect.width - 2, horiz, attrs);
        self.vline(rect.x, rect.y + 1, rect.height - 2, vert, attrs);
        self.vline(x2, rect.y + 1, rect.height - 2, vert, attrs);

        self.set(rect.x, rect.y, tl, attrs);
        self.set(x2, rect.y, tr, attrs);
        self.set(x2, y2, br, attrs);
        self.set(rect.x, y2, bl, attrs);
    }

    /// Copy `src` into this buffer with its top-left corner at `at`.
    pub fn blit(&mut self, src: &FrameBuffer, at: Point) {
        let target = Rect::from_parts(at, src.size());
        let Some(area) = target.intersect(&self.bounds()) else {
            return;
        };
        for y in area.y..area.bottom() {
            let sy = y - at.y;
            let sx = area.x - at.x;
            let src_start = src.index(sx, sy);
            let dst_start = self.index(area.x, y);
            let len = area.width as usize;
            self.cells[dst_start..dst_start + len]
                .copy_from_slice(&src.cells[src_start..src_start + len]);
        }
    }

    /// Copy the cells of `rect`; cells outside this buffer come out blank.
    pub fn region(&self, rect: Rect) -> FrameBuffer {
        let mut out = FrameBuffer::new(rect.width, rect.height);
        out.blit(self, Point::new(-rect.x, -rect.y));
        out
    }

    /// Text of row `y` with continuation cells removed and trailing blanks trimmed.
    pub fn row_text(&self, y: i32) -> String {
        if y < 0 || y >= self.height {
            return String::new();
        }
        let start = self.index(0, y);
        let end = start + self.width as usize;
        let text: String = self.cells[start..end]
            .iter()
            .filter(|c| c.ch != CONTINUATION)
            .map(|c| c.ch)
            .collect();
        text.trim_end().to_string()
    }

    /// All rows as text, one string per row.
    pub fn lines(&self) -> Vec<String> {
        (0..self.height).map(|y| self.row_text(y)).collect()
    }

    /// Check if any row contains `needle`.
    pub fn contains_text(&self, needle: &str) -> bool {
        (0..self.height).any(|y| self.row_text(y).contains(needle))
    }
}

// =============================================================================
// Tests
// =============================================================================
