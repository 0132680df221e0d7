//! Differential renderer.
//!
//! The DiffRenderer compares the current frame to the previous frame and only
//! outputs cells that have changed, so redrawing an unchanged screen writes
//! nothing to the terminal.
//!
//! # Algorithm
//!
//! 1. For each cell in the new frame:
//!    - If the previous frame has the same size and the cell is unchanged: skip
//!    - Otherwise: move the cursor (unless it is already there), switch
//!      attributes (unless they are already active) and print the cell
//! 2. Flush the writer once
//! 3. Store the current frame as previous for the next comparison

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Print, SetAttribute};

use super::buffer::{CONTINUATION, FrameBuffer};
use crate::types::{Attr, Cell};

/// Differential renderer writing crossterm commands to `W`.
pub struct DiffRenderer<W: Write> {
    out: W,
    previous: Option<FrameBuffer>,
    cursor: Option<(i32, i32)>,
    attrs: Attr,
}

impl<W: Write> DiffRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            previous: None,
            cursor: None,
            attrs: Attr::NONE,
        }
    }

    /// Render a frame, outputting only changed cells.
    ///
    /// Returns true if any cells were changed.
    pub fn render(&mut self, buffer: &FrameBuffer) -> io::Result<bool> {
        let previous = self
            .previous
            .take()
            .filter(|prev| prev.size() == buffer.size());

        let mut has_changes = false;
        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                let Some(cell) = buffer.get(x, y) else {
                    continue;
                };
                let changed = match &previous {
                    Some(prev) => prev.get(x, y) != Some(cell),
                    None => true,
                };
                if changed {
                    has_changes = true;
                    self.render_cell(x, y, cell)?;
                }
            }
        }

        if has_changes {
            self.reset_attrs()?;
        }
        self.out.flush()?;
        self.previous = Some(buffer.clone());

        Ok(has_changes)
    }

    /// Force a full redraw (no diffing).
    pub fn render_full(&mut self, buffer: &FrameBuffer) -> io::Result<()> {
        self.invalidate();
        self.render(buffer).map(|_| ())
    }

    /// Invalidate the previous frame.
    ///
    /// Next render will be a full redraw.
    pub fn invalidate(&mut self) {
        self.previous = None;
        self.cursor = None;
    }

    /// Check if we have a previous frame to diff against.
    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }

    fn render_cell(&mut self, x: i32, y: i32, cell: &Cell) -> io::Result<()> {
        // The wide character to the left already covers this column.
        if cell.ch == CONTINUATION {
            self.cursor = None;
            return Ok(());
        }

        if self.cursor != Some((x, y)) {
            queue!(self.out, MoveTo(x as u16, y as u16))?;
        }
        if cell.attrs != self.attrs {
            self.apply_attrs(cell.attrs)?;
        }
        queue!(self.out, Print(cell.ch))?;
        self.cursor = Some((x + crate::text::char_width(cell.ch).max(1), y));
        Ok(())
    }

    fn apply_attrs(&mut self, attrs: Attr) -> io::Result<()> {
        queue!(self.out, SetAttribute(Attribute::Reset))?;
        for (flag, attribute) in ATTRIBUTE_MAP {
            if attrs.contains(flag) {
                queue!(self.out, SetAttribute(attribute))?;
            }
        }
        self.attrs = attrs;
        Ok(())
    }

    fn reset_attrs(&mut self) -> io::Result<()> {
        if self.attrs != Attr::NONE {
            queue!(self.out, SetAttribute(Attribute::Reset))?;
            self.attrs = Attr::NONE;
        }
        Ok(())
    }
}

const ATTRIBUTE_MAP: [(Attr, Attribute); 8] = [
    (Attr::BOLD, Attribute::Bold),
    (Attr::DIM, Attribute::Dim),
    (Attr::ITALIC, Attribute::Italic),
    (Attr::UNDERLINE, Attribute::Underlined),
    (Attr::BLINK, Attribute::SlowBlink),
    (Attr::INVERSE, Attribute::Reverse),
    (Attr::HIDDEN, Attribute::Hidden),
    (Attr::STRIKETHROUGH, Attribute::CrossedOut),
];

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(text: &str) -> FrameBuffer {
        let mut buf = FrameBuffer::new(8, 2);
        buf.draw_text(0, 0, text, Attr::NONE);
        buf
    }

    #[test]
    fn test_diff_renderer_creation() {
        let renderer = DiffRenderer::new(Vec::new());
        assert!(!renderer.has_previous());
    }

    #[test]
    fn test_first_render_writes_everything() {
        let mut renderer = DiffRenderer::new(Vec::new());
        assert!(renderer.render(&frame("hi")).unwrap());
        assert!(renderer.has_previous());
        let out = String::from_utf8_lossy(renderer.writer()).to_string();
        assert!(out.contains("hi"));
    }

    #[test]
    fn test_unchanged_frame_emits_nothing() {
        let mut renderer = DiffRenderer::new(Vec::new());
        renderer.render(&frame("hi")).unwrap();
        renderer.writer_mut().clear();

        assert!(!renderer.render(&frame("hi")).unwrap());
        assert!(renderer.writer().is_empty());
    }

    #[test]
    fn test_only_changed_cells_are_written() {
        let mut renderer = DiffRenderer::new(Vec::new());
        renderer.render(&frame("abc")).unwrap();
        renderer.writer_mut().clear();

        assert!(renderer.render(&frame("abX")).unwrap());
        let out = String::from_utf8_lossy(renderer.writer()).to_string();
        assert!(out.contains('X'));
        assert!(!out.contains('a'));
    }

    #[test]
    fn test_invalidate_forces_full_redraw() {
        let mut renderer = DiffRenderer::new(Vec::new());
        renderer.render(&frame("same")).unwrap();
        renderer.invalidate();
        renderer.writer_mut().clear();

        assert!(renderer.render(&frame("same")).unwrap());
        let out = String::from_utf8_lossy(renderer.writer()).to_string();
        assert!(out.contains("same"));
    }

    #[test]
    fn test_attributes_are_emitted() {
        let mut buf = FrameBuffer::new(3, 1);
        buf.draw_text(0, 0, "b", Attr::BOLD);
        let mut renderer = DiffRenderer::new(Vec::new());
        renderer.render(&buf).unwrap();
        let out = String::from_utf8_lossy(renderer.writer()).to_string();
        assert!(out.contains("\x1b[1m"));
    }
}
