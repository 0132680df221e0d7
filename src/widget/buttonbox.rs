//! Buttonbox - a grid of buttons, one of which is current.

use std::cell::RefCell;
use std::rc::Rc;

use super::{Common, Native, Widget, WidgetBase, resolve_dimension};
use crate::error::{Error, Result};
use crate::key::Key;
use crate::renderer::FrameBuffer;
use crate::screen::Screen;
use crate::text::{centered, string_width, truncate_to_width};
use crate::types::{Attr, ExitType, ObjectType, Rect, Size};

struct ButtonboxState {
    common: Common,
    rows: usize,
    cols: usize,
    buttons: Vec<String>,
    highlight: Attr,
    current: usize,
}

impl ButtonboxState {
    fn step(&mut self, delta: isize) {
        let len = self.buttons.len() as isize;
        self.current = (self.current as isize + delta).rem_euclid(len) as usize;
    }
}

impl Native for ButtonboxState {
    fn common(&self) -> &Common {
        &self.common
    }

    fn common_mut(&mut self) -> &mut Common {
        &mut self.common
    }

    fn draw_body(&self, buf: &mut FrameBuffer, area: Rect) {
        // Each column is followed by a one-cell gap, except the last.
        let col_width = ((area.width + 1) / self.cols as i32).max(1);
        let row_height = (area.height / self.rows as i32).max(1);
        for (i, button) in self.buttons.iter().enumerate() {
            let row = (i / self.cols) as i32;
            let col = (i % self.cols) as i32;
            let text = truncate_to_width(button, col_width - 1);
            let x = area.x + col * col_width + centered(col_width - 1, string_width(text));
            let y = area.y + row * row_height + (row_height - 1) / 2;
            let attrs = if i == self.current { self.highlight } else { Attr::NONE };
            buf.draw_text(x, y, text, attrs);
        }
    }

    fn inject(&mut self, key: Key) -> Option<ExitType> {
        let cols = self.cols as isize;
        match key {
            Key::Left => self.step(-1),
            Key::Right | Key::Char(' ') => self.step(1),
            Key::Up => self.step(-cols),
            Key::Down => self.step(cols),
            Key::Enter => return Some(ExitType::Normal),
            Key::Escape => return Some(ExitType::EscapeHit),
            _ => {}
        }
        None
    }

    fn clean(&mut self) {
        self.current = 0;
    }
}

/// Buttons laid out row by row in a `rows` × `cols` grid.
pub struct Buttonbox {
    base: WidgetBase,
    state: Rc<RefCell<ButtonboxState>>,
}

impl Buttonbox {
    /// Create a button box.
    ///
    /// A zero `height` or `width` sizes the box to fit its buttons; other
    /// values follow [`resolve_dimension`] against the screen.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        screen: &Screen,
        x: i32,
        y: i32,
        height: i32,
        width: i32,
        title: &str,
        rows: usize,
        cols: usize,
        buttons: &[&str],
        highlight: Attr,
        boxed: bool,
    ) -> Result<Self> {
        if buttons.is_empty() || rows == 0 || cols == 0 {
            tracing::warn!(rows, cols, buttons = buttons.len(), "button box without buttons");
            return Err(Error::resource(ObjectType::Buttonbox, "no buttons"));
        }
        if rows * cols < buttons.len() {
            tracing::warn!(rows, cols, buttons = buttons.len(), "button grid too small");
            return Err(Error::resource(
                ObjectType::Buttonbox,
                format!("{} buttons do not fit a {rows}x{cols} grid", buttons.len()),
            ));
        }

        let mut common = Common::new(screen, x, y, title, boxed);
        let widest = buttons.iter().map(|b| string_width(b)).max().unwrap_or(0);
        common.fit_body(Size::new(
            (widest + 1) * cols as i32 - 1,
            rows as i32,
        ));
        let natural = common.size;
        common.fit_outer(Size::new(
            if width == 0 { natural.width } else { resolve_dimension(screen.width() - x, width) },
            if height == 0 { natural.height } else { resolve_dimension(screen.height() - y, height) },
        ));

        let state = Rc::new(RefCell::new(ButtonboxState {
            common,
            rows,
            cols,
            buttons: buttons.iter().map(|s| s.to_string()).collect(),
            highlight,
            current: 0,
        }));
        let base = WidgetBase::new(screen, ObjectType::Buttonbox, state.clone())?;
        Ok(Self { base, state })
    }

    /// Index of the current button.
    pub fn value(&self) -> usize {
        self.state.borrow().current
    }

    /// Make `index` current and redraw. Out-of-range indices are ignored.
    pub fn set_value(&self, index: usize) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            if index >= state.buttons.len() {
                tracing::warn!(index, len = state.buttons.len(), "ignoring out-of-range button");
                return Ok(());
            }
            state.current = index;
        }
        self.base.redraw()
    }

    pub fn button_count(&self) -> usize {
        self.state.borrow().buttons.len()
    }
}

impl Widget for Buttonbox {
    fn base(&self) -> &WidgetBase {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::context::Context;
    use crate::key::parse_keys;

    fn screen() -> (Screen, MemoryBackend) {
        let backend = MemoryBackend::new(40, 10);
        let ctx = Context::new(backend.clone()).unwrap();
        (Screen::new(&ctx).unwrap(), backend)
    }

    fn grid(screen: &Screen) -> Buttonbox {
        Buttonbox::new(
            screen,
            0,
            0,
            0,
            0,
            "",
            2,
            3,
            &["A", "B", "C", "D", "E", "F"],
            Attr::INVERSE,
            true,
        )
        .unwrap()
    }

    fn run(bb: &Buttonbox, keys: &str) -> ExitType {
        bb.activate(Some(&parse_keys(keys).unwrap())).unwrap()
    }

    #[test]
    fn test_horizontal_moves_wrap() {
        let (screen, _) = screen();
        let bb = grid(&screen);
        assert_eq!(run(&bb, "<Left><Enter>"), ExitType::Normal);
        assert_eq!(bb.value(), 5);
        run(&bb, "<Right>");
        assert_eq!(bb.value(), 0);
    }

    #[test]
    fn test_vertical_moves_by_row() {
        let (screen, _) = screen();
        let bb = grid(&screen);
        run(&bb, "<Right><Down>");
        assert_eq!(bb.value(), 4);
        run(&bb, "<Down>");
        assert_eq!(bb.value(), 1);
        run(&bb, "<Up>");
        assert_eq!(bb.value(), 4);
    }

    #[test]
    fn test_natural_size_and_layout() {
        let (screen, backend) = screen();
        let bb = grid(&screen);
        assert_eq!(bb.size(), Size::new(7, 4));
        bb.draw(true).unwrap();
        assert_eq!(backend.row_text(1), "│A B C│");
        assert_eq!(backend.row_text(2), "│D E F│");
    }

    #[test]
    fn test_set_value() {
        let (screen, _) = screen();
        let bb = grid(&screen);
        bb.set_value(3).unwrap();
        assert_eq!(bb.value(), 3);
        bb.set_value(30).unwrap();
        assert_eq!(bb.value(), 3);
        bb.clear().unwrap();
        assert_eq!(bb.value(), 0);
    }

    #[test]
    fn test_invalid_grids() {
        let (screen, _) = screen();
        let none = Buttonbox::new(&screen, 0, 0, 0, 0, "", 1, 1, &[], Attr::NONE, true);
        assert!(matches!(none, Err(Error::ResourceCreation { kind: ObjectType::Buttonbox, .. })));

        let small = Buttonbox::new(&screen, 0, 0, 0, 0, "", 1, 2, &["a", "b", "c"], Attr::NONE, true);
        assert!(small.is_err());
    }
}
