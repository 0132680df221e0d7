//! Label - static, possibly multi-line text.

use std::cell::RefCell;
use std::rc::Rc;

use super::{Common, Native, Widget, WidgetBase};
use crate::error::Result;
use crate::key::Key;
use crate::renderer::FrameBuffer;
use crate::screen::Screen;
use crate::text::{join_rows, max_width, split_rows, truncate_to_width};
use crate::types::{Attr, ExitType, ObjectType, Rect, Size};

struct LabelState {
    common: Common,
    rows: Vec<String>,
}

impl Native for LabelState {
    fn common(&self) -> &Common {
        &self.common
    }

    fn common_mut(&mut self) -> &mut Common {
        &mut self.common
    }

    fn draw_body(&self, buf: &mut FrameBuffer, area: Rect) {
        for (i, row) in self.rows.iter().enumerate().take(area.height.max(0) as usize) {
            let row = truncate_to_width(row, area.width);
            buf.draw_text(area.x, area.y + i as i32, row, Attr::NONE);
        }
    }

    fn inject(&mut self, _key: Key) -> Option<ExitType> {
        Some(ExitType::Normal)
    }

    fn clean(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
    }
}

fn body_size(rows: &[String]) -> Size {
    Size::new(max_width(rows), rows.len() as i32)
}

/// Rows of text, one per `'\n'`-separated segment.
pub struct Label {
    base: WidgetBase,
    state: Rc<RefCell<LabelState>>,
}

impl Label {
    pub fn new(screen: &Screen, x: i32, y: i32, text: &str, boxed: bool) -> Result<Self> {
        let rows = split_rows(text);
        let mut common = Common::new(screen, x, y, "", boxed);
        common.fit_body(body_size(&rows));

        let state = Rc::new(RefCell::new(LabelState { common, rows }));
        let base = WidgetBase::new(screen, ObjectType::Label, state.clone())?;
        Ok(Self { base, state })
    }

    /// The text, rows joined by `'\n'`.
    pub fn value(&self) -> String {
        join_rows(&self.state.borrow().rows)
    }

    pub fn rows(&self) -> Vec<String> {
        self.state.borrow().rows.clone()
    }

    /// Replace the text, resizing the label to fit, and redraw.
    pub fn set_value(&self, text: &str) -> Result<()> {
        let rows = split_rows(text);
        let size = {
            let mut state = self.state.borrow_mut();
            let mut common = state.common.clone();
            common.fit_body(body_size(&rows));
            state.rows = rows;
            common.size
        };
        self.base.resize(size)?;
        self.base.redraw()
    }

    /// Wait for `key`, or for any key when `None`. Returns the key read.
    pub fn wait(&self, key: Option<char>) -> Result<Key> {
        self.base.redraw()?;
        let ctx = self.base.context();
        loop {
            let read = ctx.read_key()?;
            match key {
                None => return Ok(read),
                Some(c) if read == Key::Char(c) => return Ok(read),
                Some(_) => {}
            }
        }
    }
}

impl Widget for Label {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    /// Labels take no input: activation draws the label and completes.
    fn activate(&self, _actions: Option<&[Key]>) -> Result<ExitType> {
        let boxed = self.state.borrow().common.show_box;
        self.draw(boxed)?;
        self.state.borrow_mut().common.exit = ExitType::Normal;
        Ok(ExitType::Normal)
    }
}
