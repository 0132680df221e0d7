//! Entry - a one-line text field.

use std::cell::RefCell;
use std::rc::Rc;

use super::{Common, Native, Widget, WidgetBase, resolve_dimension};
use crate::error::{Error, Result};
use crate::key::Key;
use crate::renderer::FrameBuffer;
use crate::screen::Screen;
use crate::text::{char_width, string_width};
use crate::types::{Attr, DisplayType, ExitType, ObjectType, Rect, Size};

struct EntryState {
    common: Common,
    label: String,
    display: DisplayType,
    field_width: i32,
    min: usize,
    max: usize,
    filler: char,
    text: Vec<char>,
    cursor: usize,
}

impl EntryState {
    fn insert(&mut self, ch: char) {
        if self.max != 0 && self.text.len() >= self.max {
            return;
        }
        if self.display.accepts(ch, self.cursor) {
            self.text.insert(self.cursor, ch);
            self.cursor += 1;
        }
    }

    fn shown(&self) -> String {
        match self.display {
            DisplayType::Hidden => "*".repeat(self.text.len()),
            _ => self.text.iter().collect(),
        }
    }
}

impl Native for EntryState {
    fn common(&self) -> &Common {
        &self.common
    }

    fn common_mut(&mut self) -> &mut Common {
        &mut self.common
    }

    fn draw_body(&self, buf: &mut FrameBuffer, area: Rect) {
        let label_width = buf.draw_text(area.x, area.y, &self.label, Attr::NONE);
        let field_x = area.x + label_width;
        buf.hline(field_x, area.y, self.field_width, self.filler, Attr::UNDERLINE);

        // Scroll so the cursor stays inside the field.
        let shown: Vec<char> = self.shown().chars().collect();
        let mut start = 0;
        while start < self.cursor
            && shown[start..self.cursor].iter().map(|&c| char_width(c)).sum::<i32>() >= self.field_width
        {
            start += 1;
        }
        let mut col = field_x;
        for &ch in &shown[start..] {
            let w = char_width(ch);
            if col + w > field_x + self.field_width {
                break;
            }
            buf.set(col, area.y, ch, Attr::UNDERLINE);
            col += w.max(1);
        }
    }

    fn inject(&mut self, key: Key) -> Option<ExitType> {
        match key {
            Key::Char(ch) => self.insert(ch),
            Key::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.text.remove(self.cursor);
                }
            }
            Key::Delete => {
                if self.cursor < self.text.len() {
                    self.text.remove(self.cursor);
                }
            }
            Key::Left => self.cursor = self.cursor.saturating_sub(1),
            Key::Right => self.cursor = (self.cursor + 1).min(self.text.len()),
            Key::Home => self.cursor = 0,
            Key::End => self.cursor = self.text.len(),
            Key::Ctrl('u') => self.clean(),
            Key::Enter | Key::Tab => {
                if self.text.len() >= self.min {
                    return Some(ExitType::Normal);
                }
            }
            Key::Escape => return Some(ExitType::EscapeHit),
            _ => {}
        }
        None
    }

    fn clean(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn releases_focus(&self) -> bool {
        self.text.len() >= self.min
    }
}

/// A labelled text field.
pub struct Entry {
    base: WidgetBase,
    state: Rc<RefCell<EntryState>>,
}

impl Entry {
    /// Create an entry at `(x, y)` of `screen`.
    ///
    /// `field_width` follows [`resolve_dimension`] against the room left
    /// on the screen after the label. `min` is the shortest text `Enter`
    /// accepts; `max` is the longest text the field takes (0 for no limit).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        screen: &Screen,
        x: i32,
        y: i32,
        title: &str,
        label: &str,
        display: DisplayType,
        field_width: i32,
        min: usize,
        max: usize,
    ) -> Result<Self> {
        if max != 0 && min > max {
            tracing::warn!(min, max, "entry minimum exceeds maximum");
            return Err(Error::resource(ObjectType::Entry, format!("min {min} exceeds max {max}")));
        }

        let mut common = Common::new(screen, x, y, title, true);
        let label_width = string_width(label);
        let room = screen.width() - x - label_width - 2;
        let field_width = resolve_dimension(room, field_width).max(1);
        common.fit_body(Size::new(label_width + field_width, 1));

        let state = Rc::new(RefCell::new(EntryState {
            common,
            label: label.to_string(),
            display,
            field_width,
            min,
            max,
            filler: screen.context().config().entry_filler,
            text: Vec::new(),
            cursor: 0,
        }));
        let base = WidgetBase::new(screen, ObjectType::Entry, state.clone())?;
        Ok(Self { base, state })
    }

    pub fn value(&self) -> String {
        self.state.borrow().text.iter().collect()
    }

    /// Replace the text, cut to the maximum length, and redraw.
    pub fn set_value(&self, value: &str) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            let max = if state.max == 0 { usize::MAX } else { state.max };
            state.text = value.chars().take(max).collect();
            state.cursor = state.text.len();
        }
        self.base.redraw()
    }

    pub fn display_type(&self) -> DisplayType {
        self.state.borrow().display
    }

    pub fn field_width(&self) -> i32 {
        self.state.borrow().field_width
    }

    pub fn cursor(&self) -> usize {
        self.state.borrow().cursor
    }
}

impl Widget for Entry {
    fn base(&self) -> &WidgetBase {
        &self.base
    }
}
