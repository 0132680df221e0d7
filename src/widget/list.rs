//! Scrolling cursor shared by the list widgets.

use crate::key::Key;
use crate::renderer::FrameBuffer;
use crate::types::{Attr, Rect, ScrollBar};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ListCursor {
    pub current: usize,
    pub top: usize,
    pub len: usize,
}

impl ListCursor {
    pub fn new(len: usize) -> Self {
        Self { current: 0, top: 0, len }
    }

    /// Apply a navigation key. Returns false when the key is not a
    /// navigation key.
    pub fn navigate(&mut self, key: Key, view: usize) -> bool {
        let page = view.max(1);
        match key {
            Key::Up => self.current = self.current.saturating_sub(1),
            Key::Down => self.current = (self.current + 1).min(self.last()),
            Key::PageUp => self.current = self.current.saturating_sub(page),
            Key::PageDown => self.current = (self.current + page).min(self.last()),
            Key::Home => self.current = 0,
            Key::End => self.current = self.last(),
            _ => return false,
        }
        self.scroll_into_view(view);
        true
    }

    pub fn set_current(&mut self, index: usize, view: usize) {
        self.current = index.min(self.last());
        self.scroll_into_view(view);
    }

    /// Replace the list length, keeping the cursor in range.
    pub fn reset(&mut self, len: usize) {
        *self = Self::new(len);
    }

    fn last(&self) -> usize {
        self.len.saturating_sub(1)
    }

    fn scroll_into_view(&mut self, view: usize) {
        let view = view.max(1);
        if self.current < self.top {
            self.top = self.current;
        } else if self.current >= self.top + view {
            self.top = self.current + 1 - view;
        }
    }

    /// Indices visible in a view of `view` rows, paired with their row.
    pub fn visible(&self, view: usize) -> impl Iterator<Item = (usize, usize)> {
        let end = (self.top + view).min(self.len);
        (self.top..end).enumerate()
    }
}

/// Split a list body into the item column and the optional scroll bar column.
pub(crate) fn split_scrollbar(area: Rect, bar: ScrollBar) -> (Rect, Option<i32>) {
    if area.width < 2 {
        return (area, None);
    }
    match bar {
        ScrollBar::None => (area, None),
        ScrollBar::Left => (
            Rect::new(area.x + 1, area.y, area.width - 1, area.height),
            Some(area.x),
        ),
        ScrollBar::Right => (
            Rect::new(area.x, area.y, area.width - 1, area.height),
            Some(area.right() - 1),
        ),
    }
}

/// Draw a scroll bar whose thumb marks the current item.
pub(crate) fn draw_scrollbar(buf: &mut FrameBuffer, x: i32, area: Rect, cursor: &ListCursor) {
    if area.height <= 0 {
        return;
    }
    buf.vline(x, area.y, area.height, '│', Attr::NONE);
    let thumb = if cursor.len <= 1 {
        0
    } else {
        (cursor.current as i32 * (area.height - 1)) / (cursor.len as i32 - 1)
    };
    buf.set(x, area.y + thumb, '█', Attr::NONE);
}
