//! In-memory backend: scripted keys in, captured frames out.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use super::Backend;
use crate::key::{Key, KeyParseError, parse_keys};
use crate::renderer::FrameBuffer;
use crate::types::Size;

#[derive(Debug)]
struct MemoryState {
    size: Size,
    keys: VecDeque<Key>,
    frame: FrameBuffer,
    frames_drawn: usize,
}

/// A terminal that exists only in memory.
///
/// Clones share state, so a test can keep one clone to push keys and
/// inspect frames while the context owns the other.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryBackend {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            state: Rc::new(RefCell::new(MemoryState {
                size: Size::new(width, height),
                keys: VecDeque::new(),
                frame: FrameBuffer::new(width, height),
                frames_drawn: 0,
            })),
        }
    }

    /// Queue keys to be returned by `read_key`.
    pub fn push_keys(&self, keys: impl IntoIterator<Item = Key>) {
        self.state.borrow_mut().keys.extend(keys);
    }

    /// Queue a key sequence in preset notation, e.g. `"abc<Enter>"`.
    pub fn push_str(&self, keys: &str) -> Result<(), KeyParseError> {
        self.push_keys(parse_keys(keys)?);
        Ok(())
    }

    pub fn pending_keys(&self) -> usize {
        self.state.borrow().keys.len()
    }

    /// The last frame drawn.
    pub fn frame(&self) -> FrameBuffer {
        self.state.borrow().frame.clone()
    }

    pub fn frames_drawn(&self) -> usize {
        self.state.borrow().frames_drawn
    }

    pub fn row_text(&self, y: i32) -> String {
        self.state.borrow().frame.row_text(y)
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.state.borrow().frame.contains_text(needle)
    }
}

impl Backend for MemoryBackend {
    fn size(&self) -> io::Result<Size> {
        Ok(self.state.borrow().size)
    }

    fn draw(&mut self, frame: &FrameBuffer) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        state.frame = frame.clone();
        state.frames_drawn += 1;
        Ok(())
    }

    fn read_key(&mut self) -> io::Result<Key> {
        self.state
            .borrow_mut()
            .keys
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more scripted keys"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Attr;

    #[test]
    fn test_scripted_keys_then_eof() {
        let mut backend = MemoryBackend::new(10, 2);
        backend.push_str("a<Enter>").unwrap();
        assert_eq!(backend.pending_keys(), 2);

        assert_eq!(backend.read_key().unwrap(), Key::Char('a'));
        assert_eq!(backend.read_key().unwrap(), Key::Enter);
        let err = backend.read_key().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_clones_share_frames() {
        let probe = MemoryBackend::new(10, 2);
        let mut backend = probe.clone();

        let mut frame = FrameBuffer::new(10, 2);
        frame.draw_text(2, 1, "shown", Attr::NONE);
        backend.draw(&frame).unwrap();

        assert_eq!(probe.frames_drawn(), 1);
        assert_eq!(probe.row_text(1), "  shown");
        assert!(probe.contains_text("shown"));
        assert_eq!(probe.size().unwrap(), Size::new(10, 2));
    }
}
