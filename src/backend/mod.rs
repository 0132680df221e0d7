//! Backend Module - The seam between the toolkit and a terminal
//!
//! The toolkit never talks to the terminal directly. It composes a
//! [`FrameBuffer`] and hands it to a [`Backend`], and reads keys back from it.
//!
//! - [`CrosstermBackend`]: a real terminal in raw mode on the alternate screen
//! - [`MemoryBackend`]: scripted keys and captured frames, for automation and tests

pub mod terminal;
pub mod memory;

use std::io;

use crate::key::Key;
use crate::renderer::FrameBuffer;
use crate::types::Size;

pub use self::terminal::{CrosstermBackend, install_panic_hook};
pub use self::memory::MemoryBackend;

/// Terminal I/O used by a [`Context`](crate::Context).
pub trait Backend {
    /// Current terminal size in cells.
    fn size(&self) -> io::Result<Size>;

    /// Show `frame` on the terminal.
    fn draw(&mut self, frame: &FrameBuffer) -> io::Result<()>;

    /// Block until the next key press.
    fn read_key(&mut self) -> io::Result<Key>;
}
