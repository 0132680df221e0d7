//! Real terminal backend on top of crossterm.

use std::io::{self, Stdout};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};

use super::Backend;
use crate::error::{Error, Result};
use crate::key::Key;
use crate::renderer::{DiffRenderer, FrameBuffer};
use crate::types::Size;

/// Set while a [`CrosstermBackend`] owns the terminal. At most one may
/// exist per process.
static ACTIVE: AtomicBool = AtomicBool::new(false);

/// The process terminal in raw mode on the alternate screen.
///
/// The terminal is restored when the backend is dropped.
pub struct CrosstermBackend {
    renderer: DiffRenderer<Stdout>,
}

impl CrosstermBackend {
    /// Take over the terminal.
    ///
    /// Fails with [`Error::AlreadyInitialized`] while another backend is alive.
    pub fn new() -> Result<Self> {
        if ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::AlreadyInitialized);
        }

        if let Err(err) = enter() {
            let _ = restore();
            ACTIVE.store(false, Ordering::Release);
            return Err(err.into());
        }
        tracing::debug!("terminal entered raw mode");

        Ok(Self {
            renderer: DiffRenderer::new(io::stdout()),
        })
    }

    /// Whether a backend currently owns the terminal.
    pub fn is_active() -> bool {
        ACTIVE.load(Ordering::Acquire)
    }
}

impl Backend for CrosstermBackend {
    fn size(&self) -> io::Result<Size> {
        let (w, h) = terminal::size()?;
        Ok(Size::new(w as i32, h as i32))
    }

    fn draw(&mut self, frame: &FrameBuffer) -> io::Result<()> {
        self.renderer.render(frame).map(|_| ())
    }

    fn read_key(&mut self) -> io::Result<Key> {
        loop {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => return Ok(key.into()),
                Event::Resize(..) => self.renderer.invalidate(),
                _ => {}
            }
        }
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        if let Err(err) = restore() {
            tracing::warn!(%err, "failed to restore terminal");
        }
        ACTIVE.store(false, Ordering::Release);
        tracing::debug!("terminal restored");
    }
}

fn enter() -> io::Result<()> {
    terminal::enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, Hide)
}

fn restore() -> io::Result<()> {
    execute!(io::stdout(), Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()
}

/// Restore the terminal before the previous panic hook prints its message.
pub fn install_panic_hook() {
    let old = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if ACTIVE.load(Ordering::Acquire) {
            let _ = restore();
        }
        old(info);
    }));
}
