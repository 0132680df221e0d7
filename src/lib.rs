//! # cdk-tui
//!
//! Curses-style dialog widgets for the terminal.
//!
//! A [`Context`] owns the terminal (or an in-memory backend for tests), the
//! handle table and the object registry. Windows are rectangular surfaces
//! on the context's virtual screen; a [`Screen`] groups widgets on one
//! window and moves the focus between them.
//!
//! ```text
//! Context ─┬─ HandleTable     (live native objects)
//!          ├─ ObjectRegistry  (handle → key hooks)
//!          └─ surfaces ──▶ virtual screen ──▶ Backend
//!
//! Screen ── Window
//!    └── widgets: Entry, Menu, Label, Radio, FSlider,
//!                 Buttonbox, Selection, FileSelector
//! ```
//!
//! Widget coordinates are relative to their screen. Every widget reaches
//! its per-keystroke hooks through the registry, so a handler registered
//! with [`Widget::set_key_handler`] replaces the default one.
//!
//! ## Modules
//!
//! - [`types`] - Geometry, attributes, object and exit types
//! - [`context`] - The toolkit context and the hook trampolines
//! - [`window`] - Rectangular drawing surfaces
//! - [`screen`] - Widget containers, focus and dialogs
//! - [`widget`] - The widget variants
//! - [`renderer`] - Frame buffers and diff rendering
//! - [`backend`] - Terminal and in-memory backends

pub mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod key;
pub mod registry;
pub mod renderer;
pub mod screen;
pub mod text;
pub mod types;
pub mod widget;
pub mod window;

pub use types::*;

pub use backend::{Backend, CrosstermBackend, MemoryBackend, install_panic_hook};
pub use config::TkConfig;
pub use context::Context;
pub use error::{Error, Result};
pub use key::{Key, parse_keys};
pub use registry::{Flow, Handle, HandleKind, KeyHandler, ObjectRegistry};
pub use renderer::FrameBuffer;
pub use screen::{Screen, ScreenCallback};
pub use widget::fslider::FSliderParams;
pub use widget::{
    Buttonbox, Entry, FSlider, FileSelector, Label, Menu, MenuLocation, MenuPosition, Radio,
    Selection, Widget, WidgetRef,
};
pub use window::Window;
