//! Context - The toolkit instance
//!
//! A [`Context`] owns everything that would otherwise be process-global:
//! the terminal backend, the configuration, the native handle table, the
//! native surfaces, the [`ObjectRegistry`] and the virtual screen that
//! surfaces are composed into before being pushed to the terminal.
//!
//! Contexts are shared as `Rc<Context>` and keep their state in `RefCell`s,
//! so no toolkit object can leave the thread that created it.
//!
//! # Surfaces
//!
//! A surface is a rectangle of cells at a terminal-absolute origin. Drawing
//! happens in the surface's own buffer; [`Context::refresh_surface`] copies
//! it into the virtual screen and [`Context::present`] sends the virtual
//! screen to the backend.

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use spark_signals::{Signal, signal};

use crate::backend::{Backend, CrosstermBackend};
use crate::config::TkConfig;
use crate::error::{Error, Result};
use crate::key::Key;
use crate::registry::{Flow, Handle, HandleKind, HandleTable, KeyHandler, ObjectRegistry};
use crate::renderer::FrameBuffer;
use crate::types::{Point, Rect, Size};

// =============================================================================
// SURFACES
// =============================================================================

struct Surface {
    origin: Point,
    buffer: FrameBuffer,
    parent: Option<Handle>,
}

impl Surface {
    fn rect(&self) -> Rect {
        Rect::from_parts(self.origin, self.buffer.size())
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// One toolkit instance bound to one backend.
pub struct Context {
    backend: RefCell<Box<dyn Backend>>,
    config: TkConfig,
    size: Size,
    handles: RefCell<HandleTable>,
    registry: RefCell<ObjectRegistry>,
    surfaces: RefCell<HashMap<Handle, Surface>>,
    screen: RefCell<FrameBuffer>,
    main_surface: Handle,
    last_key: Signal<Option<Key>>,
}

impl Context {
    /// Create a context over `backend` with default configuration.
    pub fn new(backend: impl Backend + 'static) -> Result<Rc<Self>> {
        Self::with_config(backend, TkConfig::default())
    }

    /// Create a context over `backend`.
    pub fn with_config(backend: impl Backend + 'static, config: TkConfig) -> Result<Rc<Self>> {
        let size = backend.size()?;
        let mut handles = HandleTable::new();
        let main_surface = handles.allocate(HandleKind::Surface);

        let mut surfaces = HashMap::new();
        surfaces.insert(
            main_surface,
            Surface {
                origin: Point::ORIGIN,
                buffer: FrameBuffer::new(size.width, size.height),
                parent: None,
            },
        );
        tracing::debug!(width = size.width, height = size.height, "context created");

        Ok(Rc::new(Self {
            backend: RefCell::new(Box::new(backend)),
            config,
            size,
            handles: RefCell::new(handles),
            registry: RefCell::new(ObjectRegistry::new()),
            surfaces: RefCell::new(surfaces),
            screen: RefCell::new(FrameBuffer::new(size.width, size.height)),
            main_surface,
            last_key: signal(None),
        }))
    }

    /// Take over the process terminal, configured from the environment.
    pub fn terminal() -> Result<Rc<Self>> {
        Self::with_config(CrosstermBackend::new()?, TkConfig::from_env())
    }

    pub fn config(&self) -> &TkConfig {
        &self.config
    }

    /// Terminal size, fixed when the context was created.
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_parts(Point::ORIGIN, self.size)
    }

    /// The surface covering the whole terminal.
    pub fn main_surface(&self) -> Handle {
        self.main_surface
    }

    // -------------------------------------------------------------------------
    // Handles
    // -------------------------------------------------------------------------

    pub fn allocate_handle(&self, kind: HandleKind) -> Handle {
        let handle = self.handles.borrow_mut().allocate(kind);
        tracing::trace!(%handle, ?kind, "handle allocated");
        handle
    }

    /// Release `handle` and run its destroy callbacks.
    ///
    /// Returns false when the handle was not live.
    pub fn release_handle(&self, handle: Handle) -> bool {
        let callbacks = self.handles.borrow_mut().release(handle);
        let Some(callbacks) = callbacks else {
            return false;
        };
        tracing::trace!(%handle, "handle released");
        for callback in callbacks {
            callback(handle);
        }
        true
    }

    pub fn is_live(&self, handle: Handle) -> bool {
        self.handles.borrow().is_live(handle)
    }

    pub fn handle_kind(&self, handle: Handle) -> Option<HandleKind> {
        self.handles.borrow().kind(handle)
    }

    pub fn live_handles(&self) -> Vec<Handle> {
        self.handles.borrow().live_handles()
    }

    /// Run `callback` when `handle` is released.
    pub fn on_destroy(&self, handle: Handle, callback: impl FnOnce(Handle) + 'static) -> bool {
        self.handles.borrow_mut().on_destroy(handle, Box::new(callback))
    }

    // -------------------------------------------------------------------------
    // Object registry
    // -------------------------------------------------------------------------

    /// Read access to the registry.
    pub fn registry(&self) -> Ref<'_, ObjectRegistry> {
        self.registry.borrow()
    }

    pub fn register_handler(&self, handle: Handle, handler: &Rc<dyn KeyHandler>) -> bool {
        let replaced = self.registry.borrow_mut().register(handle, handler);
        if replaced {
            tracing::debug!(%handle, "key handler replaced");
        }
        replaced
    }

    pub fn unregister_handler(&self, handle: Handle) -> bool {
        self.registry.borrow_mut().unregister(handle)
    }

    pub fn lookup_handler(&self, handle: Handle) -> Option<Rc<dyn KeyHandler>> {
        self.registry.borrow().lookup(handle)
    }

    // -------------------------------------------------------------------------
    // Surfaces
    // -------------------------------------------------------------------------

    /// Allocate a surface covering `rect` (terminal-absolute).
    pub fn create_surface(&self, rect: Rect, parent: Option<Handle>) -> Handle {
        let handle = self.allocate_handle(HandleKind::Surface);
        self.surfaces.borrow_mut().insert(
            handle,
            Surface {
                origin: rect.origin(),
                buffer: FrameBuffer::new(rect.width, rect.height),
                parent,
            },
        );
        handle
    }

    /// Release a surface. The main surface is never released.
    pub fn destroy_surface(&self, handle: Handle) {
        if handle == self.main_surface {
            return;
        }
        self.surfaces.borrow_mut().remove(&handle);
        self.release_handle(handle);
    }

    pub fn surface_rect(&self, handle: Handle) -> Result<Rect> {
        self.surfaces
            .borrow()
            .get(&handle)
            .map(Surface::rect)
            .ok_or(Error::StaleHandle(handle))
    }

    pub fn surface_parent(&self, handle: Handle) -> Result<Option<Handle>> {
        self.surfaces
            .borrow()
            .get(&handle)
            .map(|s| s.parent)
            .ok_or(Error::StaleHandle(handle))
    }

    /// Set the terminal-absolute origin of a surface.
    pub fn move_surface(&self, handle: Handle, origin: Point) -> Result<()> {
        let mut surfaces = self.surfaces.borrow_mut();
        let surface = surfaces.get_mut(&handle).ok_or(Error::StaleHandle(handle))?;
        surface.origin = origin;
        Ok(())
    }

    /// Give a surface a new size, blanking its content.
    pub fn resize_surface(&self, handle: Handle, size: Size) -> Result<()> {
        let mut surfaces = self.surfaces.borrow_mut();
        let surface = surfaces.get_mut(&handle).ok_or(Error::StaleHandle(handle))?;
        surface.buffer.resize(size.width, size.height);
        Ok(())
    }

    /// Run `f` on a surface's buffer. `f` also receives the surface origin.
    pub fn with_surface<R>(&self, handle: Handle, f: impl FnOnce(&mut FrameBuffer, Point) -> R) -> Result<R> {
        let mut surfaces = self.surfaces.borrow_mut();
        let surface = surfaces.get_mut(&handle).ok_or(Error::StaleHandle(handle))?;
        Ok(f(&mut surface.buffer, surface.origin))
    }

    /// Copy a surface into the virtual screen.
    pub fn refresh_surface(&self, handle: Handle) -> Result<()> {
        let surfaces = self.surfaces.borrow();
        let surface = surfaces.get(&handle).ok_or(Error::StaleHandle(handle))?;
        self.screen.borrow_mut().blit(&surface.buffer, surface.origin);
        Ok(())
    }

    /// Blank a terminal-absolute region of the virtual screen.
    pub fn erase_region(&self, rect: Rect) {
        self.screen
            .borrow_mut()
            .fill(rect, ' ', crate::types::Attr::NONE);
    }

    /// Copy a terminal-absolute region of the virtual screen.
    pub fn capture_region(&self, rect: Rect) -> FrameBuffer {
        self.screen.borrow().region(rect)
    }

    /// Put back a region taken with [`Context::capture_region`].
    pub fn restore_region(&self, saved: &FrameBuffer, at: Point) {
        self.screen.borrow_mut().blit(saved, at);
    }

    /// Send the virtual screen to the backend.
    pub fn present(&self) -> Result<()> {
        let screen = self.screen.borrow();
        self.backend.borrow_mut().draw(&screen)?;
        Ok(())
    }

    /// Copy the virtual screen, as it would be presented.
    pub fn snapshot(&self) -> FrameBuffer {
        self.screen.borrow().clone()
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    /// Block until the next key and record it as the last key.
    pub fn read_key(&self) -> Result<Key> {
        let key = self.backend.borrow_mut().read_key()?;
        self.last_key.set(Some(key));
        Ok(key)
    }

    /// Record a key that was fed to a widget from a preset sequence.
    pub(crate) fn note_key(&self, key: Key) {
        self.last_key.set(Some(key));
    }

    /// The most recent key processed.
    pub fn last_key(&self) -> Option<Key> {
        self.last_key.get()
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        tracing::debug!(live = self.handles.borrow().live_count(), "context dropped");
    }
}

// =============================================================================
// HOOK TRAMPOLINES
// =============================================================================

/// Run the pre-process hook registered for `handle`.
///
/// A handle without a live registry entry lets the key through.
pub fn pre_handler(ctx: &Context, handle: Handle, key: Key) -> Flow {
    match ctx.lookup_handler(handle) {
        Some(handler) => handler.pre_process(key),
        None => {
            tracing::debug!(%handle, %key, "no key handler registered");
            Flow::Proceed
        }
    }
}

/// Run the post-process hook registered for `handle`.
pub fn post_handler(ctx: &Context, handle: Handle, key: Key) -> Flow {
    match ctx.lookup_handler(handle) {
        Some(handler) => handler.post_process(key),
        None => {
            tracing::debug!(%handle, %key, "no key handler registered");
            Flow::Proceed
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::types::Attr;
    use std::cell::Cell;

    fn context() -> (Rc<Context>, MemoryBackend) {
        let backend = MemoryBackend::new(20, 6);
        (Context::new(backend.clone()).unwrap(), backend)
    }

    struct Gate(Flow);

    impl KeyHandler for Gate {
        fn pre_process(&self, _: Key) -> Flow {
            self.0
        }
        fn post_process(&self, _: Key) -> Flow {
            Flow::Exit
        }
    }

    #[test]
    fn test_main_surface_covers_terminal() {
        let (ctx, _) = context();
        assert_eq!(ctx.surface_rect(ctx.main_surface()).unwrap(), Rect::new(0, 0, 20, 6));
        ctx.destroy_surface(ctx.main_surface());
        assert!(ctx.is_live(ctx.main_surface()));
    }

    #[test]
    fn test_surface_draw_refresh_present() {
        let (ctx, backend) = context();
        let s = ctx.create_surface(Rect::new(3, 2, 5, 1), None);
        ctx.with_surface(s, |buf, _| buf.draw_text(0, 0, "hello", Attr::NONE))
            .unwrap();

        ctx.present().unwrap();
        assert!(!backend.contains_text("hello"));

        ctx.refresh_surface(s).unwrap();
        ctx.present().unwrap();
        assert_eq!(backend.row_text(2), "   hello");
    }

    #[test]
    fn test_destroyed_surface_is_stale() {
        let (ctx, _) = context();
        let s = ctx.create_surface(Rect::new(0, 0, 2, 2), None);
        ctx.destroy_surface(s);
        assert!(matches!(ctx.surface_rect(s), Err(Error::StaleHandle(h)) if h == s));
        assert!(!ctx.is_live(s));
    }

    #[test]
    fn test_release_runs_destroy_callbacks_once() {
        let (ctx, _) = context();
        let h = ctx.allocate_handle(HandleKind::Screen);
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        ctx.on_destroy(h, move |_| count_clone.set(count_clone.get() + 1));

        assert!(ctx.release_handle(h));
        assert!(!ctx.release_handle(h));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_trampolines_dispatch_and_miss() {
        let (ctx, _) = context();
        let h = ctx.allocate_handle(HandleKind::Screen);

        assert_eq!(pre_handler(&ctx, h, Key::Enter), Flow::Proceed);

        let handler: Rc<dyn KeyHandler> = Rc::new(Gate(Flow::Consume));
        ctx.register_handler(h, &handler);
        assert_eq!(pre_handler(&ctx, h, Key::Enter), Flow::Consume);
        assert_eq!(post_handler(&ctx, h, Key::Enter), Flow::Exit);

        ctx.unregister_handler(h);
        assert_eq!(post_handler(&ctx, h, Key::Enter), Flow::Proceed);
    }

    #[test]
    fn test_read_key_updates_last_key() {
        let (ctx, backend) = context();
        assert_eq!(ctx.last_key(), None);
        backend.push_str("x").unwrap();
        assert_eq!(ctx.read_key().unwrap(), Key::Char('x'));
        assert_eq!(ctx.last_key(), Some(Key::Char('x')));
        assert!(matches!(ctx.read_key(), Err(Error::Io(_))));
    }
}
