//! Window - one native surface with terminal-absolute geometry.

use std::rc::Rc;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::key::Key;
use crate::registry::Handle;
use crate::types::{Attr, Point, Rect};

/// A rectangular region of the terminal.
///
/// All coordinates reported by a window are terminal-absolute, including
/// those of sub-windows.
pub struct Window {
    ctx: Rc<Context>,
    surface: Handle,
    rect: Rect,
    parent: Option<Rect>,
    main: bool,
}

impl Window {
    /// The window covering the whole terminal.
    ///
    /// Its surface belongs to the context and outlives every wrapper.
    pub fn main(ctx: &Rc<Context>) -> Self {
        Self {
            ctx: ctx.clone(),
            surface: ctx.main_surface(),
            rect: ctx.bounds(),
            parent: None,
            main: true,
        }
    }

    /// A new top-level window.
    ///
    /// A width or height of 0 extends the window to the right or bottom
    /// edge of the terminal.
    pub fn new(ctx: &Rc<Context>, rect: Rect) -> Result<Self> {
        let rect = resolve_region(ctx.bounds(), rect)?;
        let surface = ctx.create_surface(rect, None);
        tracing::debug!(%rect, %surface, "window created");
        Ok(Self {
            ctx: ctx.clone(),
            surface,
            rect,
            parent: None,
            main: false,
        })
    }

    /// A window inside `parent`.
    ///
    /// With `relative` set, `rect`'s origin is an offset from the parent's
    /// origin; otherwise it is terminal-absolute. The region must lie inside
    /// the parent.
    pub fn sub(parent: &Window, rect: Rect, relative: bool) -> Result<Self> {
        let rect = if relative {
            rect.translate(parent.x(), parent.y())
        } else {
            rect
        };
        let rect = resolve_region(parent.rect, rect)?;
        let surface = parent.ctx.create_surface(rect, Some(parent.surface));
        tracing::debug!(%rect, %surface, parent = %parent.surface, "sub-window created");
        Ok(Self {
            ctx: parent.ctx.clone(),
            surface,
            rect,
            parent: Some(parent.rect),
            main: false,
        })
    }

    pub fn x(&self) -> i32 {
        self.rect.x
    }

    pub fn y(&self) -> i32 {
        self.rect.y
    }

    pub fn width(&self) -> i32 {
        self.rect.width
    }

    pub fn height(&self) -> i32 {
        self.rect.height
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn origin(&self) -> Point {
        self.rect.origin()
    }

    pub fn is_sub_window(&self) -> bool {
        self.parent.is_some()
    }

    pub fn is_main(&self) -> bool {
        self.main
    }

    pub fn handle(&self) -> Handle {
        self.surface
    }

    pub fn context(&self) -> &Rc<Context> {
        &self.ctx
    }

    /// Move the window.
    ///
    /// With `relative` set, `(x, y)` is added to the current position.
    /// A destination outside the terminal (or the parent of a sub-window)
    /// fails and leaves the window where it was.
    pub fn move_to(&mut self, x: i32, y: i32, relative: bool) -> Result<()> {
        let (nx, ny) = if relative {
            (self.rect.x + x, self.rect.y + y)
        } else {
            (x, y)
        };
        let target = Rect::new(nx, ny, self.rect.width, self.rect.height);
        let bounds = self.parent.unwrap_or_else(|| self.ctx.bounds());
        if self.main || !bounds.contains_rect(&target) {
            tracing::warn!(x = nx, y = ny, "window move rejected");
            return Err(Error::OutOfBounds { x: nx, y: ny });
        }

        self.ctx.erase_region(self.rect);
        self.ctx.move_surface(self.surface, target.origin())?;
        self.rect = target;
        self.update()
    }

    /// Draw a border around the window edge and update it.
    pub fn draw_box(&self) -> Result<()> {
        let style = self.ctx.config().border_style;
        self.ctx.with_surface(self.surface, |buf, _| {
            let bounds = buf.bounds();
            buf.draw_border(bounds, style, Attr::NONE);
        })?;
        self.update()
    }

    /// Blank the window's content.
    pub fn clear(&self) -> Result<()> {
        self.ctx.with_surface(self.surface, |buf, _| buf.clear())
    }

    /// Push the window's content to the terminal.
    pub fn update(&self) -> Result<()> {
        self.ctx.refresh_surface(self.surface)?;
        self.ctx.present()
    }

    /// Read one key.
    pub fn get_key(&self) -> Result<Key> {
        self.ctx.read_key()
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        if !self.main {
            self.ctx.destroy_surface(self.surface);
        }
    }
}

/// Resolve zero sizes against `bounds` and check that the region fits.
fn resolve_region(bounds: Rect, rect: Rect) -> Result<Rect> {
    if rect.width < 0 || rect.height < 0 {
        return Err(Error::SurfaceCreation {
            rect,
            reason: "negative size",
        });
    }
    if !bounds.contains(rect.origin()) {
        return Err(Error::SurfaceCreation {
            rect,
            reason: "origin outside the parent region",
        });
    }

    let width = if rect.width == 0 { bounds.right() - rect.x } else { rect.width };
    let height = if rect.height == 0 { bounds.bottom() - rect.y } else { rect.height };
    let resolved = Rect::new(rect.x, rect.y, width, height);

    if !bounds.contains_rect(&resolved) {
        return Err(Error::SurfaceCreation {
            rect: resolved,
            reason: "region exceeds the parent region",
        });
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn context() -> (Rc<Context>, MemoryBackend) {
        let backend = MemoryBackend::new(40, 12);
        (Context::new(backend.clone()).unwrap(), backend)
    }

    #[test]
    fn test_main_window_spans_terminal() {
        let (ctx, _) = context();
        let main = Window::main(&ctx);
        assert!(main.is_main());
        assert_eq!(main.rect(), Rect::new(0, 0, 40, 12));
        drop(main);
        assert!(ctx.is_live(ctx.main_surface()));
    }

    #[test]
    fn test_zero_size_extends_to_edge() {
        let (ctx, _) = context();
        let win = Window::new(&ctx, Rect::new(10, 4, 0, 0)).unwrap();
        assert_eq!(win.rect(), Rect::new(10, 4, 30, 8));
    }

    #[test]
    fn test_invalid_regions_fail() {
        let (ctx, _) = context();
        assert!(matches!(
            Window::new(&ctx, Rect::new(0, 0, -1, 3)),
            Err(Error::SurfaceCreation { .. })
        ));
        assert!(matches!(
            Window::new(&ctx, Rect::new(45, 0, 2, 2)),
            Err(Error::SurfaceCreation { .. })
        ));
        assert!(matches!(
            Window::new(&ctx, Rect::new(35, 0, 10, 2)),
            Err(Error::SurfaceCreation { .. })
        ));
    }

    #[test]
    fn test_relative_sub_window_is_absolute() {
        let (ctx, _) = context();
        let parent = Window::new(&ctx, Rect::new(5, 2, 20, 8)).unwrap();
        let child = Window::sub(&parent, Rect::new(3, 1, 4, 2), true).unwrap();
        assert!(child.is_sub_window());
        assert_eq!((child.x(), child.y()), (8, 3));

        let absolute = Window::sub(&parent, Rect::new(6, 3, 0, 0), false).unwrap();
        assert_eq!(absolute.rect(), Rect::new(6, 3, 19, 7));

        assert!(Window::sub(&parent, Rect::new(18, 1, 5, 1), true).is_err());
    }

    #[test]
    fn test_move_relative_and_rejected() {
        let (ctx, _) = context();
        let mut win = Window::new(&ctx, Rect::new(2, 2, 5, 3)).unwrap();
        win.move_to(3, 1, true).unwrap();
        assert_eq!((win.x(), win.y()), (5, 3));

        win.move_to(0, 0, false).unwrap();
        assert_eq!(win.origin(), Point::ORIGIN);

        let err = win.move_to(38, 0, false).unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { x: 38, y: 0 }));
        assert_eq!(win.origin(), Point::ORIGIN);
    }

    #[test]
    fn test_draw_box_reaches_terminal() {
        let (ctx, backend) = context();
        let win = Window::new(&ctx, Rect::new(1, 1, 4, 3)).unwrap();
        win.draw_box().unwrap();
        assert_eq!(backend.row_text(1), " ┌──┐");
        assert_eq!(backend.row_text(3), " └──┘");
    }

    #[test]
    fn test_drop_releases_surface() {
        let (ctx, _) = context();
        let win = Window::new(&ctx, Rect::new(0, 0, 3, 3)).unwrap();
        let handle = win.handle();
        drop(win);
        assert!(!ctx.is_live(handle));
    }
}
