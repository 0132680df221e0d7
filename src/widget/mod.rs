//! Widget Module - Interactive controls bound to a screen
//!
//! Every widget owns a native object: a handle, a surface the size of the
//! widget, and the variant's state. The toolkit reaches the widget's
//! per-keystroke hooks through the context's [`ObjectRegistry`], keyed by
//! the handle.
//!
//! # Key pipeline
//!
//! For every key fed to a widget:
//!
//! 1. the registered handler's `pre_process` runs ([`Flow::Consume`] drops
//!    the key, [`Flow::Exit`] ends the activation with `EarlyExit`)
//! 2. the variant handles the key and is redrawn
//! 3. unless the key completed the widget, the handler's `post_process`
//!    runs ([`Flow::Exit`] ends the activation with `EarlyExit`)
//!
//! The default handler runs the closures given to
//! [`Widget::set_pre_process`] and [`Widget::register_callback`], then
//! forwards post-processing to the owning screen's callback.
//!
//! [`ObjectRegistry`]: crate::registry::ObjectRegistry

pub mod buttonbox;
pub mod entry;
pub mod fselect;
pub mod fslider;
pub mod label;
mod list;
pub mod menu;
pub mod radio;
pub mod selection;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::context::{Context, post_handler, pre_handler};
use crate::error::{Error, Result};
use crate::key::Key;
use crate::registry::{Flow, Handle, HandleKind, KeyHandler};
use crate::renderer::FrameBuffer;
use crate::screen::{Screen, ScreenInner, ScreenObject};
use crate::text::{centered, split_rows, string_width, truncate_to_width};
use crate::types::{Attr, BorderStyle, ExitType, ObjectType, Point, Rect, Size};

pub use buttonbox::Buttonbox;
pub use entry::Entry;
pub use fselect::FileSelector;
pub use fslider::FSlider;
pub use label::Label;
pub use menu::{Menu, MenuLocation, MenuPosition};
pub use radio::Radio;
pub use selection::Selection;

// =============================================================================
// GEOMETRY
// =============================================================================

/// Resolve a requested widget dimension against the space available.
///
/// `0` takes all of `parent`, a negative value leaves that many cells of
/// `parent` unused, and anything larger than `parent` is cut to `parent`.
pub fn resolve_dimension(parent: i32, requested: i32) -> i32 {
    if requested == 0 {
        parent
    } else if requested < 0 {
        (parent + requested).max(0)
    } else {
        requested.min(parent)
    }
}

/// Identity of a widget as seen by callbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WidgetRef {
    pub handle: Handle,
    pub obj_type: ObjectType,
}

// =============================================================================
// NATIVE STATE
// =============================================================================

/// Geometry and decoration shared by every variant.
#[derive(Debug, Clone)]
pub(crate) struct Common {
    /// Origin of the owning screen when the widget was created.
    pub anchor: Point,
    /// Position relative to `anchor`.
    pub rel: Point,
    pub size: Size,
    /// Whether room was reserved for a border.
    pub boxed: bool,
    /// Whether the border is currently drawn.
    pub show_box: bool,
    pub title: Vec<String>,
    pub border: BorderStyle,
    pub exit: ExitType,
}

impl Common {
    pub fn new(screen: &Screen, x: i32, y: i32, title: &str, boxed: bool) -> Self {
        let title = if title.is_empty() { Vec::new() } else { split_rows(title) };
        Self {
            anchor: screen.origin(),
            rel: Point::new(x, y),
            size: Size::default(),
            boxed,
            show_box: boxed,
            title,
            border: screen.context().config().border_style,
            exit: ExitType::NeverActivated,
        }
    }

    fn border_width(&self) -> i32 {
        if self.boxed { 1 } else { 0 }
    }

    fn title_rows(&self) -> i32 {
        self.title.len() as i32
    }

    /// Width of the widest title row.
    pub fn title_width(&self) -> i32 {
        self.title.iter().map(|r| string_width(r)).max().unwrap_or(0)
    }

    /// Size the widget around a body of `body` cells.
    pub fn fit_body(&mut self, body: Size) {
        let b = self.border_width();
        let width = body.width.max(self.title_width()) + 2 * b;
        let height = body.height + self.title_rows() + 2 * b;
        self.size = Size::new(width, height);
    }

    /// Size the widget to exactly `size` cells, chrome included.
    pub fn fit_outer(&mut self, size: Size) {
        self.size = size;
    }

    /// Space left for the body once border and title are taken out of `size`.
    pub fn body_size_for(&self, size: Size) -> Size {
        let b = self.border_width();
        Size::new(
            (size.width - 2 * b).max(0),
            (size.height - 2 * b - self.title_rows()).max(0),
        )
    }

    /// Terminal-absolute origin.
    pub fn origin(&self) -> Point {
        self.anchor + self.rel
    }

    /// Terminal-absolute area.
    pub fn rect(&self) -> Rect {
        Rect::from_parts(self.origin(), self.size)
    }

    /// Body area in surface coordinates.
    pub fn body(&self) -> Rect {
        let b = self.border_width();
        let inner = self.body_size_for(self.size);
        Rect::new(b, b + self.title_rows(), inner.width, inner.height)
    }
}

/// The variant side of a widget: its state, drawing and key handling.
pub(crate) trait Native {
    fn common(&self) -> &Common;

    fn common_mut(&mut self) -> &mut Common;

    /// Draw the variant's content into `area` of its surface buffer.
    fn draw_body(&self, buf: &mut FrameBuffer, area: Rect);

    /// Handle one key. `Some` completes the activation.
    fn inject(&mut self, key: Key) -> Option<ExitType>;

    /// Reset the value to its empty state.
    fn clean(&mut self) {}

    /// The widget starts receiving keys, from `activate` or a traversal.
    fn enter(&mut self, _ctx: &Context) {}

    /// The widget stops receiving keys.
    fn leave(&mut self, _ctx: &Context) {}

    /// Whether a traversal may move the focus away with `Tab`/`BackTab`.
    fn releases_focus(&self) -> bool {
        true
    }

    /// Draw anything the widget shows outside its own surface.
    ///
    /// Runs after the widget's surface (and, on a screen refresh, every
    /// other widget) reached the virtual screen.
    fn draw_overlay(&self, _ctx: &Context) -> Result<()> {
        Ok(())
    }
}

/// Draw a native object into its surface and copy it to the virtual screen.
pub(crate) fn paint(ctx: &Context, surface: Handle, native: &RefCell<dyn Native>) -> Result<()> {
    {
        let native = native.borrow();
        let common = native.common();
        ctx.with_surface(surface, |buf, _| {
            buf.clear();
            let b = common.border_width();
            if common.boxed && common.show_box {
                let bounds = buf.bounds();
                buf.draw_border(bounds, common.border, Attr::NONE);
            }
            let inner = (common.size.width - 2 * b).max(0);
            for (i, row) in common.title.iter().enumerate() {
                let row = truncate_to_width(row, inner);
                let x = b + centered(inner, string_width(row));
                buf.draw_text(x, b + i as i32, row, Attr::BOLD);
            }
            native.draw_body(buf, common.body());
        })?;
    }
    ctx.refresh_surface(surface)
}

/// Paint a native object with its overlay and push it to the terminal.
pub(crate) fn render(ctx: &Context, surface: Handle, native: &RefCell<dyn Native>) -> Result<()> {
    paint(ctx, surface, native)?;
    native.borrow().draw_overlay(ctx)?;
    ctx.present()
}

/// Blank a native object's area on the terminal.
pub(crate) fn erase(ctx: &Context, native: &RefCell<dyn Native>) -> Result<()> {
    let rect = native.borrow().common().rect();
    ctx.erase_region(rect);
    ctx.present()
}

fn finish(native: &RefCell<dyn Native>, exit: ExitType) -> ExitType {
    native.borrow_mut().common_mut().exit = exit;
    exit
}

/// What became of one key fed to a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// The pre-process hook consumed the key.
    Dropped,
    /// The widget handled the key and keeps going.
    Handled,
    /// The key ended the activation.
    Finished(ExitType),
}

/// Feed one key through the hook pipeline of a widget.
pub(crate) fn process_key(
    ctx: &Context,
    handle: Handle,
    surface: Handle,
    native: &RefCell<dyn Native>,
    key: Key,
) -> Result<Step> {
    ctx.note_key(key);

    match pre_handler(ctx, handle, key) {
        Flow::Consume => return Ok(Step::Dropped),
        Flow::Exit => return Ok(Step::Finished(finish(native, ExitType::EarlyExit))),
        Flow::Proceed => {}
    }

    let done = native.borrow_mut().inject(key);
    render(ctx, surface, native)?;
    if let Some(exit) = done {
        return Ok(Step::Finished(finish(native, exit)));
    }

    match post_handler(ctx, handle, key) {
        Flow::Exit => Ok(Step::Finished(finish(native, ExitType::EarlyExit))),
        Flow::Proceed | Flow::Consume => Ok(Step::Handled),
    }
}

// =============================================================================
// DEFAULT KEY HANDLER
// =============================================================================

type Hook = Rc<dyn Fn(Key) -> Flow>;

/// The key handler every widget starts with.
pub struct WidgetHooks {
    widget: WidgetRef,
    screen: RefCell<Weak<ScreenInner>>,
    pre: RefCell<Option<Hook>>,
    post: RefCell<Option<Hook>>,
}

impl WidgetHooks {
    fn new(widget: WidgetRef, screen: Weak<ScreenInner>) -> Self {
        Self {
            widget,
            screen: RefCell::new(screen),
            pre: RefCell::new(None),
            post: RefCell::new(None),
        }
    }
}

impl KeyHandler for WidgetHooks {
    fn pre_process(&self, key: Key) -> Flow {
        let hook = self.pre.borrow().clone();
        hook.map_or(Flow::Proceed, |f| f(key))
    }

    fn post_process(&self, key: Key) -> Flow {
        let hook = self.post.borrow().clone();
        if let Some(f) = hook {
            let flow = f(key);
            if flow != Flow::Proceed {
                return flow;
            }
        }
        let screen = self.screen.borrow().upgrade();
        match screen {
            Some(inner) => Screen::from_inner(inner).widget_callback(self.widget, key),
            None => Flow::Proceed,
        }
    }
}

// =============================================================================
// WIDGET BASE
// =============================================================================

/// The native object behind a widget.
///
/// Dropping it unregisters the key handler, detaches the widget from its
/// screen, erases it and finally releases the handle.
pub struct WidgetBase {
    ctx: Rc<Context>,
    handle: Handle,
    obj_type: ObjectType,
    surface: Handle,
    screen: RefCell<Weak<ScreenInner>>,
    hooks: Rc<WidgetHooks>,
    handler: RefCell<Rc<dyn KeyHandler>>,
    native: Rc<RefCell<dyn Native>>,
}

impl WidgetBase {
    pub(crate) fn new(screen: &Screen, obj_type: ObjectType, native: Rc<RefCell<dyn Native>>) -> Result<Self> {
        let rect = native.borrow().common().rect();
        if rect.is_empty() {
            tracing::warn!(?obj_type, %rect, "widget has no area");
            return Err(Error::resource(obj_type, format!("no room for a {rect} widget")));
        }

        let ctx = screen.context().clone();
        let handle = ctx.allocate_handle(HandleKind::Widget(obj_type));
        let surface = ctx.create_surface(rect, Some(screen.window().handle()));
        let widget = WidgetRef { handle, obj_type };

        let hooks = Rc::new(WidgetHooks::new(widget, screen.downgrade()));
        let handler: Rc<dyn KeyHandler> = hooks.clone();
        ctx.register_handler(handle, &handler);

        let base = Self {
            ctx,
            handle,
            obj_type,
            surface,
            screen: RefCell::new(screen.downgrade()),
            hooks,
            handler: RefCell::new(handler),
            native,
        };
        screen.attach(base.screen_object());
        tracing::debug!(%handle, ?obj_type, %rect, "widget created");
        Ok(base)
    }

    pub(crate) fn screen_object(&self) -> ScreenObject {
        ScreenObject {
            handle: self.handle,
            obj_type: self.obj_type,
            surface: self.surface,
            native: Rc::downgrade(&self.native),
        }
    }

    pub(crate) fn handler(&self) -> Rc<dyn KeyHandler> {
        self.handler.borrow().clone()
    }

    /// Move the widget to `screen`, keeping its screen-relative position.
    pub(crate) fn rebind_screen(&self, screen: &Screen) -> Result<()> {
        let old = self.native.borrow().common().rect();
        let origin = {
            let mut native = self.native.borrow_mut();
            let common = native.common_mut();
            common.anchor = screen.origin();
            common.origin()
        };
        *self.hooks.screen.borrow_mut() = screen.downgrade();
        *self.screen.borrow_mut() = screen.downgrade();
        if origin != old.origin() {
            self.ctx.erase_region(old);
            self.ctx.move_surface(self.surface, origin)?;
        }
        Ok(())
    }

    pub(crate) fn screen_inner(&self) -> Option<Rc<ScreenInner>> {
        self.screen.borrow().upgrade()
    }

    pub fn context(&self) -> &Rc<Context> {
        &self.ctx
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn obj_type(&self) -> ObjectType {
        self.obj_type
    }

    pub(crate) fn redraw(&self) -> Result<()> {
        render(&self.ctx, self.surface, &self.native)
    }

    fn draw(&self, boxed: bool) -> Result<()> {
        self.native.borrow_mut().common_mut().show_box = boxed;
        self.redraw()
    }

    fn erase(&self) -> Result<()> {
        erase(&self.ctx, &self.native)
    }

    pub(crate) fn enter(&self) {
        self.native.borrow_mut().enter(&self.ctx);
    }

    pub(crate) fn leave(&self) {
        self.native.borrow_mut().leave(&self.ctx);
    }

    /// Run the activation loop.
    pub(crate) fn run(&self, actions: Option<&[Key]>) -> Result<ExitType> {
        self.enter();
        let result = self.run_keys(actions);
        self.leave();
        let redrawn = self.redraw();
        let exit = result?;
        redrawn?;
        Ok(exit)
    }

    fn run_keys(&self, actions: Option<&[Key]>) -> Result<ExitType> {
        self.redraw()?;

        if let Some(keys) = actions {
            for &key in keys {
                if let Step::Finished(exit) = self.feed(key)? {
                    return Ok(exit);
                }
            }
            return Ok(finish(&self.native, ExitType::EarlyExit));
        }

        loop {
            let key = match self.ctx.read_key() {
                Ok(key) => key,
                Err(err) => {
                    finish(&self.native, ExitType::Error);
                    return Err(err);
                }
            };
            if let Step::Finished(exit) = self.feed(key)? {
                return Ok(exit);
            }
        }
    }

    fn feed(&self, key: Key) -> Result<Step> {
        process_key(&self.ctx, self.handle, self.surface, &self.native, key)
    }

    fn move_to(&self, x: i32, y: i32, relative: bool, refresh: bool) -> Result<()> {
        let old = self.native.borrow().common().rect();
        let origin = {
            let mut native = self.native.borrow_mut();
            let common = native.common_mut();
            common.rel = if relative {
                common.rel + Point::new(x, y)
            } else {
                Point::new(x, y)
            };
            common.origin()
        };
        self.ctx.erase_region(old);
        self.ctx.move_surface(self.surface, origin)?;
        if refresh {
            self.redraw()
        } else {
            self.ctx.present()
        }
    }

    /// Give the widget a new outer size.
    pub(crate) fn resize(&self, size: Size) -> Result<()> {
        let old = self.native.borrow().common().rect();
        self.native.borrow_mut().common_mut().fit_outer(size);
        self.ctx.erase_region(old);
        self.ctx.resize_surface(self.surface, size)
    }
}

impl Drop for WidgetBase {
    fn drop(&mut self) {
        self.ctx.unregister_handler(self.handle);
        if let Some(screen) = self.screen.get_mut().upgrade() {
            screen.detach(self.handle);
        }
        if let Ok(mut native) = self.native.try_borrow_mut() {
            native.leave(&self.ctx);
            self.ctx.erase_region(native.common().rect());
            if let Err(err) = self.ctx.present() {
                tracing::debug!(%err, "present failed while destroying widget");
            }
        }
        self.ctx.destroy_surface(self.surface);
        self.ctx.release_handle(self.handle);
        tracing::debug!(handle = %self.handle, obj_type = ?self.obj_type, "widget destroyed");
    }
}

// =============================================================================
// WIDGET TRAIT
// =============================================================================

/// Operations shared by every widget.
pub trait Widget {
    fn base(&self) -> &WidgetBase;

    /// Run the widget until the user completes or cancels it.
    ///
    /// With `actions`, those keys are fed in order instead of reading the
    /// terminal; if they run out first the result is `EarlyExit`.
    fn activate(&self, actions: Option<&[Key]>) -> Result<ExitType> {
        self.base().run(actions)
    }

    fn draw(&self, boxed: bool) -> Result<()> {
        self.base().draw(boxed)
    }

    fn erase(&self) -> Result<()> {
        self.base().erase()
    }

    /// Move the widget. Absolute coordinates are relative to the screen.
    fn move_to(&self, x: i32, y: i32, relative: bool, refresh: bool) -> Result<()> {
        self.base().move_to(x, y, relative, refresh)
    }

    /// Move to the top of the screen's stacking order.
    fn raise(&self) {
        if let Some(screen) = self.base().screen_inner() {
            screen.raise(self.handle());
        }
    }

    /// Move to the bottom of the screen's stacking order.
    fn lower(&self) {
        if let Some(screen) = self.base().screen_inner() {
            screen.lower(self.handle());
        }
    }

    /// Reset the value and redraw.
    fn clear(&self) -> Result<()> {
        self.base().native.borrow_mut().clean();
        self.base().redraw()
    }

    fn obj_type(&self) -> ObjectType {
        self.base().obj_type
    }

    fn handle(&self) -> Handle {
        self.base().handle
    }

    fn widget_ref(&self) -> WidgetRef {
        WidgetRef {
            handle: self.handle(),
            obj_type: self.obj_type(),
        }
    }

    /// Terminal-absolute position.
    fn position(&self) -> Point {
        self.base().native.borrow().common().origin()
    }

    /// Position relative to the screen.
    fn relative_position(&self) -> Point {
        self.base().native.borrow().common().rel
    }

    fn size(&self) -> Size {
        self.base().native.borrow().common().size
    }

    fn exit_type(&self) -> ExitType {
        self.base().native.borrow().common().exit
    }

    /// Run `f` after every key the widget handled without completing.
    ///
    /// Returning [`Flow::Proceed`] passes the key on to the screen callback.
    fn register_callback(&self, f: impl Fn(Key) -> Flow + 'static)
    where
        Self: Sized,
    {
        *self.base().hooks.post.borrow_mut() = Some(Rc::new(f));
    }

    /// Run `f` before the widget sees each key.
    fn set_pre_process(&self, f: impl Fn(Key) -> Flow + 'static)
    where
        Self: Sized,
    {
        *self.base().hooks.pre.borrow_mut() = Some(Rc::new(f));
    }

    /// Replace the widget's key handler in the registry.
    fn set_key_handler(&self, handler: Rc<dyn KeyHandler>) {
        let base = self.base();
        base.ctx.register_handler(base.handle, &handler);
        *base.handler.borrow_mut() = handler;
    }

    /// Restore the default key handler.
    fn reset_key_handler(&self) {
        let hooks: Rc<dyn KeyHandler> = self.base().hooks.clone();
        self.set_key_handler(hooks);
    }
}
