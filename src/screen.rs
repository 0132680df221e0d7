//! Screen - A window hosting widgets
//!
//! A [`Screen`] binds a [`Window`] to a native screen handle and keeps the
//! widgets created on it in stacking order (bottom first). It owns the
//! screen-level callback every widget's post-processing falls through to,
//! the focus used by [`Screen::traverse`], the title label, popups and the
//! file chooser dialog.
//!
//! Widgets refer back to their screen weakly, so a screen may be dropped
//! before its widgets; they simply stop reaching the screen callback.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

use spark_signals::{Signal, signal};

use crate::context::Context;
use crate::error::Result;
use crate::key::Key;
use crate::registry::{Flow, Handle, HandleKind};
use crate::text::{centered, max_width, split_rows};
use crate::types::{ExitType, ObjectType, Point, Rect};
use crate::widget::{self, FileSelector, Label, Native, Step, Widget, WidgetRef};
use crate::window::Window;

// =============================================================================
// CALLBACK
// =============================================================================

/// Screen-level post-process hook, reached by every widget on the screen.
pub trait ScreenCallback {
    fn on_key(&self, screen: &Screen, widget: WidgetRef, key: Key) -> Flow;
}

impl<F> ScreenCallback for F
where
    F: Fn(&Screen, WidgetRef, Key) -> Flow,
{
    fn on_key(&self, screen: &Screen, widget: WidgetRef, key: Key) -> Flow {
        self(screen, widget, key)
    }
}

// =============================================================================
// STACKING LIST
// =============================================================================

/// A widget as seen from its screen.
#[derive(Clone)]
pub(crate) struct ScreenObject {
    pub handle: Handle,
    pub obj_type: ObjectType,
    pub surface: Handle,
    pub native: Weak<RefCell<dyn Native>>,
}

impl ScreenObject {
    fn widget_ref(&self) -> WidgetRef {
        WidgetRef {
            handle: self.handle,
            obj_type: self.obj_type,
        }
    }
}

pub(crate) struct ScreenInner {
    ctx: Rc<Context>,
    handle: Handle,
    title: RefCell<Option<Label>>,
    objects: RefCell<Vec<ScreenObject>>,
    focus: Signal<Option<Handle>>,
    callback: RefCell<Option<Rc<dyn ScreenCallback>>>,
    window: Window,
}

impl ScreenInner {
    pub(crate) fn attach(&self, object: ScreenObject) {
        let mut objects = self.objects.borrow_mut();
        objects.retain(|o| o.handle != object.handle);
        objects.push(object);
    }

    pub(crate) fn detach(&self, handle: Handle) -> bool {
        let mut objects = self.objects.borrow_mut();
        let before = objects.len();
        objects.retain(|o| o.handle != handle);
        let removed = objects.len() != before;
        drop(objects);

        if removed && self.focus.get() == Some(handle) {
            self.focus.set(None);
        }
        removed
    }

    pub(crate) fn raise(&self, handle: Handle) {
        let mut objects = self.objects.borrow_mut();
        if let Some(pos) = objects.iter().position(|o| o.handle == handle) {
            let object = objects.remove(pos);
            objects.push(object);
        }
    }

    pub(crate) fn lower(&self, handle: Handle) {
        let mut objects = self.objects.borrow_mut();
        if let Some(pos) = objects.iter().position(|o| o.handle == handle) {
            let object = objects.remove(pos);
            objects.insert(0, object);
        }
    }

    fn snapshot(&self) -> Vec<ScreenObject> {
        self.objects.borrow().clone()
    }

    fn focusable(&self) -> Vec<ScreenObject> {
        self.objects
            .borrow()
            .iter()
            .filter(|o| o.obj_type.is_focusable())
            .cloned()
            .collect()
    }
}

impl Drop for ScreenInner {
    fn drop(&mut self) {
        // Title first, then the native screen; the window goes last.
        self.title.get_mut().take();
        self.ctx.release_handle(self.handle);
        tracing::debug!(handle = %self.handle, "screen destroyed");
    }
}

// =============================================================================
// SCREEN
// =============================================================================

/// A window plus the widgets drawn on it.
pub struct Screen {
    inner: Rc<ScreenInner>,
}

impl Screen {
    /// A screen on the terminal's main window.
    pub fn new(ctx: &Rc<Context>) -> Result<Self> {
        Ok(Self::with_window(ctx, Window::main(ctx)))
    }

    /// A screen on a new window at `(x, y)` of `width` × `height` cells.
    ///
    /// Zero sizes extend the window to the terminal edge.
    pub fn with_region(ctx: &Rc<Context>, x: i32, y: i32, width: i32, height: i32) -> Result<Self> {
        let window = Window::new(ctx, Rect::new(x, y, width, height))?;
        Ok(Self::with_window(ctx, window))
    }

    fn with_window(ctx: &Rc<Context>, window: Window) -> Self {
        let handle = ctx.allocate_handle(HandleKind::Screen);
        tracing::debug!(%handle, rect = %window.rect(), "screen created");
        Self {
            inner: Rc::new(ScreenInner {
                ctx: ctx.clone(),
                handle,
                title: RefCell::new(None),
                objects: RefCell::new(Vec::new()),
                focus: signal(None),
                callback: RefCell::new(None),
                window,
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<ScreenInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<ScreenInner> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn attach(&self, object: ScreenObject) {
        self.inner.attach(object);
    }

    pub fn x(&self) -> i32 {
        self.inner.window.x()
    }

    pub fn y(&self) -> i32 {
        self.inner.window.y()
    }

    pub fn width(&self) -> i32 {
        self.inner.window.width()
    }

    pub fn height(&self) -> i32 {
        self.inner.window.height()
    }

    pub fn origin(&self) -> Point {
        self.inner.window.origin()
    }

    pub fn window(&self) -> &Window {
        &self.inner.window
    }

    pub fn handle(&self) -> Handle {
        self.inner.handle
    }

    pub fn context(&self) -> &Rc<Context> {
        &self.inner.ctx
    }

    // -------------------------------------------------------------------------
    // Decoration and dialogs
    // -------------------------------------------------------------------------

    /// Show `text` centred on the top row, replacing any previous title.
    ///
    /// A blank `text` removes the title. If the new title cannot be
    /// created the old one stays.
    pub fn draw_title(&self, text: &str) -> Result<()> {
        let width = max_width(&split_rows(text));
        if width == 0 {
            self.inner.title.borrow_mut().take();
            return self.refresh();
        }
        let x = centered(self.width(), width);
        let label = Label::new(self, x, 0, text, false)?;
        // Dropping the old title erases its area, so draw the new one after.
        let old = self.inner.title.borrow_mut().replace(label);
        drop(old);
        if let Some(label) = self.inner.title.borrow().as_ref() {
            label.draw(false)?;
        }
        Ok(())
    }

    /// The current title text.
    pub fn title(&self) -> Option<String> {
        self.inner.title.borrow().as_ref().map(|l| l.value())
    }

    /// Show a boxed message in the middle of the screen until a key is pressed.
    ///
    /// Returns the key that dismissed the popup.
    pub fn popup_label(&self, text: &str) -> Result<Key> {
        let rows = split_rows(text);
        let width = max_width(&rows) + 2;
        let height = rows.len() as i32 + 2;
        let x = centered(self.width(), width);
        let y = centered(self.height(), height);

        let popup = Label::new(self, x, y, text, true)?;
        popup.draw(true)?;
        let key = self.context().read_key();
        drop(popup);
        self.refresh()?;
        key
    }

    /// Let the user pick a file, starting in the configured directory.
    ///
    /// Returns `None` when the user cancels.
    pub fn choose_file(&self, title: &str) -> Result<Option<PathBuf>> {
        let start = match &self.context().config().start_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        self.choose_file_in(title, &start)
    }

    /// Let the user pick a file, starting in `dir`.
    pub fn choose_file_in(&self, title: &str, dir: &Path) -> Result<Option<PathBuf>> {
        let width = (self.width() * 3 / 4).max(20).min(self.width());
        let height = (self.height() * 3 / 4).max(6).min(self.height());
        let x = centered(self.width(), width);
        let y = centered(self.height(), height);

        let selector = FileSelector::new(self, x, y, height, width, title, dir)?;
        let exit = selector.activate(None);
        let chosen = selector.value();
        drop(selector);
        self.refresh()?;

        match exit? {
            ExitType::Normal => Ok(chosen),
            _ => Ok(None),
        }
    }

    /// Border the screen's window.
    pub fn draw_box(&self) -> Result<()> {
        self.inner.window.draw_box()
    }

    // -------------------------------------------------------------------------
    // Drawing
    // -------------------------------------------------------------------------

    /// Redraw every attached widget, bottom of the stack first.
    pub fn refresh(&self) -> Result<()> {
        self.inner.window.update()?;
        let natives: Vec<_> = self
            .inner
            .snapshot()
            .into_iter()
            .filter_map(|o| Some((o.surface, o.native.upgrade()?)))
            .collect();
        for (surface, native) in &natives {
            widget::paint(self.context(), *surface, native)?;
        }
        // Pull-downs and other overlays go above every widget.
        for (_, native) in &natives {
            native.borrow().draw_overlay(self.context())?;
        }
        self.context().present()
    }

    /// Erase every attached widget.
    pub fn erase(&self) -> Result<()> {
        for object in self.inner.snapshot() {
            if let Some(native) = object.native.upgrade() {
                widget::erase(self.context(), &native)?;
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Widgets and callbacks
    // -------------------------------------------------------------------------

    /// Install the screen-level callback.
    pub fn set_callback(&self, callback: impl ScreenCallback + 'static) {
        *self.inner.callback.borrow_mut() = Some(Rc::new(callback));
    }

    /// Remove the screen-level callback.
    pub fn clear_callback(&self) {
        self.inner.callback.borrow_mut().take();
    }

    /// Post-process hook shared by all widgets on this screen.
    ///
    /// Without a callback every key is accepted.
    pub fn widget_callback(&self, widget: WidgetRef, key: Key) -> Flow {
        let callback = self.inner.callback.borrow().clone();
        match callback {
            Some(cb) => cb.on_key(self, widget, key),
            None => Flow::Proceed,
        }
    }

    /// Attach `widget` to this screen and register its key handler.
    pub fn register_widget(&self, widget: &dyn Widget) {
        let base = widget.base();
        if let Some(previous) = base.screen_inner() {
            if !Rc::ptr_eq(&previous, &self.inner) {
                previous.detach(base.handle());
            }
        }
        if let Err(err) = base.rebind_screen(self) {
            tracing::warn!(handle = %base.handle(), %err, "cannot move widget to screen");
        }
        self.inner.attach(base.screen_object());
        base.context().register_handler(base.handle(), &base.handler());
    }

    /// Detach `widget` from this screen and unregister its key handler.
    pub fn unregister_widget(&self, widget: &dyn Widget) {
        let handle = widget.handle();
        self.inner.detach(handle);
        self.context().unregister_handler(handle);
    }

    /// Attached widgets in stacking order.
    pub fn widgets(&self) -> Vec<WidgetRef> {
        self.inner.objects.borrow().iter().map(ScreenObject::widget_ref).collect()
    }

    // -------------------------------------------------------------------------
    // Focus and traversal
    // -------------------------------------------------------------------------

    pub fn focused(&self) -> Option<WidgetRef> {
        let handle = self.inner.focus.get()?;
        self.inner
            .objects
            .borrow()
            .iter()
            .find(|o| o.handle == handle)
            .map(ScreenObject::widget_ref)
    }

    /// Focus `widget`. Returns false when it is not a focusable widget of
    /// this screen.
    pub fn set_focus(&self, widget: &dyn Widget) -> bool {
        let handle = widget.handle();
        let focusable = self.inner.focusable().iter().any(|o| o.handle == handle);
        if focusable {
            self.inner.focus.set(Some(handle));
        }
        focusable
    }

    pub fn focus_next(&self) -> Option<WidgetRef> {
        self.move_focus(1)
    }

    pub fn focus_previous(&self) -> Option<WidgetRef> {
        self.move_focus(-1)
    }

    fn move_focus(&self, direction: isize) -> Option<WidgetRef> {
        let focusable = self.inner.focusable();
        if focusable.is_empty() {
            self.inner.focus.set(None);
            return None;
        }

        let len = focusable.len() as isize;
        let current = self
            .inner
            .focus
            .get()
            .and_then(|h| focusable.iter().position(|o| o.handle == h));
        let next = match current {
            Some(pos) => (pos as isize + direction).rem_euclid(len) as usize,
            None if direction < 0 => focusable.len() - 1,
            None => 0,
        };

        let object = &focusable[next];
        self.inner.focus.set(Some(object.handle));
        Some(object.widget_ref())
    }

    /// Let the user move between widgets and fill them in.
    ///
    /// Every key goes through the focused widget's hooks first. A widget
    /// completed with `Tab` or `BackTab` passes the focus on (or back); one
    /// completed any other way passes it on, and completing the last widget
    /// completes the traversal. `Tab`/`BackTab` the widget does not complete
    /// on still move the focus unless the widget holds it (an entry shorter
    /// than its minimum). `EscapeHit` from a widget cancels.
    pub fn traverse(&self) -> Result<ExitType> {
        if self.inner.focusable().is_empty() {
            return Ok(ExitType::NeverActivated);
        }
        if self.focused().is_none_or(|w| !w.obj_type.is_focusable()) {
            self.move_focus(1);
        }
        self.refresh()?;

        let mut active = None;
        let result = self.traverse_keys(&mut active);
        let left = self.switch_active(&mut active, None);
        let exit = result?;
        left?;
        Ok(exit)
    }

    fn traverse_keys(&self, active: &mut Option<ScreenObject>) -> Result<ExitType> {
        loop {
            let focusable = self.inner.focusable();
            if focusable.is_empty() {
                return Ok(ExitType::NeverActivated);
            }
            let current = self
                .inner
                .focus
                .get()
                .and_then(|h| focusable.iter().position(|o| o.handle == h));
            let Some(pos) = current else {
                self.move_focus(1);
                continue;
            };
            let object = focusable[pos].clone();
            let Some(native) = object.native.upgrade() else {
                self.move_focus(1);
                continue;
            };
            self.switch_active(active, Some(object.clone()))?;

            let key = self.context().read_key()?;
            let step = widget::process_key(self.context(), object.handle, object.surface, &native, key)?;
            let focus_key = matches!(key, Key::Tab | Key::BackTab);
            let direction = if key == Key::BackTab { -1 } else { 1 };
            match step {
                Step::Finished(ExitType::EscapeHit) => return Ok(ExitType::EscapeHit),
                Step::Finished(exit) => {
                    if exit == ExitType::Normal && !focus_key && pos + 1 == focusable.len() {
                        return Ok(ExitType::Normal);
                    }
                    self.move_focus(direction);
                }
                Step::Handled if focus_key => {
                    let releases = native.borrow().releases_focus();
                    if releases {
                        self.move_focus(direction);
                    }
                }
                Step::Handled | Step::Dropped => {}
            }
        }
    }

    /// Make `next` the widget receiving keys, telling both widgets.
    fn switch_active(&self, active: &mut Option<ScreenObject>, next: Option<ScreenObject>) -> Result<()> {
        if active.as_ref().map(|o| o.handle) == next.as_ref().map(|o| o.handle) {
            return Ok(());
        }
        if let Some(old) = active.take() {
            if let Some(native) = old.native.upgrade() {
                native.borrow_mut().leave(self.context());
                widget::render(self.context(), old.surface, &native)?;
            }
        }
        if let Some(new) = &next {
            if let Some(native) = new.native.upgrade() {
                native.borrow_mut().enter(self.context());
                widget::render(self.context(), new.surface, &native)?;
            }
        }
        *active = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::types::DisplayType;
    use crate::widget::Entry;
    use std::cell::Cell;

    fn screen(width: i32, height: i32) -> (Screen, MemoryBackend) {
        let backend = MemoryBackend::new(width, height);
        let ctx = Context::new(backend.clone()).unwrap();
        (Screen::new(&ctx).unwrap(), backend)
    }

    fn entry(screen: &Screen, y: i32) -> Entry {
        Entry::new(screen, 0, y, "", "> ", DisplayType::Mixed, 10, 0, 20).unwrap()
    }

    #[test]
    fn test_region_geometry() {
        let backend = MemoryBackend::new(40, 20);
        let ctx = Context::new(backend).unwrap();
        let screen = Screen::with_region(&ctx, 10, 5, 20, 10).unwrap();
        assert_eq!((screen.x(), screen.y(), screen.width(), screen.height()), (10, 5, 20, 10));
        assert!(!screen.window().is_main());
    }

    #[test]
    fn test_draw_title_replaces_previous() {
        let (screen, backend) = screen(30, 5);
        screen.draw_title("First").unwrap();
        screen.draw_title("Second").unwrap();
        assert_eq!(screen.title().as_deref(), Some("Second"));
        assert_eq!(backend.row_text(0), format!("{}Second", " ".repeat(12)));
        assert_eq!(screen.widgets().len(), 1);
    }

    #[test]
    fn test_blank_title_clears() {
        let (screen, backend) = screen(30, 5);
        screen.draw_title("T").unwrap();
        screen.draw_title("").unwrap();
        assert_eq!(screen.title(), None);
        assert!(screen.widgets().is_empty());
        assert_eq!(backend.row_text(0), "");
    }

    #[test]
    fn test_stacking_order_raise_lower() {
        let (screen, _) = screen(30, 5);
        let a = entry(&screen, 0);
        let b = entry(&screen, 1);
        assert_eq!(screen.widgets(), vec![a.widget_ref(), b.widget_ref()]);

        a.raise();
        assert_eq!(screen.widgets(), vec![b.widget_ref(), a.widget_ref()]);
        a.lower();
        assert_eq!(screen.widgets(), vec![a.widget_ref(), b.widget_ref()]);

        drop(a);
        assert_eq!(screen.widgets(), vec![b.widget_ref()]);
    }

    #[test]
    fn test_focus_wraps_and_skips_labels() {
        let (screen, _) = screen(30, 5);
        let a = entry(&screen, 0);
        let _label = Label::new(&screen, 0, 1, "note", false).unwrap();
        let b = entry(&screen, 2);

        assert_eq!(screen.focused(), None);
        assert_eq!(screen.focus_next(), Some(a.widget_ref()));
        assert_eq!(screen.focus_next(), Some(b.widget_ref()));
        assert_eq!(screen.focus_next(), Some(a.widget_ref()));
        assert_eq!(screen.focus_previous(), Some(b.widget_ref()));
        assert!(screen.set_focus(&a));
        assert_eq!(screen.focused(), Some(a.widget_ref()));
    }

    #[test]
    fn test_widget_callback_defaults_to_proceed() {
        let (screen, _) = screen(30, 5);
        let a = entry(&screen, 0);
        assert_eq!(screen.widget_callback(a.widget_ref(), Key::Enter), Flow::Proceed);

        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        screen.set_callback(move |_: &Screen, _: WidgetRef, _: Key| {
            calls_clone.set(calls_clone.get() + 1);
            Flow::Exit
        });
        assert_eq!(screen.widget_callback(a.widget_ref(), Key::Enter), Flow::Exit);
        assert_eq!(calls.get(), 1);

        screen.clear_callback();
        assert_eq!(screen.widget_callback(a.widget_ref(), Key::Enter), Flow::Proceed);
    }

    #[test]
    fn test_unregister_and_register_widget() {
        let (screen, _) = screen(30, 5);
        let a = entry(&screen, 0);
        let ctx = screen.context().clone();

        screen.unregister_widget(&a);
        assert!(screen.widgets().is_empty());
        assert!(ctx.lookup_handler(a.handle()).is_none());

        screen.register_widget(&a);
        assert_eq!(screen.widgets(), vec![a.widget_ref()]);
        assert!(ctx.lookup_handler(a.handle()).is_some());
    }

    #[test]
    fn test_register_moves_widget_to_new_screen() {
        let backend = MemoryBackend::new(40, 20);
        let ctx = Context::new(backend.clone()).unwrap();
        let main = Screen::new(&ctx).unwrap();
        let region = Screen::with_region(&ctx, 10, 5, 20, 10).unwrap();
        let a = entry(&region, 1);
        assert_eq!(a.position(), Point::new(10, 6));

        main.register_widget(&a);
        assert_eq!(a.position(), Point::new(0, 1));
        assert_eq!(a.position(), a.relative_position());
        assert!(region.widgets().is_empty());
        assert_eq!(main.widgets(), vec![a.widget_ref()]);

        main.refresh().unwrap();
        assert!(backend.contains_text("> "));
    }

    #[test]
    fn test_traverse_without_widgets() {
        let (screen, _) = screen(30, 5);
        assert_eq!(screen.traverse().unwrap(), ExitType::NeverActivated);
    }

    #[test]
    fn test_drop_releases_screen_handle() {
        let (screen, _) = screen(30, 5);
        let ctx = screen.context().clone();
        let handle = screen.handle();
        screen.draw_title("T").unwrap();
        drop(screen);
        assert!(!ctx.is_live(handle));
        assert!(ctx.registry().is_empty());
    }
}
