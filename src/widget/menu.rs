//! Menu - a menu bar with pull-down lists.
//!
//! The bar is one row across the screen with one title per menu. While the
//! menu has the keyboard, the current menu's items are shown in a boxed
//! pull-down list under (or, for a bottom bar, above) its title. The list
//! lives on its own surface; whatever it covered is put back when the menu
//! lets go of the keyboard.

use std::cell::RefCell;
use std::rc::Rc;

use super::{Common, Native, Widget, WidgetBase};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::key::Key;
use crate::registry::Handle;
use crate::renderer::FrameBuffer;
use crate::screen::Screen;
use crate::text::{string_width, truncate_to_width};
use crate::types::{Attr, ExitType, ObjectType, Rect, Size};

/// Which end of the bar a menu title sits at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuLocation {
    #[default]
    Left,
    Right,
}

/// Where the bar sits on the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuPosition {
    #[default]
    Top,
    Bottom,
}

struct Pulldown {
    title: String,
    items: Vec<String>,
    /// Bar column of the title.
    column: i32,
}

/// The open pull-down list.
struct Popup {
    surface: Handle,
    /// Where the list is and what it covers there.
    under: RefCell<Option<(Rect, FrameBuffer)>>,
}

impl Popup {
    fn restore(&self, ctx: &Context) {
        if let Some((rect, saved)) = self.under.borrow_mut().take() {
            ctx.restore_region(&saved, rect.origin());
        }
    }
}

struct MenuState {
    common: Common,
    menus: Vec<Pulldown>,
    position: MenuPosition,
    title_attr: Attr,
    item_attr: Attr,
    current_menu: usize,
    current_item: usize,
    popup: Option<Popup>,
}

impl MenuState {
    /// Terminal-absolute frame of the current menu's pull-down.
    fn pulldown_rect(&self) -> Rect {
        let bar = self.common.rect();
        let menu = &self.menus[self.current_menu];
        let width = menu.items.iter().map(|s| string_width(s)).max().unwrap_or(0) + 2;
        let height = menu.items.len() as i32 + 2;
        let x = (bar.x + menu.column).min(bar.right() - width).max(bar.x);
        let y = match self.position {
            MenuPosition::Top => bar.y + 1,
            MenuPosition::Bottom => bar.y - height,
        };
        Rect::new(x, y, width, height)
    }

    fn draw_pulldown(&self, buf: &mut FrameBuffer) {
        let menu = &self.menus[self.current_menu];
        let frame = buf.bounds();
        buf.draw_border(frame, self.common.border, Attr::NONE);
        for (i, item) in menu.items.iter().enumerate() {
            let attrs = if i == self.current_item {
                self.item_attr | Attr::INVERSE
            } else {
                self.item_attr
            };
            let text = truncate_to_width(item, frame.width - 2);
            buf.draw_text(1, 1 + i as i32, text, attrs);
        }
    }
}

impl Native for MenuState {
    fn common(&self) -> &Common {
        &self.common
    }

    fn common_mut(&mut self) -> &mut Common {
        &mut self.common
    }

    fn draw_body(&self, buf: &mut FrameBuffer, area: Rect) {
        for (i, menu) in self.menus.iter().enumerate() {
            let attrs = if self.popup.is_some() && i == self.current_menu {
                self.title_attr | Attr::INVERSE
            } else {
                self.title_attr
            };
            buf.draw_text(area.x + menu.column, area.y, &menu.title, attrs);
        }
    }

    fn draw_overlay(&self, ctx: &Context) -> Result<()> {
        let Some(popup) = &self.popup else {
            return Ok(());
        };
        let rect = self.pulldown_rect();
        let moved = popup.under.borrow().as_ref().is_none_or(|(at, _)| *at != rect);
        if moved {
            popup.restore(ctx);
            *popup.under.borrow_mut() = Some((rect, ctx.capture_region(rect)));
            ctx.move_surface(popup.surface, rect.origin())?;
            ctx.resize_surface(popup.surface, rect.size())?;
        }
        ctx.with_surface(popup.surface, |buf, _| {
            buf.clear();
            self.draw_pulldown(buf);
        })?;
        ctx.refresh_surface(popup.surface)
    }

    fn enter(&mut self, ctx: &Context) {
        if self.popup.is_none() {
            let surface = ctx.create_surface(self.pulldown_rect(), None);
            self.popup = Some(Popup {
                surface,
                under: RefCell::new(None),
            });
        }
    }

    fn leave(&mut self, ctx: &Context) {
        if let Some(popup) = self.popup.take() {
            popup.restore(ctx);
            ctx.destroy_surface(popup.surface);
        }
    }

    fn inject(&mut self, key: Key) -> Option<ExitType> {
        let menus = self.menus.len();
        let items = self.menus[self.current_menu].items.len();
        match key {
            Key::Left => {
                self.current_menu = (self.current_menu + menus - 1) % menus;
                self.current_item = 0;
            }
            Key::Right => {
                self.current_menu = (self.current_menu + 1) % menus;
                self.current_item = 0;
            }
            Key::Up => self.current_item = (self.current_item + items - 1) % items,
            Key::Down | Key::Char(' ') => self.current_item = (self.current_item + 1) % items,
            Key::Enter => return Some(ExitType::Normal),
            Key::Escape => return Some(ExitType::EscapeHit),
            _ => {}
        }
        None
    }

    fn clean(&mut self) {
        self.current_menu = 0;
        self.current_item = 0;
    }
}

/// Lay out titles along a bar `width` cells wide.
fn layout(menus: &[&[&str]], locations: &[MenuLocation], width: i32) -> Vec<Pulldown> {
    let mut left = 0;
    let mut right = width;
    menus
        .iter()
        .enumerate()
        .map(|(i, menu)| {
            let title = menu[0].to_string();
            let title_width = string_width(&title);
            let column = match locations.get(i).copied().unwrap_or_default() {
                MenuLocation::Left => {
                    let column = left;
                    left += title_width + 1;
                    column
                }
                MenuLocation::Right => {
                    right -= title_width;
                    let column = right;
                    right -= 1;
                    column
                }
            };
            Pulldown {
                title,
                items: menu[1..].iter().map(|s| s.to_string()).collect(),
                column,
            }
        })
        .collect()
}

/// A menu bar across the screen.
pub struct Menu {
    base: WidgetBase,
    state: Rc<RefCell<MenuState>>,
}

impl Menu {
    /// Create a menu bar.
    ///
    /// Each entry of `menus` is a title followed by its items. `locations`
    /// gives the bar end of each title (missing entries default to the
    /// left). Titles are drawn with `title_attr`, items with `item_attr`.
    pub fn new(
        screen: &Screen,
        menus: &[&[&str]],
        locations: &[MenuLocation],
        position: MenuPosition,
        title_attr: Attr,
        item_attr: Attr,
    ) -> Result<Self> {
        if menus.is_empty() {
            tracing::warn!("menu without menus");
            return Err(Error::resource(ObjectType::Menu, "no menus"));
        }
        if let Some(i) = menus.iter().position(|m| m.len() < 2) {
            tracing::warn!(menu = i, "menu without items");
            return Err(Error::resource(ObjectType::Menu, format!("menu {i} has no items")));
        }

        let y = match position {
            MenuPosition::Top => 0,
            MenuPosition::Bottom => screen.height() - 1,
        };

        let mut common = Common::new(screen, 0, y, "", false);
        common.fit_outer(Size::new(screen.width(), 1));

        let state = Rc::new(RefCell::new(MenuState {
            common,
            menus: layout(menus, locations, screen.width()),
            position,
            title_attr,
            item_attr,
            current_menu: 0,
            current_item: 0,
            popup: None,
        }));
        let base = WidgetBase::new(screen, ObjectType::Menu, state.clone())?;
        Ok(Self { base, state })
    }

    /// The current `(menu, item)` pair.
    pub fn value(&self) -> (usize, usize) {
        let state = self.state.borrow();
        (state.current_menu, state.current_item)
    }

    /// Make `(menu, item)` current, clamped to the menus, and redraw.
    pub fn set_current_item(&self, menu: usize, item: usize) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            let menu = menu.min(state.menus.len() - 1);
            let item = item.min(state.menus[menu].items.len() - 1);
            state.current_menu = menu;
            state.current_item = item;
        }
        self.base.redraw()
    }

    /// Title of each menu, in bar order.
    pub fn titles(&self) -> Vec<String> {
        self.state.borrow().menus.iter().map(|m| m.title.clone()).collect()
    }

    /// Text of the item at `(menu, item)`.
    pub fn item(&self, menu: usize, item: usize) -> Option<String> {
        self.state.borrow().menus.get(menu)?.items.get(item).cloned()
    }
}

impl Widget for Menu {
    fn base(&self) -> &WidgetBase {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::context::Context;
    use crate::key::parse_keys;
    use crate::registry::Flow;
    use crate::widget::Label;

    const FILE: &[&str] = &["File", "Open", "Save", "Quit"];
    const HELP: &[&str] = &["Help", "About"];

    fn screen() -> (Screen, MemoryBackend) {
        let backend = MemoryBackend::new(30, 10);
        let ctx = Context::new(backend.clone()).unwrap();
        (Screen::new(&ctx).unwrap(), backend)
    }

    fn menu(screen: &Screen, position: MenuPosition) -> Menu {
        Menu::new(
            screen,
            &[FILE, HELP],
            &[MenuLocation::Left, MenuLocation::Right],
            position,
            Attr::BOLD,
            Attr::NONE,
        )
        .unwrap()
    }

    fn run(menu: &Menu, keys: &str) -> ExitType {
        menu.activate(Some(&parse_keys(keys).unwrap())).unwrap()
    }

    #[test]
    fn test_navigate_and_select() {
        let (screen, _) = screen();
        let menu = menu(&screen, MenuPosition::Top);
        assert_eq!(run(&menu, "<Down><Down><Enter>"), ExitType::Normal);
        assert_eq!(menu.value(), (0, 2));
        assert_eq!(menu.item(0, 2).as_deref(), Some("Quit"));
    }

    #[test]
    fn test_menus_and_items_wrap() {
        let (screen, _) = screen();
        let menu = menu(&screen, MenuPosition::Top);
        run(&menu, "<Left>");
        assert_eq!(menu.value(), (1, 0));
        run(&menu, "<Right><Up>");
        assert_eq!(menu.value(), (0, 2));
    }

    #[test]
    fn test_bar_layout() {
        let (screen, backend) = screen();
        let menu = menu(&screen, MenuPosition::Top);
        menu.draw(false).unwrap();
        assert_eq!(backend.row_text(0), format!("File{}Help", " ".repeat(22)));
        assert_eq!(menu.titles(), vec!["File", "Help"]);
    }

    #[test]
    fn test_pulldown_closes_after_activation() {
        let (screen, backend) = screen();
        let menu = menu(&screen, MenuPosition::Top);
        run(&menu, "<Esc>");
        assert!(!backend.contains_text("Open"));
        assert!(backend.contains_text("File"));
    }

    #[test]
    fn test_bottom_position() {
        let (screen, backend) = screen();
        let menu = menu(&screen, MenuPosition::Bottom);
        assert_eq!(menu.position().y, 9);
        assert_eq!(menu.size(), Size::new(30, 1));
        menu.draw(false).unwrap();
        assert!(backend.row_text(9).starts_with("File"));
    }

    #[test]
    fn test_bottom_pulldown_opens_above_bar() {
        let (screen, backend) = screen();
        let menu = menu(&screen, MenuPosition::Bottom);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let rows = seen.clone();
        let ctx = screen.context().clone();
        menu.register_callback(move |_| {
            rows.borrow_mut().extend(ctx.snapshot().lines());
            Flow::Proceed
        });
        run(&menu, "<Down>");
        let rows = seen.borrow();
        // Frame on rows 4 and 8, items on rows 5 to 7.
        assert_eq!(rows[5], "│Open│");
        assert_eq!(rows[7], "│Quit│");
        assert!(rows[9].starts_with("File"));
        assert!(!backend.contains_text("Open"));
    }

    #[test]
    fn test_bar_leaves_widgets_below_visible() {
        let (screen, backend) = screen();
        let label = Label::new(&screen, 2, 3, "visible", false).unwrap();
        label.draw(false).unwrap();
        let _menu = menu(&screen, MenuPosition::Top);
        screen.refresh().unwrap();
        assert!(backend.contains_text("visible"));
        assert!(backend.row_text(0).starts_with("File"));
    }

    #[test]
    fn test_pulldown_covers_then_restores() {
        let (screen, backend) = screen();
        let label = Label::new(&screen, 2, 3, "visible", false).unwrap();
        let menu = menu(&screen, MenuPosition::Top);
        screen.refresh().unwrap();

        let covered = Rc::new(RefCell::new(None));
        let seen = covered.clone();
        let ctx = screen.context().clone();
        menu.register_callback(move |_| {
            *seen.borrow_mut() = Some(ctx.snapshot().contains_text("visible"));
            Flow::Proceed
        });
        assert_eq!(run(&menu, "<Down><Enter>"), ExitType::Normal);
        assert_eq!(*covered.borrow(), Some(false));
        assert!(backend.contains_text("visible"));
        assert!(!backend.contains_text("Save"));
        drop(label);
    }

    #[test]
    fn test_set_current_item_clamps() {
        let (screen, _) = screen();
        let menu = menu(&screen, MenuPosition::Top);
        menu.set_current_item(5, 5).unwrap();
        assert_eq!(menu.value(), (1, 0));
    }

    #[test]
    fn test_invalid_menus() {
        let (screen, _) = screen();
        let empty = Menu::new(&screen, &[], &[], MenuPosition::Top, Attr::NONE, Attr::NONE);
        assert!(matches!(empty, Err(Error::ResourceCreation { kind: ObjectType::Menu, .. })));

        let no_items = Menu::new(&screen, &[&["Only"]], &[], MenuPosition::Top, Attr::NONE, Attr::NONE);
        assert!(no_items.is_err());
    }
}
