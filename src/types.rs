//! Core types for cdk-tui.
//!
//! Geometry, cell attributes, and the small enums that flow between
//! screens, widgets and the renderer.

use std::fmt;
use std::ops::{Add, Sub};

// =============================================================================
// Geometry
// =============================================================================

/// A position in terminal cells. Signed so that widgets may be moved
/// partially off-screen; drawing clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const ORIGIN: Self = Self { x: 0, y: 0 };
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A size in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// A rectangle in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_parts(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    /// Check if a point is inside this rect.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// True when `other` lies entirely inside this rect.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Compute intersection of two rects.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x2 > x1 && y2 > y1 {
            Some(Rect::new(x1, y1, x2 - x1, y2 - y1))
        } else {
            None
        }
    }

    /// Shrink by `n` cells on every side.
    pub fn inset(&self, n: i32) -> Rect {
        Rect::new(
            self.x + n,
            self.y + n,
            (self.width - 2 * n).max(0),
            (self.height - 2 * n).max(0),
        )
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

// =============================================================================
// Cell Attributes (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Text attributes as a bitfield for efficient storage and comparison.
    ///
    /// Combine with bitwise OR: `Attr::BOLD | Attr::UNDERLINE`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attr: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const BLINK = 1 << 4;
        const INVERSE = 1 << 5;
        const HIDDEN = 1 << 6;
        const STRIKETHROUGH = 1 << 7;
    }
}

// =============================================================================
// Cell - The atomic unit of terminal rendering
// =============================================================================

/// A single terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub attrs: Attr,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        attrs: Attr::NONE,
    };

    pub const fn new(ch: char, attrs: Attr) -> Self {
        Self { ch, attrs }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

// =============================================================================
// Border Styles
// =============================================================================

/// Border style used by boxed windows and widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    /// ─ │ ┌ ┐ └ ┘
    #[default]
    Single,
    /// ═ ║ ╔ ╗ ╚ ╝
    Double,
    /// ─ │ ╭ ╮ ╰ ╯
    Rounded,
    /// ━ ┃ ┏ ┓ ┗ ┛
    Bold,
    /// - | + + + +
    Ascii,
}

impl BorderStyle {
    /// Get the border characters for this style.
    ///
    /// Returns: (horizontal, vertical, top_left, top_right, bottom_right, bottom_left)
    pub const fn chars(&self) -> (char, char, char, char, char, char) {
        match self {
            Self::Single => ('─', '│', '┌', '┐', '┘', '└'),
            Self::Double => ('═', '║', '╔', '╗', '╝', '╚'),
            Self::Rounded => ('─', '│', '╭', '╮', '╯', '╰'),
            Self::Bold => ('━', '┃', '┏', '┓', '┛', '┗'),
            Self::Ascii => ('-', '|', '+', '+', '+', '+'),
        }
    }

    /// Parse a style name as used in configuration.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "single" => Some(Self::Single),
            "double" => Some(Self::Double),
            "rounded" => Some(Self::Rounded),
            "bold" => Some(Self::Bold),
            "ascii" => Some(Self::Ascii),
            _ => None,
        }
    }
}

// =============================================================================
// Widget enums
// =============================================================================

/// Fixed type tag of a widget, assigned at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Entry,
    Menu,
    Label,
    Radio,
    FSlider,
    Buttonbox,
    Selection,
    FileSelector,
}

impl ObjectType {
    /// Whether screen traversal may give this widget the focus.
    pub fn is_focusable(&self) -> bool {
        !matches!(self, ObjectType::Label)
    }
}

/// Why an activation loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExitType {
    /// The preset input ran out, or a hook asked the loop to stop.
    EarlyExit,
    /// The user cancelled with Escape.
    EscapeHit,
    /// The user confirmed.
    Normal,
    /// The widget has not been activated yet.
    #[default]
    NeverActivated,
    /// The widget could not run its loop.
    Error,
}

/// Which characters an entry field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayType {
    /// Any printable character.
    #[default]
    Mixed,
    /// Alphabetic characters only.
    Char,
    /// Digits, with a leading minus sign.
    Int,
    /// Any printable character, shown as `*`.
    Hidden,
}

impl DisplayType {
    /// Whether `ch` may be inserted at `position` of the current text.
    pub fn accepts(&self, ch: char, position: usize) -> bool {
        if ch.is_control() {
            return false;
        }
        match self {
            Self::Mixed | Self::Hidden => true,
            Self::Char => ch.is_alphabetic(),
            Self::Int => ch.is_ascii_digit() || (ch == '-' && position == 0),
        }
    }
}

/// Where a list widget draws its scroll indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBar {
    #[default]
    None,
    Left,
    Right,
}

// =============================================================================
// Tests
// =============================================================================
