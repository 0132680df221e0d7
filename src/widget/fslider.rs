//! FSlider - a floating point value moved between two bounds.

use std::cell::RefCell;
use std::rc::Rc;

use super::{Common, Native, Widget, WidgetBase, resolve_dimension};
use crate::error::{Error, Result};
use crate::key::Key;
use crate::renderer::FrameBuffer;
use crate::screen::Screen;
use crate::text::string_width;
use crate::types::{Attr, ExitType, ObjectType, Rect, Size};

struct FSliderState {
    common: Common,
    label: String,
    value: f64,
    low: f64,
    high: f64,
    digits: usize,
    inc: f64,
    fast_inc: f64,
    field_width: i32,
    filler: char,
}

impl FSliderState {
    fn set(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        let scale = 10f64.powi(self.digits as i32);
        let rounded = (value * scale).round() / scale;
        self.value = rounded.clamp(self.low, self.high);
    }

    fn format(&self, value: f64) -> String {
        format!("{:.*}", self.digits, value)
    }

    fn value_width(&self) -> i32 {
        string_width(&self.format(self.low)).max(string_width(&self.format(self.high)))
    }
}

impl Native for FSliderState {
    fn common(&self) -> &Common {
        &self.common
    }

    fn common_mut(&mut self) -> &mut Common {
        &mut self.common
    }

    fn draw_body(&self, buf: &mut FrameBuffer, area: Rect) {
        let label_width = buf.draw_text(area.x, area.y, &self.label, Attr::NONE);
        let bar_x = area.x + label_width;

        let fraction = (self.value - self.low) / (self.high - self.low);
        let filled = (fraction * self.field_width as f64).round() as i32;
        buf.hline(bar_x, area.y, filled, self.filler, Attr::INVERSE);

        let text = self.format(self.value);
        let value_x = bar_x + self.field_width + 1 + self.value_width() - string_width(&text);
        buf.draw_text(value_x, area.y, &text, Attr::NONE);
    }

    fn inject(&mut self, key: Key) -> Option<ExitType> {
        match key {
            Key::Up | Key::Right | Key::Char('+') => self.set(self.value + self.inc),
            Key::Down | Key::Left | Key::Char('-') => self.set(self.value - self.inc),
            Key::PageUp => self.set(self.value + self.fast_inc),
            Key::PageDown => self.set(self.value - self.fast_inc),
            Key::Home => self.set(self.low),
            Key::End => self.set(self.high),
            Key::Enter => return Some(ExitType::Normal),
            Key::Escape => return Some(ExitType::EscapeHit),
            _ => {}
        }
        None
    }

    fn clean(&mut self) {
        self.set(self.low);
    }
}

/// Parameters of an [`FSlider`].
#[derive(Debug, Clone, PartialEq)]
pub struct FSliderParams<'a> {
    pub title: &'a str,
    pub label: &'a str,
    pub start: f64,
    pub low: f64,
    pub high: f64,
    /// Decimal places shown and kept.
    pub digits: usize,
    pub inc: f64,
    pub fast_inc: f64,
    /// Bar width; 0 takes the screen width minus the label and 10 cells.
    pub field_width: i32,
    pub filler: char,
    pub boxed: bool,
}

impl Default for FSliderParams<'_> {
    fn default() -> Self {
        Self {
            title: "",
            label: "",
            start: 0.0,
            low: 0.0,
            high: 100.0,
            digits: 1,
            inc: 1.0,
            fast_inc: 10.0,
            field_width: 0,
            filler: ' ',
            boxed: true,
        }
    }
}

/// A horizontal slider over a floating point range.
pub struct FSlider {
    base: WidgetBase,
    state: Rc<RefCell<FSliderState>>,
}

impl FSlider {
    pub fn new(screen: &Screen, x: i32, y: i32, params: FSliderParams<'_>) -> Result<Self> {
        if !(params.low < params.high) {
            tracing::warn!(low = params.low, high = params.high, "slider range is empty");
            return Err(Error::resource(
                ObjectType::FSlider,
                format!("low {} is not below high {}", params.low, params.high),
            ));
        }

        let label_width = string_width(params.label);
        let field_width = resolve_dimension(screen.width() - label_width - 10, params.field_width).max(1);

        let mut state = FSliderState {
            common: Common::new(screen, x, y, params.title, params.boxed),
            label: params.label.to_string(),
            value: params.low,
            low: params.low,
            high: params.high,
            digits: params.digits,
            inc: params.inc,
            fast_inc: params.fast_inc,
            field_width,
            filler: params.filler,
        };
        state.set(params.start);
        let body = Size::new(label_width + field_width + 1 + state.value_width(), 1);
        state.common.fit_body(body);

        let state = Rc::new(RefCell::new(state));
        let base = WidgetBase::new(screen, ObjectType::FSlider, state.clone())?;
        Ok(Self { base, state })
    }

    pub fn value(&self) -> f64 {
        self.state.borrow().value
    }

    /// Set the value, clamped to the range, and redraw.
    pub fn set_value(&self, value: f64) -> Result<()> {
        self.state.borrow_mut().set(value);
        self.base.redraw()
    }

    pub fn low_high(&self) -> (f64, f64) {
        let state = self.state.borrow();
        (state.low, state.high)
    }

    /// Change the range, clamping the current value into it.
    ///
    /// The value display keeps the width chosen at construction.
    pub fn set_low_high(&self, low: f64, high: f64) -> Result<()> {
        if !(low < high) {
            return Err(Error::resource(
                ObjectType::FSlider,
                format!("low {low} is not below high {high}"),
            ));
        }
        {
            let mut state = self.state.borrow_mut();
            state.low = low;
            state.high = high;
            let value = state.value;
            state.set(value);
        }
        self.base.redraw()
    }

    pub fn field_width(&self) -> i32 {
        self.state.borrow().field_width
    }
}

impl Widget for FSlider {
    fn base(&self) -> &WidgetBase {
        &self.base
    }
}
