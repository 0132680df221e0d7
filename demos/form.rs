//! Form Example - a small dialog built from several widgets
//!
//! Fills in a name, picks a colour and a volume, then shows what was
//! entered. `Tab` moves between widgets, `Esc` cancels.
//!
//! Logs go to `form.log` in the current directory; set `RUST_LOG` to
//! change the level.
//!
//! Run with: cargo run --example form

use anyhow::Result;
use cdk_tui::{
    Attr, Buttonbox, Context, DisplayType, Entry, ExitType, FSlider, FSliderParams, Flow, Key,
    Radio, Screen, ScrollBar, Widget, WidgetRef, install_panic_hook,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const COLOURS: &[&str] = &["Red", "Green", "Blue", "Yellow"];
const BUTTONS: &[&str] = &["OK", "Cancel"];

fn init_logging() -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::never(".", "form.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    // Nothing may write to the terminal while the form owns it.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();
    guard
}

fn main() -> Result<()> {
    let _guard = init_logging();
    install_panic_hook();

    let ctx = Context::terminal()?;
    let screen = Screen::new(&ctx)?;
    screen.draw_title("<Tab> next field    <Esc> cancel")?;

    let name = Entry::new(&screen, 2, 2, "", "Name: ", DisplayType::Mixed, 30, 1, 40)?;
    let colour = Radio::new(
        &screen,
        2,
        6,
        ScrollBar::Right,
        COLOURS.len() as i32 + 3,
        24,
        "Colour",
        COLOURS,
        'X',
        0,
        Attr::INVERSE,
        true,
    )?;
    let volume = FSlider::new(
        &screen,
        30,
        6,
        FSliderParams {
            title: "Volume",
            label: "",
            start: 50.0,
            high: 100.0,
            digits: 0,
            inc: 1.0,
            fast_inc: 10.0,
            field_width: 20,
            filler: '=',
            ..FSliderParams::default()
        },
    )?;
    let buttons = Buttonbox::new(&screen, 2, 14, 0, 0, "", 1, 2, BUTTONS, Attr::INVERSE, true)?;

    // Digits are not names.
    name.set_pre_process(|key| match key {
        Key::Char(c) if c.is_ascii_digit() => Flow::Consume,
        _ => Flow::Proceed,
    });
    screen.set_callback(|_: &Screen, widget: WidgetRef, key: Key| {
        tracing::debug!(widget = %widget.handle, ?key, "key handled");
        Flow::Proceed
    });

    let exit = screen.traverse()?;
    tracing::info!(?exit, "form finished");

    let summary = match exit {
        ExitType::Normal if buttons.value() == 0 => format!(
            "Name:   {}\nColour: {}\nVolume: {}",
            name.value(),
            COLOURS[colour.value()],
            volume.value()
        ),
        _ => "Cancelled".to_string(),
    };
    screen.popup_label(&summary)?;
    Ok(())
}
