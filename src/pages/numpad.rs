// src/pages/numpad.rs
//! Numeric keypad page for entering a bounded integer.
//!
//! Layout on an 800x480 panel:
//!
//! ```text
//! +-----------------------------------------------------------+
//! | title                            000123            unit   |
//! | RANGE: lo...hi                                            |
//! +--------------+--------------+--------------+--------------+
//! |      7       |      8       |      9       |    Cancel    |
//! |      4       |      5       |      6       |  Backspace   |
//! |      1       |      2       |      3       |    Clear     |
//! |              |      0       |              |      OK      |
//! +--------------+--------------+--------------+--------------+
//! ```
//!
//! Input never has a leading zero. OK is only enabled while the entry lies
//! inside the accepted range; the range hint is shown otherwise.

use std::sync::Arc;

use embedded_graphics::prelude::*;
use embedded_graphics::text::Alignment;
use log::debug;
use parking_lot::Mutex;

use crate::engine::ClickContext;
use crate::error::{GuiError, Result};
use crate::pages::page::{Page, PageHooks};
use crate::ui::components::{Button, ButtonState, Frame, TextBox};
use crate::ui::core::{Clickable, Renderable};
use crate::ui::styling::{BLACK, ColorTriple, GREEN, RED, TextBoxPalette, YELLOW};
use crate::ui::text_layout::TextSize;

/// Most digits an entry can hold; always fits a `u64`.
pub const MAX_DIGITS: usize = 18;

pub const DISPLAY: &str = "display";
pub const UNIT: &str = "unit";
pub const INPUT: &str = "input";
pub const RANGE: &str = "range";
pub const TITLE: &str = "title";
pub const CANCEL: &str = "cancel";
pub const CLEAR: &str = "clear";
pub const BACKSPACE: &str = "backspace";
pub const ENTER: &str = "enter";

/// Widget name of the digit button for `digit`.
pub fn digit_name(digit: u8) -> heapless::String<8> {
    let mut name = heapless::String::new();
    name.push_str("num").ok();
    name.push(char::from(b'0' + digit % 10)).ok();
    name
}

/// Digits typed so far and the range they must fall in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    digits: heapless::String<MAX_DIGITS>,
    max_len: usize,
    low: u64,
    high: u64,
}

impl Entry {
    pub fn new(max_len: usize, low: u64, high: u64) -> Self {
        Self {
            digits: heapless::String::new(),
            max_len: max_len.clamp(1, MAX_DIGITS),
            low,
            high,
        }
    }

    /// Append a digit. Returns false when the entry is full or the digit would
    /// be a leading zero.
    pub fn push_digit(&mut self, digit: u8) -> bool {
        if digit > 9 || self.digits.len() >= self.max_len {
            return false;
        }
        if digit == 0 && self.digits.is_empty() {
            return false;
        }
        self.digits.push(char::from(b'0' + digit)).is_ok()
    }

    pub fn backspace(&mut self) -> bool {
        self.digits.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.digits.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn value(&self) -> Option<u64> {
        self.digits.parse().ok()
    }

    /// Non-empty and within the range.
    pub fn is_acceptable(&self) -> bool {
        self.value()
            .is_some_and(|v| (self.low..=self.high).contains(&v))
    }

    /// Digits left-padded with zeros to the full entry width.
    pub fn display(&self) -> String {
        format!("{:0>width$}", self.digits.as_str(), width = self.max_len)
    }

    pub fn range_hint(&self) -> String {
        format!("RANGE: {}...{}", self.low, self.high)
    }
}

pub type AcceptHandler = Box<dyn FnMut(u64, &mut ClickContext<'_>) -> Result<()> + Send>;
pub type CancelHandler = Box<dyn FnMut(&mut ClickContext<'_>) -> Result<()> + Send>;

struct NumPadState {
    entry: Entry,
    on_accept: Option<AcceptHandler>,
    on_cancel: Option<CancelHandler>,
}

/// Hooks for a keypad page. Build one and turn it into a [`Page`] with
/// [`NumPad::into_page`].
pub struct NumPad {
    title: String,
    unit: String,
    state: Arc<Mutex<NumPadState>>,
}

impl NumPad {
    pub fn new(title: &str, unit: &str, max_len: usize, low: u64, high: u64) -> Self {
        Self {
            title: title.to_string(),
            unit: unit.to_string(),
            state: Arc::new(Mutex::new(NumPadState {
                entry: Entry::new(max_len, low, high),
                on_accept: None,
                on_cancel: None,
            })),
        }
    }

    /// Called with the entered value when OK is pressed. The entry is cleared
    /// afterwards.
    pub fn on_accept<F>(self, handler: F) -> Self
    where
        F: FnMut(u64, &mut ClickContext<'_>) -> Result<()> + Send + 'static,
    {
        self.state.lock().on_accept = Some(Box::new(handler));
        self
    }

    /// Called after the entry is cleared by Cancel.
    pub fn on_cancel<F>(self, handler: F) -> Self
    where
        F: FnMut(&mut ClickContext<'_>) -> Result<()> + Send + 'static,
    {
        self.state.lock().on_cancel = Some(Box::new(handler));
        self
    }

    pub fn into_page(self, name: &str) -> Page {
        Page::with_hooks(name, self)
    }

    fn digit_button(&self, digit: u8, x: i32, y: i32) -> Button {
        let state = Arc::clone(&self.state);
        let label = char::from(b'0' + digit).to_string();
        Button::new(&digit_name(digit), Point::new(x, y), Size::new(200, 90), &label).on_click(
            move |_| {
                state.lock().entry.push_digit(digit);
                Ok(())
            },
        )
    }

    /// Copy the entry into the display widgets without rendering them.
    fn sync(&self, page: &mut Page) -> Result<()> {
        let entry = self.state.lock().entry.clone();
        let has_input = !entry.is_empty();

        text_box(page, TITLE)?.set_text(&self.title);
        text_box(page, INPUT)?.set_text(&entry.display());
        text_box(page, RANGE)?
            .base_mut()
            .set_visible(!entry.is_acceptable());
        let zero = digit_name(0);
        for name in [zero.as_str(), CLEAR, BACKSPACE] {
            button(page, name)?.set_enabled(has_input);
        }
        button(page, ENTER)?.set_enabled(entry.is_acceptable());
        Ok(())
    }
}

fn text_box<'p>(page: &'p mut Page, name: &str) -> Result<&'p mut TextBox> {
    let page_name = page.name().to_string();
    page.text_box_mut(name).ok_or_else(|| GuiError::UnknownWidget {
        page: page_name,
        widget: name.to_string(),
    })
}

fn button<'p>(page: &'p mut Page, name: &str) -> Result<&'p mut Button> {
    let page_name = page.name().to_string();
    page.button_mut(name).ok_or_else(|| GuiError::UnknownWidget {
        page: page_name,
        widget: name.to_string(),
    })
}

impl PageHooks for NumPad {
    fn initialize(&mut self, page: &mut Page) -> Result<()> {
        let (range_hint, input) = {
            let state = self.state.lock();
            (state.entry.range_hint(), state.entry.display())
        };

        page.add_widget(Frame::new(DISPLAY, Point::new(0, 0), Size::new(800, 120)));
        page.add_widget(
            TextBox::new(UNIT, Point::new(600, 2), Size::new(125, 117), &self.unit)
                .with_alignment(Alignment::Right),
        );
        page.add_widget(
            TextBox::new(INPUT, Point::new(402, 2), Size::new(197, 117), &input)
                .with_alignment(Alignment::Right),
        );
        page.add_widget(
            TextBox::new(RANGE, Point::new(25, 64), Size::new(187, 40), &range_hint)
                .with_alignment(Alignment::Left)
                .with_text_size(TextSize::Medium)
                .with_palette(TextBoxPalette {
                    border_normal: RED,
                    text_normal: RED,
                    ..TextBoxPalette::default()
                }),
        );
        page.add_widget(
            TextBox::new(TITLE, Point::new(25, 15), Size::new(382, 47), &self.title)
                .with_alignment(Alignment::Left),
        );

        let rows: [[u8; 3]; 3] = [[7, 8, 9], [4, 5, 6], [1, 2, 3]];
        for (row, digits) in rows.iter().enumerate() {
            for (col, &digit) in digits.iter().enumerate() {
                let button = self.digit_button(digit, col as i32 * 200, 120 + row as i32 * 90);
                page.add_widget(button);
            }
        }
        page.add_widget(self.digit_button(0, 200, 390).with_enabled(false));

        let state = Arc::clone(&self.state);
        page.add_widget(
            Button::new(CANCEL, Point::new(600, 120), Size::new(200, 90), "Cancel")
                .with_state_colors(ButtonState::Inactive, ColorTriple::new(RED, RED, BLACK))
                .on_click(move |ctx| {
                    let mut state = state.lock();
                    state.entry.clear();
                    match state.on_cancel.as_mut() {
                        Some(handler) => handler(ctx),
                        None => Ok(()),
                    }
                }),
        );

        let state = Arc::clone(&self.state);
        page.add_widget(
            Button::new(CLEAR, Point::new(600, 300), Size::new(200, 90), "Clear")
                .with_text_size(TextSize::Medium)
                .with_state_colors(ButtonState::Inactive, ColorTriple::new(YELLOW, BLACK, YELLOW))
                .with_enabled(false)
                .on_click(move |_| {
                    state.lock().entry.clear();
                    Ok(())
                }),
        );

        let state = Arc::clone(&self.state);
        page.add_widget(
            Button::new(BACKSPACE, Point::new(600, 210), Size::new(200, 90), "Backspace")
                .with_text_size(TextSize::Medium)
                .with_state_colors(ButtonState::Inactive, ColorTriple::new(YELLOW, BLACK, YELLOW))
                .with_enabled(false)
                .on_click(move |_| {
                    state.lock().entry.backspace();
                    Ok(())
                }),
        );

        let state = Arc::clone(&self.state);
        page.add_widget(
            Button::new(ENTER, Point::new(600, 390), Size::new(200, 90), "OK")
                .with_state_colors(ButtonState::Inactive, ColorTriple::new(GREEN, GREEN, BLACK))
                .with_enabled(false)
                .on_click(move |ctx| {
                    let mut state = state.lock();
                    let NumPadState {
                        entry, on_accept, ..
                    } = &mut *state;
                    if let Some(value) = entry.value()
                        && let Some(handler) = on_accept.as_mut()
                    {
                        debug!("numpad accepted {value}");
                        handler(value, ctx)?;
                        entry.clear();
                    }
                    Ok(())
                }),
        );

        self.sync(page)
    }

    fn before_render(&mut self, page: &mut Page) -> Result<()> {
        self.sync(page)
    }

    fn after_click(&mut self, page: &mut Page, _widget: &str) -> Result<()> {
        self.sync(page)?;
        let zero = digit_name(0);
        for name in [INPUT, zero.as_str(), CLEAR, BACKSPACE, ENTER, RANGE] {
            page.render_widget(name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::dispatch::Request;
    use crate::engine::dispatch::testing::Harness;
    use crate::framebuffer::Surface;
    use std::time::Duration;

    #[test]
    fn test_entry_rejects_leading_zero_and_overflow() {
        let mut entry = Entry::new(3, 0, 999);
        assert!(!entry.push_digit(0));
        assert!(entry.push_digit(1));
        assert!(entry.push_digit(0));
        assert!(entry.push_digit(5));
        assert!(!entry.push_digit(7));
        assert_eq!(entry.value(), Some(105));
        assert_eq!(entry.display(), "105");
    }

    #[test]
    fn test_entry_display_is_zero_padded() {
        let mut entry = Entry::new(6, 100, 200);
        assert_eq!(entry.display(), "000000");
        entry.push_digit(4);
        entry.push_digit(2);
        assert_eq!(entry.display(), "000042");
        assert!(!entry.is_acceptable());
        assert_eq!(entry.range_hint(), "RANGE: 100...200");
    }

    #[test]
    fn test_entry_range_and_backspace() {
        let mut entry = Entry::new(4, 10, 50);
        assert!(!entry.is_acceptable());
        entry.push_digit(4);
        entry.push_digit(2);
        assert!(entry.is_acceptable());
        entry.push_digit(0);
        assert!(!entry.is_acceptable());
        assert!(entry.backspace());
        assert_eq!(entry.value(), Some(42));
        entry.clear();
        assert!(!entry.backspace());
        assert_eq!(entry.value(), None);
    }

    #[test]
    fn test_max_len_is_clamped() {
        let mut entry = Entry::new(40, 0, u64::MAX);
        for _ in 0..40 {
            entry.push_digit(9);
        }
        assert_eq!(entry.display().len(), MAX_DIGITS);
        assert!(entry.value().is_some());
    }

    fn click(page: &mut Page, harness: &mut Harness, name: &str) {
        let index = page.widget_index(name).unwrap();
        let mut env = harness.env(Duration::from_millis(100));
        page.dispatch_click(0, index, &mut env).unwrap();
    }

    #[test]
    fn test_keypad_flow_enables_ok_and_accepts() {
        let accepted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&accepted);
        let mut page = NumPad::new("Frequency", "MHz", 4, 100, 500)
            .on_accept(move |value, ctx| {
                sink.lock().push(value);
                ctx.show("home");
                Ok(())
            })
            .into_page("freq");
        page.bind_surface(Surface::new(Size::new(800, 480)));
        page.initialize().unwrap();
        page.render().unwrap();

        assert!(!page.button(ENTER).unwrap().is_enabled());
        assert!(!page.button(&digit_name(0)).unwrap().is_enabled());
        assert!(page.text_box(RANGE).unwrap().base().is_visible());

        let mut harness = Harness::default();
        click(&mut page, &mut harness, &digit_name(2));
        click(&mut page, &mut harness, &digit_name(0));
        click(&mut page, &mut harness, &digit_name(5));

        assert_eq!(page.text_box(INPUT).unwrap().text(), "0205");
        assert!(page.button(ENTER).unwrap().is_enabled());
        assert!(!page.text_box(RANGE).unwrap().base().is_visible());

        click(&mut page, &mut harness, ENTER);
        assert_eq!(*accepted.lock(), vec![205]);
        assert_eq!(page.text_box(INPUT).unwrap().text(), "0000");
        assert!(!page.button(ENTER).unwrap().is_enabled());
        assert_eq!(harness.requests, vec![Request::Show("home".into())]);
    }

    #[test]
    fn test_cancel_clears_then_calls_back() {
        let cancelled = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&cancelled);
        let mut page = NumPad::new("Level", "dB", 2, 0, 99)
            .on_cancel(move |_| {
                *counter.lock() += 1;
                Ok(())
            })
            .into_page("level");
        page.bind_surface(Surface::new(Size::new(800, 480)));
        page.initialize().unwrap();

        let mut harness = Harness::default();
        click(&mut page, &mut harness, &digit_name(7));
        click(&mut page, &mut harness, BACKSPACE);
        assert_eq!(page.text_box(INPUT).unwrap().text(), "00");
        assert!(!page.button(BACKSPACE).unwrap().is_enabled());

        click(&mut page, &mut harness, &digit_name(3));
        click(&mut page, &mut harness, CANCEL);
        assert_eq!(*cancelled.lock(), 1);
        assert_eq!(page.text_box(INPUT).unwrap().text(), "00");
    }
}
