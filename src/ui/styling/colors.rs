//! Color definitions and per-widget palettes
//!
//! All colors are RGB565, the native format of the framebuffer.
//!
//! # RGB565 Format
//! - Red: 5 bits (0-31)
//! - Green: 6 bits (0-63)
//! - Blue: 5 bits (0-31)
//!
//! [`rgb`] converts from 8-bit RGB: R>>3, G>>2, B>>3

use embedded_graphics::pixelcolor::Rgb565;

use crate::ui::components::button::ButtonState;

/// Convert an 8-bit-per-channel color to RGB565.
pub const fn rgb(r: u8, g: u8, b: u8) -> Rgb565 {
    Rgb565::new(r >> 3, g >> 2, b >> 3)
}

// ============================================================================
// Base Colors
// ============================================================================

pub const BLACK: Rgb565 = rgb(0, 0, 0);
pub const WHITE: Rgb565 = rgb(255, 255, 255);
/// Phosphor green used for borders and text throughout
pub const GREEN: Rgb565 = rgb(0, 255, 0);
pub const RED: Rgb565 = rgb(255, 0, 0);
pub const YELLOW: Rgb565 = rgb(255, 255, 0);
/// Barely visible gray for disabled borders and text
pub const DIM_GRAY: Rgb565 = rgb(32, 32, 32);
pub const DARK_GRAY: Rgb565 = rgb(64, 64, 64);

/// Border, body and text color painted for one button state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorTriple {
    pub border: Rgb565,
    pub body: Rgb565,
    pub text: Rgb565,
}

impl ColorTriple {
    pub const fn new(border: Rgb565, body: Rgb565, text: Rgb565) -> Self {
        Self { border, body, text }
    }
}

/// Colors for every [`ButtonState`], plus the fill used while invisible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonPalette {
    pub inactive: ColorTriple,
    pub active: ColorTriple,
    pub clicked: ColorTriple,
    pub disabled: ColorTriple,
    pub background: Rgb565,
}

impl Default for ButtonPalette {
    fn default() -> Self {
        Self {
            inactive: ColorTriple::new(GREEN, BLACK, GREEN),
            active: ColorTriple::new(GREEN, GREEN, BLACK),
            clicked: ColorTriple::new(WHITE, WHITE, BLACK),
            disabled: ColorTriple::new(DIM_GRAY, BLACK, DIM_GRAY),
            background: BLACK,
        }
    }
}

impl ButtonPalette {
    pub fn for_state(&self, state: ButtonState) -> ColorTriple {
        match state {
            ButtonState::Inactive => self.inactive,
            ButtonState::Active => self.active,
            ButtonState::Clicked => self.clicked,
            ButtonState::Disabled => self.disabled,
        }
    }

    pub fn for_state_mut(&mut self, state: ButtonState) -> &mut ColorTriple {
        match state {
            ButtonState::Inactive => &mut self.inactive,
            ButtonState::Active => &mut self.active,
            ButtonState::Clicked => &mut self.clicked,
            ButtonState::Disabled => &mut self.disabled,
        }
    }
}

/// Text box colors. The body is always `background`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBoxPalette {
    pub border_normal: Rgb565,
    pub border_clicked: Rgb565,
    pub border_disabled: Rgb565,
    pub text_normal: Rgb565,
    pub text_clicked: Rgb565,
    pub text_disabled: Rgb565,
    pub background: Rgb565,
}

impl Default for TextBoxPalette {
    fn default() -> Self {
        Self {
            border_normal: GREEN,
            border_clicked: WHITE,
            border_disabled: DARK_GRAY,
            text_normal: GREEN,
            text_clicked: BLACK,
            text_disabled: DIM_GRAY,
            background: BLACK,
        }
    }
}

/// Outline colors for [`Frame`](crate::ui::components::Frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePalette {
    pub border: Rgb565,
    pub border_disabled: Rgb565,
    pub background: Rgb565,
}

impl Default for FramePalette {
    fn default() -> Self {
        Self {
            border: GREEN,
            border_disabled: DIM_GRAY,
            background: BLACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::RgbColor;

    #[test]
    fn test_rgb_conversion_extremes() {
        assert_eq!(rgb(255, 255, 255), Rgb565::WHITE);
        assert_eq!(rgb(0, 255, 0), Rgb565::GREEN);
        assert_eq!(rgb(32, 32, 32), Rgb565::new(4, 8, 4));
    }

    #[test]
    fn test_every_state_has_distinct_default_triple() {
        let palette = ButtonPalette::default();
        let states = [
            ButtonState::Inactive,
            ButtonState::Active,
            ButtonState::Clicked,
            ButtonState::Disabled,
        ];
        for (i, a) in states.iter().enumerate() {
            for b in &states[i + 1..] {
                assert_ne!(palette.for_state(*a), palette.for_state(*b));
            }
        }
    }
}
