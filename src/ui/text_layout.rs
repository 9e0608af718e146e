//! Word-wrapping text layout for mono fonts.
//!
//! Widgets hand this module a string, a bounding box and a style and get the
//! text painted inside the box. Text that cannot fit is an error rather than
//! being clipped, so a badly sized label shows up immediately.

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, ascii};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Alignment, Baseline, Text};
use embedded_layout::prelude::*;
use thiserror::Error;

use crate::framebuffer::{FrameBuffer, infallible};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("the word {word:?} is too long to fit in {width}px")]
    WordTooLong { word: String, width: u32 },
    #[error("wrapped text needs {needed}px but only {available}px are available")]
    TextTooTall { needed: u32, available: u32 },
}

/// Text size presets backed by the embedded-graphics ASCII mono fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextSize {
    /// 5x8
    Small,
    /// 6x10
    Medium,
    /// 10x20
    #[default]
    Large,
}

impl TextSize {
    pub fn font(&self) -> &'static MonoFont<'static> {
        match self {
            TextSize::Small => &ascii::FONT_5X8,
            TextSize::Medium => &ascii::FONT_6X10,
            TextSize::Large => &ascii::FONT_10X20,
        }
    }
}

/// Font and colors for one block of text.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub font: &'static MonoFont<'static>,
    pub color: Rgb565,
    pub background: Rgb565,
}

impl TextStyle {
    pub fn new(size: TextSize, color: Rgb565, background: Rgb565) -> Self {
        Self {
            font: size.font(),
            color,
            background,
        }
    }

    fn glyphs(&self) -> MonoTextStyle<'static, Rgb565> {
        MonoTextStyle::new(self.font, self.color)
    }
}

/// Rendered width of `text` in pixels.
pub fn text_width(text: &str, font: &MonoFont<'_>) -> u32 {
    let count = text.chars().count() as u32;
    if count == 0 {
        return 0;
    }
    count * font.character_size.width + (count - 1) * font.character_spacing
}

/// Break `text` into lines no wider than `max_width`.
///
/// Explicit `\n` always starts a new line. Within a line, words are packed
/// greedily; a single word wider than `max_width` is an error.
pub fn wrap(text: &str, font: &MonoFont<'_>, max_width: u32) -> Result<Vec<String>, LayoutError> {
    let mut lines = Vec::new();

    for requested in text.split('\n') {
        if text_width(requested, font) <= max_width {
            lines.push(requested.to_string());
            continue;
        }

        let mut current = String::new();
        for word in requested.split(' ') {
            if text_width(word, font) > max_width {
                return Err(LayoutError::WordTooLong {
                    word: word.to_string(),
                    width: max_width,
                });
            }

            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };

            if text_width(&candidate, font) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        lines.push(current);
    }

    Ok(lines)
}

/// Fill `area` with the background and paint the wrapped text top-down.
pub fn draw_block(
    target: &mut FrameBuffer,
    text: &str,
    area: Rectangle,
    style: &TextStyle,
    alignment: Alignment,
) -> Result<(), LayoutError> {
    let lines = wrap(text, style.font, area.size.width)?;
    let line_height = style.font.character_size.height;
    let needed = line_height * lines.len() as u32;
    if needed > area.size.height {
        return Err(LayoutError::TextTooTall {
            needed,
            available: area.size.height,
        });
    }

    target.fill_rect(&area, style.background);

    for (row, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let slot = Rectangle::new(
            area.top_left + Point::new(0, (row as u32 * line_height) as i32),
            Size::new(area.size.width, line_height),
        );
        let text = Text::with_baseline(line, Point::zero(), style.glyphs(), Baseline::Top);
        let placed = match alignment {
            Alignment::Left => text.align_to(&slot, horizontal::Left, vertical::Top),
            Alignment::Center => text.align_to(&slot, horizontal::Center, vertical::Top),
            Alignment::Right => text.align_to(&slot, horizontal::Right, vertical::Top),
        };
        infallible(placed.draw(target));
    }

    Ok(())
}

/// Paint a single line centered on `area` without wrapping.
pub fn draw_centered(target: &mut FrameBuffer, text: &str, area: Rectangle, style: &TextStyle) {
    if text.is_empty() {
        return;
    }
    let text = Text::with_baseline(text, Point::zero(), style.glyphs(), Baseline::Top)
        .align_to(&area, horizontal::Center, vertical::Center);
    infallible(text.draw(target));
}

#[cfg(test)]
mod tests {
    use super::*;

    const FONT: &MonoFont<'static> = &ascii::FONT_6X10;

    #[test]
    fn test_text_width_counts_spacing() {
        assert_eq!(text_width("", FONT), 0);
        assert_eq!(text_width("ab", FONT), 12 + FONT.character_spacing);
    }

    #[test]
    fn test_wrap_respects_newlines_and_width() {
        let lines = wrap("one two three\nfour", FONT, 6 * 8).unwrap();
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn test_wrap_keeps_short_lines_intact() {
        let lines = wrap("OK", FONT, 100).unwrap();
        assert_eq!(lines, vec!["OK"]);
    }

    #[test]
    fn test_word_too_long_is_error() {
        let err = wrap("Backspace", FONT, 30).unwrap_err();
        assert_eq!(
            err,
            LayoutError::WordTooLong {
                word: "Backspace".into(),
                width: 30
            }
        );
    }

    #[test]
    fn test_too_tall_is_error() {
        let mut fb = FrameBuffer::new(Size::new(64, 64));
        let area = Rectangle::new(Point::zero(), Size::new(64, 15));
        let style = TextStyle::new(TextSize::Medium, Rgb565::GREEN, Rgb565::BLACK);

        let err = draw_block(&mut fb, "a\nb", area, &style, Alignment::Left).unwrap_err();
        assert_eq!(
            err,
            LayoutError::TextTooTall {
                needed: 20,
                available: 15
            }
        );
    }

    #[test]
    fn test_draw_block_paints_background_and_glyphs() {
        let mut fb = FrameBuffer::new(Size::new(64, 32));
        let area = Rectangle::new(Point::new(2, 2), Size::new(60, 28));
        let style = TextStyle::new(TextSize::Medium, Rgb565::GREEN, Rgb565::BLUE);

        draw_block(&mut fb, "HI", area, &style, Alignment::Right).unwrap();

        assert_eq!(fb.pixel(Point::new(2, 2)), Some(Rgb565::BLUE));
        assert_eq!(fb.pixel(Point::new(0, 0)), Some(Rgb565::BLACK));
        let green = fb.pixels().iter().filter(|&&p| p == Rgb565::GREEN).count();
        assert!(green > 0);
        // right aligned: nothing drawn in the left half
        let left_green = (2..30)
            .flat_map(|x| (2..30).map(move |y| Point::new(x, y)))
            .filter(|&p| fb.pixel(p) == Some(Rgb565::GREEN))
            .count();
        assert_eq!(left_green, 0);
    }
}
