// src/ui/components/text_box.rs
//! Word-wrapped text label with an optional border

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Alignment;

use crate::engine::ClickContext;
use crate::error::{GuiError, Result};
use crate::framebuffer::FrameBuffer;
use crate::ui::components::button::inset;
use crate::ui::core::{ClickBinding, Clickable, Renderable, WidgetBase};
use crate::ui::styling::TextBoxPalette;
use crate::ui::text_layout::{self, TextSize, TextStyle};

/// Multi-line text box. Clickable, though most labels have no handler.
pub struct TextBox {
    base: WidgetBase,
    binding: ClickBinding,
    text: String,
    clicked: bool,
    border_visible: bool,
    alignment: Alignment,
    palette: TextBoxPalette,
    text_size: TextSize,
}

impl TextBox {
    pub fn new(name: &str, position: Point, size: Size, text: &str) -> Self {
        Self {
            base: WidgetBase::new(name, position, size),
            binding: ClickBinding::default(),
            text: text.to_string(),
            clicked: false,
            border_visible: false,
            alignment: Alignment::Center,
            palette: TextBoxPalette::default(),
            text_size: TextSize::default(),
        }
    }

    pub fn on_click<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&mut ClickContext<'_>) -> Result<()> + Send + 'static,
    {
        self.binding.set_handler(Box::new(handler));
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_border(mut self, visible: bool) -> Self {
        self.border_visible = visible;
        self
    }

    pub fn with_palette(mut self, palette: TextBoxPalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_text_size(mut self, size: TextSize) -> Self {
        self.text_size = size;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }

    pub fn is_border_visible(&self) -> bool {
        self.border_visible
    }

    pub fn set_border_visible(&mut self, visible: bool) {
        self.border_visible = visible;
    }

    pub fn is_clicked(&self) -> bool {
        self.clicked
    }

    /// Switch to the clicked colors. Text boxes never set this themselves.
    pub fn set_clicked(&mut self, clicked: bool) {
        self.clicked = clicked;
    }

    pub fn palette_mut(&mut self) -> &mut TextBoxPalette {
        &mut self.palette
    }

    /// Border and text color for the current flags.
    fn colors(&self) -> (Rgb565, Rgb565) {
        let p = &self.palette;
        if !self.binding.is_enabled() {
            (p.border_disabled, p.text_disabled)
        } else if self.clicked {
            (p.border_clicked, p.text_clicked)
        } else {
            (p.border_normal, p.text_normal)
        }
    }
}

impl Renderable for TextBox {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn paint(&self, target: &mut FrameBuffer) -> Result<()> {
        let bounds = self.base.bounds();
        let background = self.palette.background;
        if !self.base.is_visible() {
            target.fill_rect(&bounds, background);
            return Ok(());
        }

        let (border, text) = self.colors();
        let area = inset(bounds);
        if self.border_visible {
            target.fill_rect(&bounds, border);
            target.fill_rect(&area, background);
        } else {
            target.fill_rect(&bounds, background);
        }

        let style = TextStyle::new(self.text_size, text, background);
        text_layout::draw_block(target, &self.text, area, &style, self.alignment).map_err(
            |source| GuiError::Layout {
                widget: self.base.name().to_string(),
                source,
            },
        )
    }
}

impl Clickable for TextBox {
    fn is_enabled(&self) -> bool {
        self.binding.is_enabled()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.binding.set_enabled(enabled);
    }

    fn click(&mut self, ctx: &mut ClickContext<'_>) -> Result<()> {
        self.binding.fire(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::Surface;
    use crate::ui::styling::{BLACK, DARK_GRAY, GREEN};

    #[test]
    fn test_border_only_when_requested() {
        let surface = Surface::new(Size::new(120, 40));
        let mut label = TextBox::new("lbl", Point::new(0, 0), Size::new(120, 40), "hi");
        label.assign_surface(&surface);

        label.render().unwrap();
        assert_eq!(surface.lock().pixel(Point::new(0, 0)), Some(BLACK));

        label.set_border_visible(true);
        label.render().unwrap();
        assert_eq!(surface.lock().pixel(Point::new(0, 0)), Some(GREEN));
        assert_eq!(surface.lock().pixel(Point::new(1, 1)), Some(BLACK));

        label.set_enabled(false);
        label.render().unwrap();
        assert_eq!(surface.lock().pixel(Point::new(0, 0)), Some(DARK_GRAY));
    }

    #[test]
    fn test_left_alignment_starts_at_inset_edge() {
        let surface = Surface::new(Size::new(200, 30));
        let mut label = TextBox::new("lbl", Point::zero(), Size::new(200, 30), "IIIIII")
            .with_alignment(Alignment::Left)
            .with_text_size(TextSize::Medium);
        label.assign_surface(&surface);
        label.render().unwrap();

        let frame = surface.lock();
        let lit_right_half = (100..200)
            .flat_map(|x| (0..30).map(move |y| Point::new(x, y)))
            .any(|p| frame.pixel(p) == Some(GREEN));
        let lit_left = (0..40)
            .flat_map(|x| (0..30).map(move |y| Point::new(x, y)))
            .any(|p| frame.pixel(p) == Some(GREEN));
        assert!(lit_left);
        assert!(!lit_right_half);
    }

    #[test]
    fn test_word_too_long_fails_render() {
        let surface = Surface::new(Size::new(40, 40));
        let mut label = TextBox::new("narrow", Point::zero(), Size::new(40, 40), "Backspace");
        label.assign_surface(&surface);
        assert!(matches!(label.render(), Err(GuiError::Layout { .. })));
    }
}
