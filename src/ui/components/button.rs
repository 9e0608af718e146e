// src/ui/components/button.rs
//! Push button with a timed click flash

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::Alignment;

use crate::engine::ClickContext;
use crate::error::{GuiError, Result};
use crate::framebuffer::FrameBuffer;
use crate::ui::core::{ClickBinding, Clickable, Renderable, WidgetBase};
use crate::ui::styling::{ButtonPalette, ColorTriple};
use crate::ui::text_layout::{self, TextSize, TextStyle};

/// Visual state of a button, resolved from its flags at paint time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Inactive,
    Active,
    Clicked,
    Disabled,
}

impl ButtonState {
    /// Disabled beats clicked, clicked beats active.
    pub fn resolve(enabled: bool, clicked: bool, active: bool) -> Self {
        if !enabled {
            ButtonState::Disabled
        } else if clicked {
            ButtonState::Clicked
        } else if active {
            ButtonState::Active
        } else {
            ButtonState::Inactive
        }
    }
}

/// Bounds shrunk by one pixel on every side.
pub(crate) fn inset(bounds: Rectangle) -> Rectangle {
    Rectangle::new(
        bounds.top_left + Point::new(1, 1),
        Size::new(
            bounds.size.width.saturating_sub(2),
            bounds.size.height.saturating_sub(2),
        ),
    )
}

/// Button component with label and click handler
pub struct Button {
    base: WidgetBase,
    binding: ClickBinding,
    text: String,
    clicked: bool,
    active: bool,
    palette: ButtonPalette,
    text_size: TextSize,
}

impl Button {
    pub fn new(name: &str, position: Point, size: Size, text: &str) -> Self {
        Self {
            base: WidgetBase::new(name, position, size),
            binding: ClickBinding::default(),
            text: text.to_string(),
            clicked: false,
            active: false,
            palette: ButtonPalette::default(),
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

    pub fn with_palette(mut self, palette: ButtonPalette) -> Self {
        self.palette = palette;
        self
    }

    /// Override the colors of a single state.
    pub fn with_state_colors(mut self, state: ButtonState, colors: ColorTriple) -> Self {
        *self.palette.for_state_mut(state) = colors;
        self
    }

    pub fn with_text_size(mut self, size: TextSize) -> Self {
        self.text_size = size;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.binding.set_enabled(enabled);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Caller-managed highlight, independent of clicks and enabling.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// True only while the click flash is showing.
    pub fn is_clicked(&self) -> bool {
        self.clicked
    }

    pub fn state(&self) -> ButtonState {
        ButtonState::resolve(self.binding.is_enabled(), self.clicked, self.active)
    }

    /// Colors the next render will use.
    pub fn colors(&self) -> ColorTriple {
        self.palette.for_state(self.state())
    }

    pub fn palette(&self) -> &ButtonPalette {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut ButtonPalette {
        &mut self.palette
    }

    pub fn set_text_size(&mut self, size: TextSize) {
        self.text_size = size;
    }

    /// End the click flash and repaint.
    pub(crate) fn end_flash(&mut self) -> Result<()> {
        self.clicked = false;
        self.render()
    }
}

impl Renderable for Button {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn paint(&self, target: &mut FrameBuffer) -> Result<()> {
        let bounds = self.base.bounds();
        if !self.base.is_visible() {
            target.fill_rect(&bounds, self.palette.background);
            return Ok(());
        }

        let colors = self.colors();
        let body = inset(bounds);
        target.fill_rect(&bounds, colors.border);
        target.fill_rect(&body, colors.body);

        let style = TextStyle::new(self.text_size, colors.text, colors.body);
        if self.text.contains('\n') {
            text_layout::draw_block(target, &self.text, body, &style, Alignment::Center).map_err(
                |source| GuiError::Layout {
                    widget: self.base.name().to_string(),
                    source,
                },
            )?;
        } else {
            text_layout::draw_centered(target, &self.text, body, &style);
        }
        Ok(())
    }
}

impl Clickable for Button {
    fn is_enabled(&self) -> bool {
        self.binding.is_enabled()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.binding.set_enabled(enabled);
    }

    fn click(&mut self, ctx: &mut ClickContext<'_>) -> Result<()> {
        if !self.binding.is_enabled() {
            return Ok(());
        }

        self.clicked = true;
        self.render()?;
        ctx.present_now()?;
        ctx.schedule_revert();
        self.binding.fire(ctx)
    }
}
