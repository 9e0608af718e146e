// src/ui/components/frame.rs
//! Decorative unfilled rectangle

use embedded_graphics::prelude::*;

use crate::error::Result;
use crate::framebuffer::FrameBuffer;
use crate::ui::core::{Renderable, WidgetBase};
use crate::ui::styling::FramePalette;

/// One pixel outline around its bounds. Never clickable.
pub struct Frame {
    base: WidgetBase,
    enabled: bool,
    palette: FramePalette,
}

impl Frame {
    pub fn new(name: &str, position: Point, size: Size) -> Self {
        Self {
            base: WidgetBase::new(name, position, size),
            enabled: true,
            palette: FramePalette::default(),
        }
    }

    pub fn with_palette(mut self, palette: FramePalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabled frames draw in the dimmed border color.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn palette_mut(&mut self) -> &mut FramePalette {
        &mut self.palette
    }
}

impl Renderable for Frame {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn paint(&self, target: &mut FrameBuffer) -> Result<()> {
        let color = match (self.base.is_visible(), self.enabled) {
            (false, _) => self.palette.background,
            (true, true) => self.palette.border,
            (true, false) => self.palette.border_disabled,
        };
        target.outline_rect(&self.base.bounds(), color);
        Ok(())
    }
}
