//! Closed set of widgets a page can hold
//!
//! Pages store an enum rather than trait objects so callbacks and page hooks
//! can get the concrete widget back by name.

use embedded_graphics::primitives::Rectangle;

use crate::error::Result;
use crate::framebuffer::Surface;
use crate::ui::components::{Button, Frame, TextBox};
use crate::ui::core::{Clickable, Renderable, WidgetBase};

pub enum Widget {
    Frame(Frame),
    TextBox(TextBox),
    Button(Button),
}

impl Widget {
    fn renderable(&self) -> &dyn Renderable {
        match self {
            Widget::Frame(w) => w,
            Widget::TextBox(w) => w,
            Widget::Button(w) => w,
        }
    }

    fn renderable_mut(&mut self) -> &mut dyn Renderable {
        match self {
            Widget::Frame(w) => w,
            Widget::TextBox(w) => w,
            Widget::Button(w) => w,
        }
    }

    pub fn name(&self) -> &str {
        self.base().name()
    }

    pub fn base(&self) -> &WidgetBase {
        self.renderable().base()
    }

    pub fn base_mut(&mut self) -> &mut WidgetBase {
        self.renderable_mut().base_mut()
    }

    pub fn bounds(&self) -> Rectangle {
        self.base().bounds()
    }

    pub fn render(&self) -> Result<()> {
        self.renderable().render()
    }

    pub fn assign_surface(&mut self, surface: &Surface) {
        self.renderable_mut().assign_surface(surface);
    }

    /// The clickable capability, if this widget has it.
    pub fn as_clickable_mut(&mut self) -> Option<&mut dyn Clickable> {
        match self {
            Widget::Frame(_) => None,
            Widget::TextBox(w) => Some(w),
            Widget::Button(w) => Some(w),
        }
    }

    pub fn is_clickable(&self) -> bool {
        !matches!(self, Widget::Frame(_))
    }

    pub fn as_button(&self) -> Option<&Button> {
        match self {
            Widget::Button(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_button_mut(&mut self) -> Option<&mut Button> {
        match self {
            Widget::Button(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_text_box(&self) -> Option<&TextBox> {
        match self {
            Widget::TextBox(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_text_box_mut(&mut self) -> Option<&mut TextBox> {
        match self {
            Widget::TextBox(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_frame(&self) -> Option<&Frame> {
        match self {
            Widget::Frame(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_frame_mut(&mut self) -> Option<&mut Frame> {
        match self {
            Widget::Frame(w) => Some(w),
            _ => None,
        }
    }
}

impl From<Frame> for Widget {
    fn from(frame: Frame) -> Self {
        Widget::Frame(frame)
    }
}

impl From<TextBox> for Widget {
    fn from(text_box: TextBox) -> Self {
        Widget::TextBox(text_box)
    }
}

impl From<Button> for Widget {
    fn from(button: Button) -> Self {
        Widget::Button(button)
    }
}
