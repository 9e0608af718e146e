// src/ui/mod.rs
//! touchgui widget system
//!
//! This module provides:
//! - Core traits for renderable and clickable widgets
//! - The built-in widgets (button, text box, frame) and their palettes
//! - Word-wrapping text layout on top of embedded-graphics mono fonts

pub mod components;
pub mod core;
pub mod styling;
pub mod text_layout;
pub mod widget;

// Re-export commonly used items
pub use components::{Button, ButtonState, Frame, TextBox};
pub use self::core::{
    ClickBinding, ClickHandler, Clickable, HIT_MARGIN_X, HIT_MARGIN_Y, Renderable, WidgetBase,
};
pub use styling::{ButtonPalette, ColorTriple, FramePalette, TextBoxPalette};
pub use text_layout::{LayoutError, TextSize, TextStyle};
pub use widget::Widget;
