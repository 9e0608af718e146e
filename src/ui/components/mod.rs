// src/ui/components/mod.rs
//! Built-in widgets

pub mod button;
pub mod frame;
pub mod text_box;

pub use button::{Button, ButtonState};
pub use frame::Frame;
pub use text_box::TextBox;
