//! Colors and palettes for the built-in widgets
//!
//! Every widget owns a copy of its palette so any color role can be
//! overridden per widget after construction.

pub mod colors;

pub use colors::{
    BLACK, ButtonPalette, ColorTriple, DARK_GRAY, DIM_GRAY, FramePalette, GREEN, RED,
    TextBoxPalette, WHITE, YELLOW, rgb,
};
