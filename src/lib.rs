//! Retained-mode page and widget engine for framebuffer touchscreens.
//!
//! Pages hold widgets at absolute coordinates. An [`Engine`] owns the live
//! surface, shows one page at a time and runs a background loop that turns
//! pointer presses into widget clicks.

pub mod backend;
pub mod capture;
pub mod config;
pub mod engine;
pub mod error;
pub mod framebuffer;
pub mod pages;
pub mod ui;

pub use backend::{Backend, BackendError, InputEvent, Key, MemoryBackend, MemoryHandle};
pub use config::EngineConfig;
pub use engine::{ClickContext, Engine, PageId};
pub use error::{GuiError, Result};
pub use framebuffer::{FrameBuffer, Surface};
pub use pages::{NumPad, Page, PageHooks};
pub use ui::{Button, Frame, TextBox, Widget};
