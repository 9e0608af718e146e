pub mod numpad;
pub mod page;

pub use numpad::{Entry, NumPad};
pub use page::{Page, PageHooks};
