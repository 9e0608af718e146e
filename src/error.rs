//! Error types shared across the engine.

use thiserror::Error;

use crate::backend::BackendError;
use crate::ui::text_layout::LayoutError;

/// Every failure the engine can surface.
///
/// Render, show and event-loop failures are fail-stop: the engine logs them
/// and stops its loop before handing the error back.
#[derive(Error, Debug)]
pub enum GuiError {
    #[error("widget `{0}` has no surface bound")]
    Unbound(String),
    #[error("cannot lay out text of widget `{widget}`")]
    Layout {
        widget: String,
        #[source]
        source: LayoutError,
    },
    #[error("no page named `{0}`")]
    UnknownPage(String),
    #[error("page `{page}` has no widget named `{widget}`")]
    UnknownWidget { page: String, widget: String },
    #[error("page `{0}` is already registered")]
    DuplicatePage(String),
    #[error("page registry is full ({0} pages)")]
    TooManyPages(usize),
    #[error("page hook failed: {0}")]
    Hook(String),
    #[error("display backend failed")]
    Backend(#[from] BackendError),
    #[error("failed to spawn the event loop thread")]
    Spawn(#[source] std::io::Error),
    #[error("failed to read configuration")]
    ConfigIo(#[source] std::io::Error),
    #[error("invalid configuration")]
    Config(#[from] toml::de::Error),
}

pub type Result<T, E = GuiError> = core::result::Result<T, E>;
