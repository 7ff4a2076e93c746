//! Error types.

use thiserror::Error;

use crate::connection::Xid;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// libX11 could not be loaded.
    #[error("cannot load Xlib: {0}")]
    Library(String),
    /// Xlib has no support for the current locale.
    #[error("there's no locale support for Xlib functions")]
    NoLocale,
    /// The display named by `$DISPLAY` could not be opened.
    #[error("cannot open X display")]
    NoDisplay,
    /// Substructure redirection on the root window is held by someone else.
    #[error("there's another window manager running")]
    AnotherWindowManager,
    /// The connection stopped delivering events.
    #[error("connection to the X server was closed")]
    ConnectionClosed,
    /// The server (or the test double) refused a request.
    #[error("{request} failed for window {window:#x}")]
    Request { request: &'static str, window: Xid },
    /// No key on the current keyboard mapping produces the keysym.
    #[error("no keycode for keysym {0:#x}")]
    NoKeycode(u32),
    /// A map request arrived for a window that already has a frame.
    #[error("window {0:#x} is already managed")]
    AlreadyManaged(Xid),
    /// A spawn was requested without a program name.
    #[error("spawn requires at least a program name")]
    EmptyCommand,
    /// The program could not be launched.
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a refused request.
    pub fn request(request: &'static str, window: Xid) -> Self {
        Self::Request { request, window }
    }
}

pub type SwmResult<T> = Result<T, Error>;
