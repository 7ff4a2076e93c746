//! Display ownership.

use log::*;

use crate::connection::{Connection, ErrorMode, EventMask, Xid};
use crate::errors::SwmResult;

/// Outcome of [`Session::probe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// This process now receives substructure redirection on root.
    Acquired,
    /// Another window manager holds it.
    AlreadyOwned,
}

/// Root window, screen size and whether the event loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub root: Xid,
    pub screen_width: u32,
    pub screen_height: u32,
    pub running: bool,
}

impl Session {
    pub fn new<C: Connection>(conn: &C) -> Self {
        let (screen_width, screen_height) = conn.screen_size();
        Self {
            root: conn.root(),
            screen_width,
            screen_height,
            running: true,
        }
    }

    /// Try to become the window manager of the display.
    ///
    /// Only one client may select substructure redirection on a window, and
    /// the server answers a second attempt with an asynchronous `BadAccess`.
    /// So the selection is attempted under the probe error handler and a
    /// round trip forces any error to arrive before the flag is read.
    pub fn probe<C: Connection>(&self, conn: &mut C) -> SwmResult<Ownership> {
        conn.set_error_mode(ErrorMode::Probe);

        let selected = conn
            .select_input(
                self.root,
                EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
            )
            .and_then(|_| conn.sync());

        if let Err(e) = selected {
            conn.set_error_mode(ErrorMode::Log);
            return Err(e);
        }

        if conn.take_probe_error() {
            conn.set_error_mode(ErrorMode::Log);
            warn!("Substructure redirection on {:#x} is taken", self.root);
            return Ok(Ownership::AlreadyOwned);
        }

        conn.set_error_mode(ErrorMode::Log);
        conn.sync()?;

        debug!("Initialized root window {:#x}", self.root);
        Ok(Ownership::Acquired)
    }
}
