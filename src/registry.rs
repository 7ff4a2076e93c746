//! Bookkeeping for managed client windows.

use std::collections::HashMap;

use crate::connection::{Geometry, Xid};
use crate::errors::{Error, SwmResult};

/// Lifecycle of a client window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Not (yet) framed.
    Unmanaged,
    /// Framed, not yet mapped.
    Managed,
    /// Frame and client are visible.
    Mapped,
    /// Being handed back to the root window.
    Unmapping,
}

/// Client window and decorations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Client {
    /// The actual window.
    pub window: Xid,
    /// Parent window containing decorations.
    pub frame: Xid,
    /// Frame geometry on the root window.
    pub geometry: Geometry,
    pub state: ClientState,
}

/// The set of windows this process has wrapped in a frame.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<Xid, Client>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, window: Xid) -> Option<&Client> {
        self.clients.get(&window)
    }

    /// Find the client a frame belongs to.
    pub fn find_by_frame(&self, frame: Xid) -> Option<&Client> {
        self.clients.values().find(|c| c.frame == frame)
    }

    pub fn contains(&self, window: Xid) -> bool {
        self.clients.contains_key(&window)
    }

    /// Register a freshly framed window in [`ClientState::Managed`].
    pub fn insert(&mut self, window: Xid, frame: Xid, geometry: Geometry) -> SwmResult<&Client> {
        if self.clients.contains_key(&window) {
            return Err(Error::AlreadyManaged(window));
        }

        Ok(self.clients.entry(window).or_insert(Client {
            window,
            frame,
            geometry,
            state: ClientState::Managed,
        }))
    }

    /// Forget a window. Unknown windows are ignored.
    pub fn remove(&mut self, window: Xid) -> Option<Client> {
        self.clients.remove(&window)
    }

    pub fn set_state(&mut self, window: Xid, state: ClientState) {
        if let Some(client) = self.clients.get_mut(&window) {
            client.state = state;
        }
    }

    pub fn set_geometry(&mut self, window: Xid, geometry: Geometry) {
        if let Some(client) = self.clients.get_mut(&window) {
            client.geometry = geometry;
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
