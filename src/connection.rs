//! The requests the window manager issues to the X server.
//!
//! [`Connection`] is implemented by [`crate::context::DisplayContext`] for a
//! live Xlib connection. Everything above this module talks to the server
//! only through the trait.

use bitflags::bitflags;

use crate::errors::SwmResult;
use crate::event::Event;

/// Server-assigned resource identifier.
pub type Xid = u64;

bitflags! {
    /// Subset of the core protocol event masks used by the manager.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventMask: u32 {
        const BUTTON_PRESS = 1 << 2;
        const BUTTON_RELEASE = 1 << 3;
        const POINTER_MOTION = 1 << 6;
        const BUTTON_MOTION = 1 << 13;
        const SUBSTRUCTURE_NOTIFY = 1 << 19;
        const SUBSTRUCTURE_REDIRECT = 1 << 20;
    }
}

bitflags! {
    /// Fields of a [`WindowChanges`] that are to be applied (`CW*` bits).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChangeMask: u16 {
        const X = 1 << 0;
        const Y = 1 << 1;
        const WIDTH = 1 << 2;
        const HEIGHT = 1 << 3;
        const BORDER_WIDTH = 1 << 4;
        const SIBLING = 1 << 5;
        const STACK_MODE = 1 << 6;
    }
}

/// Position, size and border of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub border_width: u32,
}

impl Geometry {
    pub fn new(x: i32, y: i32, width: u32, height: u32, border_width: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            border_width,
        }
    }
}

/// Attributes read from a window before it is managed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowAttributes {
    pub geometry: Geometry,
    /// Set by windows (menus, tooltips) that ask to bypass the manager.
    pub override_redirect: bool,
    /// The window is mapped and all of its ancestors are too.
    pub viewable: bool,
}

/// A `ConfigureWindow` request body. Only fields selected by `mask` are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowChanges {
    pub mask: ChangeMask,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub border_width: u32,
    pub sibling: Xid,
    pub stack_mode: i32,
}

/// Frame window appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStyle {
    pub border_width: u32,
    pub border_color: u64,
    pub background: u64,
}

/// Which callback receives asynchronous protocol errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMode {
    /// Any error raises the one-shot ownership flag.
    Probe,
    /// Errors are logged and otherwise ignored.
    Log,
}

/// A connection to the display server.
///
/// Requests on a real connection are asynchronous: an `Ok` only means the
/// request was queued. Failures the server reports later go through the
/// error handler selected with [`Connection::set_error_mode`].
pub trait Connection {
    /// Default root window.
    fn root(&self) -> Xid;

    /// Width and height of the default screen, in pixels.
    fn screen_size(&self) -> (u32, u32);

    fn set_error_mode(&mut self, mode: ErrorMode);

    /// Returns whether an error arrived while in [`ErrorMode::Probe`], and
    /// clears the flag.
    fn take_probe_error(&mut self) -> bool;

    /// Round trip to the server; all queued requests are processed on return.
    fn sync(&mut self) -> SwmResult<()>;

    /// Block until the server delivers an event.
    fn next_event(&mut self) -> SwmResult<Event>;

    fn select_input(&mut self, window: Xid, mask: EventMask) -> SwmResult<()>;

    fn window_attributes(&mut self, window: Xid) -> SwmResult<WindowAttributes>;

    /// Direct children of `window`, bottom to top.
    fn query_tree(&mut self, window: Xid) -> SwmResult<Vec<Xid>>;

    /// Create an unmapped child of `parent`.
    fn create_window(&mut self, parent: Xid, geometry: Geometry, style: FrameStyle)
        -> SwmResult<Xid>;

    fn destroy_window(&mut self, window: Xid) -> SwmResult<()>;

    fn map_window(&mut self, window: Xid) -> SwmResult<()>;

    fn unmap_window(&mut self, window: Xid) -> SwmResult<()>;

    fn reparent_window(&mut self, window: Xid, parent: Xid, x: i32, y: i32) -> SwmResult<()>;

    fn configure_window(&mut self, window: Xid, changes: &WindowChanges) -> SwmResult<()>;

    /// Add `window` to (or remove it from) this client's save set.
    fn change_save_set(&mut self, window: Xid, save: bool) -> SwmResult<()>;

    /// Keycode producing `keysym` on the current keyboard mapping.
    fn keysym_to_keycode(&mut self, keysym: u32) -> Option<u32>;

    fn grab_key(&mut self, window: Xid, keycode: u32, modifiers: u32) -> SwmResult<()>;

    /// Passive grab delivering press, release and button motion events.
    fn grab_button(&mut self, window: Xid, button: u32, modifiers: u32) -> SwmResult<()>;

    /// Close the connection of the client owning `window`.
    fn kill_client(&mut self, window: Xid) -> SwmResult<()>;
}
