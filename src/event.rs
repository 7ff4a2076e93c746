//! X Event wrapper.

use x11_dl::xlib;

use crate::connection::{ChangeMask, WindowChanges, Xid};

/// A client asking to move, resize or restack one of its windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigureRequest {
    pub window: Xid,
    pub changes: WindowChanges,
}

/// Key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Window the event is reported relative to (the grab window for grabs).
    pub window: Xid,
    pub keycode: u32,
    /// Modifier state at the time of the event.
    pub state: u32,
}

/// Button press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub window: Xid,
    pub button: u32,
    pub state: u32,
    pub root_x: i32,
    pub root_y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionEvent {
    pub window: Xid,
    pub state: u32,
    pub root_x: i32,
    pub root_y: i32,
}

/// Events delivered by the X server connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Event {
    CreateNotify { window: Xid },
    DestroyNotify { window: Xid },
    MapNotify { window: Xid },
    ReparentNotify { window: Xid, parent: Xid },
    /// `event` is the window the notification was reported relative to.
    UnmapNotify { event: Xid, window: Xid },
    MapRequest { window: Xid },
    ConfigureRequest(ConfigureRequest),

    ButtonPress(ButtonEvent),
    ButtonRelease(ButtonEvent),
    PointerMotion(MotionEvent),
    KeyPress(KeyEvent),
    KeyRelease(KeyEvent),

    /// Any event type the manager does not decode, with its type code.
    Unknown(i32),
}

/// Tag identifying the variant of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    CreateNotify,
    DestroyNotify,
    MapNotify,
    ReparentNotify,
    UnmapNotify,
    MapRequest,
    ConfigureRequest,
    ButtonPress,
    ButtonRelease,
    PointerMotion,
    KeyPress,
    KeyRelease,
    Unknown,
}

impl EventKind {
    /// Every kind the manager consumes.
    pub const HANDLED: [EventKind; 12] = [
        EventKind::CreateNotify,
        EventKind::DestroyNotify,
        EventKind::MapNotify,
        EventKind::ReparentNotify,
        EventKind::UnmapNotify,
        EventKind::MapRequest,
        EventKind::ConfigureRequest,
        EventKind::ButtonPress,
        EventKind::ButtonRelease,
        EventKind::PointerMotion,
        EventKind::KeyPress,
        EventKind::KeyRelease,
    ];
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::CreateNotify { .. } => EventKind::CreateNotify,
            Self::DestroyNotify { .. } => EventKind::DestroyNotify,
            Self::MapNotify { .. } => EventKind::MapNotify,
            Self::ReparentNotify { .. } => EventKind::ReparentNotify,
            Self::UnmapNotify { .. } => EventKind::UnmapNotify,
            Self::MapRequest { .. } => EventKind::MapRequest,
            Self::ConfigureRequest(_) => EventKind::ConfigureRequest,
            Self::ButtonPress(_) => EventKind::ButtonPress,
            Self::ButtonRelease(_) => EventKind::ButtonRelease,
            Self::PointerMotion(_) => EventKind::PointerMotion,
            Self::KeyPress(_) => EventKind::KeyPress,
            Self::KeyRelease(_) => EventKind::KeyRelease,
            Self::Unknown(_) => EventKind::Unknown,
        }
    }
}

impl From<xlib::XConfigureRequestEvent> for ConfigureRequest {
    fn from(event: xlib::XConfigureRequestEvent) -> Self {
        Self {
            window: event.window,
            changes: WindowChanges {
                mask: ChangeMask::from_bits_truncate(event.value_mask as u16),
                x: event.x,
                y: event.y,
                width: event.width.max(0) as u32,
                height: event.height.max(0) as u32,
                border_width: event.border_width.max(0) as u32,
                sibling: event.above,
                stack_mode: event.detail,
            },
        }
    }
}

impl From<xlib::XKeyEvent> for KeyEvent {
    fn from(event: xlib::XKeyEvent) -> Self {
        Self {
            window: event.window,
            keycode: event.keycode,
            state: event.state,
        }
    }
}

impl From<xlib::XButtonEvent> for ButtonEvent {
    fn from(event: xlib::XButtonEvent) -> Self {
        Self {
            window: event.window,
            button: event.button,
            state: event.state,
            root_x: event.x_root,
            root_y: event.y_root,
        }
    }
}

impl From<xlib::XMotionEvent> for MotionEvent {
    fn from(event: xlib::XMotionEvent) -> Self {
        Self {
            window: event.window,
            state: event.state,
            root_x: event.x_root,
            root_y: event.y_root,
        }
    }
}

impl From<xlib::XEvent> for Event {
    fn from(event: xlib::XEvent) -> Self {
        unsafe {
            match event.get_type() {
                xlib::CreateNotify => Self::CreateNotify {
                    window: event.create_window.window,
                },
                xlib::DestroyNotify => Self::DestroyNotify {
                    window: event.destroy_window.window,
                },
                xlib::MapNotify => Self::MapNotify {
                    window: event.map.window,
                },
                xlib::ReparentNotify => Self::ReparentNotify {
                    window: event.reparent.window,
                    parent: event.reparent.parent,
                },
                xlib::UnmapNotify => Self::UnmapNotify {
                    event: event.unmap.event,
                    window: event.unmap.window,
                },
                xlib::MapRequest => Self::MapRequest {
                    window: event.map_request.window,
                },
                xlib::ConfigureRequest => Self::ConfigureRequest(event.configure_request.into()),
                xlib::ButtonPress => Self::ButtonPress(event.button.into()),
                xlib::ButtonRelease => Self::ButtonRelease(event.button.into()),
                xlib::MotionNotify => Self::PointerMotion(event.motion.into()),
                xlib::KeyPress => Self::KeyPress(event.key.into()),
                xlib::KeyRelease => Self::KeyRelease(event.key.into()),
                other => Self::Unknown(other),
            }
        }
    }
}
