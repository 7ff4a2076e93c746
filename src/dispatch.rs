//! Event routing.
//!
//! Each [`EventKind`] maps to one handler function. Kinds without an entry
//! are logged by [`WindowManager::dispatch`] and otherwise ignored.

use std::collections::HashMap;

use log::*;

use crate::connection::Connection;
use crate::errors::SwmResult;
use crate::event::{Event, EventKind};
use crate::wm::WindowManager;

/// Handles one event for the window manager.
pub type Handler<C> = fn(&mut WindowManager<C>, Event) -> SwmResult<()>;

/// Mapping from event kind to handler.
pub struct DispatchTable<C: Connection> {
    handlers: HashMap<EventKind, Handler<C>>,
}

impl<C: Connection> DispatchTable<C> {
    /// A table with no handlers.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Set the handler for `kind`, returning the one it replaces.
    pub fn register(&mut self, kind: EventKind, handler: Handler<C>) -> Option<Handler<C>> {
        self.handlers.insert(kind, handler)
    }

    pub fn get(&self, kind: EventKind) -> Option<Handler<C>> {
        self.handlers.get(&kind).copied()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<C: Connection> Default for DispatchTable<C> {
    fn default() -> Self {
        let mut table = Self::empty();

        table.register(EventKind::ConfigureRequest, on_configure_request);
        table.register(EventKind::MapRequest, on_map_request);
        table.register(EventKind::UnmapNotify, on_unmap_notify);

        for kind in [
            EventKind::CreateNotify,
            EventKind::DestroyNotify,
            EventKind::MapNotify,
            EventKind::ReparentNotify,
            EventKind::KeyRelease,
        ] {
            table.register(kind, on_notify);
        }

        table.register(EventKind::ButtonPress, on_button_press);
        table.register(EventKind::ButtonRelease, on_button_release);
        table.register(EventKind::PointerMotion, on_pointer_motion);
        table.register(EventKind::KeyPress, on_key_press);

        table
    }
}

// Specific event handlers
// -----------------------

fn on_configure_request<C: Connection>(wm: &mut WindowManager<C>, event: Event) -> SwmResult<()> {
    match event {
        Event::ConfigureRequest(request) => wm.reconfigure(&request),
        _ => Ok(()),
    }
}

fn on_map_request<C: Connection>(wm: &mut WindowManager<C>, event: Event) -> SwmResult<()> {
    match event {
        Event::MapRequest { window } => wm.manage_request(window),
        _ => Ok(()),
    }
}

/// Clients live inside frames, so their unmaps are reported relative to the
/// frame. The ones reported relative to root come from reparenting a window
/// that was already mapped.
fn on_unmap_notify<C: Connection>(wm: &mut WindowManager<C>, event: Event) -> SwmResult<()> {
    if let Event::UnmapNotify { event, window } = event {
        if event == wm.session().root {
            trace!("Ignoring unmap of {:#x} on root", window);
        } else {
            wm.unmanage(window);
        }
    }
    Ok(())
}

/// Structure notifications carry no state change.
fn on_notify<C: Connection>(_wm: &mut WindowManager<C>, event: Event) -> SwmResult<()> {
    debug!("{:?}", event);
    Ok(())
}

fn on_button_press<C: Connection>(wm: &mut WindowManager<C>, event: Event) -> SwmResult<()> {
    match event {
        Event::ButtonPress(e) => wm.button_press(e),
        _ => Ok(()),
    }
}

fn on_button_release<C: Connection>(wm: &mut WindowManager<C>, event: Event) -> SwmResult<()> {
    match event {
        Event::ButtonRelease(e) => wm.button_release(e),
        _ => Ok(()),
    }
}

fn on_pointer_motion<C: Connection>(wm: &mut WindowManager<C>, event: Event) -> SwmResult<()> {
    match event {
        Event::PointerMotion(e) => wm.pointer_motion(e),
        _ => Ok(()),
    }
}

fn on_key_press<C: Connection>(wm: &mut WindowManager<C>, event: Event) -> SwmResult<()> {
    match event {
        Event::KeyPress(e) => wm.key_press(e),
        _ => Ok(()),
    }
}
