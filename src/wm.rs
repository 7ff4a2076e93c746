//! Window manager implementation.

use log::*;

use crate::config::{Action, Config};
use crate::connection::*;
use crate::dispatch::DispatchTable;
use crate::errors::{Error, SwmResult};
use crate::event::{ButtonEvent, ConfigureRequest, Event, KeyEvent, MotionEvent};
use crate::grab::GrabManager;
use crate::registry::{Client, ClientRegistry, ClientState};
use crate::session::{Ownership, Session};
use crate::spawn;

/// Pointer position and frame geometry when a drag started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Drag {
    window: Xid,
    pointer: (i32, i32),
    geometry: Geometry,
}

/// Current state of inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Regular mode.
    None,
    /// Pointer motion moves the frame.
    Move(Drag),
    /// Pointer motion resizes frame and client.
    Resize(Drag),
}

/// Manage windows, their frames, and input bindings.
pub struct WindowManager<C: Connection> {
    conn: C,
    session: Session,
    registry: ClientRegistry,
    grabs: GrabManager,
    config: Config,
    handlers: DispatchTable<C>,
    mode: Mode,
}

impl<C: Connection> WindowManager<C> {
    /// Take ownership of the display and install the global key grabs.
    ///
    /// Fails with [`Error::AnotherWindowManager`] before any grab is made if
    /// the display already has a window manager.
    pub fn new(mut conn: C, config: Config) -> SwmResult<Self> {
        let session = Session::new(&conn);

        if session.probe(&mut conn)? == Ownership::AlreadyOwned {
            return Err(Error::AnotherWindowManager);
        }

        let mut grabs = GrabManager::new();
        grabs.install_global_grabs(&mut conn, session.root, &config)?;

        info!(
            "Managing root {:#x} ({}x{})",
            session.root, session.screen_width, session.screen_height
        );

        Ok(Self {
            conn,
            session,
            registry: ClientRegistry::new(),
            grabs,
            config,
            handlers: DispatchTable::default(),
            mode: Mode::None,
        })
    }

    /// Frame the windows that were already visible when the manager started.
    pub fn adopt_existing(&mut self) -> SwmResult<()> {
        for window in self.conn.query_tree(self.session.root)? {
            let attrs = match self.conn.window_attributes(window) {
                Ok(attrs) => attrs,
                Err(e) => {
                    debug!("Skipping {:#x}: {}", window, e);
                    continue;
                }
            };
            if attrs.override_redirect || !attrs.viewable {
                continue;
            }
            if let Err(e) = self.manage(window, &attrs) {
                warn!("Could not adopt {:#x}: {}", window, e);
            }
        }
        Ok(())
    }

    /// Run the event loop until a quit binding is pressed.
    pub fn run(&mut self) -> SwmResult<()> {
        self.conn.sync()?;

        while self.session.running {
            let event = self.conn.next_event()?;
            self.dispatch(event);
        }

        info!("Event loop stopped");
        Ok(())
    }

    /// Route one event to its handler. Handler failures are logged.
    pub fn dispatch(&mut self, event: Event) {
        trace!("Event {:?}", event);

        let kind = event.kind();
        match self.handlers.get(kind) {
            Some(handler) => {
                if let Err(e) = handler(self, event) {
                    warn!("{:?} handler failed: {}", kind, e);
                }
            }
            None => info!("Unhandled event {:?}", event),
        }
    }

    /// Clear the running flag; [`WindowManager::run`] returns after the
    /// current event.
    pub fn shutdown(&mut self) {
        info!("Shutting down");
        self.session.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.session.running
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    pub fn grabs(&self) -> &GrabManager {
        &self.grabs
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn handlers_mut(&mut self) -> &mut DispatchTable<C> {
        &mut self.handlers
    }

    // Lifecycle
    // ---------

    /// Read the attributes of a window asking to be mapped, and frame it.
    pub fn manage_request(&mut self, window: Xid) -> SwmResult<()> {
        let attrs = self.conn.window_attributes(window)?;
        self.manage(window, &attrs)
    }

    /// Wrap `window` in a new frame and show both.
    pub fn manage(&mut self, window: Xid, attrs: &WindowAttributes) -> SwmResult<()> {
        if self.registry.contains(window) {
            return Err(Error::AlreadyManaged(window));
        }
        if attrs.override_redirect || window == self.session.root {
            debug!("Not managing {:#x}", window);
            return Ok(());
        }

        let style = FrameStyle::from(self.config.frame);
        let geometry = Geometry {
            border_width: style.border_width,
            ..attrs.geometry
        };

        let frame = self.conn.create_window(self.session.root, geometry, style)?;

        if let Err(e) = self.frame_client(window, frame, geometry) {
            self.discard_frame(window, frame, geometry);
            return Err(e);
        }

        info!("Managing window {:#x} in frame {:#x}", window, frame);
        Ok(())
    }

    /// The client joins the save set before it is reparented.
    fn frame_client(&mut self, window: Xid, frame: Xid, geometry: Geometry) -> SwmResult<()> {
        self.conn.select_input(
            frame,
            EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
        )?;
        if let Err(e) = self
            .grabs
            .install_client_grabs(&mut self.conn, window, &self.config)
        {
            debug!("Framing {:#x} without some bindings: {}", window, e);
        }
        self.conn.change_save_set(window, true)?;
        self.conn.reparent_window(window, frame, 0, 0)?;
        self.registry.insert(window, frame, geometry)?;

        self.conn.map_window(frame)?;
        self.conn.map_window(window)?;
        self.registry.set_state(window, ClientState::Mapped);
        Ok(())
    }

    /// Undo a partially completed [`WindowManager::manage`].
    fn discard_frame(&mut self, window: Xid, frame: Xid, geometry: Geometry) {
        self.registry.remove(window);
        self.grabs.release_window(window);

        let root = self.session.root;
        attempt(
            "reparent to root",
            window,
            self.conn.reparent_window(window, root, geometry.x, geometry.y),
        );
        attempt(
            "remove from save set",
            window,
            self.conn.change_save_set(window, false),
        );
        attempt("destroy frame", frame, self.conn.destroy_window(frame));
    }

    /// Hand a client back to the root window and destroy its frame.
    ///
    /// Unknown windows are ignored. Every step is attempted even when an
    /// earlier one fails, since the client may already be gone.
    pub fn unmanage(&mut self, window: Xid) -> Option<Client> {
        let client = match self.registry.lookup(window) {
            Some(client) => *client,
            None => {
                trace!("Ignoring unmanaged window {:#x}", window);
                return None;
            }
        };
        self.registry.set_state(window, ClientState::Unmapping);

        let root = self.session.root;
        attempt("unmap", window, self.conn.unmap_window(window));
        attempt(
            "reparent to root",
            window,
            self.conn.reparent_window(window, root, 0, 0),
        );
        attempt(
            "remove from save set",
            window,
            self.conn.change_save_set(window, false),
        );
        attempt("destroy frame", client.frame, self.conn.destroy_window(client.frame));

        self.grabs.release_window(window);
        if self.drag_window() == Some(window) {
            self.mode = Mode::None;
        }

        info!("Unmanaged window {:#x}", window);
        self.registry.remove(window)
    }

    /// Apply a client's configure request unchanged.
    pub fn reconfigure(&mut self, request: &ConfigureRequest) -> SwmResult<()> {
        self.conn
            .configure_window(request.window, &request.changes)?;
        self.conn.sync()?;
        debug!("Configured window {:#x}", request.window);
        Ok(())
    }

    // Input
    // -----

    pub fn key_press(&mut self, event: KeyEvent) -> SwmResult<()> {
        let action =
            self.grabs
                .key_action(event.window, self.session.root, event.keycode, event.state);

        match action {
            Some(Action::Spawn) => spawn::spawn(&self.config.terminal).map(|_| ()),
            Some(Action::CloseWindow) => self.close_client(event.window),
            Some(Action::Quit) => {
                self.shutdown();
                Ok(())
            }
            Some(action) => {
                trace!("{:?} is not a key action", action);
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Disconnect the client owning `window` (or the client framed by it).
    fn close_client(&mut self, window: Xid) -> SwmResult<()> {
        match self.client_for(window) {
            Some(client) => {
                info!("Closing window {:#x}", client.window);
                self.conn.kill_client(client.window)
            }
            None => Ok(()),
        }
    }

    pub fn button_press(&mut self, event: ButtonEvent) -> SwmResult<()> {
        let client = match self.client_for(event.window) {
            Some(client) => client,
            None => return Ok(()),
        };

        let drag = Drag {
            window: client.window,
            pointer: (event.root_x, event.root_y),
            geometry: client.geometry,
        };

        let action =
            self.grabs
                .button_action(event.window, self.session.root, event.button, event.state);
        self.mode = match action {
            Some(Action::WindowMove) => Mode::Move(drag),
            Some(Action::WindowResize) => Mode::Resize(drag),
            _ => Mode::None,
        };
        trace!("Input mode {:?}", self.mode);
        Ok(())
    }

    pub fn button_release(&mut self, _event: ButtonEvent) -> SwmResult<()> {
        self.mode = Mode::None;
        Ok(())
    }

    pub fn pointer_motion(&mut self, event: MotionEvent) -> SwmResult<()> {
        let (drag, resize) = match self.mode {
            Mode::Move(drag) => (drag, false),
            Mode::Resize(drag) => (drag, true),
            Mode::None => return Ok(()),
        };

        let client = match self.registry.lookup(drag.window) {
            Some(client) => *client,
            None => {
                self.mode = Mode::None;
                return Ok(());
            }
        };

        let dx = event.root_x - drag.pointer.0;
        let dy = event.root_y - drag.pointer.1;
        let mut geometry = drag.geometry;

        if resize {
            geometry.width = (i64::from(drag.geometry.width) + i64::from(dx)).max(1) as u32;
            geometry.height = (i64::from(drag.geometry.height) + i64::from(dy)).max(1) as u32;
            let changes = WindowChanges {
                mask: ChangeMask::WIDTH | ChangeMask::HEIGHT,
                width: geometry.width,
                height: geometry.height,
                ..Default::default()
            };
            self.conn.configure_window(client.frame, &changes)?;
            self.conn.configure_window(client.window, &changes)?;
        } else {
            geometry.x = drag.geometry.x + dx;
            geometry.y = drag.geometry.y + dy;
            let changes = WindowChanges {
                mask: ChangeMask::X | ChangeMask::Y,
                x: geometry.x,
                y: geometry.y,
                ..Default::default()
            };
            self.conn.configure_window(client.frame, &changes)?;
        }

        self.registry.set_geometry(client.window, geometry);
        Ok(())
    }

    fn client_for(&self, window: Xid) -> Option<Client> {
        self.registry
            .lookup(window)
            .or_else(|| self.registry.find_by_frame(window))
            .copied()
    }

    fn drag_window(&self) -> Option<Xid> {
        match self.mode {
            Mode::Move(drag) | Mode::Resize(drag) => Some(drag.window),
            Mode::None => None,
        }
    }
}

/// Log a failed cleanup step and carry on.
fn attempt(step: &str, window: Xid, result: SwmResult<()>) {
    if let Err(e) = result {
        warn!("Could not {} {:#x}: {}", step, window, e);
    }
}
