//! In-memory X server used by the unit tests.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::connection::*;
use crate::errors::{Error, SwmResult};
use crate::event::Event;

pub const ROOT: Xid = 0x100;

/// Requests as seen by the server, in the order they were issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    SelectInput(Xid, EventMask),
    Sync,
    CreateWindow(Xid, Geometry),
    DestroyWindow(Xid),
    MapWindow(Xid),
    UnmapWindow(Xid),
    ReparentWindow(Xid, Xid, i32, i32),
    ConfigureWindow(Xid, WindowChanges),
    ChangeSaveSet(Xid, bool),
    GrabKey(Xid, u32, u32),
    GrabButton(Xid, u32, u32),
    KillClient(Xid),
}

#[derive(Debug, Clone)]
pub struct MockWindow {
    pub parent: Xid,
    pub geometry: Geometry,
    pub mapped: bool,
    pub override_redirect: bool,
    pub border_color: Option<u64>,
}

/// Records every request and keeps a simple window tree.
#[derive(Debug)]
pub struct MockConnection {
    pub windows: HashMap<Xid, MockWindow>,
    pub save_set: HashSet<Xid>,
    pub requests: Vec<Request>,
    pub events: VecDeque<Event>,
    /// Request names that will be refused.
    pub failing: HashSet<&'static str>,
    /// Another client already selected substructure redirection on root.
    pub redirect_owned: bool,
    pub error_mode: ErrorMode,
    probe_error: bool,
    next_id: Xid,
}

impl MockConnection {
    pub fn new() -> Self {
        Self {
            windows: HashMap::new(),
            save_set: HashSet::new(),
            requests: vec![],
            events: VecDeque::new(),
            failing: HashSet::new(),
            redirect_owned: false,
            error_mode: ErrorMode::Log,
            probe_error: false,
            next_id: 0x0200_0000,
        }
    }

    /// Simulate a client creating a top-level window.
    pub fn add_client(&mut self, window: Xid, geometry: Geometry) {
        self.windows.insert(
            window,
            MockWindow {
                parent: ROOT,
                geometry,
                mapped: false,
                override_redirect: false,
                border_color: None,
            },
        );
    }

    pub fn push_event(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn fail(&mut self, request: &'static str) {
        self.failing.insert(request);
    }

    /// Windows created through this connection that still exist.
    pub fn live_frames(&self) -> Vec<Xid> {
        self.windows
            .keys()
            .copied()
            .filter(|w| *w >= 0x0200_0000)
            .collect()
    }

    /// Position of the first matching request in the log.
    pub fn position(&self, request: &Request) -> Option<usize> {
        self.requests.iter().position(|r| r == request)
    }

    pub fn count(&self, predicate: impl Fn(&Request) -> bool) -> usize {
        self.requests.iter().filter(|r| predicate(r)).count()
    }

    fn check(&self, request: &'static str, window: Xid) -> SwmResult<()> {
        if self.failing.contains(request) {
            return Err(Error::request(request, window));
        }
        Ok(())
    }

    fn window_mut(&mut self, request: &'static str, window: Xid) -> SwmResult<&mut MockWindow> {
        self.windows
            .get_mut(&window)
            .ok_or(Error::request(request, window))
    }

    fn exists(&self, request: &'static str, window: Xid) -> SwmResult<()> {
        if window == ROOT || self.windows.contains_key(&window) {
            Ok(())
        } else {
            Err(Error::request(request, window))
        }
    }
}

impl Connection for MockConnection {
    fn root(&self) -> Xid {
        ROOT
    }

    fn screen_size(&self) -> (u32, u32) {
        (1920, 1080)
    }

    fn set_error_mode(&mut self, mode: ErrorMode) {
        self.error_mode = mode;
    }

    fn take_probe_error(&mut self) -> bool {
        std::mem::replace(&mut self.probe_error, false)
    }

    fn sync(&mut self) -> SwmResult<()> {
        self.check("Sync", ROOT)?;
        self.requests.push(Request::Sync);
        Ok(())
    }

    fn next_event(&mut self) -> SwmResult<Event> {
        self.events.pop_front().ok_or(Error::ConnectionClosed)
    }

    fn select_input(&mut self, window: Xid, mask: EventMask) -> SwmResult<()> {
        self.check("SelectInput", window)?;
        self.requests.push(Request::SelectInput(window, mask));
        if window == ROOT
            && self.redirect_owned
            && mask.contains(EventMask::SUBSTRUCTURE_REDIRECT)
            && self.error_mode == ErrorMode::Probe
        {
            // BadAccess, reported through the probe handler.
            self.probe_error = true;
        }
        Ok(())
    }

    fn window_attributes(&mut self, window: Xid) -> SwmResult<WindowAttributes> {
        self.check("GetWindowAttributes", window)?;
        let w = self.window_mut("GetWindowAttributes", window)?;
        Ok(WindowAttributes {
            geometry: w.geometry,
            override_redirect: w.override_redirect,
            viewable: w.mapped,
        })
    }

    fn query_tree(&mut self, window: Xid) -> SwmResult<Vec<Xid>> {
        self.check("QueryTree", window)?;
        let mut children: Vec<Xid> = self
            .windows
            .iter()
            .filter(|(_, w)| w.parent == window)
            .map(|(id, _)| *id)
            .collect();
        children.sort_unstable();
        Ok(children)
    }

    fn create_window(
        &mut self,
        parent: Xid,
        geometry: Geometry,
        style: FrameStyle,
    ) -> SwmResult<Xid> {
        self.check("CreateWindow", parent)?;
        let id = self.next_id;
        self.next_id += 1;
        let geometry = Geometry {
            border_width: style.border_width,
            ..geometry
        };
        self.windows.insert(
            id,
            MockWindow {
                parent,
                geometry,
                mapped: false,
                override_redirect: false,
                border_color: Some(style.border_color),
            },
        );
        self.requests.push(Request::CreateWindow(id, geometry));
        Ok(id)
    }

    fn destroy_window(&mut self, window: Xid) -> SwmResult<()> {
        self.check("DestroyWindow", window)?;
        self.exists("DestroyWindow", window)?;
        self.requests.push(Request::DestroyWindow(window));
        // Children still inside are destroyed along with it.
        let mut doomed = vec![window];
        while let Some(w) = doomed.pop() {
            self.windows.remove(&w);
            doomed.extend(
                self.windows
                    .iter()
                    .filter(|(_, c)| c.parent == w)
                    .map(|(id, _)| *id),
            );
        }
        Ok(())
    }

    fn map_window(&mut self, window: Xid) -> SwmResult<()> {
        self.check("MapWindow", window)?;
        self.window_mut("MapWindow", window)?.mapped = true;
        self.requests.push(Request::MapWindow(window));
        Ok(())
    }

    fn unmap_window(&mut self, window: Xid) -> SwmResult<()> {
        self.check("UnmapWindow", window)?;
        self.window_mut("UnmapWindow", window)?.mapped = false;
        self.requests.push(Request::UnmapWindow(window));
        Ok(())
    }

    fn reparent_window(&mut self, window: Xid, parent: Xid, x: i32, y: i32) -> SwmResult<()> {
        self.check("ReparentWindow", window)?;
        self.exists("ReparentWindow", parent)?;
        let w = self.window_mut("ReparentWindow", window)?;
        w.parent = parent;
        w.geometry.x = x;
        w.geometry.y = y;
        self.requests
            .push(Request::ReparentWindow(window, parent, x, y));
        Ok(())
    }

    fn configure_window(&mut self, window: Xid, changes: &WindowChanges) -> SwmResult<()> {
        self.check("ConfigureWindow", window)?;
        let g = &mut self.window_mut("ConfigureWindow", window)?.geometry;
        if changes.mask.contains(ChangeMask::X) {
            g.x = changes.x;
        }
        if changes.mask.contains(ChangeMask::Y) {
            g.y = changes.y;
        }
        if changes.mask.contains(ChangeMask::WIDTH) {
            g.width = changes.width;
        }
        if changes.mask.contains(ChangeMask::HEIGHT) {
            g.height = changes.height;
        }
        if changes.mask.contains(ChangeMask::BORDER_WIDTH) {
            g.border_width = changes.border_width;
        }
        self.requests
            .push(Request::ConfigureWindow(window, *changes));
        Ok(())
    }

    fn change_save_set(&mut self, window: Xid, save: bool) -> SwmResult<()> {
        self.check("ChangeSaveSet", window)?;
        self.exists("ChangeSaveSet", window)?;
        if save {
            self.save_set.insert(window);
        } else {
            self.save_set.remove(&window);
        }
        self.requests.push(Request::ChangeSaveSet(window, save));
        Ok(())
    }

    fn keysym_to_keycode(&mut self, keysym: u32) -> Option<u32> {
        // Distinct for every keysym the default table uses.
        Some(keysym & 0xff)
    }

    fn grab_key(&mut self, window: Xid, keycode: u32, modifiers: u32) -> SwmResult<()> {
        self.check("GrabKey", window)?;
        self.requests
            .push(Request::GrabKey(window, keycode, modifiers));
        Ok(())
    }

    fn grab_button(&mut self, window: Xid, button: u32, modifiers: u32) -> SwmResult<()> {
        self.check("GrabButton", window)?;
        self.requests
            .push(Request::GrabButton(window, button, modifiers));
        Ok(())
    }

    fn kill_client(&mut self, window: Xid) -> SwmResult<()> {
        self.check("KillClient", window)?;
        self.requests.push(Request::KillClient(window));
        Ok(())
    }
}
