//! X connection wrapper.

use log::*;
use x11_dl::xlib;

use std::os::raw::{c_int, c_long, c_uint};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::connection::*;
use crate::errors::{Error, SwmResult};
use crate::event::Event;

type ErrorHandler = unsafe extern "C" fn(*mut xlib::Display, *mut xlib::XErrorEvent) -> c_int;

/// Raised by [`on_probe_error`]. Xlib error handlers are plain C callbacks,
/// so the flag cannot live in [`DisplayContext`].
static PROBE_ERROR: AtomicBool = AtomicBool::new(false);

/// Installed while checking for another window manager.
extern "C" fn on_probe_error(_display: *mut xlib::Display, _error: *mut xlib::XErrorEvent) -> c_int {
    PROBE_ERROR.store(true, Ordering::SeqCst);
    0
}

/// Occurs when the X server raises an error.
extern "C" fn on_x_error(_display: *mut xlib::Display, error: *mut xlib::XErrorEvent) -> c_int {
    let error = unsafe { *error };
    error!(
        "X Error [code={}] request={}.{} resource={:#x}",
        error.error_code, error.request_code, error.minor_code, error.resourceid
    );
    0
}

/// Safe wrapper around an X server connection.
pub struct DisplayContext {
    /// X context
    xlib: xlib::Xlib,
    /// Connection to the server
    display: *mut xlib::Display,
    root: Xid,
    screen: c_int,
}

impl DisplayContext {
    /// Open the display named by `$DISPLAY`.
    pub fn connect() -> SwmResult<Self> {
        let xlib = xlib::Xlib::open().map_err(|e| Error::Library(e.to_string()))?;

        if unsafe { (xlib.XSupportsLocale)() } == 0 {
            return Err(Error::NoLocale);
        }

        let display = unsafe { (xlib.XOpenDisplay)(std::ptr::null()) };
        if display.is_null() {
            return Err(Error::NoDisplay);
        }

        let root = unsafe { (xlib.XDefaultRootWindow)(display) };
        let screen = unsafe { (xlib.XDefaultScreen)(display) };

        let context = Self {
            xlib,
            display,
            root,
            screen,
        };
        info!(
            "Connected to X server (connection {})",
            context.connection_number()
        );
        Ok(context)
    }

    /// File descriptor of the connection.
    pub fn connection_number(&self) -> i32 {
        unsafe { (self.xlib.XConnectionNumber)(self.display) }
    }
}

impl Drop for DisplayContext {
    fn drop(&mut self) {
        unsafe { (self.xlib.XCloseDisplay)(self.display) };
        info!("Closed X connection");
    }
}

impl Connection for DisplayContext {
    fn root(&self) -> Xid {
        self.root
    }

    fn screen_size(&self) -> (u32, u32) {
        unsafe {
            (
                (self.xlib.XDisplayWidth)(self.display, self.screen) as u32,
                (self.xlib.XDisplayHeight)(self.display, self.screen) as u32,
            )
        }
    }

    fn set_error_mode(&mut self, mode: ErrorMode) {
        let handler: ErrorHandler = match mode {
            ErrorMode::Probe => {
                PROBE_ERROR.store(false, Ordering::SeqCst);
                on_probe_error
            }
            ErrorMode::Log => on_x_error,
        };
        unsafe { (self.xlib.XSetErrorHandler)(Some(handler)) };
    }

    fn take_probe_error(&mut self) -> bool {
        PROBE_ERROR.swap(false, Ordering::SeqCst)
    }

    fn sync(&mut self) -> SwmResult<()> {
        unsafe { (self.xlib.XSync)(self.display, xlib::False) };
        trace!("Flushed request queue");
        Ok(())
    }

    fn next_event(&mut self) -> SwmResult<Event> {
        let mut raw: xlib::XEvent = unsafe { std::mem::zeroed() };
        // Xlib exits through its IO error handler when the connection dies.
        unsafe { (self.xlib.XNextEvent)(self.display, &mut raw) };
        Ok(raw.into())
    }

    fn select_input(&mut self, window: Xid, mask: EventMask) -> SwmResult<()> {
        unsafe { (self.xlib.XSelectInput)(self.display, window, mask.bits() as c_long) };
        Ok(())
    }

    fn window_attributes(&mut self, window: Xid) -> SwmResult<WindowAttributes> {
        let mut attrs: xlib::XWindowAttributes = unsafe { std::mem::zeroed() };
        let status = unsafe { (self.xlib.XGetWindowAttributes)(self.display, window, &mut attrs) };
        if status == 0 {
            return Err(Error::request("GetWindowAttributes", window));
        }

        Ok(WindowAttributes {
            geometry: Geometry::new(
                attrs.x,
                attrs.y,
                attrs.width.max(1) as u32,
                attrs.height.max(1) as u32,
                attrs.border_width.max(0) as u32,
            ),
            override_redirect: attrs.override_redirect != 0,
            viewable: attrs.map_state == xlib::IsViewable,
        })
    }

    fn query_tree(&mut self, window: Xid) -> SwmResult<Vec<Xid>> {
        unsafe {
            let mut returned_root: xlib::Window = 0;
            let mut returned_parent: xlib::Window = 0;
            let mut window_list: *mut xlib::Window = std::ptr::null_mut();
            let mut num_windows: c_uint = 0;

            let status = (self.xlib.XQueryTree)(
                self.display,
                window,
                &mut returned_root,
                &mut returned_parent,
                &mut window_list,
                &mut num_windows,
            );
            if status == 0 {
                return Err(Error::request("QueryTree", window));
            }
            if window_list.is_null() {
                return Ok(vec![]);
            }

            let windows = std::slice::from_raw_parts(window_list, num_windows as usize).to_owned();
            (self.xlib.XFree)(window_list.cast());
            Ok(windows)
        }
    }

    fn create_window(
        &mut self,
        parent: Xid,
        geometry: Geometry,
        style: FrameStyle,
    ) -> SwmResult<Xid> {
        let window = unsafe {
            (self.xlib.XCreateSimpleWindow)(
                self.display,
                parent,
                geometry.x,
                geometry.y,
                geometry.width,
                geometry.height,
                style.border_width,
                style.border_color,
                style.background,
            )
        };
        if window == 0 {
            return Err(Error::request("CreateWindow", parent));
        }
        debug!("Created window {:#x}", window);
        Ok(window)
    }

    fn destroy_window(&mut self, window: Xid) -> SwmResult<()> {
        unsafe { (self.xlib.XDestroyWindow)(self.display, window) };
        debug!("Destroyed window {:#x}", window);
        Ok(())
    }

    fn map_window(&mut self, window: Xid) -> SwmResult<()> {
        unsafe { (self.xlib.XMapWindow)(self.display, window) };
        debug!("Mapped window {:#x}", window);
        Ok(())
    }

    fn unmap_window(&mut self, window: Xid) -> SwmResult<()> {
        unsafe { (self.xlib.XUnmapWindow)(self.display, window) };
        debug!("Unmapped window {:#x}", window);
        Ok(())
    }

    fn reparent_window(&mut self, window: Xid, parent: Xid, x: i32, y: i32) -> SwmResult<()> {
        unsafe { (self.xlib.XReparentWindow)(self.display, window, parent, x, y) };
        debug!("Reparented window {:#x} to {:#x}", window, parent);
        Ok(())
    }

    fn configure_window(&mut self, window: Xid, changes: &WindowChanges) -> SwmResult<()> {
        let mut raw = xlib::XWindowChanges {
            x: changes.x,
            y: changes.y,
            width: changes.width as c_int,
            height: changes.height as c_int,
            border_width: changes.border_width as c_int,
            sibling: changes.sibling,
            stack_mode: changes.stack_mode,
        };
        unsafe {
            (self.xlib.XConfigureWindow)(
                self.display,
                window,
                changes.mask.bits() as c_uint,
                &mut raw,
            )
        };
        debug!("Configured window {:#x} ({:?})", window, changes.mask);
        Ok(())
    }

    fn change_save_set(&mut self, window: Xid, save: bool) -> SwmResult<()> {
        unsafe {
            if save {
                (self.xlib.XAddToSaveSet)(self.display, window)
            } else {
                (self.xlib.XRemoveFromSaveSet)(self.display, window)
            }
        };
        Ok(())
    }

    fn keysym_to_keycode(&mut self, keysym: u32) -> Option<u32> {
        let keycode =
            unsafe { (self.xlib.XKeysymToKeycode)(self.display, xlib::KeySym::from(keysym)) };
        Some(u32::from(keycode)).filter(|k| *k != 0)
    }

    fn grab_key(&mut self, window: Xid, keycode: u32, modifiers: u32) -> SwmResult<()> {
        unsafe {
            // https://tronche.com/gui/x/xlib/input/XGrabKey.html
            (self.xlib.XGrabKey)(
                self.display,
                keycode as c_int, // key code
                modifiers,        // modifier mask
                window,           // grab window
                xlib::False,      // owner events
                xlib::GrabModeAsync, // process pointer events without freezing
                xlib::GrabModeAsync, // process keyboard events without freezing
            )
        };
        Ok(())
    }

    fn grab_button(&mut self, window: Xid, button: u32, modifiers: u32) -> SwmResult<()> {
        let mask = EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE | EventMask::BUTTON_MOTION;
        unsafe {
            // https://tronche.com/gui/x/xlib/input/XGrabButton.html
            (self.xlib.XGrabButton)(
                self.display,
                button,                // mouse button
                modifiers,             // modifier mask
                window,                // grab window
                xlib::False,           // owner events
                mask.bits() as c_uint, // event mask
                xlib::GrabModeAsync,   // process pointer events without freezing
                xlib::GrabModeAsync,   // process keyboard events without freezing
                0,                     // confine pointer to window
                0,                     // cursor to display
            )
        };
        Ok(())
    }

    fn kill_client(&mut self, window: Xid) -> SwmResult<()> {
        unsafe { (self.xlib.XKillClient)(self.display, window) };
        info!("Killed client of window {:#x}", window);
        Ok(())
    }
}
