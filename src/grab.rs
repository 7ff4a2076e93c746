//! Passive key and button grabs.
//!
//! A grab asks the server to deliver a key or button chord to this process
//! instead of the focused client. Every grab is recorded together with the
//! [`Action`] it triggers, so input events can be resolved back to the binding
//! that produced them.

use std::collections::HashMap;

use log::*;

use crate::config::{Action, Config, KeyBind, MouseBind, Scope};
use crate::connection::{Connection, Xid};
use crate::errors::{Error, SwmResult};
use crate::input;

/// Key or button half of a grab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrabInput {
    Key(u32),
    Button(u32),
}

/// The (window, modifiers, code) triple the server identifies a grab by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GrabId {
    pub window: Xid,
    pub modifiers: u32,
    pub input: GrabInput,
}

/// Installed grabs and their actions.
#[derive(Debug, Default)]
pub struct GrabManager {
    grabs: HashMap<GrabId, Action>,
}

impl GrabManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grab a key chord on the root window, once per lock state. Installing
    /// the same binding twice issues no further requests.
    pub fn install_global_grab<C: Connection>(
        &mut self,
        conn: &mut C,
        root: Xid,
        bind: &KeyBind,
    ) -> SwmResult<()> {
        self.grab_key(conn, root, bind)
    }

    /// Grab every [`Scope::Global`] key binding of `config`.
    pub fn install_global_grabs<C: Connection>(
        &mut self,
        conn: &mut C,
        root: Xid,
        config: &Config,
    ) -> SwmResult<()> {
        for bind in config.keybinds.iter().filter(|b| b.scope == Scope::Global) {
            self.install_global_grab(conn, root, bind)?;
        }
        Ok(())
    }

    /// Grab the per-client key bindings and every mouse binding on a client
    /// window.
    ///
    /// A binding that cannot be grabbed is logged and skipped; the first such
    /// failure is returned once the remaining bindings have been attempted.
    pub fn install_client_grabs<C: Connection>(
        &mut self,
        conn: &mut C,
        window: Xid,
        config: &Config,
    ) -> SwmResult<()> {
        let mut first_error = None;

        for bind in config.keybinds.iter().filter(|b| b.scope == Scope::Client) {
            if let Err(e) = self.grab_key(conn, window, bind) {
                warn!("Could not grab {:?} on {:#x}: {}", bind.bind, window, e);
                first_error.get_or_insert(e);
            }
        }

        for bind in &config.mousebinds {
            if let Err(e) = self.grab_button(conn, window, bind) {
                warn!("Could not grab {:?} on {:#x}: {}", bind.bind, window, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Forget the grabs of a window that is no longer managed. The server
    /// drops them itself once the window is gone.
    pub fn release_window(&mut self, window: Xid) {
        self.grabs.retain(|id, _| id.window != window);
    }

    /// Action bound to a key event reported on `window`. Grabs on the window
    /// itself take precedence over global grabs on `root`.
    pub fn key_action(&self, window: Xid, root: Xid, keycode: u32, state: u32) -> Option<Action> {
        self.lookup(window, root, GrabInput::Key(keycode), state)
    }

    pub fn button_action(&self, window: Xid, root: Xid, button: u32, state: u32) -> Option<Action> {
        self.lookup(window, root, GrabInput::Button(button), state)
    }

    pub fn is_grabbed(&self, id: &GrabId) -> bool {
        self.grabs.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.grabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grabs.is_empty()
    }

    fn lookup(&self, window: Xid, root: Xid, input: GrabInput, state: u32) -> Option<Action> {
        let modifiers = input::clean_mask(state);
        [window, root].iter().find_map(|w| {
            self.grabs
                .get(&GrabId {
                    window: *w,
                    modifiers,
                    input,
                })
                .copied()
        })
    }

    fn grab_key<C: Connection>(&mut self, conn: &mut C, window: Xid, bind: &KeyBind) -> SwmResult<()> {
        let keysym = u32::from(bind.bind);
        let keycode = conn
            .keysym_to_keycode(keysym)
            .filter(|k| *k != 0)
            .ok_or(Error::NoKeycode(keysym))?;

        let id = GrabId {
            window,
            modifiers: bind.get_mask(),
            input: GrabInput::Key(keycode),
        };
        if self.grabs.contains_key(&id) {
            return Ok(());
        }

        for modifiers in input::lock_variants(id.modifiers) {
            conn.grab_key(window, keycode, modifiers)?;
        }
        self.grabs.insert(id, bind.action);
        trace!("Grabbed key {:?} on {:#x}", bind.bind, window);
        Ok(())
    }

    fn grab_button<C: Connection>(
        &mut self,
        conn: &mut C,
        window: Xid,
        bind: &MouseBind,
    ) -> SwmResult<()> {
        let button = u32::from(bind.bind);
        let id = GrabId {
            window,
            modifiers: bind.get_mask(),
            input: GrabInput::Button(button),
        };
        if self.grabs.contains_key(&id) {
            return Ok(());
        }

        for modifiers in input::lock_variants(id.modifiers) {
            conn.grab_button(window, button, modifiers)?;
        }
        self.grabs.insert(id, bind.action);
        trace!("Grabbed button {:?} on {:#x}", bind.bind, window);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;
    use crate::mock::{MockConnection, Request, ROOT};
    use x11_dl::{keysym, xlib};

    fn keycode(sym: u32) -> u32 {
        sym & 0xff
    }

    fn key_grabs(conn: &MockConnection) -> usize {
        conn.count(|r| matches!(r, Request::GrabKey(..)))
    }

    #[test]
    fn global_grab_is_idempotent() {
        let mut conn = MockConnection::new();
        let mut grabs = GrabManager::new();
        let config = Config::default();
        let spawn = config
            .keybinds
            .iter()
            .find(|b| b.action == Action::Spawn)
            .unwrap();

        grabs.install_global_grab(&mut conn, ROOT, spawn).unwrap();
        grabs.install_global_grab(&mut conn, ROOT, spawn).unwrap();

        let code = keycode(keysym::XK_Return);
        assert_eq!(
            conn.requests,
            vec![
                Request::GrabKey(ROOT, code, xlib::Mod1Mask),
                Request::GrabKey(ROOT, code, xlib::Mod1Mask | xlib::LockMask),
                Request::GrabKey(ROOT, code, xlib::Mod1Mask | xlib::Mod2Mask),
                Request::GrabKey(
                    ROOT,
                    code,
                    xlib::Mod1Mask | xlib::Mod2Mask | xlib::LockMask
                ),
            ]
        );
        assert_eq!(grabs.len(), 1);
        assert!(grabs.is_grabbed(&GrabId {
            window: ROOT,
            modifiers: xlib::Mod1Mask,
            input: GrabInput::Key(code),
        }));
    }

    #[test]
    fn bindings_fire_with_num_lock_on() {
        let mut conn = MockConnection::new();
        let mut grabs = GrabManager::new();
        grabs
            .install_global_grabs(&mut conn, ROOT, &Config::default())
            .unwrap();

        let quit = keycode(keysym::XK_q);
        let state = xlib::Mod1Mask | xlib::ShiftMask | xlib::Mod2Mask;
        assert!(conn.requests.contains(&Request::GrabKey(ROOT, quit, state)));
        assert_eq!(grabs.key_action(ROOT, ROOT, quit, state), Some(Action::Quit));
    }

    #[test]
    fn client_grabs_cover_buttons_and_close_key() {
        let mut conn = MockConnection::new();
        let mut grabs = GrabManager::new();
        let config = Config::default();

        grabs.install_client_grabs(&mut conn, 0x42, &config).unwrap();
        grabs.install_client_grabs(&mut conn, 0x42, &config).unwrap();

        for mask in input::lock_variants(xlib::Mod4Mask) {
            assert!(conn
                .requests
                .contains(&Request::GrabButton(0x42, xlib::Button1, mask)));
            assert!(conn
                .requests
                .contains(&Request::GrabButton(0x42, xlib::Button3, mask)));
        }
        for mask in input::lock_variants(xlib::Mod1Mask) {
            assert!(conn
                .requests
                .contains(&Request::GrabKey(0x42, keycode(keysym::XK_F4), mask)));
        }
        assert_eq!(conn.requests.len(), 12);
        assert_eq!(grabs.len(), 3);

        assert_eq!(
            grabs.key_action(0x42, ROOT, keycode(keysym::XK_F4), xlib::Mod1Mask | xlib::LockMask),
            Some(Action::CloseWindow)
        );
        assert_eq!(
            grabs.button_action(0x42, ROOT, xlib::Button3, xlib::Mod4Mask | xlib::Mod2Mask),
            Some(Action::WindowResize)
        );
    }

    #[test]
    fn global_grabs_resolve_from_any_window() {
        let mut conn = MockConnection::new();
        let mut grabs = GrabManager::new();
        grabs
            .install_global_grabs(&mut conn, ROOT, &Config::default())
            .unwrap();

        let code = keycode(u32::from(Key::Return));
        assert_eq!(
            grabs.key_action(0x42, ROOT, code, xlib::Mod1Mask),
            Some(Action::Spawn)
        );
        assert_eq!(grabs.key_action(0x42, ROOT, code, 0), None);
        assert_eq!(
            grabs.key_action(
                ROOT,
                ROOT,
                keycode(keysym::XK_q),
                xlib::Mod1Mask | xlib::ShiftMask
            ),
            Some(Action::Quit)
        );
    }

    #[test]
    fn release_forgets_window_grabs_only() {
        let mut conn = MockConnection::new();
        let mut grabs = GrabManager::new();
        let config = Config::default();
        grabs.install_global_grabs(&mut conn, ROOT, &config).unwrap();
        let global = grabs.len();

        grabs.install_client_grabs(&mut conn, 0x42, &config).unwrap();
        assert_eq!(grabs.len(), global + 3);

        grabs.release_window(0x42);
        assert_eq!(grabs.len(), global);
        assert_eq!(
            grabs.button_action(0x42, ROOT, xlib::Button1, xlib::Mod4Mask),
            None
        );

        // Managing the window again grabs again.
        let before = conn.requests.len();
        grabs.install_client_grabs(&mut conn, 0x42, &config).unwrap();
        assert_eq!(conn.requests.len(), before + 12);
    }

    #[test]
    fn failed_grab_is_not_recorded() {
        let mut conn = MockConnection::new();
        conn.fail("GrabKey");
        let mut grabs = GrabManager::new();

        assert!(grabs
            .install_global_grabs(&mut conn, ROOT, &Config::default())
            .is_err());
        assert!(grabs.is_empty());
    }

    #[test]
    fn failed_button_grab_keeps_other_bindings() {
        let mut conn = MockConnection::new();
        conn.fail("GrabButton");
        let mut grabs = GrabManager::new();

        assert!(grabs
            .install_client_grabs(&mut conn, 0x42, &Config::default())
            .is_err());
        assert_eq!(key_grabs(&conn), 4);
        assert_eq!(grabs.len(), 1);
        assert_eq!(
            grabs.key_action(0x42, ROOT, keycode(keysym::XK_F4), xlib::Mod1Mask),
            Some(Action::CloseWindow)
        );
    }
}
