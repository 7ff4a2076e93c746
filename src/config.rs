//! Window manager configurations.

use log::*;
use serde::{Deserialize, Serialize};

use std::path::Path;

use crate::connection::FrameStyle;
use crate::errors::SwmResult;
use crate::input;
use crate::spawn::SpawnCommand;

/// Binding table compiled into the binary.
const DEFAULT_CONFIG: &str = include_str!("../assets/config.json");

/// WM actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Action {
    /// Launch the configured terminal.
    Spawn,
    /// Ask the server to disconnect the focused client.
    CloseWindow,
    /// Stop the event loop.
    Quit,
    WindowMove,
    WindowResize,
}

/// Window a grab is installed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// On the root window, active whatever has focus.
    Global,
    /// On every managed client window.
    Client,
}

/// Key + Modifiers for a window manager action.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeyBind {
    pub action: Action,
    pub scope: Scope,
    pub bind: input::Key,
    pub modifiers: Vec<input::ModifierMask>,
}

impl KeyBind {
    pub fn get_mask(&self) -> u32 {
        input::modifier_mask(&self.modifiers)
    }
}

/// Button + Modifiers for a window manager action. Always per client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MouseBind {
    pub action: Action,
    pub bind: input::Button,
    pub modifiers: Vec<input::ModifierMask>,
}

impl MouseBind {
    pub fn get_mask(&self) -> u32 {
        input::modifier_mask(&self.modifiers)
    }
}

/// Frame border configuration.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct FrameConfig {
    pub border_width: u32,
    pub border_color: u64,
    pub background: u64,
}

impl From<FrameConfig> for FrameStyle {
    fn from(frame: FrameConfig) -> Self {
        Self {
            border_width: frame.border_width,
            border_color: frame.border_color,
            background: frame.background,
        }
    }
}

/// Window Manager options.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub frame: FrameConfig,
    pub terminal: SpawnCommand,
    pub keybinds: Vec<KeyBind>,
    pub mousebinds: Vec<MouseBind>,
}

impl Config {
    /// Parse a JSON configuration.
    pub fn from_json(json: &str) -> SwmResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON configuration file.
    pub fn from_path(path: &Path) -> SwmResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        debug!("Parsed configuration file [{:?}]", path);
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        // The embedded table is checked by the tests below.
        serde_json::from_str(DEFAULT_CONFIG).unwrap_or_else(|e| {
            error!("Compiled-in configuration is invalid: {}", e);
            Self {
                frame: FrameConfig {
                    border_width: 3,
                    border_color: 0xff0000,
                    background: 0,
                },
                terminal: SpawnCommand::new("xterm"),
                keybinds: vec![],
                mousebinds: vec![],
            }
        })
    }
}
