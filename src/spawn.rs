//! Launching external programs.

use log::*;
use serde::{Deserialize, Serialize};

use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};

use crate::errors::{Error, SwmResult};

/// Program name plus arguments. The program is always passed as argv[0].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SpawnCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl SpawnCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec![],
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Launch `command` detached from the window manager.
///
/// The child gets its own process group so signals aimed at the manager's
/// terminal do not reach it. It is reaped on a helper thread which only logs
/// the exit status.
pub fn spawn(command: &SpawnCommand) -> SwmResult<u32> {
    if command.program.trim().is_empty() {
        return Err(Error::EmptyCommand);
    }

    let mut child = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .process_group(0)
        .spawn()
        .map_err(|source| Error::Spawn {
            program: command.program.clone(),
            source,
        })?;

    let pid = child.id();
    info!("Spawned `{}` as pid {}", command.program, pid);

    let program = command.program.clone();
    std::thread::spawn(move || match child.wait() {
        Ok(status) => debug!("`{}` (pid {}) exited with {}", program, pid, status),
        Err(e) => warn!("Could not wait for `{}` (pid {}): {}", program, pid, e),
    });

    Ok(pid)
}
