//! Xvfb virtual display for headful browser runs on machines without X.

use crate::{debug, log};
use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// How long Xvfb gets to create its socket.
const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);
const STARTUP_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("Xvfb not found on PATH")]
    NotInstalled,

    #[error("failed to spawn Xvfb")]
    Spawn(#[source] io::Error),

    #[error("Xvfb on :{number} exited early ({status})")]
    Exited { number: u32, status: ExitStatus },

    #[error("Xvfb on :{number} did not come up within {timeout:?}")]
    NotReady { number: u32, timeout: Duration },
}

/// A running Xvfb server. Killed on drop.
pub struct VirtualDisplay {
    number: u32,
    child: Option<Child>,
}

impl VirtualDisplay {
    /// Start Xvfb on `:<number>` and wait for its socket.
    pub fn start(number: u32, screen: &str) -> Result<Self, DisplayError> {
        let binary = which::which("Xvfb").map_err(|_| DisplayError::NotInstalled)?;
        let child = Command::new(binary)
            .args(xvfb_args(number, screen))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(DisplayError::Spawn)?;

        let mut display = Self {
            number,
            child: Some(child),
        };
        display.wait_ready()?;
        log!("display"; "{} ({screen})", display.name());
        Ok(display)
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// X display name, e.g. `:42`.
    pub fn name(&self) -> String {
        display_name(self.number)
    }

    /// Kill Xvfb and reap it. Later calls do nothing.
    pub fn stop(&mut self) -> io::Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        // Already exited is fine.
        let _ = child.kill();
        child.wait()?;
        debug!("display"; "{} stopped", self.name());
        Ok(())
    }

    fn wait_ready(&mut self) -> Result<(), DisplayError> {
        let socket = socket_path(self.number);
        let deadline = Instant::now() + STARTUP_TIMEOUT;

        while Instant::now() < deadline {
            if let Some(child) = self.child.as_mut()
                && let Ok(Some(status)) = child.try_wait()
            {
                self.child = None;
                return Err(DisplayError::Exited {
                    number: self.number,
                    status,
                });
            }
            if socket.exists() {
                return Ok(());
            }
            thread::sleep(STARTUP_POLL);
        }

        Err(DisplayError::NotReady {
            number: self.number,
            timeout: STARTUP_TIMEOUT,
        })
    }
}

impl Drop for VirtualDisplay {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log!("error"; "failed to stop {}: {e}", self.name());
        }
    }
}

pub fn display_name(number: u32) -> String {
    format!(":{number}")
}

fn xvfb_args(number: u32, screen: &str) -> Vec<String> {
    vec![
        display_name(number),
        "-screen".to_string(),
        "0".to_string(),
        screen.to_string(),
    ]
}

fn socket_path(number: u32) -> PathBuf {
    PathBuf::from(format!("/tmp/.X11-unix/X{number}"))
}
