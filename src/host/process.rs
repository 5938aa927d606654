//! Browser-command host
//!
//! Until navigation the window is a placeholder that lives only inside this
//! process; the countdown is shown on the status surface instead. Navigation
//! launches the configured browser command with the target URL appended,
//! after which liveness tracks the child process.
//!
//! The browser must stay attached to the launched process for liveness to be
//! meaningful. Commands that hand the URL to an already running instance and
//! exit (for example `xdg-open`) look like a window closed by the user.

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use super::traits::{HostError, PopupWindow, WindowHost};

#[derive(Debug, Clone)]
pub struct BrowserCommandHost {
    program: String,
    args: Vec<String>,
}

impl BrowserCommandHost {
    /// Build from an argv prefix such as `["chromium", "--new-window"]`
    pub fn new(command: &[String]) -> Result<Self, HostError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| HostError::Unavailable("empty browser command".to_string()))?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl WindowHost for BrowserCommandHost {
    fn open(&self, name: &str, features: &str) -> Result<Box<dyn PopupWindow>, HostError> {
        debug!(program = %self.program, name, features, "Reserving browser window");
        Ok(Box::new(BrowserWindow {
            program: self.program.clone(),
            args: self.args.clone(),
            state: WindowState::Pending { closed: false },
        }))
    }
}

#[derive(Debug)]
enum WindowState {
    Pending { closed: bool },
    Launched(Child),
}

#[derive(Debug)]
pub struct BrowserWindow {
    program: String,
    args: Vec<String>,
    state: WindowState,
}

impl PopupWindow for BrowserWindow {
    fn is_closed(&mut self) -> bool {
        match &mut self.state {
            WindowState::Pending { closed } => *closed,
            WindowState::Launched(child) => match child.try_wait() {
                Ok(Some(status)) => {
                    debug!(%status, "Browser process exited");
                    true
                }
                Ok(None) => false,
                Err(e) => {
                    warn!(error = %e, "Failed to query browser process");
                    true
                }
            },
        }
    }

    fn write_document(&mut self, _html: &str) -> Result<(), HostError> {
        match self.state {
            WindowState::Pending { closed: false } => Ok(()),
            _ => Err(HostError::Unavailable("document not scriptable".to_string())),
        }
    }

    fn update_countdown(&mut self, _remaining: u32, _low_time: bool) -> Result<(), HostError> {
        self.write_document("")
    }

    fn navigate(&mut self, url: &str) -> Result<(), HostError> {
        if !matches!(self.state, WindowState::Pending { closed: false }) {
            return Err(HostError::Unavailable("window already used".to_string()));
        }

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(url)
            .spawn()?;

        info!(program = %self.program, pid = child.id(), url, "Browser launched");
        self.state = WindowState::Launched(child);
        Ok(())
    }

    fn close(&mut self) -> Result<(), HostError> {
        match &mut self.state {
            WindowState::Pending { closed } => {
                *closed = true;
                Ok(())
            }
            WindowState::Launched(child) => {
                if let Err(e) = child.start_kill() {
                    // Already reaped
                    if e.kind() != std::io::ErrorKind::InvalidInput {
                        return Err(e.into());
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_command() {
        assert!(BrowserCommandHost::new(&[]).is_err());
    }

    #[test]
    fn pending_window_closes_locally() {
        let host = BrowserCommandHost::new(&["true".to_string()]).unwrap();
        let mut window = host.open("_blank", "").unwrap();

        assert!(!window.is_closed());
        window.write_document("<html></html>").unwrap();
        window.close().unwrap();
        assert!(window.is_closed());
        assert!(window.navigate("https://example.com").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exited_browser_reads_as_closed() {
        let host = BrowserCommandHost::new(&["true".to_string()]).unwrap();
        let mut window = host.open("_blank", "").unwrap();
        window.navigate("https://example.com").unwrap();

        for _ in 0..50 {
            if window.is_closed() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        panic!("process never exited");
    }
}
