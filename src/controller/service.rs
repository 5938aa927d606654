//! Event loop hosting the controller
//!
//! The loop is the only owner of [`TimedWindowController`]. Commands from
//! [`ControllerHandle`]s and timer firings are processed strictly one at a
//! time, which gives the controller the run-to-completion semantics of a
//! single-threaded event loop.

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::coordinator::{ControllerParts, TimedWindowController};
use super::job::StatusSnapshot;
use super::timers::TimerFired;
use crate::config::Config;
use crate::error::{ServiceStopped, StartError};
use crate::validation::FormSubmission;

const COMMAND_BUFFER: usize = 16;

#[derive(Debug)]
enum Command {
    Start {
        url: String,
        delay: i64,
        duration: i64,
        reply: oneshot::Sender<Result<(), StartError>>,
    },
    Submit {
        form: FormSubmission,
        reply: oneshot::Sender<Result<(), StartError>>,
    },
    Cancel {
        reply: oneshot::Sender<bool>,
    },
    Reset {
        reply: oneshot::Sender<()>,
    },
}

/// Cloneable front door to a running controller
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    commands: mpsc::Sender<Command>,
    status: watch::Receiver<StatusSnapshot>,
}

impl ControllerHandle {
    pub async fn start_job(
        &self,
        url: impl Into<String>,
        delay: i64,
        duration: i64,
    ) -> Result<(), StartError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Start {
            url: url.into(),
            delay,
            duration,
            reply,
        })
        .await?;
        rx.await.map_err(|_| ServiceStopped)?
    }

    /// Start a job from raw form fields
    pub async fn submit(&self, form: FormSubmission) -> Result<(), StartError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Submit { form, reply }).await?;
        rx.await.map_err(|_| ServiceStopped)?
    }

    /// Returns whether an active job was cancelled
    pub async fn cancel(&self) -> Result<bool, ServiceStopped> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Cancel { reply }).await?;
        rx.await.map_err(|_| ServiceStopped)
    }

    pub async fn reset(&self) -> Result<(), ServiceStopped> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Reset { reply }).await?;
        rx.await.map_err(|_| ServiceStopped)
    }

    pub fn status(&self) -> StatusSnapshot {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.status.clone()
    }

    /// Wait until a published snapshot satisfies `predicate`
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&StatusSnapshot) -> bool,
    ) -> Result<StatusSnapshot, ServiceStopped> {
        let mut rx = self.status.clone();
        let snapshot = rx.wait_for(predicate).await.map_err(|_| ServiceStopped)?;
        Ok(snapshot.clone())
    }

    async fn send(&self, command: Command) -> Result<(), ServiceStopped> {
        self.commands.send(command).await.map_err(|_| ServiceStopped)
    }
}

pub struct ControllerService;

impl ControllerService {
    /// Spawn the controller loop on the current runtime. The loop stops,
    /// cancelling any active job, once every handle is dropped.
    pub fn spawn(config: &Config, parts: ControllerParts) -> (ControllerHandle, JoinHandle<()>) {
        let (controller, fired) = TimedWindowController::new(config, parts);
        let (commands, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let handle = ControllerHandle {
            commands,
            status: controller.subscribe(),
        };

        let task = tokio::spawn(run(controller, command_rx, fired));
        (handle, task)
    }
}

async fn run(
    mut controller: TimedWindowController,
    mut commands: mpsc::Receiver<Command>,
    mut fired: mpsc::UnboundedReceiver<TimerFired>,
) {
    info!("Controller service started");
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => handle_command(&mut controller, command),
                None => {
                    info!("All controller handles dropped, shutting down");
                    controller.cancel();
                    break;
                }
            },
            Some(event) = fired.recv() => controller.handle_timer(event),
        }
    }
}

fn handle_command(controller: &mut TimedWindowController, command: Command) {
    match command {
        Command::Start {
            url,
            delay,
            duration,
            reply,
        } => {
            let _ = reply.send(controller.start_job(&url, delay, duration));
        }
        Command::Submit { form, reply } => {
            let _ = reply.send(controller.submit(&form));
        }
        Command::Cancel { reply } => {
            let cancelled = controller.cancel();
            debug!(cancelled, "Cancel requested");
            let _ = reply.send(cancelled);
        }
        Command::Reset { reply } => {
            controller.reset();
            let _ = reply.send(());
        }
    }
}
