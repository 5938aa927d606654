//! The timed window state machine
//!
//! All methods run to completion without awaiting. The service loop calls
//! them one at a time, so state is never observed half-updated.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};

use super::job::{Job, StatusSnapshot};
use super::phase::Phase;
use super::timers::{TimerFired, TimerRole, TimerSet};
use crate::config::{Config, DisplayConfig, TimingConfig, WindowConfig};
use crate::error::{CloseError, JobOutcome, NavigationError, StartError, WindowOpenError};
use crate::host::{Notice, NoticeLevel, NoticeSurface, PopupWindow, StatusSurface, WindowHost};
use crate::humanize::format_clock;
use crate::observability::Metrics;
use crate::overlay;
use crate::validation::{FormSubmission, JobRequest, validate_job};

const OPEN_TITLE: &str = "Countdown Overlay Active";
const CLOSE_TITLE: &str = "Viewing Time - Auto-Close Active";

/// Host collaborators handed to the controller
#[derive(Clone)]
pub struct ControllerParts {
    pub host: Arc<dyn WindowHost>,
    pub status: Arc<dyn StatusSurface>,
    pub notices: Arc<dyn NoticeSurface>,
    pub metrics: Arc<Metrics>,
}

pub struct TimedWindowController {
    timing: TimingConfig,
    display: DisplayConfig,
    window: WindowConfig,
    parts: ControllerParts,
    timers: TimerSet,
    job: Option<Job>,
    generation: u64,
    snapshots: watch::Sender<StatusSnapshot>,
}

impl TimedWindowController {
    /// Returns the controller and the receiver its timers post to. Both must
    /// be driven from inside a tokio runtime.
    pub fn new(
        config: &Config,
        parts: ControllerParts,
    ) -> (Self, mpsc::UnboundedReceiver<TimerFired>) {
        let (timers, fired) = TimerSet::new();
        let (snapshots, _) = watch::channel(StatusSnapshot::idle());

        let controller = Self {
            timing: config.timing.clone(),
            display: config.display.clone(),
            window: config.window.clone(),
            parts,
            timers,
            job: None,
            generation: 0,
            snapshots,
        };
        (controller, fired)
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn phase(&self) -> Phase {
        self.job.as_ref().map_or(Phase::Idle, |job| job.phase)
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    pub fn status(&self) -> StatusSnapshot {
        match &self.job {
            Some(job) => {
                StatusSnapshot::from_job(job, self.is_low_time(job), self.timers.pending())
            }
            None => StatusSnapshot::idle(),
        }
    }

    /// Validate the inputs and start a job, replacing any active one.
    ///
    /// Invalid input leaves the current job untouched.
    pub fn start_job(&mut self, url: &str, delay: i64, duration: i64) -> Result<(), StartError> {
        match validate_job(url, delay, duration) {
            Ok(request) => self.start_validated(request),
            Err(err) => Err(self.reject(err)),
        }
    }

    pub fn submit(&mut self, form: &FormSubmission) -> Result<(), StartError> {
        match form.parse() {
            Ok(request) => self.start_validated(request),
            Err(err) => Err(self.reject(err)),
        }
    }

    fn reject(&self, err: crate::error::ValidationError) -> StartError {
        warn!(field = %err.field(), error = %err, "Rejected job request");
        self.notify(NoticeLevel::Error, err.to_string());
        err.into()
    }

    fn start_validated(&mut self, request: JobRequest) -> Result<(), StartError> {
        self.cancel();
        self.job = None;

        info!(
            url = %request.target_url(),
            delay = request.delay_seconds(),
            duration = request.duration_seconds(),
            "Starting countdown before opening"
        );

        let window = match self.open_window(&request) {
            Ok(window) => window,
            Err(err) => {
                warn!(error = %err, "Could not open countdown window");
                self.notify(NoticeLevel::Error, err.to_string());
                self.publish();
                return Err(err.into());
            }
        };

        self.generation += 1;
        let job = Job::new(self.generation, request, window);
        self.parts.status.show(
            OPEN_TITLE,
            &format!(
                "Countdown active - will open {} (then auto-close after {}s)",
                job.request.target_url(), job.request.duration_seconds()
            ),
        );
        self.job = Some(job);
        self.render_countdown();

        self.timers.every(TimerRole::Tick, self.timing.tick_interval.as_duration());
        self.parts.metrics.job_started();
        self.publish();
        Ok(())
    }

    fn open_window(&self, request: &JobRequest) -> Result<Box<dyn PopupWindow>, WindowOpenError> {
        let mut window = self.parts.host.open(&self.window.name, &self.window.features)?;

        if window.is_closed() {
            return Err(WindowOpenError::ClosedImmediately);
        }

        if let Err(e) = window.write_document(&overlay::render(request)) {
            let _ = window.close();
            return Err(WindowOpenError::Host(e.to_string()));
        }

        debug!("Countdown window opened");
        Ok(window)
    }

    /// Cancel the active job. Returns false when nothing was running.
    pub fn cancel(&mut self) -> bool {
        let active = self.job.as_ref().is_some_and(|job| job.phase.is_active());
        if !active {
            return false;
        }

        self.timers.cancel_all();
        if let Some(job) = self.job.as_mut() {
            if job.window_live() {
                if let Some(Err(e)) = job.window.as_mut().map(|w| w.close()) {
                    debug!(error = %e, "Could not close window");
                }
            }
        }
        self.finish(JobOutcome::Cancelled);
        true
    }

    /// Cancel anything running and forget the last job
    pub fn reset(&mut self) {
        self.cancel();
        self.job = None;
        self.parts.status.hide();
        self.publish();
    }

    pub fn handle_timer(&mut self, fired: TimerFired) {
        if !self.timers.accept(fired) {
            trace!(?fired, "Discarding stale timer event");
            return;
        }

        match fired.role {
            TimerRole::Tick => self.on_tick(),
            TimerRole::Settle => self.begin_auto_close(),
            TimerRole::Backstop => {
                info!("Backstop deadline reached, closing window");
                self.close_window();
            }
            TimerRole::LivenessPoll => self.poll_liveness(),
            TimerRole::CloseGrace => self.verify_closed(),
        }
    }

    fn on_tick(&mut self) {
        let Some(job) = self.job.as_mut() else {
            return;
        };
        let phase = job.phase;
        if !phase.is_counting_down() {
            return;
        }

        job.remaining = job.remaining.saturating_sub(1);
        let remaining = job.remaining;
        debug!(job_id = %job.id, %phase, remaining, "Countdown tick");

        if phase == Phase::CountingDownToOpen && !job.window_live() {
            self.fail(NavigationError::ClosedBeforeNavigation);
            return;
        }

        self.render_countdown();

        if remaining > 0 {
            self.publish();
            return;
        }

        self.timers.cancel(TimerRole::Tick);
        match phase {
            Phase::CountingDownToOpen => {
                info!("Delay finished, navigating to website");
                self.navigate();
            }
            _ => {
                info!("Auto-close countdown reached zero, closing window");
                self.close_window();
            }
        }
    }

    fn navigate(&mut self) {
        let Some(job) = self.job.as_mut() else {
            return;
        };
        job.transition(Phase::Navigating);

        if !job.window_live() {
            self.fail(NavigationError::ClosedBeforeNavigation);
            return;
        }

        let url = job.request.target_url().to_string();
        let result = match job.window.as_mut() {
            Some(window) => window.navigate(&url),
            None => return self.fail(NavigationError::ClosedBeforeNavigation),
        };

        match result {
            Ok(()) => {
                info!(%url, "Navigated to target");
                self.timers.once(TimerRole::Settle, self.timing.settle_delay.as_duration());
                self.publish();
            }
            Err(e) => self.fail(NavigationError::Host(e.to_string())),
        }
    }

    fn begin_auto_close(&mut self) {
        let Some(job) = self.job.as_mut() else {
            return;
        };
        if job.phase != Phase::Navigating {
            return;
        }

        if !job.window_live() {
            self.fail(NavigationError::ClosedBeforeAutoClose);
            return;
        }

        let duration = job.request.duration_seconds();
        job.transition(Phase::CountingDownToClose);
        job.remaining = duration;
        info!(job_id = %job.id, duration, "Starting auto-close timer");

        self.parts.status.show(
            CLOSE_TITLE,
            &format!("Auto-close timer active - {duration} seconds remaining"),
        );
        self.render_countdown();

        self.timers.every(TimerRole::Tick, self.timing.tick_interval.as_duration());
        self.timers.once(TimerRole::Backstop, self.timing.backstop_after(duration));
        self.timers.every(TimerRole::LivenessPoll, self.timing.liveness_poll.as_duration());
        self.publish();
    }

    fn poll_liveness(&mut self) {
        let Some(job) = self.job.as_mut() else {
            return;
        };
        if job.phase != Phase::CountingDownToClose || job.closing {
            return;
        }

        if !job.window_live() {
            warn!(
                job_id = %job.id,
                remaining = job.remaining,
                "Window was closed manually during auto-close timer"
            );
            self.finish(JobOutcome::ClosedExternally);
        }
    }

    /// Close the window once; later calls while a close is pending are no-ops.
    fn close_window(&mut self) {
        let Some(job) = self.job.as_mut() else {
            return;
        };
        if job.phase != Phase::CountingDownToClose || job.closing {
            debug!("Close already handled");
            return;
        }

        self.timers.cancel_all();
        job.closing = true;

        if !job.window_live() {
            debug!("Window was already closed");
            self.finish(JobOutcome::Completed { already_closed: true });
            return;
        }

        match job.window.as_mut().map(|w| w.close()) {
            Some(Ok(())) => {
                debug!("close() requested, awaiting grace check");
                self.timers.once(TimerRole::CloseGrace, self.timing.close_grace.as_duration());
                self.publish();
            }
            Some(Err(e)) => {
                warn!(error = %e, "Error closing window");
                self.finish(JobOutcome::CloseFailed(CloseError::Host(e.to_string())));
            }
            None => self.finish(JobOutcome::Completed { already_closed: true }),
        }
    }

    fn verify_closed(&mut self) {
        let Some(job) = self.job.as_mut() else {
            return;
        };
        if !job.closing {
            return;
        }

        if job.window_live() {
            warn!("Window is still open after close attempt");
            self.finish(JobOutcome::CloseFailed(CloseError::Refused));
        } else {
            info!("Window successfully closed");
            self.finish(JobOutcome::Completed { already_closed: false });
        }
    }

    fn fail(&mut self, err: NavigationError) {
        warn!(error = %err, "Job failed");
        self.timers.cancel_all();
        if let Some(job) = self.job.as_mut() {
            if job.window_live() {
                if let Some(Err(e)) = job.window.as_mut().map(|w| w.close()) {
                    debug!(error = %e, "Could not close window after failure");
                }
            }
        }
        self.finish(JobOutcome::NavigationFailed(err));
    }

    /// Move the job to the terminal phase matching `outcome` and release
    /// everything it holds.
    fn finish(&mut self, outcome: JobOutcome) {
        self.timers.cancel_all();
        self.parts.status.hide();

        let Some(job) = self.job.as_mut() else {
            return;
        };

        let (phase, level) = match &outcome {
            JobOutcome::Completed { .. } => {
                self.parts.metrics.job_completed();
                (Phase::Closed, Some(NoticeLevel::Success))
            }
            JobOutcome::CloseFailed(_) => {
                self.parts.metrics.job_completed();
                self.parts.metrics.close_refused();
                (Phase::Closed, Some(NoticeLevel::Warning))
            }
            JobOutcome::NavigationFailed(_) => {
                self.parts.metrics.job_failed();
                (Phase::Failed, Some(NoticeLevel::Error))
            }
            JobOutcome::ClosedExternally => {
                self.parts.metrics.job_cancelled();
                (Phase::Cancelled, Some(NoticeLevel::Error))
            }
            JobOutcome::Cancelled => {
                self.parts.metrics.job_cancelled();
                (Phase::Cancelled, None)
            }
        };

        job.transition(phase);
        job.window = None;
        job.closing = false;
        job.outcome = Some(outcome.clone());

        if let Some(level) = level {
            self.notify(level, outcome.message());
        }
        self.publish();
    }

    fn render_countdown(&mut self) {
        let Some(job) = self.job.as_mut() else {
            return;
        };
        let low_time = low_time(&self.display, job.phase, job.remaining);
        self.parts.status.set_countdown(&format_clock(job.remaining), low_time);

        if job.phase == Phase::CountingDownToOpen && job.window_live() {
            let remaining = job.remaining;
            let update = job.window.as_mut().map(|w| w.update_countdown(remaining, low_time));
            if let Some(Err(e)) = update {
                debug!(error = %e, "Countdown update in window failed");
            }
        }
    }

    fn is_low_time(&self, job: &Job) -> bool {
        low_time(&self.display, job.phase, job.remaining)
    }

    fn notify(&self, level: NoticeLevel, message: String) {
        self.parts.notices.notify(Notice {
            level,
            message,
            dismiss_after: self.display.notice_ttl.as_duration(),
        });
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.status());
    }
}

fn low_time(display: &DisplayConfig, phase: Phase, remaining: u32) -> bool {
    match phase {
        Phase::CountingDownToOpen => remaining <= display.open_warning_secs,
        Phase::CountingDownToClose => remaining <= display.close_warning_secs,
        _ => false,
    }
}
