use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::phase::Phase;
use crate::error::JobOutcome;
use crate::host::PopupWindow;
use crate::humanize::format_clock;
use crate::validation::JobRequest;

/// The single job owned by the controller
pub(crate) struct Job {
    pub id: Uuid,
    pub generation: u64,
    pub request: JobRequest,
    pub phase: Phase,
    pub remaining: u32,
    /// Released when the job reaches a terminal phase
    pub window: Option<Box<dyn PopupWindow>>,
    /// A close request is awaiting its grace re-check
    pub closing: bool,
    pub outcome: Option<JobOutcome>,
    pub started_at: DateTime<Utc>,
}

impl Job {
    pub fn new(generation: u64, request: JobRequest, window: Box<dyn PopupWindow>) -> Self {
        let mut job = Self {
            id: Uuid::now_v7(),
            generation,
            remaining: request.delay_seconds(),
            request,
            phase: Phase::Idle,
            window: Some(window),
            closing: false,
            outcome: None,
            started_at: Utc::now(),
        };
        job.transition(Phase::CountingDownToOpen);
        job
    }

    pub fn transition(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal transition {} -> {}",
            self.phase,
            next
        );
        info!(
            job_id = %self.id,
            generation = self.generation,
            from = %self.phase,
            to = %next,
            "Phase transition"
        );
        self.phase = next;
    }

    /// Liveness check; a missing handle counts as closed
    pub fn window_live(&mut self) -> bool {
        self.window.as_mut().is_some_and(|w| !w.is_closed())
    }
}

/// Point-in-time view of the controller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub job_id: Option<Uuid>,
    pub generation: Option<u64>,
    pub phase: Phase,
    pub target_url: Option<String>,
    /// Set only while a countdown phase is active
    pub remaining_seconds: Option<u32>,
    /// `MM:SS` rendering of `remaining_seconds`
    pub remaining_clock: Option<String>,
    pub low_time: bool,
    pub pending_timers: usize,
    pub outcome: Option<JobOutcome>,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub started_at: Option<DateTime<Utc>>,
}

impl StatusSnapshot {
    pub fn idle() -> Self {
        Self {
            job_id: None,
            generation: None,
            phase: Phase::Idle,
            target_url: None,
            remaining_seconds: None,
            remaining_clock: None,
            low_time: false,
            pending_timers: 0,
            outcome: None,
            started_at: None,
        }
    }

    pub(crate) fn from_job(job: &Job, low_time: bool, pending_timers: usize) -> Self {
        let remaining = job.phase.is_counting_down().then_some(job.remaining);
        Self {
            job_id: Some(job.id),
            generation: Some(job.generation),
            phase: job.phase,
            target_url: Some(job.request.target_url().to_string()),
            remaining_seconds: remaining,
            remaining_clock: remaining.map(format_clock),
            low_time,
            pending_timers,
            outcome: job.outcome.clone(),
            started_at: Some(job.started_at),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }
}
