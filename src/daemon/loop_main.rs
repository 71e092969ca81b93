//! The poll loop: poll → detect → enqueue → deliver → sleep, forever.
//!
//! Any failure while polling or detecting becomes one error notice that goes
//! through the same queue and delivery path as change notices. Delivery runs
//! every cycle whether or not detection succeeded.

#![allow(missing_docs)]

use std::time::Duration;

use crate::core::config::{Config, Credentials};
use crate::core::errors::{ErrorKind, HsbError, Result};
use crate::daemon::signals::ShutdownSignal;
use crate::logger::{ActivityEvent, ActivityJournal};
use crate::notify::delivery::{DeliveryPipeline, DeliveryReport, Messenger};
use crate::notify::message::{render_change, render_error};
use crate::notify::queue::{MessageKind, NotificationQueue};
use crate::notify::telegram::TelegramMessenger;
use crate::source::{PracticumSource, StatusSource};
use crate::tracker::detector::{ChangeDetector, DetectorOptions, PollCursor};
use crate::tracker::state::ChangeEvent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CyclePhase {
    #[default]
    Polling,
    Detecting,
    Enqueuing,
    Delivering,
    Sleeping,
}

/// What one iteration did.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub cycle: u64,
    pub events: Vec<ChangeEvent>,
    /// Messages actually added to the queue this cycle.
    pub enqueued: usize,
    pub failure: Option<CycleFailure>,
    pub delivery: DeliveryReport,
    pub cursor: i64,
    pub pending_after: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleFailure {
    pub kind: ErrorKind,
    pub code: &'static str,
    pub notice: String,
}

pub struct PollLoop<S, M> {
    source: S,
    detector: ChangeDetector,
    queue: NotificationQueue,
    pipeline: DeliveryPipeline<M>,
    interval: Duration,
    journal: ActivityJournal,
    phase: CyclePhase,
    cycles: u64,
}

impl PollLoop<PracticumSource, TelegramMessenger> {
    /// Wire the live HTTP collaborators from validated configuration.
    pub fn from_config(config: &Config, credentials: &Credentials) -> Result<Self> {
        let source =
            PracticumSource::new(&config.source.endpoint, &credentials.source_token, &config.http)?;
        let messenger = TelegramMessenger::new(
            &config.telegram.api_base,
            &credentials.telegram_token,
            &config.http,
        )?;
        let cursor = config
            .poll
            .initial_cursor
            .map_or_else(PollCursor::now, PollCursor::new);
        let detector = ChangeDetector::new(DetectorOptions::from(&config.poll), cursor);

        Ok(Self::new(
            source,
            DeliveryPipeline::new(messenger, credentials.chat_id.clone()),
            detector,
            Duration::from_secs(config.poll.interval_secs),
        )
        .with_journal(ActivityJournal::open_or_disabled(
            config.logging.journal_path.as_deref(),
        )))
    }
}

impl<S: StatusSource, M: Messenger> PollLoop<S, M> {
    pub fn new(
        source: S,
        pipeline: DeliveryPipeline<M>,
        detector: ChangeDetector,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            detector,
            queue: NotificationQueue::new(),
            pipeline,
            interval,
            journal: ActivityJournal::disabled(),
            phase: CyclePhase::default(),
            cycles: 0,
        }
    }

    #[must_use]
    pub fn with_journal(mut self, journal: ActivityJournal) -> Self {
        self.journal = journal;
        self
    }

    #[must_use]
    pub const fn queue(&self) -> &NotificationQueue {
        &self.queue
    }

    #[must_use]
    pub const fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    #[must_use]
    pub const fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Run until `shutdown` fires during a sleep. Returns the cycle count.
    pub fn run(&mut self, shutdown: &ShutdownSignal) -> u64 {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            cursor = self.detector.cursor().get(),
            "poll loop started"
        );
        self.journal.record(&ActivityEvent::LoopStarted {
            interval_secs: self.interval.as_secs(),
            cursor: self.detector.cursor().get(),
        });

        loop {
            self.run_cycle();
            self.enter(CyclePhase::Sleeping);
            if shutdown.wait_timeout(self.interval) {
                break;
            }
        }

        tracing::info!(cycles = self.cycles, pending = self.queue.len(), "poll loop stopped");
        self.journal.record(&ActivityEvent::LoopStopped {
            cycles: self.cycles,
        });
        self.cycles
    }

    /// One full iteration without the trailing sleep.
    pub fn run_cycle(&mut self) -> CycleReport {
        self.cycles += 1;
        let mut report = CycleReport {
            cycle: self.cycles,
            ..CycleReport::default()
        };

        let outcome = self.poll_and_detect();

        self.enter(CyclePhase::Enqueuing);
        match outcome {
            Ok(events) => {
                if events.is_empty() {
                    tracing::debug!(cycle = self.cycles, "no status changes");
                }
                for event in &events {
                    self.journal.record(&ActivityEvent::ChangeDetected {
                        id: event.id.clone(),
                        status: event.status,
                        previous: event.previous,
                        updated_at: event.updated_at,
                    });
                    if self
                        .queue
                        .enqueue(render_change(event), MessageKind::Change)
                        .is_queued()
                    {
                        report.enqueued += 1;
                    }
                }
                report.events = events;
            }
            Err(err) => {
                let failure = self.handle_failure(&err);
                if self
                    .queue
                    .enqueue(failure.notice.clone(), MessageKind::Error)
                    .is_queued()
                {
                    report.enqueued += 1;
                }
                report.failure = Some(failure);
            }
        }

        self.enter(CyclePhase::Delivering);
        report.delivery = self.pipeline.deliver_pending(&mut self.queue);
        for message in &report.delivery.delivered {
            self.journal.record(&ActivityEvent::MessageDelivered {
                seq: message.seq,
                kind: message.kind,
            });
        }
        for (message, error) in &report.delivery.failed {
            self.journal.record(&ActivityEvent::DeliveryFailed {
                seq: message.seq,
                kind: message.kind,
                error: error.clone(),
            });
        }

        report.cursor = self.detector.cursor().get();
        report.pending_after = self.queue.len();
        report
    }

    fn poll_and_detect(&mut self) -> Result<Vec<ChangeEvent>> {
        self.enter(CyclePhase::Polling);
        let raw = self.source.fetch(self.detector.cursor().get())?;
        self.enter(CyclePhase::Detecting);
        self.detector.detect(&raw)
    }

    fn handle_failure(&mut self, err: &HsbError) -> CycleFailure {
        let notice = render_error(err);
        tracing::error!(
            cycle = self.cycles,
            kind = %err.kind(),
            code = err.code(),
            error = %err,
            "cycle failed"
        );
        self.journal.record(&ActivityEvent::CycleFailed {
            kind: err.kind().to_string(),
            code: err.code().to_string(),
            message: err.to_string(),
        });
        CycleFailure {
            kind: err.kind(),
            code: err.code(),
            notice,
        }
    }

    fn enter(&mut self, phase: CyclePhase) {
        tracing::trace!(from = ?self.phase, to = ?phase, "phase transition");
        self.phase = phase;
    }
}
