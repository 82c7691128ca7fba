use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PrinterConfig;
use crate::enrichment::{ContentSource, Enricher};
use crate::error::PrinterError;
use crate::formatter::Template;
use crate::state_machine::{Job, JobId, JobState, StateMachine};
use crate::store::JobStore;

/// Pacing of the reveal and settle phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Delay between two revealed lines.
    pub line_interval: Duration,
    /// How long a fully printed receipt stays in `Settling`.
    pub settle_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            line_interval: Duration::from_millis(200),
            settle_delay: Duration::from_millis(800),
        }
    }
}

/// Drives receipt jobs through ASSEMBLING → REVEALING → SETTLING → SETTLED.
///
/// At most one job holds the printer at a time; submissions made while it
/// is busy are rejected, not queued. The job store and the busy flag live
/// behind `watch` channels so observers always see a consistent snapshot
/// and only the scheduler writes.
///
/// Dropping the scheduler (or calling [`dispose`](Self::dispose)) cancels
/// the running lifecycle. Once either returns the store is never written
/// again, even by a step already in flight on another worker.
pub struct PrinterScheduler<S> {
    inner: Arc<Shared<S>>,
}

struct Shared<S> {
    store: watch::Sender<JobStore>,
    busy: watch::Sender<bool>,
    enricher: Enricher<S>,
    timing: Timing,
    wrap_width: usize,
    shutdown: CancellationToken,
}

impl<S: ContentSource + 'static> PrinterScheduler<S> {
    pub fn new(enricher: Enricher<S>, wrap_width: usize, timing: Timing) -> Self {
        let (store, _) = watch::channel(JobStore::new());
        let (busy, _) = watch::channel(false);
        Self {
            inner: Arc::new(Shared {
                store,
                busy,
                enricher,
                timing,
                wrap_width,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn from_config(config: &PrinterConfig, enricher: Enricher<S>) -> Self {
        Self::new(enricher, config.wrap_width, config.timing())
    }

    /// Start printing `raw` and return the new job's id.
    ///
    /// Returns `None` without side effects when `raw` is blank, another job
    /// is still active, or the scheduler has been disposed. The lifecycle
    /// runs on a spawned task, so this must be called inside a Tokio runtime.
    pub fn submit(&self, raw: &str) -> Option<JobId> {
        if raw.trim().is_empty() {
            debug!("blank submission ignored");
            return None;
        }
        if self.inner.shutdown.is_cancelled() {
            warn!("submission after dispose ignored");
            return None;
        }

        // Check-and-set under the channel lock so two callers can never
        // both see an idle printer.
        let admitted = self.inner.busy.send_if_modified(|busy| {
            if *busy {
                false
            } else {
                *busy = true;
                true
            }
        });
        if !admitted {
            info!("printer busy, submission rejected");
            return None;
        }

        let id = JobId::next();
        info!(%id, state = %JobState::Assembling, "job admitted");

        let shared = Arc::clone(&self.inner);
        let token = shared.shutdown.clone();
        let raw = raw.to_string();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => debug!(%id, "lifecycle cancelled"),
                _ = shared.run(id, raw) => {}
            }
        });

        Some(id)
    }

    pub fn is_busy(&self) -> bool {
        *self.inner.busy.borrow()
    }

    pub fn watch_busy(&self) -> watch::Receiver<bool> {
        self.inner.busy.subscribe()
    }

    /// Live, read-only view of the job store.
    pub fn subscribe(&self) -> watch::Receiver<JobStore> {
        self.inner.store.subscribe()
    }

    /// Copies of all jobs in creation order.
    pub fn snapshot(&self) -> Vec<Job> {
        self.inner.store.borrow().snapshot()
    }

    /// Resolve once no job is active, or immediately after dispose.
    pub async fn wait_idle(&self) {
        let mut busy = self.inner.busy.subscribe();
        tokio::select! {
            _ = self.inner.shutdown.cancelled() => {}
            _ = busy.wait_for(|busy| !*busy) => {}
        }
    }

    /// Cancel every pending reveal and settle timer. Idempotent.
    pub fn dispose(&self) {
        if !self.inner.shutdown.is_cancelled() {
            info!("printer disposed");
        }
        self.inner.shut_down();
    }
}

impl<S> Drop for PrinterScheduler<S> {
    fn drop(&mut self) {
        self.inner.shut_down();
    }
}

impl<S> Shared<S> {
    fn shut_down(&self) {
        self.shutdown.cancel();
        // Wait out a store write that checked the token just before the
        // cancel; every later write sees it cancelled.
        self.store.send_if_modified(|_| false);
    }
}

impl<S: ContentSource> Shared<S> {
    async fn run(&self, id: JobId, raw: String) {
        match self.drive(id, &raw).await {
            Ok(()) => {}
            Err(PrinterError::Disposed) => {
                debug!(%id, "lifecycle stopped by dispose");
                return;
            }
            Err(e) => warn!(%id, error = %e, "job store rejected a lifecycle step"),
        }
        self.busy.send_replace(false);
    }

    async fn drive(&self, id: JobId, raw: &str) -> Result<(), PrinterError> {
        // ASSEMBLING: nothing is visible until the template is final.
        let enrichment = self.enricher.enrich(raw).await;
        let timestamp = Local::now().format("%Y/%-m/%-d %H:%M:%S").to_string();
        let template = Template::assemble(raw, enrichment.as_deref(), &timestamp, self.wrap_width);
        let total = template.len();

        let mut job = Job::new(id, template);
        StateMachine::advance(&mut job, JobState::Revealing)?;
        let enriched = job.enriched;
        self.publish(job)?;
        info!(%id, lines = total, enriched, state = %JobState::Revealing, "template ready");

        // REVEALING: one line per tick, first tick one interval after the
        // job appears.
        let period = self.timing.line_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let revealed = self.mutate(id, |store| store.append_line(id))?;
            debug!(%id, revealed, total, "line revealed");
            if revealed == total {
                break;
            }
        }

        // SETTLING
        self.mutate(id, |store| store.set_state(id, JobState::Settling))?;
        info!(%id, state = %JobState::Settling, "reveal complete");
        sleep(self.timing.settle_delay).await;

        // SETTLED
        self.mutate(id, |store| store.set_state(id, JobState::Settled))?;
        info!(%id, state = %JobState::Settled, "job settled");
        Ok(())
    }

    /// Make a freshly assembled job visible. An id already in the store is
    /// an error and leaves the earlier job untouched.
    fn publish(&self, job: Job) -> Result<(), PrinterError> {
        let id = job.id;
        self.mutate(id, |store| {
            if store.insert(job) {
                Ok(())
            } else {
                Err(PrinterError::DuplicateJob(id))
            }
        })
    }

    /// Apply `f` to the store, notifying observers only when it succeeds.
    /// Nothing is applied once the scheduler is disposed.
    fn mutate<T>(
        &self,
        id: JobId,
        f: impl FnOnce(&mut JobStore) -> Result<T, PrinterError>,
    ) -> Result<T, PrinterError> {
        let mut outcome = Err(PrinterError::JobNotFound(id));
        self.store.send_if_modified(|store| {
            outcome = if self.shutdown.is_cancelled() {
                Err(PrinterError::Disposed)
            } else {
                f(store)
            };
            outcome.is_ok()
        });
        outcome
    }
}
