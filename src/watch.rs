//! OS watch subscription and the single worker that drains it.

use crate::activity::ActivityLog;
use crate::error::{OrganizerError, Result};
use crate::organizer::{OrganizeReport, PassRunner};
use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Messages delivered to the watch worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchSignal {
    /// The directory changed; one debounced batch of events.
    Changed,
    /// The handle is being released.
    Shutdown,
}

/// An active, non-recursive watch on one directory.
///
/// Dropping the handle detaches the OS watch, stops the worker and waits for
/// any pass in flight to finish.
pub(crate) struct WatchHandle {
    debouncer: Option<Debouncer<RecommendedWatcher>>,
    signals: Sender<WatchSignal>,
    worker: Option<JoinHandle<()>>,
}

impl WatchHandle {
    pub(crate) fn spawn(target: PathBuf, debounce: Duration, runner: PassRunner) -> Result<Self> {
        let (signals, inbox) = mpsc::channel();

        let event_tx = signals.clone();
        let mut debouncer = new_debouncer(debounce, move |result: DebounceEventResult| {
            match result {
                Ok(events) if events.is_empty() => {}
                Ok(events) => {
                    debug!("{} debounced filesystem events", events.len());
                    if event_tx.send(WatchSignal::Changed).is_err() {
                        debug!("watch worker gone, dropping change signal");
                    }
                }
                Err(e) => warn!("Watch error: {e}"),
            }
        })?;
        debouncer
            .watcher()
            .watch(&target, RecursiveMode::NonRecursive)?;

        let worker = thread::Builder::new()
            .name("organizer-watch".to_string())
            .spawn(move || {
                worker_loop(&inbox, runner.settle, runner.log.as_ref(), || {
                    runner.run(&target)
                });
                debug!("watch worker for {} stopped", target.display());
            })
            .map_err(|e| OrganizerError::file_system("cannot start watch worker", e))?;

        Ok(Self {
            debouncer: Some(debouncer),
            signals,
            worker: Some(worker),
        })
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        drop(self.debouncer.take());
        // The worker may already have exited on a closed channel.
        let _ = self.signals.send(WatchSignal::Shutdown);
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            error!("watch worker panicked");
        }
    }
}

/// Runs `pass` once per batch of signals until shutdown.
///
/// When a pass defers files, another pass is scheduled `settle` later even if
/// no further signal arrives.
fn worker_loop<F>(
    inbox: &Receiver<WatchSignal>,
    settle: Duration,
    log: &dyn ActivityLog,
    mut pass: F,
) where
    F: FnMut() -> Result<OrganizeReport>,
{
    let mut retry_at: Option<Instant> = None;

    loop {
        let signal = match retry_at {
            Some(deadline) => {
                match inbox.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                    Ok(signal) => signal,
                    Err(RecvTimeoutError::Timeout) => WatchSignal::Changed,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match inbox.recv() {
                Ok(signal) => signal,
                Err(_) => break,
            },
        };
        if signal == WatchSignal::Shutdown {
            break;
        }

        // Anything queued while the previous pass ran is covered by this one.
        if inbox.try_iter().any(|queued| queued == WatchSignal::Shutdown) {
            break;
        }

        match pass() {
            Ok(report) => {
                retry_at = if report.deferred.is_empty() {
                    None
                } else {
                    Some(Instant::now() + settle)
                };
            }
            Err(err) => {
                log.error(&format!("Error scanning directory: {err}"));
                retry_at = None;
            }
        }
    }
}
