//! The organizer engine: watch lifecycle, re-scan passes and manual runs.
//!
//! An [`Organizer`] is bound to a single directory for its whole life. While
//! monitoring, filesystem activity in that directory is debounced into
//! discrete signals and a dedicated worker re-scans the directory once per
//! signal. [`Organizer::organize_now`] runs the same pass on demand. Every
//! pass, whichever path triggered it, holds the same lock so two passes never
//! race for a destination name.

use crate::access::{AccessGrant, DenyAccess, ensure_access};
use crate::activity::ActivityLog;
use crate::classifier::{Classification, try_classify};
use crate::error::{OrganizerError, Result};
use crate::mover::{FileMover, MovedFile};
use crate::watch::WatchHandle;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime};

/// Default quiet window used to coalesce bursts of filesystem events.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

/// Tunables for an [`Organizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrganizerOptions {
    /// How long the directory must be quiet before a re-scan is triggered.
    pub debounce: Duration,
    /// Files modified more recently than this are left for a later pass.
    /// Zero disables the check.
    pub settle: Duration,
}

impl Default for OrganizerOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            settle: Duration::ZERO,
        }
    }
}

/// A directory entry that may be organized.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub file_name: String,
}

/// A file that could not be moved during a pass.
#[derive(Debug, Clone, Serialize)]
pub struct FailedMove {
    pub path: PathBuf,
    pub message: String,
}

/// What a single pass over a directory did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganizeReport {
    /// The directory that was organized.
    pub directory: PathBuf,
    pub moved: Vec<MovedFile>,
    pub failed: Vec<FailedMove>,
    /// Files whose names did not classify.
    pub skipped: usize,
    /// Files left in place because they were still being written.
    pub deferred: Vec<PathBuf>,
}

impl OrganizeReport {
    fn new(directory: &Path) -> Self {
        Self {
            directory: directory.to_path_buf(),
            ..Self::default()
        }
    }

    /// Returns true if every classified file was moved.
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty() && self.deferred.is_empty()
    }
}

/// A move that a pass would perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub classification: Classification,
}

/// Runs organize passes. Shared between the engine and its watch worker.
#[derive(Clone)]
pub(crate) struct PassRunner {
    pub(crate) log: Arc<dyn ActivityLog>,
    pub(crate) settle: Duration,
    lock: Arc<Mutex<()>>,
}

impl PassRunner {
    fn new(log: Arc<dyn ActivityLog>, settle: Duration) -> Self {
        Self {
            log,
            settle,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Enumerates `root` and moves every classified file into place.
    ///
    /// Per-file failures are logged and recorded; only a failure to list the
    /// directory aborts the pass.
    pub(crate) fn run(&self, root: &Path) -> Result<OrganizeReport> {
        let _pass = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut report = OrganizeReport::new(root);

        for candidate in candidates(root, self.log.as_ref())? {
            let Some(classification) = classify_candidate(&candidate) else {
                report.skipped += 1;
                continue;
            };

            if self.is_settling(&candidate.path) {
                tracing::debug!("deferring {}: still being written", candidate.file_name);
                report.deferred.push(candidate.path);
                continue;
            }

            match FileMover::move_into_place(
                root,
                &candidate.path,
                &classification,
                self.log.as_ref(),
            ) {
                Ok(moved) => report.moved.push(moved),
                Err(err) => {
                    self.log.error(&err.to_string());
                    report.failed.push(FailedMove {
                        path: candidate.path,
                        message: err.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Computes the moves a pass over `root` would perform.
    fn plan(&self, root: &Path) -> Result<Vec<PlannedMove>> {
        let _pass = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut claimed: HashSet<PathBuf> = HashSet::new();
        let mut planned = Vec::new();

        for candidate in candidates(root, self.log.as_ref())? {
            let Some(classification) = classify_candidate(&candidate) else {
                continue;
            };

            let folder = FileMover::destination_dir(root, &classification);
            let destination =
                FileMover::first_free(&folder, &candidate.file_name, |p| claimed.contains(p));
            claimed.insert(destination.clone());

            planned.push(PlannedMove {
                source: candidate.path,
                destination,
                classification,
            });
        }

        planned.sort_by(|a, b| a.source.cmp(&b.source));
        Ok(planned)
    }

    fn is_settling(&self, path: &Path) -> bool {
        if self.settle.is_zero() {
            return false;
        }
        fs::metadata(path)
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .is_some_and(|age| age < self.settle)
    }
}

/// Lists the visible regular files directly inside `root`.
fn candidates(root: &Path, log: &dyn ActivityLog) -> Result<Vec<CandidateFile>> {
    let entries = fs::read_dir(root).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => OrganizerError::DirectoryNotFound {
            path: root.to_path_buf(),
        },
        _ => OrganizerError::file_system(format!("cannot list {}", root.display()), e),
    })?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log.error(&format!("Error reading entry in {}: {e}", root.display()));
                continue;
            }
        };

        let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if file_name.starts_with('.') {
            continue;
        }
        if let Ok(file_type) = entry.file_type()
            && file_type.is_file()
        {
            found.push(CandidateFile {
                path: entry.path(),
                file_name,
            });
        }
    }

    Ok(found)
}

fn classify_candidate(candidate: &CandidateFile) -> Option<Classification> {
    match try_classify(&candidate.file_name) {
        Ok(classification) => classification,
        Err(err) => {
            tracing::debug!("skipping {}: {err}", candidate.file_name);
            None
        }
    }
}

/// Watches one directory and files captures into dated folders.
pub struct Organizer {
    target: PathBuf,
    access: Arc<dyn AccessGrant>,
    options: OrganizerOptions,
    runner: PassRunner,
    watch: Option<WatchHandle>,
}

impl Organizer {
    /// Creates a stopped organizer bound to `target`.
    pub fn new(target: impl Into<PathBuf>, log: Arc<dyn ActivityLog>) -> Self {
        let options = OrganizerOptions::default();
        Self {
            target: target.into(),
            access: Arc::new(DenyAccess),
            options,
            runner: PassRunner::new(log, options.settle),
            watch: None,
        }
    }

    /// Sets the collaborator consulted when the directory can't be read.
    pub fn with_access(mut self, access: Arc<dyn AccessGrant>) -> Self {
        self.access = access;
        self
    }

    /// Sets the debounce and settle intervals. Takes effect on the next `start`.
    pub fn with_options(mut self, options: OrganizerOptions) -> Self {
        self.options = options;
        self.runner.settle = options.settle;
        self
    }

    /// The directory this organizer is bound to.
    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn options(&self) -> OrganizerOptions {
        self.options
    }

    /// Whether the OS watch is currently active.
    pub fn is_monitoring(&self) -> bool {
        self.watch.is_some()
    }

    /// Starts monitoring the target directory. A no-op when already
    /// monitoring.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizerError::DirectoryNotFound`] or
    /// [`OrganizerError::PermissionDenied`] when the directory can't be used,
    /// and [`OrganizerError::Watch`] when the OS watch can't be created. The
    /// organizer stays stopped in every error case.
    pub fn start(&mut self) -> Result<()> {
        if self.watch.is_some() {
            return Ok(());
        }

        self.runner.log.info(&format!(
            "Starting to monitor directory: {}",
            self.target.display()
        ));
        ensure_access(&self.target, self.access.as_ref())?;

        let handle = WatchHandle::spawn(
            self.target.clone(),
            self.options.debounce,
            self.runner.clone(),
        )?;
        self.watch = Some(handle);
        Ok(())
    }

    /// Stops monitoring and releases the OS watch. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(handle) = self.watch.take() {
            drop(handle);
            self.runner.log.info(&format!(
                "Stopped monitoring directory: {}",
                self.target.display()
            ));
        }
    }

    /// Organizes `directory` (or the target when `None`) right away,
    /// regardless of monitoring state.
    ///
    /// Destination folders are created under the directory being organized.
    pub fn organize_now(&self, directory: Option<&Path>) -> Result<OrganizeReport> {
        let root = directory.unwrap_or(&self.target);
        self.runner
            .log
            .info(&format!("Starting to organize directory: {}", root.display()));

        ensure_access(root, self.access.as_ref())?;
        let report = self.runner.run(root)?;

        self.runner.log.info("Finished organizing directory");
        Ok(report)
    }

    /// Lists what [`Organizer::organize_now`] would move, without touching
    /// anything.
    pub fn plan(&self, directory: Option<&Path>) -> Result<Vec<PlannedMove>> {
        let root = directory.unwrap_or(&self.target);
        ensure_access(root, self.access.as_ref())?;
        self.runner.plan(root)
    }
}

impl Drop for Organizer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Organizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Organizer")
            .field("target", &self.target)
            .field("options", &self.options)
            .field("monitoring", &self.is_monitoring())
            .finish()
    }
}
