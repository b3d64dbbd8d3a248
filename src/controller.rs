//! Typed control events and the controller that applies them.
//!
//! The controller owns the current [`Organizer`]. Switching directories
//! replaces it: the old engine is stopped and dropped before the new one is
//! built and started.

use crate::access::AccessGrant;
use crate::activity::ActivityLog;
use crate::error::{OrganizerError, Result};
use crate::organizer::{OrganizeReport, Organizer, OrganizerOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Something an outside collaborator (UI, stdin, tests) asks the core to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    /// Begin monitoring the current directory.
    StartMonitoring,
    /// Stop monitoring the current directory.
    StopMonitoring,
    /// Monitor a different directory, optionally organizing it right away.
    DirectoryChanged {
        directory: PathBuf,
        organize_now: bool,
    },
    /// Run one organize pass, on the current or an explicit directory.
    OrganizeNow { directory: Option<PathBuf> },
    /// Print the current state.
    Status,
    /// Leave the control loop.
    Shutdown,
}

/// Error returned when a control line can't be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command '{0}' (try: start, stop, status, organize, switch DIR [--now], quit)")]
pub struct ParseControlError(pub String);

impl FromStr for ControlEvent {
    type Err = ParseControlError;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match (command, rest) {
            ("start", "") => Ok(Self::StartMonitoring),
            ("stop", "") => Ok(Self::StopMonitoring),
            ("status", "") => Ok(Self::Status),
            ("quit" | "exit", "") => Ok(Self::Shutdown),
            ("organize", "") => Ok(Self::OrganizeNow { directory: None }),
            ("organize", dir) => Ok(Self::OrganizeNow {
                directory: Some(PathBuf::from(dir)),
            }),
            ("switch", rest) if !rest.is_empty() => {
                let (dir, organize_now) = match rest.rsplit_once(char::is_whitespace) {
                    Some((dir, "--now")) if !dir.trim().is_empty() => (dir.trim(), true),
                    _ => (rest, false),
                };
                Ok(Self::DirectoryChanged {
                    directory: PathBuf::from(dir),
                    organize_now,
                })
            }
            _ => Err(ParseControlError(line.to_string())),
        }
    }
}

/// What handling an event produced.
#[derive(Debug)]
pub enum ControlOutcome {
    /// The event was applied; nothing to report.
    Done,
    /// An organize pass ran.
    Organized(OrganizeReport),
    /// Current directory and monitoring state.
    Status { directory: PathBuf, monitoring: bool },
    /// The caller should stop feeding events.
    Exit,
}

/// Applies [`ControlEvent`]s to the current organizer.
pub struct Controller {
    organizer: Organizer,
    log: Arc<dyn ActivityLog>,
    access: Arc<dyn AccessGrant>,
    options: OrganizerOptions,
}

impl Controller {
    pub fn new(
        directory: impl Into<PathBuf>,
        log: Arc<dyn ActivityLog>,
        access: Arc<dyn AccessGrant>,
        options: OrganizerOptions,
    ) -> Self {
        let organizer = Self::build(directory.into(), &log, &access, options);
        Self {
            organizer,
            log,
            access,
            options,
        }
    }

    fn build(
        directory: PathBuf,
        log: &Arc<dyn ActivityLog>,
        access: &Arc<dyn AccessGrant>,
        options: OrganizerOptions,
    ) -> Organizer {
        Organizer::new(directory, log.clone())
            .with_access(access.clone())
            .with_options(options)
    }

    pub fn organizer(&self) -> &Organizer {
        &self.organizer
    }

    pub fn directory(&self) -> &Path {
        self.organizer.target()
    }

    pub fn is_monitoring(&self) -> bool {
        self.organizer.is_monitoring()
    }

    /// Applies one event.
    ///
    /// # Errors
    ///
    /// Start failures and manual organize failures are returned for display.
    /// After a failed directory switch the controller is bound to the new
    /// directory but stopped. A requested catch-up pass still runs when only
    /// the OS watch could not be created.
    pub fn handle(&mut self, event: ControlEvent) -> Result<ControlOutcome> {
        match event {
            ControlEvent::StartMonitoring => {
                self.organizer.start()?;
                Ok(ControlOutcome::Done)
            }
            ControlEvent::StopMonitoring => {
                self.organizer.stop();
                Ok(ControlOutcome::Done)
            }
            ControlEvent::DirectoryChanged {
                directory,
                organize_now,
            } => {
                let started = self.switch_to(directory);
                self.after_switch(started, organize_now)
            }
            ControlEvent::OrganizeNow { directory } => {
                let report = self.organizer.organize_now(directory.as_deref())?;
                Ok(ControlOutcome::Organized(report))
            }
            ControlEvent::Status => Ok(ControlOutcome::Status {
                directory: self.directory().to_path_buf(),
                monitoring: self.is_monitoring(),
            }),
            ControlEvent::Shutdown => {
                self.organizer.stop();
                Ok(ControlOutcome::Exit)
            }
        }
    }

    /// Runs the catch-up pass requested with a switch. The pass only needs the
    /// directory to be usable, so it still runs when just the OS watch failed.
    fn after_switch(&mut self, started: Result<()>, organize_now: bool) -> Result<ControlOutcome> {
        match started {
            Ok(()) if organize_now => {
                Ok(ControlOutcome::Organized(self.organizer.organize_now(None)?))
            }
            Ok(()) => Ok(ControlOutcome::Done),
            Err(err @ OrganizerError::Watch(_)) if organize_now => {
                self.log.error(&format!(
                    "Could not monitor {}: {err}",
                    self.directory().display()
                ));
                Ok(ControlOutcome::Organized(self.organizer.organize_now(None)?))
            }
            Err(err) => Err(err),
        }
    }

    fn switch_to(&mut self, directory: PathBuf) -> Result<()> {
        self.organizer.stop();
        self.log.info(&format!(
            "Monitored directory changed to: {}",
            directory.display()
        ));
        // Assigning drops the previous engine, releasing anything it held.
        self.organizer = Self::build(directory, &self.log, &self.access, self.options);
        self.organizer.start()
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("organizer", &self.organizer)
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::DenyAccess;
    use crate::activity::{Level, MemoryLog};
    use notify_debouncer_mini::notify;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn controller(directory: &Path) -> Controller {
        Controller::new(
            directory,
            Arc::new(MemoryLog::new()),
            Arc::new(DenyAccess),
            OrganizerOptions::default(),
        )
    }

    #[test]
    fn test_parse_control_lines() {
        assert_eq!("start".parse(), Ok(ControlEvent::StartMonitoring));
        assert_eq!(" stop ".parse(), Ok(ControlEvent::StopMonitoring));
        assert_eq!("quit".parse(), Ok(ControlEvent::Shutdown));
        assert_eq!(
            "organize".parse(),
            Ok(ControlEvent::OrganizeNow { directory: None })
        );
        assert_eq!(
            "organize /tmp/My Shots".parse(),
            Ok(ControlEvent::OrganizeNow {
                directory: Some(PathBuf::from("/tmp/My Shots"))
            })
        );
        assert_eq!(
            "switch /tmp/new --now".parse(),
            Ok(ControlEvent::DirectoryChanged {
                directory: PathBuf::from("/tmp/new"),
                organize_now: true,
            })
        );
        assert_eq!(
            "switch /tmp/new".parse(),
            Ok(ControlEvent::DirectoryChanged {
                directory: PathBuf::from("/tmp/new"),
                organize_now: false,
            })
        );
    }

    #[test]
    fn test_parse_now_flag_needs_its_own_word() {
        assert_eq!(
            "switch /tmp/foo--now".parse(),
            Ok(ControlEvent::DirectoryChanged {
                directory: PathBuf::from("/tmp/foo--now"),
                organize_now: false,
            })
        );
        assert_eq!(
            "switch /tmp/My Shots  --now".parse(),
            Ok(ControlEvent::DirectoryChanged {
                directory: PathBuf::from("/tmp/My Shots"),
                organize_now: true,
            })
        );
    }

    #[test]
    fn test_parse_rejects_unknown_and_incomplete_lines() {
        assert!("switch".parse::<ControlEvent>().is_err());
        assert!("start now".parse::<ControlEvent>().is_err());
        assert!("dance".parse::<ControlEvent>().is_err());
    }

    #[test]
    fn test_switch_rebinds_and_starts() {
        let old_dir = TempDir::new().expect("Failed to create temp directory");
        let new_dir = TempDir::new().expect("Failed to create temp directory");
        let name = "Screenshot 2023-01-15 at 10.30.00.png";
        fs::write(new_dir.path().join(name), "x").expect("Failed to write test file");

        let mut controller = controller(old_dir.path());
        controller
            .handle(ControlEvent::StartMonitoring)
            .expect("Failed to start");

        let outcome = controller
            .handle(ControlEvent::DirectoryChanged {
                directory: new_dir.path().to_path_buf(),
                organize_now: true,
            })
            .expect("Failed to switch");

        assert_eq!(controller.directory(), new_dir.path());
        assert!(controller.is_monitoring());
        match outcome {
            ControlOutcome::Organized(report) => assert_eq!(report.moved.len(), 1),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(new_dir.path().join("2023").join("01").join(name).exists());

        controller
            .handle(ControlEvent::Shutdown)
            .expect("Failed to shut down");
        assert!(!controller.is_monitoring());
    }

    #[test]
    fn test_switch_to_missing_directory_reports_and_stays_stopped() {
        let old_dir = TempDir::new().expect("Failed to create temp directory");
        let mut controller = controller(old_dir.path());
        controller
            .handle(ControlEvent::StartMonitoring)
            .expect("Failed to start");

        let missing = old_dir.path().join("missing");
        let result = controller.handle(ControlEvent::DirectoryChanged {
            directory: missing.clone(),
            organize_now: false,
        });

        assert!(matches!(result, Err(OrganizerError::DirectoryNotFound { .. })));
        assert_eq!(controller.directory(), missing);
        assert!(!controller.is_monitoring());
    }

    fn watch_failure() -> OrganizerError {
        OrganizerError::Watch(notify::Error::generic("inotify watch limit reached"))
    }

    #[test]
    fn test_catch_up_runs_when_only_the_watch_failed() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let name = "Screenshot 2023-01-15 at 10.30.00.png";
        fs::write(dir.path().join(name), "x").expect("Failed to write test file");
        let log = Arc::new(MemoryLog::new());
        let mut controller = Controller::new(
            dir.path(),
            log.clone(),
            Arc::new(DenyAccess),
            OrganizerOptions::default(),
        );

        let outcome = controller
            .after_switch(Err(watch_failure()), true)
            .expect("catch-up pass should run");

        match outcome {
            ControlOutcome::Organized(report) => assert_eq!(report.moved.len(), 1),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(dir.path().join("2023").join("01").join(name).exists());
        assert!(!controller.is_monitoring());
        let errors = log.messages(Level::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Could not monitor "));
    }

    #[test]
    fn test_watch_failure_without_catch_up_is_reported() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let mut controller = controller(dir.path());

        let result = controller.after_switch(Err(watch_failure()), false);
        assert!(matches!(result, Err(OrganizerError::Watch(_))));
    }

    #[test]
    fn test_access_failure_skips_catch_up() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let mut controller = controller(dir.path());

        let result = controller.after_switch(
            Err(OrganizerError::DirectoryNotFound {
                path: dir.path().to_path_buf(),
            }),
            true,
        );
        assert!(matches!(result, Err(OrganizerError::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_status_reflects_state() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let mut controller = controller(dir.path());

        match controller.handle(ControlEvent::Status).expect("status") {
            ControlOutcome::Status {
                directory,
                monitoring,
            } => {
                assert_eq!(directory, dir.path());
                assert!(!monitoring);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
