//! screenshot-organizer - files screenshots and screen recordings by date
//!
//! This library watches a single directory and moves captures named like
//! `Screenshot 2024-05-01 at 10.30.00.png` into `YYYY/MM/` folders (screen
//! recordings go under `recordings/YYYY/MM/`), never overwriting an existing
//! file. It also exposes a one-shot organize pass, a dry-run planner and the
//! settings, logging and control plumbing used by the command-line front end.

pub mod access;
pub mod activity;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod mover;
pub mod organizer;
pub mod output;
mod watch;

pub use access::{AccessGrant, DenyAccess, PromptAccess};
pub use activity::{ActivityLog, MemoryLog, TracingLog};
pub use classifier::{Category, Classification, classify};
pub use config::{ConfigError, Settings};
pub use controller::{ControlEvent, ControlOutcome, Controller};
pub use error::{OrganizerError, Result};
pub use mover::{FileMover, MovedFile};
pub use organizer::{OrganizeReport, Organizer, OrganizerOptions, PlannedMove};

pub use cli::{Cli, Command, run_cli};
