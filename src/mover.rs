//! Collision-safe moves of classified files into dated folders.
//!
//! This module computes destination folders for classified captures, creates
//! them on demand, picks a free file name when the original one is taken and
//! performs the final rename. A file that fails to move is left untouched.

use crate::activity::ActivityLog;
use crate::classifier::{Category, Classification};
use crate::error::{OrganizerError, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Records a single completed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovedFile {
    /// The path of the file before organization.
    pub original_path: PathBuf,
    /// The path of the file after organization.
    pub new_path: PathBuf,
    /// The category the file was classified as.
    pub category: Category,
}

/// Moves classified files under an organized root.
pub struct FileMover;

impl FileMover {
    /// Returns the folder a classified file belongs in, under `root`.
    pub fn destination_dir(root: &Path, classification: &Classification) -> PathBuf {
        root.join(classification.relative_dir())
    }

    /// Returns a path in `folder` for `file_name` that no existing entry
    /// occupies, appending ` (1)`, ` (2)`, ... before the extension as needed.
    ///
    /// ```no_run
    /// use screenshot_organizer::mover::FileMover;
    /// use std::path::Path;
    ///
    /// // With "a.png" already present this yields "a (1).png".
    /// let free = FileMover::resolve_collision(Path::new("/shots/2024/05"), "a.png");
    /// println!("{}", free.display());
    /// ```
    pub fn resolve_collision(folder: &Path, file_name: &str) -> PathBuf {
        Self::first_free(folder, file_name, |_| false)
    }

    /// Like [`FileMover::resolve_collision`], also skipping any path for
    /// which `claimed` returns true.
    pub(crate) fn first_free<F>(folder: &Path, file_name: &str, claimed: F) -> PathBuf
    where
        F: Fn(&Path) -> bool,
    {
        let mut candidate = folder.join(file_name);
        let mut counter: u32 = 1;
        while candidate.symlink_metadata().is_ok() || claimed(&candidate) {
            candidate = folder.join(numbered_name(file_name, counter));
            counter += 1;
        }
        candidate
    }

    /// Moves `file_path` into its dated folder under `root`.
    ///
    /// Creates the destination folder and any missing ancestors, resolves
    /// name collisions and renames the file. Any failure is reported as
    /// [`OrganizerError::MoveFailed`] and leaves the source where it was.
    pub fn move_into_place(
        root: &Path,
        file_path: &Path,
        classification: &Classification,
        log: &dyn ActivityLog,
    ) -> Result<MovedFile> {
        let move_failed = |message: String| OrganizerError::MoveFailed {
            path: file_path.to_path_buf(),
            message,
        };

        let file_name = file_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| move_failed("file has no usable name".to_string()))?;

        let folder = Self::destination_dir(root, classification);
        if !folder.is_dir() {
            fs::create_dir_all(&folder).map_err(|e| {
                move_failed(format!("cannot create {}: {e}", folder.display()))
            })?;
            log.info(&format!("Created directory: {}", folder.display()));
        }

        let destination = Self::resolve_collision(&folder, file_name);
        fs::rename(file_path, &destination).map_err(|e| {
            move_failed(format!("cannot rename to {}: {e}", destination.display()))
        })?;

        log.info(&format!(
            "Moved {file_name} to {}/",
            classification.relative_dir().display()
        ));

        Ok(MovedFile {
            original_path: file_path.to_path_buf(),
            new_path: destination,
            category: classification.category,
        })
    }
}

/// Inserts ` (n)` before the last extension of `file_name`.
fn numbered_name(file_name: &str, n: u32) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => format!("{stem} ({n}).{}", ext.to_string_lossy()),
        None => format!("{stem} ({n})"),
    }
}
