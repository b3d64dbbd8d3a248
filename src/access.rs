//! Directory access checks and the interactive access-grant seam.

use crate::error::{OrganizerError, Result};
use std::fs;
use std::io;
use std::path::Path;

/// Collaborator asked to restore access when a directory can't be read.
///
/// Returns `true` when access has (presumably) been granted and the check
/// should be retried.
pub trait AccessGrant: Send + Sync {
    fn request_access(&self, directory: &Path) -> bool;
}

/// Never grants access. Suitable for unattended runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct DenyAccess;

impl AccessGrant for DenyAccess {
    fn request_access(&self, _directory: &Path) -> bool {
        false
    }
}

/// Asks on the terminal whether the user has restored access to the folder.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptAccess;

impl AccessGrant for PromptAccess {
    fn request_access(&self, directory: &Path) -> bool {
        let prompt = format!(
            "Cannot read {}. Grant access to this folder, then retry?",
            directory.display()
        );
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()
            .unwrap_or(false)
    }
}

/// Verifies `directory` can be enumerated, consulting `grant` on an
/// access-control failure.
pub fn ensure_access(directory: &Path, grant: &dyn AccessGrant) -> Result<()> {
    ensure_access_with(directory, grant, |dir| fs::read_dir(dir).map(drop))
}

fn ensure_access_with<F>(directory: &Path, grant: &dyn AccessGrant, probe: F) -> Result<()>
where
    F: Fn(&Path) -> io::Result<()>,
{
    match probe(directory) {
        Ok(()) => Ok(()),
        Err(err) => match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => {
                Err(OrganizerError::DirectoryNotFound {
                    path: directory.to_path_buf(),
                })
            }
            io::ErrorKind::PermissionDenied => {
                tracing::debug!("access denied for {}, requesting grant", directory.display());
                if grant.request_access(directory) && probe(directory).is_ok() {
                    Ok(())
                } else {
                    Err(OrganizerError::PermissionDenied {
                        path: directory.to_path_buf(),
                    })
                }
            }
            _ => Err(OrganizerError::file_system(directory.display(), err)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct CountingGrant {
        answer: bool,
        asked: AtomicUsize,
    }

    impl CountingGrant {
        fn new(answer: bool) -> Self {
            Self {
                answer,
                asked: AtomicUsize::new(0),
            }
        }
    }

    impl AccessGrant for CountingGrant {
        fn request_access(&self, _directory: &Path) -> bool {
            self.asked.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
    }

    fn denied() -> io::Error {
        io::Error::from(io::ErrorKind::PermissionDenied)
    }

    #[test]
    fn test_readable_directory_passes_without_asking() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let grant = CountingGrant::new(false);

        ensure_access(temp_dir.path(), &grant).expect("readable directory");
        assert_eq!(grant.asked.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_directory_is_not_found() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("missing");

        let result = ensure_access(&missing, &DenyAccess);
        assert!(matches!(result, Err(OrganizerError::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_regular_file_is_not_found() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("plain.txt");
        fs::write(&file, "x").expect("Failed to write test file");

        let result = ensure_access(&file, &DenyAccess);
        assert!(matches!(result, Err(OrganizerError::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_denied_access_without_grant_is_permission_denied() {
        let grant = CountingGrant::new(false);
        let result = ensure_access_with(Path::new("/locked"), &grant, |_| Err(denied()));

        assert!(matches!(result, Err(OrganizerError::PermissionDenied { .. })));
        assert_eq!(grant.asked.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_granted_access_retries_the_probe() {
        let grant = CountingGrant::new(true);
        let attempts = AtomicUsize::new(0);
        let result = ensure_access_with(Path::new("/locked"), &grant, |_| {
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(denied())
            } else {
                Ok(())
            }
        });

        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_grant_that_does_not_help_is_permission_denied() {
        let grant = CountingGrant::new(true);
        let result = ensure_access_with(Path::new("/locked"), &grant, |_| Err(denied()));
        assert!(matches!(result, Err(OrganizerError::PermissionDenied { .. })));
    }

    #[test]
    fn test_other_io_errors_are_file_system_errors() {
        let result = ensure_access_with(Path::new("/odd"), &DenyAccess, |_| {
            Err(io::Error::other("device went away"))
        });
        match result {
            Err(OrganizerError::FileSystemError { message }) => {
                assert!(message.contains("device went away"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
