//! Credential storage and prompting seams.
//!
//! The credential is one string in one slot. The file-backed store keeps it
//! under the workspace `.coda` directory with owner-only permissions; an
//! embedding host can substitute real secret storage through the
//! [`CredentialStore`] trait without touching the coordinator.

use std::io;
use std::path::{Path, PathBuf};

use conversation_store::store_root;

pub const CREDENTIAL_FILE: &str = "credential";

/// Single-slot credential storage.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> io::Result<Option<String>>;
    fn set(&self, api_key: &str) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

/// Interactive fallback used when no credential is stored.
///
/// `None` means the operator declined; the caller must treat that as a
/// soft no-op, not an error.
pub trait CredentialPrompt: Send + Sync {
    fn request_api_key(&self) -> Option<String>;
}

/// File-backed credential slot under the workspace `.coda` directory.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(workspace: &Path) -> Self {
        Self {
            path: store_root(workspace).join(CREDENTIAL_FILE),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let trimmed = contents.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(trimmed.to_string()))
                }
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn set(&self, api_key: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.path, api_key.trim())?;
        restrict_to_owner(&self.path)
    }

    fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error),
        }
    }
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> io::Result<()> {
    Ok(())
}
