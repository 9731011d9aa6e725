//! The boundary to the machine: directory listings, probes, icons and
//! process launching. Everything behind [`Host`] is slow and fallible; the
//! navigation core only ever awaits it from spawned tasks.

pub mod local;
#[cfg(test)]
pub mod testing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// One directory entry as reported by the host. Never built or mutated by
/// the navigation core itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub is_dir: bool,
    /// Lower-level type tag (the extension); `None` for directories.
    pub file_type: Option<String>,
}

impl FileEntry {
    /// A directory entry for a path that did not come from a listing, such
    /// as a volume root.
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
            file_type: None,
        }
    }

    /// Last non-empty path component, or the whole path for roots like `/`.
    pub fn name(&self) -> &str {
        self.path
            .split(['/', '\\'])
            .filter(|s| !s.is_empty())
            .next_back()
            .unwrap_or(&self.path)
    }

    /// Name relative to `base`, as shown in the file list.
    pub fn relative_name(&self, base: &str) -> String {
        let normalized = self.path.replace('\\', "/");
        let base = base.replace('\\', "/");
        let prefix = format!("{}/", base.trim_end_matches('/'));
        normalized
            .strip_prefix(prefix.as_str())
            .filter(|rest| !rest.is_empty())
            .unwrap_or_else(|| self.name())
            .trim()
            .to_string()
    }
}

/// Asynchronous request/response surface of the filesystem host.
#[async_trait]
pub trait Host: Send + Sync {
    /// Full listing of `path`, files and directories alike.
    async fn list_directory(&self, path: &str) -> Result<Vec<FileEntry>, HostError>;

    /// Whether `path` holds at least one subdirectory.
    async fn has_child_directories(&self, path: &str) -> Result<bool, HostError>;

    /// Directory used when the route is empty.
    async fn desktop_root_path(&self) -> Result<String, HostError>;

    /// Mount points / drives shown as sidebar roots.
    async fn list_volume_roots(&self) -> Result<Vec<String>, HostError>;

    /// Raw icon bytes for `path`, or `None` when the file has no own icon.
    async fn resolve_icon(&self, path: &str) -> Result<Option<Vec<u8>>, HostError>;

    async fn open_with_system_default(&self, path: &str) -> Result<(), HostError>;

    async fn open_in_external_editor(&self, path: &str, editor_id: &str) -> Result<(), HostError>;
}
