//! [`Host`] backed by the local machine.

use std::path::Path;

use async_trait::async_trait;
use sysinfo::Disks;
use tracing::debug;

use super::{FileEntry, Host};
use crate::error::HostError;

/// Talks to the local filesystem through `tokio::fs`.
#[derive(Debug, Default, Clone)]
pub struct LocalHost;

impl LocalHost {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Host for LocalHost {
    async fn list_directory(&self, path: &str) -> Result<Vec<FileEntry>, HostError> {
        let mut reader = tokio::fs::read_dir(path)
            .await
            .map_err(|e| HostError::from_io(path, &e))?;

        let mut entries = Vec::new();
        loop {
            let entry = match reader.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                // Keep what was read so far.
                Err(e) => {
                    debug!(path, error = %e, "directory read stopped early");
                    break;
                }
            };
            let entry_path = entry.path();
            let is_dir = tokio::fs::metadata(&entry_path)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            let file_type = if is_dir {
                None
            } else {
                entry_path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(str::to_string)
            };
            entries.push(FileEntry {
                path: entry_path.display().to_string(),
                is_dir,
                file_type,
            });
        }
        debug!(path, count = entries.len(), "listed directory");
        Ok(entries)
    }

    async fn has_child_directories(&self, path: &str) -> Result<bool, HostError> {
        let is_dir = tokio::fs::metadata(path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Ok(false);
        }

        let mut reader = tokio::fs::read_dir(path)
            .await
            .map_err(|e| HostError::from_io(path, &e))?;
        while let Ok(Some(entry)) = reader.next_entry().await {
            if let Ok(meta) = tokio::fs::metadata(entry.path()).await {
                if meta.is_dir() {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    async fn desktop_root_path(&self) -> Result<String, HostError> {
        dirs::desktop_dir()
            .filter(|p| p.is_dir())
            .or_else(dirs::home_dir)
            .map(|p| p.display().to_string())
            .ok_or_else(|| HostError::Unavailable("desktop directory".into()))
    }

    async fn list_volume_roots(&self) -> Result<Vec<String>, HostError> {
        volume_roots().await
    }

    async fn resolve_icon(&self, path: &str) -> Result<Option<Vec<u8>>, HostError> {
        let is_icon_file = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ico"));
        if !is_icon_file {
            return Ok(None);
        }
        tokio::fs::read(path)
            .await
            .map(Some)
            .map_err(|_| HostError::Extraction(path.to_string()))
    }

    async fn open_with_system_default(&self, path: &str) -> Result<(), HostError> {
        open::that_detached(path).map_err(|e| HostError::Unavailable(format!("system opener: {e}")))
    }

    async fn open_in_external_editor(&self, path: &str, editor_id: &str) -> Result<(), HostError> {
        open::with_detached(path, editor_id)
            .map_err(|e| HostError::Unavailable(format!("{editor_id}: {e}")))
    }
}

/// Mount points of the attached disks. Disk enumeration blocks, so it runs
/// off the runtime workers.
async fn volume_roots() -> Result<Vec<String>, HostError> {
    let mounts = tokio::task::spawn_blocking(|| {
        Disks::new_with_refreshed_list()
            .list()
            .iter()
            .map(|disk| disk.mount_point().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
    })
    .await
    .map_err(|e| HostError::Unavailable(format!("disk list: {e}")))?;
    Ok(order_roots(mounts))
}

/// Drop duplicates and boot partitions. On Unix `/` is always present and
/// comes first.
fn order_roots(mounts: Vec<String>) -> Vec<String> {
    let mut roots: Vec<String> = Vec::with_capacity(mounts.len());
    for mount in mounts {
        if mount.starts_with("/boot") || roots.contains(&mount) {
            continue;
        }
        roots.push(mount);
    }
    if cfg!(unix) && !roots.iter().any(|r| r == "/") {
        roots.push("/".to_string());
    }
    roots.sort_by_key(|r| r.as_str() != "/");
    roots
}
