//! Scripted in-memory host used by unit tests across the crate.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{FileEntry, Host};
use crate::error::HostError;

#[derive(Default)]
pub struct ScriptedHost {
    listings: HashMap<String, Result<Vec<FileEntry>, HostError>>,
    probes: HashMap<String, Result<bool, HostError>>,
    icons: HashMap<String, Result<Option<Vec<u8>>, HostError>>,
    volumes: Vec<String>,
    desktop: Option<String>,
    icon_delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

pub fn dir(path: &str) -> FileEntry {
    FileEntry::directory(path)
}

pub fn file(path: &str, file_type: &str) -> FileEntry {
    FileEntry {
        path: path.to_string(),
        is_dir: false,
        file_type: Some(file_type.to_string()),
    }
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listing(mut self, path: &str, entries: Vec<FileEntry>) -> Self {
        self.listings.insert(path.to_string(), Ok(entries));
        self
    }

    pub fn listing_err(mut self, path: &str, err: HostError) -> Self {
        self.listings.insert(path.to_string(), Err(err));
        self
    }

    pub fn probe(mut self, path: &str, has_children: bool) -> Self {
        self.probes.insert(path.to_string(), Ok(has_children));
        self
    }

    pub fn probe_err(mut self, path: &str, err: HostError) -> Self {
        self.probes.insert(path.to_string(), Err(err));
        self
    }

    pub fn icon(mut self, path: &str, bytes: Option<Vec<u8>>) -> Self {
        self.icons.insert(path.to_string(), Ok(bytes));
        self
    }

    pub fn icon_err(mut self, path: &str) -> Self {
        self.icons
            .insert(path.to_string(), Err(HostError::Extraction(path.to_string())));
        self
    }

    pub fn icon_delay(mut self, delay: Duration) -> Self {
        self.icon_delay = Some(delay);
        self
    }

    pub fn volumes(mut self, roots: &[&str]) -> Self {
        self.volumes = roots.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn desktop(mut self, path: &str) -> Self {
        self.desktop = Some(path.to_string());
        self
    }

    /// Number of recorded calls of `op` for `path`, e.g. `calls("icon", "/a.exe")`.
    pub fn calls(&self, op: &str, path: &str) -> usize {
        let key = format!("{op}:{path}");
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == key)
            .count()
    }

    fn record(&self, op: &str, path: &str) {
        self.calls.lock().unwrap().push(format!("{op}:{path}"));
    }
}

#[async_trait]
impl Host for ScriptedHost {
    async fn list_directory(&self, path: &str) -> Result<Vec<FileEntry>, HostError> {
        self.record("list", path);
        self.listings
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(HostError::NotFound(path.to_string())))
    }

    async fn has_child_directories(&self, path: &str) -> Result<bool, HostError> {
        self.record("probe", path);
        self.probes.get(path).cloned().unwrap_or(Ok(false))
    }

    async fn desktop_root_path(&self) -> Result<String, HostError> {
        self.record("desktop", "");
        self.desktop
            .clone()
            .ok_or_else(|| HostError::Unavailable("desktop".into()))
    }

    async fn list_volume_roots(&self) -> Result<Vec<String>, HostError> {
        self.record("volumes", "");
        Ok(self.volumes.clone())
    }

    async fn resolve_icon(&self, path: &str) -> Result<Option<Vec<u8>>, HostError> {
        self.record("icon", path);
        if let Some(delay) = self.icon_delay {
            tokio::time::sleep(delay).await;
        }
        self.icons.get(path).cloned().unwrap_or(Ok(None))
    }

    async fn open_with_system_default(&self, path: &str) -> Result<(), HostError> {
        self.record("open", path);
        Ok(())
    }

    async fn open_in_external_editor(&self, path: &str, editor_id: &str) -> Result<(), HostError> {
        self.record(&format!("editor[{editor_id}]"), path);
        Ok(())
    }
}
