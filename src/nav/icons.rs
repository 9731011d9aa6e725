//! Icon resolution.
//!
//! Most files get a glyph from static tables keyed by name and type. Only
//! icon-bearing types (executables, shortcuts) are sent to the host for
//! extraction, and those results are memoized in [`IconCache`] for the
//! session.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use base64::{engine::general_purpose, Engine as _};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::host::{FileEntry, Host};

/// Default number of resolved icons kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Types whose icon lives inside the file itself.
pub const DEFAULT_ICON_BEARING: &[&str] = &["exe", "msi", "lnk", "app", "appimage", "bat", "cmd", "com"];

/// Outcome of an icon lookup. Both variants are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconSlot {
    /// Base64-encoded image data.
    Icon(String),
    /// Queried, nothing to show (including failed extractions).
    NoIcon,
}

struct Entries {
    slots: HashMap<String, Arc<OnceCell<IconSlot>>>,
    /// Insertion order, for eviction.
    order: VecDeque<String>,
}

/// Session-owned memo table from path to extracted icon.
///
/// Lookups for a path share one [`OnceCell`], so concurrent callers wait on
/// the same extraction instead of starting their own.
pub struct IconCache {
    entries: Mutex<Entries>,
    capacity: usize,
}

impl IconCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Entries {
                slots: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity: capacity.max(1),
        }
    }

    /// Resolve the icon for `path`, asking `host` at most once.
    pub async fn resolve(&self, host: &dyn Host, path: &str) -> IconSlot {
        let cell = self.slot_for(path);
        cell.get_or_init(|| async {
            debug!(path, "extracting icon");
            match host.resolve_icon(path).await {
                Ok(Some(bytes)) => IconSlot::Icon(general_purpose::STANDARD.encode(bytes)),
                Ok(None) => IconSlot::NoIcon,
                Err(e) => {
                    warn!(path, error = %e, "icon extraction failed");
                    IconSlot::NoIcon
                }
            }
        })
        .await
        .clone()
    }

    /// Stored value for `path`, if it has been resolved.
    pub fn get(&self, path: &str) -> Option<IconSlot> {
        let entries = self.lock();
        entries.slots.get(path).and_then(|cell| cell.get().cloned())
    }

    /// Whether `path` is resolved or has an extraction in flight.
    pub fn is_tracked(&self, path: &str) -> bool {
        self.lock().slots.contains_key(path)
    }

    #[cfg(test)]
    pub fn put(&self, path: &str, slot: IconSlot) {
        let mut entries = self.lock();
        if entries.slots.contains_key(path) {
            // An initialized cell stays terminal; only an idle one can be filled.
            if let Some(cell) = entries.slots.get(path) {
                let _ = cell.set(slot);
            }
            return;
        }
        let cell = Arc::new(OnceCell::new_with(Some(slot)));
        self.insert(&mut entries, path, cell);
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.slots.clear();
        entries.order.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    fn slot_for(&self, path: &str) -> Arc<OnceCell<IconSlot>> {
        let mut entries = self.lock();
        if let Some(cell) = entries.slots.get(path) {
            return cell.clone();
        }
        let cell = Arc::new(OnceCell::new());
        self.insert(&mut entries, path, cell.clone());
        cell
    }

    fn insert(&self, entries: &mut Entries, path: &str, cell: Arc<OnceCell<IconSlot>>) {
        while entries.slots.len() >= self.capacity {
            // Oldest resolved entry goes; in-flight cells are never dropped.
            let Some(victim) = entries
                .order
                .iter()
                .position(|p| entries.slots.get(p).is_some_and(|c| c.initialized()))
            else {
                break;
            };
            if let Some(evicted) = entries.order.remove(victim) {
                entries.slots.remove(&evicted);
            }
        }
        entries.slots.insert(path.to_string(), cell);
        entries.order.push_back(path.to_string());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Entries> {
        // A poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for IconCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

/// Decides which entries go through the cache and which use static glyphs.
#[derive(Debug, Clone)]
pub struct IconPolicy {
    icon_bearing: Vec<String>,
}

impl IconPolicy {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            icon_bearing: types
                .into_iter()
                .map(|t| t.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn is_icon_bearing(&self, entry: &FileEntry) -> bool {
        !entry.is_dir
            && entry
                .file_type
                .as_deref()
                .is_some_and(|t| self.icon_bearing.iter().any(|b| b.eq_ignore_ascii_case(t)))
    }
}

impl Default for IconPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ICON_BEARING)
    }
}

/// Glyph for an entry without an extracted icon: by exact file name first,
/// then by type, then generic.
pub fn static_glyph(entry: &FileEntry) -> &'static str {
    if entry.is_dir {
        return "\u{f07b} ";
    }
    if let Some(glyph) = glyph_by_name(&entry.name().to_ascii_lowercase()) {
        return glyph;
    }
    entry
        .file_type
        .as_deref()
        .and_then(|t| glyph_by_type(&t.to_ascii_lowercase()))
        .unwrap_or("\u{f15b} ")
}

fn glyph_by_name(name: &str) -> Option<&'static str> {
    Some(match name {
        "cargo.toml" | "cargo.lock" => "\u{e7a8} ",
        "dockerfile" => "\u{f308} ",
        "makefile" => "\u{e779} ",
        ".gitignore" | ".gitattributes" | ".gitmodules" => "\u{f1d3} ",
        "license" | "license.md" => "\u{f718} ",
        "readme.md" | "readme" => "\u{f48a} ",
        _ => return None,
    })
}

fn glyph_by_type(file_type: &str) -> Option<&'static str> {
    Some(match file_type {
        "rs" => "\u{e7a8} ",
        "py" => "\u{e606} ",
        "js" | "mjs" | "jsx" => "\u{e74e} ",
        "ts" | "tsx" => "\u{e628} ",
        "html" | "htm" => "\u{e736} ",
        "css" | "scss" => "\u{e749} ",
        "json" | "toml" | "yaml" | "yml" | "ini" => "\u{e615} ",
        "md" | "txt" | "rst" => "\u{f48a} ",
        "sh" | "bash" | "zsh" | "ps1" => "\u{f489} ",
        "png" | "jpg" | "jpeg" | "gif" | "svg" | "ico" | "webp" => "\u{f1c5} ",
        "mp3" | "wav" | "flac" | "ogg" => "\u{f1c7} ",
        "mp4" | "mkv" | "mov" | "webm" => "\u{f1c8} ",
        "zip" | "tar" | "gz" | "xz" | "7z" | "rar" => "\u{f1c6} ",
        "pdf" => "\u{f1c1} ",
        "exe" | "msi" | "app" | "appimage" | "bat" | "cmd" | "com" => "\u{f489} ",
        "lnk" => "\u{f0c1} ",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::{dir, file, ScriptedHost};
    use std::time::Duration;

    #[tokio::test]
    async fn second_resolve_hits_cache() {
        let host = ScriptedHost::new().icon("/bin/tool.exe", Some(vec![1, 2, 3]));
        let cache = IconCache::default();

        let first = cache.resolve(&host, "/bin/tool.exe").await;
        let second = cache.resolve(&host, "/bin/tool.exe").await;

        assert_eq!(first, IconSlot::Icon("AQID".into()));
        assert_eq!(first, second);
        assert_eq!(host.calls("icon", "/bin/tool.exe"), 1);
    }

    #[tokio::test]
    async fn no_icon_is_terminal() {
        let host = ScriptedHost::new().icon("/bin/plain.exe", None);
        let cache = IconCache::default();

        assert_eq!(cache.resolve(&host, "/bin/plain.exe").await, IconSlot::NoIcon);
        assert_eq!(cache.resolve(&host, "/bin/plain.exe").await, IconSlot::NoIcon);
        assert_eq!(host.calls("icon", "/bin/plain.exe"), 1);
    }

    #[tokio::test]
    async fn failed_extraction_is_stored_as_no_icon() {
        let host = ScriptedHost::new().icon_err("/bin/broken.exe");
        let cache = IconCache::default();

        for _ in 0..3 {
            assert_eq!(cache.resolve(&host, "/bin/broken.exe").await, IconSlot::NoIcon);
        }
        assert_eq!(cache.get("/bin/broken.exe"), Some(IconSlot::NoIcon));
        assert_eq!(host.calls("icon", "/bin/broken.exe"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_resolves_share_one_extraction() {
        let host = ScriptedHost::new()
            .icon("/bin/slow.exe", Some(vec![9]))
            .icon_delay(Duration::from_millis(50));
        let cache = IconCache::default();

        let (a, b, c) = tokio::join!(
            cache.resolve(&host, "/bin/slow.exe"),
            cache.resolve(&host, "/bin/slow.exe"),
            cache.resolve(&host, "/bin/slow.exe"),
        );

        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(host.calls("icon", "/bin/slow.exe"), 1);
    }

    #[tokio::test]
    async fn different_paths_resolve_independently() {
        let host = ScriptedHost::new()
            .icon("/a.exe", Some(vec![1]))
            .icon("/b.exe", None);
        let cache = IconCache::default();

        cache.resolve(&host, "/a.exe").await;
        cache.resolve(&host, "/b.exe").await;
        assert_eq!(cache.len(), 2);
        assert_eq!(host.calls("icon", "/a.exe"), 1);
        assert_eq!(host.calls("icon", "/b.exe"), 1);
    }

    #[tokio::test]
    async fn put_value_skips_extraction() {
        let host = ScriptedHost::new().icon("/a.exe", Some(vec![1]));
        let cache = IconCache::default();
        cache.put("/a.exe", IconSlot::NoIcon);

        assert_eq!(cache.resolve(&host, "/a.exe").await, IconSlot::NoIcon);
        assert_eq!(host.calls("icon", "/a.exe"), 0);
    }

    #[tokio::test]
    async fn clear_forgets_everything() {
        let host = ScriptedHost::new().icon("/a.exe", Some(vec![1]));
        let cache = IconCache::default();
        cache.resolve(&host, "/a.exe").await;
        cache.clear();

        assert_eq!(cache.get("/a.exe"), None);
        assert!(!cache.is_tracked("/a.exe"));
        cache.resolve(&host, "/a.exe").await;
        assert_eq!(host.calls("icon", "/a.exe"), 2);
    }

    #[test]
    fn capacity_evicts_oldest_resolved() {
        let cache = IconCache::new(2);
        cache.put("/1.exe", IconSlot::NoIcon);
        cache.put("/2.exe", IconSlot::NoIcon);
        cache.put("/3.exe", IconSlot::NoIcon);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("/1.exe"), None);
        assert_eq!(cache.get("/3.exe"), Some(IconSlot::NoIcon));
    }

    #[tokio::test(start_paused = true)]
    async fn full_cache_keeps_in_flight_extraction() {
        let host = Arc::new(
            ScriptedHost::new()
                .icon("/a.exe", Some(vec![1]))
                .icon("/b.exe", None)
                .icon_delay(Duration::from_millis(50)),
        );
        let cache = Arc::new(IconCache::new(1));

        let first = tokio::spawn({
            let (host, cache) = (host.clone(), cache.clone());
            async move { cache.resolve(&*host, "/a.exe").await }
        });
        tokio::task::yield_now().await;
        assert!(cache.is_tracked("/a.exe"));
        assert_eq!(cache.get("/a.exe"), None);

        // The only slot is taken by a pending lookup; a second path must not push it out.
        assert_eq!(cache.resolve(&*host, "/b.exe").await, IconSlot::NoIcon);
        assert!(cache.is_tracked("/a.exe"));

        assert_eq!(cache.resolve(&*host, "/a.exe").await, IconSlot::Icon("AQ==".into()));
        assert_eq!(first.await.unwrap(), IconSlot::Icon("AQ==".into()));
        assert_eq!(host.calls("icon", "/a.exe"), 1);
    }

    #[test]
    fn policy_only_matches_icon_bearing_files() {
        let policy = IconPolicy::default();
        assert!(policy.is_icon_bearing(&file("/a/setup.exe", "exe")));
        assert!(policy.is_icon_bearing(&file("/a/Setup.EXE", "EXE")));
        assert!(!policy.is_icon_bearing(&file("/a/notes.txt", "txt")));
        assert!(!policy.is_icon_bearing(&dir("/a/folder.exe")));
    }

    #[test]
    fn static_glyph_prefers_name_over_type() {
        let cargo = file("/p/Cargo.toml", "toml");
        let other = file("/p/settings.toml", "toml");
        assert_eq!(static_glyph(&cargo), "\u{e7a8} ");
        assert_eq!(static_glyph(&other), "\u{e615} ");
        assert_eq!(static_glyph(&file("/p/x.unknown", "unknown")), "\u{f15b} ");
        assert_eq!(static_glyph(&dir("/p")), "\u{f07b} ");
    }
}
