//! Two-pane proportions: restored once at startup, written back with a
//! trailing debounce while the user resizes.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::store::KeyValueStore;

/// Store key holding the proportions.
pub const LAYOUT_KEY: &str = "layout";

/// Default quiet period before a resize is written.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Sidebar / content split, in percent. Always sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaneLayout([f64; 2]);

impl PaneLayout {
    /// Split with the sidebar at `sidebar` percent, clamped to `0..=100`.
    pub fn with_sidebar(sidebar: f64) -> Self {
        let sidebar = sidebar.clamp(0.0, 100.0);
        PaneLayout([sidebar, 100.0 - sidebar])
    }

    pub fn sidebar(&self) -> f64 {
        self.0[0]
    }

    pub fn content(&self) -> f64 {
        self.0[1]
    }

    /// Stored data is only trusted if it is finite, non-negative and adds
    /// up to 100.
    fn is_valid(&self) -> bool {
        self.0.iter().all(|v| v.is_finite() && *v >= 0.0)
            && (self.0[0] + self.0[1] - 100.0).abs() < 0.5
    }
}

impl Default for PaneLayout {
    fn default() -> Self {
        PaneLayout([20.0, 80.0])
    }
}

/// The resizable pane group as the shell sees it.
///
/// The restored layout may be applied exactly once; until then the group is
/// uninitialized and the shell draws no panes.
#[derive(Debug, Clone)]
pub struct PaneGroup {
    layout: Option<PaneLayout>,
    min_sidebar: f64,
}

impl PaneGroup {
    pub fn new(min_sidebar: f64) -> Self {
        Self {
            layout: None,
            min_sidebar,
        }
    }

    /// Apply the restored layout. Returns `false` (and changes nothing) if a
    /// layout was already applied.
    pub fn apply_initial(&mut self, layout: PaneLayout) -> bool {
        if self.layout.is_some() {
            warn!("ignoring second initial layout");
            return false;
        }
        self.layout = Some(self.clamped(layout));
        true
    }

    pub fn layout(&self) -> Option<PaneLayout> {
        self.layout
    }

    /// User-driven resize by `delta` percent. Returns the new layout for the
    /// layout-change sink, or `None` if nothing moved.
    pub fn resize_sidebar(&mut self, delta: f64) -> Option<PaneLayout> {
        let current = self.layout?;
        let next = self.clamped(PaneLayout::with_sidebar(current.sidebar() + delta));
        if next == current {
            return None;
        }
        self.layout = Some(next);
        Some(next)
    }

    fn clamped(&self, layout: PaneLayout) -> PaneLayout {
        // Both panes keep at least the minimum.
        let min = self.min_sidebar.clamp(0.0, 50.0);
        PaneLayout::with_sidebar(layout.sidebar().clamp(min, 100.0 - min))
    }
}

/// Reads the stored layout and writes changes back, debounced.
pub struct LayoutPersistence {
    store: Arc<dyn KeyValueStore>,
    debounce: Duration,
    fallback: PaneLayout,
    pending: Option<JoinHandle<()>>,
}

impl LayoutPersistence {
    pub fn new(store: Arc<dyn KeyValueStore>, debounce: Duration, fallback: PaneLayout) -> Self {
        Self {
            store,
            debounce,
            fallback,
            pending: None,
        }
    }

    /// Stored layout, or the fallback when absent, unreadable or invalid.
    pub async fn restore(&self) -> PaneLayout {
        let value = match self.store.get(LAYOUT_KEY).await {
            Ok(Some(value)) => value,
            Ok(None) => return self.fallback,
            Err(e) => {
                warn!(error = %e, "failed to read stored layout");
                return self.fallback;
            }
        };
        match serde_json::from_value::<PaneLayout>(value) {
            Ok(layout) if layout.is_valid() => {
                debug!(?layout, "restored layout");
                layout
            }
            _ => {
                warn!("stored layout is malformed, using default");
                self.fallback
            }
        }
    }

    /// Layout-change sink. Cancels any pending write and schedules this one
    /// after the quiet period.
    pub fn schedule_save(&mut self, layout: PaneLayout) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        let store = self.store.clone();
        let debounce = self.debounce;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            write_layout(store.as_ref(), layout).await;
        }));
    }

    /// Whether a write is still waiting for its quiet period.
    #[cfg(test)]
    pub fn has_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Write any pending layout immediately (used on shutdown).
    pub async fn flush(&mut self, current: Option<PaneLayout>) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if pending.is_finished() {
            return;
        }
        pending.abort();
        if let Some(layout) = current {
            write_layout(self.store.as_ref(), layout).await;
        }
    }
}

async fn write_layout(store: &dyn KeyValueStore, layout: PaneLayout) {
    let value = match serde_json::to_value(layout) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "failed to encode layout");
            return;
        }
    };
    let result = match store.set(LAYOUT_KEY, value).await {
        Ok(()) => store.save().await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => info!(?layout, "layout saved"),
        Err(e) => warn!(error = %e, "failed to persist layout"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DEBOUNCE: Duration = Duration::from_millis(DEFAULT_DEBOUNCE_MS);

    /// Store whose writes always fail.
    #[derive(Default)]
    struct BrokenStore {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: Value) -> Result<(), StoreError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }

        async fn save(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    async fn stored(store: &MemoryStore) -> Option<Value> {
        store.get(LAYOUT_KEY).await.unwrap()
    }

    #[tokio::test]
    async fn restore_defaults_when_absent() {
        let store = Arc::new(MemoryStore::new());
        let persistence = LayoutPersistence::new(store, DEBOUNCE, PaneLayout::default());
        assert_eq!(persistence.restore().await, PaneLayout::with_sidebar(20.0));
    }

    #[tokio::test]
    async fn restore_reads_stored_layout() {
        let store = Arc::new(MemoryStore::new());
        store.set(LAYOUT_KEY, json!([35.0, 65.0])).await.unwrap();
        let persistence = LayoutPersistence::new(store, DEBOUNCE, PaneLayout::default());
        assert_eq!(persistence.restore().await, PaneLayout::with_sidebar(35.0));
    }

    #[tokio::test]
    async fn restore_rejects_malformed_layouts() {
        for bad in [json!([10.0, 10.0]), json!([1, 2, 3]), json!("wide"), json!([-5.0, 105.0])] {
            let store = Arc::new(MemoryStore::new());
            store.set(LAYOUT_KEY, bad).await.unwrap();
            let persistence = LayoutPersistence::new(store, DEBOUNCE, PaneLayout::default());
            assert_eq!(persistence.restore().await, PaneLayout::default());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_resizes_persists_only_the_last() {
        let store = Arc::new(MemoryStore::new());
        let mut persistence = LayoutPersistence::new(store.clone(), DEBOUNCE, PaneLayout::default());

        persistence.schedule_save(PaneLayout::with_sidebar(30.0));
        tokio::time::sleep(Duration::from_millis(100)).await;
        persistence.schedule_save(PaneLayout::with_sidebar(25.0));

        // First window would have ended here; nothing may be written yet.
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(stored(&store).await, None);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(stored(&store).await, Some(json!([25.0, 75.0])));
        assert!(!persistence.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn separate_resizes_each_persist() {
        let store = Arc::new(MemoryStore::new());
        let mut persistence = LayoutPersistence::new(store.clone(), DEBOUNCE, PaneLayout::default());

        persistence.schedule_save(PaneLayout::with_sidebar(30.0));
        tokio::time::sleep(DEBOUNCE * 2).await;
        assert_eq!(stored(&store).await, Some(json!([30.0, 70.0])));

        persistence.schedule_save(PaneLayout::with_sidebar(40.0));
        tokio::time::sleep(DEBOUNCE * 2).await;
        assert_eq!(stored(&store).await, Some(json!([40.0, 60.0])));
    }

    #[tokio::test(start_paused = true)]
    async fn write_failures_are_swallowed() {
        let store = Arc::new(BrokenStore::default());
        let mut persistence = LayoutPersistence::new(store.clone(), DEBOUNCE, PaneLayout::default());

        persistence.schedule_save(PaneLayout::with_sidebar(30.0));
        tokio::time::sleep(DEBOUNCE * 2).await;
        assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
        assert!(!persistence.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn flush_writes_pending_layout_immediately() {
        let store = Arc::new(MemoryStore::new());
        let mut persistence = LayoutPersistence::new(store.clone(), DEBOUNCE, PaneLayout::default());

        persistence.schedule_save(PaneLayout::with_sidebar(45.0));
        persistence.flush(Some(PaneLayout::with_sidebar(45.0))).await;
        assert_eq!(stored(&store).await, Some(json!([45.0, 55.0])));
    }

    #[test]
    fn initial_layout_applies_once() {
        let mut group = PaneGroup::new(20.0);
        assert_eq!(group.layout(), None);
        assert!(group.apply_initial(PaneLayout::with_sidebar(30.0)));
        assert!(!group.apply_initial(PaneLayout::with_sidebar(50.0)));
        assert_eq!(group.layout(), Some(PaneLayout::with_sidebar(30.0)));
    }

    #[test]
    fn resize_before_initial_layout_is_ignored() {
        let mut group = PaneGroup::new(20.0);
        assert_eq!(group.resize_sidebar(5.0), None);
    }

    #[test]
    fn resize_respects_minimum_sidebar() {
        let mut group = PaneGroup::new(20.0);
        group.apply_initial(PaneLayout::with_sidebar(25.0));
        assert_eq!(group.resize_sidebar(-5.0), Some(PaneLayout::with_sidebar(20.0)));
        assert_eq!(group.resize_sidebar(-5.0), None);
        assert_eq!(group.resize_sidebar(10.0), Some(PaneLayout::with_sidebar(30.0)));
    }

    #[test]
    fn layout_serializes_as_array() {
        let value = serde_json::to_value(PaneLayout::with_sidebar(25.0)).unwrap();
        assert_eq!(value, json!([25.0, 75.0]));
    }
}
