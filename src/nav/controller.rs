//! Route-driven orchestration: the current directory, its listing, the
//! sidebar tree and icon requests. Host calls run in spawned tasks and come
//! back as [`NavEvent`]s through the application event channel.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::error::HostError;
use crate::event::Event;
use crate::host::{FileEntry, Host};
use crate::nav::icons::{static_glyph, IconCache, IconPolicy, IconSlot};
use crate::nav::path::{collapse, Breadcrumb, RoutePath};
use crate::nav::tree::{SidebarTree, TreeRequest, TreeResult};

/// Host results delivered back to the controller.
#[derive(Debug)]
pub enum NavEvent {
    DesktopResolved(Result<String, HostError>),
    VolumesListed(Result<Vec<String>, HostError>),
    Listed {
        generation: u64,
        path: String,
        result: Result<Vec<FileEntry>, HostError>,
    },
    Tree(TreeResult),
    IconResolved {
        path: String,
    },
    Launched {
        path: String,
        result: Result<(), HostError>,
    },
}

/// Contents of the active directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Pending,
    Loaded(Vec<FileEntry>),
    /// Shown as an empty directory.
    Failed(HostError),
}

impl Listing {
    pub fn entries(&self) -> &[FileEntry] {
        match self {
            Listing::Loaded(entries) => entries,
            Listing::Pending | Listing::Failed(_) => &[],
        }
    }
}

/// How an entry's icon should be drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconView {
    /// The host extracted an image for this file.
    Extracted,
    Glyph(&'static str),
}

/// One-line feedback for the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

impl Notice {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NavOptions {
    pub collapse_threshold: usize,
    pub editor: String,
}

pub struct NavigationController {
    host: Arc<dyn Host>,
    icons: Arc<IconCache>,
    policy: IconPolicy,
    tx: UnboundedSender<Event>,
    options: NavOptions,
    route: RoutePath,
    /// Bumped on every navigation; listings from older routes are dropped.
    generation: u64,
    listing: Listing,
    pub sidebar: SidebarTree,
    pub selected_index: usize,
    pub scroll_offset: usize,
}

impl NavigationController {
    pub fn new(
        host: Arc<dyn Host>,
        icons: Arc<IconCache>,
        policy: IconPolicy,
        tx: UnboundedSender<Event>,
        options: NavOptions,
    ) -> Self {
        Self {
            host,
            icons,
            policy,
            tx,
            options,
            route: RoutePath::default(),
            generation: 0,
            listing: Listing::Pending,
            sidebar: SidebarTree::new(),
            selected_index: 0,
            scroll_offset: 0,
        }
    }

    pub fn route(&self) -> &RoutePath {
        &self.route
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn breadcrumb(&self) -> Breadcrumb {
        collapse(&self.route, self.options.collapse_threshold)
    }

    /// Make `path` the current directory. An empty path resolves to the
    /// desktop directory first.
    pub fn navigate(&mut self, path: &str) {
        let route = RoutePath::parse(path);
        if route.is_empty() {
            let host = self.host.clone();
            self.spawn(async move { NavEvent::DesktopResolved(host.desktop_root_path().await) });
            return;
        }

        self.route = route;
        self.generation += 1;
        self.listing = Listing::Pending;
        self.selected_index = 0;
        self.scroll_offset = 0;

        let host = self.host.clone();
        let generation = self.generation;
        let path = self.route.as_host_path();
        info!(%path, "navigating");
        self.spawn(async move {
            let result = host.list_directory(&path).await;
            NavEvent::Listed {
                generation,
                path,
                result,
            }
        });
    }

    pub fn go_up(&mut self) {
        let parent = self.route.parent();
        if parent != self.route && !parent.is_empty() {
            self.navigate(&parent.as_host_path());
        }
    }

    /// List the current directory again and drop every memoized icon, so
    /// files replaced on disk get extracted anew.
    pub fn refresh(&mut self) {
        if self.route.is_empty() {
            return;
        }
        self.icons.clear();
        let path = self.route.as_host_path();
        self.navigate(&path);
    }

    /// Ask the host for the volume roots shown in the sidebar.
    pub fn mount_sidebar(&mut self) {
        let host = self.host.clone();
        self.spawn(async move { NavEvent::VolumesListed(host.list_volume_roots().await) });
    }

    pub fn toggle_sidebar_selected(&mut self) {
        if let Some(request) = self.sidebar.toggle_selected() {
            self.run_tree(vec![request]);
        }
    }

    /// Navigate to the directory selected in the sidebar.
    pub fn open_sidebar_selected(&mut self) {
        if let Some(path) = self.sidebar.selected_path().map(str::to_string) {
            self.navigate(&path);
        }
    }

    pub fn selected_entry(&self) -> Option<&FileEntry> {
        self.listing.entries().get(self.selected_index)
    }

    /// Directories are entered; files are handed to the system opener.
    pub fn open_entry(&mut self, entry: &FileEntry) {
        if entry.is_dir {
            self.navigate(&entry.path);
        } else {
            self.open_with_system_default(&entry.path);
        }
    }

    pub fn open_with_system_default(&self, path: &str) {
        let host = self.host.clone();
        let path = path.to_string();
        self.spawn(async move {
            let result = host.open_with_system_default(&path).await;
            NavEvent::Launched { path, result }
        });
    }

    pub fn open_in_editor(&self, path: &str) {
        let host = self.host.clone();
        let path = path.to_string();
        let editor = self.options.editor.clone();
        self.spawn(async move {
            let result = host.open_in_external_editor(&path, &editor).await;
            NavEvent::Launched { path, result }
        });
    }

    /// Icon to draw for `entry` right now.
    pub fn icon_for(&self, entry: &FileEntry) -> IconView {
        if self.policy.is_icon_bearing(entry) {
            if let Some(IconSlot::Icon(_)) = self.icons.get(&entry.path) {
                return IconView::Extracted;
            }
        }
        IconView::Glyph(static_glyph(entry))
    }

    /// Apply a host result. Returns a notice for the status bar, if any.
    pub fn handle(&mut self, event: NavEvent) -> Option<Notice> {
        match event {
            NavEvent::DesktopResolved(Ok(path)) => {
                self.navigate(&path);
                None
            }
            NavEvent::DesktopResolved(Err(e)) => {
                warn!(error = %e, "no desktop directory to start from");
                self.listing = Listing::Failed(e.clone());
                Some(Notice::error(format!("No start directory: {e}")))
            }
            NavEvent::VolumesListed(Ok(roots)) => {
                let probes = self.sidebar.mount_roots(roots);
                self.run_tree(probes);
                None
            }
            NavEvent::VolumesListed(Err(e)) => {
                warn!(error = %e, "failed to list volume roots");
                Some(Notice::error(format!("Volumes unavailable: {e}")))
            }
            NavEvent::Listed {
                generation,
                path,
                result,
            } => self.apply_listing(generation, path, result),
            NavEvent::Tree(result) => {
                let follow_up = self.sidebar.apply(result);
                self.run_tree(follow_up);
                None
            }
            NavEvent::IconResolved { path } => {
                debug!(%path, "icon ready");
                None
            }
            NavEvent::Launched { path, result } => match result {
                Ok(()) => Some(Notice::info(format!("Opened {path}"))),
                Err(e) => {
                    warn!(%path, error = %e, "launch failed");
                    Some(Notice::error(format!("Could not open {path}: {e}")))
                }
            },
        }
    }

    fn apply_listing(
        &mut self,
        generation: u64,
        path: String,
        result: Result<Vec<FileEntry>, HostError>,
    ) -> Option<Notice> {
        if generation != self.generation {
            debug!(%path, "dropping listing for a previous route");
            return None;
        }
        match result {
            Ok(mut entries) => {
                entries.sort_by_key(|e| !e.is_dir);
                for entry in entries.iter().filter(|e| self.policy.is_icon_bearing(e)) {
                    self.request_icon(&entry.path);
                }
                self.listing = Listing::Loaded(entries);
                None
            }
            Err(e) => {
                warn!(%path, error = %e, "listing failed");
                let notice = Notice::error(format!("Cannot list {path}: {e}"));
                self.listing = Listing::Failed(e);
                Some(notice)
            }
        }
    }

    fn request_icon(&self, path: &str) {
        if self.icons.is_tracked(path) {
            return;
        }
        let host = self.host.clone();
        let icons = self.icons.clone();
        let path = path.to_string();
        self.spawn(async move {
            icons.resolve(host.as_ref(), &path).await;
            NavEvent::IconResolved { path }
        });
    }

    fn run_tree(&self, requests: Vec<TreeRequest>) {
        for request in requests {
            let host = self.host.clone();
            self.spawn(async move { NavEvent::Tree(request.execute(host.as_ref()).await) });
        }
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = NavEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            // The receiver only goes away on shutdown.
            let _ = tx.send(Event::Nav(task.await));
        });
    }

    pub fn select_next(&mut self) {
        let len = self.listing.entries().len();
        if len > 0 && self.selected_index < len - 1 {
            self.selected_index += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.listing.entries().len().saturating_sub(1);
    }

    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected_index - visible_height + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::{dir, file, ScriptedHost};
    use crate::nav::path::Crumb;
    use crate::nav::tree::{Affordance, RowKind};
    use std::time::Duration;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    fn controller(host: ScriptedHost) -> (NavigationController, UnboundedReceiver<Event>, Arc<ScriptedHost>) {
        let host = Arc::new(host);
        let (tx, rx) = unbounded_channel();
        let ctrl = NavigationController::new(
            host.clone(),
            Arc::new(IconCache::default()),
            IconPolicy::default(),
            tx,
            NavOptions {
                collapse_threshold: 7,
                editor: "code".into(),
            },
        );
        (ctrl, rx, host)
    }

    /// Feed events back until nothing arrives for a while.
    async fn settle(ctrl: &mut NavigationController, rx: &mut UnboundedReceiver<Event>) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Ok(Some(event)) = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await {
            if let Event::Nav(nav) = event {
                notices.extend(ctrl.handle(nav));
            }
        }
        notices
    }

    fn home_host() -> ScriptedHost {
        ScriptedHost::new().desktop("/home/me/Desktop").listing(
            "/home/me/Desktop",
            vec![
                file("/home/me/Desktop/setup.exe", "exe"),
                dir("/home/me/Desktop/projects"),
                file("/home/me/Desktop/todo.txt", "txt"),
            ],
        )
    }

    #[tokio::test(start_paused = true)]
    async fn empty_route_redirects_to_desktop() {
        let (mut ctrl, mut rx, _) = controller(home_host());
        ctrl.navigate("");
        settle(&mut ctrl, &mut rx).await;

        assert_eq!(ctrl.route().as_host_path(), "/home/me/Desktop");
        let names: Vec<&str> = ctrl.listing().entries().iter().map(|e| e.name()).collect();
        assert_eq!(names, ["projects", "setup.exe", "todo.txt"]);
    }

    #[tokio::test(start_paused = true)]
    async fn breadcrumb_follows_route() {
        let (mut ctrl, mut rx, _) = controller(home_host());
        ctrl.navigate("/home/me/Desktop");
        settle(&mut ctrl, &mut rx).await;

        let crumbs = ctrl.breadcrumb();
        let labels: Vec<&str> = crumbs.iter().map(Crumb::label).collect();
        assert_eq!(labels, ["home", "me", "Desktop"]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_listing_shows_empty_and_reports() {
        let (mut ctrl, mut rx, _) = controller(ScriptedHost::new());
        ctrl.navigate("/gone");
        let notices = settle(&mut ctrl, &mut rx).await;

        assert!(matches!(ctrl.listing(), Listing::Failed(HostError::NotFound(_))));
        assert!(ctrl.listing().entries().is_empty());
        assert_eq!(notices.len(), 1);
        assert!(notices[0].is_error);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_listing_is_ignored() {
        let host = ScriptedHost::new()
            .listing("/a", vec![dir("/a/old")])
            .listing("/b", vec![dir("/b/new")]);
        let (mut ctrl, mut rx, _) = controller(host);
        ctrl.navigate("/a");
        ctrl.navigate("/b");
        settle(&mut ctrl, &mut rx).await;

        assert_eq!(ctrl.route().as_host_path(), "/b");
        assert_eq!(ctrl.listing().entries(), &[dir("/b/new")]);
    }

    #[tokio::test(start_paused = true)]
    async fn go_up_lists_parent() {
        let host = ScriptedHost::new()
            .listing("/a/b", vec![])
            .listing("/a", vec![dir("/a/b")]);
        let (mut ctrl, mut rx, host) = controller(host);
        ctrl.navigate("/a/b");
        settle(&mut ctrl, &mut rx).await;
        ctrl.go_up();
        settle(&mut ctrl, &mut rx).await;

        assert_eq!(ctrl.route().as_host_path(), "/a");
        assert_eq!(host.calls("list", "/a"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn icons_requested_once_for_icon_bearing_files() {
        let host = home_host().icon("/home/me/Desktop/setup.exe", Some(vec![7]));
        let (mut ctrl, mut rx, host) = controller(host);
        ctrl.navigate("/home/me/Desktop");
        settle(&mut ctrl, &mut rx).await;
        ctrl.navigate("/home/me/Desktop");
        settle(&mut ctrl, &mut rx).await;

        assert_eq!(host.calls("icon", "/home/me/Desktop/setup.exe"), 1);
        assert_eq!(host.calls("icon", "/home/me/Desktop/todo.txt"), 0);

        let entries = ctrl.listing().entries().to_vec();
        assert_eq!(ctrl.icon_for(&entries[1]), IconView::Extracted);
        assert!(matches!(ctrl.icon_for(&entries[2]), IconView::Glyph(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn sidebar_mounts_volumes_and_probes() {
        let host = ScriptedHost::new()
            .volumes(&["/", "/mnt/data"])
            .probe("/", true)
            .probe_err("/mnt/data", HostError::AccessDenied("/mnt/data".into()))
            .listing("/", vec![dir("/etc"), file("/vmlinuz", "")]);
        let (mut ctrl, mut rx, host) = controller(host);
        ctrl.mount_sidebar();
        settle(&mut ctrl, &mut rx).await;

        let kinds: Vec<RowKind> = ctrl.sidebar.flat_items.iter().map(|i| i.kind.clone()).collect();
        assert!(matches!(kinds[0], RowKind::Node { affordance: Affordance::Collapsed, .. }));
        assert!(matches!(kinds[1], RowKind::Node { affordance: Affordance::Leaf, .. }));

        ctrl.toggle_sidebar_selected();
        settle(&mut ctrl, &mut rx).await;
        let names: Vec<&str> = ctrl.sidebar.flat_items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["/", "etc", "data"]);
        assert_eq!(host.calls("probe", "/etc"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn opening_a_file_launches_it() {
        let (mut ctrl, mut rx, host) = controller(home_host());
        ctrl.navigate("/home/me/Desktop");
        settle(&mut ctrl, &mut rx).await;

        let exe = ctrl.listing().entries()[1].clone();
        ctrl.open_entry(&exe);
        ctrl.open_in_editor(&exe.path);
        let notices = settle(&mut ctrl, &mut rx).await;

        assert_eq!(host.calls("open", "/home/me/Desktop/setup.exe"), 1);
        assert_eq!(host.calls("editor[code]", "/home/me/Desktop/setup.exe"), 1);
        assert!(notices.iter().all(|n| !n.is_error));
    }

    #[tokio::test(start_paused = true)]
    async fn opening_a_directory_navigates() {
        let host = home_host().listing("/home/me/Desktop/projects", vec![]);
        let (mut ctrl, mut rx, _) = controller(host);
        ctrl.navigate("/home/me/Desktop");
        settle(&mut ctrl, &mut rx).await;

        let projects = ctrl.listing().entries()[0].clone();
        ctrl.open_entry(&projects);
        settle(&mut ctrl, &mut rx).await;
        assert_eq!(ctrl.route().as_host_path(), "/home/me/Desktop/projects");
        assert_eq!(ctrl.listing(), &Listing::Loaded(vec![]));
    }

    #[tokio::test(start_paused = true)]
    async fn selection_resets_on_navigation() {
        let (mut ctrl, mut rx, _) = controller(home_host());
        ctrl.navigate("/home/me/Desktop");
        settle(&mut ctrl, &mut rx).await;
        ctrl.select_last();
        assert_eq!(ctrl.selected_index, 2);
        ctrl.refresh();
        assert_eq!(ctrl.selected_index, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_relists_and_extracts_icons_again() {
        let host = home_host().icon("/home/me/Desktop/setup.exe", Some(vec![7]));
        let (mut ctrl, mut rx, host) = controller(host);
        ctrl.navigate("/home/me/Desktop");
        settle(&mut ctrl, &mut rx).await;
        ctrl.refresh();
        settle(&mut ctrl, &mut rx).await;

        assert_eq!(host.calls("list", "/home/me/Desktop"), 2);
        assert_eq!(host.calls("icon", "/home/me/Desktop/setup.exe"), 2);
        let exe = ctrl.listing().entries()[1].clone();
        assert_eq!(ctrl.icon_for(&exe), IconView::Extracted);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_before_any_route_does_nothing() {
        let (mut ctrl, mut rx, host) = controller(home_host());
        ctrl.refresh();
        settle(&mut ctrl, &mut rx).await;

        assert!(ctrl.route().is_empty());
        assert_eq!(host.calls("desktop", ""), 0);
    }
}
