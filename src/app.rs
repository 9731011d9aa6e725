use std::time::Instant;

use tracing::warn;

use crate::clipboard::ClipboardSink;
use crate::nav::controller::{NavEvent, NavigationController};
use crate::nav::layout::{LayoutPersistence, PaneGroup};
use crate::nav::path::{Crumb, CrumbTarget};
use crate::nav::tree::Affordance;

/// Which region receives navigation keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    #[default]
    Files,
    Breadcrumb,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Sidebar => Focus::Files,
            Focus::Files => Focus::Breadcrumb,
            Focus::Breadcrumb => Focus::Sidebar,
        }
    }
}

/// Open menu listing the segments of a collapsed breadcrumb group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrumbMenu {
    pub hidden: Vec<CrumbTarget>,
    pub selected: usize,
}

/// Main application state.
pub struct App {
    pub nav: NavigationController,
    pub panes: PaneGroup,
    pub persistence: LayoutPersistence,
    pub clipboard: Box<dyn ClipboardSink>,
    pub focus: Focus,
    pub crumb_index: usize,
    pub crumb_menu: Option<CrumbMenu>,
    pub resize_step: f64,
    pub should_quit: bool,
    /// Message, error flag and when it was set.
    pub status_message: Option<(String, bool, Instant)>,
}

impl App {
    pub fn new(
        nav: NavigationController,
        panes: PaneGroup,
        persistence: LayoutPersistence,
        clipboard: Box<dyn ClipboardSink>,
        resize_step: f64,
    ) -> Self {
        Self {
            nav,
            panes,
            persistence,
            clipboard,
            focus: Focus::default(),
            crumb_index: 0,
            crumb_menu: None,
            resize_step,
            should_quit: false,
            status_message: None,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn cycle_focus(&mut self) {
        self.crumb_menu = None;
        self.focus = self.focus.next();
        if self.focus == Focus::Breadcrumb {
            self.crumb_index = self.nav.breadcrumb().len().saturating_sub(1);
        }
    }

    pub fn set_status_message(&mut self, msg: String, is_error: bool) {
        self.status_message = Some((msg, is_error, Instant::now()));
    }

    /// Clear the status message after it has been shown for 3 seconds.
    pub fn clear_expired_status(&mut self) {
        if let Some((_, _, ref created)) = self.status_message {
            if created.elapsed().as_secs() > 3 {
                self.status_message = None;
            }
        }
    }

    /// Route a host result to the controller.
    pub fn handle_nav(&mut self, event: NavEvent) {
        if let Some(notice) = self.nav.handle(event) {
            self.set_status_message(notice.text, notice.is_error);
        }
        let crumbs = self.nav.breadcrumb().len();
        if self.crumb_index >= crumbs {
            self.crumb_index = crumbs.saturating_sub(1);
        }
    }

    pub fn select_next(&mut self) {
        if let Some(menu) = self.crumb_menu.as_mut() {
            if menu.selected + 1 < menu.hidden.len() {
                menu.selected += 1;
            }
            return;
        }
        match self.focus {
            Focus::Sidebar => self.nav.sidebar.select_next(),
            Focus::Files => self.nav.select_next(),
            Focus::Breadcrumb => {
                if self.crumb_index + 1 < self.nav.breadcrumb().len() {
                    self.crumb_index += 1;
                }
            }
        }
    }

    pub fn select_previous(&mut self) {
        if let Some(menu) = self.crumb_menu.as_mut() {
            menu.selected = menu.selected.saturating_sub(1);
            return;
        }
        match self.focus {
            Focus::Sidebar => self.nav.sidebar.select_previous(),
            Focus::Files => self.nav.select_previous(),
            Focus::Breadcrumb => self.crumb_index = self.crumb_index.saturating_sub(1),
        }
    }

    pub fn select_first(&mut self) {
        match self.focus {
            Focus::Sidebar => self.nav.sidebar.select_first(),
            Focus::Files => self.nav.select_first(),
            Focus::Breadcrumb => self.crumb_index = 0,
        }
    }

    pub fn select_last(&mut self) {
        match self.focus {
            Focus::Sidebar => self.nav.sidebar.select_last(),
            Focus::Files => self.nav.select_last(),
            Focus::Breadcrumb => {
                self.crumb_index = self.nav.breadcrumb().len().saturating_sub(1);
            }
        }
    }

    /// Enter: open whatever is selected in the focused region.
    pub fn activate(&mut self) {
        if let Some(menu) = self.crumb_menu.take() {
            if let Some(target) = menu.hidden.get(menu.selected) {
                self.nav.navigate(&target.target);
            }
            return;
        }
        match self.focus {
            Focus::Sidebar => self.nav.open_sidebar_selected(),
            Focus::Files => {
                if let Some(entry) = self.nav.selected_entry().cloned() {
                    self.nav.open_entry(&entry);
                }
            }
            Focus::Breadcrumb => match self.nav.breadcrumb().get(self.crumb_index) {
                Some(Crumb::Visible { target, current, .. }) if !current => {
                    let target = target.clone();
                    self.nav.navigate(&target);
                }
                Some(Crumb::Collapsed { hidden }) => {
                    self.crumb_menu = Some(CrumbMenu {
                        hidden: hidden.clone(),
                        selected: 0,
                    });
                }
                _ => {}
            },
        }
    }

    /// Space: expand or collapse the selected sidebar node.
    pub fn toggle_selected(&mut self) {
        if self.focus == Focus::Sidebar {
            self.nav.toggle_sidebar_selected();
        }
    }

    /// Right: open a collapsed sidebar node.
    pub fn expand_selected(&mut self) {
        if self.focus == Focus::Sidebar
            && self.nav.sidebar.selected_affordance() == Some(Affordance::Collapsed)
        {
            self.nav.toggle_sidebar_selected();
        }
    }

    /// Left: close an open sidebar node.
    pub fn collapse_selected(&mut self) {
        if self.focus == Focus::Sidebar
            && self.nav.sidebar.selected_affordance() == Some(Affordance::Expanded)
        {
            self.nav.toggle_sidebar_selected();
        }
    }

    pub fn go_up(&mut self) {
        self.crumb_menu = None;
        self.nav.go_up();
    }

    pub fn refresh(&mut self) {
        self.crumb_menu = None;
        self.nav.refresh();
    }

    pub fn close_menu(&mut self) {
        self.crumb_menu = None;
    }

    /// Path acted on by "open with default", "open in editor" and "copy path".
    fn selected_path(&self) -> Option<String> {
        match self.focus {
            Focus::Sidebar => self.nav.sidebar.selected_path().map(str::to_string),
            Focus::Files => self.nav.selected_entry().map(|e| e.path.clone()),
            Focus::Breadcrumb => Some(self.nav.route().as_host_path()),
        }
    }

    pub fn open_with_system_default(&mut self) {
        if let Some(path) = self.selected_path() {
            self.nav.open_with_system_default(&path);
        }
    }

    pub fn open_in_editor(&mut self) {
        if let Some(path) = self.selected_path() {
            self.nav.open_in_editor(&path);
        }
    }

    /// Put the selected path on the clipboard and report the outcome.
    pub fn copy_path(&mut self) {
        let Some(path) = self.selected_path() else {
            return;
        };
        match self.clipboard.set_text(&path) {
            Ok(()) => self.set_status_message(format!("Copied {path}"), false),
            Err(e) => {
                warn!(%path, error = %e, "copy to clipboard failed");
                self.set_status_message(format!("Copy failed: {e}"), true);
            }
        }
    }

    /// Move the divider by `steps` resize steps and schedule a save.
    pub fn resize_sidebar(&mut self, steps: f64) {
        if let Some(layout) = self.panes.resize_sidebar(steps * self.resize_step) {
            self.persistence.schedule_save(layout);
        }
    }

    /// Write any layout change still waiting for its quiet period.
    pub async fn shutdown(&mut self) {
        self.persistence.flush(self.panes.layout()).await;
    }
}
