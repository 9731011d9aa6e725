//! The sidebar's lazy directory tree.
//!
//! Nodes never talk to the host themselves. State transitions hand back
//! [`TreeRequest`]s; the owner runs them (usually in spawned tasks) and feeds
//! the [`TreeResult`]s back in. Results are matched by [`NodeId`], so a result
//! for a node that has since been dropped is ignored.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::error::HostError;
use crate::host::{FileEntry, Host};
use crate::nav::probe::{self, ProbeOutcome};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one node instance. A node recreated for the same path gets a
/// fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Unresolved,
    Resolved(bool),
    Denied,
}

#[derive(Debug)]
pub enum Children {
    NotLoaded,
    Loading,
    Loaded(Vec<TreeNode>),
    /// The listing failed; the node is locked.
    Denied,
}

/// What the row for a node offers the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    /// Probe still outstanding.
    Pending,
    /// Nothing to expand: no subdirectories, or the node is locked.
    Leaf,
    Collapsed,
    Expanded,
}

/// Host work requested by the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeRequest {
    Probe { node: NodeId, path: String },
    List { node: NodeId, path: String },
}

/// Host answer for a [`TreeRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeResult {
    Probed {
        node: NodeId,
        outcome: ProbeOutcome,
    },
    Listed {
        node: NodeId,
        result: Result<Vec<FileEntry>, HostError>,
    },
}

impl TreeRequest {
    pub async fn execute(self, host: &dyn Host) -> TreeResult {
        match self {
            TreeRequest::Probe { node, path } => TreeResult::Probed {
                node,
                outcome: probe::probe(host, &path).await,
            },
            TreeRequest::List { node, path } => TreeResult::Listed {
                node,
                result: host.list_directory(&path).await,
            },
        }
    }
}

/// One directory in the sidebar. Owns its children once they are loaded.
#[derive(Debug)]
pub struct TreeNode {
    id: NodeId,
    entry: FileEntry,
    depth: usize,
    probe: ProbeState,
    children: Children,
    open: bool,
}

impl TreeNode {
    /// Create a node together with the probe it needs.
    pub fn new(entry: FileEntry, depth: usize) -> (Self, TreeRequest) {
        let node = Self {
            id: NodeId::next(),
            entry,
            depth,
            probe: ProbeState::Unresolved,
            children: Children::NotLoaded,
            open: false,
        };
        let request = TreeRequest::Probe {
            node: node.id,
            path: node.entry.path.clone(),
        };
        (node, request)
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.probe, ProbeState::Denied) || matches!(self.children, Children::Denied)
    }

    /// Expandable once the probe has found subdirectories and nothing has
    /// been denied.
    pub fn can_expand(&self) -> bool {
        !self.is_locked() && self.probe == ProbeState::Resolved(true)
    }

    /// A locked node shows exactly what a node without subdirectories shows.
    pub fn affordance(&self) -> Affordance {
        if self.is_locked() {
            return Affordance::Leaf;
        }
        match self.probe {
            ProbeState::Unresolved => Affordance::Pending,
            ProbeState::Resolved(false) | ProbeState::Denied => Affordance::Leaf,
            ProbeState::Resolved(true) if self.open => Affordance::Expanded,
            ProbeState::Resolved(true) => Affordance::Collapsed,
        }
    }

    /// Record the probe answer. Only the first answer counts.
    pub fn apply_probe(&mut self, outcome: ProbeOutcome) {
        if self.probe != ProbeState::Unresolved {
            return;
        }
        self.probe = match outcome {
            ProbeOutcome::HasChildren => ProbeState::Resolved(true),
            ProbeOutcome::Empty => ProbeState::Resolved(false),
            ProbeOutcome::Denied => ProbeState::Denied,
        };
    }

    /// Flip the open state. The first opening asks for a listing; every later
    /// toggle reuses whatever is loaded or loading.
    pub fn toggle(&mut self) -> Option<TreeRequest> {
        if !self.can_expand() {
            return None;
        }
        self.open = !self.open;
        if self.open && matches!(self.children, Children::NotLoaded) {
            self.children = Children::Loading;
            return Some(TreeRequest::List {
                node: self.id,
                path: self.entry.path.clone(),
            });
        }
        None
    }

    /// Store the listing (directories only) and return the probes for the
    /// new child nodes. A failure locks the node.
    pub fn apply_listing(
        &mut self,
        result: Result<Vec<FileEntry>, HostError>,
    ) -> Vec<TreeRequest> {
        if !matches!(self.children, Children::Loading) {
            return Vec::new();
        }
        match result {
            Ok(entries) => {
                let (children, probes): (Vec<_>, Vec<_>) = entries
                    .into_iter()
                    .filter(|e| e.is_dir)
                    .map(|e| TreeNode::new(e, self.depth + 1))
                    .unzip();
                self.children = Children::Loaded(children);
                probes
            }
            Err(e) => {
                debug!(path = %self.entry.path, error = %e, "listing failed, locking node");
                self.children = Children::Denied;
                self.open = false;
                Vec::new()
            }
        }
    }

    fn find_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        if self.id == id {
            return Some(self);
        }
        if let Children::Loaded(children) = &mut self.children {
            for child in children.iter_mut() {
                if let Some(found) = child.find_mut(id) {
                    return Some(found);
                }
            }
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    Node { node: NodeId, affordance: Affordance },
    /// Placeholder under an open node whose listing is outstanding.
    Loading,
}

/// A flattened row of the tree for rendering.
#[derive(Debug, Clone)]
pub struct FlatItem {
    pub name: String,
    pub path: String,
    pub depth: usize,
    pub is_last_sibling: bool,
    pub kind: RowKind,
}

/// The sidebar: volume roots, each a lazily expanded [`TreeNode`], plus
/// selection over the flattened rows.
#[derive(Debug, Default)]
pub struct SidebarTree {
    roots: Vec<TreeNode>,
    pub flat_items: Vec<FlatItem>,
    pub selected_index: usize,
    pub scroll_offset: usize,
}

impl SidebarTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the roots with one node per path.
    pub fn mount_roots(&mut self, paths: Vec<String>) -> Vec<TreeRequest> {
        let (roots, probes): (Vec<_>, Vec<_>) = paths
            .into_iter()
            .map(|p| TreeNode::new(FileEntry::directory(p), 0))
            .unzip();
        self.roots = roots;
        self.selected_index = 0;
        self.scroll_offset = 0;
        self.flatten();
        probes
    }

    pub fn find_node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.roots.iter_mut().find_map(|root| root.find_mut(id))
    }

    /// Apply a host answer. Returns follow-up requests (probes for newly
    /// listed children).
    pub fn apply(&mut self, result: TreeResult) -> Vec<TreeRequest> {
        let requests = match result {
            TreeResult::Probed { node, outcome } => match self.find_node_mut(node) {
                Some(target) => {
                    target.apply_probe(outcome);
                    Vec::new()
                }
                None => {
                    debug!(?node, "dropping probe for a node that no longer exists");
                    return Vec::new();
                }
            },
            TreeResult::Listed { node, result } => match self.find_node_mut(node) {
                Some(target) => target.apply_listing(result),
                None => {
                    debug!(?node, "dropping listing for a node that no longer exists");
                    return Vec::new();
                }
            },
        };
        self.flatten();
        requests
    }

    /// Toggle the selected row's node.
    pub fn toggle_selected(&mut self) -> Option<TreeRequest> {
        let RowKind::Node { node, .. } = self.flat_items.get(self.selected_index)?.kind else {
            return None;
        };
        let request = self.find_node_mut(node)?.toggle();
        self.flatten();
        request
    }

    /// Path of the selected directory, if a node row is selected.
    pub fn selected_affordance(&self) -> Option<Affordance> {
        match self.flat_items.get(self.selected_index)?.kind {
            RowKind::Node { affordance, .. } => Some(affordance),
            RowKind::Loading => None,
        }
    }

    pub fn selected_path(&self) -> Option<&str> {
        let item = self.flat_items.get(self.selected_index)?;
        match item.kind {
            RowKind::Node { .. } => Some(&item.path),
            RowKind::Loading => None,
        }
    }

    pub fn flatten(&mut self) {
        self.flat_items.clear();
        let count = self.roots.len();
        for (i, root) in self.roots.iter().enumerate() {
            Self::flatten_node(root, &mut self.flat_items, i + 1 == count);
        }
        if !self.flat_items.is_empty() && self.selected_index >= self.flat_items.len() {
            self.selected_index = self.flat_items.len() - 1;
        }
    }

    fn flatten_node(node: &TreeNode, items: &mut Vec<FlatItem>, is_last: bool) {
        items.push(FlatItem {
            name: node.entry.name().to_string(),
            path: node.entry.path.clone(),
            depth: node.depth,
            is_last_sibling: is_last,
            kind: RowKind::Node {
                node: node.id,
                affordance: node.affordance(),
            },
        });

        if !node.open {
            return;
        }
        match &node.children {
            Children::Loading => items.push(FlatItem {
                name: "(loading…)".to_string(),
                path: node.entry.path.clone(),
                depth: node.depth + 1,
                is_last_sibling: true,
                kind: RowKind::Loading,
            }),
            Children::Loaded(children) => {
                for (i, child) in children.iter().enumerate() {
                    Self::flatten_node(child, items, i + 1 == children.len());
                }
            }
            Children::NotLoaded | Children::Denied => {}
        }
    }

    pub fn select_next(&mut self) {
        let len = self.flat_items.len();
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
        self.selected_index = self.flat_items.len().saturating_sub(1);
    }

    /// Update the scroll offset to keep the selected row visible.
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
