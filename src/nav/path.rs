//! Route paths and breadcrumb collapsing. Pure functions, no I/O.

/// Paths with at least this many segments get a collapsed middle.
pub const DEFAULT_COLLAPSE_THRESHOLD: usize = 7;

/// Segments kept visible at the end of a collapsed breadcrumb.
const TRAILING_VISIBLE: usize = 4;

/// The current directory as the navigation surface sees it: a sequence of
/// slash-delimited segments. Backslashes are treated as separators too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutePath {
    /// Whether the path began with a separator (`/home/...`).
    rooted: bool,
    segments: Vec<String>,
}

impl RoutePath {
    pub fn parse(path: &str) -> Self {
        let normalized = path.trim().replace('\\', "/");
        Self {
            rooted: normalized.starts_with('/'),
            segments: normalized
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// An empty route carries no location at all (not even `/`).
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && !self.rooted
    }

    /// Path formed by the segments up to and including `index`.
    pub fn prefix(&self, index: usize) -> String {
        let end = (index + 1).min(self.segments.len());
        self.render(&self.segments[..end])
    }

    /// The route one level up. The parent of a single segment or of `/` is
    /// the root (or empty, for unrooted paths).
    pub fn parent(&self) -> RoutePath {
        let mut segments = self.segments.clone();
        segments.pop();
        RoutePath {
            rooted: self.rooted,
            segments,
        }
    }

    /// Path string handed to the host.
    pub fn as_host_path(&self) -> String {
        self.render(&self.segments)
    }

    fn render(&self, segments: &[String]) -> String {
        let mut joined = segments.join("/");
        if self.rooted {
            joined.insert(0, '/');
        } else if joined.ends_with(':') {
            // Bare drive letters need a trailing separator to mean the root.
            joined.push('/');
        }
        joined
    }
}

impl std::fmt::Display for RoutePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_host_path())
    }
}

/// A navigable segment hidden inside a collapsed group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrumbTarget {
    pub label: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Crumb {
    /// A segment shown inline. The `current` one is the directory being
    /// viewed and does not link anywhere.
    Visible {
        label: String,
        target: String,
        current: bool,
    },
    /// Middle segments folded behind an ellipsis, in path order.
    Collapsed { hidden: Vec<CrumbTarget> },
}

impl Crumb {
    pub fn label(&self) -> &str {
        match self {
            Crumb::Visible { label, .. } => label,
            Crumb::Collapsed { .. } => "…",
        }
    }
}

pub type Breadcrumb = Vec<Crumb>;

/// Build the breadcrumb for `path`.
///
/// Below `threshold` segments every segment is visible. At or above it the
/// first segment stays, the middle folds into one [`Crumb::Collapsed`] and
/// the last four stay visible.
pub fn collapse(path: &RoutePath, threshold: usize) -> Breadcrumb {
    let count = path.len();
    let visible = |index: usize| Crumb::Visible {
        label: path.segments[index].clone(),
        target: path.prefix(index),
        current: index + 1 == count,
    };

    let hidden_end = count.saturating_sub(TRAILING_VISIBLE);
    if count < threshold || hidden_end <= 1 {
        return (0..count).map(visible).collect();
    }

    let hidden = (1..hidden_end)
        .map(|index| CrumbTarget {
            label: path.segments[index].clone(),
            target: path.prefix(index),
        })
        .collect();

    let mut crumbs = Vec::with_capacity(2 + TRAILING_VISIBLE);
    crumbs.push(visible(0));
    crumbs.push(Crumb::Collapsed { hidden });
    crumbs.extend((hidden_end..count).map(visible));
    crumbs
}
