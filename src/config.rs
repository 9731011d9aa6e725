//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--config`, `--editor`, start path)
//! 2. `$FX_CONFIG` environment variable (path to config file)
//! 3. Project-local `.fx.toml` in the current working directory
//! 4. Global `~/.config/fx/config.toml`
//! 5. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::nav::icons::{DEFAULT_CACHE_CAPACITY, DEFAULT_ICON_BEARING};
use crate::nav::layout::DEFAULT_DEBOUNCE_MS;
use crate::nav::path::DEFAULT_COLLAPSE_THRESHOLD;

// ── Section configs ──────────────────────────────────────────────────────────

/// General application settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Starting directory (overridden by CLI positional arg). Empty means
    /// the desktop directory.
    pub start_path: Option<String>,
    /// Command used by "open in editor".
    pub editor: Option<String>,
}

/// Pane layout and its persistence.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LayoutConfig {
    /// Quiet period before a resize is written, in milliseconds.
    pub debounce_ms: Option<u64>,
    /// Sidebar width in percent when nothing is stored.
    pub sidebar_percent: Option<f64>,
    /// Smallest sidebar width in percent.
    pub min_sidebar_percent: Option<f64>,
    /// Percent moved per resize key press.
    pub resize_step: Option<f64>,
    /// Location of the JSON store file.
    pub store_path: Option<String>,
}

/// Icon extraction settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct IconsConfig {
    /// Maximum number of resolved icons kept in memory.
    pub cache_capacity: Option<usize>,
    /// File types whose icon is extracted from the file itself.
    pub icon_bearing: Option<Vec<String>>,
}

/// Breadcrumb settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct BreadcrumbConfig {
    /// Segment count at which the middle of the path collapses.
    pub collapse_threshold: Option<usize>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub layout: LayoutConfig,
    pub icons: IconsConfig,
    pub breadcrumb: BreadcrumbConfig,
}

// ── Default constants ────────────────────────────────────────────────────────

pub const DEFAULT_EDITOR: &str = "code";
pub const DEFAULT_SIDEBAR_PERCENT: f64 = 20.0;
pub const DEFAULT_MIN_SIDEBAR_PERCENT: f64 = 20.0;
pub const DEFAULT_RESIZE_STEP: f64 = 5.0;

/// Smallest threshold for which "first 1, collapse, last 4" still hides
/// something.
const MIN_COLLAPSE_THRESHOLD: usize = 6;

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path; `load` handles that one.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("FX_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".fx.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("fx").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed (with a warning logged).
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse config file");
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`. `Some` values in `other` win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                start_path: other
                    .general
                    .start_path
                    .clone()
                    .or(self.general.start_path),
                editor: other.general.editor.clone().or(self.general.editor),
            },
            layout: LayoutConfig {
                debounce_ms: other.layout.debounce_ms.or(self.layout.debounce_ms),
                sidebar_percent: other.layout.sidebar_percent.or(self.layout.sidebar_percent),
                min_sidebar_percent: other
                    .layout
                    .min_sidebar_percent
                    .or(self.layout.min_sidebar_percent),
                resize_step: other.layout.resize_step.or(self.layout.resize_step),
                store_path: other
                    .layout
                    .store_path
                    .clone()
                    .or(self.layout.store_path),
            },
            icons: IconsConfig {
                cache_capacity: other.icons.cache_capacity.or(self.icons.cache_capacity),
                icon_bearing: other
                    .icons
                    .icon_bearing
                    .clone()
                    .or(self.icons.icon_bearing),
            },
            breadcrumb: BreadcrumbConfig {
                collapse_threshold: other
                    .breadcrumb
                    .collapse_threshold
                    .or(self.breadcrumb.collapse_threshold),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Walk in reverse so that highest-priority (env var) overwrites lower.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    /// Configured start directory; `None` means "ask the host for the desktop".
    pub fn start_path(&self) -> Option<&str> {
        self.general.start_path.as_deref().filter(|p| !p.is_empty())
    }

    pub fn editor(&self) -> &str {
        self.general.editor.as_deref().unwrap_or(DEFAULT_EDITOR)
    }

    pub fn debounce_ms(&self) -> u64 {
        self.layout.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS)
    }

    pub fn sidebar_percent(&self) -> f64 {
        self.layout.sidebar_percent.unwrap_or(DEFAULT_SIDEBAR_PERCENT)
    }

    pub fn min_sidebar_percent(&self) -> f64 {
        self.layout
            .min_sidebar_percent
            .unwrap_or(DEFAULT_MIN_SIDEBAR_PERCENT)
    }

    pub fn resize_step(&self) -> f64 {
        self.layout.resize_step.unwrap_or(DEFAULT_RESIZE_STEP)
    }

    /// Store file: configured path, else `<data_dir>/fx/store.json`.
    pub fn store_path(&self) -> PathBuf {
        match &self.layout.store_path {
            Some(path) => PathBuf::from(path),
            None => dirs::data_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("fx")
                .join("store.json"),
        }
    }

    pub fn icon_cache_capacity(&self) -> usize {
        self.icons.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY)
    }

    pub fn icon_bearing(&self) -> Vec<String> {
        match &self.icons.icon_bearing {
            Some(types) => types.clone(),
            None => DEFAULT_ICON_BEARING.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn collapse_threshold(&self) -> usize {
        self.breadcrumb
            .collapse_threshold
            .unwrap_or(DEFAULT_COLLAPSE_THRESHOLD)
            .max(MIN_COLLAPSE_THRESHOLD)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
