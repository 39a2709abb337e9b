use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Name of the optional per-project settings file.
pub const CONFIG_FILE_NAME: &str = "rsidx.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Quiet period before queued edits of an open file are applied.
    pub debounce_ms: u64,
    /// How far above a call argument the call name may have been opened.
    pub call_lookback_lines: u32,
    /// Directory names skipped by project scans.
    pub exclude_dirs: Vec<String>,
    /// Files larger than this are not indexed.
    pub max_file_bytes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 150,
            call_lookback_lines: 10,
            exclude_dirs: vec![".git".to_string(), "target".to_string(), "node_modules".to_string()],
            max_file_bytes: 8 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
struct ConfigFile {
    #[serde(default)]
    index: IndexSection,
    #[serde(default)]
    editor: EditorSection,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct IndexSection {
    #[serde(default)]
    exclude_dirs: Option<Vec<String>>,
    #[serde(default)]
    max_file_bytes: Option<u64>,
    #[serde(default)]
    call_lookback_lines: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct EditorSection {
    #[serde(default)]
    debounce_ms: Option<u64>,
}

impl SessionConfig {
    /// Parse `rsidx.toml` content. Missing keys keep their defaults and
    /// zero values are ignored.
    pub fn from_toml(text: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(text).context("invalid rsidx.toml")?;
        let mut cfg = Self::default();
        if let Some(v) = file.editor.debounce_ms.filter(|v| *v > 0) {
            cfg.debounce_ms = v;
        }
        if let Some(v) = file.index.call_lookback_lines.filter(|v| *v > 0) {
            cfg.call_lookback_lines = v;
        }
        if let Some(v) = file.index.max_file_bytes.filter(|v| *v > 0) {
            cfg.max_file_bytes = v;
        }
        if let Some(dirs) = file.index.exclude_dirs {
            cfg.exclude_dirs = dirs;
        }
        Ok(cfg)
    }

    /// Load `<root>/rsidx.toml`, falling back to defaults when it is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
        let cfg = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), ?cfg, "loaded config");
        Ok(cfg)
    }

    pub fn is_excluded(&self, dir_name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == dir_name)
    }
}
