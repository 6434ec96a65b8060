//! Configuration for graph traversal.
//!
//! Load order: `.graphwalk/config.toml` → environment variables → defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const CONFIG_DIR: &str = ".graphwalk";
const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphwalkConfig {
    pub search: SearchConfig,
}

/// When a depth-first search records a relationship as visited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitMarking {
    /// Mark the edge before descending into it. Terminates on cyclic graphs.
    #[default]
    OnEntry,
    /// Mark the edge once its subtree is exhausted. A cycle with no match is
    /// re-entered until `max_depth` (or the consumer) stops it.
    OnExit,
}

impl FromStr for VisitMarking {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on_entry" | "entry" => Ok(Self::OnEntry),
            "on_exit" | "exit" => Ok(Self::OnExit),
            other => Err(format!("unknown visit marking '{}'", other)),
        }
    }
}

impl fmt::Display for VisitMarking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OnEntry => "on_entry",
            Self::OnExit => "on_exit",
        })
    }
}

/// Depth-first search settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub visit_marking: VisitMarking,
    /// Maximum number of relationship hops below the start node. `None` = unbounded.
    pub max_depth: Option<usize>,
}

impl GraphwalkConfig {
    /// Load config from `.graphwalk/config.toml` in the project root, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(CONFIG_DIR).join(CONFIG_FILE);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read config {}", config_path.display()))?;
            Self::from_toml_str(&content)
                .with_context(|| format!("invalid config {}", config_path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|var| std::env::var(var).ok());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse graphwalk config")
    }

    /// Apply `GRAPHWALK_*` overrides from `lookup`. Unparseable values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("GRAPHWALK_VISIT_MARKING")
            && let Ok(marking) = v.parse()
        {
            self.search.visit_marking = marking;
        }
        if let Some(v) = lookup("GRAPHWALK_MAX_DEPTH") {
            let v = v.trim();
            if v.eq_ignore_ascii_case("none") {
                self.search.max_depth = None;
            } else if let Ok(n) = v.parse() {
                self.search.max_depth = Some(n);
            }
        }
    }
}
