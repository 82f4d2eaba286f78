use crate::domain::MatchRule;
use crate::registry::{DEFAULT_CATEGORY_MARKER, DEFAULT_KNOWN_SEGMENTS, GroupConfig, Registry};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub config_version: u32,
    pub data_path: Option<PathBuf>,
    pub start_panel_open: bool,
    pub expand_depth: usize,
    pub category_marker: String,
    pub known_segments: Vec<String>,
    // replaces the built-in list when non-empty
    pub groups: Vec<GroupConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: 1,
            data_path: None,
            start_panel_open: false,
            expand_depth: 1,
            category_marker: DEFAULT_CATEGORY_MARKER.to_string(),
            known_segments: DEFAULT_KNOWN_SEGMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            groups: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn load_or_default() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        let parsed = toml::from_str::<AppConfig>(&raw)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;

        Ok(parsed)
    }

    pub fn registry(&self) -> Result<Registry> {
        let groups = if self.groups.is_empty() {
            default_group_configs()
        } else {
            self.groups.clone()
        };

        Registry::from_config(&groups, &self.category_marker, &self.known_segments)
            .context("invalid filter groups in config")
    }

    pub fn resolve_data_path(&self, cli_arg: Option<PathBuf>) -> Option<PathBuf> {
        cli_arg.or_else(|| self.data_path.clone())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("could not resolve config directory")?;
    Ok(base.join("sitemap-tui").join("config.toml"))
}

fn default_group_configs() -> Vec<GroupConfig> {
    Registry::default()
        .entries()
        .iter()
        .map(|entry| match entry.group() {
            None => GroupConfig {
                divider: true,
                ..GroupConfig::default()
            },
            Some(group) => {
                let mut cfg = GroupConfig {
                    id: group.id.clone(),
                    label: group.label.clone(),
                    ..GroupConfig::default()
                };
                match &group.rule {
                    MatchRule::Segment1(value) => cfg.seg1 = Some(value.clone()),
                    MatchRule::Segment2(value) => cfg.seg2 = Some(value.clone()),
                    MatchRule::Utility => cfg.utility = true,
                    MatchRule::All | MatchRule::Never => {}
                }
                cfg
            }
        })
        .collect()
}
