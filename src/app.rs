use crate::chart::TreeChart;
use crate::config::AppConfig;
use crate::infra::LoadedTree;
use crate::panel::{FilterPanel, PanelContext};
use crate::registry::Registry;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

const MAX_LOG_LINES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneFocus {
    Chart,
    Log,
}

impl PaneFocus {
    pub fn next(self) -> Self {
        match self {
            Self::Chart => Self::Log,
            Self::Log => Self::Chart,
        }
    }
}

#[derive(Debug, Clone)]
pub enum BackendTask {
    LoadTree { path: PathBuf },
}

#[derive(Debug, Clone)]
pub enum BackendEvent {
    TreeLoaded { tree: LoadedTree },
    Error { context: String, message: String },
}

pub struct App {
    pub config: AppConfig,
    pub focus: PaneFocus,
    pub panel: Option<FilterPanel<TreeChart>>,
    pub source: Option<String>,
    pub logs: Vec<String>,
    pub log_tail_offset: usize,
    pub busy: bool,
    pub should_quit: bool,
    registry: Registry,
}

impl App {
    pub fn new(config: AppConfig, registry: Registry) -> Self {
        Self {
            config,
            focus: PaneFocus::Chart,
            panel: None,
            source: None,
            logs: Vec::new(),
            log_tail_offset: 0,
            busy: false,
            should_quit: false,
            registry,
        }
    }

    pub fn install_tree(&mut self, loaded: LoadedTree) -> Result<bool> {
        if self.panel.is_some() {
            self.log(format!("ignored tree from {}: already loaded", loaded.origin));
            return Ok(false);
        }

        let context = PanelContext {
            tree: Arc::new(loaded.root),
            renderer: TreeChart::new(self.config.expand_depth),
        };
        let mut panel = FilterPanel::boot(context, self.registry.clone())?;
        if self.config.start_panel_open {
            panel.open();
        }

        self.log(format!(
            "loaded {} top-level pages from {} in {}ms",
            panel.tree().top_children().len(),
            loaded.origin,
            loaded.duration_ms
        ));
        let summary: Vec<String> = panel
            .buttons()
            .map(|button| format!("{}={}", button.id, button.count))
            .collect();
        self.log(format!("categories: {}", summary.join(" ")));

        self.source = Some(loaded.origin);
        self.panel = Some(panel);
        Ok(true)
    }

    pub fn panel_is_open(&self) -> bool {
        self.panel.as_ref().is_some_and(FilterPanel::is_open)
    }

    pub fn toggle_panel(&mut self) -> bool {
        let Some(panel) = self.panel.as_mut() else {
            return false;
        };
        panel.toggle();
        true
    }

    pub fn close_panel(&mut self) {
        if let Some(panel) = self.panel.as_mut() {
            panel.close();
        }
    }

    pub fn apply_focused_filter(&mut self) -> Result<bool> {
        let Some(panel) = self.panel.as_mut() else {
            return Ok(false);
        };
        if !panel.select_focused()? {
            return Ok(false);
        }

        let label = panel
            .active_group()
            .map(|group| group.label.clone())
            .unwrap_or_else(|| panel.active_id().to_string());
        let shown = panel.renderer().top_level_count();
        self.log(format!("filter: {label} ({shown} pages)"));
        Ok(true)
    }

    #[cfg(test)]
    pub fn chart(&self) -> Option<&TreeChart> {
        self.panel.as_ref().map(FilterPanel::renderer)
    }

    pub fn chart_mut(&mut self) -> Option<&mut TreeChart> {
        self.panel.as_mut().map(FilterPanel::renderer_mut)
    }

    pub fn active_label(&self) -> Option<&str> {
        let panel = self.panel.as_ref()?;
        panel.active_group().map(|group| group.label.as_str())
    }

    pub fn log(&mut self, line: String) {
        self.logs.push(line);
        if self.log_tail_offset > 0 {
            self.log_tail_offset = self.log_tail_offset.saturating_add(1);
        }
        if self.logs.len() > MAX_LOG_LINES {
            let to_trim = self.logs.len() - MAX_LOG_LINES;
            self.logs.drain(0..to_trim);
        }
    }

    pub fn scroll_log_up(&mut self, lines: usize) -> bool {
        let before = self.log_tail_offset;
        let max = self.logs.len().saturating_sub(1);
        self.log_tail_offset = self.log_tail_offset.saturating_add(lines).min(max);
        self.log_tail_offset != before
    }

    pub fn scroll_log_down(&mut self, lines: usize) -> bool {
        let before = self.log_tail_offset;
        self.log_tail_offset = self.log_tail_offset.saturating_sub(lines);
        self.log_tail_offset != before
    }
}
