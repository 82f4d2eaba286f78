use crate::domain::TreeNode;
use anyhow::Result;
use std::collections::BTreeSet;

pub trait TreeRenderer {
    fn run(&mut self, root: &TreeNode) -> Result<()>;
}

// Child indices from the root; the root is `[]`.
pub type NodePath = Vec<usize>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRow {
    pub path: NodePath,
    pub depth: usize,
    pub url: String,
    pub child_count: usize,
}

impl ChartRow {
    pub fn has_children(&self) -> bool {
        self.child_count > 0
    }
}

#[derive(Debug, Default)]
pub struct TreeChart {
    root: Option<TreeNode>,
    expanded: BTreeSet<NodePath>,
    rows: Vec<ChartRow>,
    expand_depth: usize,
    pub selected_index: usize,
    list_scroll: usize,
}

impl TreeRenderer for TreeChart {
    fn run(&mut self, root: &TreeNode) -> Result<()> {
        self.root = Some(root.clone());
        self.expanded.clear();
        self.expanded.insert(Vec::new());
        let mut initial = BTreeSet::new();
        collect_open_nodes(root, &mut Vec::new(), self.expand_depth, &mut initial);
        self.expanded.extend(initial);
        self.selected_index = 0;
        self.list_scroll = 0;
        self.rebuild_rows(None);
        Ok(())
    }
}

impl TreeChart {
    /// The root is always expanded regardless of `expand_depth`.
    pub fn new(expand_depth: usize) -> Self {
        Self {
            expand_depth,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> &[ChartRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_expanded(&self, path: &[usize]) -> bool {
        self.expanded.contains(path)
    }

    pub fn top_level_count(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.top_children().len())
    }

    pub fn selected_row(&self) -> Option<&ChartRow> {
        self.rows.get(self.selected_index)
    }

    pub fn select_next(&mut self) {
        let len = self.len();
        if len == 0 {
            self.selected_index = 0;
            return;
        }
        self.selected_index = (self.selected_index + 1) % len;
    }

    pub fn select_prev(&mut self) {
        let len = self.len();
        if len == 0 {
            self.selected_index = 0;
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = len - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    pub fn list_scroll(&self) -> usize {
        self.list_scroll
    }

    pub fn sync_list_scroll(&mut self, viewport_rows: usize) {
        let len = self.len();
        if len == 0 {
            self.list_scroll = 0;
            return;
        }

        let rows = viewport_rows.max(1);
        if self.selected_index < self.list_scroll {
            self.list_scroll = self.selected_index;
        } else if self.selected_index >= self.list_scroll + rows {
            self.list_scroll = self.selected_index + 1 - rows;
        }

        let max_offset = len.saturating_sub(rows);
        if self.list_scroll > max_offset {
            self.list_scroll = max_offset;
        }
    }

    pub fn expand_selected(&mut self) -> bool {
        let Some(row) = self.selected_row().cloned() else {
            return false;
        };
        if !row.has_children() {
            return false;
        }

        let changed = self.expanded.insert(row.path.clone());
        if changed {
            self.rebuild_rows(Some(row.path));
        }
        changed
    }

    pub fn collapse_selected_or_parent(&mut self) -> bool {
        let Some(row) = self.selected_row() else {
            return false;
        };

        let mut candidate = row.path.clone();
        while !candidate.is_empty() {
            if self.expanded.contains(&candidate) {
                self.collapse_tree(&candidate);
                self.rebuild_rows(Some(candidate));
                return true;
            }
            candidate.pop();
        }

        false
    }

    pub fn row_label(&self, row: &ChartRow) -> String {
        let mut label = "  ".repeat(row.depth);
        let marker = if !row.has_children() {
            "   "
        } else if self.is_expanded(&row.path) {
            "[-]"
        } else {
            "[+]"
        };
        label.push_str(marker);
        label.push(' ');

        let root_url = self.root.as_ref().map_or("", TreeNode::root_url);
        let name = if row.depth == 0 || root_url.is_empty() {
            row.url.as_str()
        } else {
            row.url.strip_prefix(root_url).unwrap_or(&row.url)
        };
        label.push_str(if name.is_empty() { "(unnamed)" } else { name });

        if row.has_children() {
            label.push_str(&format!(" ({})", row.child_count));
        }
        label
    }

    fn rebuild_rows(&mut self, preferred: Option<NodePath>) {
        let previous = preferred.or_else(|| self.selected_row().map(|row| row.path.clone()));
        let mut rows = Vec::new();
        if let Some(root) = &self.root {
            push_rows(root, &mut Vec::new(), &self.expanded, &mut rows);
        }
        self.rows = rows;

        if let Some(target) = previous
            && let Some(idx) = self.rows.iter().position(|row| row.path == target)
        {
            self.selected_index = idx;
            return;
        }

        self.sync_selection_bounds();
    }

    fn sync_selection_bounds(&mut self) {
        let len = self.len();
        if len == 0 {
            self.selected_index = 0;
            self.list_scroll = 0;
        } else if self.selected_index >= len {
            self.selected_index = len - 1;
        }
    }

    fn collapse_tree(&mut self, path: &[usize]) {
        self.expanded.retain(|p| !p.starts_with(path));
    }
}

fn push_rows(
    node: &TreeNode,
    path: &mut NodePath,
    expanded: &BTreeSet<NodePath>,
    out: &mut Vec<ChartRow>,
) {
    let children = node.top_children();
    out.push(ChartRow {
        path: path.clone(),
        depth: path.len(),
        url: node.url().to_string(),
        child_count: children.len(),
    });

    if !expanded.contains(path.as_slice()) {
        return;
    }

    for (index, child) in children.iter().enumerate() {
        path.push(index);
        push_rows(child, path, expanded, out);
        path.pop();
    }
}

fn collect_open_nodes(
    node: &TreeNode,
    path: &mut NodePath,
    max_depth: usize,
    out: &mut BTreeSet<NodePath>,
) {
    if path.len() >= max_depth {
        return;
    }
    let Some(children) = node.children.as_deref() else {
        return;
    };
    if children.is_empty() {
        return;
    }
    out.insert(path.clone());
    for (index, child) in children.iter().enumerate() {
        path.push(index);
        collect_open_nodes(child, path, max_depth, out);
        path.pop();
    }
}
