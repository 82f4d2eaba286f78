use crate::chart::TreeRenderer;
use crate::domain::{FilterGroup, RegistryEntry, TreeNode};
use crate::matcher::{Matcher, filtered_subset};
use crate::registry::{ALL_GROUP_ID, Registry};
use anyhow::{Context, Result};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Closed,
    Open,
}

pub struct PanelContext<R> {
    pub tree: Arc<TreeNode>,
    pub renderer: R,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelButton {
    pub id: String,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PanelSlot {
    Divider,
    Button(PanelButton),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelItem {
    Divider,
    Button {
        id: String,
        label: String,
        count: usize,
        active: bool,
        focused: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub state: PanelState,
    pub title: &'static str,
    pub items: Vec<PanelItem>,
}

// Counts are computed once against the root's direct children.
pub struct FilterPanel<R: TreeRenderer> {
    context: PanelContext<R>,
    registry: Registry,
    slots: Vec<PanelSlot>,
    state: PanelState,
    active: String,
    cursor: usize,
}

impl<R: TreeRenderer> FilterPanel<R> {
    pub fn new(context: PanelContext<R>, registry: Registry) -> Self {
        let slots = build_slots(&registry, &context.tree);
        let mut panel = Self {
            context,
            registry,
            slots,
            state: PanelState::Closed,
            active: ALL_GROUP_ID.to_string(),
            cursor: 0,
        };
        panel.cursor = panel.active_button_index().unwrap_or(0);
        panel
    }

    pub fn boot(context: PanelContext<R>, registry: Registry) -> Result<Self> {
        let mut panel = Self::new(context, registry);
        let tree = Arc::clone(&panel.context.tree);
        panel
            .context
            .renderer
            .run(&tree)
            .context("failed to render initial tree")?;
        Ok(panel)
    }

    pub fn is_open(&self) -> bool {
        self.state == PanelState::Open
    }

    pub fn active_id(&self) -> &str {
        &self.active
    }

    pub fn active_group(&self) -> Option<&FilterGroup> {
        self.registry.group(&self.active)
    }

    pub fn renderer(&self) -> &R {
        &self.context.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.context.renderer
    }

    pub fn tree(&self) -> &TreeNode {
        &self.context.tree
    }

    pub fn open(&mut self) {
        self.state = PanelState::Open;
        self.cursor = self.active_button_index().unwrap_or(0);
    }

    pub fn close(&mut self) {
        self.state = PanelState::Closed;
    }

    pub fn toggle(&mut self) {
        if self.state == PanelState::Closed {
            self.open();
        }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &PanelButton> {
        self.slots.iter().filter_map(|slot| match slot {
            PanelSlot::Button(button) => Some(button),
            PanelSlot::Divider => None,
        })
    }

    pub fn button(&self, id: &str) -> Option<&PanelButton> {
        self.buttons().find(|button| button.id == id)
    }

    pub fn focused_button(&self) -> Option<&PanelButton> {
        self.buttons().nth(self.cursor)
    }

    pub fn focus_next(&mut self) {
        let len = self.buttons().count();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor + 1) % len;
    }

    pub fn focus_prev(&mut self) {
        let len = self.buttons().count();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = if self.cursor == 0 {
            len - 1
        } else {
            self.cursor - 1
        };
    }

    pub fn select_focused(&mut self) -> Result<bool> {
        let Some(id) = self.focused_button().map(|button| button.id.clone()) else {
            return Ok(false);
        };
        self.select(&id)
    }

    /// Returns `false` when no button exists for `id`.
    pub fn select(&mut self, id: &str) -> Result<bool> {
        if self.button(id).is_none() {
            return Ok(false);
        }
        let Some(group) = self.registry.group(id) else {
            return Ok(false);
        };

        let tree = &self.context.tree;
        let matcher = Matcher::new(group, &self.registry, tree.root_url());
        let subset = filtered_subset(tree, &matcher);
        self.context
            .renderer
            .run(&subset)
            .with_context(|| format!("failed to render filter: {id}"))?;

        self.active = id.to_string();
        self.cursor = self.active_button_index().unwrap_or(0);
        self.close();
        Ok(true)
    }

    pub fn view(&self) -> PanelView {
        let mut button_index = 0usize;
        let items = self
            .slots
            .iter()
            .map(|slot| match slot {
                PanelSlot::Divider => PanelItem::Divider,
                PanelSlot::Button(button) => {
                    let focused = button_index == self.cursor;
                    button_index += 1;
                    PanelItem::Button {
                        id: button.id.clone(),
                        label: button.label.clone(),
                        count: button.count,
                        active: button.id == self.active,
                        focused,
                    }
                }
            })
            .collect();

        PanelView {
            state: self.state,
            title: "Filter by Category",
            items,
        }
    }

    fn active_button_index(&self) -> Option<usize> {
        self.buttons().position(|button| button.id == self.active)
    }
}

fn build_slots(registry: &Registry, tree: &TreeNode) -> Vec<PanelSlot> {
    let root_url = tree.root_url();
    let top = tree.top_children();

    registry
        .entries()
        .iter()
        .filter_map(|entry| match entry {
            RegistryEntry::Divider => Some(PanelSlot::Divider),
            RegistryEntry::Group(group) => {
                let count = Matcher::new(group, registry, root_url).count(top);
                (count > 0).then(|| {
                    PanelSlot::Button(PanelButton {
                        id: group.id.clone(),
                        label: group.label.clone(),
                        count,
                    })
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct RecordingRenderer {
        runs: Vec<TreeNode>,
    }

    impl TreeRenderer for RecordingRenderer {
        fn run(&mut self, root: &TreeNode) -> Result<()> {
            self.runs.push(root.clone());
            Ok(())
        }
    }

    struct FailingRenderer {
        remaining_ok: usize,
    }

    impl TreeRenderer for FailingRenderer {
        fn run(&mut self, _root: &TreeNode) -> Result<()> {
            if self.remaining_ok == 0 {
                anyhow::bail!("renderer unavailable");
            }
            self.remaining_ok -= 1;
            Ok(())
        }
    }

    fn node(url: &str) -> TreeNode {
        TreeNode::default().with_display_url(url)
    }

    fn example_tree() -> TreeNode {
        TreeNode::new("site.com").with_children(vec![
            node("site.com/c/bricks/a"),
            node("site.com/p/x"),
            node("site.com/other"),
        ])
    }

    fn panel_for(tree: TreeNode) -> FilterPanel<RecordingRenderer> {
        FilterPanel::boot(
            PanelContext {
                tree: Arc::new(tree),
                renderer: RecordingRenderer::default(),
            },
            Registry::default(),
        )
        .expect("boot panel")
    }

    fn counts(panel: &FilterPanel<RecordingRenderer>) -> Vec<(String, usize)> {
        panel
            .buttons()
            .map(|b| (b.id.clone(), b.count))
            .collect()
    }

    #[test]
    fn example_counts_suppress_empty_groups() {
        let panel = panel_for(example_tree());
        assert_eq!(
            counts(&panel),
            vec![
                ("all".to_string(), 3),
                ("bricks".to_string(), 1),
                ("products".to_string(), 1),
                ("utility".to_string(), 1),
            ]
        );
        assert!(panel.button("timber").is_none());
    }

    #[test]
    fn dividers_stay_in_view_order() {
        let panel = panel_for(example_tree());
        let view = panel.view();
        let shape: Vec<&str> = view
            .items
            .iter()
            .map(|item| match item {
                PanelItem::Divider => "-",
                PanelItem::Button { id, .. } => id.as_str(),
            })
            .collect();
        assert_eq!(
            shape,
            vec!["all", "-", "bricks", "-", "products", "-", "utility"]
        );
    }

    #[test]
    fn boot_renders_full_tree_with_all_active() {
        let panel = panel_for(example_tree());
        assert_eq!(panel.renderer().runs, vec![example_tree()]);
        assert_eq!(panel.active_id(), "all");
        let view = panel.view();
        assert_eq!(view.state, PanelState::Closed);

        let active: Vec<&str> = view
            .items
            .iter()
            .filter_map(|item| match item {
                PanelItem::Button {
                    id, active: true, ..
                } => Some(id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(active, vec!["all"]);
    }

    #[test]
    fn toggle_only_opens_and_close_closes() {
        let mut panel = panel_for(example_tree());
        panel.toggle();
        assert_eq!(panel.view().state, PanelState::Open);
        panel.focus_next();
        panel.toggle();
        assert_eq!(panel.view().state, PanelState::Open);
        assert_eq!(panel.focused_button().map(|b| b.id.as_str()), Some("bricks"));
        panel.close();
        assert!(!panel.is_open());
        panel.close();
        assert!(!panel.is_open());
    }

    #[test]
    fn selecting_filters_renders_subset_and_closes() {
        let mut panel = panel_for(example_tree());
        panel.open();
        assert!(panel.select("bricks").expect("select"));

        assert!(!panel.is_open());
        assert_eq!(panel.active_id(), "bricks");
        let last = panel.renderer().runs.last().expect("rendered");
        assert_eq!(last.children, Some(vec![node("site.com/c/bricks/a")]));
        assert_eq!(last.hidden_children, None);
        assert_eq!(last.node_name.as_deref(), Some("site.com"));
    }

    #[test]
    fn reselecting_same_group_is_idempotent() {
        let mut panel = panel_for(example_tree());
        panel.select("products").expect("first");
        panel.select("products").expect("second");
        let runs = &panel.renderer().runs;
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1], runs[2]);
    }

    #[test]
    fn suppressed_groups_cannot_be_selected() {
        let mut panel = panel_for(example_tree());
        panel.open();
        assert!(!panel.select("timber").expect("select"));
        assert!(!panel.select("nope").expect("select"));
        assert!(panel.is_open());
        assert_eq!(panel.active_id(), "all");
        assert_eq!(panel.renderer().runs.len(), 1);
    }

    #[test]
    fn collapsed_root_children_are_counted() {
        let tree = TreeNode::new("site.com")
            .with_hidden_children(vec![node("site.com/brands/acme"), node("site.com/brands/b")]);
        let panel = panel_for(tree);
        assert_eq!(panel.button("brands").map(|b| b.count), Some(2));
        assert_eq!(panel.button("all").map(|b| b.count), Some(2));
    }

    #[test]
    fn empty_tree_has_no_buttons() {
        let panel = panel_for(TreeNode::new("site.com"));
        assert_eq!(panel.buttons().count(), 0);
        assert!(panel.focused_button().is_none());
    }

    #[test]
    fn cursor_walks_buttons_and_selects() {
        let mut panel = panel_for(example_tree());
        panel.open();
        assert_eq!(panel.focused_button().map(|b| b.id.as_str()), Some("all"));
        panel.focus_prev();
        assert_eq!(panel.focused_button().map(|b| b.id.as_str()), Some("utility"));
        panel.focus_next();
        panel.focus_next();
        assert_eq!(panel.focused_button().map(|b| b.id.as_str()), Some("bricks"));

        assert!(panel.select_focused().expect("select"));
        assert_eq!(panel.active_id(), "bricks");

        panel.open();
        assert_eq!(panel.focused_button().map(|b| b.id.as_str()), Some("bricks"));
    }

    #[test]
    fn renderer_failure_is_reported() {
        let context = PanelContext {
            tree: Arc::new(example_tree()),
            renderer: FailingRenderer { remaining_ok: 0 },
        };
        let err = FilterPanel::boot(context, Registry::default())
            .err()
            .expect("boot should fail");
        assert!(format!("{err:#}").contains("renderer unavailable"));
    }

    #[test]
    fn failed_render_keeps_previous_selection() {
        let context = PanelContext {
            tree: Arc::new(example_tree()),
            renderer: FailingRenderer { remaining_ok: 1 },
        };
        let mut panel = FilterPanel::boot(context, Registry::default()).expect("boot");
        panel.open();

        let err = panel.select("bricks").expect_err("render fails");
        assert!(format!("{err:#}").contains("failed to render filter: bricks"));
        assert_eq!(panel.active_id(), "all");
        assert!(panel.is_open());
        assert_eq!(panel.focused_button().map(|b| b.id.as_str()), Some("all"));
    }
}
