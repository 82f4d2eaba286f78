use crate::domain::{FilterGroup, MatchRule, TreeNode};
use crate::registry::Registry;

/// Removes the first occurrence of `root_url`, then one leading `/`, and
/// splits the rest on `/`.
pub fn path_segments(node: &TreeNode, root_url: &str) -> Vec<String> {
    let url = node.url();
    let relative = if root_url.is_empty() {
        url.to_string()
    } else {
        url.replacen(root_url, "", 1)
    };
    let trimmed = relative.strip_prefix('/').unwrap_or(&relative);
    trimmed.split('/').map(str::to_string).collect()
}

#[derive(Debug, Clone)]
pub struct Matcher<'r> {
    rule: &'r MatchRule,
    registry: &'r Registry,
    root_url: String,
}

impl<'r> Matcher<'r> {
    pub fn new(group: &'r FilterGroup, registry: &'r Registry, root_url: &str) -> Self {
        Self {
            rule: &group.rule,
            registry,
            root_url: root_url.to_string(),
        }
    }

    pub fn matches(&self, node: &TreeNode) -> bool {
        match self.rule {
            MatchRule::All => true,
            MatchRule::Never => false,
            MatchRule::Segment1(value) => {
                let segments = path_segments(node, &self.root_url);
                segments.first().is_some_and(|first| first == value)
            }
            MatchRule::Segment2(value) => {
                let segments = path_segments(node, &self.root_url);
                segments.first().map(String::as_str) == Some(self.registry.category_marker())
                    && segments.get(1).is_some_and(|second| second == value)
            }
            MatchRule::Utility => {
                let segments = path_segments(node, &self.root_url);
                !segments
                    .first()
                    .is_some_and(|first| self.registry.is_known_segment(first))
            }
        }
    }

    pub fn count(&self, nodes: &[TreeNode]) -> usize {
        nodes.iter().filter(|node| self.matches(node)).count()
    }

    pub fn filter(&self, nodes: &[TreeNode]) -> Vec<TreeNode> {
        nodes
            .iter()
            .filter(|node| self.matches(node))
            .cloned()
            .collect()
    }
}

// Children are replaced by the matches and `_children` is cleared.
pub fn filtered_subset(root: &TreeNode, matcher: &Matcher<'_>) -> TreeNode {
    TreeNode {
        node_name: root.node_name.clone(),
        display_url: root.display_url.clone(),
        children: Some(matcher.filter(root.top_children())),
        hidden_children: None,
        extra: root.extra.clone(),
    }
}
