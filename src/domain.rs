use serde::Deserialize;
use serde_json::{Map, Value};

// `_children` holds collapsed children; unknown fields ride along in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TreeNode {
    #[serde(default)]
    pub node_name: Option<String>,
    #[serde(default)]
    pub display_url: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<TreeNode>>,
    #[serde(default, rename = "_children")]
    pub hidden_children: Option<Vec<TreeNode>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TreeNode {
    // A present `children` list wins even when empty.
    pub fn top_children(&self) -> &[TreeNode] {
        self.children
            .as_deref()
            .or(self.hidden_children.as_deref())
            .unwrap_or(&[])
    }

    /// `display_url`, then `node_name`, skipping empty values.
    pub fn url(&self) -> &str {
        [self.display_url.as_deref(), self.node_name.as_deref()]
            .into_iter()
            .flatten()
            .find(|value| !value.is_empty())
            .unwrap_or("")
    }

    pub fn root_url(&self) -> &str {
        self.node_name.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
impl TreeNode {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: Some(node_name.into()),
            ..Self::default()
        }
    }

    pub fn with_display_url(mut self, url: impl Into<String>) -> Self {
        self.display_url = Some(url.into());
        self
    }

    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn with_hidden_children(mut self, children: Vec<TreeNode>) -> Self {
        self.hidden_children = Some(children);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchRule {
    All,
    Segment1(String),
    // first segment is the category marker
    Segment2(String),
    Utility,
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterGroup {
    pub id: String,
    pub label: String,
    pub rule: MatchRule,
}

impl FilterGroup {
    pub fn new(id: impl Into<String>, label: impl Into<String>, rule: MatchRule) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            rule,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEntry {
    Group(FilterGroup),
    Divider,
}

impl RegistryEntry {
    pub fn group(&self) -> Option<&FilterGroup> {
        match self {
            Self::Group(group) => Some(group),
            Self::Divider => None,
        }
    }
}
