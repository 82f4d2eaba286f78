use crate::domain::TreeNode;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

pub trait TreeSource: Send + Sync {
    fn load(&self) -> Result<LoadedTree>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTree {
    pub root: TreeNode,
    pub origin: String,
    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
pub struct FileTreeSource {
    path: PathBuf,
}

impl FileTreeSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TreeSource for FileTreeSource {
    fn load(&self) -> Result<LoadedTree> {
        let started = Instant::now();
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read tree data: {}", self.path.display()))?;
        let root = parse_tree_source(&raw)
            .with_context(|| format!("failed to parse tree data: {}", self.path.display()))?;

        Ok(LoadedTree {
            root,
            origin: self.path.display().to_string(),
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }
}

/// Accepts plain JSON or a `var treeData = {...};` script.
pub fn parse_tree_source(raw: &str) -> Result<TreeNode> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("tree data is empty");
    }

    let body = if trimmed.starts_with('{') {
        trimmed
    } else {
        extract_object_literal(trimmed)?
    };

    let root: TreeNode = serde_json::from_str(body).context("invalid tree JSON")?;
    if root.node_name.as_deref().is_none_or(str::is_empty) {
        bail!("tree root has no node_name");
    }
    Ok(root)
}

fn extract_object_literal(script: &str) -> Result<&str> {
    let (Some(start), Some(end)) = (script.find('{'), script.rfind('}')) else {
        bail!("no object literal found in tree data");
    };
    if end < start {
        bail!("no object literal found in tree data");
    }
    Ok(&script[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn parses_plain_json() {
        let root = parse_tree_source(
            r#"{"node_name":"site.com","children":[{"node_name":"site.com/p/x"}]}"#,
        )
        .expect("parse");
        assert_eq!(root.root_url(), "site.com");
        assert_eq!(root.top_children().len(), 1);
    }

    #[test]
    fn parses_script_assignment() {
        let raw = r#"
var treeData = {
  "node_name": "site.com",
  "_children": [{"node_name": "site.com/c/bricks", "display_url": "site.com/c/bricks"}]
};
"#;
        let root = parse_tree_source(raw).expect("parse");
        assert_eq!(root.top_children()[0].url(), "site.com/c/bricks");
    }

    #[test]
    fn rejects_empty_and_rootless_input() {
        assert!(parse_tree_source("   ").is_err());
        assert!(parse_tree_source("var x = 1;").is_err());
        let err = parse_tree_source(r#"{"children":[]}"#).expect_err("no root name");
        assert!(err.to_string().contains("node_name"));
    }

    #[test]
    fn file_source_reports_path_in_errors() {
        let path = std::env::temp_dir().join(format!(
            "sitemap_tui_missing_{}_{}.json",
            std::process::id(),
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("time")
                .as_nanos()
        ));
        let err = FileTreeSource::new(&path).load().expect_err("missing file");
        assert!(format!("{err:#}").contains("failed to read tree data"));
    }

    #[test]
    fn file_source_loads_tree() {
        let path = std::env::temp_dir().join(format!(
            "sitemap_tui_tree_{}_{}.json",
            std::process::id(),
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("time")
                .as_nanos()
        ));
        fs::write(&path, r#"{"node_name":"site.com","children":[]}"#).expect("write tree");

        let loaded = FileTreeSource::new(&path).load().expect("load");
        assert_eq!(loaded.root.root_url(), "site.com");
        assert_eq!(loaded.origin, path.display().to_string());

        let _ = fs::remove_file(path);
    }
}
