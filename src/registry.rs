use crate::domain::{FilterGroup, MatchRule, RegistryEntry};
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

pub const ALL_GROUP_ID: &str = "all";
pub const DEFAULT_CATEGORY_MARKER: &str = "c";

// Kept by hand in step with the segment values of the default groups below.
pub const DEFAULT_KNOWN_SEGMENTS: [&str; 4] = ["c", "p", "brands", "category"];

const DEFAULT_CATEGORIES: [(&str, &str, &str); 7] = [
    ("bricks", "Bricks", "bricks"),
    ("rooftiles", "Roof Tiles & Fittings", "roof-tiles-fittings"),
    ("hardscape", "Hard Landscaping", "hard-landscaping"),
    ("flooring", "Flooring", "flooring"),
    ("timber", "Timber & Joinery", "timber-joinery"),
    ("interior", "Interior & Exterior", "interior-exterior-products"),
    ("reclaimed", "Reclaimed Sale", "reclaimed-items-sale"),
];

const DEFAULT_SECTIONS: [(&str, &str, &str); 3] = [
    ("products", "Products", "p"),
    ("brands", "Brands", "brands"),
    ("blog", "Blog & Articles", "category"),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate filter group id: {0}")]
    DuplicateId(String),
    #[error("filter group at position {0} has an empty id")]
    EmptyId(usize),
}

// Exactly one of `divider`, `seg1`, `seg2`, `utility` is expected; `all` needs none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    pub id: String,
    pub label: String,
    pub divider: bool,
    pub seg1: Option<String>,
    pub seg2: Option<String>,
    pub utility: bool,
}

impl GroupConfig {
    pub fn to_entry(&self) -> RegistryEntry {
        if self.divider {
            return RegistryEntry::Divider;
        }

        let rule = if self.id == ALL_GROUP_ID {
            MatchRule::All
        } else if let Some(seg1) = self.seg1.as_deref().filter(|s| !s.is_empty()) {
            MatchRule::Segment1(seg1.to_string())
        } else if let Some(seg2) = self.seg2.as_deref().filter(|s| !s.is_empty()) {
            MatchRule::Segment2(seg2.to_string())
        } else if self.utility {
            MatchRule::Utility
        } else {
            MatchRule::Never
        };

        let label = if self.label.is_empty() {
            self.id.clone()
        } else {
            self.label.clone()
        };
        RegistryEntry::Group(FilterGroup::new(self.id.clone(), label, rule))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
    category_marker: String,
    known_segments: BTreeSet<String>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut entries = vec![
            RegistryEntry::Group(FilterGroup::new(
                ALL_GROUP_ID,
                "All Pages",
                MatchRule::All,
            )),
            RegistryEntry::Divider,
        ];
        entries.extend(DEFAULT_CATEGORIES.iter().map(|(id, label, seg2)| {
            RegistryEntry::Group(FilterGroup::new(
                *id,
                *label,
                MatchRule::Segment2(seg2.to_string()),
            ))
        }));
        entries.push(RegistryEntry::Divider);
        entries.extend(DEFAULT_SECTIONS.iter().map(|(id, label, seg1)| {
            RegistryEntry::Group(FilterGroup::new(
                *id,
                *label,
                MatchRule::Segment1(seg1.to_string()),
            ))
        }));
        entries.push(RegistryEntry::Divider);
        entries.push(RegistryEntry::Group(FilterGroup::new(
            "utility",
            "Utility Pages",
            MatchRule::Utility,
        )));

        Self {
            entries,
            category_marker: DEFAULT_CATEGORY_MARKER.to_string(),
            known_segments: DEFAULT_KNOWN_SEGMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Registry {
    pub fn new(
        entries: Vec<RegistryEntry>,
        category_marker: impl Into<String>,
        known_segments: impl IntoIterator<Item = String>,
    ) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for (index, entry) in entries.iter().enumerate() {
            let Some(group) = entry.group() else {
                continue;
            };
            if group.id.is_empty() {
                return Err(RegistryError::EmptyId(index));
            }
            if !seen.insert(group.id.as_str()) {
                return Err(RegistryError::DuplicateId(group.id.clone()));
            }
        }

        Ok(Self {
            entries,
            category_marker: category_marker.into(),
            known_segments: known_segments.into_iter().collect(),
        })
    }

    pub fn from_config(
        groups: &[GroupConfig],
        category_marker: &str,
        known_segments: &[String],
    ) -> Result<Self, RegistryError> {
        let entries = groups.iter().map(GroupConfig::to_entry).collect();
        Self::new(entries, category_marker, known_segments.iter().cloned())
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn groups(&self) -> impl Iterator<Item = &FilterGroup> {
        self.entries.iter().filter_map(RegistryEntry::group)
    }

    pub fn group(&self, id: &str) -> Option<&FilterGroup> {
        self.groups().find(|group| group.id == id)
    }

    pub fn category_marker(&self) -> &str {
        &self.category_marker
    }

    pub fn is_known_segment(&self, segment: &str) -> bool {
        self.known_segments.contains(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_order_starts_with_all_and_ends_with_utility() {
        let registry = Registry::default();
        let ids: Vec<&str> = registry.groups().map(|g| g.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "all",
                "bricks",
                "rooftiles",
                "hardscape",
                "flooring",
                "timber",
                "interior",
                "reclaimed",
                "products",
                "brands",
                "blog",
                "utility",
            ]
        );
        let dividers = registry
            .entries()
            .iter()
            .filter(|e| **e == RegistryEntry::Divider)
            .count();
        assert_eq!(dividers, 3);
    }

    #[test]
    fn default_known_segments_cover_top_level_groups() {
        let registry = Registry::default();
        for segment in ["c", "p", "brands", "category"] {
            assert!(registry.is_known_segment(segment));
        }
        assert!(!registry.is_known_segment("about"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let entries = vec![
            RegistryEntry::Group(FilterGroup::new("a", "A", MatchRule::All)),
            RegistryEntry::Divider,
            RegistryEntry::Group(FilterGroup::new("a", "Again", MatchRule::Utility)),
        ];
        let err = Registry::new(entries, "c", Vec::new()).expect_err("duplicate id");
        assert_eq!(err, RegistryError::DuplicateId("a".to_string()));
    }

    #[test]
    fn group_config_without_shape_matches_nothing() {
        let cfg = GroupConfig {
            id: "mystery".to_string(),
            label: "Mystery".to_string(),
            ..GroupConfig::default()
        };
        let RegistryEntry::Group(group) = cfg.to_entry() else {
            panic!("expected group");
        };
        assert_eq!(group.rule, MatchRule::Never);
    }

    #[test]
    fn group_config_shapes_map_to_rules() {
        let seg2 = GroupConfig {
            id: "bricks".to_string(),
            label: "Bricks".to_string(),
            seg2: Some("bricks".to_string()),
            ..GroupConfig::default()
        };
        assert_eq!(
            seg2.to_entry().group().map(|g| g.rule.clone()),
            Some(MatchRule::Segment2("bricks".to_string()))
        );

        let divider = GroupConfig {
            divider: true,
            ..GroupConfig::default()
        };
        assert_eq!(divider.to_entry(), RegistryEntry::Divider);

        let unlabeled = GroupConfig {
            id: "all".to_string(),
            ..GroupConfig::default()
        };
        let group = unlabeled.to_entry().group().cloned().expect("group");
        assert_eq!(group.label, "all");
        assert_eq!(group.rule, MatchRule::All);
    }
}
