use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::path::normalize;

/// A sub-route (usually a tab inside a page) with its own allowance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedPermission {
    pub path: String,
    pub action: bool,
}

/// One feature entry of the feature-access list.
///
/// `action` states whether `path` is allowed for the logged-in principal.
/// Nested entries carry their own allowance; nothing is inherited from the
/// parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
    pub path: String,
    pub action: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub nested: Vec<NestedPermission>,
}

/// The backend sends `"nested": null` for entries without tabs.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<NestedPermission>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<NestedPermission>>::deserialize(deserializer)?.unwrap_or_default())
}

impl PermissionEntry {
    pub fn new(path: impl Into<String>, action: bool) -> Self {
        Self {
            path: path.into(),
            action,
            nested: Vec::new(),
        }
    }

    pub fn with_nested(mut self, path: impl Into<String>, action: bool) -> Self {
        self.nested.push(NestedPermission {
            path: path.into(),
            action,
        });
        self
    }
}

/// Flat lookup of normalized route → allowance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionMap(HashMap<String, bool>);

impl PermissionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact lookup; `key` must already be normalized.
    pub fn get(&self, key: &str) -> Option<bool> {
        self.0.get(key).copied()
    }

    pub fn insert(&mut self, path: &str, allowed: bool) {
        self.0.insert(normalize(path), allowed);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, bool)> for PermissionMap {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (path, allowed) in iter {
            map.insert(&path, allowed);
        }
        map
    }
}

/// Flatten entries and their nested children into one lookup map.
///
/// Keys are normalized paths. When two paths normalize to the same key the
/// later one wins (entry first, then its children, then the next entry).
pub fn flatten(entries: &[PermissionEntry]) -> PermissionMap {
    let mut map = PermissionMap::new();
    for entry in entries {
        map.insert(&entry.path, entry.action);
        for child in &entry.nested {
            map.insert(&child.path, child.action);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_includes_nested_children() {
        let entries = vec![
            PermissionEntry::new("/dashboard/orders", true)
                .with_nested("/dashboard/orders/massschuhe", true)
                .with_nested("/dashboard/orders/einlagen", false),
        ];

        let map = flatten(&entries);
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("/dashboard/orders"), Some(true));
        assert_eq!(map.get("/dashboard/orders/massschuhe"), Some(true));
        assert_eq!(map.get("/dashboard/orders/einlagen"), Some(false));
    }

    #[test]
    fn children_do_not_inherit_parent_denial() {
        let entries = vec![
            PermissionEntry::new("/dashboard/lager", false).with_nested("/dashboard/lager/bestand", true),
        ];

        let map = flatten(&entries);
        assert_eq!(map.get("/dashboard/lager"), Some(false));
        assert_eq!(map.get("/dashboard/lager/bestand"), Some(true));
    }

    #[test]
    fn keys_are_normalized() {
        let entries = vec![PermissionEntry::new("/dashboard/kunden/?tab=1", true)];
        let map = flatten(&entries);
        assert_eq!(map.get("/dashboard/kunden"), Some(true));
    }

    #[test]
    fn duplicate_keys_last_write_wins() {
        let entries = vec![
            PermissionEntry::new("/dashboard/termine", true),
            PermissionEntry::new("/dashboard/settings", true).with_nested("/dashboard/termine/", false),
        ];

        let map = flatten(&entries);
        assert_eq!(map.get("/dashboard/termine"), Some(false));
    }

    #[test]
    fn nested_defaults_to_empty_when_missing_from_json() {
        let json = r#"[{"path":"/dashboard","action":true,"title":"Übersicht"}]"#;
        let entries: Vec<PermissionEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries, vec![PermissionEntry::new("/dashboard", true)]);
    }

    #[test]
    fn null_nested_is_treated_as_empty() {
        let json = r#"[
            {"path":"/dashboard","action":true,"nested":null},
            {"path":"/dashboard/orders","action":true,"nested":[{"path":"/dashboard/orders/einlagen","action":false}]}
        ]"#;
        let entries: Vec<PermissionEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(
            entries,
            vec![
                PermissionEntry::new("/dashboard", true),
                PermissionEntry::new("/dashboard/orders", true).with_nested("/dashboard/orders/einlagen", false),
            ]
        );
    }
}
