use crate::authorize::{RouteExplanation, explain_route, is_allowed};
use crate::path::normalize;
use crate::permissions::{PermissionEntry, PermissionMap, flatten};
use crate::principal::PrincipalMode;
use crate::resolver::first_allowed_route;

/// A loaded feature-access list together with its flattened lookup map.
///
/// The map is derived on construction, so the two never disagree. Replace the
/// whole set when the list changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionSet {
    entries: Vec<PermissionEntry>,
    map: PermissionMap,
}

impl PermissionSet {
    pub fn new(entries: Vec<PermissionEntry>) -> Self {
        let map = flatten(&entries);
        Self { entries, map }
    }

    pub fn entries(&self) -> &[PermissionEntry] {
        &self.entries
    }

    pub fn map(&self) -> &PermissionMap {
        &self.map
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_allowed(&self, pathname: &str) -> bool {
        is_allowed(pathname, &self.map)
    }

    pub fn explain(&self, pathname: &str) -> RouteExplanation {
        explain_route(pathname, &self.map)
    }

    pub fn first_allowed_route(&self, mode: PrincipalMode) -> &str {
        first_allowed_route(&self.entries, mode)
    }

    /// Where to send a principal that was denied `denied`.
    ///
    /// The usual landing route, unless that is `denied` itself; then the next
    /// allowed top-level entry that is reachable and not `denied`. `None` when
    /// nothing else is left.
    pub fn landing_route_for(&self, denied: &str, mode: PrincipalMode) -> Option<&str> {
        let denied = normalize(denied);
        let landing = self.first_allowed_route(mode);
        if normalize(landing) != denied {
            return Some(landing);
        }

        self.entries
            .iter()
            .filter(|e| e.action && normalize(&e.path) != denied && self.is_allowed(&e.path))
            .map(|e| e.path.as_str())
            .next()
    }
}

impl From<Vec<PermissionEntry>> for PermissionSet {
    fn from(entries: Vec<PermissionEntry>) -> Self {
        Self::new(entries)
    }
}
