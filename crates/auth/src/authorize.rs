use serde::Serialize;

use crate::path::{ancestors, normalize};
use crate::permissions::PermissionMap;

/// Decide whether `pathname` may be opened.
///
/// - Query string, fragment and trailing slashes are ignored
/// - Exact match first, then the closest ancestor that has an entry
/// - Nothing matches: denied (fail-closed)
pub fn is_allowed(pathname: &str, map: &PermissionMap) -> bool {
    let key = normalize(pathname);
    ancestors(&key)
        .find_map(|candidate| map.get(candidate))
        .unwrap_or(false)
}

// ─────────────────────────────────────────────────────────────────────────────
// Route decision explanation (audit trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Why a route was allowed or denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteExplanation {
    /// Path as requested (before normalization).
    pub requested: String,

    /// Normalized lookup key.
    pub normalized: String,

    /// Final decision.
    pub allowed: bool,

    /// Map key that produced the decision; `None` when fail-closed.
    pub matched: Option<String>,

    /// Keys that were looked up, in order, up to and including the match.
    pub candidates: Vec<String>,

    pub reason: String,
}

/// Same decision as [`is_allowed`], with the lookup chain that produced it.
pub fn explain_route(pathname: &str, map: &PermissionMap) -> RouteExplanation {
    let normalized = normalize(pathname);
    let mut candidates = Vec::new();

    for candidate in ancestors(&normalized) {
        candidates.push(candidate.to_string());

        let Some(allowed) = map.get(candidate) else {
            continue;
        };

        let reason = match (candidate == normalized, allowed) {
            (true, true) => format!("'{candidate}' is allowed"),
            (true, false) => format!("'{candidate}' is denied"),
            (false, true) => format!("no entry for '{normalized}'; ancestor '{candidate}' is allowed"),
            (false, false) => format!("no entry for '{normalized}'; ancestor '{candidate}' is denied"),
        };

        return RouteExplanation {
            requested: pathname.to_string(),
            normalized: normalized.clone(),
            allowed,
            matched: Some(candidate.to_string()),
            candidates,
            reason,
        };
    }

    RouteExplanation {
        requested: pathname.to_string(),
        reason: format!("no entry for '{normalized}' or any ancestor; denied by default"),
        normalized,
        allowed: false,
        matched: None,
        candidates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::{PermissionEntry, flatten};
    use proptest::prelude::*;

    fn map_of(entries: &[(&str, bool)]) -> PermissionMap {
        entries
            .iter()
            .map(|(p, a)| (p.to_string(), *a))
            .collect()
    }

    #[test]
    fn query_strings_are_ignored() {
        let map = flatten(&[PermissionEntry::new("/dashboard/orders", true)]);
        assert!(is_allowed("/dashboard/orders?x=1", &map));
    }

    #[test]
    fn walks_up_to_closest_ancestor() {
        let map = map_of(&[("/dashboard", true)]);
        assert!(is_allowed("/dashboard/orders/123", &map));
    }

    #[test]
    fn closest_ancestor_wins_over_farther_one() {
        let map = map_of(&[("/dashboard", true), ("/dashboard/mitarbeiter", false)]);
        assert!(!is_allowed("/dashboard/mitarbeiter/42/edit", &map));
        assert!(is_allowed("/dashboard/kunden/42", &map));
    }

    #[test]
    fn exact_denial_is_not_overridden_by_allowed_ancestor() {
        let map = map_of(&[("/dashboard", true), ("/dashboard/blogs", false)]);
        assert!(!is_allowed("/dashboard/blogs/", &map));
    }

    #[test]
    fn root_entry_covers_everything_below() {
        let map = map_of(&[("/", true)]);
        assert!(is_allowed("/dashboard/lager", &map));
    }

    #[test]
    fn empty_map_denies() {
        let map = PermissionMap::new();
        assert!(!is_allowed("/dashboard", &map));
        assert!(!is_allowed("/", &map));
    }

    #[test]
    fn explanation_names_matching_ancestor() {
        let map = map_of(&[("/dashboard", true)]);
        let explanation = explain_route("/dashboard/orders/123?tab=2", &map);

        assert!(explanation.allowed);
        assert_eq!(explanation.normalized, "/dashboard/orders/123");
        assert_eq!(explanation.matched.as_deref(), Some("/dashboard"));
        assert_eq!(
            explanation.candidates,
            vec!["/dashboard/orders/123", "/dashboard/orders", "/dashboard"]
        );
    }

    #[test]
    fn explanation_for_fail_closed_has_no_match() {
        let explanation = explain_route("/dashboard/orders", &PermissionMap::new());

        assert!(!explanation.allowed);
        assert_eq!(explanation.matched, None);
        assert_eq!(explanation.candidates.len(), 3);
        assert!(explanation.reason.contains("denied by default"));
    }

    proptest! {
        /// Property: an empty map denies every path.
        #[test]
        fn empty_map_fails_closed(p in ".*") {
            prop_assert!(!is_allowed(&p, &PermissionMap::new()));
        }

        /// Property: the explanation and the plain check always agree.
        #[test]
        fn explanation_agrees_with_check(
            p in "/[a-z/]{0,30}",
            entries in prop::collection::vec(("/[a-z/]{0,12}", any::<bool>()), 0..8),
        ) {
            let map: PermissionMap = entries.into_iter().collect();
            prop_assert_eq!(explain_route(&p, &map).allowed, is_allowed(&p, &map));
        }
    }
}
