//! Canonical route keys.

/// Root route; every path that strips down to nothing normalizes to this.
pub const ROOT: &str = "/";

/// Normalize a route path into the key used for permission lookups.
///
/// - Everything from the first `?` or `#` is dropped.
/// - Trailing `/` characters are stripped (repeatedly).
/// - A path that ends up empty becomes `/`.
pub fn normalize(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');

    if trimmed.is_empty() {
        ROOT.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Iterate a normalized path and its ancestors, closest first.
///
/// `/dashboard/orders/123` yields `/dashboard/orders/123`, `/dashboard/orders`,
/// `/dashboard`, `/`. Relative paths stop at their first segment.
pub fn ancestors(normalized: &str) -> Ancestors<'_> {
    Ancestors {
        next: Some(normalized),
    }
}

#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    next: Option<&'a str>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = match current.rfind('/') {
            Some(0) if current != ROOT => Some(ROOT),
            Some(0) => None,
            Some(idx) => Some(&current[..idx]),
            None => None,
        };
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_query_and_fragment() {
        assert_eq!(normalize("/dashboard/orders?page=2"), "/dashboard/orders");
        assert_eq!(normalize("/dashboard/orders#top"), "/dashboard/orders");
        assert_eq!(normalize("/dashboard/orders/#x?y"), "/dashboard/orders");
    }

    #[test]
    fn strips_repeated_trailing_slashes() {
        assert_eq!(normalize("/dashboard/kunden///"), "/dashboard/kunden");
    }

    #[test]
    fn root_and_empty_collapse_to_root() {
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("///"), "/");
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("?tab=1"), "/");
    }

    #[test]
    fn ancestors_walk_up_to_root() {
        let walked: Vec<&str> = ancestors("/dashboard/orders/123").collect();
        assert_eq!(
            walked,
            vec!["/dashboard/orders/123", "/dashboard/orders", "/dashboard", "/"]
        );
    }

    #[test]
    fn ancestors_of_root_is_root_only() {
        let walked: Vec<&str> = ancestors("/").collect();
        assert_eq!(walked, vec!["/"]);
    }

    #[test]
    fn ancestors_of_relative_path_stop_at_first_segment() {
        let walked: Vec<&str> = ancestors("dashboard/einlagen").collect();
        assert_eq!(walked, vec!["dashboard/einlagen", "dashboard"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: a trailing slash never changes the normalized key.
        #[test]
        fn trailing_slash_is_insignificant(p in ".*") {
            let with_slash = format!("{p}/");
            prop_assert_eq!(normalize(&p), normalize(&with_slash));
        }

        /// Property: normalization is idempotent.
        #[test]
        fn normalize_is_idempotent(p in "[/a-z0-9?#=&-]{0,40}") {
            let once = normalize(&p);
            prop_assert_eq!(normalize(&once), once.clone());
        }

        /// Property: the last ancestor of an absolute path is the root.
        #[test]
        fn absolute_paths_end_at_root(segments in prop::collection::vec("[a-z0-9]{1,8}", 0..6)) {
            let path = format!("/{}", segments.join("/"));
            let key = normalize(&path);
            prop_assert_eq!(ancestors(&key).last(), Some(ROOT));
        }
    }
}
