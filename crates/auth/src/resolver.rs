//! Landing-route selection when the requested route is denied.

use crate::path::normalize;
use crate::permissions::PermissionEntry;
use crate::principal::PrincipalMode;

/// Preferred landing page, and the fallback of last resort.
pub const DASHBOARD_ROUTE: &str = "/dashboard";

/// Pick the route to send a principal to.
///
/// 1. `/dashboard`, if it is an allowed top-level entry.
/// 2. Otherwise the first allowed top-level entry, in list order.
/// 3. Otherwise `/dashboard`, which is not guaranteed to be allowed.
///
/// Nested entries are not considered. `mode` does not influence the result.
pub fn first_allowed_route(entries: &[PermissionEntry], mode: PrincipalMode) -> &str {
    let preferred = entries
        .iter()
        .any(|e| e.action && normalize(&e.path) == DASHBOARD_ROUTE);

    let route = if preferred {
        DASHBOARD_ROUTE
    } else {
        entries
            .iter()
            .find(|e| e.action)
            .map(|e| e.path.as_str())
            .unwrap_or(DASHBOARD_ROUTE)
    };

    tracing::debug!(%mode, route, "resolved landing route");
    route
}
