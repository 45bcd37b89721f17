//! `orthodash-auth` — route permission resolution for the dashboard.
//!
//! Pure logic: no HTTP, no storage. Given the feature-access list served by
//! the backend this crate answers "may this route be opened?" and "where
//! should the user land instead?".

pub mod authorize;
pub mod path;
pub mod permissions;
pub mod principal;
pub mod resolver;
pub mod set;
pub mod snapshot;

pub use authorize::{RouteExplanation, explain_route, is_allowed};
pub use path::normalize;
pub use permissions::{NestedPermission, PermissionEntry, PermissionMap, flatten};
pub use principal::PrincipalMode;
pub use resolver::{DASHBOARD_ROUTE, first_allowed_route};
pub use set::PermissionSet;
pub use snapshot::{FEATURE_COOKIE_NAME, FeatureSnapshot, SnapshotError};
