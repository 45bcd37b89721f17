//! `orthodash-client`
//!
//! **Responsibility:** client-side route protection for the dashboard.
//!
//! This crate provides:
//! - The feature-access endpoint client
//! - Session storage (token, employee-login flag)
//! - The feature-access context that owns the loaded permissions
//! - The route guard state machine
//!
//! Permission logic itself lives in `orthodash-auth`.

pub mod api;
pub mod config;
pub mod context;
pub mod guard;
pub mod session;

pub use api::{FeatureAccessResponse, FeatureAccessSource, FetchError, HttpFeatureAccessClient};
pub use config::{ClientConfig, ConfigError, RetryPolicy};
pub use context::{FeatureAccessContext, RefreshError};
pub use guard::{GuardFailure, GuardState, GuardView, Navigator, RecordingNavigator, RouteGuard};
pub use session::{InMemorySessionStore, SessionStore};
