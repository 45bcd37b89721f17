//! Owner of the loaded feature-access list.
//!
//! One context per logged-in session. Guards read the current set; only the
//! context writes it. Every successful load rebuilds the lookup map and the
//! cookie snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Mutex;

use orthodash_auth::{FeatureSnapshot, PermissionEntry, PermissionSet};

use crate::api::{FeatureAccessSource, FetchError};
use crate::config::RetryPolicy;

#[derive(Debug, Error)]
#[error("feature access unavailable after {attempts} attempt(s): {last}")]
pub struct RefreshError {
    pub attempts: u32,
    #[source]
    pub last: FetchError,
}

pub struct FeatureAccessContext {
    source: Arc<dyn FeatureAccessSource>,
    current: RwLock<Option<Arc<PermissionSet>>>,
    cookie: RwLock<Option<String>>,
    /// Serializes refreshes; callers that waited reuse the winner's result.
    refresh_lock: Mutex<()>,
    generation: AtomicU64,
}

impl core::fmt::Debug for FeatureAccessContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FeatureAccessContext")
            .field("loaded", &self.permissions().is_some())
            .field("generation", &self.generation.load(Ordering::Acquire))
            .finish()
    }
}

impl FeatureAccessContext {
    pub fn new(source: Arc<dyn FeatureAccessSource>) -> Self {
        Self {
            source,
            current: RwLock::new(None),
            cookie: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Currently loaded set, if any load has succeeded.
    pub fn permissions(&self) -> Option<Arc<PermissionSet>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `Set-Cookie` value mirroring the current set.
    pub fn set_cookie_header(&self) -> Option<String> {
        self.cookie
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of successful loads so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Fetch once and install the result.
    ///
    /// Concurrent callers are serialized: whoever waited on an in-flight
    /// refresh that succeeded gets that result instead of fetching again;
    /// after a failed one the waiter fetches itself.
    /// An empty list counts as a failure.
    pub async fn refresh(&self) -> Result<Arc<PermissionSet>, FetchError> {
        let observed = self.generation();
        let _in_flight = self.refresh_lock.lock().await;

        if self.generation() != observed {
            if let Some(set) = self.permissions() {
                tracing::debug!("reusing concurrent feature access refresh");
                return Ok(set);
            }
        }

        let entries = self.source.fetch_features().await?;
        if entries.is_empty() {
            return Err(FetchError::Empty);
        }

        Ok(self.install(entries, Utc::now()))
    }

    /// [`refresh`](Self::refresh) with bounded exponential backoff.
    pub async fn refresh_with_retry(&self, policy: &RetryPolicy) -> Result<Arc<PermissionSet>, RefreshError> {
        let mut attempt = 1;
        loop {
            match self.refresh().await {
                Ok(set) => return Ok(set),
                Err(e) if attempt < policy.max_attempts && e.is_retryable() => {
                    let delay = policy.delay_before(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts = policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "feature access load failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(attempts = attempt, error = %e, "feature access load failed");
                    return Err(RefreshError { attempts: attempt, last: e });
                }
            }
        }
    }

    /// Replace the current set, e.g. from a decoded cookie snapshot.
    pub fn install(&self, entries: Vec<PermissionEntry>, updated_at: DateTime<Utc>) -> Arc<PermissionSet> {
        let set = Arc::new(PermissionSet::new(entries));

        let cookie = match FeatureSnapshot::from_set(&set, updated_at).set_cookie_header() {
            Ok(header) => Some(header),
            Err(e) => {
                tracing::warn!(error = %e, "could not encode feature access cookie");
                None
            }
        };

        *self.cookie.write().unwrap_or_else(PoisonError::into_inner) = cookie;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(set.clone());
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        tracing::info!(
            features = set.entries().len(),
            routes = set.map().len(),
            generation,
            "feature access loaded"
        );
        set
    }

    /// Forget the loaded set (logout). Returns the cookie-clearing header.
    pub fn clear(&self) -> String {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        *self.cookie.write().unwrap_or_else(PoisonError::into_inner) = None;
        FeatureSnapshot::clear_cookie_header()
    }
}
