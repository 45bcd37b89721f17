//! Cookie mirror of the feature-access list.
//!
//! Edge middleware cannot reach the in-memory permission set, so a snapshot
//! is written to a cookie after every successful load. The cookie lives for
//! seven days regardless of the in-memory copy; `updatedAt` lets readers
//! judge how old it is.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::permissions::PermissionEntry;
use crate::set::PermissionSet;

pub const FEATURE_COOKIE_NAME: &str = "featureAccess";

/// Seven days, in seconds.
pub const FEATURE_COOKIE_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSnapshot {
    pub features: Vec<PermissionEntry>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("cookie value is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("snapshot JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
}

impl FeatureSnapshot {
    pub fn new(features: Vec<PermissionEntry>, updated_at: DateTime<Utc>) -> Self {
        Self { features, updated_at }
    }

    pub fn from_set(set: &PermissionSet, updated_at: DateTime<Utc>) -> Self {
        Self::new(set.entries().to_vec(), updated_at)
    }

    /// Cookie-safe value: base64url (no padding) of the JSON snapshot.
    pub fn encode(&self) -> Result<String, SnapshotError> {
        let json = serde_json::to_vec(self)?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    pub fn decode(value: &str) -> Result<Self, SnapshotError> {
        let json = URL_SAFE_NO_PAD.decode(value.trim())?;
        Ok(serde_json::from_slice(&json)?)
    }

    /// Full `Set-Cookie` header value.
    pub fn set_cookie_header(&self) -> Result<String, SnapshotError> {
        Ok(format!(
            "{FEATURE_COOKIE_NAME}={}; Path=/; Max-Age={FEATURE_COOKIE_MAX_AGE_SECS}; SameSite=Lax",
            self.encode()?
        ))
    }

    /// `Set-Cookie` header value that removes the snapshot (logout).
    pub fn clear_cookie_header() -> String {
        format!("{FEATURE_COOKIE_NAME}=; Path=/; Max-Age=0; SameSite=Lax")
    }

    /// Find and decode the snapshot in a request `Cookie` header.
    ///
    /// Returns `Ok(None)` when the cookie is absent or empty.
    pub fn from_cookie_header(header: &str) -> Result<Option<Self>, SnapshotError> {
        let value = header.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == FEATURE_COOKIE_NAME).then_some(value)
        });

        match value {
            Some(v) if !v.trim().is_empty() => Self::decode(v).map(Some),
            _ => Ok(None),
        }
    }

    /// The cookie would have expired by `now`.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now >= self.updated_at + Duration::seconds(FEATURE_COOKIE_MAX_AGE_SECS)
    }

    pub fn to_permission_set(&self) -> PermissionSet {
        PermissionSet::new(self.features.clone())
    }
}
