//! Session storage: the auth token and the employee-login flag.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use orthodash_auth::PrincipalMode;

pub const TOKEN_KEY: &str = "token";
pub const EMPLOYEE_LOGIN_KEY: &str = "isEmployeeLogin";

/// Synchronous key/value session storage.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);

    fn token(&self) -> Option<String> {
        self.get(TOKEN_KEY).filter(|t| !t.trim().is_empty())
    }

    fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    fn principal_mode(&self) -> PrincipalMode {
        PrincipalMode::from_employee_flag(self.get(EMPLOYEE_LOGIN_KEY).as_deref())
    }

    fn login(&self, token: &str, mode: PrincipalMode) {
        self.set(TOKEN_KEY, token);
        self.set(EMPLOYEE_LOGIN_KEY, if mode.is_employee() { "true" } else { "false" });
    }

    fn logout(&self) {
        self.remove(TOKEN_KEY);
        self.remove(EMPLOYEE_LOGIN_KEY);
    }
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: Mutex<HashMap<String, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries().remove(key);
    }
}
