use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which kind of account is logged in.
///
/// Partners are the business accounts (shop owners); employees are
/// sub-accounts scoped to a partner. Both go through the same route
/// permission mechanism.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalMode {
    #[default]
    Partner,
    Employee,
}

impl PrincipalMode {
    /// Interpret the session flag that marks employee logins.
    ///
    /// Only the literal `"true"` selects employee mode; anything else,
    /// including a missing flag, is a partner session.
    pub fn from_employee_flag(flag: Option<&str>) -> Self {
        match flag.map(str::trim) {
            Some("true") => Self::Employee,
            _ => Self::Partner,
        }
    }

    pub fn is_employee(&self) -> bool {
        matches!(self, Self::Employee)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Partner => "partner",
            Self::Employee => "employee",
        }
    }
}

impl core::fmt::Display for PrincipalMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown principal mode '{0}'")]
pub struct UnknownPrincipalMode(String);

impl FromStr for PrincipalMode {
    type Err = UnknownPrincipalMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "partner" => Ok(Self::Partner),
            "employee" => Ok(Self::Employee),
            other => Err(UnknownPrincipalMode(other.to_string())),
        }
    }
}
