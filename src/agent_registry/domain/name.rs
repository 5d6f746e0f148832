//! Validated agent short name.

use super::AgentDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_NAME_LENGTH: usize = 100;

/// Unique, human-chosen agent key such as `mysql-8` or `pg16.eu`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortName(String);

impl ShortName {
    /// Creates a validated short name.
    ///
    /// The input is trimmed and lowercased.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::EmptyShortName`],
    /// [`AgentDomainError::InvalidShortName`] or
    /// [`AgentDomainError::ShortNameTooLong`] for unusable input.
    pub fn new(value: impl Into<String>) -> Result<Self, AgentDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(AgentDomainError::EmptyShortName);
        }
        if normalized.len() > MAX_NAME_LENGTH {
            return Err(AgentDomainError::ShortNameTooLong(raw));
        }
        let is_valid = normalized
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.'));
        if !is_valid {
            return Err(AgentDomainError::InvalidShortName(raw));
        }

        Ok(Self(normalized))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ShortName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ShortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ShortName {
    type Error = AgentDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShortName> for String {
    fn from(value: ShortName) -> Self {
        value.0
    }
}
