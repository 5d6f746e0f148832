//! Record visibility.

use super::ParseVisibilityError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who may see a record besides its creator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Only the creator.
    #[default]
    Private,
    /// Everyone.
    Public,
}

impl Visibility {
    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
        }
    }

    /// Returns the storage representation: 0 private, 1 public.
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::Private => 0,
            Self::Public => 1,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Visibility {
    type Error = ParseVisibilityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "private" | "0" => Ok(Self::Private),
            "public" | "1" => Ok(Self::Public),
            _ => Err(ParseVisibilityError(value.to_owned())),
        }
    }
}

impl TryFrom<i16> for Visibility {
    type Error = ParseVisibilityError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Private),
            1 => Ok(Self::Public),
            other => Err(ParseVisibilityError(other.to_string())),
        }
    }
}
