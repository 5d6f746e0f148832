//! Expiry extension requests.

use super::{ParseExpiryUnitError, RecordDomainError};
use chrono::{DateTime, Days, Months, Utc};
use std::fmt;

/// Calendar unit an expiry is extended by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpiryUnit {
    /// Calendar days.
    Days,
    /// Calendar months.
    Months,
    /// Calendar years.
    Years,
}

impl ExpiryUnit {
    /// Returns the canonical plural name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Months => "months",
            Self::Years => "years",
        }
    }
}

impl fmt::Display for ExpiryUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ExpiryUnit {
    type Error = ParseExpiryUnitError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "d" | "day" | "days" => Ok(Self::Days),
            "m" | "month" | "months" => Ok(Self::Months),
            "y" | "year" | "years" => Ok(Self::Years),
            _ => Err(ParseExpiryUnitError(value.to_owned())),
        }
    }
}

/// A requested extension such as "2 months".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryExtension {
    amount: u32,
    unit: ExpiryUnit,
}

impl ExpiryExtension {
    /// One calendar month, the default lifetime of a new record.
    pub const ONE_MONTH: Self = Self {
        amount: 1,
        unit: ExpiryUnit::Months,
    };

    /// Creates an extension.
    ///
    /// # Errors
    ///
    /// Returns [`RecordDomainError::EmptyExtension`] when `amount` is zero.
    pub const fn new(amount: u32, unit: ExpiryUnit) -> Result<Self, RecordDomainError> {
        if amount == 0 {
            return Err(RecordDomainError::EmptyExtension);
        }
        Ok(Self { amount, unit })
    }

    /// Returns `from` moved forward by this extension. Month arithmetic
    /// clamps to the end of shorter months.
    ///
    /// # Errors
    ///
    /// Returns [`RecordDomainError::ExpiryOutOfRange`] on calendar overflow.
    pub fn apply(self, from: DateTime<Utc>) -> Result<DateTime<Utc>, RecordDomainError> {
        let moved = match self.unit {
            ExpiryUnit::Days => from.checked_add_days(Days::new(u64::from(self.amount))),
            ExpiryUnit::Months => from.checked_add_months(Months::new(self.amount)),
            ExpiryUnit::Years => self
                .amount
                .checked_mul(12)
                .and_then(|months| from.checked_add_months(Months::new(months))),
        };
        moved.ok_or(RecordDomainError::ExpiryOutOfRange)
    }
}
