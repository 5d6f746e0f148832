//! Record domain types.

mod error;
mod expiry;
mod ids;
mod record;
mod visibility;

pub use error::{ParseExpiryUnitError, ParseVisibilityError, RecordDomainError};
pub use expiry::{ExpiryExtension, ExpiryUnit};
pub use ids::RecordId;
pub use record::{ProvisioningRecord, RecordFields};
pub use visibility::Visibility;
