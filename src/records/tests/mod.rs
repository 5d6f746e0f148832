//! Tests for provisioning records and the record store.


use crate::records::domain::{ProvisioningRecord, RecordFields, Visibility};
use crate::status::StatusCode;
use crate::vendor::domain::Vendor;
use chrono::{Duration, Utc};

pub(super) fn fields(creator: &str, visibility: Visibility) -> RecordFields {
    let created_at = Utc::now();
    RecordFields {
        vendor: Vendor::Postgres,
        database_name: "shop".to_owned(),
        database_user: "shop".to_owned(),
        database_password: "secret".to_owned(),
        sid: String::new(),
        dump_location: String::new(),
        created_at,
        expires_at: created_at + Duration::days(90),
        creator: creator.to_owned(),
        agent_name: "pg-16".to_owned(),
        database_address: "db.internal".to_owned(),
        database_port: "5432".to_owned(),
        status: StatusCode::SUCCESS,
        message: "created".to_owned(),
        visibility,
    }
}

pub(super) fn record(creator: &str, visibility: Visibility) -> ProvisioningRecord {
    ProvisioningRecord::new(fields(creator, visibility)).expect("valid record")
}
