//! Tests for agent registration and liveness.

mod liveness_tests;
mod registration_tests;
mod registry_tests;

use crate::protocol::AgentDescriptor;
use crate::vendor::domain::Vendor;

pub(super) fn descriptor(short_name: &str) -> AgentDescriptor {
    AgentDescriptor {
        identifier: format!("mysql-8.0-{short_name}"),
        vendor: Vendor::Mysql,
        db_port: "3306".to_owned(),
        db_address: "db.internal".to_owned(),
        db_sid: String::new(),
        short_name: short_name.to_owned(),
        long_name: format!("MySQL agent {short_name}"),
        version: "8.0.33".to_owned(),
        port: "7020".to_owned(),
        address: String::new(),
        up: true,
    }
}
