//! Client-facing request and response bodies.

use crate::records::domain::{ProvisioningRecord, Visibility};
use crate::vendor::domain::Vendor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of a create or import request.
///
/// Empty credentials are generated by the router; an empty database name
/// defaults to the user name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRequest {
    /// Short name of the agent to provision on.
    #[serde(default)]
    pub agent_identifier: String,
    /// Requested database name.
    #[serde(default)]
    pub database_name: String,
    /// Requested owner.
    #[serde(default)]
    pub username: String,
    /// Requested owner password.
    #[serde(default)]
    pub password: String,
    /// Dump to import; required for imports only.
    #[serde(default, rename = "dumpfile_location")]
    pub dump_location: String,
    /// Initial visibility, private when absent.
    #[serde(default)]
    pub visibility: Visibility,
}

/// Connection details for a provisioned database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AccessInfo {
    /// JDBC driver class.
    pub jdbc_driver: String,
    /// JDBC connection URL.
    pub jdbc_url: String,
    /// Database user.
    pub user: String,
    /// Database password.
    pub password: String,
    /// `host:port` of the database server.
    pub url: String,
}

impl AccessInfo {
    /// Derives connection details from a record.
    #[must_use]
    pub fn for_record(record: &ProvisioningRecord) -> Self {
        let fields = record.fields();
        let host = &fields.database_address;
        let port = &fields.database_port;
        let name = &fields.database_name;
        let (driver, jdbc_url) = match fields.vendor {
            Vendor::Mysql => (
                "com.mysql.cj.jdbc.Driver",
                format!(
                    "jdbc:mysql://{host}:{port}/{name}?characterEncoding=UTF-8&useUnicode=true"
                ),
            ),
            Vendor::Postgres => (
                "org.postgresql.Driver",
                format!("jdbc:postgresql://{host}:{port}/{name}"),
            ),
            Vendor::Oracle => (
                "oracle.jdbc.OracleDriver",
                format!("jdbc:oracle:thin:@{host}:{port}:{}", fields.sid),
            ),
            Vendor::Mssql => (
                "com.microsoft.sqlserver.jdbc.SQLServerDriver",
                format!("jdbc:sqlserver://{host}:{port};databaseName={name}"),
            ),
        };
        Self {
            jdbc_driver: driver.to_owned(),
            jdbc_url,
            user: fields.database_user.clone(),
            password: fields.database_password.clone(),
            url: format!("{host}:{port}"),
        }
    }
}

/// Whether the router and each agent can be restarted without cutting an
/// import short.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartReport {
    /// `true` when no import is in progress anywhere.
    pub server: bool,
    /// Imports in progress per registered agent.
    pub agents: BTreeMap<String, usize>,
}
