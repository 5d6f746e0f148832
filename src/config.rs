//! Command-line and environment configuration of both binaries.

use crate::protocol::AgentDescriptor;
use crate::records::domain::{ExpiryExtension, ExpiryUnit, RecordDomainError};
use crate::vendor::domain::{Vendor, VendorSettings};
use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Central router: agent registry, record store and client API.
#[derive(Parser, Debug, Clone)]
#[command(name = "dbfleet-server", author, version, about, long_about = None)]
pub struct ServerConfig {
    /// Address the HTTP API listens on
    #[arg(long, default_value = "0.0.0.0:7010", env = "DBFLEET_BIND")]
    pub bind: SocketAddr,

    /// PostgreSQL URL of the record store; records stay in memory when unset
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Seconds between expiry sweeps
    #[arg(long, default_value_t = 86_400, env = "DBFLEET_SWEEP_INTERVAL")]
    pub sweep_interval_secs: u64,

    /// Seconds between agent heartbeat probes
    #[arg(long, default_value_t = 60, env = "DBFLEET_LIVENESS_INTERVAL")]
    pub liveness_interval_secs: u64,

    /// Consecutive missed heartbeats before an agent is evicted
    #[arg(long, default_value_t = 3, env = "DBFLEET_EVICTION_THRESHOLD")]
    pub eviction_threshold: u32,

    /// Lifetime of a new database, in months
    #[arg(long, default_value_t = 1, env = "DBFLEET_RECORD_LIFETIME_MONTHS")]
    pub record_lifetime_months: u32,

    /// Timeout of calls to agents, in seconds
    #[arg(long, default_value_t = 60, env = "DBFLEET_AGENT_TIMEOUT")]
    pub agent_timeout_secs: u64,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info", env = "DBFLEET_LOG_LEVEL")]
    pub log_level: String,
}

impl ServerConfig {
    /// Returns the expiry sweep period.
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Returns the heartbeat probe period.
    #[must_use]
    pub const fn liveness_interval(&self) -> Duration {
        Duration::from_secs(self.liveness_interval_secs)
    }

    /// Returns the agent call timeout.
    #[must_use]
    pub const fn agent_timeout(&self) -> Duration {
        Duration::from_secs(self.agent_timeout_secs)
    }

    /// Returns the lifetime of new records.
    ///
    /// # Errors
    ///
    /// Returns [`RecordDomainError`] when the configured lifetime is zero.
    pub const fn record_lifetime(&self) -> Result<ExpiryExtension, RecordDomainError> {
        ExpiryExtension::new(self.record_lifetime_months, ExpiryUnit::Months)
    }
}

/// Agent: fronts one database server for the router.
#[derive(Parser, Debug, Clone)]
#[command(name = "dbfleet-agent", author, version, about, long_about = None)]
pub struct AgentConfig {
    /// Database vendor (mysql, postgres, oracle, mssql)
    #[arg(long, env = "DBFLEET_VENDOR")]
    pub vendor: Vendor,

    /// Vendor client executable (mysql, psql, sqlplus, sqlcmd)
    #[arg(long, env = "DBFLEET_EXECUTABLE")]
    pub executable: PathBuf,

    /// Database server host
    #[arg(long, default_value = "127.0.0.1", env = "DBFLEET_DB_HOST")]
    pub db_host: String,

    /// Database server port
    #[arg(long, env = "DBFLEET_DB_PORT")]
    pub db_port: u16,

    /// Administrative database user
    #[arg(long, env = "DBFLEET_DB_USER")]
    pub db_user: String,

    /// Administrative database password
    #[arg(long, env = "DBFLEET_DB_PASSWORD", hide_env_values = true)]
    pub db_password: String,

    /// Oracle SID or service name
    #[arg(long, env = "DBFLEET_DB_SID")]
    pub sid: Option<String>,

    /// Directory Oracle places new datafiles in
    #[arg(long, env = "DBFLEET_DATAFILE_DIR")]
    pub datafile_dir: Option<String>,

    /// Directory holding the vendor SQL scripts
    #[arg(long, default_value = "./sql", env = "DBFLEET_SCRIPT_DIR")]
    pub script_dir: PathBuf,

    /// Unique short name registered with the router
    #[arg(long, env = "DBFLEET_SHORT_NAME")]
    pub short_name: String,

    /// Display name; defaults to the vendor and version
    #[arg(long, env = "DBFLEET_LONG_NAME")]
    pub long_name: Option<String>,

    /// Base URL of the router
    #[arg(long, default_value = "http://127.0.0.1:7010", env = "DBFLEET_SERVER_URL")]
    pub server_url: String,

    /// Address the router should call back; the router uses the observed
    /// peer address when unset
    #[arg(long, env = "DBFLEET_ADVERTISED_ADDRESS")]
    pub advertised_address: Option<String>,

    /// Host clients use to reach the database; defaults to the database host
    #[arg(long, env = "DBFLEET_PUBLIC_DB_HOST")]
    pub public_db_host: Option<String>,

    /// Interface the agent's HTTP API listens on
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED), env = "DBFLEET_LISTEN_HOST")]
    pub listen_host: IpAddr,

    /// Port the agent's HTTP API listens on
    #[arg(long, default_value_t = 7020, env = "DBFLEET_PORT")]
    pub port: u16,

    /// Directory for downloaded and extracted dumps
    #[arg(long, default_value = "./dumps", env = "DBFLEET_SCRATCH_DIR")]
    pub scratch_dir: PathBuf,

    /// Concurrent imports
    #[arg(long, default_value_t = 2, env = "DBFLEET_IMPORT_WORKERS")]
    pub import_workers: usize,

    /// Imports that may wait for a worker
    #[arg(long, default_value_t = 16, env = "DBFLEET_IMPORT_QUEUE")]
    pub import_queue: usize,

    /// Seconds between registration refreshes
    #[arg(long, default_value_t = 60, env = "DBFLEET_KEEPALIVE_INTERVAL")]
    pub keepalive_interval_secs: u64,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info", env = "DBFLEET_LOG_LEVEL")]
    pub log_level: String,
}

impl AgentConfig {
    /// Returns the administrative connection settings.
    #[must_use]
    pub fn vendor_settings(&self) -> VendorSettings {
        VendorSettings {
            executable: self.executable.clone(),
            host: self.db_host.clone(),
            port: self.db_port,
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            sid: self.sid.clone(),
            datafile_dir: self.datafile_dir.clone(),
            script_dir: self.script_dir.clone(),
        }
    }

    /// Returns the descriptor registered with the router for a database
    /// server reporting `version`.
    #[must_use]
    pub fn descriptor(&self, version: &str) -> AgentDescriptor {
        AgentDescriptor {
            identifier: format!("{}-{version}-{}", self.vendor, self.short_name),
            vendor: self.vendor,
            db_port: self.db_port.to_string(),
            db_address: self
                .public_db_host
                .clone()
                .unwrap_or_else(|| self.db_host.clone()),
            db_sid: self.sid.clone().unwrap_or_default(),
            short_name: self.short_name.clone(),
            long_name: self
                .long_name
                .clone()
                .unwrap_or_else(|| format!("{} {version}", self.vendor)),
            version: version.to_owned(),
            port: self.port.to_string(),
            address: self.advertised_address.clone().unwrap_or_default(),
            up: true,
        }
    }

    /// Returns the socket address the HTTP API binds.
    #[must_use]
    pub const fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_host, self.port)
    }

    /// Returns the registration refresh period.
    #[must_use]
    pub const fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_secs)
    }
}
