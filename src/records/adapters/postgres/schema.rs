//! Diesel schema for provisioning record persistence.

diesel::table! {
    /// Databases handed out to clients.
    provisioning_records (id) {
        /// Store-assigned identifier.
        id -> Int8,
        /// Vendor name (`mysql`, `postgres`, `oracle`, `mssql`).
        #[max_length = 20]
        vendor -> Varchar,
        /// Database name.
        #[max_length = 128]
        database_name -> Varchar,
        /// Owning user.
        #[max_length = 128]
        database_user -> Varchar,
        /// Owning user's password.
        database_password -> Text,
        /// Oracle SID.
        #[max_length = 64]
        sid -> Varchar,
        /// Dump location used for imports.
        dump_location -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Expiry timestamp.
        expires_at -> Timestamptz,
        /// Creator identity.
        #[max_length = 255]
        creator -> Varchar,
        /// Hosting agent short name.
        #[max_length = 100]
        agent_name -> Varchar,
        /// Database host.
        #[max_length = 255]
        database_address -> Varchar,
        /// Database port.
        #[max_length = 16]
        database_port -> Varchar,
        /// Numeric status code.
        status -> Int4,
        /// Latest status message.
        message -> Text,
        /// Visibility (`0` private, `1` public).
        visibility -> Int2,
    }
}

diesel::table! {
    /// Applied schema migrations.
    schema_versions (version) {
        /// One-based migration number.
        version -> Int4,
        /// Migration summary.
        description -> Text,
        /// Time the migration committed.
        applied_at -> Timestamptz,
    }
}
