use std::env;

use serde::{Deserialize, Serialize};

use crate::client::WarehouseError;

/// Default catalog and schema names for the yard-administration warehouse.
const DEFAULT_CATALOG: &str = "prd_medallion";
const DEFAULT_SCHEMA: &str = "ds_bdanntp2_cancha_adm";
const DEFAULT_LINK_SCHEMA: &str = "ds_bdanntp2_usr_dblink";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Catalogs ─────────────────────────────────────────────────────

/// Catalog and schema names interpolated into the fixed query templates.
///
/// Table identifiers are trusted configuration, never user input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalogs {
    /// Unity catalog name (rendered backtick-quoted in SQL).
    pub catalog: String,
    /// Main yard-administration schema.
    pub schema: String,
    /// Secondary dblink schema (container lookups live here).
    pub link_schema: String,
}

// ── WarehouseConfig ──────────────────────────────────────────────

/// Configuration for the Databricks SQL warehouse connection.
///
/// The hostname / HTTP path / access token triple is required; startup must
/// abort when any of them is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Workspace hostname, e.g. `adb-1234.5.azuredatabricks.net`.
    pub server_hostname: String,
    /// Warehouse HTTP path, e.g. `/sql/1.0/warehouses/abc123`.
    pub http_path: String,
    /// Personal access token used as bearer auth.
    pub access_token: String,
    /// Catalog/schema names for query templates.
    pub catalogs: Catalogs,
    /// Statement timeout in seconds.
    pub timeout_seconds: u32,
}

impl WarehouseConfig {
    /// Build config from environment variables (call [`load_dotenv`] first).
    ///
    /// Returns [`WarehouseError::MissingConfig`] naming every absent required
    /// key so a misconfigured deployment fails with one actionable message.
    pub fn from_env() -> Result<Self, WarehouseError> {
        let server_hostname = env_opt("DATABRICKS_SERVER_HOSTNAME");
        let http_path = env_opt("DATABRICKS_HTTP_PATH");
        let access_token = env_opt("DATABRICKS_ACCESS_TOKEN");

        let mut missing = Vec::new();
        if server_hostname.is_none() {
            missing.push("DATABRICKS_SERVER_HOSTNAME");
        }
        if http_path.is_none() {
            missing.push("DATABRICKS_HTTP_PATH");
        }
        if access_token.is_none() {
            missing.push("DATABRICKS_ACCESS_TOKEN");
        }
        if !missing.is_empty() {
            return Err(WarehouseError::MissingConfig(missing.join(", ")));
        }

        Ok(Self {
            server_hostname: server_hostname.unwrap_or_default(),
            http_path: http_path.unwrap_or_default(),
            access_token: access_token.unwrap_or_default(),
            catalogs: Catalogs {
                catalog: env_or("DATABRICKS_CATALOG", DEFAULT_CATALOG),
                schema: env_or("DATABRICKS_SCHEMA", DEFAULT_SCHEMA),
                link_schema: env_or("DATABRICKS_LINK_SCHEMA", DEFAULT_LINK_SCHEMA),
            },
            timeout_seconds: env_u32("DATABRICKS_TIMEOUT_SECONDS", 300),
        })
    }

    /// Warehouse ID: the last segment of the HTTP path
    /// (`/sql/1.0/warehouses/<id>`), required by the statement API.
    pub fn warehouse_id(&self) -> &str {
        self.http_path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or("")
    }
}

// ── Tests ────────────────────────────────────────────────────────
