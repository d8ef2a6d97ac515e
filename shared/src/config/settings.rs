use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Process-wide configuration, loaded once at startup and re-read only on
/// restart. Values layer as: config/default.toml, config/<environment>.toml,
/// then HEIMDALL_-prefixed environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub jwt: JwtConfig,
    pub idp: IdpConfig,
    pub engine: EngineConfig,
    pub object_store: ObjectStoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    /// "development" or "production"; affects log verbosity and format.
    pub environment: String,
    /// CORS allowlist.
    pub allowed_origins: Vec<String>,
    /// Per-IP request ceiling over a one-minute tumbling window.
    pub rate_limit_per_minute: u32,
    /// IPs that trigger a mandatory global deny in the decision pipeline.
    pub ip_denylist: Vec<String>,
    /// Tenant slug used when registration does not name a tenant.
    pub default_tenant_slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub address: String,
    pub password: Option<String>,
    pub db: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub private_key_path: String,
    pub public_key_path: String,
    pub issuer: String,
    pub access_expiry_secs: i64,
    pub refresh_expiry_secs: i64,
    pub remember_me_refresh_expiry_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdpConfig {
    pub url: String,
    pub api_key: String,
    /// Tenant identity under which Heimdall talks to the IdP.
    pub tenant_id: String,
    pub application_id: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub url: String,
    /// Dotted decision path queried for every authorization check.
    pub decision_path: String,
    pub timeout_secs: u64,
    pub cache_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectStoreConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub rust_log: String,
}

impl Settings {
    /// Load settings from config files and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("HEIMDALL_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(
                Environment::with_prefix("HEIMDALL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.server.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_variables_override_files() {
        std::env::set_var("HEIMDALL_SERVER__PORT", "9999");
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("HEIMDALL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .unwrap();
        let port: u16 = config.get("server.port").unwrap();
        assert_eq!(port, 9999);
        std::env::remove_var("HEIMDALL_SERVER__PORT");
    }
}
