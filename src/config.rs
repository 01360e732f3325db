use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

/// Identity provider settings. Tokens are verified against the provider's
/// published JWKS, never against a local secret.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Provider domain, e.g. "my-tenant.us.auth0.com"
    #[serde(default)]
    pub domain: String,
    /// Expected audience (the API identifier)
    #[serde(default)]
    pub audience: String,
    #[serde(default = "default_jwks_ttl")]
    pub jwks_ttl_secs: u64,
    #[serde(default = "default_jwks_timeout")]
    pub jwks_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    #[serde(default = "default_put_timeout")]
    pub put_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_listing_ttl")]
    pub listing_ttl_secs: u64,
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_db_path() -> String {
    "data/filedrop.db".to_string()
}

fn default_jwks_ttl() -> u64 {
    600 // 10 minutes
}

fn default_jwks_timeout() -> u64 {
    10
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_put_timeout() -> u64 {
    30
}

fn default_listing_ttl() -> u64 {
    300 // 5 minutes
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            audience: String::new(),
            jwks_ttl_secs: default_jwks_ttl(),
            jwks_timeout_secs: default_jwks_timeout(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: default_region(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            put_timeout_secs: default_put_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            listing_ttl_secs: default_listing_ttl(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            storage: StorageConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_env_overrides();
        config.ensure_directories()?;
        Ok(config)
    }

    /// Load configuration from config.toml
    fn load_from_file() -> anyhow::Result<Self> {
        let config_paths = ["config.toml", "data/config.toml"];

        for path in config_paths {
            if Path::new(path).exists() {
                let content = fs::read_to_string(path)?;
                let config: Config = toml::from_str(&content)?;
                tracing::info!("Loaded configuration from {}", path);
                return Ok(config);
            }
        }

        tracing::info!("No configuration file found, using defaults");
        Ok(Config::default())
    }

    /// Apply environment variable overrides
    /// Format: FD_CONF_<SECTION>_<KEY>
    fn apply_env_overrides(&mut self) {
        // Server overrides
        if let Ok(val) = env::var("FD_CONF_SERVER_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = env::var("FD_CONF_SERVER_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }

        // Database overrides
        if let Ok(val) = env::var("FD_CONF_DATABASE_PATH") {
            self.database.path = val;
        }

        // Identity provider overrides
        if let Ok(val) = env::var("FD_CONF_AUTH_DOMAIN") {
            self.auth.domain = val;
        }
        if let Ok(val) = env::var("FD_CONF_AUTH_AUDIENCE") {
            self.auth.audience = val;
        }
        if let Ok(val) = env::var("FD_CONF_AUTH_JWKS_TTL") {
            if let Ok(secs) = val.parse() {
                self.auth.jwks_ttl_secs = secs;
            }
        }

        // Storage overrides
        if let Ok(val) = env::var("FD_CONF_STORAGE_BUCKET") {
            self.storage.bucket = val;
        }
        if let Ok(val) = env::var("FD_CONF_STORAGE_REGION") {
            self.storage.region = val;
        }
        if let Ok(val) = env::var("FD_CONF_STORAGE_ACCESS_KEY_ID") {
            self.storage.access_key_id = val;
        }
        if let Ok(val) = env::var("FD_CONF_STORAGE_SECRET_ACCESS_KEY") {
            self.storage.secret_access_key = val;
        }

        // Cache overrides
        if let Ok(val) = env::var("FD_CONF_CACHE_LISTING_TTL") {
            if let Ok(secs) = val.parse() {
                self.cache.listing_ttl_secs = secs;
            }
        }
    }

    /// Issuer URL expected in verified tokens
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.auth.domain)
    }

    /// JWKS discovery endpoint for the configured identity domain
    pub fn jwks_url(&self) -> String {
        format!("https://{}/.well-known/jwks.json", self.auth.domain)
    }

    /// Ensure required directories exist
    fn ensure_directories(&self) -> anyhow::Result<()> {
        if let Some(parent) = Path::new(&self.database.path).parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_policy() {
        let config = Config::default();
        assert_eq!(config.cache.listing_ttl_secs, 300);
        assert_eq!(config.auth.jwks_ttl_secs, 600);
        assert_eq!(config.storage.region, "us-east-1");
    }

    #[test]
    fn issuer_and_jwks_urls_derive_from_domain() {
        let mut config = Config::default();
        config.auth.domain = "tenant.example.auth0.com".to_string();
        assert_eq!(config.issuer(), "https://tenant.example.auth0.com/");
        assert_eq!(
            config.jwks_url(),
            "https://tenant.example.auth0.com/.well-known/jwks.json"
        );
    }
}
