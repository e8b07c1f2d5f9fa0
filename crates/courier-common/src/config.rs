//! Server configuration.
//!
//! Sources, strongest first: `COURIER__SECTION__KEY` environment variables
//! (a `.env` file is loaded into the environment), an optional config file,
//! then the defaults below. The result is validated once and kept in a
//! process-wide cell.

use serde::Deserialize;
use std::sync::OnceLock;

use crate::crypto::MIN_RSA_BITS;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Load, validate and install the configuration.
///
/// `file` overrides the default `config` file stem (looked up relative to the
/// working directory, any supported extension).
pub fn init(file: Option<&str>) -> Result<&'static AppConfig, config::ConfigError> {
    // Missing .env is normal outside development.
    dotenvy::dotenv().ok();

    let cfg = config::Config::builder()
        // Defaults
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5000)?
        .set_default("database.url", "sqlite://courier.db")?
        .set_default("database.max_connections", 8)?
        .set_default("auth.access_token_ttl_secs", 3600)? // 1 hour
        .set_default("auth.retain_private_keys", false)?
        .set_default("crypto.rsa_bits", MIN_RSA_BITS as i64)?
        .set_default("limits.max_payload_bytes", 1_048_576)? // 1MB of base64
        // Optional config file
        .add_source(config::File::with_name(file.unwrap_or("config")).required(file.is_some()))
        // Environment variables (COURIER__SERVER__PORT, COURIER__AUTH__JWT_SECRET, etc.)
        .add_source(
            config::Environment::with_prefix("COURIER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let loaded: AppConfig = cfg.try_deserialize()?;
    loaded.check()?;
    Ok(CONFIG.get_or_init(|| loaded))
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub crypto: CryptoConfig,
    pub limits: LimitsConfig,
}

impl AppConfig {
    /// Reject settings that would silently weaken the service.
    fn check(&self) -> Result<(), config::ConfigError> {
        if self.auth.jwt_secret.len() < 32 {
            return Err(config::ConfigError::Message(
                "auth.jwt_secret must be at least 32 bytes".into(),
            ));
        }
        if self.crypto.rsa_bits < MIN_RSA_BITS {
            return Err(config::ConfigError::Message(format!(
                "crypto.rsa_bits must be at least {MIN_RSA_BITS}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL, e.g. `sqlite://courier.db` or `sqlite::memory:`
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret, at least 32 bytes
    pub jwt_secret: String,
    /// Session token lifetime in seconds
    pub access_token_ttl_secs: u64,
    /// Keep a copy of each private key server-side and hand it back on login.
    /// When off, the key is returned once at registration and then forgotten.
    pub retain_private_keys: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CryptoConfig {
    /// RSA modulus size for newly issued identities.
    pub rsa_bits: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LimitsConfig {
    /// Upper bound on each base64 payload field of a submitted message.
    pub max_payload_bytes: usize,
}
