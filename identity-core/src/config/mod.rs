use serde::Deserialize;
use std::env;
use std::fmt::Display;
use std::str::FromStr;

use crate::services::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    pub service_name: String,
    pub log_level: String,
    pub token: TokenConfig,
    pub kdf: KdfConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    /// TTL applied when issuance does not pass one explicitly.
    pub default_ttl_seconds: i64,
}

/// Work factors for the password KDF (Argon2id).
#[derive(Debug, Clone, Deserialize)]
pub struct KdfConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: 86_400,
        }
    }
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            service_name: "identity-core".to_string(),
            log_level: "info".to_string(),
            token: TokenConfig::default(),
            kdf: KdfConfig::default(),
        }
    }
}

impl IdentityConfig {
    pub fn from_env() -> Result<Self, ServiceError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            service_name: get_env("SERVICE_NAME", "identity-core"),
            log_level: get_env("LOG_LEVEL", "info"),
            token: TokenConfig {
                default_ttl_seconds: parse_env("TOKEN_DEFAULT_TTL_SECONDS", "86400")?,
            },
            kdf: KdfConfig {
                memory_kib: parse_env("KDF_MEMORY_KIB", "19456")?,
                iterations: parse_env("KDF_ITERATIONS", "2")?,
                parallelism: parse_env("KDF_PARALLELISM", "1")?,
            },
        })
    }
}

fn get_env(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(name: &str, default: &str) -> Result<T, ServiceError>
where
    T: FromStr,
    T::Err: Display,
{
    get_env(name, default)
        .parse()
        .map_err(|e| ServiceError::Config(format!("{}: {}", name, e)))
}
