use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub records: RecordsConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub uploads: UploadConfig,
}

/// Blob backend: "memory" or "local"
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    pub local_path: Option<String>,
}

/// Record backend: "memory" or "sqlite" (needs the `sqlite` feature)
#[derive(Debug, Deserialize, Clone)]
pub struct RecordsConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    pub sqlite_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret; a random one is generated when unset
    pub token_secret: Option<String>,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Per-file limit in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Whole request body limit in bytes
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            storage: StorageConfig::default(),
            records: RecordsConfig::default(),
            auth: AuthConfig::default(),
            uploads: UploadConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            local_path: None,
        }
    }
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            sqlite_path: None,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: None,
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            max_request_size: default_max_request_size(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8000
}
fn default_backend() -> String {
    "memory".into()
}
fn default_token_ttl_hours() -> i64 {
    sharebox_auth::DEFAULT_TOKEN_TTL_HOURS
}
fn default_max_file_size() -> u64 {
    sharebox_core::DEFAULT_MAX_FILE_SIZE
}
fn default_max_request_size() -> usize {
    256 * 1024 * 1024
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::figment().extract().map_err(Into::into)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file("sharebox-server.toml"))
            .merge(Env::prefixed("SHAREBOX_").split("__"))
    }
}
