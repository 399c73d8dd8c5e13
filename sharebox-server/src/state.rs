use std::sync::Arc;

use chrono::TimeDelta;
use sharebox_auth::{CredentialService, JwtCredentials};
use sharebox_core::{AccountService, FileService};
use sharebox_records::{InMemoryRecordStore, RecordStore};
use sharebox_storage::{BlobStore, InMemoryStorage, LocalFileStorage};

use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub files: FileService,
    pub accounts: AccountService,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let blobs: Arc<dyn BlobStore> = match config.storage.backend.as_str() {
            "local" => {
                let path = config
                    .storage
                    .local_path
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("local storage requires local_path"))?;
                Arc::new(LocalFileStorage::new(path).await?)
            }
            "memory" => Arc::new(InMemoryStorage::new()),
            other => anyhow::bail!("Unknown storage backend '{other}'. Valid options: 'memory', 'local'"),
        };

        let records = open_records(config)?;

        let secret = match &config.auth.token_secret {
            Some(secret) if !secret.is_empty() => secret.as_bytes().to_vec(),
            _ => {
                tracing::warn!(
                    "No auth.token_secret configured; using a random secret, tokens will not survive a restart"
                );
                rand::random::<[u8; 32]>().to_vec()
            }
        };
        let ttl = TimeDelta::try_hours(config.auth.token_ttl_hours)
            .ok_or_else(|| anyhow::anyhow!("auth.token_ttl_hours out of range"))?;
        let credentials: Arc<dyn CredentialService> = Arc::new(JwtCredentials::new(&secret, ttl));

        Ok(Self {
            files: FileService::new(records.clone(), blobs)
                .with_max_file_size(config.uploads.max_file_size),
            accounts: AccountService::new(records, credentials),
            config: Arc::new(config.clone()),
        })
    }
}

fn open_records(config: &Config) -> anyhow::Result<Arc<dyn RecordStore>> {
    match config.records.backend.as_str() {
        "memory" => Ok(Arc::new(InMemoryRecordStore::new())),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let path = config
                .records
                .sqlite_path
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("sqlite records require sqlite_path"))?;
            tracing::info!("Opening SQLite record store at {}", path);
            Ok(Arc::new(sharebox_records::SqliteRecordStore::open(path)?))
        }
        #[cfg(not(feature = "sqlite"))]
        "sqlite" => anyhow::bail!("SQLite records requested but built without the `sqlite` feature"),
        other => anyhow::bail!("Unknown records backend '{other}'. Valid options: 'memory', 'sqlite'"),
    }
}
