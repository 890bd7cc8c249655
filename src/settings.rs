use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::RwLock;
use tracing::warn;

use crate::models::{AppConfig, PersistedAppConfig};

pub struct SettingsManager {
    path: PathBuf,
    data: RwLock<PersistedAppConfig>,
}

impl SettingsManager {
    pub async fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let initial = match tokio::fs::read(&path).await {
            Ok(bytes) if !bytes.is_empty() => {
                serde_json::from_slice::<PersistedAppConfig>(&bytes).unwrap_or_else(|e| {
                    warn!("配置文件解析失败，使用默认配置: {}", e);
                    PersistedAppConfig::default()
                })
            }
            _ => {
                let default = PersistedAppConfig::default();
                let json = serde_json::to_string_pretty(&default)?;
                tokio::fs::write(&path, json).await?;
                default
            }
        };

        Ok(Self {
            path,
            data: RwLock::new(initial),
        })
    }

    pub async fn get(&self) -> PersistedAppConfig {
        self.data.read().await.clone()
    }

    pub async fn update(&self, update: AppConfig) -> Result<PersistedAppConfig> {
        let mut config = self.data.write().await;

        if let Some(path) = update.database_path {
            config.database_path = path;
        }
        if let Some(dir) = update.artifacts_dir {
            config.artifacts_dir = dir;
        }
        if let Some(dir) = update.gallery_dir {
            config.gallery_dir = dir;
        }
        if let Some(platform) = update.host_platform {
            config.host_platform = platform;
        }
        if let Some(export) = update.export {
            config.export = export;
        }
        if let Some(template) = update.decoration_url_template {
            config.decoration_url_template = template;
        }
        if let Some(seed) = update.seed_file {
            config.seed_file = Some(seed);
        }
        if let Some(serialize) = update.serialize_mutations {
            config.serialize_mutations = serialize;
        }
        if let Some(level) = update.log_level {
            config.log_level = level;
        }

        self.save(&config).await?;
        Ok(config.clone())
    }

    async fn save(&self, config: &PersistedAppConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}
