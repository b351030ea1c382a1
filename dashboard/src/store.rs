use std::{io::ErrorKind, path::PathBuf};

use garden_common::RuntimeConfig;
use tracing::info;

const CONFIG_FILE: &str = "dashboard.json";

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn from_env() -> Self {
        let data_dir = std::env::var("GARDEN_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.garden"));
        Self::at(data_dir.join(CONFIG_FILE))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub async fn load(&self) -> anyhow::Result<RuntimeConfig> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) => {
                let config = serde_json::from_slice::<RuntimeConfig>(&raw)?;
                info!("loaded dashboard config from {}", self.path.display());
                Ok(config)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(RuntimeConfig::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn apply_env_overrides(&self, config: &mut RuntimeConfig) {
        apply_overrides(config, |key| std::env::var(key).ok());
    }
}

fn apply_overrides(config: &mut RuntimeConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup("DEVICE_URL") {
        config.device.base_url = url;
    }
    if let Some(addr) = lookup("LISTEN_ADDR") {
        config.listen_addr = addr;
    }
    if let Some(timezone) = lookup("DASHBOARD_TZ") {
        config.timezone = timezone;
    }
}
