use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReconcileConfig {
    pub poll_interval_ms: u64,
    pub stale_check_interval_ms: u64,
    pub disconnect_timeout_ms: u64,
    pub reenable_delay_ms: u64,
    pub light_threshold: i32,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2_000,
            stale_check_interval_ms: 1_000,
            disconnect_timeout_ms: 60_000,
            reenable_delay_ms: 3_000,
            light_threshold: 1_500,
        }
    }
}

impl ReconcileConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn stale_check_interval(&self) -> Duration {
        Duration::from_millis(self.stale_check_interval_ms)
    }

    pub fn reenable_delay(&self) -> Duration {
        Duration::from_millis(self.reenable_delay_ms)
    }

    pub fn disconnect_timeout(&self) -> chrono::Duration {
        i64::try_from(self.disconnect_timeout_ms)
            .ok()
            .and_then(chrono::Duration::try_milliseconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    pub fn sanitize(&mut self) {
        self.poll_interval_ms = self.poll_interval_ms.clamp(250, 60_000);
        self.stale_check_interval_ms = self.stale_check_interval_ms.clamp(250, 60_000);
        self.disconnect_timeout_ms = self.disconnect_timeout_ms.clamp(1_000, 3_600_000);
        self.reenable_delay_ms = self.reenable_delay_ms.min(60_000);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DeviceConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            request_timeout_ms: 5_000,
        }
    }
}

impl DeviceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn sanitize(&mut self) {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        self.base_url = if trimmed.is_empty() {
            DeviceConfig::default().base_url
        } else {
            trimmed.to_string()
        };
        self.request_timeout_ms = self.request_timeout_ms.clamp(500, 60_000);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            reconcile: ReconcileConfig::default(),
            device: DeviceConfig::default(),
            timezone: default_timezone(),
            listen_addr: default_listen_addr(),
        }
    }
}

impl RuntimeConfig {
    pub fn sanitize(&mut self) {
        self.reconcile.sanitize();
        self.device.sanitize();
        if self.timezone.trim().is_empty() {
            self.timezone = default_timezone();
        }
    }
}
