use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::snapshot::DeviceReadings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Connectivity {
    Unknown,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readings {
    Awaiting,
    Live(DeviceReadings),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterStatus {
    Sending,
    Sent,
    Failed,
}

impl WaterStatus {
    pub fn message(self) -> &'static str {
        match self {
            Self::Sending => "Mengirim perintah siram...",
            Self::Sent => "Perintah siram dikirim ke ESP32.",
            Self::Failed => "Gagal mengirim perintah.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaterControl {
    pub(crate) enabled: bool,
    pub(crate) status: Option<WaterStatus>,
}

impl Default for WaterControl {
    fn default() -> Self {
        Self {
            enabled: true,
            status: None,
        }
    }
}

impl WaterControl {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn status(&self) -> Option<WaterStatus> {
        self.status
    }
}

/// The client's model of the device. Only the reconciler, the staleness
/// monitor and the command transitions in this crate mutate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientState {
    pub(crate) auto_enabled: bool,
    pub(crate) auto_pending: bool,
    pub(crate) auto_generation: u64,
    pub(crate) last_seen_at: Option<DateTime<Utc>>,
    pub(crate) connectivity: Connectivity,
    pub(crate) readings: Readings,
    pub(crate) water: WaterControl,
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientState {
    pub fn new() -> Self {
        Self {
            // Assumed until the first snapshot says otherwise.
            auto_enabled: true,
            auto_pending: false,
            auto_generation: 0,
            last_seen_at: None,
            connectivity: Connectivity::Unknown,
            readings: Readings::Awaiting,
            water: WaterControl::default(),
        }
    }

    pub fn auto_enabled(&self) -> bool {
        self.auto_enabled
    }

    pub fn auto_pending(&self) -> bool {
        self.auto_pending
    }

    pub fn last_seen_at(&self) -> Option<DateTime<Utc>> {
        self.last_seen_at
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn readings(&self) -> Readings {
        self.readings
    }

    pub fn water(&self) -> WaterControl {
        self.water
    }

    pub fn age_ms(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_seen_at
            .map(|seen| now.signed_duration_since(seen).num_milliseconds())
    }

    pub(crate) fn observe(&mut self, updated_at: DateTime<Utc>) {
        self.last_seen_at = Some(match self.last_seen_at {
            Some(seen) if seen > updated_at => seen,
            _ => updated_at,
        });
    }

    pub(crate) fn is_stale(&self, now: DateTime<Utc>, timeout: chrono::Duration) -> bool {
        self.last_seen_at
            .is_some_and(|seen| now.signed_duration_since(seen) > timeout)
    }
}
