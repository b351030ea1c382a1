use std::fmt::Display;

use chrono::TimeZone;
use serde::Serialize;

use crate::{
    config::ReconcileConfig,
    snapshot::DeviceReadings,
    state::{ClientState, Connectivity, Readings},
};

const PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTone {
    Ok,
    Wait,
    Err,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
    Watering,
    Idle,
    Unknown,
}

/// Everything the dashboard page needs to draw itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub connectivity: Connectivity,
    pub status_text: &'static str,
    pub status_tone: StatusTone,
    pub soil: String,
    pub light: String,
    pub light_warning: bool,
    pub water_badge: &'static str,
    pub water_badge_tone: BadgeTone,
    pub last_update: String,
    pub auto_enabled: bool,
    pub auto_pending: bool,
    pub auto_label: &'static str,
    pub water_enabled: bool,
    pub water_status: Option<&'static str>,
}

/// `zone` converts each timestamp on its own, so daylight-saving changes show
/// the offset that applied when the snapshot was taken.
pub fn render<Z>(state: &ClientState, config: &ReconcileConfig, zone: &Z) -> DashboardView
where
    Z: TimeZone,
    Z::Offset: Display,
{
    let disconnected = state.connectivity() == Connectivity::Disconnected;
    let live = match state.readings() {
        Readings::Live(readings) => Some(readings),
        Readings::Awaiting => None,
    };

    let (status_text, status_tone) = if disconnected {
        ("Koneksi ke ESP32 terputus.", StatusTone::Err)
    } else {
        match live {
            None => ("Belum ada data dari ESP32.", StatusTone::Wait),
            Some(DeviceReadings {
                is_watering: true, ..
            }) => ("ESP32 sedang / baru saja menyiram tanaman.", StatusTone::Ok),
            Some(_) => ("ESP32 tidak menyiram. Monitoring normal.", StatusTone::Wait),
        }
    };

    let (water_badge, water_badge_tone) = match (disconnected, live) {
        (true, _) => ("Pompa -", BadgeTone::Unknown),
        (
            false,
            Some(DeviceReadings {
                is_watering: true, ..
            }),
        ) => ("Pompa ON", BadgeTone::Watering),
        _ => ("Pompa OFF", BadgeTone::Idle),
    };

    let last_update = match (live, state.last_seen_at()) {
        (None, _) if !disconnected => format!("Last update: {PLACEHOLDER}"),
        (_, Some(seen)) => format!(
            "Last update: {}",
            seen.with_timezone(zone).format("%H:%M:%S")
        ),
        (_, None) => format!("Last update: {PLACEHOLDER}"),
    };

    let water = state.water();

    DashboardView {
        connectivity: state.connectivity(),
        status_text,
        status_tone,
        soil: live.map_or_else(|| PLACEHOLDER.to_string(), |r| r.soil_moisture.to_string()),
        light: live.map_or_else(|| PLACEHOLDER.to_string(), |r| r.light_level.to_string()),
        light_warning: !disconnected
            && live.is_some_and(|r| r.light_level < config.light_threshold),
        water_badge,
        water_badge_tone,
        last_update,
        auto_enabled: state.auto_enabled(),
        auto_pending: state.auto_pending(),
        auto_label: if state.auto_enabled() {
            "Mode auto: ON"
        } else {
            "Mode auto: OFF"
        },
        water_enabled: water.is_enabled() && !disconnected,
        water_status: water.status().map(|status| status.message()),
    }
}
