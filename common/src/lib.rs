pub mod commands;
pub mod config;
pub mod endpoints;
pub mod reconciler;
pub mod snapshot;
pub mod staleness;
pub mod state;
pub mod view;

pub use commands::{AutoModeTicket, Rollback, WaterRequest};
pub use config::{DeviceConfig, ReconcileConfig, RuntimeConfig};
pub use endpoints::*;
pub use reconciler::{AutoResolution, PollOutcome, Reconciler};
pub use snapshot::{parse_latest, DeviceReadings, DeviceSnapshot, SnapshotError};
pub use staleness::{LivenessCheck, StalenessMonitor};
pub use state::{ClientState, Connectivity, Readings, WaterControl, WaterStatus};
pub use view::{render, BadgeTone, DashboardView, StatusTone};
