use chrono::{DateTime, Utc};

use crate::{
    config::ReconcileConfig,
    state::{ClientState, Connectivity},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessCheck {
    /// Nothing has been seen yet, so there is nothing to age.
    NeverSeen,
    Fresh { age_ms: i64 },
    /// `went_offline` is true only on the tick that flipped the link.
    Stale { age_ms: i64, went_offline: bool },
}

/// Infers disconnection from the age of the last snapshot alone. It only ever
/// moves the link to `Disconnected`; a fresh poll is what reconnects it.
#[derive(Debug, Clone)]
pub struct StalenessMonitor {
    disconnect_timeout: chrono::Duration,
}

impl StalenessMonitor {
    pub fn new(config: &ReconcileConfig) -> Self {
        Self {
            disconnect_timeout: config.disconnect_timeout(),
        }
    }

    pub fn check(&self, state: &mut ClientState, now: DateTime<Utc>) -> LivenessCheck {
        let Some(age_ms) = state.age_ms(now) else {
            return LivenessCheck::NeverSeen;
        };

        if !state.is_stale(now, self.disconnect_timeout) {
            return LivenessCheck::Fresh { age_ms };
        }

        let went_offline = state.connectivity != Connectivity::Disconnected;
        state.connectivity = Connectivity::Disconnected;
        LivenessCheck::Stale {
            age_ms,
            went_offline,
        }
    }
}
