use chrono::{DateTime, Utc};

use crate::{
    config::ReconcileConfig,
    snapshot::DeviceSnapshot,
    state::{ClientState, Connectivity, Readings},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoResolution {
    Absent,
    Adopted(bool),
    Acknowledged(bool),
    /// A local write is outstanding and the server still disagrees.
    AwaitingAck { local: bool, server: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    NoData,
    /// Only the timestamp was used; the payload was not trusted.
    Stale { age_ms: i64 },
    Applied { auto: AutoResolution },
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    disconnect_timeout: chrono::Duration,
}

impl Reconciler {
    pub fn new(config: &ReconcileConfig) -> Self {
        Self {
            disconnect_timeout: config.disconnect_timeout(),
        }
    }

    pub fn apply(
        &self,
        state: &mut ClientState,
        poll: Option<DeviceSnapshot>,
        now: DateTime<Utc>,
    ) -> PollOutcome {
        let Some(snapshot) = poll else {
            state.readings = Readings::Awaiting;
            return PollOutcome::NoData;
        };

        state.observe(snapshot.updated_at);

        // Judged on this snapshot's own age; a newer one seen earlier does not
        // vouch for it.
        let age = now.signed_duration_since(snapshot.updated_at);
        if age > self.disconnect_timeout {
            state.connectivity = Connectivity::Disconnected;
            return PollOutcome::Stale {
                age_ms: age.num_milliseconds(),
            };
        }

        state.connectivity = Connectivity::Connected;
        state.readings = Readings::Live(snapshot.readings());

        PollOutcome::Applied {
            auto: reconcile_auto(state, snapshot.auto_enabled),
        }
    }
}

fn reconcile_auto(state: &mut ClientState, server: Option<bool>) -> AutoResolution {
    let Some(server) = server else {
        return AutoResolution::Absent;
    };

    if !state.auto_pending {
        state.auto_enabled = server;
        return AutoResolution::Adopted(server);
    }

    if server == state.auto_enabled {
        state.auto_pending = false;
        AutoResolution::Acknowledged(server)
    } else {
        // Keep the optimistic value so the toggle does not flicker.
        AutoResolution::AwaitingAck {
            local: state.auto_enabled,
            server,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::snapshot::DeviceReadings;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
    }

    fn ms(value: i64) -> chrono::Duration {
        chrono::Duration::milliseconds(value)
    }

    fn snapshot(auto_enabled: Option<bool>, updated_at: DateTime<Utc>) -> DeviceSnapshot {
        DeviceSnapshot {
            soil_moisture: 400,
            light_level: 1200,
            is_watering: true,
            auto_enabled,
            updated_at,
        }
    }

    fn reconciler() -> Reconciler {
        Reconciler::new(&ReconcileConfig::default())
    }

    #[test]
    fn null_poll_leaves_auto_and_liveness_alone() {
        let mut state = ClientState::new();
        state.auto_enabled = false;
        state.auto_pending = true;
        state.last_seen_at = Some(t0());
        state.connectivity = Connectivity::Connected;
        state.readings = Readings::Live(snapshot(None, t0()).readings());

        let outcome = reconciler().apply(&mut state, None, t0() + ms(1_000));

        assert_eq!(outcome, PollOutcome::NoData);
        assert!(!state.auto_enabled());
        assert!(state.auto_pending());
        assert_eq!(state.last_seen_at(), Some(t0()));
        assert_eq!(state.connectivity(), Connectivity::Connected);
        assert_eq!(state.readings(), Readings::Awaiting);
    }

    #[test]
    fn fresh_snapshot_connects_and_shows_readings() {
        let mut state = ClientState::new();

        let outcome = reconciler().apply(&mut state, Some(snapshot(Some(false), t0())), t0());

        assert_eq!(
            outcome,
            PollOutcome::Applied {
                auto: AutoResolution::Adopted(false)
            }
        );
        assert_eq!(state.connectivity(), Connectivity::Connected);
        assert_eq!(state.last_seen_at(), Some(t0()));
        assert!(!state.auto_enabled());
        assert_eq!(
            state.readings(),
            Readings::Live(DeviceReadings {
                soil_moisture: 400,
                light_level: 1200,
                is_watering: true,
            })
        );
    }

    #[test]
    fn stale_snapshot_only_contributes_its_timestamp() {
        let mut state = ClientState::new();
        let before = state.clone();

        let outcome = reconciler().apply(
            &mut state,
            Some(snapshot(Some(false), t0())),
            t0() + ms(60_001),
        );

        assert_eq!(outcome, PollOutcome::Stale { age_ms: 60_001 });
        assert_eq!(state.connectivity(), Connectivity::Disconnected);
        assert_eq!(state.last_seen_at(), Some(t0()));
        assert_eq!(state.auto_enabled(), before.auto_enabled());
        assert_eq!(state.readings(), Readings::Awaiting);
    }

    #[test]
    fn snapshot_at_exact_timeout_is_still_fresh() {
        let mut state = ClientState::new();
        let outcome = reconciler().apply(&mut state, Some(snapshot(None, t0())), t0() + ms(60_000));

        assert_eq!(
            outcome,
            PollOutcome::Applied {
                auto: AutoResolution::Absent
            }
        );
        assert_eq!(state.connectivity(), Connectivity::Connected);
    }

    #[test]
    fn fresh_snapshot_reconnects_after_disconnect() {
        let mut state = ClientState::new();
        state.connectivity = Connectivity::Disconnected;
        state.last_seen_at = Some(t0() - ms(120_000));

        reconciler().apply(&mut state, Some(snapshot(None, t0())), t0() + ms(500));

        assert_eq!(state.connectivity(), Connectivity::Connected);
    }

    #[test]
    fn absent_auto_flag_keeps_local_value() {
        let mut state = ClientState::new();
        state.auto_enabled = false;

        let outcome = reconciler().apply(&mut state, Some(snapshot(None, t0())), t0());

        assert_eq!(
            outcome,
            PollOutcome::Applied {
                auto: AutoResolution::Absent
            }
        );
        assert!(!state.auto_enabled());
    }

    #[test]
    fn applying_same_snapshot_twice_is_idempotent() {
        let reconciler = reconciler();
        let incoming = snapshot(Some(true), t0());

        for pending in [false, true] {
            let mut state = ClientState::new();
            state.auto_pending = pending;

            reconciler.apply(&mut state, Some(incoming), t0() + ms(10));
            let once = state.clone();
            reconciler.apply(&mut state, Some(incoming), t0() + ms(10));

            assert_eq!(state, once);
        }
    }

    #[test]
    fn pending_write_is_not_clobbered_by_mismatching_snapshot() {
        let mut state = ClientState::new();
        state.auto_enabled = true;
        state.auto_pending = true;

        let outcome = reconciler().apply(&mut state, Some(snapshot(Some(false), t0())), t0());

        assert_eq!(
            outcome,
            PollOutcome::Applied {
                auto: AutoResolution::AwaitingAck {
                    local: true,
                    server: false
                }
            }
        );
        assert!(state.auto_enabled());
        assert!(state.auto_pending());
    }

    #[test]
    fn matching_snapshot_acknowledges_and_stays_settled() {
        let reconciler = reconciler();
        let mut state = ClientState::new();
        state.auto_enabled = false;
        state.auto_pending = true;

        let outcome = reconciler.apply(&mut state, Some(snapshot(Some(false), t0())), t0());
        assert_eq!(
            outcome,
            PollOutcome::Applied {
                auto: AutoResolution::Acknowledged(false)
            }
        );
        assert!(!state.auto_pending());

        // Once settled, the server is authoritative again.
        reconciler.apply(&mut state, Some(snapshot(Some(true), t0() + ms(2_000))), t0() + ms(2_000));
        assert!(!state.auto_pending());
        assert!(state.auto_enabled());
    }

    #[test]
    fn late_older_snapshot_applies_payload_but_not_timestamp() {
        let reconciler = reconciler();
        let mut state = ClientState::new();

        reconciler.apply(&mut state, Some(snapshot(Some(true), t0() + ms(4_000))), t0() + ms(4_100));
        let mut older = snapshot(Some(false), t0());
        older.is_watering = false;
        reconciler.apply(&mut state, Some(older), t0() + ms(4_200));

        assert_eq!(state.last_seen_at(), Some(t0() + ms(4_000)));
        assert!(!state.auto_enabled());
        assert!(matches!(
            state.readings(),
            Readings::Live(DeviceReadings {
                is_watering: false,
                ..
            })
        ));
    }

    #[test]
    fn old_snapshot_after_fresh_one_is_not_trusted() {
        let reconciler = reconciler();
        let now = t0() + ms(300_000);
        let mut state = ClientState::new();
        reconciler.apply(&mut state, Some(snapshot(Some(true), now)), now);
        let shown = state.readings();

        let mut old = snapshot(Some(false), t0());
        old.soil_moisture = 10;
        let outcome = reconciler.apply(&mut state, Some(old), now + ms(100));

        assert_eq!(outcome, PollOutcome::Stale { age_ms: 300_100 });
        assert_eq!(state.connectivity(), Connectivity::Disconnected);
        assert_eq!(state.readings(), shown);
        assert!(state.auto_enabled());
        assert_eq!(state.last_seen_at(), Some(now));
    }
}
