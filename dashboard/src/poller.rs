use chrono::Utc;
use garden_common::{AutoResolution, ClientState, LivenessCheck, PollOutcome};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::host::AppState;

/// Fetches one snapshot and reconciles it. Failures leave the state untouched.
pub async fn poll_once(app_state: &AppState) -> Option<PollOutcome> {
    let poll = match app_state.client.latest().await {
        Ok(poll) => poll,
        Err(err) => {
            warn!("device poll failed: {err}");
            return None;
        }
    };

    let outcome = {
        let mut state = app_state.state.lock().await;
        app_state.reconciler.apply(&mut state, poll, Utc::now())
    };

    match outcome {
        PollOutcome::NoData => debug!("device has not reported yet"),
        PollOutcome::Stale { age_ms } => {
            warn!("latest snapshot is {age_ms} ms old, treating device as disconnected")
        }
        PollOutcome::Applied {
            auto: AutoResolution::Acknowledged(enabled),
        } => info!("device acknowledged auto mode {enabled}"),
        PollOutcome::Applied { auto } => debug!("snapshot applied, auto mode {auto:?}"),
    }

    Some(outcome)
}

pub fn check_liveness(app_state: &AppState, state: &mut ClientState) -> LivenessCheck {
    let check = app_state.monitor.check(state, Utc::now());
    if let LivenessCheck::Stale {
        age_ms,
        went_offline: true,
    } = check
    {
        warn!("no snapshot for {age_ms} ms, device disconnected");
    }
    check
}

/// Each tick spawns its own fetch so a hung request never delays or cancels
/// the next one. Responses are reconciled in the order they complete.
pub fn spawn_poll_loop(app_state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(app_state.config.reconcile.poll_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let app_state = app_state.clone();
            tokio::spawn(async move {
                poll_once(&app_state).await;
            });
        }
    });
}

pub fn spawn_staleness_loop(app_state: AppState) {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(app_state.config.reconcile.stale_check_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let mut state = app_state.state.lock().await;
            check_liveness(&app_state, &mut state);
        }
    });
}
