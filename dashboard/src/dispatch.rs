use garden_common::{AutoModeTicket, Rollback, WaterRequest};
use tracing::{debug, info, warn};

use crate::host::AppState;

pub async fn request_water(app_state: &AppState) -> WaterRequest {
    let request = app_state.state.lock().await.begin_watering();
    match request {
        WaterRequest::Accepted => info!("water-now requested"),
        WaterRequest::CoolingDown => debug!("water-now ignored, control is cooling down"),
        WaterRequest::Disconnected => debug!("water-now ignored, device is disconnected"),
    }
    request
}

/// Sends an accepted water-now command, then holds the control disabled for
/// the cool-down whatever the outcome. Returns whether the device took it.
pub async fn deliver_water(app_state: AppState) -> bool {
    let delivered = match app_state.client.water_now().await {
        Ok(()) => {
            info!("water-now command delivered");
            true
        }
        Err(err) => {
            warn!("water-now command failed: {err}");
            false
        }
    };
    app_state.state.lock().await.finish_watering(delivered);

    tokio::time::sleep(app_state.config.reconcile.reenable_delay()).await;
    app_state.state.lock().await.reenable_watering();
    delivered
}

pub async fn request_auto_mode(app_state: &AppState, enabled: bool) -> AutoModeTicket {
    let ticket = app_state.state.lock().await.request_auto_mode(enabled);
    info!(
        "auto mode {} requested (was {})",
        ticket.requested, ticket.previous
    );
    ticket
}

/// Acknowledgment comes later from a matching snapshot, so success changes
/// nothing here. Failure rolls the optimistic value back.
pub async fn deliver_auto_mode(app_state: AppState, ticket: AutoModeTicket) -> Option<Rollback> {
    let err = match app_state.client.set_auto_mode(ticket.requested).await {
        Ok(()) => {
            debug!("auto mode {} sent, waiting for device echo", ticket.requested);
            return None;
        }
        Err(err) => err,
    };

    let rollback = app_state.state.lock().await.rollback_auto_mode(ticket);
    match rollback {
        Rollback::Restored(enabled) => {
            warn!("auto mode update failed, restored {enabled}: {err}")
        }
        Rollback::Superseded => {
            warn!("auto mode update failed after a newer toggle, keeping it: {err}")
        }
    }
    Some(rollback)
}
