use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::Mutex};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use garden_common::{
    render, ClientState, DashboardView, Reconciler, RuntimeConfig, StalenessMonitor, WaterRequest,
};

use crate::{
    device_client::DeviceClient,
    dispatch,
    poller::{spawn_poll_loop, spawn_staleness_loop},
    store::ConfigStore,
};

#[derive(Clone)]
pub struct AppState {
    pub client: DeviceClient,
    pub state: Arc<Mutex<ClientState>>,
    pub config: Arc<RuntimeConfig>,
    pub reconciler: Reconciler,
    pub monitor: StalenessMonitor,
    pub display_tz: Tz,
}

impl AppState {
    pub fn new(config: RuntimeConfig) -> anyhow::Result<Self> {
        let client = DeviceClient::new(&config.device).context("failed to build device client")?;
        let display_tz = config.timezone.parse::<Tz>().unwrap_or_else(|_| {
            warn!("unknown timezone {:?}, showing times in UTC", config.timezone);
            chrono_tz::UTC
        });

        Ok(Self {
            client,
            state: Arc::new(Mutex::new(ClientState::new())),
            reconciler: Reconciler::new(&config.reconcile),
            monitor: StalenessMonitor::new(&config.reconcile),
            config: Arc::new(config),
            display_tz,
        })
    }

    pub async fn view(&self) -> DashboardView {
        let state = self.state.lock().await;
        render(&state, &self.config.reconcile, &self.display_tz)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct AutoModeUpdate {
    enabled: bool,
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let store = ConfigStore::from_env();
    let mut config = store.load().await.unwrap_or_else(|err| {
        warn!("failed to load dashboard config from store: {err:#}");
        RuntimeConfig::default()
    });
    store.apply_env_overrides(&mut config);
    config.sanitize();

    let listen_addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen address {:?}", config.listen_addr))?;

    let app_state = AppState::new(config)?;
    info!(
        "polling {} every {} ms",
        app_state.client.base_url(),
        app_state.config.reconcile.poll_interval_ms
    );

    spawn_poll_loop(app_state.clone());
    spawn_staleness_loop(app_state.clone());

    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind {listen_addr}"))?;
    info!("dashboard listening on http://{listen_addr}");

    axum::serve(listener, router(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("dashboard server failed")?;

    Ok(())
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/view", get(handle_get_view))
        .route("/api/water", post(handle_water_now))
        .route("/api/auto", post(handle_set_auto))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn handle_get_view(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.view().await)
}

async fn handle_water_now(State(state): State<AppState>) -> impl IntoResponse {
    match dispatch::request_water(&state).await {
        WaterRequest::Accepted => {
            tokio::spawn(dispatch::deliver_water(state.clone()));
            (StatusCode::ACCEPTED, Json(state.view().await)).into_response()
        }
        WaterRequest::CoolingDown => error_response(
            StatusCode::CONFLICT,
            "Water command is cooling down, try again shortly",
        ),
        WaterRequest::Disconnected => {
            error_response(StatusCode::CONFLICT, "Device is disconnected")
        }
    }
}

async fn handle_set_auto(
    State(state): State<AppState>,
    Json(update): Json<AutoModeUpdate>,
) -> impl IntoResponse {
    let ticket = dispatch::request_auto_mode(&state, update.enabled).await;
    // Rendered before the round-trip so the toggle moves immediately.
    let view = state.view().await;
    tokio::spawn(dispatch::deliver_auto_mode(state, ticket));
    Json(view)
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}
