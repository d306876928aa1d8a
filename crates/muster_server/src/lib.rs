//! HTTP surface of the muster attendance service.
//!
//! Wires the in-memory repository, the summary hub and the optional
//! snapshot writer into one [`AppState`], and exposes it as an axum
//! [`Router`].

pub mod config;
pub mod error;
pub mod hub;
mod routes;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use log::{error, info};
use muster_core::{
    parse_roster_csv, AttendanceService, EventId, FanoutNotifier, ImportReport, RepoError,
    SnapshotNotifier, SqliteAttendanceRepository,
};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};

pub use config::{load_config, Config, ConfigError};
pub use error::{ApiError, ServerError};
pub use hub::{SummaryHub, SUMMARY_UPDATED_EVENT};

pub type Service = AttendanceService<SqliteAttendanceRepository>;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Service>,
    pub hub: SummaryHub,
}

impl AppState {
    /// Fresh in-memory state. Check-ins publish to the hub and, when
    /// `snapshot_dir` is set, to a summary file per event.
    pub fn in_memory(hub_capacity: usize, snapshot_dir: Option<PathBuf>) -> Result<Self, RepoError> {
        let hub = SummaryHub::new(hub_capacity);
        let mut notifier = FanoutNotifier::new().with(Arc::new(hub.clone()));
        if let Some(dir) = snapshot_dir {
            notifier = notifier.with(Arc::new(SnapshotNotifier::new(dir)));
        }

        let repo = SqliteAttendanceRepository::open_in_memory()?;
        let service = AttendanceService::with_notifier(repo, Arc::new(notifier));
        Ok(Self {
            service: Arc::new(service),
            hub,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes::router()
        .layer(middleware::from_fn(log_request))
        .layer(CatchPanicLayer::new())
        .layer(cors)
        .with_state(state)
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        "event=http_request module=server status={} method={} path={} elapsed_ms={}",
        response.status().as_u16(),
        method,
        path,
        started.elapsed().as_millis()
    );
    response
}

/// Creates a new event from the roster CSV at `path`.
pub fn bootstrap_roster(state: &AppState, path: &Path) -> Result<(EventId, ImportReport), ServerError> {
    let text = std::fs::read_to_string(path)?;
    let rows = parse_roster_csv(&text)?;
    let event_id = state.service.create_event()?;
    let report = state.service.import_roster(event_id, &rows)?;
    info!(
        "event=bootstrap_roster module=server status=ok event_id={} path={} imported={} skipped={}",
        event_id,
        path.display(),
        report.imported,
        report.skipped
    );
    Ok((event_id, report))
}

/// Runs the service until ctrl-c or SIGTERM.
pub async fn serve(config: Config) -> Result<(), ServerError> {
    let state = AppState::in_memory(config.hub_capacity, config.snapshot_dir.clone())?;
    if let Some(path) = &config.bootstrap_roster {
        bootstrap_roster(&state, path)?;
    }

    let listener = TcpListener::bind(config.bind).await?;
    info!(
        "event=server_start module=server status=ok bind={} snapshots={}",
        config.bind,
        config.snapshot_dir.is_some()
    );

    serve_on(listener, state, shutdown_signal()).await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

/// Serves `state` on `listener` until `shutdown` resolves, then closes the
/// summary hub so open push streams end and in-flight requests can drain.
pub async fn serve_on<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let hub = state.hub.clone();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("event=server_shutdown module=server status=started");
            hub.close();
        })
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("event=signal_install module=server status=error signal=ctrl_c error={err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("event=signal_install module=server status=error signal=sigterm error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
