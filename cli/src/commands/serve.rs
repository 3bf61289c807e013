//! HTTP surface: single and batch status checks, wake requests and their
//! history, and the push subscription as server-sent events.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::HeaderName;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use futures::{Stream, StreamExt};
use lanwake_common::directory::LookupError;
use lanwake_common::status::StreamEvent;
use lanwake_common::success;
use lanwake_common::wake::{FailureKind, WakeReport};
use lanwake_core::broadcaster::HostSet;
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::app::App;

pub async fn serve(bind: SocketAddr, app: App) -> anyhow::Result<()> {
    let router: Router = router(app);
    let listener: TcpListener = TcpListener::bind(bind).await?;
    let local: SocketAddr = listener.local_addr()?;
    success!("Listening on http://{local}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}

fn router(app: App) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/devices/check-all", get(check_all))
        .route("/api/devices/:id/status", get(device_status))
        .route("/api/devices/:id/wake", post(wake_device))
        .route("/api/devices/:id/history", get(wake_history))
        .route("/api/sse/status", get(status_stream))
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Serialize)]
struct Envelope<T> {
    success: bool,
    data: T,
}

fn ok<T: Serialize>(data: T) -> Response {
    Json(Envelope {
        success: true,
        data,
    })
    .into_response()
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    let body = json!({ "success": false, "error": message.into() });
    (status, Json(body)).into_response()
}

async fn device_status(State(app): State<App>, Path(id): Path<String>) -> Response {
    match app.status.check_one(&id).await {
        Ok(status) => ok(json!({ "status": status.status, "checkedAt": status.checked_at })),
        Err(e) => match e.downcast_ref::<LookupError>() {
            Some(LookupError::NotFound(_)) => failure(StatusCode::NOT_FOUND, "device not found"),
            _ => {
                error!(host = %id, error = %e, "status check failed");
                failure(StatusCode::INTERNAL_SERVER_ERROR, "status check failed")
            }
        },
    }
}

async fn check_all(State(app): State<App>) -> Response {
    match app.status.check_all().await {
        Ok(statuses) => ok(json!({ "statuses": statuses })),
        Err(e) => {
            error!(error = %e, "batch check failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "batch check failed")
        }
    }
}

async fn wake_device(State(app): State<App>, Path(id): Path<String>) -> Response {
    let report: WakeReport = match app.waker.wake_host(&id).await {
        Ok(report) => report,
        Err(LookupError::NotFound(_)) => {
            warn!(host = %id, "wake requested for unknown device");
            return failure(StatusCode::NOT_FOUND, "device not found");
        }
        Err(e) => {
            error!(host = %id, error = %e, "device lookup failed");
            return failure(StatusCode::INTERNAL_SERVER_ERROR, "device lookup failed");
        }
    };

    match (report.outcome.failure_kind(), report.outcome.detail()) {
        (Some(FailureKind::Encoding), Some(detail)) => failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("invalid wake request: {detail}"),
        ),
        (Some(FailureKind::Transport), Some(detail)) => failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("magic packet send failed: {detail}"),
        ),
        _ => ok(report),
    }
}

async fn wake_history(State(app): State<App>, Path(id): Path<String>) -> Response {
    match app.waker.history(&id).await {
        Ok(history) => ok(json!({ "history": history })),
        Err(e) => match e.downcast_ref::<LookupError>() {
            Some(LookupError::NotFound(_)) => failure(StatusCode::NOT_FOUND, "device not found"),
            _ => {
                error!(host = %id, error = %e, "reading wake history failed");
                failure(StatusCode::INTERNAL_SERVER_ERROR, "reading wake history failed")
            }
        },
    }
}

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

/// The session lives as long as the response body; a client disconnect drops
/// the subscription and cancels its timers.
async fn status_stream(State(app): State<App>) -> impl IntoResponse {
    let subscription = app.status.subscribe(HostSet::All);
    info!(subscriber = subscription.info().id, "sse client connected");

    let backoff = app.resubscribe_backoff;
    let events = subscription.filter_map(move |event: StreamEvent| async move {
        match event.payload_json() {
            Ok(payload) => Some(Ok::<Event, Infallible>(
                Event::default()
                    .event(event.name())
                    .data(payload)
                    .retry(backoff),
            )),
            Err(e) => {
                warn!(error = %e, "dropping unserializable event");
                None
            }
        }
    });

    // Reverse proxies must pass events through as they arrive.
    ([(X_ACCEL_BUFFERING, "no")], Sse::new(events))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
