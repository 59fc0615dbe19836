//! Request-tracking middleware feeding the standard request metrics.

use std::panic::AssertUnwindSafe;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use tracing::{debug, error};

use crate::state::AppState;

/// Counts the request as active while it runs and times it. A handler that
/// panics or answers with a server error counts as a request exception; a
/// panic is turned into a 500 response.
pub async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let requests = &state.metrics.requests;
    let _in_flight = requests.active.track();
    let timing = requests.response_time.start();

    let path = request.uri().path().to_string();
    let response = match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(_) => {
            error!(
                event_name = "http.request.panicked",
                event_domain = "http",
                path = path.as_str(),
                "request handler panicked"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    };

    if response.status().is_server_error() {
        requests.exceptions.inc();
    }
    let elapsed = timing.stop();
    debug!(
        event_name = "http.request.completed",
        event_domain = "http",
        path = path.as_str(),
        status = response.status().as_u16(),
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        "request completed"
    );
    response
}
