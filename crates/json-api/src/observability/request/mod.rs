//! Request-level logging and request IDs.

mod request_ids;
mod spans;

use std::time::Instant;

use salvo::{
    Request, handler,
    http::StatusCode,
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::{Instrument as _, Span, error, info, warn};

use super::settings;

const REQUEST_ID_DEPOT_KEY: &str = "request_id";

/// What is known about a request once its response is ready.
struct Completed<'a> {
    request_id: &'a str,
    method: &'a str,
    path: &'a str,
    status: StatusCode,
    duration_ms: u128,
}

#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let started = Instant::now();

    let request_id =
        request_ids::resolve_request_id(req.header::<String>(request_ids::REQUEST_ID_HEADER));

    depot.insert(REQUEST_ID_DEPOT_KEY, request_id.clone());
    request_ids::set_request_id_header(res, &request_id);

    let method = req.method().to_string();
    let path = req.uri().path().to_owned();

    let span = tracing::info_span!(
        parent: None,
        "http.request",
        request_id = %request_id,
        method = %method,
        path = %path,
        route = %spans::route_template(&path),
        remote_addr = %req.remote_addr(),
        status = tracing::field::Empty,
        duration_ms = tracing::field::Empty
    );

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    log_completion(
        &span,
        &Completed {
            request_id: &request_id,
            method: &method,
            path: &path,
            status: request_ids::response_status_or_ok(res.status_code),
            duration_ms: started.elapsed().as_millis(),
        },
    );
}

fn log_completion(span: &Span, done: &Completed<'_>) {
    let status = done.status.as_u16();
    let duration_ms = done.duration_ms;

    span.record("status", status);
    span.record("duration_ms", duration_ms);

    let _entered = span.enter();

    info!(status, duration_ms, "request.completed");

    if done.status.is_server_error() {
        error!(
            status,
            method = done.method,
            path = done.path,
            request_id = done.request_id,
            "server error response"
        );
    } else if done.status.is_client_error() {
        warn!(
            status,
            method = done.method,
            path = done.path,
            request_id = done.request_id,
            "client error response"
        );
    }

    let threshold_ms = u128::from(settings::slow_request_threshold_ms());

    if duration_ms > threshold_ms {
        warn!(
            method = done.method,
            path = done.path,
            request_id = done.request_id,
            duration_ms,
            threshold_ms,
            "slow request detected"
        );
    }
}
