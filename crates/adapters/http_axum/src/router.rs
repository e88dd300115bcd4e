//! Axum router assembly.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::IntoResponse;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use motion_app::ports::TriggerHandler;

/// Build the trigger [`Router`].
///
/// There are no routes: the fallback handler answers every method and path.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level, and a [`CatchPanicLayer`] so a panicking trigger never
/// takes the listener down.
pub fn build<T: TriggerHandler>(handler: Arc<T>) -> Router {
    Router::new()
        .fallback(trigger::<T>)
        .layer(CatchPanicLayer::custom(crate::error::panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}

async fn trigger<T: TriggerHandler>(
    State(handler): State<Arc<T>>,
    uri: Uri,
) -> impl IntoResponse {
    handler.handle_trigger();

    let path = uri.path_and_query().map_or("/", |pq| pq.as_str());
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("Successfully requested: {path}"),
    )
}
