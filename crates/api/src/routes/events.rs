//! Server-push event streams.
//!
//! Each stream emits one JSON object per line: pushed order events as
//! they happen, plus a `{"type":"reconcile"}` line on every
//! reconciliation tick telling the client to re-fetch the authoritative
//! order list. Push is the latency optimization; the re-fetch is the
//! correctness backstop.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use fanout::{FeedMessage, Recipient, Subscription};
use futures_util::stream;
use order_store::OrderRepository;

use crate::auth::{AuthUser, AuthVendor};
use crate::state::AppState;

const RECONCILE_LINE: &str = "{\"type\":\"reconcile\"}";

/// GET /users/orders/events — event stream for the user's orders.
#[tracing::instrument(skip(state))]
pub async fn user_events<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    AuthUser(user_id): AuthUser,
) -> Response {
    let subscription = state
        .hub
        .subscribe_with(Recipient::User(user_id), state.reconcile_interval);
    stream_response(subscription)
}

/// GET /vendor/orders/events — event stream for the vendor's queue.
#[tracing::instrument(skip(state))]
pub async fn vendor_events<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    AuthVendor(vendor_id): AuthVendor,
) -> Response {
    let subscription = state
        .hub
        .subscribe_with(Recipient::Vendor(vendor_id), state.reconcile_interval);
    stream_response(subscription)
}

fn stream_response(subscription: Subscription) -> Response {
    let lines = stream::unfold(subscription, |mut subscription| async move {
        let line = match subscription.next().await {
            FeedMessage::Update(event) => match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(err) => {
                    tracing::error!(error = %err, "failed to serialize event");
                    RECONCILE_LINE.to_string()
                }
            },
            FeedMessage::Reconcile => RECONCILE_LINE.to_string(),
        };
        Some((Ok::<_, Infallible>(line + "\n"), subscription))
    });

    (
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        Body::from_stream(lines),
    )
        .into_response()
}
