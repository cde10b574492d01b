//! HTTP surface of the daemon
//!
//! `GET /update?domain=&hostname=&ip4addr=&ip6addr=` is the only route. It is
//! shaped for home routers' "custom DynDNS" settings: the router substitutes
//! its current addresses into a URL template and ignores the answer, so the
//! outcome report mostly serves the logs and manual testing.

use crate::validate;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
};
use mddns_core::MultiUpdater;
use std::collections::HashMap;
use tracing::{error, info};

pub fn router(updater: MultiUpdater) -> Router {
    Router::new()
        .route("/update", get(update))
        .with_state(updater)
}

async fn update(
    State(updater): State<MultiUpdater>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    info!("Incoming request {}", uri);

    let request = match validate::update_request(&query) {
        Ok(request) => request,
        Err(errors) => {
            error!(
                "Failed to process request {}: {}",
                uri,
                serde_json::to_string(&errors).unwrap_or_default()
            );
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "errors": errors })),
            )
                .into_response();
        }
    };

    let outcomes = updater.update(&request).await;
    info!("Request {}: HTTP/200 OK", uri);

    Json(outcomes).into_response()
}
