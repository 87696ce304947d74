use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

use crate::api::{json, Services};
use crate::error::Result;

/// Health check response
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    catalog_entries: usize,
    catalog_loading: bool,
    items: usize,
}

/// Handle GET /health
pub fn health(services: &Services) -> Result<Response<Full<Bytes>>> {
    let catalog = services.pager.snapshot();
    let response = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        catalog_entries: catalog.entries.len(),
        catalog_loading: catalog.loading,
        items: services.items.len(),
    };

    json(StatusCode::OK, &response)
}
