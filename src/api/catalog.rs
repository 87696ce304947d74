use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Response, StatusCode};
use tracing::info;

use pokedex_core::{LoadOutcome, LoadReport, Sprites, Toggles};

use crate::api::{json, read_json};
use crate::error::{Error, Result};
use crate::pager::Pager;

/// Handle GET /api/v1/catalog
pub fn snapshot(pager: &Pager) -> Result<Response<Full<Bytes>>> {
    json(StatusCode::OK, &pager.snapshot().to_snapshot())
}

fn report(pager: &Pager, outcome: LoadOutcome) -> Result<Response<Full<Bytes>>> {
    let report = LoadReport {
        outcome,
        state: pager.snapshot().to_snapshot(),
    };
    json(StatusCode::OK, &report)
}

/// Run a fetch cycle on its own task so a dropped connection cannot cancel it.
async fn detached<F>(cycle: F) -> Result<LoadOutcome>
where
    F: Future<Output = LoadOutcome> + Send + 'static,
{
    tokio::spawn(cycle)
        .await
        .map_err(|e| Error::Internal(format!("Fetch cycle aborted: {}", e)))
}

/// Handle POST /api/v1/catalog/refresh
pub async fn refresh(pager: &Arc<Pager>) -> Result<Response<Full<Bytes>>> {
    let task = Arc::clone(pager);
    let outcome = detached(async move { task.refresh().await }).await?;
    report(pager, outcome)
}

/// Handle POST /api/v1/catalog/more
pub async fn more(pager: &Arc<Pager>) -> Result<Response<Full<Bytes>>> {
    let task = Arc::clone(pager);
    let outcome = detached(async move { task.load_more().await }).await?;
    report(pager, outcome)
}

/// Handle PUT /api/v1/catalog/toggles
pub async fn set_toggles(pager: &Pager, body: Incoming) -> Result<Response<Full<Bytes>>> {
    let toggles: Toggles = read_json(body).await?;
    info!(
        "Enrichment toggles: stats={} types={} abilities={}",
        toggles.stats, toggles.types, toggles.abilities
    );
    pager.set_toggles(toggles);
    snapshot(pager)
}

/// Handle GET /api/v1/catalog/{id}/sprites
pub fn sprites(pager: &Pager, id: &str) -> Result<Response<Full<Bytes>>> {
    let id: u32 = id
        .parse()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| Error::BadRequest(format!("Invalid catalog id: {}", id)))?;

    let client = pager.client();
    let sprites = Sprites {
        default: client.image_url(id),
        shiny: client.shiny_image_url(id),
    };
    json(StatusCode::OK, &sprites)
}
