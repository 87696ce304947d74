use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Response, StatusCode};
use tracing::info;

use pokedex_core::ItemInput;

use crate::api::{empty, json, read_json};
use crate::error::{Error, Result};
use crate::items::ItemStore;

/// Handle GET /api/v1/items
pub fn list(items: &ItemStore) -> Result<Response<Full<Bytes>>> {
    json(StatusCode::OK, &items.list())
}

/// Handle POST /api/v1/items
pub async fn create(items: &ItemStore, body: Incoming) -> Result<Response<Full<Bytes>>> {
    let input: ItemInput = read_json(body).await?;
    let item = items.add(&input.title)?;
    info!("Created item {}", item.id);
    json(StatusCode::CREATED, &item)
}

/// Handle GET /api/v1/items/{id}
pub fn get(items: &ItemStore, id: &str) -> Result<Response<Full<Bytes>>> {
    let item = items.get(id).ok_or_else(|| Error::NotFound(id.to_string()))?;
    json(StatusCode::OK, &item)
}

/// Handle PUT /api/v1/items/{id}
pub async fn update(items: &ItemStore, id: &str, body: Incoming) -> Result<Response<Full<Bytes>>> {
    let input: ItemInput = read_json(body).await?;
    let item = items.update(id, &input.title)?;
    json(StatusCode::OK, &item)
}

/// Handle DELETE /api/v1/items/{id}
pub fn delete(items: &ItemStore, id: &str) -> Result<Response<Full<Bytes>>> {
    let removed = items.delete(id).ok_or_else(|| Error::NotFound(id.to_string()))?;
    info!("Deleted item {}", removed.id);
    Ok(empty(StatusCode::NO_CONTENT))
}
