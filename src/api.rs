use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use matchit::{Params, Router};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::items::ItemStore;
use crate::pager::Pager;

pub mod catalog;
pub mod health;
pub mod items;

/// Services shared by every connection
#[derive(Clone)]
pub struct Services {
    pub pager: Arc<Pager>,
    pub items: Arc<ItemStore>,
}

/// Route identifier
#[derive(Clone, Copy)]
enum Route {
    Health,
    Catalog,
    CatalogRefresh,
    CatalogMore,
    CatalogToggles,
    Sprites,
    Items,
    Item,
}

/// Build the router
fn build_router() -> std::result::Result<Router<Route>, matchit::InsertError> {
    let mut router = Router::new();
    router.insert("/health", Route::Health)?;
    router.insert("/api/v1/catalog", Route::Catalog)?;
    router.insert("/api/v1/catalog/refresh", Route::CatalogRefresh)?;
    router.insert("/api/v1/catalog/more", Route::CatalogMore)?;
    router.insert("/api/v1/catalog/toggles", Route::CatalogToggles)?;
    router.insert("/api/v1/catalog/{id}/sprites", Route::Sprites)?;
    router.insert("/api/v1/items", Route::Items)?;
    router.insert("/api/v1/items/{id}", Route::Item)?;
    Ok(router)
}

/// JSON response with the given status
pub(crate) fn with_body(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

pub(crate) fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Result<Response<Full<Bytes>>> {
    let body = serde_json::to_vec(value)?;
    Ok(with_body(status, body))
}

pub(crate) fn empty(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

pub(crate) async fn read_json<T: DeserializeOwned>(body: Incoming) -> Result<T> {
    let bytes = body
        .collect()
        .await
        .map_err(|e| Error::BadRequest(e.to_string()))?
        .to_bytes();
    serde_json::from_slice(&bytes).map_err(|e| Error::BadRequest(format!("Invalid JSON body: {}", e)))
}

fn param<'v>(params: &Params<'_, 'v>, key: &str) -> Result<&'v str> {
    params
        .get(key)
        .ok_or_else(|| Error::BadRequest(format!("Missing path parameter: {}", key)))
}

/// Dispatch a matched route to its handler
async fn dispatch(
    method: Method,
    route: Route,
    params: &Params<'_, '_>,
    body: Incoming,
    services: &Services,
) -> Result<Response<Full<Bytes>>> {
    let pager = &services.pager;
    let store = &services.items;

    match (method, route) {
        (Method::GET, Route::Health) => health::health(services),

        (Method::GET, Route::Catalog) => catalog::snapshot(pager),
        (Method::POST, Route::CatalogRefresh) => catalog::refresh(pager).await,
        (Method::POST, Route::CatalogMore) => catalog::more(pager).await,
        (Method::PUT, Route::CatalogToggles) => catalog::set_toggles(pager, body).await,
        (Method::GET, Route::Sprites) => catalog::sprites(pager, param(params, "id")?),

        (Method::GET, Route::Items) => items::list(store),
        (Method::POST, Route::Items) => items::create(store, body).await,
        (Method::GET, Route::Item) => items::get(store, param(params, "id")?),
        (Method::PUT, Route::Item) => items::update(store, param(params, "id")?, body).await,
        (Method::DELETE, Route::Item) => items::delete(store, param(params, "id")?),

        _ => Ok(with_body(
            StatusCode::METHOD_NOT_ALLOWED,
            r#"{"error":"Method not allowed"}"#,
        )),
    }
}

/// Handle incoming requests
async fn handle_request(
    req: Request<Incoming>,
    services: Services,
    router: Arc<Router<Route>>,
) -> std::result::Result<Response<Full<Bytes>>, std::convert::Infallible> {
    let (parts, body) = req.into_parts();
    let path = parts.uri.path();

    debug!("{} {}", parts.method, path);

    let matched = match router.at(path) {
        Ok(m) => m,
        Err(_) => {
            return Ok(with_body(StatusCode::NOT_FOUND, r#"{"error":"Not found"}"#));
        }
    };

    let result = dispatch(
        parts.method.clone(),
        *matched.value,
        &matched.params,
        body,
        &services,
    )
    .await;

    match result {
        Ok(response) => Ok(response),
        Err(e) => {
            debug!("{} {} failed: {}", parts.method, path, e);
            Ok(e.into_response())
        }
    }
}

/// Serve connections from an already bound listener
pub async fn serve(listener: TcpListener, services: Services) -> anyhow::Result<()> {
    let router = Arc::new(build_router()?);

    loop {
        let (stream, remote_addr) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let services = services.clone();
        let router = Arc::clone(&router);

        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let services = services.clone();
                let router = Arc::clone(&router);
                handle_request(req, services, router)
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                error!("Error serving connection from {}: {}", remote_addr, e);
            }
        });
    }
}

/// Run the HTTP server
pub async fn run(config: Config, services: Services) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.bind, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);

    serve(listener, services).await
}
