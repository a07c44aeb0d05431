//! HTTP origin the renderer pulls tracks from.

use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::sync::oneshot;
use tracing::{debug, info};
use warp::http::StatusCode;
use warp::path::Peek;
use warp::{Filter, Rejection, Reply};

use crate::cache::{CacheIndex, MediaCache, TrackStatus};
use crate::error::{MediaError, Result};

/// Listener settings for the media server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    /// Default: 0.0.0.0
    pub bind_ip: IpAddr,

    /// Port to listen on; 0 picks a free port
    /// Default: 8000
    pub port: u16,

    /// `Retry-After` seconds sent with 503 for tracks still downloading
    /// Default: 2
    pub retry_after_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            retry_after_secs: 2,
        }
    }
}

/// HTTP server exposing the cache directory as `/{album_id}/{id}.flac`.
///
/// Requests are gated by the [`CacheIndex`]: a track that is still
/// downloading answers `503 Service Unavailable` with `Retry-After`, a track
/// that is unknown or failed answers `404`, and a ready track is served from
/// disk with range support.
///
/// # Example
///
/// ```no_run
/// use media_origin::{MediaCache, MediaServer, ServerConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), media_origin::MediaError> {
///     let cache = MediaCache::new("/tmp/gapless");
///     let server = MediaServer::bind(&cache, &ServerConfig::default()).await?;
///     println!("serving on port {}", server.port());
///     server.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct MediaServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server_handle: Option<tokio::task::JoinHandle<()>>,
}

impl MediaServer {
    /// Bind the listener and start serving on the current tokio runtime.
    pub async fn bind(cache: &MediaCache, config: &ServerConfig) -> Result<Self> {
        cache.ensure_root()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let routes = routes(cache, config.retry_after_secs);

        let (addr, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(SocketAddr::new(config.bind_ip, config.port), async move {
                let _ = shutdown_rx.await;
            })
            .map_err(|e| MediaError::Bind(e.to_string()))?;

        info!(%addr, root = %cache.root().display(), "media server listening");
        let server_handle = tokio::spawn(server);

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            server_handle: Some(server_handle),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Stop accepting connections and wait for in-flight responses.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.server_handle.take() {
            let _ = handle.await;
        }
        info!(addr = %self.addr, "media server stopped");
    }
}

/// Build the filter tree; exposed for in-process testing with `warp::test`.
pub fn routes(
    cache: &MediaCache,
    retry_after_secs: u64,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let files = warp::get()
        .or(warp::head())
        .unify()
        .and(readiness_gate(cache.index().clone()))
        .and(warp::fs::dir(cache.root().to_path_buf()))
        .map(|file: warp::fs::File| file.into_response());

    files
        .recover(move |err| handle_rejection(err, retry_after_secs))
        .unify()
        .with(warp::log::custom(|info| {
            debug!(
                method = %info.method(),
                path = info.path(),
                status = info.status().as_u16(),
                "media request"
            );
        }))
}

/// Let a request through only when its track is `Ready`.
fn readiness_gate(index: CacheIndex) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::path::peek()
        .and_then(move |tail: Peek| {
            let index = index.clone();
            async move {
                match index.status(tail.as_str()) {
                    Some(TrackStatus::Ready) => Ok(()),
                    Some(TrackStatus::Pending) => Err(warp::reject::custom(TrackPending)),
                    Some(TrackStatus::Failed) | None => Err(warp::reject::not_found()),
                }
            }
        })
        .untuple_one()
}

/// Rejection for a track that is still downloading.
#[derive(Debug)]
struct TrackPending;

impl warp::reject::Reject for TrackPending {}

async fn handle_rejection(
    err: Rejection,
    retry_after_secs: u64,
) -> std::result::Result<warp::reply::Response, Infallible> {
    if err.find::<TrackPending>().is_some() {
        let reply = warp::reply::with_status("Track is still downloading", StatusCode::SERVICE_UNAVAILABLE);
        return Ok(warp::reply::with_header(reply, "Retry-After", retry_after_secs.to_string())
            .into_response());
    }

    let (message, code) = if err.is_not_found() {
        ("Track not found", StatusCode::NOT_FOUND)
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        ("Method not allowed", StatusCode::METHOD_NOT_ALLOWED)
    } else {
        ("Internal server error", StatusCode::INTERNAL_SERVER_ERROR)
    };
    Ok(warp::reply::with_status(message, code).into_response())
}
