//! HTTP front end: `GET /?domain=<domain>&sources=<list>` → JSON.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::backend::{DnsLookup, DocumentFetch};
use crate::error::Result;
use crate::methods::Methods;
use crate::resolver::AltConnectionResolver;
use crate::source::Sources;

/// Query parameters of a discovery request.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LookupQuery {
    /// Untrusted domain input.
    pub domain: Option<String>,
    /// Comma-separated source names.
    pub sources: Option<String>,
}

impl LookupQuery {
    /// Collect the known parameters from decoded key/value pairs.
    ///
    /// A repeated key keeps its last value; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        pairs
            .into_iter()
            .fold(Self::default(), |mut query, (key, value)| {
                match key.as_str() {
                    "domain" => query.domain = Some(value),
                    "sources" => query.sources = Some(value),
                    _ => {}
                }
                query
            })
    }
}

/// Build the axum router serving discovery requests.
///
/// Every discovery response is `200 OK` with a JSON object, including for
/// missing, invalid, or unparseable parameters.
pub fn router<D, H>(resolver: AltConnectionResolver<D, H>) -> Router
where
    D: DnsLookup + Clone,
    H: DocumentFetch,
{
    let state = Arc::new(resolver);
    Router::new()
        .route("/", get(lookup::<D, H>))
        .route("/index.php", get(lookup::<D, H>))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn lookup<D, H>(
    State(resolver): State<Arc<AltConnectionResolver<D, H>>>,
    query: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Json<Methods>
where
    D: DnsLookup + Clone,
    H: DocumentFetch,
{
    let query = match query {
        Ok(Query(pairs)) => LookupQuery::from_pairs(pairs),
        Err(e) => {
            debug!(error = %e, "Unparseable query string");
            LookupQuery::default()
        }
    };
    let sources = Sources::from_param(query.sources.as_deref());
    Json(resolver.resolve(query.domain.as_deref(), sources).await)
}

async fn health() -> &'static str {
    "ok"
}

/// Builder for the discovery HTTP service.
pub struct Server {
    router: Router,
}

impl Server {
    /// Create a server for the resolver.
    pub fn new<D, H>(resolver: AltConnectionResolver<D, H>) -> Self
    where
        D: DnsLookup + Clone,
        H: DocumentFetch,
    {
        Self {
            router: router(resolver),
        }
    }

    /// Bind `addr` and start serving, returning a guard for shutdown.
    pub async fn bind(self, addr: SocketAddr) -> Result<ServerGuard> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener)
    }

    /// Serve on an already bound listener.
    pub fn serve(self, listener: TcpListener) -> Result<ServerGuard> {
        let local_addr = listener.local_addr()?;
        let (shutdown_tx, _) = broadcast::channel(1);
        let mut shutdown_rx = shutdown_tx.subscribe();

        info!(addr = %local_addr, "Serving alternative connection discovery");

        let router = self.router;
        let task = tokio::spawn(async move {
            let shutdown = async move {
                let _ = shutdown_rx.recv().await;
            };
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::error!("http server error: {e}");
            }
        });

        Ok(ServerGuard {
            local_addr,
            shutdown_tx,
            task: Some(task),
        })
    }
}

/// Guard for a running server.
pub struct ServerGuard {
    local_addr: SocketAddr,
    shutdown_tx: broadcast::Sender<()>,
    task: Option<JoinHandle<()>>,
}

impl ServerGuard {
    /// Address the server is listening on.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Graceful shutdown: stop accepting, finish in-flight requests.
    pub async fn shutdown(mut self) -> Result<()> {
        let _ = self.shutdown_tx.send(());
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("http server task failed: {e}");
            }
        }
        info!(addr = %self.local_addr, "Server stopped");
        Ok(())
    }
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
    }
}
