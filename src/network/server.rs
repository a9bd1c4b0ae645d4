//! HTTP API Server
//!
//! Accept loop for the JSON API plus the background job that publishes each
//! day's puzzle. Each accepted socket is served by hyper on its own task;
//! sockets beyond the connection limit get a canned 503 and are closed
//! straight away.

use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use axum::extract::Request;
use chrono::Utc;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, Semaphore};
use tokio::time::{interval, timeout, MissedTickBehavior};
use tower::Service;
use tracing::{info, warn, error, debug, instrument};

use crate::game::daily::ImagePool;
use crate::network::auth::AuthConfig;
use crate::network::router::api_router;
use crate::network::service::{DailyJobOutcome, PuzzleService};
use crate::store::KvStore;

/// Written to sockets over the connection limit before they are dropped.
const BUSY_RESPONSE: &[u8] = b"HTTP/1.1 503 Service Unavailable\r\n\
content-type: application/json\r\n\
content-length: 42\r\n\
connection: close\r\n\r\n\
{\"status\":\"error\",\"message\":\"server busy\"}";

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections.
    pub max_connections: usize,
    /// Longest a connection may stay open, request headers included.
    pub connection_timeout: Duration,
    /// How often the daily job checks for a new day.
    pub daily_check_interval: Duration,
    /// Mixed into the daily seed hash.
    pub seed_salt: String,
    /// Images the daily job rotates through.
    pub images: ImagePool,
    /// JSON store file; `None` keeps everything in memory.
    pub store_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_connections: 1000,
            connection_timeout: Duration::from_secs(30),
            daily_check_interval: Duration::from_secs(300),
            seed_salt: String::new(),
            images: ImagePool::fallback(),
            store_path: None,
        }
    }
}

impl ServerConfig {
    /// Read `DAILY_SLIDE_*` environment variables over the defaults.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let images = match lookup("DAILY_SLIDE_IMAGES") {
            Some(list) => {
                let pool = ImagePool::parse_list(&list);
                if pool.is_empty() {
                    warn!("DAILY_SLIDE_IMAGES has no usable entries, using the default image");
                    defaults.images
                } else {
                    pool
                }
            }
            None => defaults.images,
        };

        Ok(Self {
            bind_addr: parse_var(&lookup, "DAILY_SLIDE_BIND_ADDR", defaults.bind_addr)?,
            max_connections: parse_var(&lookup, "DAILY_SLIDE_MAX_CONNECTIONS", defaults.max_connections)?,
            connection_timeout: Duration::from_secs(parse_var(
                &lookup,
                "DAILY_SLIDE_TIMEOUT_SECS",
                defaults.connection_timeout.as_secs(),
            )?),
            daily_check_interval: Duration::from_secs(parse_var(
                &lookup,
                "DAILY_SLIDE_DAILY_CHECK_SECS",
                defaults.daily_check_interval.as_secs(),
            )?)
            .max(Duration::from_secs(1)),
            seed_salt: lookup("DAILY_SLIDE_SEED_SALT").unwrap_or(defaults.seed_salt),
            images,
            store_path: lookup("DAILY_SLIDE_STORE_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ServerError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ServerError::Config(format!("{}={:?}: {}", name, raw, e))),
        None => Ok(default),
    }
}

/// Server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),

    /// Bad configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// The API server.
pub struct ApiServer<S: KvStore> {
    config: ServerConfig,
    service: Arc<PuzzleService<S>>,
    app: axum::Router,
    connections: Arc<Semaphore>,
    shutdown_tx: broadcast::Sender<()>,
}

impl<S: KvStore> ApiServer<S> {
    /// Create a server for `service`.
    pub fn new(config: ServerConfig, service: Arc<PuzzleService<S>>, auth: AuthConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let connections = Arc::new(Semaphore::new(config.max_connections));
        let app = api_router(service.clone(), auth);

        Self {
            config,
            service,
            app,
            connections,
            shutdown_tx,
        }
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn run(&self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!("API server listening on {}", self.config.bind_addr);
        self.serve(listener).await;
        Ok(())
    }

    /// Serve on an already-bound listener until shutdown.
    #[instrument(skip_all)]
    pub async fn serve(&self, listener: TcpListener) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let job_service = self.service.clone();
        let job_interval = self.config.daily_check_interval;
        let job_shutdown = self.shutdown_tx.subscribe();
        let daily_handle = tokio::spawn(async move {
            run_daily_loop(job_service, job_interval, job_shutdown).await;
        });

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => self.handle_connection(stream, addr),
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        daily_handle.abort();
    }

    /// Serve one connection on its own task, or turn it away if full.
    fn handle_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let permit = match self.connections.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Connection limit reached, rejecting {}", addr);
                // Best effort, no task and no read; the socket closes on drop
                let _ = stream.try_write(BUSY_RESPONSE);
                return;
            }
        };

        let app = self.app.clone();
        let limit = self.config.connection_timeout;

        tokio::spawn(async move {
            let _permit = permit;
            let service = service_fn(move |request: Request<Incoming>| app.clone().call(request));

            let mut builder = http1::Builder::new();
            builder.timer(TokioTimer::new()).header_read_timeout(limit);
            let connection = builder.serve_connection(TokioIo::new(stream), service);

            match timeout(limit, connection).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!("Connection {} ended with error: {}", addr, e),
                Err(_) => debug!("Connection {} closed after {:?}", addr, limit),
            }
        });
    }

    /// Shutdown the server.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Connections currently being served.
    pub fn connection_count(&self) -> usize {
        self.config.max_connections - self.connections.available_permits()
    }
}

/// Publish the daily state whenever the UTC date changes.
async fn run_daily_loop<S: KvStore>(
    service: Arc<PuzzleService<S>>,
    period: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let today = Utc::now().date_naive();
                match service.ensure_daily_state(today).await {
                    Ok(DailyJobOutcome::Created) => info!("Daily puzzle published for {}", today),
                    Ok(DailyJobOutcome::AlreadyPresent) => debug!("Daily puzzle for {} already present", today),
                    Ok(DailyJobOutcome::NoImage) => warn!("No daily puzzle for {}: no image", today),
                    Err(e) => error!("Daily job failed: {}", e),
                }
            }
            _ = shutdown_rx.recv() => break,
        }
    }
}
