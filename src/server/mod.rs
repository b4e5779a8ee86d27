//! HTTP server for the browser player
//!
//! Serves the landing page, the wasm module and its loader script, plus a
//! health check and the noise configuration as JSON.

pub mod http;

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tokio::time::timeout;

use crate::config::ServerConfig;
use self::http::{Method, Request, Response};

pub const READ_TIMEOUT: Duration = Duration::from_secs(10);
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(10);
/// How long in-flight connections get after a shutdown signal
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

pub const WASM_FILE: &str = "brownnoise_bg.wasm";
pub const LOADER_FILE: &str = "brownnoise.js";

/// A file served at a fixed path
#[derive(Debug, Clone)]
pub struct StaticRoute {
    pub path: &'static str,
    pub file: PathBuf,
    pub content_type: &'static str,
}

/// Route table built once from the config and shared by all connections
#[derive(Debug)]
pub struct Routes {
    files: Vec<StaticRoute>,
    noise_json: Vec<u8>,
}

impl Routes {
    pub fn from_config(config: &ServerConfig) -> Result<Self, String> {
        let files = vec![
            StaticRoute {
                path: "/",
                file: config.static_dir.join("index.html"),
                content_type: "text/html; charset=utf-8",
            },
            StaticRoute {
                path: "/brownnoise_bg.wasm",
                file: config.pkg_dir.join(WASM_FILE),
                content_type: "application/wasm",
            },
            StaticRoute {
                path: "/brownnoise.js",
                file: config.pkg_dir.join(LOADER_FILE),
                content_type: "application/javascript",
            },
        ];

        let noise_json = serde_json::to_vec(&config.noise)
            .map_err(|e| format!("Failed to serialize noise config: {}", e))?;

        Ok(Self { files, noise_json })
    }

    pub fn files(&self) -> &[StaticRoute] {
        &self.files
    }

    pub async fn respond(&self, request: &Request) -> Response {
        if let Method::Other(method) = &request.method {
            log::debug!("Rejecting {} {}", method, request.path);
            return Response::text(405, "Method Not Allowed").with_header("Allow", "GET, HEAD");
        }

        match request.path.as_str() {
            "/health" => return Response::text(200, "OK"),
            "/config.json" => return Response::new(200, "application/json", self.noise_json.clone()),
            _ => {}
        }

        let Some(route) = self.files.iter().find(|r| r.path == request.path) else {
            return Response::text(404, "Not Found");
        };

        match tokio::fs::read(&route.file).await {
            Ok(body) => Response::new(200, route.content_type, body),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("Missing file for {}: {:?}", route.path, route.file);
                Response::text(404, "File not found")
            }
            Err(e) => {
                log::error!("Failed to read {:?}: {}", route.file, e);
                Response::text(500, "Internal Server Error")
            }
        }
    }
}

pub struct Server {
    listener: TcpListener,
    routes: Arc<Routes>,
}

impl Server {
    pub async fn bind(config: &ServerConfig) -> Result<Self, String> {
        let routes = Routes::from_config(config)?;
        let address = config.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|e| format!("Failed to bind {}: {}", address, e))?;

        Ok(Self {
            listener,
            routes: Arc::new(routes),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, String> {
        self.listener
            .local_addr()
            .map_err(|e| format!("Failed to get local address: {}", e))
    }

    /// Serve until `shutdown` resolves, then drain connections within [`SHUTDOWN_GRACE`]
    pub async fn run<F>(self, shutdown: F) -> Result<(), String>
    where
        F: Future<Output = ()>,
    {
        self.run_with_grace(shutdown, SHUTDOWN_GRACE).await
    }

    pub async fn run_with_grace<F>(self, shutdown: F, grace: Duration) -> Result<(), String>
    where
        F: Future<Output = ()>,
    {
        if let Ok(addr) = self.local_addr() {
            log::info!("Starting server on {}", addr);
        }
        log::info!("Server files:");
        for route in self.routes.files() {
            log::info!("  - {} -> {:?}", route.path, route.file);
        }

        let Server { listener, routes } = self;
        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let routes = routes.clone();
                        connections.spawn(async move {
                            if let Err(e) = handle_connection(stream, &routes).await {
                                log::debug!("Connection from {} ended with error: {}", peer, e);
                            }
                        });
                    }
                    Err(e) => log::warn!("Failed to accept connection: {}", e),
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        drop(listener);
        log::info!("Shutting down server...");

        let drain = async { while connections.join_next().await.is_some() {} };
        let drained = timeout(grace, drain).await.is_ok();
        if !drained {
            connections.abort_all();
            return Err(format!(
                "Server forced to shutdown, connections still open after {:?}",
                grace
            ));
        }

        log::info!("Server stopped");
        Ok(())
    }
}

async fn handle_connection(stream: TcpStream, routes: &Routes) -> Result<(), String> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let (response, include_body) = match timeout(READ_TIMEOUT, http::read_request_head(&mut reader)).await {
        Err(_) => (Response::text(408, "Request Timeout"), true),
        Ok(Err(e)) => {
            log::debug!("Bad request: {}", e);
            (Response::text(400, "Bad Request"), true)
        }
        Ok(Ok(head)) => match http::parse_request(&head) {
            Ok(request) => {
                let response = routes.respond(&request).await;
                log::debug!("{:?} {} -> {}", request.method, request.path, response.status);
                (response, request.method != Method::Head)
            }
            Err(e) => {
                log::debug!("Bad request: {}", e);
                (Response::text(400, "Bad Request"), true)
            }
        },
    };

    let bytes = response.to_bytes(include_body);
    timeout(WRITE_TIMEOUT, async {
        write_half.write_all(&bytes).await?;
        write_half.shutdown().await?;
        Ok::<(), std::io::Error>(())
    })
    .await
    .map_err(|_| "Write timed out".to_string())?
    .map_err(|e| format!("Failed to write response: {}", e))
}
