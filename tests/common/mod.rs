//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use api_gateway::config::GatewayConfig;
use api_gateway::{GatewayServer, Shutdown};
use axum::{
    body::Bytes,
    http::{HeaderMap, Method, StatusCode, Uri},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

async fn bind_local() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn closed_port() -> SocketAddr {
    let (listener, addr) = bind_local().await;
    drop(listener);
    addr
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let headers: serde_json::Map<String, Value> = headers
        .iter()
        .map(|(k, v)| (k.to_string(), json!(v.to_str().unwrap_or_default())))
        .collect();

    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    }))
}

/// Start a backend that answers every request with a JSON description of it.
#[allow(dead_code)]
pub async fn start_echo_backend() -> SocketAddr {
    let (listener, addr) = bind_local().await;
    let app = Router::new().fallback(echo);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start a simple mock backend that writes a fixed raw HTTP response.
#[allow(dead_code)]
pub async fn start_mock_backend(response: &'static [u8]) -> SocketAddr {
    let (listener, addr) = bind_local().await;

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        // Consume the request head before answering.
                        let mut buf = Vec::new();
                        let mut chunk = [0u8; 1024];
                        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                            }
                        }
                        let _ = socket.write_all(response).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a backend that reads requests but never answers. The receiver
/// fires once the gateway closes the connection.
#[allow(dead_code)]
pub async fn start_silent_backend() -> (SocketAddr, oneshot::Receiver<()>) {
    let (listener, addr) = bind_local().await;
    let (closed_tx, closed_rx) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut chunk = [0u8; 1024];
        loop {
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(_) => continue,
            }
        }
        let _ = closed_tx.send(());
    });

    (addr, closed_rx)
}

/// Start a programmable mock backend with async support.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(Method, Uri) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let (listener, addr) = bind_local().await;
    let f = Arc::new(f);

    let app = Router::new().fallback(move |method: Method, uri: Uri| {
        let f = f.clone();
        async move {
            let (status, body) = f(method, uri).await;
            (
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                body,
            )
        }
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Default gateway config pointing at `backend`.
#[allow(dead_code)]
pub fn gateway_config(backend: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.backend.url = Some(format!("http://{backend}"));
    config
}

/// A gateway running on an ephemeral port. Stops when dropped.
#[allow(dead_code)]
pub struct TestGateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

#[allow(dead_code)]
pub async fn spawn_gateway(config: GatewayConfig) -> TestGateway {
    let (listener, addr) = bind_local().await;
    let server = GatewayServer::new(config).expect("valid gateway config");
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestGateway { addr, shutdown }
}

#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
