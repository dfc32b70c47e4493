//! Purpose: A local httpbin-compatible echo endpoint for offline HTTP walkthroughs.
//! Exports: `EchoServer`, `EchoHandle`, `router`.
//! Role: Axum server; `spawn` runs it on a background thread, `serve` in the foreground.
//! Invariants: Response shapes match the httpbin fields the HTTP walkthrough reads.
//! Invariants: `/basic-auth` answers 401 with a Basic challenge unless credentials match.
use std::collections::BTreeMap;
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::thread::JoinHandle;

use axum::{Json, Router};
use axum::extract::{ConnectInfo, Path as AxumPath, Query};
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde_json::{Map, Value, json};
use tokio::sync::oneshot;
use tokio::time::Duration;
use tower_http::trace::TraceLayer;

use crate::core::error::{Error, ErrorKind};

pub fn router() -> Router {
    Router::new()
        .route("/get", get(echo_get))
        .route("/headers", get(echo_headers))
        .route("/basic-auth/:user/:passwd", get(basic_auth))
        .route("/post", post(echo_post))
        .route("/status/:code", get(status))
        .layer(TraceLayer::new_for_http())
}

pub struct EchoServer {
    listener: std::net::TcpListener,
    addr: SocketAddr,
}

impl EchoServer {
    pub fn bind(addr: SocketAddr) -> Result<Self, Error> {
        let listener = std::net::TcpListener::bind(addr).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message(format!("failed to bind echo server on {addr}"))
                .with_source(err)
        })?;
        listener.set_nonblocking(true).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to configure echo listener")
                .with_source(err)
        })?;
        let addr = listener.local_addr().map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read echo listener address")
                .with_source(err)
        })?;
        Ok(Self { listener, addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.local_addr())
    }

    /// Serves on a dedicated thread until the handle is shut down or dropped.
    pub fn spawn(self) -> Result<EchoHandle, Error> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| {
                Error::new(ErrorKind::Internal)
                    .with_message("failed to start echo runtime")
                    .with_source(err)
            })?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let addr = self.addr;
        let thread = std::thread::Builder::new()
            .name("playgrounds-echo".to_string())
            .spawn(move || {
                runtime.block_on(self.run(async {
                    let _ = shutdown_rx.await;
                }))
            })
            .map_err(|err| {
                Error::new(ErrorKind::Internal)
                    .with_message("failed to spawn echo thread")
                    .with_source(err)
            })?;
        tracing::info!(%addr, "echo server listening");
        Ok(EchoHandle {
            addr,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    /// Serves in the foreground until Ctrl-C or SIGTERM.
    pub async fn serve(self) -> Result<(), Error> {
        tracing::info!(addr = %self.addr, "echo server listening");
        self.run(shutdown_signal()).await
    }

    async fn run(self, shutdown: impl Future<Output = ()>) -> Result<(), Error> {
        let listener = tokio::net::TcpListener::from_std(self.listener).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to register echo listener")
                .with_source(err)
        })?;
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = axum::serve(
            listener,
            router().into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async {
            let _ = stop_rx.await;
        })
        .into_future();
        tokio::pin!(server);

        tokio::select! {
            result = &mut server => {
                result.map_err(server_error)?;
            }
            _ = shutdown => {
                let _ = stop_tx.send(());
                match tokio::time::timeout(Duration::from_secs(5), &mut server).await {
                    Ok(result) => result.map_err(server_error)?,
                    Err(_) => {
                        return Err(Error::new(ErrorKind::Io)
                            .with_message("echo server shutdown timed out"));
                    }
                }
            }
        };
        Ok(())
    }
}

pub struct EchoHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<Result<(), Error>>>,
}

impl EchoHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.local_addr())
    }

    pub fn shutdown(mut self) -> Result<(), Error> {
        self.stop()
    }

    fn stop(&mut self) -> Result<(), Error> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| {
                Error::new(ErrorKind::Internal).with_message("echo server thread panicked")
            })?,
            None => Ok(()),
        }
    }
}

impl Drop for EchoHandle {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            tracing::warn!(error = %err, "echo server stopped with error");
        }
    }
}

fn server_error(err: std::io::Error) -> Error {
    Error::new(ErrorKind::Io)
        .with_message("echo server failed")
        .with_source(err)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    #[cfg(not(unix))]
    ctrl_c.await;
}

async fn echo_get(
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(args): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    Json(json!({
        "args": args,
        "headers": headers_json(&headers),
        "origin": peer.ip().to_string(),
        "url": full_url(&headers, &uri),
    }))
    .into_response()
}

async fn echo_headers(headers: HeaderMap) -> Response {
    Json(json!({ "headers": headers_json(&headers) })).into_response()
}

async fn basic_auth(
    AxumPath((user, passwd)): AxumPath<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let supplied = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(decode_basic);
    match supplied {
        Some((given_user, given_pass)) if given_user == user && given_pass == passwd => {
            Json(json!({ "authenticated": true, "user": user })).into_response()
        }
        _ => {
            let mut response = StatusCode::UNAUTHORIZED.into_response();
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"Fake Realm\""),
            );
            response
        }
    }
}

async fn echo_post(
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(args): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Response {
    let data = String::from_utf8_lossy(&body).into_owned();
    let parsed = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);
    Json(json!({
        "args": args,
        "data": data,
        "files": {},
        "form": {},
        "headers": headers_json(&headers),
        "json": parsed,
        "origin": peer.ip().to_string(),
        "url": full_url(&headers, &uri),
    }))
    .into_response()
}

async fn status(AxumPath(code): AxumPath<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) => status.into_response(),
        Err(_) => (StatusCode::BAD_REQUEST, "invalid status code").into_response(),
    }
}

fn decode_basic(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (user, pass) = text.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

fn headers_json(headers: &HeaderMap) -> Value {
    let mut out = Map::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        out.insert(title_case(name.as_str()), Value::String(value));
    }
    Value::Object(out)
}

/// `content-type` -> `Content-Type`.
fn title_case(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

fn full_url(headers: &HeaderMap, uri: &Uri) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    format!("http://{host}{path}")
}

#[cfg(test)]
mod tests {
    use super::{EchoServer, decode_basic, title_case};
    use crate::net::exchange::basic_auth_value;

    #[test]
    fn basic_credentials_decode() {
        let header = basic_auth_value("auser", "apass");
        assert_eq!(
            decode_basic(&header),
            Some(("auser".to_string(), "apass".to_string()))
        );
        assert_eq!(decode_basic("Bearer abc"), None);
        assert_eq!(decode_basic("Basic !!!"), None);
    }

    #[test]
    fn header_names_are_title_cased() {
        assert_eq!(title_case("content-type"), "Content-Type");
        assert_eq!(title_case("host"), "Host");
        assert_eq!(title_case("x-amzn-trace-id"), "X-Amzn-Trace-Id");
    }

    #[test]
    fn spawned_server_answers_and_shuts_down() {
        let server = EchoServer::bind("127.0.0.1:0".parse().expect("addr")).expect("bind");
        let handle = server.spawn().expect("spawn");
        let url = format!("{}/status/418", handle.base_url());
        let status = match ureq::get(&url).call() {
            Ok(resp) => resp.status(),
            Err(ureq::Error::Status(code, _)) => code,
            Err(err) => panic!("transport error: {err}"),
        };
        assert_eq!(status, 418);
        handle.shutdown().expect("shutdown");
    }
}
