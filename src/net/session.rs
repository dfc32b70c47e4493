//! Purpose: The "raw session" client: suspended data tasks with completion callbacks.
//! Exports: `Session`, `DataTask`, `TaskHandle`.
//! Role: Lowest-level style; one HTTP/1.1 exchange per task over hyper's connection API.
//! Invariants: Completion runs exactly once per resumed task, on a runtime worker thread.
//! Invariants: Tasks only accept `http` URLs; each task is bounded by the session timeout.
//! Notes: Each task dials a fresh connection; nothing is pooled or retried.
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use url::{Position, Url};

use super::exchange::{Request, Response};
use crate::core::error::{Error, ErrorKind};

type Completion = Box<dyn FnOnce(Result<Response, Error>) + Send + 'static>;

pub struct Session {
    runtime: Arc<Runtime>,
    timeout: Duration,
}

impl Session {
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("playgrounds-session")
            .enable_all()
            .build()
            .map_err(|err| {
                Error::new(ErrorKind::Internal)
                    .with_message("failed to start session runtime")
                    .with_source(err)
            })?;
        Ok(Self {
            runtime: Arc::new(runtime),
            timeout,
        })
    }

    /// Prepares a task; nothing is sent until [`DataTask::resume`].
    pub fn data_task<F>(&self, request: Request, completion: F) -> DataTask
    where
        F: FnOnce(Result<Response, Error>) + Send + 'static,
    {
        DataTask {
            runtime: Arc::clone(&self.runtime),
            timeout: self.timeout,
            request,
            completion: Box::new(completion),
        }
    }
}

pub struct DataTask {
    runtime: Arc<Runtime>,
    timeout: Duration,
    request: Request,
    completion: Completion,
}

impl DataTask {
    pub fn resume(self) -> TaskHandle {
        let DataTask {
            runtime,
            timeout,
            request,
            completion,
        } = self;
        let join = runtime.spawn(async move {
            let url = request.url.clone();
            let result = match tokio::time::timeout(timeout, perform(request)).await {
                Ok(result) => result,
                Err(_) => Err(Error::new(ErrorKind::Network)
                    .with_message(format!("request timed out after {}ms", timeout.as_millis()))
                    .with_url(url.as_str())),
            };
            completion(result);
        });
        TaskHandle { runtime, join }
    }
}

pub struct TaskHandle {
    runtime: Arc<Runtime>,
    join: JoinHandle<()>,
}

impl TaskHandle {
    /// Blocks until the task's completion has returned.
    pub fn wait(self) -> Result<(), Error> {
        self.runtime.block_on(self.join).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("session task did not complete")
                .with_source(err)
        })
    }
}

async fn perform(request: Request) -> Result<Response, Error> {
    let url = &request.url;
    if url.scheme() != "http" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("raw session only supports http urls")
            .with_url(url.as_str()));
    }
    let host = url.host_str().ok_or_else(|| {
        Error::new(ErrorKind::Usage)
            .with_message("url has no host")
            .with_url(url.as_str())
    })?;
    let port = url.port_or_known_default().unwrap_or(80);

    tracing::debug!(method = request.method.as_str(), url = %url, "session request");
    let stream = TcpStream::connect((host, port))
        .await
        .map_err(|err| network_error("failed to connect", url, err))?;
    let (mut sender, connection) = http1::handshake(TokioIo::new(stream))
        .await
        .map_err(|err| network_error("http handshake failed", url, err))?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            tracing::debug!(error = %err, "session connection closed with error");
        }
    });

    let mut builder = hyper::Request::builder()
        .method(request.method.as_str())
        .uri(request_target(url))
        .header(hyper::header::HOST, &url[Position::BeforeHost..Position::AfterPort]);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    let body = Full::new(Bytes::from(request.body.clone().unwrap_or_default()));
    let outgoing = builder.body(body).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid request")
            .with_url(url.as_str())
            .with_source(err)
    })?;

    let incoming = sender
        .send_request(outgoing)
        .await
        .map_err(|err| network_error("request failed", url, err))?;
    let status = incoming.status().as_u16();
    let headers = incoming
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let body = incoming
        .into_body()
        .collect()
        .await
        .map_err(|err| network_error("failed to read response body", url, err))?
        .to_bytes()
        .to_vec();
    tracing::debug!(status, bytes = body.len(), "session response");
    Ok(Response {
        status,
        headers,
        body,
    })
}

fn request_target(url: &Url) -> &str {
    let target = &url[Position::BeforePath..Position::AfterQuery];
    if target.is_empty() { "/" } else { target }
}

fn network_error(
    message: &str,
    url: &Url,
    err: impl std::error::Error + Send + Sync + 'static,
) -> Error {
    Error::new(ErrorKind::Network)
        .with_message(message)
        .with_url(url.as_str())
        .with_source(err)
}
