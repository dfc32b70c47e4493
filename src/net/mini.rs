//! Purpose: The "minimalist" client: one function call per request.
//! Exports: `Options`, `get`, `post`, `request`, `get_async`.
//! Role: Smallest style; a thin layer over `minreq` with crate errors and the shared `Response`.
//! Invariants: Requests always carry `Connection: close`; framing and chunked bodies are left to `minreq`.
//! Notes: `http` only. No redirects, no keep-alive.
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde_json::Value;
use url::Url;

use super::exchange::{Method, Request, Response, basic_auth_value};
use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Debug, Default)]
pub struct Options {
    pub auth: Option<(String, String)>,
    pub json: Option<Value>,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl Options {
    pub fn auth(mut self, user: &str, password: &str) -> Self {
        self.auth = Some((user.to_string(), password.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

pub fn get(url: &Url, options: &Options) -> Result<Response, Error> {
    request(Method::Get, url, options)
}

pub fn post(url: &Url, options: &Options) -> Result<Response, Error> {
    request(Method::Post, url, options)
}

/// Runs `get` on a fresh thread and passes the outcome to `handler` there.
pub fn get_async<F>(url: Url, options: Options, handler: F) -> JoinHandle<()>
where
    F: FnOnce(Result<Response, Error>) + Send + 'static,
{
    thread::spawn(move || handler(get(&url, &options)))
}

pub fn request(method: Method, url: &Url, options: &Options) -> Result<Response, Error> {
    let mut req = Request::new(method, url.clone());
    for (name, value) in &options.headers {
        req = req.header(name.as_str(), value.as_str());
    }
    if let Some((user, password)) = &options.auth {
        req = req.header("Authorization", basic_auth_value(user, password));
    }
    if let Some(body) = &options.json {
        req = req.json_body(body);
    }
    send(req, options.timeout)
}

fn send(req: Request, timeout: Option<Duration>) -> Result<Response, Error> {
    let url = req.url.clone();
    if url.scheme() != "http" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("minimalist client only supports http urls")
            .with_url(url.as_str()));
    }

    tracing::debug!(method = req.method.as_str(), url = %url, "mini request");
    let response = to_minreq(req, timeout)
        .send()
        .map_err(|err| {
            Error::new(ErrorKind::Network)
                .with_message("request failed")
                .with_url(url.as_str())
                .with_source(err)
        })
        .and_then(|resp| from_minreq(resp, &url))?;
    tracing::debug!(status = response.status, bytes = response.body.len(), "mini response");
    Ok(response)
}

fn to_minreq(req: Request, timeout: Option<Duration>) -> minreq::Request {
    let method = match req.method {
        Method::Get => minreq::Method::Get,
        Method::Post => minreq::Method::Post,
    };
    let mut out = minreq::Request::new(method, req.url.as_str())
        .with_header("Accept", "*/*")
        .with_header("Connection", "close");
    for (name, value) in req.headers {
        out = out.with_header(name, value);
    }
    if let Some(body) = req.body {
        out = out.with_body(body);
    }
    if let Some(timeout) = timeout {
        out = out.with_timeout(whole_seconds(timeout));
    }
    out
}

fn from_minreq(resp: minreq::Response, url: &Url) -> Result<Response, Error> {
    let status = u16::try_from(resp.status_code).map_err(|_| {
        Error::new(ErrorKind::Network)
            .with_message(format!("invalid status code {}", resp.status_code))
            .with_url(url.as_str())
    })?;
    let mut headers: Vec<(String, String)> = resp
        .headers
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    headers.sort();
    Ok(Response {
        status,
        headers,
        body: resp.into_bytes(),
    })
}

// `minreq` takes whole seconds; round up so short timeouts never become zero.
fn whole_seconds(timeout: Duration) -> u64 {
    let secs = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
    secs.max(1)
}

#[cfg(test)]
mod tests {
    use super::{Options, get, whole_seconds};
    use crate::core::error::ErrorKind;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::time::Duration;
    use url::Url;

    // Accepts one connection, waits for the request head, replies with `raw` and closes.
    fn reply_once(raw: &'static [u8]) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut seen = Vec::new();
            let mut buf = [0u8; 1024];
            while !seen.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).expect("read");
                if n == 0 {
                    break;
                }
                seen.extend_from_slice(&buf[..n]);
            }
            stream.write_all(raw).expect("write");
        });
        Url::parse(&format!("http://{addr}/get")).expect("url")
    }

    fn quick() -> Options {
        Options::default().timeout(Duration::from_secs(5))
    }

    #[test]
    fn content_length_body_is_returned() {
        let url = reply_once(
            b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 10\r\n\r\n{\"a\": 100}",
        );
        let response = get(&url, &quick()).expect("response");
        assert_eq!(response.status, 200);
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.json()["a"], 100);
    }

    #[test]
    fn chunked_body_is_decoded() {
        let url = reply_once(
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n",
        );
        let response = get(&url, &quick()).expect("response");
        assert_eq!(response.text(), "Wikipedia");
    }

    #[test]
    fn malformed_chunk_size_is_a_network_error() {
        let url = reply_once(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nzz\r\nab\r\n0\r\n\r\n");
        let err = get(&url, &quick()).expect_err("bad chunk size");
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.url(), Some(url.as_str()));
    }

    #[test]
    fn status_without_body() {
        let url = reply_once(
            b"HTTP/1.1 401 UNAUTHORIZED\r\nWWW-Authenticate: Basic realm=\"Fake Realm\"\r\nContent-Length: 0\r\n\r\n",
        );
        let response = get(&url, &quick()).expect("response");
        assert_eq!(response.status, 401);
        assert!(!response.ok());
        assert!(response.body.is_empty());
    }

    #[test]
    fn refused_connection_is_a_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);
        let url = Url::parse(&format!("http://{addr}/get")).expect("url");
        let err = get(&url, &quick()).expect_err("refused");
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[test]
    fn https_is_rejected() {
        let url = Url::parse("https://example.com/get").expect("url");
        let err = get(&url, &Options::default()).expect_err("https");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn timeouts_round_up_to_whole_seconds() {
        assert_eq!(whole_seconds(Duration::from_millis(1)), 1);
        assert_eq!(whole_seconds(Duration::from_millis(1500)), 2);
        assert_eq!(whole_seconds(Duration::from_secs(10)), 10);
    }
}
