//! Purpose: Client-neutral request/response values shared by every HTTP client style.
//! Exports: `Method`, `Request`, `Response`, `Endpoints`, `basic_auth_value`, `sample_params`.
//! Role: Lets the walkthrough describe an exchange once and hand it to any client.
//! Invariants: Header names compare case-insensitively; insertion order is preserved.
//! Invariants: Any received status is a `Response`; only transport failures are errors.
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use url::Url;

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn basic_auth(self, user: &str, password: &str) -> Self {
        self.header("Authorization", basic_auth_value(user, password))
    }

    pub fn json_body(mut self, body: &Value) -> Self {
        self.body = Some(body.to_string().into_bytes());
        self.header("Content-Type", "application/json")
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// The body as JSON, or `null` when it is empty or not JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

pub fn basic_auth_value(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

pub fn sample_params() -> Value {
    json!({
        "foo": [1, 2, 3],
        "bar": {
            "baz": "qux"
        }
    })
}

/// URLs of the echo endpoints, relative to a base such as `http://httpbin.org`.
#[derive(Clone, Debug)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(base: &str) -> Result<Self, Error> {
        let mut base = Url::parse(base).map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message("invalid echo base url")
                .with_url(base)
                .with_source(err)
        })?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("echo base url must use http or https scheme")
                .with_url(base.as_str()));
        }
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn get(&self) -> Result<Url, Error> {
        self.build(&["get"])
    }

    pub fn basic_auth(&self, user: &str, password: &str) -> Result<Url, Error> {
        self.build(&["basic-auth", user, password])
    }

    pub fn post(&self) -> Result<Url, Error> {
        self.build(&["post"])
    }

    fn build(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                Error::new(ErrorKind::Usage)
                    .with_message("echo base url cannot be a base")
                    .with_url(self.base.as_str())
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::{Endpoints, Request, Response, basic_auth_value, sample_params};
    use crate::core::error::ErrorKind;
    use url::Url;

    #[test]
    fn basic_auth_header_is_base64_of_user_colon_pass() {
        assert_eq!(basic_auth_value("auser", "apass"), "Basic YXVzZXI6YXBhc3M=");
    }

    #[test]
    fn endpoints_append_to_base() {
        let endpoints = Endpoints::new("http://httpbin.org").expect("endpoints");
        assert_eq!(endpoints.get().expect("get").as_str(), "http://httpbin.org/get");
        assert_eq!(
            endpoints.basic_auth("auser", "apass").expect("auth").as_str(),
            "http://httpbin.org/basic-auth/auser/apass"
        );

        let prefixed = Endpoints::new("http://127.0.0.1:8080/echo/").expect("endpoints");
        assert_eq!(
            prefixed.post().expect("post").as_str(),
            "http://127.0.0.1:8080/echo/post"
        );
    }

    #[test]
    fn endpoints_reject_other_schemes() {
        let err = Endpoints::new("ftp://example.com").expect_err("scheme");
        assert_eq!(err.kind(), ErrorKind::Usage);
        let err = Endpoints::new("not a url").expect_err("parse");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn json_body_sets_content_type() {
        let url = Url::parse("http://localhost/post").expect("url");
        let request = Request::post(url).json_body(&sample_params());
        assert_eq!(request.header_value("content-type"), Some("application/json"));
        let body: serde_json::Value =
            serde_json::from_slice(request.body.as_deref().expect("body")).expect("json");
        assert_eq!(body["bar"]["baz"], "qux");
    }

    #[test]
    fn response_helpers() {
        let response = Response {
            status: 401,
            headers: vec![("WWW-Authenticate".into(), "Basic realm=\"Fake Realm\"".into())],
            body: Vec::new(),
        };
        assert!(!response.ok());
        assert!(response.header("www-authenticate").is_some());
        assert!(response.json().is_null());
    }
}
