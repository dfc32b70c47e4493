//! Purpose: The "fluent" client: chainable requests over a shared `ureq::Agent`.
//! Exports: `FluentClient`, `FluentRequest`.
//! Role: Mid-level style; builder calls end in `response()` or `response_json(handler)`.
//! Invariants: Error statuses come back as responses; only transport failures are errors.
use std::io::Read;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use super::exchange::{Method, Request, Response, basic_auth_value};
use crate::core::error::{Error, ErrorKind};
use crate::json::parse;

#[derive(Clone)]
pub struct FluentClient {
    agent: ureq::Agent,
}

impl FluentClient {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }

    pub fn request(&self, method: Method, url: Url) -> FluentRequest {
        FluentRequest {
            agent: self.agent.clone(),
            request: Request::new(method, url),
        }
    }

    pub fn get(&self, url: Url) -> FluentRequest {
        self.request(Method::Get, url)
    }

    pub fn post(&self, url: Url) -> FluentRequest {
        self.request(Method::Post, url)
    }
}

pub struct FluentRequest {
    agent: ureq::Agent,
    request: Request,
}

impl FluentRequest {
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.request = self.request.header(name, value);
        self
    }

    pub fn authenticate(self, user: &str, password: &str) -> Self {
        let value = basic_auth_value(user, password);
        self.header("Authorization", &value)
    }

    pub fn json(mut self, body: &Value) -> Self {
        self.request = self.request.json_body(body);
        self
    }

    pub fn response(self) -> Result<Response, Error> {
        let url = self.request.url.clone();
        tracing::debug!(method = self.request.method.as_str(), url = %url, "fluent request");
        let mut call = self.agent.request(self.request.method.as_str(), url.as_str());
        for (name, value) in &self.request.headers {
            call = call.set(name, value);
        }
        let result = match &self.request.body {
            Some(body) => call.send_bytes(body),
            None => call.call(),
        };
        match result {
            Ok(resp) => read_response(resp, &url),
            Err(ureq::Error::Status(_, resp)) => read_response(resp, &url),
            Err(ureq::Error::Transport(err)) => Err(Error::new(ErrorKind::Network)
                .with_message("request failed")
                .with_url(url.as_str())
                .with_source(err)),
        }
    }

    /// Runs the request and hands the response plus its decoded body to `handler`.
    pub fn response_json<T>(
        self,
        handler: impl FnOnce(&Response, Result<Value, Error>) -> T,
    ) -> Result<T, Error> {
        let response = self.response()?;
        let json = parse::from_slice::<Value>(&response.body)
            .map_err(|err| parse::decode_error("response body is not json", err));
        Ok(handler(&response, json))
    }
}

fn read_response(resp: ureq::Response, url: &Url) -> Result<Response, Error> {
    let status = resp.status();
    let headers = resp
        .headers_names()
        .into_iter()
        .filter_map(|name| {
            let value = resp.header(&name)?.to_string();
            Some((name, value))
        })
        .collect();
    let mut body = Vec::new();
    resp.into_reader().read_to_end(&mut body).map_err(|err| {
        Error::new(ErrorKind::Network)
            .with_message("failed to read response body")
            .with_url(url.as_str())
            .with_source(err)
    })?;
    tracing::debug!(status, bytes = body.len(), "fluent response");
    Ok(Response {
        status,
        headers,
        body,
    })
}
