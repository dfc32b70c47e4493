//! Purpose: The HTTP playground: the same three exchanges through three client styles.
//! Exports: client modules plus `ClientStyle`, `NetTour`, `Example`, `tour`.
//! Role: GET, basic-auth GET (without then with credentials), and POST with a JSON body.
//! Invariants: Entries are recorded in example order even when requests run concurrently.
//! Invariants: Transport failures become error entries; no request is retried.

pub mod echo;
pub mod exchange;
pub mod fluent;
pub mod mini;
pub mod session;

use std::sync::mpsc;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::core::error::{Error, ErrorKind};
use crate::json::dynamic::JsonExt;
use crate::transcript::Transcript;
use exchange::{Endpoints, Request, Response, sample_params};
use fluent::FluentClient;
use session::Session;

pub const AUTH_USER: &str = "auser";
pub const AUTH_PASS: &str = "apass";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClientStyle {
    Raw,
    Fluent,
    Mini,
}

impl ClientStyle {
    pub const ALL: [ClientStyle; 3] = [ClientStyle::Raw, ClientStyle::Fluent, ClientStyle::Mini];

    pub fn section(self) -> &'static str {
        match self {
            ClientStyle::Raw => "raw session",
            ClientStyle::Fluent => "fluent client",
            ClientStyle::Mini => "minimalist client",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Example {
    Get,
    AuthMissing,
    Auth,
    Post,
}

impl Example {
    pub const ALL: [Example; 4] = [
        Example::Get,
        Example::AuthMissing,
        Example::Auth,
        Example::Post,
    ];

    fn error_label(self) -> &'static str {
        match self {
            Example::Get => "get",
            Example::AuthMissing => "auth (no credentials)",
            Example::Auth => "auth",
            Example::Post => "post",
        }
    }
}

#[derive(Clone, Debug)]
pub struct NetTour {
    pub base_url: String,
    pub clients: Vec<ClientStyle>,
    pub timeout: Duration,
}

struct Urls {
    get: Url,
    auth: Url,
    post: Url,
}

impl Urls {
    fn new(endpoints: &Endpoints) -> Result<Self, Error> {
        Ok(Self {
            get: endpoints.get()?,
            auth: endpoints.basic_auth(AUTH_USER, AUTH_PASS)?,
            post: endpoints.post()?,
        })
    }

    fn request(&self, example: Example) -> Request {
        match example {
            Example::Get => Request::get(self.get.clone()),
            Example::AuthMissing => Request::get(self.auth.clone()),
            Example::Auth => Request::get(self.auth.clone()).basic_auth(AUTH_USER, AUTH_PASS),
            Example::Post => Request::post(self.post.clone()).json_body(&sample_params()),
        }
    }
}

type Outcome = Result<(u16, Value), Error>;

pub fn tour(cfg: &NetTour) -> Transcript {
    let mut out = Transcript::new("net");
    out.section("setup");
    let urls = match Endpoints::new(&cfg.base_url).and_then(|endpoints| Urls::new(&endpoints)) {
        Ok(urls) => urls,
        Err(err) => {
            out.error("endpoints", &err);
            return out;
        }
    };
    out.value("get url", urls.get.as_str());
    out.value("auth url", urls.auth.as_str());
    out.value("post url", urls.post.as_str());
    out.value("params", sample_params());

    for style in &cfg.clients {
        out.section(style.section());
        let outcomes = match style {
            ClientStyle::Raw => run_raw(&urls, cfg.timeout),
            ClientStyle::Fluent => run_fluent(&urls, cfg.timeout),
            ClientStyle::Mini => run_mini(&urls, cfg.timeout),
        };
        match outcomes {
            Ok(outcomes) => {
                for (example, outcome) in Example::ALL.into_iter().zip(outcomes) {
                    record(&mut out, example, outcome);
                }
            }
            Err(err) => out.error("client", &err),
        }
    }
    out
}

fn record(out: &mut Transcript, example: Example, outcome: Outcome) {
    let (status, json) = match outcome {
        Ok(pair) => pair,
        Err(err) => {
            out.error(example.error_label(), &err);
            return;
        }
    };
    match example {
        Example::Get => {
            out.value("get status", status);
            out.value("origin", json["origin"].string_value());
            out.value("url", json["url"].string_value());
        }
        Example::AuthMissing => out.value("auth status (no credentials)", status),
        Example::Auth => {
            out.value("auth status", status);
            out.value("user", json["user"].string_value());
        }
        Example::Post => {
            out.value("post status", status);
            out.value("json.bar.baz", json["json"]["bar"]["baz"].string_value());
        }
    }
}

fn status_and_json(response: Response) -> (u16, Value) {
    let json = response.json();
    (response.status, json)
}

/// All four tasks are resumed before any is awaited.
fn run_raw(urls: &Urls, timeout: Duration) -> Result<Vec<Outcome>, Error> {
    let session = Session::new(timeout)?;
    let (tx, rx) = mpsc::channel();
    let handles: Vec<_> = Example::ALL
        .into_iter()
        .enumerate()
        .map(|(idx, example)| {
            let tx = tx.clone();
            session
                .data_task(urls.request(example), move |result| {
                    let _ = tx.send((idx, result.map(status_and_json)));
                })
                .resume()
        })
        .collect();
    drop(tx);
    for handle in handles {
        handle.wait()?;
    }

    let mut done: Vec<(usize, Outcome)> = rx.into_iter().collect();
    done.sort_by_key(|(idx, _)| *idx);
    Ok(done.into_iter().map(|(_, outcome)| outcome).collect())
}

fn run_fluent(urls: &Urls, timeout: Duration) -> Result<Vec<Outcome>, Error> {
    let client = FluentClient::new(timeout);
    let to_pair =
        |resp: &Response, json: Result<Value, Error>| (resp.status, json.unwrap_or(Value::Null));
    Ok(vec![
        client.get(urls.get.clone()).response_json(to_pair),
        client
            .get(urls.auth.clone())
            .response()
            .map(|resp| (resp.status, Value::Null)),
        client
            .get(urls.auth.clone())
            .authenticate(AUTH_USER, AUTH_PASS)
            .response_json(to_pair),
        client
            .post(urls.post.clone())
            .json(&sample_params())
            .response_json(to_pair),
    ])
}

fn run_mini(urls: &Urls, timeout: Duration) -> Result<Vec<Outcome>, Error> {
    let options = mini::Options::default().timeout(timeout);
    let get = mini::get(&urls.get, &options).map(status_and_json);
    let missing = mini::get(&urls.auth, &options).map(status_and_json);

    let (tx, rx) = mpsc::channel();
    let worker = mini::get_async(
        urls.auth.clone(),
        options.clone().auth(AUTH_USER, AUTH_PASS),
        move |result| {
            let _ = tx.send(result.map(status_and_json));
        },
    );
    worker.join().map_err(|_| {
        Error::new(ErrorKind::Internal)
            .with_message("minimalist client thread panicked")
    })?;
    let auth = rx.recv().map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("minimalist client produced no result")
            .with_source(err)
    })?;

    let post = mini::post(&urls.post, &options.json(sample_params())).map(status_and_json);
    Ok(vec![get, missing, auth, post])
}
