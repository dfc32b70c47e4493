// HTTP walkthrough against an in-process echo server; no external network.
use std::process::Command;
use std::sync::mpsc;
use std::time::Duration;

use playgrounds::net::echo::{EchoHandle, EchoServer};
use playgrounds::net::exchange::{Endpoints, Request, sample_params};
use playgrounds::net::fluent::FluentClient;
use playgrounds::net::session::Session;
use playgrounds::net::{ClientStyle, NetTour, mini, tour};
use playgrounds::transcript::{Entry, EntryKind};
use serde_json::{Value, json};
use url::Url;

const TIMEOUT: Duration = Duration::from_secs(5);

fn start_echo() -> EchoHandle {
    EchoServer::bind("127.0.0.1:0".parse().expect("addr"))
        .expect("bind")
        .spawn()
        .expect("spawn")
}

fn values_in<'a>(entries: &'a [Entry], section: &str) -> Vec<(&'a str, &'a Value)> {
    entries
        .iter()
        .filter(|entry| entry.section == section)
        .map(|entry| {
            assert_eq!(entry.kind, EntryKind::Value, "{}: {}", entry.label, entry.value);
            (entry.label.as_str(), &entry.value)
        })
        .collect()
}

#[test]
fn every_client_style_completes_the_walkthrough() {
    let echo = start_echo();
    let transcript = tour(&NetTour {
        base_url: echo.base_url(),
        clients: ClientStyle::ALL.to_vec(),
        timeout: TIMEOUT,
    });

    for style in ClientStyle::ALL {
        let values = values_in(transcript.entries(), style.section());
        let labels: Vec<&str> = values.iter().map(|(label, _)| *label).collect();
        assert_eq!(
            labels,
            vec![
                "get status",
                "origin",
                "url",
                "auth status (no credentials)",
                "auth status",
                "user",
                "post status",
                "json.bar.baz",
            ],
            "{}",
            style.section()
        );
        let lookup = |label: &str| {
            values
                .iter()
                .find(|(l, _)| *l == label)
                .map(|(_, v)| (*v).clone())
                .expect(label)
        };
        assert_eq!(lookup("get status"), json!(200));
        assert_eq!(lookup("origin"), json!("127.0.0.1"));
        assert_eq!(lookup("url"), json!(format!("{}/get", echo.base_url())));
        assert_eq!(lookup("auth status (no credentials)"), json!(401));
        assert_eq!(lookup("auth status"), json!(200));
        assert_eq!(lookup("user"), json!("auser"));
        assert_eq!(lookup("post status"), json!(200));
        assert_eq!(lookup("json.bar.baz"), json!("qux"));
    }
    echo.shutdown().expect("shutdown");
}

#[test]
fn session_tasks_run_concurrently_and_complete_once() {
    let echo = start_echo();
    let endpoints = Endpoints::new(&echo.base_url()).expect("endpoints");
    let session = Session::new(TIMEOUT).expect("session");
    let (tx, rx) = mpsc::channel();

    let handles: Vec<_> = (0..8)
        .map(|idx| {
            let tx = tx.clone();
            let url = endpoints.post().expect("post");
            let body = json!({ "idx": idx });
            session
                .data_task(Request::post(url).json_body(&body), move |result| {
                    let _ = tx.send((idx, result));
                })
                .resume()
        })
        .collect();
    drop(tx);
    for handle in handles {
        handle.wait().expect("wait");
    }

    let mut seen: Vec<i64> = rx
        .into_iter()
        .map(|(idx, result)| {
            let response = result.expect("response");
            assert_eq!(response.status, 200);
            assert_eq!(response.json()["json"]["idx"], idx);
            idx
        })
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..8).collect::<Vec<_>>());
}

#[test]
fn fluent_and_mini_agree_on_echoed_headers() {
    let echo = start_echo();
    let url: Url = format!("{}/headers", echo.base_url()).parse().expect("url");

    let fluent = FluentClient::new(TIMEOUT)
        .get(url.clone())
        .header("X-Playground", "fluent")
        .response_json(|resp, json| (resp.status, json.expect("json")))
        .expect("fluent");
    assert_eq!(fluent.0, 200);
    assert_eq!(fluent.1["headers"]["X-Playground"], "fluent");

    let options = mini::Options {
        headers: vec![("X-Playground".to_string(), "mini".to_string())],
        timeout: Some(TIMEOUT),
        ..mini::Options::default()
    };
    let response = mini::get(&url, &options).expect("mini");
    assert_eq!(response.status, 200);
    assert_eq!(response.json()["headers"]["X-Playground"], "mini");
}

#[test]
fn status_endpoint_is_a_response_not_an_error() {
    let echo = start_echo();
    let url: Url = format!("{}/status/503", echo.base_url()).parse().expect("url");

    let fluent = FluentClient::new(TIMEOUT).get(url.clone()).response().expect("fluent");
    assert_eq!(fluent.status, 503);
    assert!(!fluent.ok());

    let mini = mini::get(&url, &mini::Options::default()).expect("mini");
    assert_eq!(mini.status, 503);
}

#[test]
fn post_echoes_raw_body_and_json() {
    let echo = start_echo();
    let endpoints = Endpoints::new(&echo.base_url()).expect("endpoints");
    let response = mini::post(
        &endpoints.post().expect("post"),
        &mini::Options::default().json(sample_params()),
    )
    .expect("post");
    let body = response.json();
    assert_eq!(body["json"], sample_params());
    assert_eq!(
        serde_json::from_str::<Value>(body["data"].as_str().expect("data")).expect("data json"),
        sample_params()
    );
    assert_eq!(body["headers"]["Content-Type"], "application/json");
}

#[test]
fn net_command_runs_locally() {
    let output = Command::new(env!("CARGO_BIN_EXE_playgrounds"))
        .args(["--format", "jsonl", "net", "--local", "--client", "mini", "--timeout", "5s"])
        .output()
        .expect("net");
    assert!(output.status.success());
    let entries: Vec<Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert!(entries.iter().all(|entry| entry["kind"] != "error"));
    assert!(
        entries
            .iter()
            .any(|entry| entry["label"] == "json.bar.baz" && entry["value"] == "qux")
    );
    assert!(
        entries
            .iter()
            .all(|entry| entry["section"] == "setup" || entry["section"] == "minimalist client")
    );
}

