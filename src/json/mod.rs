//! Purpose: The JSON playground: typed decoding versus forgiving dynamic access.
//! Exports: `parse`, `dynamic`, `typed` modules plus `JsonTour` and `tour`.
//! Role: Parses a small inline document and a larger bundled one, then serializes.
//! Invariants: Decode failures are recorded with their category; the tour continues.

pub mod dynamic;
pub mod parse;
pub mod typed;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::{Value, json};

use crate::core::error::Error;
use crate::files::bundle::Bundle;
use crate::transcript::Transcript;
use dynamic::{Json, JsonExt};
use typed::{Person, sample_dump};

pub const SMALL_JSON: &str = r#"{"a": 100, "b": 200}"#;

#[derive(Clone, Debug)]
pub struct JsonTour {
    pub bundle: Bundle,
    /// Replaces the bundled `test.json` as the large document.
    pub input: Option<PathBuf>,
}

pub fn tour(cfg: &JsonTour) -> Transcript {
    let mut out = Transcript::new("json");
    let small = SMALL_JSON.as_bytes();

    out.section("small (typed)");
    match parse::from_slice::<BTreeMap<String, i64>>(small) {
        Ok(map) => {
            let a = map.get("a").copied().unwrap_or_default();
            let b = map.get("b").copied().unwrap_or_default();
            out.value("small", format!("a: {a}  b: {b}"));
        }
        Err(_) => out.value("small", "Couldn't convert to map of integers"),
    }
    match parse::from_slice::<BTreeMap<String, String>>(small) {
        Ok(map) => out.value("as strings", map),
        Err(err) => out.value(
            "as strings",
            format!(
                "Couldn't convert to map of strings ({} error)",
                parse::categorize_error(&err).as_str()
            ),
        ),
    }

    out.section("small (dynamic)");
    let small_json = Json::parse(small);
    let a = small_json["a"].int_value();
    let b = small_json["b"].int();
    out.value("small", format!("a: {a}  b: {b:?}"));

    out.section("large (dynamic)");
    match load_large(cfg) {
        Ok(bytes) => {
            large_dynamic(&mut out, &bytes);
            out.section("large (typed)");
            large_typed(&mut out, &bytes);
        }
        Err(err) => out.error("load", &err),
    }

    out.section("serialize (typed)");
    match serde_json::to_vec_pretty(&sample_dump()) {
        Ok(bytes) => {
            out.value("raw data", format!("{} bytes", bytes.len()));
            out.value("string", String::from_utf8_lossy(&bytes).into_owned());
        }
        Err(err) => out.error("serialize", &parse::decode_error("failed to serialize", err)),
    }

    out.section("serialize (dynamic)");
    let dump = json!({
        "name": "Jack",
        "age": 25,
        "list": ["a", "b", "c", {"what": "this"}],
    });
    let raw = dump.raw_string();
    out.value("raw data", format!("{} bytes", raw.len()));
    out.value("string", raw);

    out
}

fn load_large(cfg: &JsonTour) -> Result<Vec<u8>, Error> {
    match &cfg.input {
        Some(path) => {
            std::fs::read(path).map_err(|err| Error::io(err, "failed to read json input", path))
        }
        None => cfg.bundle.read("test", "json"),
    }
}

fn large_dynamic(out: &mut Transcript, bytes: &[u8]) {
    let doc = Json::parse(bytes);
    if let Some(err) = doc.error() {
        out.error("parse", err);
        return;
    }
    out.value("count", format!("We've read in {} items", doc.count()));

    let item1 = &doc[0];
    for (key, val) in item1.entries() {
        match key.as_str() {
            "tags" => {
                for (_, tag) in val.entries() {
                    out.value("tag", tag.string_value());
                }
            }
            "friends" => {
                for (_, friend) in val.entries() {
                    let id = &friend["id"];
                    let name = &friend["name"];
                    out.value("friend", format!("   {id} -> {}", display(name)));
                }
            }
            _ => out.value("field", format!("{key}: {}", display(val))),
        }
    }
}

fn large_typed(out: &mut Transcript, bytes: &[u8]) {
    let people = match parse::from_slice::<Vec<Person>>(bytes) {
        Ok(people) => people,
        Err(err) => {
            out.error("decode", &parse::decode_error("not a list of people", err));
            return;
        }
    };
    out.value("people", people.len());
    if let Some(first) = people.first() {
        out.value("first name", &first.name);
        out.value("first tags", &first.tags);
        let friends: Vec<String> = first
            .friends
            .iter()
            .map(|friend| format!("{} -> {}", friend.id, friend.name))
            .collect();
        out.value("first friends", friends);
    }
    let active = people.iter().filter(|person| person.is_active).count();
    out.value("active", active);
}

fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.raw_string(),
    }
}
