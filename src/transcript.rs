//! Purpose: Record what each walkthrough step printed, in order.
//! Exports: `Transcript`, `Entry`, `EntryKind`, `entry_json`.
//! Role: The console sink shared by every tour; the binary decides how to render it.
//! Invariants: Recording never fails; unserializable values become error entries.
//! Invariants: JSON shape per entry is `{tour, section, label, kind, value}`.
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::core::error::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryKind {
    Value,
    Note,
    Error,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Value => "value",
            EntryKind::Note => "note",
            EntryKind::Error => "error",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub tour: &'static str,
    pub section: String,
    pub label: String,
    pub kind: EntryKind,
    pub value: Value,
}

#[derive(Clone, Debug)]
pub struct Transcript {
    tour: &'static str,
    section: String,
    entries: Vec<Entry>,
}

impl Transcript {
    pub fn new(tour: &'static str) -> Self {
        Self {
            tour,
            section: String::new(),
            entries: Vec::new(),
        }
    }

    pub fn section(&mut self, name: impl Into<String>) {
        self.section = name.into();
    }

    pub fn value(&mut self, label: impl Into<String>, value: impl Serialize) {
        let label = label.into();
        match serde_json::to_value(value) {
            Ok(value) => self.push(label, EntryKind::Value, value),
            Err(err) => {
                let message = format!("value not representable as json: {err}");
                self.push(label, EntryKind::Error, json!({ "message": message }));
            }
        }
    }

    pub fn note(&mut self, text: impl Into<String>) {
        self.push(String::new(), EntryKind::Note, Value::String(text.into()));
    }

    pub fn error(&mut self, label: impl Into<String>, err: &Error) {
        self.push(label.into(), EntryKind::Error, error_value(err));
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First value recorded under `label`, across all sections.
    pub fn find(&self, label: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| &entry.value)
    }

    fn push(&mut self, label: String, kind: EntryKind, value: Value) {
        self.entries.push(Entry {
            tour: self.tour,
            section: self.section.clone(),
            label,
            kind,
            value,
        });
    }
}

pub fn entry_json(entry: &Entry) -> Value {
    let mut obj = Map::new();
    obj.insert("tour".to_string(), json!(entry.tour));
    obj.insert("section".to_string(), json!(entry.section));
    obj.insert("label".to_string(), json!(entry.label));
    obj.insert("kind".to_string(), json!(entry.kind.as_str()));
    obj.insert("value".to_string(), entry.value.clone());
    Value::Object(obj)
}

fn error_value(err: &Error) -> Value {
    let mut obj = Map::new();
    obj.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    if let Some(message) = err.message() {
        obj.insert("message".to_string(), json!(message));
    }
    if let Some(path) = err.path() {
        obj.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(url) = err.url() {
        obj.insert("url".to_string(), json!(url));
    }
    if let Some(source) = std::error::Error::source(err) {
        obj.insert("cause".to_string(), json!(source.to_string()));
    }
    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::{EntryKind, Transcript, entry_json};
    use crate::core::error::{Error, ErrorKind};
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn entries_carry_tour_and_current_section() {
        let mut transcript = Transcript::new("basics");
        transcript.section("output");
        transcript.value("greeting", "Hello World!");
        transcript.section("data");
        transcript.value("answer", 42);
        transcript.note("constants cannot be reassigned");

        let entries = transcript.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].section, "output");
        assert_eq!(entries[1].section, "data");
        assert_eq!(entries[1].value, json!(42));
        assert_eq!(entries[2].kind, EntryKind::Note);
        assert_eq!(transcript.find("answer"), Some(&json!(42)));
    }

    #[test]
    fn errors_are_recorded_not_raised() {
        let mut transcript = Transcript::new("files");
        let err = Error::new(ErrorKind::NotFound)
            .with_message("no such file")
            .with_path("/tmp/nope");
        transcript.error("copy", &err);

        let entry = &transcript.entries()[0];
        assert_eq!(entry.kind, EntryKind::Error);
        assert_eq!(entry.value["kind"], "NotFound");
        assert_eq!(entry.value["path"], "/tmp/nope");
    }

    #[test]
    fn unserializable_values_become_error_entries() {
        let mut transcript = Transcript::new("basics");
        assert!(transcript.is_empty());
        let mut by_pair = BTreeMap::new();
        by_pair.insert((1, 2), "tuple keys are not json object keys");
        transcript.value("pairs", &by_pair);
        transcript.value("after", 1);

        assert_eq!(transcript.len(), 2);
        let entry = &transcript.entries()[0];
        assert_eq!(entry.kind, EntryKind::Error);
        assert_eq!(entry.label, "pairs");
        assert!(
            entry.value["message"]
                .as_str()
                .is_some_and(|m| m.starts_with("value not representable as json"))
        );
        assert_eq!(transcript.entries()[1].kind, EntryKind::Value);
    }

    #[test]
    fn entry_json_has_required_fields() {
        let mut transcript = Transcript::new("json");
        transcript.section("small");
        transcript.value("a", 100);

        let value = entry_json(&transcript.entries()[0]);
        assert_eq!(value["tour"], "json");
        assert_eq!(value["section"], "small");
        assert_eq!(value["label"], "a");
        assert_eq!(value["kind"], "value");
        assert_eq!(value["value"], 100);
    }
}
