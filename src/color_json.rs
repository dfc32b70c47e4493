//! Purpose: Render transcript values for terminals, optionally with ANSI color.
//! Exports: `colorize_json`, `inline_value`, `paint`, `Paint`.
//! Role: Pure formatting used by the human transcript and error output.
//! Invariants: With color disabled, `colorize_json` equals `serde_json::to_string_pretty`.
//! Invariants: ANSI escapes appear only when explicitly enabled.
use serde_json::{Map, Value};

const INDENT: &str = "  ";

#[derive(Clone, Copy, Debug)]
pub enum Paint {
    Key,
    Text,
    Number,
    Bool,
    Null,
    Punct,
    Section,
    Label,
    Error,
    Hint,
}

impl Paint {
    fn code(self) -> &'static str {
        match self {
            Paint::Key => "36",
            Paint::Text => "32",
            Paint::Number => "33",
            Paint::Bool => "35",
            Paint::Null | Paint::Punct => "39",
            Paint::Section => "1",
            Paint::Label => "2",
            Paint::Error => "31",
            Paint::Hint => "33",
        }
    }
}

pub fn paint(text: &str, paint: Paint, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }
    format!("\u{1b}[{}m{text}\u{1b}[0m", paint.code())
}

/// One-line form for `label: value` output. Strings print without quotes;
/// arrays and objects fall back to the pretty multi-line form.
pub fn inline_value(value: &Value, use_color: bool) -> String {
    match value {
        Value::String(text) => paint(text, Paint::Text, use_color),
        Value::Array(_) | Value::Object(_) => colorize_json(value, use_color),
        scalar => {
            let mut out = String::new();
            write_value(scalar, 0, use_color, &mut out);
            out
        }
    }
}

pub fn colorize_json(value: &Value, use_color: bool) -> String {
    let mut out = String::new();
    write_value(value, 0, use_color, &mut out);
    out
}

fn write_value(value: &Value, depth: usize, use_color: bool, out: &mut String) {
    match value {
        Value::Null => out.push_str(&paint("null", Paint::Null, use_color)),
        Value::Bool(flag) => out.push_str(&paint(&flag.to_string(), Paint::Bool, use_color)),
        Value::Number(num) => out.push_str(&paint(&num.to_string(), Paint::Number, use_color)),
        Value::String(text) => out.push_str(&paint(&quoted(text), Paint::Text, use_color)),
        Value::Array(items) => write_seq(
            ('[', ']'),
            items.iter().map(|item| (None, item)),
            items.len(),
            depth,
            use_color,
            out,
        ),
        Value::Object(map) => write_map(map, depth, use_color, out),
    }
}

fn write_map(map: &Map<String, Value>, depth: usize, use_color: bool, out: &mut String) {
    write_seq(
        ('{', '}'),
        map.iter().map(|(key, value)| (Some(key.as_str()), value)),
        map.len(),
        depth,
        use_color,
        out,
    );
}

fn write_seq<'a>(
    (open, close): (char, char),
    items: impl Iterator<Item = (Option<&'a str>, &'a Value)>,
    len: usize,
    depth: usize,
    use_color: bool,
    out: &mut String,
) {
    if len == 0 {
        out.push_str(&paint(&format!("{open}{close}"), Paint::Punct, use_color));
        return;
    }
    out.push_str(&paint(&open.to_string(), Paint::Punct, use_color));
    out.push('\n');
    for (idx, (key, value)) in items.enumerate() {
        out.push_str(&INDENT.repeat(depth + 1));
        if let Some(key) = key {
            out.push_str(&paint(&quoted(key), Paint::Key, use_color));
            out.push_str(&paint(":", Paint::Punct, use_color));
            out.push(' ');
        }
        write_value(value, depth + 1, use_color, out);
        if idx + 1 < len {
            out.push_str(&paint(",", Paint::Punct, use_color));
        }
        out.push('\n');
    }
    out.push_str(&INDENT.repeat(depth));
    out.push_str(&paint(&close.to_string(), Paint::Punct, use_color));
}

fn quoted(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

#[cfg(test)]
mod tests {
    use super::{Paint, colorize_json, inline_value, paint};
    use serde_json::json;

    #[test]
    fn colorize_json_matches_pretty_when_disabled() {
        let value = json!({
            "list": ["a", "b", {"what": "this"}],
            "empty": {},
            "none": [],
            "n": 1.5
        });
        let plain = colorize_json(&value, false);
        let pretty = serde_json::to_string_pretty(&value).expect("pretty");
        assert_eq!(plain, pretty);
    }

    #[test]
    fn inline_strings_are_unquoted() {
        assert_eq!(inline_value(&json!("RIGHT!!"), false), "RIGHT!!");
        assert_eq!(inline_value(&json!(42), false), "42");
        assert_eq!(inline_value(&json!(null), false), "null");
        assert_eq!(inline_value(&json!([1]), false), "[\n  1\n]");
    }

    #[test]
    fn colors_only_when_enabled() {
        let colored = colorize_json(&json!({"k": "v", "b": true}), true);
        assert!(colored.contains("\u{1b}[36m\"k\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[32m\"v\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[35mtrue\u{1b}[0m"));
        assert_eq!(paint("error:", Paint::Error, false), "error:");
        assert_eq!(paint("error:", Paint::Error, true), "\u{1b}[31merror:\u{1b}[0m");
    }
}
