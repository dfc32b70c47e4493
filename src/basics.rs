//! Purpose: Walk through the language basics needed to start writing programs.
//! Exports: `tour`, `Mixed`, and the small functions the tour calls.
//! Role: First playground; pure computation recorded into a `Transcript`.
//! Invariants: Output is deterministic (maps are key-ordered).
use std::collections::BTreeMap;

use serde::Serialize;

use crate::transcript::Transcript;

/// A heterogeneous collection element. Use an enum where another language
/// would reach for `Any`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Mixed {
    Text(String),
    Number(i64),
    List(Vec<String>),
}

pub fn greet(name: &str, greeting: &str) -> String {
    format!("{greeting} {name}")
}

pub fn reverse_greeting(name: &str, greeting: &str) -> String {
    format!("{name} {greeting}")
}

/// `i!` for `i <= 20`. Larger inputs overflow `u64` (a panic in debug
/// builds); use [`checked_fact`] when the input is not known to be small.
pub fn fact(i: u64) -> u64 {
    if i == 0 { 1 } else { i * fact(i - 1) }
}

/// Like `fact`, but `None` once the result no longer fits in a `u64` (n > 20).
pub fn checked_fact(i: u64) -> Option<u64> {
    (1..=i).try_fold(1u64, |acc, n| acc.checked_mul(n))
}

pub fn square(i: i64) -> i64 {
    i * i
}

pub fn tour() -> Transcript {
    let mut out = Transcript::new("basics");

    out.section("output");
    out.value("println", "Hello World!");

    out.section("data");
    let answer = 42;
    let mut donuts = "Yes";
    out.value("answer", answer);
    out.value("donuts", donuts);
    donuts = "Always";
    out.value("donuts (reassigned)", donuts);

    // Late-initialized bindings still need a type the compiler can settle on.
    let x: i32;
    let y: String;
    x = 7;
    y = String::from("seven");
    out.value("x", x);
    out.value("y", y);

    out.section("collections");
    out.value(
        "interpolation",
        format!("Answer to the Ultimate Question of Life, the Universe, and Everything is ... {answer}"),
    );
    out.value("interpolation", format!("Would you like donuts?  {donuts}, please"));

    let my_list: Vec<i64> = (1..=8).collect();
    let my_mixed_list = vec![
        Mixed::Text("1".to_string()),
        Mixed::Number(2),
        Mixed::List(vec!["a".into(), "b".into(), "c".into()]),
        Mixed::Number(3),
    ];
    out.value("my_list", &my_list);
    out.value("my_mixed_list", &my_mixed_list);

    let my_dict = BTreeMap::from([("name", "Frank"), ("age", "43"), ("weight", "106")]);
    let my_mixed_dict = BTreeMap::from([
        ("name", Mixed::Text("Frank".to_string())),
        ("age", Mixed::Number(43)),
        ("weight", Mixed::Number(106)),
    ]);
    out.value("my_dict", &my_dict);
    out.value("my_mixed_dict", &my_mixed_dict);

    out.value("some value", format!("Some value = {}", my_list[2]));
    let age = my_dict.get("age");
    out.value("some value", format!("Some value = {age:?}"));

    out.section("loops");
    for v in &my_list {
        out.value("for in", v);
    }
    for (i, v) in my_list.iter().enumerate() {
        out.value("enumerate", format!("{i}.) {v}"));
    }
    for i in 1..=my_list.len() {
        out.value("indexed", format!("{i}.) {}", my_list[i - 1]));
    }
    for (k, v) in &my_dict {
        out.value("dict", format!("{k} == {v}"));
    }
    out.value("0..10", counting_line(0..10));
    out.value("0..=9", counting_line(0..=9));

    out.section("conditionals");
    if answer != 42 {
        out.value("if", "WRONG!!");
    } else {
        out.value("if", "RIGHT!!");
    }
    let verdict = match answer {
        0 => "nothing",
        42 => "the answer",
        n if n < 0 => "negative",
        _ => "just a number",
    };
    out.value("match", verdict);

    out.section("optionals");
    let maybe_a_value: Option<&str> = Some("George Washington");
    out.value("is none?", format!("is nil? {}", maybe_a_value.is_none()));
    out.value("contents", format!("contents of value: {maybe_a_value:?}"));
    out.value(
        "get the value",
        format!("get the value: {}", maybe_a_value.unwrap_or("<none>")),
    );
    if let Some(name) = maybe_a_value {
        out.value("if let", format!("Yay! We have a name: {name}"));
    }
    if maybe_a_value.is_some() {
        let name = maybe_a_value.unwrap_or_default();
        out.value("is_some", format!("Yay! We have a name: {name}"));
    }

    out.section("functions");
    out.value("greet", greet("Dan", "Hello"));
    let mut greet_other: fn(&str, &str) -> String = greet;
    out.value("greet_other", greet_other("Dan", "Bye"));
    out.value("reverse_greeting", reverse_greeting("Dan", "Hello"));
    greet_other = reverse_greeting;
    out.value("greet_other", greet_other("Dan", "Bye"));

    out.section("closures");
    out.value("fact(5)", fact(5));
    out.value("fact(8)", fact(8));
    let factorial = |i: u64| -> u64 { (1..=i).product() };
    out.value("factorial(5)", factorial(5));
    out.value("factorial(8)", factorial(8));
    out.value("checked_fact(21)", checked_fact(21));

    let numbers = [1, 2, 3, 4, 5, 6];
    let by_function: Vec<i64> = numbers.iter().copied().map(square).collect();
    let by_closure: Vec<i64> = numbers.iter().map(|i| i * i).collect();
    out.value("map(function)", by_function);
    out.value("map(closure)", by_closure);

    out
}

fn counting_line(range: impl Iterator<Item = i32>) -> String {
    range
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{checked_fact, fact, greet, reverse_greeting, square, tour};
    use serde_json::json;

    #[test]
    fn greetings_swap_argument_order() {
        assert_eq!(greet("Dan", "Hello"), "Hello Dan");
        assert_eq!(reverse_greeting("Dan", "Hello"), "Dan Hello");
    }

    #[test]
    fn factorial_variants_agree() {
        assert_eq!(fact(0), 1);
        assert_eq!(fact(5), 120);
        assert_eq!(fact(8), 40320);
        assert_eq!(checked_fact(20), Some(fact(20)));
        assert_eq!(checked_fact(21), None);
        assert_eq!(square(6), 36);
    }

    #[test]
    fn tour_records_expected_values() {
        let transcript = tour();
        assert_eq!(transcript.find("println"), Some(&json!("Hello World!")));
        assert_eq!(transcript.find("if"), Some(&json!("RIGHT!!")));
        assert_eq!(transcript.find("0..10"), Some(&json!("0 1 2 3 4 5 6 7 8 9")));
        assert_eq!(transcript.find("0..=9"), transcript.find("0..10"));
        assert_eq!(
            transcript.find("map(function)"),
            Some(&json!([1, 4, 9, 16, 25, 36]))
        );
        assert_eq!(transcript.find("map(closure)"), transcript.find("map(function)"));
        assert_eq!(
            transcript.find("my_mixed_list"),
            Some(&json!(["1", 2, ["a", "b", "c"], 3]))
        );
        assert_eq!(transcript.find("checked_fact(21)"), Some(&json!(null)));
    }

    #[test]
    fn dict_iteration_is_key_ordered() {
        let transcript = tour();
        let lines: Vec<_> = transcript
            .entries()
            .iter()
            .filter(|entry| entry.label == "dict")
            .map(|entry| entry.value.clone())
            .collect();
        assert_eq!(
            lines,
            vec![json!("age == 43"), json!("name == Frank"), json!("weight == 106")]
        );
    }
}
