//! Purpose: The "built-in" JSON style: decode into and encode from Rust types.
//! Exports: `Person`, `Friend`, `Dump`, `sample_dump`.
//! Role: serde derive models for the sample documents.
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Person {
    pub index: u64,
    pub name: String,
    pub age: u32,
    pub is_active: bool,
    pub company: String,
    pub email: String,
    pub tags: Vec<String>,
    pub friends: Vec<Friend>,
    pub favorite_fruit: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Friend {
    pub id: u64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dump {
    pub name: String,
    pub age: u32,
    pub list: Vec<DumpItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DumpItem {
    Text(String),
    What { what: String },
}

pub fn sample_dump() -> Dump {
    Dump {
        name: "Jack".to_string(),
        age: 25,
        list: vec![
            DumpItem::Text("a".to_string()),
            DumpItem::Text("b".to_string()),
            DumpItem::Text("c".to_string()),
            DumpItem::What {
                what: "this".to_string(),
            },
        ],
    }
}
