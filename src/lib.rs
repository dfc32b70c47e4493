//! Purpose: Library behind the `playgrounds` CLI: four runnable walkthroughs.
//! Exports: `basics`, `files`, `json`, `net` tours plus `transcript`, `config`, `core`.
//! Role: Every walkthrough returns a `Transcript` so the binary and tests share one path.
//! Invariants: Walkthroughs are independent; none reads state another produced.
//! Invariants: A failing step is recorded in the transcript, never retried.
pub mod basics;
pub mod config;
pub mod core;
pub mod files;
pub mod json;
pub mod net;
pub mod transcript;
