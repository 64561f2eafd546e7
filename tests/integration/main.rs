//! Integration tests
//!
//! `http_client` runs the reqwest client against an in-process backend.
//! The flow tests drive the controller and session against a recording
//! in-memory API with paused time.

mod search_flow;
mod session_flow;
