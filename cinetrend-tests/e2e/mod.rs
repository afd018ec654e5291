//! End-to-end tests for Cinetrend
//!
//! These tests drive a live search session the way a user types: raw
//! keystrokes go in, settled listings come out, and the top hits land in a
//! real trending service backed by the fake catalog upstream.

#[path = "../support/mod.rs"]
mod support;

mod search_session;
