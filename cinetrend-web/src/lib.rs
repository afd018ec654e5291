//! Cinetrend Web - Trending HTTP service

#![warn(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! JSON API exposing the trending service to search clients: recording
//! searches, reading the trending list and a health check.

pub mod handlers;
pub mod server;

// Re-export main types
pub use server::{AppState, build_router, run_server};
