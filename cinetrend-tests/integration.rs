//! Integration tests for Cinetrend
//!
//! These tests run the catalog client against a fake upstream and the
//! trending service on a real listener, exercising the HTTP contracts
//! between components.

#[path = "support/mod.rs"]
mod support;

#[path = "integration/catalog_upstream.rs"]
mod catalog_upstream;
#[path = "integration/trending_service.rs"]
mod trending_service;
