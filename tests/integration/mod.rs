//! Integration tests
//!
//! End-to-end engine scenarios against the in-memory backend double, plus
//! HTTP client tests against a wiremock server.

pub mod http_api_test;
