//! HTTP API: report endpoints, the order relay socket and their wiring.

pub mod app;
