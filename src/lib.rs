pub mod common;
pub mod config;
pub mod domain;
pub mod extract;
pub mod graph;
pub mod observability;
pub mod reconcile;
pub mod resolve;
pub mod store;
pub mod vocab;

// Application layer orchestrating one reconciliation run
pub mod app;
