//! Client-side engine for the TenderBot mini app: a typed backend client,
//! stack-based screen navigation and a stateless markup renderer, kept
//! independent of any particular host shell.

pub mod api;
pub mod config;
pub mod host;
pub mod loader;
pub mod model;
pub mod nav;
pub mod render;
pub mod state;
