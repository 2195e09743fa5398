//! Core translation engine module

pub mod channel;
pub mod client;
pub mod config;
pub mod errors;
pub mod fallback;
pub mod models;
pub mod orchestrator;
pub mod service;
pub mod transport;
