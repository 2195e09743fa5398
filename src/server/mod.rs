//! Server half of the translation protocol

pub mod api;
pub mod google;
