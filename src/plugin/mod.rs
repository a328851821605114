//! Plugin system: capability contract, registry and built-in plugins

pub mod api;
pub mod base_integration;
pub mod manager;
