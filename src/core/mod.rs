// src/core/mod.rs

/// Project descriptors on disk.
pub mod config_store;
pub mod discovery;
/// Layered `.env` loading.
pub mod env_loader;
pub mod hooks;
pub mod orchestrator;
/// The launcher home and project directories.
pub mod paths;
