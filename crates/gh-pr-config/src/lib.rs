//! Configuration and file management for gh-pr-tray
//!
//! This crate provides:
//! - File path utilities for config and cache files
//! - Configuration file loading (TOML)
//! - Application configuration (AppConfig)
//! - OAuth credential persistence

pub mod app_config;
pub mod config_file;
pub mod credentials;
pub mod paths;

pub use app_config::{AppConfig, DEFAULT_CLIENT_ID};
pub use config_file::load_config_file;
pub use credentials::{CredentialStore, Credentials, FileCredentialStore, MemoryCredentialStore};
pub use paths::{cache_dir, config_dir, credentials_path, APP_NAME};
