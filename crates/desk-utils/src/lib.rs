//! Shared utilities for trading-desk
//!
//! This crate provides common functionality used across the workspace,
//! including logging setup, process configuration, and environment checks.

pub mod config;
pub mod env;
pub mod logging;

pub use config::ServerConfig;
pub use env::{CredentialStatus, REQUIRED_ENV_VARS, load_dotenv, missing_env_vars};
pub use logging::{init_tracing, init_tracing_with_default};
