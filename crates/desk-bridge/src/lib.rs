//! Subprocess bridge to the external multi-agent trading framework
//!
//! The framework is not a Rust library, so it is reached through a small
//! command (by default `python3 scripts/tradingagents_bridge.py`) that speaks
//! newline-delimited JSON over stdio:
//!
//! - `{"action":"probe"}` answers `{"available":true,"default_config":{...}}`
//!   or `{"available":false,"reason":"..."}`
//! - `{"action":"propagate",...}` answers `{"final_state":{...},"decision":...}`
//!   or `{"error":"..."}`
//!
//! [`BridgeFactory`] implements [`desk_core::FrameworkFactory`] on top of it.

pub mod config;
pub mod error;
pub mod factory;
pub mod process;
pub mod protocol;

pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use factory::{BridgeFactory, BridgeFramework};
pub use protocol::{ProbeResponse, Request};
