//! Core types for trading-desk
//!
//! This crate defines the domain model shared by both user interfaces:
//!
//! - [`AnalysisConfig`]: the settings handed to the external framework
//! - [`ResultBundle`]: the immutable outcome of one analysis run
//! - [`TradingFramework`] / [`FrameworkFactory`]: the seam behind which the
//!   external multi-agent framework lives
//! - [`Error`]: the error taxonomy every other crate converts into

pub mod analyst;
pub mod bundle;
pub mod config;
pub mod decision;
pub mod error;
pub mod framework;
pub mod report;

pub use analyst::{AnalystKind, AnalystSelection};
pub use bundle::ResultBundle;
pub use config::{AnalysisConfig, ConfigPatch, DataVendors, DataVendorsPatch};
pub use decision::{Decision, DecisionTone};
pub use error::{Error, Result};
pub use framework::{Availability, FrameworkFactory, FrameworkOutput, TradingFramework};
pub use report::{ReportKind, Reports};
