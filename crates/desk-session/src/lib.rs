//! Sessions, analysis invocation and result rendering for trading-desk
//!
//! A [`Session`] owns one user's configuration, current result and history.
//! The [`AnalysisInvoker`] is the only component that appends to history; it
//! runs the external framework on a background task and records coarse
//! progress that the UIs poll. Everything in [`render`], [`history`],
//! [`export`] and [`markdown`] is a read-only view over a [`ResultBundle`].
//!
//! [`ResultBundle`]: desk_core::ResultBundle

pub mod export;
pub mod history;
pub mod invoker;
pub mod manager;
pub mod markdown;
pub mod progress;
pub mod render;
pub mod request;
pub mod store;

pub use export::{ExportDocument, export_file_name, export_to_json, parse_export};
pub use history::{DecisionCharts, HistoryRow, ToneCounts, decision_charts, history_rows};
pub use invoker::AnalysisInvoker;
pub use manager::{DEFAULT_SESSION_TTL, SessionManager};
pub use markdown::ChatPanes;
pub use progress::{AgentBoard, AgentStatus, Progress, Stage};
pub use render::{ConfigSummary, RenderedView, TabId, render};
pub use request::{AnalysisForm, AnalysisRequest};
pub use store::{Session, StatusSnapshot};
