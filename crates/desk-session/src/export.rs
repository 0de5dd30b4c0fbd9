//! Canonical JSON export of a result bundle

use desk_core::{Error, ReportKind, ResultBundle, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The exported document
///
/// `final_state` carries only the populated exported report kinds, as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub ticker: String,
    pub trade_date: String,
    pub timestamp: String,
    pub decision: String,
    pub selected_analysts: Vec<String>,
    pub final_state: BTreeMap<String, String>,
}

impl ExportDocument {
    pub fn from_bundle(bundle: &ResultBundle) -> Self {
        let final_state = ReportKind::EXPORTED
            .into_iter()
            .filter_map(|kind| {
                bundle
                    .reports
                    .get(kind)
                    .map(|text| (kind.key().to_string(), text.to_string()))
            })
            .collect();

        Self {
            ticker: bundle.ticker.clone(),
            trade_date: bundle.trade_date_string(),
            timestamp: bundle.timestamp.to_rfc3339(),
            decision: bundle.decision.to_string(),
            selected_analysts: bundle.analysts.names(),
            final_state,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}_{}_analysis.json", self.ticker, self.trade_date)
    }
}

/// Pretty-printed export of `bundle`
pub fn export_to_json(bundle: &ResultBundle) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ExportDocument::from_bundle(bundle))?)
}

/// Read an export back; report keys outside the exported set are rejected
pub fn parse_export(json: &str) -> Result<ExportDocument> {
    let document: ExportDocument = serde_json::from_str(json)?;
    if let Some(key) = document
        .final_state
        .keys()
        .find(|key| !ReportKind::from_key(key).is_some_and(|kind| kind.is_exported()))
    {
        return Err(Error::invalid(format!("Unexpected report in export: {key}")));
    }
    Ok(document)
}

/// `{ticker}_{trade_date}_analysis.json`
pub fn export_file_name(bundle: &ResultBundle) -> String {
    format!("{}_{}_analysis.json", bundle.ticker, bundle.trade_date_string())
}
