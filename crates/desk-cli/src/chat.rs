//! Chat-style front end over one in-process session

use crate::commands::ChatCommand;
use chrono::{Duration, Local};
use comfy_table::{Table, presets::UTF8_FULL};
use desk_core::{AnalystSelection, ConfigPatch, Error, Result, ResultBundle};
use desk_market::{MarketData, PriceBar, StockInfo, format_price_change, metric_tiles};
use desk_session::request::DATE_FORMAT;
use desk_session::{
    AnalysisInvoker, ChatPanes, ConfigSummary, Session, ToneCounts, export_file_name,
    export_to_json, history_rows,
};
use desk_web::state::{DEFAULT_CHART_DAYS, MAX_CHART_DAYS};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// What the REPL does after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Exit,
}

/// A chat session: one analysis history plus market data lookups
pub struct ChatDesk {
    invoker: AnalysisInvoker,
    market: MarketData,
    session: Arc<Session>,
}

impl ChatDesk {
    pub fn new(invoker: AnalysisInvoker, market: MarketData) -> Self {
        let session = Arc::new(Session::new("chat", invoker.default_config()));
        Self {
            invoker,
            market,
            session,
        }
    }

    /// Prompt naming the ticker of the current result, if any
    pub fn prompt(&self) -> String {
        match self.session.get_current() {
            Some(bundle) => format!("desk [{}]> ", bundle.ticker),
            None => "desk> ".to_string(),
        }
    }

    pub async fn execute(&self, command: ChatCommand) -> Result<Reply> {
        let output = match command {
            ChatCommand::Analyze {
                ticker,
                trade_date,
                analysts,
            } => self.analyze(&ticker, trade_date, analysts).await?,
            ChatCommand::History => self.history(),
            ChatCommand::View { number } => self.view(number)?,
            ChatCommand::Export { path } => self.export(path).await?,
            ChatCommand::Config => config_table(&ConfigSummary::from_config(
                &self.session.get_config(),
            )),
            ChatCommand::Set { key, value } => {
                let patch = ConfigPatch::from_key_value(&key, &value)?;
                let config = self.session.set_config(patch)?;
                let mut out = format!("Updated {key} = {value}");
                for issue in config.validate() {
                    out.push_str(&format!("\nWarning: {issue}"));
                }
                out
            }
            ChatCommand::Info { ticker } => {
                stock_info_text(&self.market.try_fetch_stock_info(&ticker).await?)
            }
            ChatCommand::Chart { ticker, days } => {
                let days = days.unwrap_or(DEFAULT_CHART_DAYS).clamp(1, MAX_CHART_DAYS);
                let bars = self.market.fetch_price_history(&ticker, days).await?;
                price_table(&ticker, days, &bars)
            }
            ChatCommand::Help => ChatCommand::help_text().trim().to_string(),
            ChatCommand::Exit => return Ok(Reply::Exit),
        };
        Ok(Reply::Output(output))
    }

    async fn analyze(
        &self,
        ticker: &str,
        trade_date: Option<String>,
        analysts: Vec<String>,
    ) -> Result<String> {
        let trade_date = trade_date.unwrap_or_else(default_trade_date);
        let analysts = if analysts.is_empty() {
            AnalystSelection::all().names()
        } else {
            analysts
        };

        let bundle = self
            .invoker
            .analyze(&self.session, ticker, &trade_date, &analysts)
            .await?;
        info!("Chat analysis finished for {}", bundle.ticker);
        Ok(panes_text(&bundle))
    }

    fn history(&self) -> String {
        let history = self.session.get_history();
        if history.is_empty() {
            return "No analyses yet. Try /analyze TICKER.".to_string();
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(vec![
            "#",
            "Ticker",
            "Trade Date",
            "Analysis Time",
            "Decision",
            "Analysts",
        ]);
        for row in history_rows(&history) {
            table.add_row(vec![
                (row.index + 1).to_string(),
                row.ticker,
                row.trade_date,
                row.analysis_time,
                row.decision,
                row.analysts,
            ]);
        }

        let counts = ToneCounts::from_history(&history);
        format!(
            "{table}\nPositive: {}  Negative: {}  Neutral: {}",
            counts.positive, counts.negative, counts.neutral
        )
    }

    fn view(&self, number: usize) -> Result<String> {
        let len = self.session.history_len();
        if number == 0 || number > len {
            return Err(Error::invalid(format!(
                "No analysis #{number} (history has {len})"
            )));
        }
        let bundle = self.session.select_history(number - 1)?;
        Ok(panes_text(&bundle))
    }

    async fn export(&self, path: Option<PathBuf>) -> Result<String> {
        let bundle = self
            .session
            .get_current()
            .ok_or_else(|| Error::invalid("No analysis to export yet"))?;
        let json = export_to_json(&bundle)?;
        let path = path.unwrap_or_else(|| PathBuf::from(export_file_name(&bundle)));
        tokio::fs::write(&path, json).await?;
        Ok(format!(
            "Exported {} analysis to {}",
            bundle.ticker,
            path.display()
        ))
    }
}

/// Yesterday in local time, the default trade date
pub fn default_trade_date() -> String {
    (Local::now().date_naive() - Duration::days(1))
        .format(DATE_FORMAT)
        .to_string()
}

/// The three chat panes as one printable block; empty panes are left out
pub fn panes_text(bundle: &ResultBundle) -> String {
    let panes = ChatPanes::from_bundle(bundle);
    let mut out = panes.summary;
    for (title, body) in [
        ("Detailed Reports", panes.detailed_reports),
        ("Trading Information", panes.trading_info),
    ] {
        if !body.is_empty() {
            out.push_str(&format!("\n---\n\n# {title}\n\n{body}"));
        }
    }
    out
}

fn config_table(summary: &ConfigSummary) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Group", "Setting", "Value"]);
    for (group, label, value) in summary.rows() {
        table.add_row(vec![group, label, value]);
    }

    let mut out = table.to_string();
    for issue in &summary.issues {
        out.push_str(&format!("\nWarning: {issue}"));
    }
    out
}

fn stock_info_text(info: &StockInfo) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Metric", "Value", "Change"]);
    for tile in metric_tiles(info) {
        table.add_row(vec![tile.label, tile.value, tile.delta.unwrap_or_default()]);
    }

    format!(
        "{} ({})\nSector: {}  Industry: {}\n{table}",
        info.name, info.symbol, info.sector, info.industry
    )
}

fn price_table(ticker: &str, days: u32, bars: &[PriceBar]) -> String {
    let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
        return format!("No price data for {ticker} over the last {days} days");
    };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Date", "Open", "High", "Low", "Close", "Volume"]);
    for bar in bars {
        table.add_row(vec![
            bar.date.format(DATE_FORMAT).to_string(),
            format!("{:.2}", bar.open),
            format!("{:.2}", bar.high),
            format!("{:.2}", bar.low),
            format!("{:.2}", bar.close),
            bar.volume.to_string(),
        ]);
    }

    format!(
        "{ticker} price history ({days} days)\n{table}\nClose {:.2} -> {:.2}: {}",
        first.close,
        last.close,
        format_price_change(last.close, first.close)
    )
}
