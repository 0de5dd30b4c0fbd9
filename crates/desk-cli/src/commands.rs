//! Command parsing for the chat demo

use desk_core::{Error, Result};
use std::path::PathBuf;

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Run a full analysis; the date defaults to yesterday and analysts to all four
    Analyze {
        ticker: String,
        trade_date: Option<String>,
        analysts: Vec<String>,
    },
    /// Show the session history
    History,
    /// Show a history entry again, 1-based
    View { number: usize },
    /// Write the current result as JSON
    Export { path: Option<PathBuf> },
    /// Show the session configuration
    Config,
    /// Change one configuration setting
    Set { key: String, value: String },
    /// Stock info and metric tiles
    Info { ticker: String },
    /// Recent price bars
    Chart { ticker: String, days: Option<u32> },
    /// Show help
    Help,
    /// Exit the chat
    Exit,
}

impl ChatCommand {
    /// Parse a command from user input
    ///
    /// Input without a leading `/` is read as `TICKER [DATE]`.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(Error::invalid("Empty input"));
        }

        let Some(command) = input.strip_prefix('/') else {
            return parse_bare(input);
        };

        let parts: Vec<&str> = command.split_whitespace().collect();
        let Some((cmd, args)) = parts.split_first() else {
            return Err(Error::invalid("Empty command"));
        };
        let cmd = cmd.to_lowercase();

        match cmd.as_str() {
            "analyze" | "a" => parse_analyze(args),
            "history" | "hist" => Ok(ChatCommand::History),
            "view" | "v" => {
                let number = args
                    .first()
                    .ok_or_else(|| Error::invalid("Missing history number for view command"))?;
                let number = number
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| Error::invalid(format!("Invalid history number: {number}")))?;
                Ok(ChatCommand::View { number })
            }
            "export" | "x" => Ok(ChatCommand::Export {
                path: args.first().map(PathBuf::from),
            }),
            "config" | "cfg" => Ok(ChatCommand::Config),
            "set" => {
                let (key, value) = args
                    .split_first()
                    .filter(|(_, rest)| !rest.is_empty())
                    .ok_or_else(|| Error::invalid("Usage: /set KEY VALUE"))?;
                Ok(ChatCommand::Set {
                    key: key.to_lowercase(),
                    value: value.join(" "),
                })
            }
            "info" | "i" => {
                let ticker = args
                    .first()
                    .ok_or_else(|| Error::invalid("Missing symbol for info command"))?;
                Ok(ChatCommand::Info {
                    ticker: ticker.to_uppercase(),
                })
            }
            "chart" | "c" => {
                let ticker = args
                    .first()
                    .ok_or_else(|| Error::invalid("Missing symbol for chart command"))?;
                let days = args
                    .get(1)
                    .map(|d| {
                        d.parse::<u32>()
                            .map_err(|_| Error::invalid(format!("Invalid number of days: {d}")))
                    })
                    .transpose()?;
                Ok(ChatCommand::Chart {
                    ticker: ticker.to_uppercase(),
                    days,
                })
            }
            "help" | "h" | "?" => Ok(ChatCommand::Help),
            "exit" | "quit" | "q" => Ok(ChatCommand::Exit),
            _ => Err(Error::invalid(format!("Unknown command: {cmd}"))),
        }
    }

    /// Get help text for all commands
    pub fn help_text() -> &'static str {
        r"
Trading Desk Chat Commands
==========================

Analysis:
  /analyze TICKER [DATE] [analysts]  Run the multi-agent analysis
                                     DATE is YYYY-MM-DD (default: yesterday)
                                     analysts: market,social,news,fundamentals
  TICKER [DATE]                      Same as /analyze with every analyst

Session:
  /history            List previous analyses
  /view N             Show analysis N from the history again
  /export [PATH]      Save the current analysis as JSON
  /config             Show the analysis configuration
  /set KEY VALUE      Change a setting, e.g. /set debate_rounds 2

Market data:
  /info TICKER        Company info and key metrics
  /chart TICKER [N]   Price bars for the last N days (default: 30)

Other:
  /help               Show this help
  /exit               Exit

Command Aliases:
  /a = /analyze   /v = /view    /x = /export   /cfg = /config
  /i = /info      /c = /chart   /h = /help     /q = /exit
"
    }

    /// Get a short description of the command
    pub fn description(&self) -> &'static str {
        match self {
            ChatCommand::Analyze { .. } => "Multi-agent analysis",
            ChatCommand::History => "Show history",
            ChatCommand::View { .. } => "Show a previous analysis",
            ChatCommand::Export { .. } => "Export the current analysis",
            ChatCommand::Config => "Show configuration",
            ChatCommand::Set { .. } => "Change a setting",
            ChatCommand::Info { .. } => "Stock information",
            ChatCommand::Chart { .. } => "Price history",
            ChatCommand::Help => "Show help",
            ChatCommand::Exit => "Exit the chat",
        }
    }
}

fn parse_analyze(args: &[&str]) -> Result<ChatCommand> {
    let (ticker, rest) = args
        .split_first()
        .ok_or_else(|| Error::invalid("Missing symbol for analyze command"))?;

    // A leading digit marks the optional date; anything else is the analyst list
    let (trade_date, rest) = match rest.split_first() {
        Some((date, tail)) if date.starts_with(|c: char| c.is_ascii_digit()) => {
            (Some((*date).to_string()), tail)
        }
        _ => (None, rest),
    };

    let analysts = rest
        .iter()
        .flat_map(|arg| arg.split(','))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_lowercase)
        .collect();

    Ok(ChatCommand::Analyze {
        ticker: ticker.to_uppercase(),
        trade_date,
        analysts,
    })
}

fn parse_bare(input: &str) -> Result<ChatCommand> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    match parts.as_slice() {
        [ticker] => Ok(ChatCommand::Analyze {
            ticker: ticker.to_uppercase(),
            trade_date: None,
            analysts: Vec::new(),
        }),
        [ticker, date] => Ok(ChatCommand::Analyze {
            ticker: ticker.to_uppercase(),
            trade_date: Some((*date).to_string()),
            analysts: Vec::new(),
        }),
        _ => Err(Error::invalid(
            "Enter TICKER [DATE] or a /command (try /help)",
        )),
    }
}
