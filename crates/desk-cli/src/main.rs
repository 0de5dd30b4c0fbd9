//! trading-desk command-line interface
//!
//! ```bash
//! # Dashboard on http://127.0.0.1:8501
//! trading-desk serve
//!
//! # Terminal chat demo
//! trading-desk chat
//! ```

mod chat;
mod commands;

use anyhow::Result;
use chat::{ChatDesk, Reply};
use clap::{Parser, Subcommand};
use commands::ChatCommand;
use desk_bridge::{BridgeConfig, BridgeFactory};
use desk_core::FrameworkFactory;
use desk_market::{MarketConfig, MarketData};
use desk_session::AnalysisInvoker;
use desk_utils::{REQUIRED_ENV_VARS, ServerConfig, missing_env_vars};
use desk_web::AppState;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "trading-desk")]
#[command(about = "Dashboard and chat front ends for a multi-agent trading framework", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON file describing the framework bridge command
    #[arg(long, global = true)]
    bridge_config: Option<PathBuf>,

    /// Ask the framework for verbose output
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web dashboard
    Serve {
        /// Bind host (default: DESK_HOST or 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (default: DESK_PORT or 8501)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Start the interactive chat demo
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    desk_utils::load_dotenv();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve { .. } => desk_utils::init_tracing(),
        Commands::Chat => desk_utils::init_tracing_with_default("warn"),
    }

    let invoker = preflight(&cli).await?;
    let market = MarketData::live(&MarketConfig::from_env())?;

    match cli.command {
        Commands::Serve { host, port } => {
            let mut server = ServerConfig::from_env();
            if let Some(host) = host {
                server = server.with_host(host);
            }
            if let Some(port) = port {
                server = server.with_port(port);
            }

            let state = AppState::new(invoker, market)?;
            println!("Trading desk dashboard: {}", server.url());
            desk_web::serve(&server, state).await?;
        }
        Commands::Chat => run_chat(&ChatDesk::new(invoker, market)).await?,
    }

    Ok(())
}

/// Probe the framework bridge and the credentials, warning about anything missing
async fn preflight(cli: &Cli) -> Result<AnalysisInvoker> {
    let config = match &cli.bridge_config {
        Some(path) => BridgeConfig::from_file(path)?,
        None => BridgeConfig::from_env(),
    };

    let factory = BridgeFactory::detect(config).await;
    let availability = factory.availability();
    if let Some(reason) = availability.reason() {
        eprintln!("Warning: the trading framework is not available: {reason}");
        eprintln!(
            "  Analyses stay disabled until `{}` can import it.",
            factory.config().display_command()
        );
    }

    for var in missing_env_vars(&REQUIRED_ENV_VARS) {
        eprintln!("Warning: {var} is not set; the framework may fail to fetch data or call its LLM.");
    }

    Ok(AnalysisInvoker::new(Arc::new(factory)).with_debug(cli.debug))
}

fn print_banner() {
    println!(
        r"
╔══════════════════════════════════════════════════════════════╗
║                     Trading Desk Chat                        ║
║                                                              ║
║  Type a ticker (optionally with a YYYY-MM-DD date) to run    ║
║  the trading agents, e.g.  NVDA 2024-11-15                   ║
║                                                              ║
║  /history  /view N  /export  /config  /set KEY VALUE         ║
║  /info TICKER  /chart TICKER [DAYS]  /help  /exit            ║
╚══════════════════════════════════════════════════════════════╝
"
    );
}

async fn run_chat(desk: &ChatDesk) -> Result<()> {
    print_banner();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{}", desk.prompt());
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                // EOF
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let command = match ChatCommand::parse(input) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("Error: {e}\n");
                continue;
            }
        };

        tracing::debug!("Chat command: {}", command.description());
        if let ChatCommand::Analyze { ticker, .. } = &command {
            println!("Running the trading agents on {ticker}; this can take several minutes...");
        }

        match desk.execute(command).await {
            Ok(Reply::Output(text)) => println!("{text}\n"),
            Ok(Reply::Exit) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => eprintln!("Error: {e}\n"),
        }
    }

    Ok(())
}
