//! Command-line arguments.
//!
//! # Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `-c, --config` | `config.json` | Configuration file |
//! | `-w, --watch` | `false` | Refresh until Ctrl-C |
//! | `--interval-secs` | config, 30 | Watch refresh interval |
//! | `--format` | `panel` | `panel` or `json` |
//! | `--currency` | config, `USD` | Crypto quote currency |
//! | `--mock` | `false` | Offline deterministic data |
//! | `--log-json` | `false` | JSON log lines on stderr |
//!
//! # Examples
//!
//! ```bash
//! tickerboard AAPL MSFT BTC ETH
//! tickerboard BTC SOL --currency EUR --watch --interval-secs 60
//! tickerboard AAPL --format json --pretty
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Terminal dashboard for stock and cryptocurrency prices.
#[derive(Debug, Parser)]
#[command(name = "tickerboard", author, version, about)]
pub struct Cli {
    /// Stock or crypto tickers to display.
    #[arg(required = true, num_args = 1..)]
    pub tickers: Vec<String>,

    /// Path to the JSON configuration file.
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Refresh continuously until interrupted.
    #[arg(short, long, default_value_t = false)]
    pub watch: bool,

    /// Seconds between refreshes in watch mode.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_secs: Option<u64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Panel)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    /// Quote currency for crypto prices (ISO code).
    #[arg(long)]
    pub currency: Option<String>,

    /// Serve deterministic offline data instead of calling providers.
    #[arg(long, default_value_t = false)]
    pub mock: bool,

    /// Emit logs as JSON lines.
    #[arg(long, default_value_t = false)]
    pub log_json: bool,

    /// Disable ANSI colors even on a terminal.
    #[arg(long, default_value_t = false)]
    pub no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Boxed panels laid out in a grid.
    Panel,
    /// One JSON document per refresh.
    Json,
}
