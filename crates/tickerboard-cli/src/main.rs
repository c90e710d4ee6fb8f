mod cli;
mod config;
mod error;
mod logger;
mod output;
mod panel;

use std::future::Future;
use std::io::{IsTerminal, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tickerboard_core::{
    validate_currency_code, Board, BoardReport, CoinGeckoAdapter, HttpClient, ReqwestHttpClient,
    Symbol, UtcDateTime, YahooAdapter,
};
use tracing::info;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::CliError;
use crate::panel::PanelRenderer;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    logger::init_tracing(cli.log_json);

    let config = Config::load(&cli.config);
    let symbols = parse_tickers(&cli.tickers, config.display.max_tickers)?;
    let currency =
        validate_currency_code(cli.currency.as_deref().unwrap_or(&config.currency.default))?;
    let crypto_symbol = config.currency.symbol_for(&currency);
    let board = build_board(&cli, &config).with_currency(currency);

    let color = !cli.no_color && std::io::stdout().is_terminal();
    let screen = Screen {
        cli: &cli,
        renderer: PanelRenderer::new(&config, color).with_crypto_symbol(crypto_symbol),
    };

    if cli.watch {
        let secs = cli.interval_secs.unwrap_or(config.watch.interval_secs);
        let interval = Duration::from_secs(secs.max(1));
        watch(&board, &symbols, &screen, interval, tokio::signal::ctrl_c()).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let report = board.collect(&symbols, UtcDateTime::now()).await;
    screen.show(&report, false)?;
    if report.all_failed() {
        return Err(CliError::AllFailed {
            count: report.entries.len(),
        });
    }
    Ok(ExitCode::SUCCESS)
}

/// Checks the ticker count before parsing any symbol.
fn parse_tickers(raw: &[String], max_tickers: usize) -> Result<Vec<Symbol>, CliError> {
    if raw.len() > max_tickers {
        return Err(CliError::TooManyTickers {
            count: raw.len(),
            max: max_tickers,
        });
    }
    raw.iter()
        .map(|ticker| Symbol::parse(ticker).map_err(CliError::from))
        .collect()
}

fn build_board(cli: &Cli, config: &Config) -> Board {
    let registry = config.registry();
    if cli.mock {
        return Board::offline(registry);
    }

    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    Board::new(
        Arc::new(YahooAdapter::with_http_client(Arc::clone(&http))),
        Arc::new(
            CoinGeckoAdapter::with_http_client(http)
                .with_api_key(CoinGeckoAdapter::api_key_from_env()),
        ),
        registry,
    )
}

/// Refreshes every `interval` until `shutdown` resolves. A refresh
/// interrupted mid-fetch is dropped, leaving the previous screen in place.
///
/// `shutdown` is polled across every cycle, so a signal that lands while a
/// screen is being drawn ends the loop at the next await.
async fn watch<F>(
    board: &Board,
    symbols: &[Symbol],
    screen: &Screen<'_>,
    interval: Duration,
    shutdown: F,
) -> Result<(), CliError>
where
    F: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(shutdown);

    loop {
        let report = tokio::select! {
            report = board.collect(symbols, UtcDateTime::now()) => report,
            signal = &mut shutdown => {
                signal?;
                break;
            }
        };
        screen.show(&report, true)?;

        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            signal = &mut shutdown => {
                signal?;
                break;
            }
        }
    }

    info!("watch mode stopped");
    println!("\nExiting watch mode...");
    Ok(())
}

struct Screen<'a> {
    cli: &'a Cli,
    renderer: PanelRenderer<'a>,
}

impl Screen<'_> {
    fn show(&self, report: &BoardReport, clear: bool) -> Result<(), CliError> {
        let mut stdout = std::io::stdout().lock();
        match self.cli.format {
            OutputFormat::Panel => {
                if clear {
                    stdout.write_all(CLEAR_SCREEN.as_bytes())?;
                }
                stdout.write_all(self.renderer.render_report(report).as_bytes())?;
            }
            OutputFormat::Json => {
                writeln!(stdout, "{}", output::render_json(report, self.cli.pretty)?)?;
            }
        }
        stdout.flush()?;
        Ok(())
    }
}
