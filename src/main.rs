mod cli;
mod ui;

use std::io::Read;

use anyhow::{Result, bail};
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use receipt_matic::config::PrinterConfig;
use receipt_matic::enrichment::{Enricher, EnrichmentClient};
use receipt_matic::scheduler::PrinterScheduler;
use ui::ReceiptRenderer;

const DEMO_TEXT: &str = "RECEIPT-MATIC 3000\nThermal paper, 58mm\nOne line every 200ms, then a short pause while the slip detaches from the printer.";

type Printer = PrinterScheduler<EnrichmentClient>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = resolve_config(&cli)?;
    let enrich = config.enrich && !matches!(cli.command, Command::Demo);
    let enricher = if enrich {
        info!(endpoint = %config.endpoint, "enrichment enabled");
        let client = EnrichmentClient::new(config.endpoint.clone(), config.enrich_timeout())?;
        Enricher::new(client, config.enrich_timeout())
    } else {
        Enricher::disabled()
    };
    let printer: Printer = PrinterScheduler::from_config(&config, enricher);
    let mut renderer = ReceiptRenderer::new(config.wrap_width);
    let interrupt = interrupt_on_ctrl_c();

    match cli.command {
        Command::Print { text, file, json } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(path)?,
                (None, None) => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let Some(id) = printer.submit(&text) else {
                bail!("Nothing to print: the receipt text is empty");
            };
            follow(&printer, &mut renderer, &interrupt).await;
            if json && let Some(job) = printer.snapshot().into_iter().find(|j| j.id == id) {
                renderer.print_record(&job);
            }
        }
        Command::Session => {
            let input = BufReader::new(tokio::io::stdin());
            run_session(&printer, &mut renderer, input, &interrupt).await?
        }
        Command::Demo => {
            printer.submit(DEMO_TEXT);
            follow(&printer, &mut renderer, &interrupt).await;
        }
    }

    printer.dispose();
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file, then environment, then CLI flags.
fn resolve_config(cli: &Cli) -> Result<PrinterConfig> {
    let mut config = match &cli.config {
        Some(path) => PrinterConfig::load_from(path)?,
        None => PrinterConfig::load()?,
    };
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(width) = cli.wrap_width {
        config.wrap_width = width;
    }
    if cli.no_enrich {
        config.enrich = false;
    }
    config.validate()?;
    Ok(config)
}

/// Cancelled by the first Ctrl-C. The token stays cancelled, so every
/// later wait on it resolves at once.
fn interrupt_on_ctrl_c() -> CancellationToken {
    let interrupt = CancellationToken::new();
    let trigger = interrupt.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    interrupt
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Followed {
    Idle,
    Interrupted,
}

/// Render store updates until the printer is idle again. An interrupt
/// tears the printer down mid-job.
async fn follow(
    printer: &Printer,
    renderer: &mut ReceiptRenderer,
    interrupt: &CancellationToken,
) -> Followed {
    let mut view = printer.subscribe();
    let mut busy = printer.watch_busy();
    renderer.set_busy(true);

    let outcome = loop {
        // Copy out so the scheduler is never blocked on terminal output.
        let jobs = view.borrow_and_update().snapshot();
        renderer.render(&jobs);
        if !*busy.borrow_and_update() {
            break Followed::Idle;
        }
        tokio::select! {
            _ = interrupt.cancelled() => {
                printer.dispose();
                break Followed::Interrupted;
            }
            changed = view.changed() => if changed.is_err() { break Followed::Idle },
            changed = busy.changed() => if changed.is_err() { break Followed::Idle },
        }
    };

    let jobs = view.borrow().snapshot();
    renderer.render(&jobs);
    renderer.set_busy(false);
    outcome
}

/// Lines accumulate until an empty line, which prints them as one receipt.
/// EOF prints whatever is left and ends the session. An interrupt, at the
/// prompt or mid-receipt, ends it at once.
async fn run_session<R>(
    printer: &Printer,
    renderer: &mut ReceiptRenderer,
    input: R,
    interrupt: &CancellationToken,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut stdout = tokio::io::stdout();
    let mut buffer = String::new();

    prompt(&mut stdout, renderer).await?;
    loop {
        let line = tokio::select! {
            _ = interrupt.cancelled() => return Ok(()),
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };
        if !line.trim().is_empty() {
            buffer.push_str(&line);
            buffer.push('\n');
            continue;
        }
        if printer.submit(&buffer).is_some()
            && follow(printer, renderer, interrupt).await == Followed::Interrupted
        {
            return Ok(());
        }
        buffer.clear();
        prompt(&mut stdout, renderer).await?;
    }

    if printer.submit(&buffer).is_some() {
        follow(printer, renderer, interrupt).await;
    }
    Ok(())
}

async fn prompt(stdout: &mut tokio::io::Stdout, renderer: &ReceiptRenderer) -> Result<()> {
    stdout.write_all(renderer.ready_prompt().as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}
