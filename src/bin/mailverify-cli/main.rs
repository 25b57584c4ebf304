mod args;
mod input;
mod output;

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Mutex, mpsc};
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use mailverify_lib::{BulkProgress, BulkSummary, Verifier, bulk_verify_with_progress};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::args::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    // exit codes: 0 ok, 2 sending not permitted, 1 fatal
    match &cli.cmd {
        Some(Commands::Verify { email, format }) => {
            let verifier = Verifier::system(cli.verifier_options())?;
            let result = verifier.verify(email);
            output::write_result(&result, format)?;
            if !result.permits_sending() {
                std::process::exit(2);
            }
        }
        Some(Commands::Bulk {
            input,
            out,
            workers,
            format,
        }) => run_bulk(&cli, input, out, *workers, format)?,
        None => {
            Cli::clap_command().print_help()?;
            println!();
        }
    }
    Ok(())
}

fn run_bulk(cli: &Cli, input: &Path, out: &str, workers: usize, format: &str) -> Result<()> {
    info!("loading emails from {}", input.display());
    let emails = input::load_emails(input)?;
    if emails.is_empty() {
        warn!("no emails to verify, exiting");
        return Ok(());
    }
    info!(count = emails.len(), "found emails to process");

    let verifier = Verifier::system(cli.verifier_options())?;
    let bar = progress_bar(emails.len() as u64)?;

    info!(workers, "starting verification");
    let started = Instant::now();
    let (tx, rx) = mpsc::channel::<BulkProgress>();
    let results = thread::scope(|scope| {
        let bar = bar.clone();
        scope.spawn(move || follow_progress(&bar, rx));
        bulk_verify_with_progress(&verifier, &emails, workers, tx)
    });
    let elapsed = started.elapsed();
    bar.finish_and_clear();

    output::write_report(&results, format, out)?;
    let summary = BulkSummary::from_results(&results);
    info!("{}", "=".repeat(40));
    info!("verification complete");
    info!("total time taken: {:.2} seconds", elapsed.as_secs_f64());
    info!("results summary:{}", output::summary_table(&summary));
    if out != "-" {
        info!("detailed results saved in {out}");
    }
    Ok(())
}

fn follow_progress(bar: &ProgressBar, events: mpsc::Receiver<BulkProgress>) {
    for event in events {
        bar.set_position(event.completed as u64);
    }
}

fn progress_bar(total: u64) -> Result<ProgressBar> {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} verified (eta {eta})",
        )?
        .progress_chars("=> "),
    );
    Ok(bar)
}

fn init_logging(cli: &Cli) -> Result<()> {
    let filter = if cli.verbose > 0 {
        EnvFilter::new(cli.log_level())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()))
    };

    let file_layer = match &cli.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .try_init()
        .context("install log subscriber")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_tracks_progress_events() {
        let bar = progress_bar(3).expect("valid template");
        let (tx, rx) = mpsc::channel::<BulkProgress>();
        for completed in 1..=3 {
            tx.send(BulkProgress {
                completed,
                total: 3,
            })
            .expect("send");
        }
        drop(tx);
        follow_progress(&bar, rx);
        assert_eq!(bar.position(), 3);
        assert_eq!(bar.length(), Some(3));
    }
}
