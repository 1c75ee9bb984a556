//! Command line entry point for the mailsweep crawler.

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;

use mailsweep::Crawler;
use mailsweep::config::{AppArgs, build_config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = AppArgs::parse();
    let config = build_config(&args).context("Failed to build configuration")?;
    let quiet = config.quiet;
    let output_file = config.output_file.clone();

    let crawler = Crawler::new(config)?;

    // Ctrl-C finishes the run early with whatever was collected.
    let cancel = crawler.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, finishing with partial results");
            cancel.cancel();
        }
    });

    let spinner = if quiet {
        indicatif::ProgressBar::hidden()
    } else {
        let pb = indicatif::ProgressBar::new_spinner();
        pb.set_message(format!("sweeping {}", args.seed));
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    };

    let report = crawler.crawl(&args.seed).await?;
    spinner.finish_and_clear();

    if !quiet {
        for email in &report.emails {
            println!("{}", email);
        }
    }
    println!("{}", report.summary());

    if let Some(path) = output_file {
        report.write_json(&path)?;
        tracing::info!("Wrote report to {}", path);
    }

    Ok(())
}
