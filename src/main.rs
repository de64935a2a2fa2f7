use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::sync::atomic::Ordering;

mod cli;

use cli::{Cli, Commands};
use transcript_recipes::collector::{source_urls, Collector};
use transcript_recipes::{load_config, ProviderFactory, RecipeGenerator};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Collect {
            urls,
            urls_file,
            output,
        } => {
            if let Some(output) = output {
                config.collector.output_path = output;
            }
            if urls_file.is_some() {
                config.collector.urls_file = urls_file;
            }

            let urls = source_urls(&config.collector, &urls)?;
            if urls.is_empty() {
                warn!("No URLs to collect; set collector.urls, --urls-file or pass URLs");
                return Ok(());
            }

            let collector = Collector::new(&config.collector, Box::new(config.collector.pacer()))?;

            // Ctrl-C only raises the flag; the loop stops before the next URL
            let stop = collector.stop_handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    stop.store(true, Ordering::SeqCst);
                }
            });
            tokio::task::yield_now().await;

            let report = collector.run(&urls).await?;
            println!(
                "{} new, {} skipped, {} empty, {} failed -> {}",
                report.fetched,
                report.skipped,
                report.empty,
                report.failures.len(),
                config.collector.output_path.display()
            );
            for failure in &report.failures {
                println!("  {}: {}", failure.key, failure.reason);
            }
            if report.interrupted {
                info!("Stopped early; rerun to continue where this run left off");
            }
        }
        Commands::Generate { input, output } => {
            if let Some(input) = input {
                config.generator.input_path = input;
            }
            if let Some(output) = output {
                config.generator.output_path = output;
            }

            let provider = ProviderFactory::create(&config.provider)?;
            info!(
                "Using {} provider with model {}",
                provider.provider_name(),
                config.provider.model
            );
            let generator = RecipeGenerator::new(provider, Box::new(config.generator.pacer()));

            let progress = if cli.quiet {
                ProgressBar::hidden()
            } else {
                let progress = ProgressBar::new(0);
                progress.set_style(
                    ProgressStyle::default_bar()
                        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                        .progress_chars("#>-"),
                );
                progress
            };

            let report = generator
                .generate_dataset(&config.generator, &progress)
                .await?;
            println!(
                "{} recipes, {} failed -> {}",
                report.records.len(),
                report.failures.len(),
                config.generator.output_path.display()
            );
            for failure in &report.failures {
                println!("  {}: {}", failure.key, failure.reason);
            }
        }
    }

    Ok(())
}
