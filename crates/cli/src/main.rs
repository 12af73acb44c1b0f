//! Refresher CLI - content refresh scheduler.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use anyhow::Result;
use clap::{Parser, Subcommand};
use refresher_api::{router, serve, GenerateRequest, PeriodicTrigger, RefreshService};
use refresher_core::{AppConfig, BudgetOverrides, RunTrigger, StopReason};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "refresher")]
#[command(about = "Budgeted content refresh scheduler", long_about = None)]
struct Cli {
    /// Config file (defaults to ./refresher.toml when present)
    #[arg(long, short, global = true, env = "REFRESHER_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the admin API and run the periodic trigger
    Serve {
        /// Listen address, overrides the config
        #[arg(long)]
        bind: Option<String>,
        /// Serve the API without the periodic trigger
        #[arg(long)]
        no_trigger: bool,
    },
    /// Run one refresh pass and print its summary
    Run {
        /// Max non-skipped generations
        #[arg(long)]
        max_generations: Option<u32>,
        /// Wall-clock budget in milliseconds
        #[arg(long)]
        max_walltime_ms: Option<u64>,
        /// Freshness threshold in days
        #[arg(long)]
        max_age_days: Option<u32>,
    },
    /// Regenerate one page now
    Generate {
        /// industry, location or industry-location
        #[arg(long)]
        kind: String,
        /// Industry slug
        #[arg(long)]
        industry: Option<String>,
        /// City slug
        #[arg(long)]
        city: Option<String>,
        /// Keep content that is still fresh
        #[arg(long)]
        no_force: bool,
    },
    /// Show the cursor and the last run
    Status,
    /// List the task universe in scan order from position 0
    Tasks {
        /// Max tasks to print
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AppConfig::load(cli.config.as_deref())?;
    let service = Arc::new(RefreshService::from_config(&config).await?);

    match cli.command {
        Commands::Serve { bind, no_trigger } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let trigger = (!no_trigger).then(|| {
                PeriodicTrigger::spawn(
                    service.clone(),
                    Duration::from_secs(config.scheduler.interval_secs),
                )
            });

            let app = router(service, &config.shared_secret);
            serve(&bind, app, async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Shutting down");
            })
            .await?;

            if let Some(trigger) = trigger {
                trigger.shutdown_and_join().await;
            }
        }
        Commands::Run {
            max_generations,
            max_walltime_ms,
            max_age_days,
        } => {
            let overrides = BudgetOverrides {
                max_generations,
                max_walltime_ms,
                max_age_days,
            };
            let summary = service.run(RunTrigger::Manual, &overrides).await;
            print_json(&summary)?;
            if summary.stop_reason == StopReason::Misconfigured {
                anyhow::bail!("run aborted: shared secret is not configured");
            }
        }
        Commands::Generate {
            kind,
            industry,
            city,
            no_force,
        } => {
            let request = GenerateRequest {
                kind,
                industry_slug: industry,
                city_slug: city,
                force: !no_force,
            };
            let response = service.generate(&request).await?;
            print_json(&response)?;
            if let Some(error) = response.error {
                anyhow::bail!("generation of {} failed: {}", response.cache_key, error);
            }
        }
        Commands::Status => {
            print_json(&service.status().await)?;
        }
        Commands::Tasks { limit } => {
            let tasks = service.scheduler().tasks();
            println!("Tasks ({})", tasks.len());
            for (i, task) in tasks.iter().take(limit.unwrap_or(usize::MAX)).enumerate() {
                println!("  {:>4} | {} | {}", i, task.cache_key(), task.label());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_overrides() {
        let cli = Cli::try_parse_from([
            "refresher",
            "--verbose",
            "run",
            "--max-generations",
            "3",
            "--max-walltime-ms",
            "1000",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Run {
                max_generations,
                max_walltime_ms,
                max_age_days,
            } => {
                assert_eq!(max_generations, Some(3));
                assert_eq!(max_walltime_ms, Some(1000));
                assert_eq!(max_age_days, None);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "refresher",
            "generate",
            "--kind",
            "industry-location",
            "--industry",
            "hvac",
            "--city",
            "toronto",
            "--no-force",
        ])
        .unwrap();

        assert!(matches!(
            cli.command,
            Commands::Generate { no_force: true, .. }
        ));
    }
}
