use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;
use talent_core::{ItemsPayload, LoginReport, PositionsPayload};
use talent_engine::{verify_login, HarvestSession, LoginOutcome};
use talent_logging::harvest_info;

use crate::cli::{Cli, Command, HarvestArgs};
use crate::config::RunConfig;

/// Runs the selected command and returns the process exit status.
pub(crate) async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = RunConfig::load(cli.global);

    match cli.command {
        Command::VerifyLogin => {
            let outcome = verify(config).await;
            print_json(&outcome.report)?;
            Ok(outcome.exit_code)
        }
        Command::Positions => {
            let mut harvest = connect(config?).await?;
            let positions = harvest.aggregate_positions().await?;
            print_json(&PositionsPayload::from_positions(positions))?;
            Ok(0)
        }
        Command::Harvest(args) => run_harvest(config?, args).await,
    }
}

/// Login check that always yields a report, even when configuration failed.
async fn verify(config: anyhow::Result<RunConfig>) -> LoginOutcome {
    match config {
        Ok(config) => verify_login(config.settings, &config.corp_code, config.sources).await,
        Err(err) => LoginOutcome {
            report: LoginReport::Error {
                message: format!("{err:#}"),
            },
            exit_code: 1,
        },
    }
}

async fn connect(config: RunConfig) -> anyhow::Result<HarvestSession> {
    // Fails on missing credentials before anything touches the network.
    let identity = config.sources.resolve()?;
    let session =
        HarvestSession::connect(config.settings, &config.corp_code, identity, config.options)
            .await?;
    Ok(session)
}

async fn run_harvest(config: RunConfig, args: HarvestArgs) -> anyhow::Result<i32> {
    let output_dir: PathBuf = args
        .output_dir
        .unwrap_or_else(|| config.output_dir.clone());
    let mut harvest = connect(config).await?;

    if !args.json {
        let summary = harvest.save_resumes(&output_dir).await?;
        harvest_info!(
            "{} resumes written to {}, {} unavailable",
            summary.written,
            output_dir.display(),
            summary.missing
        );
        return Ok(0);
    }

    let payload = match args.page {
        Some(page_no) => {
            let page = harvest.harvest_page(page_no).await?;
            ItemsPayload::for_page(page.reported_total, &page.items)
        }
        None => ItemsPayload::from_items(&harvest.harvest_all().await?),
    };
    print_json(&payload)?;
    Ok(0)
}

fn print_json<T: Serialize>(payload: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string(payload).context("serializing output")?;
    println!("{text}");
    Ok(())
}
