mod app;
mod cli;
mod config;
mod profile;

use clap::Parser;
use log::LevelFilter;
use talent_engine::HarvestError;
use talent_logging::{harvest_error, LogDestination};

use crate::cli::{Cli, GlobalArgs};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli.global);

    let code = match app::run(cli).await {
        Ok(code) => code,
        Err(err) => {
            harvest_error!("{:#}", err);
            exit_code(&err)
        }
    };
    std::process::exit(code);
}

fn init_logging(args: &GlobalArgs) {
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let destination = match &args.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Stderr,
    };
    talent_logging::initialize(destination, level);
}

/// Harvest failures carry their own category; anything else is generic.
fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<HarvestError>()
        .map(|err| err.category().exit_code())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use talent_engine::{FailureKind, FetchError};

    use super::*;

    #[test]
    fn exit_codes_follow_the_failure_category() {
        let cipher = anyhow::Error::from(HarvestError::UnsupportedCipher {
            indicator: "3".into(),
        });
        assert_eq!(exit_code(&cipher), 3);

        let network = anyhow::Error::from(HarvestError::Network(FetchError {
            kind: FailureKind::Timeout,
            message: "timed out".into(),
        }));
        assert_eq!(exit_code(&network), 2);

        assert_eq!(exit_code(&anyhow::anyhow!("bad profile")), 1);
        assert_eq!(exit_code(&anyhow::Error::from(HarvestError::MissingCredentials)), 1);
    }
}
