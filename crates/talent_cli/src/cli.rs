use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::parse_date;

#[derive(Parser, Debug)]
#[command(
    name = "talent-harvest",
    about = "Harvest candidate resumes and job descriptions from the recruiting platform",
    version
)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) global: GlobalArgs,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Args, Debug, Default, Clone)]
pub(crate) struct GlobalArgs {
    /// Organisation code used at login
    #[arg(long, global = true)]
    pub(crate) corp_code: Option<String>,
    /// Login account (falls back to WT_USERNAME)
    #[arg(long, global = true)]
    pub(crate) username: Option<String>,
    /// Login password (falls back to WT_PASSWORD)
    #[arg(long, global = true)]
    pub(crate) password: Option<String>,
    /// Existing session cookie value; skips the login handshake
    #[arg(long, global = true)]
    pub(crate) session_cookie: Option<String>,
    /// Organisation path the candidate list is scoped to
    #[arg(long, global = true)]
    pub(crate) current_code: Option<String>,
    #[arg(long, global = true)]
    pub(crate) base_url: Option<String>,
    #[arg(long, global = true)]
    pub(crate) page_size: Option<u32>,
    /// Upper bound on list pages fetched in one traversal
    #[arg(long, global = true)]
    pub(crate) max_pages: Option<u32>,
    /// Earliest recommendation date, YYYY-MM-DD
    #[arg(long, global = true, value_parser = parse_date)]
    pub(crate) begin_date: Option<String>,
    /// Latest recommendation date, YYYY-MM-DD
    #[arg(long, global = true, value_parser = parse_date)]
    pub(crate) end_date: Option<String>,
    /// RON file with defaults for the options above
    #[arg(long, global = true)]
    pub(crate) profile: Option<PathBuf>,
    /// Also write logs to this file
    #[arg(long, global = true)]
    pub(crate) log_file: Option<PathBuf>,
    #[arg(long, short, global = true)]
    pub(crate) verbose: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Log in and report the result as JSON
    VerifyLogin,
    /// Print the deduplicated job list as JSON
    Positions,
    /// Harvest candidates: save resumes, or print everything as JSON
    Harvest(HarvestArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct HarvestArgs {
    /// Fetch only this 1-based page
    #[arg(long, requires = "json")]
    pub(crate) page: Option<u32>,
    /// Print the items payload with base64 resumes instead of saving files
    #[arg(long)]
    pub(crate) json: bool,
    /// Where resumes are saved
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "talent-harvest",
            "harvest",
            "--json",
            "--page",
            "2",
            "--corp-code",
            "acme",
            "--begin-date",
            "2024-01-31",
        ])
        .unwrap();
        assert_eq!(cli.global.corp_code.as_deref(), Some("acme"));
        assert_eq!(cli.global.begin_date.as_deref(), Some("2024-01-31"));
        match cli.command {
            Command::Harvest(args) => {
                assert!(args.json);
                assert_eq!(args.page, Some(2));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn page_requires_json_output() {
        assert!(Cli::try_parse_from(["talent-harvest", "harvest", "--page", "2"]).is_err());
    }

    #[test]
    fn malformed_dates_are_rejected() {
        let parsed = Cli::try_parse_from(["talent-harvest", "positions", "--end-date", "31/01/2024"]);
        assert!(parsed.is_err());
    }
}
