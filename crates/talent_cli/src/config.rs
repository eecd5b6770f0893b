//! Merges command-line arguments over an optional profile into the settings
//! a run needs.

use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use talent_core::HarvestOptions;
use talent_engine::{CredentialSources, PlatformSettings};

use crate::cli::GlobalArgs;
use crate::profile::{load_profile, Profile};

pub(crate) const DEFAULT_OUTPUT_DIR: &str = "out";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Accepts only `YYYY-MM-DD` calendar dates.
pub(crate) fn parse_date(value: &str) -> Result<String, String> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(|date| date.format(DATE_FORMAT).to_string())
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

#[derive(Debug)]
pub(crate) struct RunConfig {
    pub(crate) settings: PlatformSettings,
    pub(crate) corp_code: String,
    pub(crate) sources: CredentialSources,
    pub(crate) options: HarvestOptions,
    pub(crate) output_dir: PathBuf,
}

impl RunConfig {
    pub(crate) fn load(args: GlobalArgs) -> anyhow::Result<Self> {
        let profile = match &args.profile {
            Some(path) => load_profile(path)?,
            None => Profile::default(),
        };
        Self::merge(args, profile)
    }

    /// Command-line values win over profile values.
    pub(crate) fn merge(args: GlobalArgs, profile: Profile) -> anyhow::Result<Self> {
        let Some(corp_code) = args.corp_code.or(profile.corp_code) else {
            bail!("a corp code is required (--corp-code or the profile's corp_code)");
        };

        let mut settings = PlatformSettings::default();
        if let Some(base_url) = args.base_url.or(profile.base_url) {
            settings.base_url = base_url;
        }
        if let Some(current_code) = args.current_code.or(profile.current_code) {
            settings.current_code = current_code;
        }

        let recommend_begin = validated(args.begin_date.or(profile.begin_date))
            .context("invalid begin date")?;
        let recommend_end =
            validated(args.end_date.or(profile.end_date)).context("invalid end date")?;
        if let (Some(begin), Some(end)) = (&recommend_begin, &recommend_end) {
            if begin > end {
                bail!("begin date {begin} is after end date {end}");
            }
        }

        let defaults = HarvestOptions::default();
        let options = HarvestOptions {
            page_size: args.page_size.or(profile.page_size).unwrap_or(defaults.page_size),
            max_pages: args.max_pages.or(profile.max_pages).unwrap_or(defaults.max_pages),
            recommend_begin,
            recommend_end,
        };

        Ok(Self {
            settings,
            corp_code,
            sources: CredentialSources {
                session_token: args.session_cookie,
                username: args.username,
                password: args.password,
            },
            options,
            output_dir: profile
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        })
    }
}

fn validated(date: Option<String>) -> anyhow::Result<Option<String>> {
    date.map(|d| parse_date(&d).map_err(anyhow::Error::msg))
        .transpose()
}
