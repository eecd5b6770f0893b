//! Optional RON profile supplying defaults for the command line.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use talent_logging::harvest_info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Profile {
    pub(crate) corp_code: Option<String>,
    pub(crate) current_code: Option<String>,
    pub(crate) base_url: Option<String>,
    pub(crate) page_size: Option<u32>,
    pub(crate) max_pages: Option<u32>,
    pub(crate) begin_date: Option<String>,
    pub(crate) end_date: Option<String>,
    pub(crate) output_dir: Option<PathBuf>,
}

pub(crate) fn load_profile(path: &Path) -> anyhow::Result<Profile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading profile {}", path.display()))?;
    let profile: Profile = ron::from_str(&content)
        .with_context(|| format!("parsing profile {}", path.display()))?;
    harvest_info!("Loaded profile from {:?}", path);
    Ok(profile)
}
