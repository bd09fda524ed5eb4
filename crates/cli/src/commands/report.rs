use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgGroup, Args};
use tokendiff_engine::diff_dictionaries;
use tracing::debug;

use crate::config::{self, RemoteConfig, RemoteFlags};
use crate::report::{self, ReportFormat};
use crate::report_error;
use crate::source::{self, SourceSpec};

use super::{write_output, CommandError};

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("original")
        .required(true)
        .args(["original_version", "original_branch", "original_path"])
))]
#[command(group(
    ArgGroup::new("updated")
        .required(true)
        .args(["updated_version", "updated_branch", "updated_path"])
))]
pub(crate) struct ReportArgs {
    /// Released version to use as the original snapshot
    #[arg(long)]
    pub original_version: Option<String>,
    /// Branch to use as the original snapshot
    #[arg(long)]
    pub original_branch: Option<String>,
    /// Local JSON file or directory to use as the original snapshot
    #[arg(long)]
    pub original_path: Option<PathBuf>,

    /// Released version to use as the updated snapshot
    #[arg(long)]
    pub updated_version: Option<String>,
    /// Branch to use as the updated snapshot
    #[arg(long)]
    pub updated_branch: Option<String>,
    /// Local JSON file or directory to use as the updated snapshot
    #[arg(long)]
    pub updated_path: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: ReportFormat,
    /// Write the report to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Exit with status 1 when any change is found
    #[arg(long)]
    pub fail_on_changes: bool,

    /// Base URL of the raw content host (env: TOKENDIFF_REMOTE_URL)
    #[arg(long)]
    pub remote_url: Option<String>,
    /// Package directory holding manifest.json (env: TOKENDIFF_PACKAGE_PATH)
    #[arg(long)]
    pub package_path: Option<String>,
    /// Prefix turning a version into a release tag (env: TOKENDIFF_TAG_PREFIX)
    #[arg(long)]
    pub tag_prefix: Option<String>,
}

pub(crate) fn cmd_report(args: &ReportArgs, config_path: Option<&Path>) {
    match run_report(args, config_path) {
        Ok(has_changes) => {
            if has_changes && args.fail_on_changes {
                process::exit(1);
            }
        }
        Err(e) => {
            report_error(&e.to_string(), args.format);
            process::exit(1);
        }
    }
}

/// Returns whether any change was found.
fn run_report(args: &ReportArgs, config_path: Option<&Path>) -> Result<bool, CommandError> {
    let file = config::load_config(config_path, Path::new("."))?;
    let flags = RemoteFlags {
        base_url: args.remote_url.as_deref(),
        package_path: args.package_path.as_deref(),
        tag_prefix: args.tag_prefix.as_deref(),
    };
    let remote = RemoteConfig::resolve(flags, |key| std::env::var(key).ok(), &file);
    debug!(?remote, "resolved remote settings");

    let original_spec = SourceSpec::from_selectors(
        args.original_version.clone(),
        args.original_branch.clone(),
        args.original_path.clone(),
    )
    .ok_or(CommandError::Selector("original"))?;
    let updated_spec = SourceSpec::from_selectors(
        args.updated_version.clone(),
        args.updated_branch.clone(),
        args.updated_path.clone(),
    )
    .ok_or(CommandError::Selector("updated"))?;

    let original = source::load(&original_spec, &remote)?;
    let updated = source::load(&updated_spec, &remote)?;

    let result = diff_dictionaries(&original, &updated);
    write_output(args.output.as_deref(), &report::render(&result, args.format))?;

    Ok(!result.is_empty())
}
