use std::path::Path;
use std::process;

use tokendiff_engine::diff_dictionaries;

use crate::report::{self, ReportFormat};
use crate::report_error;
use crate::source;

use super::{write_output, CommandError};

/// Print per-bucket counts for two local snapshots.
pub(crate) fn cmd_summary(original: &Path, updated: &Path) {
    if let Err(e) = run_summary(original, updated) {
        report_error(&e.to_string(), ReportFormat::Summary);
        process::exit(1);
    }
}

fn run_summary(original: &Path, updated: &Path) -> Result<(), CommandError> {
    let original = source::load_local(original)?;
    let updated = source::load_local(updated)?;
    let result = diff_dictionaries(&original, &updated);
    write_output(None, &report::render(&result, ReportFormat::Summary))
}
