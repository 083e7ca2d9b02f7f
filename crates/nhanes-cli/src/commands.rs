use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use nhanes_convert::{BatchReport, Description, describe_file, run_batch};
use tracing::info;

use crate::cli::BatchRequest;

/// Run one batch and write the JSON report when asked to.
pub fn run_batch_command(request: &BatchRequest<'_>) -> Result<BatchReport> {
    let input_dir = &request.input.input_dir;
    let report = run_batch(input_dir, request.mode, &request.options)
        .with_context(|| format!("process {}", input_dir.display()))?;
    if let Some(path) = &request.input.report_json {
        write_report_json(&report, path)?;
        info!(path = %path.display(), "wrote JSON report");
    }
    Ok(report)
}

/// Describe one file. The text goes to stdout either way.
pub fn run_inspect(file: &Path) -> Description {
    let description = describe_file(file);
    print!("{}", description.text());
    if description.is_failed() {
        println!();
    }
    description
}

pub fn write_report_json(report: &BatchReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .with_context(|| format!("write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}
