//! Sequential batch driver over an input directory.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{info, info_span, warn};

use crate::convert::{ConversionOutcome, convert_file, with_extension};
use crate::describe::{Description, describe_file};
use crate::discovery::{DEFAULT_EXTENSION, list_input_files};
use crate::error::Result;
use crate::sink::write_text;
use crate::source::file_name;
use crate::strategy::StrategyChain;

/// Which sinks a batch writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchMode {
    Convert,
    Describe,
    Both,
}

impl BatchMode {
    #[must_use]
    pub const fn converts(self) -> bool {
        matches!(self, Self::Convert | Self::Both)
    }

    #[must_use]
    pub const fn describes(self) -> bool {
        matches!(self, Self::Describe | Self::Both)
    }
}

/// Batch settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// CSV directory. Defaults to `csv`.
    pub output_dir: PathBuf,
    /// Description directory. `None` writes next to the inputs.
    pub description_dir: Option<PathBuf>,
    /// Input extension, matched case-insensitively.
    pub extension: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("csv"),
            description_dir: None,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl ConvertOptions {
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_description_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.description_dir = dir;
        self
    }

    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    fn description_dir<'a>(&'a self, input_dir: &'a Path) -> &'a Path {
        self.description_dir.as_deref().unwrap_or(input_dir)
    }
}

/// Step of a file's processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Convert,
    Describe,
}

/// Result of one step for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StepResult {
    Converted {
        strategy: String,
        rows: usize,
        columns: usize,
        output: PathBuf,
        /// Earlier strategies that rejected the file, as `strategy: message`.
        fallbacks: Vec<String>,
    },
    Described {
        output: PathBuf,
    },
    Failed {
        step: Step,
        error: String,
    },
}

impl StepResult {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Everything that happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub file: String,
    pub path: PathBuf,
    pub steps: Vec<StepResult>,
}

impl FileReport {
    /// A file fails when any of its steps failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.steps.iter().any(StepResult::is_failed)
    }

    #[must_use]
    pub fn converted(&self) -> Option<&StepResult> {
        self.steps
            .iter()
            .find(|s| matches!(s, StepResult::Converted { .. }))
    }

    #[must_use]
    pub fn described(&self) -> bool {
        self.steps
            .iter()
            .any(|s| matches!(s, StepResult::Described { .. }))
    }
}

/// Aggregate result of a batch, one [`FileReport`] per input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    input_dir: PathBuf,
    mode: BatchMode,
    attempted: usize,
    converted: usize,
    described: usize,
    errors: usize,
    files: Vec<FileReport>,
}

impl BatchReport {
    #[must_use]
    pub fn new(input_dir: PathBuf, mode: BatchMode, files: Vec<FileReport>) -> Self {
        let converted = files.iter().filter(|f| f.converted().is_some()).count();
        let described = files.iter().filter(|f| f.described()).count();
        let errors = files.iter().filter(|f| f.is_failed()).count();
        Self {
            input_dir,
            mode,
            attempted: files.len(),
            converted,
            described,
            errors,
            files,
        }
    }

    #[must_use]
    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    #[must_use]
    pub fn mode(&self) -> BatchMode {
        self.mode
    }

    #[must_use]
    pub fn files(&self) -> &[FileReport] {
        &self.files
    }

    #[must_use]
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    #[must_use]
    pub fn converted(&self) -> usize {
        self.converted
    }

    #[must_use]
    pub fn described(&self) -> usize {
        self.described
    }

    /// Files with at least one failed step.
    #[must_use]
    pub fn errors(&self) -> usize {
        self.errors
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// One-line summary, e.g. `2 converted, 1 error`.
    #[must_use]
    pub fn summary(&self) -> String {
        let noun = if self.errors == 1 { "error" } else { "errors" };
        match self.mode {
            BatchMode::Convert => format!("{} converted, {} {noun}", self.converted, self.errors),
            BatchMode::Describe => format!("{} described, {} {noun}", self.described, self.errors),
            BatchMode::Both => format!(
                "{} converted, {} described, {} {noun}",
                self.converted, self.described, self.errors
            ),
        }
    }
}

/// Run a batch with the standard strategy chain.
pub fn run_batch(input_dir: &Path, mode: BatchMode, options: &ConvertOptions) -> Result<BatchReport> {
    run_batch_with_chain(input_dir, mode, options, &StrategyChain::standard())
}

/// Run a batch with an explicit strategy chain.
///
/// Only a missing or unreadable input directory is an error. Every file
/// gets exactly one [`FileReport`], whatever happens to it.
pub fn run_batch_with_chain(
    input_dir: &Path,
    mode: BatchMode,
    options: &ConvertOptions,
    chain: &StrategyChain,
) -> Result<BatchReport> {
    let batch_span = info_span!("batch", input_dir = %input_dir.display(), mode = ?mode);
    let _batch_guard = batch_span.enter();
    let start = Instant::now();

    let inputs = list_input_files(input_dir, &options.extension)?;
    info!(files = inputs.len(), "discovered input files");

    let files: Vec<FileReport> = inputs
        .iter()
        .map(|path| {
            let file = file_name(path);
            info_span!("file", file = %file)
                .in_scope(|| process_file(path, file, input_dir, mode, options, chain))
        })
        .collect();

    let report = BatchReport::new(input_dir.to_path_buf(), mode, files);
    info!(
        attempted = report.attempted(),
        converted = report.converted(),
        described = report.described(),
        errors = report.errors(),
        duration_ms = start.elapsed().as_millis(),
        "batch complete"
    );
    Ok(report)
}

fn process_file(
    path: &Path,
    file: String,
    input_dir: &Path,
    mode: BatchMode,
    options: &ConvertOptions,
    chain: &StrategyChain,
) -> FileReport {
    let mut steps = Vec::new();
    if mode.converts() {
        steps.push(convert_step(path, &options.output_dir, chain));
    }
    if mode.describes() {
        steps.push(describe_step(path, options.description_dir(input_dir)));
    }
    FileReport {
        file,
        path: path.to_path_buf(),
        steps,
    }
}

fn convert_step(path: &Path, output_dir: &Path, chain: &StrategyChain) -> StepResult {
    match convert_file(path, output_dir, chain) {
        Ok(ConversionOutcome::Converted(converted)) => StepResult::Converted {
            strategy: converted.strategy,
            rows: converted.table.row_count(),
            columns: converted.table.column_count(),
            output: converted.csv_path,
            fallbacks: converted
                .earlier_failures
                .iter()
                .map(ToString::to_string)
                .collect(),
        },
        Ok(ConversionOutcome::Failed(failure)) => StepResult::Failed {
            step: Step::Convert,
            error: failure.to_string(),
        },
        Err(error) => {
            warn!(%error, "conversion failed");
            StepResult::Failed {
                step: Step::Convert,
                error: error.to_string(),
            }
        }
    }
}

fn describe_step(path: &Path, description_dir: &Path) -> StepResult {
    let target = description_dir.join(with_extension(path, "txt"));
    let description = describe_file(path);
    if let Err(error) = write_text(description.text(), &target) {
        warn!(%error, "failed to write description");
        return StepResult::Failed {
            step: Step::Describe,
            error: error.to_string(),
        };
    }
    match description {
        Description::Report(_) => {
            info!(output = %target.display(), "described");
            StepResult::Described { output: target }
        }
        Description::Failed(line) => StepResult::Failed {
            step: Step::Describe,
            error: line,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(mode: BatchMode, steps: Vec<Vec<StepResult>>) -> BatchReport {
        let files = steps
            .into_iter()
            .enumerate()
            .map(|(i, steps)| FileReport {
                file: format!("F{i}.xpt"),
                path: PathBuf::from(format!("F{i}.xpt")),
                steps,
            })
            .collect();
        BatchReport::new(PathBuf::from("xpt"), mode, files)
    }

    fn converted() -> StepResult {
        StepResult::Converted {
            strategy: "transport".to_string(),
            rows: 1,
            columns: 1,
            output: PathBuf::from("csv/F.csv"),
            fallbacks: Vec::new(),
        }
    }

    fn failed(step: Step) -> StepResult {
        StepResult::Failed {
            step,
            error: "boom".to_string(),
        }
    }

    #[test]
    fn test_summary_pluralization() {
        let one = report(
            BatchMode::Convert,
            vec![vec![converted()], vec![failed(Step::Convert)], vec![converted()]],
        );
        assert_eq!(one.summary(), "2 converted, 1 error");

        let none = report(BatchMode::Convert, Vec::new());
        assert_eq!(none.summary(), "0 converted, 0 errors");
        assert!(!none.has_errors());

        let two = report(
            BatchMode::Describe,
            vec![vec![failed(Step::Describe)], vec![failed(Step::Describe)]],
        );
        assert_eq!(two.summary(), "0 described, 2 errors");
    }

    #[test]
    fn test_both_counts_one_outcome_per_file() {
        let described = StepResult::Described {
            output: PathBuf::from("F.txt"),
        };
        let report = report(
            BatchMode::Both,
            vec![
                vec![converted(), described.clone()],
                vec![failed(Step::Convert), failed(Step::Describe)],
                vec![converted(), failed(Step::Describe)],
            ],
        );
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.converted(), 2);
        assert_eq!(report.described(), 1);
        assert_eq!(report.errors(), 2);
        assert_eq!(report.summary(), "2 converted, 1 described, 2 errors");
    }

    #[test]
    fn test_default_options() {
        let options = ConvertOptions::default();
        assert_eq!(options.output_dir, PathBuf::from("csv"));
        assert_eq!(options.extension, "xpt");
        assert_eq!(options.description_dir(Path::new("in")), Path::new("in"));

        let options = options.with_description_dir(Some(PathBuf::from("txt")));
        assert_eq!(options.description_dir(Path::new("in")), Path::new("txt"));
    }

    #[test]
    fn test_report_serializes_counts() {
        let report = report(BatchMode::Convert, vec![vec![converted()]]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "convert");
        assert_eq!(json["converted"], 1);
        assert_eq!(json["files"][0]["steps"][0]["status"], "converted");
    }
}
