//! Single-file conversion.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use nhanes_model::Table;
use tracing::{debug, info, warn};

use crate::error::{Result, StrategyError};
use crate::sink::write_csv;
use crate::sniff::sniff;
use crate::source::SourceFile;
use crate::strategy::{ChainFailure, StrategyChain};

/// What happened to one source file.
#[derive(Debug)]
pub enum ConversionOutcome {
    Converted(Converted),
    Failed(ParseFailure),
}

impl ConversionOutcome {
    #[must_use]
    pub fn is_converted(&self) -> bool {
        matches!(self, Self::Converted(_))
    }
}

/// A parsed file and where its CSV went.
#[derive(Debug)]
pub struct Converted {
    pub table: Table,
    /// Name of the strategy that parsed the file.
    pub strategy: String,
    /// Strategies that failed before it.
    pub earlier_failures: Vec<StrategyError>,
    pub csv_path: PathBuf,
}

/// Every strategy rejected the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub failure: ChainFailure,
    /// What the leading bytes suggest, e.g. an HTML error page.
    pub hint: Option<String>,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.failure)?;
        if let Some(hint) = &self.hint {
            write!(f, " ({hint})")?;
        }
        Ok(())
    }
}

/// `<output_dir>/<stem>.csv`.
#[must_use]
pub fn csv_path(source: &Path, output_dir: &Path) -> PathBuf {
    output_dir.join(with_extension(source, "csv"))
}

/// File stem of `source` plus `.<extension>`, keeping inner dots.
pub(crate) fn with_extension(source: &Path, extension: &str) -> OsString {
    let mut name = source
        .file_stem()
        .unwrap_or(source.as_os_str())
        .to_os_string();
    name.push(".");
    name.push(extension);
    name
}

/// Parse `path` with the chain and write its CSV into `output_dir`.
///
/// A total parse failure is an `Ok(ConversionOutcome::Failed)` and leaves
/// the output directory untouched. I/O problems (missing file, unwritable
/// output) are errors.
pub fn convert_file(
    path: &Path,
    output_dir: &Path,
    chain: &StrategyChain,
) -> Result<ConversionOutcome> {
    let source = SourceFile::from_path(path)?;
    let signature = sniff(path)?;
    debug!(file = %source.name(), size = source.size, %signature, "sniffed input");

    match chain.parse(path) {
        Ok(success) => {
            let target = csv_path(path, output_dir);
            write_csv(&success.table, &target)?;
            info!(
                file = %source.name(),
                strategy = %success.strategy,
                rows = success.table.row_count(),
                columns = success.table.column_count(),
                output = %target.display(),
                "converted"
            );
            Ok(ConversionOutcome::Converted(Converted {
                table: success.table,
                strategy: success.strategy,
                earlier_failures: success.earlier_failures,
                csv_path: target,
            }))
        }
        Err(failure) => {
            let failure = ParseFailure {
                failure,
                hint: signature.hint().map(str::to_string),
            };
            warn!(file = %source.name(), error = %failure, "conversion failed");
            Ok(ConversionOutcome::Failed(failure))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_path() {
        assert_eq!(
            csv_path(Path::new("downloads/xpt_files/DEMO_J.xpt"), Path::new("csv")),
            PathBuf::from("csv/DEMO_J.csv")
        );
        assert_eq!(
            csv_path(Path::new("P_DEMO.XPT"), Path::new("out")),
            PathBuf::from("out/P_DEMO.csv")
        );
        assert_eq!(
            csv_path(Path::new("DR1IFF_J.v2.xpt"), Path::new("csv")),
            PathBuf::from("csv/DR1IFF_J.v2.csv")
        );
    }

    #[test]
    fn test_failure_display_with_hint() {
        let failure = ParseFailure {
            failure: ChainFailure {
                failures: vec![StrategyError::new("transport", "e1")],
            },
            hint: Some("file looks like an HTML document".to_string()),
        };
        assert_eq!(
            failure.to_string(),
            "all strategies failed: transport(e1) (file looks like an HTML document)"
        );
    }
}
