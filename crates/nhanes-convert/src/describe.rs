//! Human-readable file descriptions.

use std::path::Path;

use comfy_table::presets::ASCII_FULL_CONDENSED;
use comfy_table::{CellAlignment, ContentArrangement, Table as TextTable};
use nhanes_model::{InferredType, Table};
use tracing::warn;

use crate::source::{SourceFile, file_name};
use crate::strategy::{MetadataStrategy, ParseStrategy};

/// Rows shown in the data preview.
pub const PREVIEW_ROWS: usize = 5;

/// Columns shown on each side of the elision in a wide preview.
const PREVIEW_EDGE_COLUMNS: usize = 10;

/// Result of describing one file. Both variants carry the text to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Description {
    Report(String),
    /// A single `Error processing <file>: <reason>` line.
    Failed(String),
}

impl Description {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Report(text) | Self::Failed(text) => text,
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Describe a file using the metadata strategy only.
pub fn describe_file(path: &Path) -> Description {
    describe_with(path, &MetadataStrategy)
}

/// Describe a file with an explicit strategy.
pub fn describe_with(path: &Path, strategy: &dyn ParseStrategy) -> Description {
    let result = SourceFile::from_path(path)
        .map_err(|e| e.to_string())
        .and_then(|source| {
            let table = strategy.parse(path).map_err(|e| e.message)?;
            Ok(render_description(&source, &table))
        });
    match result {
        Ok(text) => Description::Report(text),
        Err(reason) => {
            let line = format!("Error processing {}: {reason}", file_name(path));
            warn!("{line}");
            Description::Failed(line)
        }
    }
}

/// Render the description report of a parsed table.
#[must_use]
pub fn render_description(source: &SourceFile, table: &Table) -> String {
    let mb = source.size as f64 / 1024.0 / 1024.0;
    let modified = source.modified.map_or_else(
        || "unknown".to_string(),
        |m| m.format("%Y-%m-%d %H:%M:%S").to_string(),
    );

    let mut lines = vec![
        "XPT File Description".to_string(),
        "=".repeat(50),
        format!("File Name: {}", source.name()),
        format!("File Size: {} bytes ({mb:.2} MB)", thousands(source.size)),
        format!("Last Modified: {modified}"),
        String::new(),
        "Dataset Information:".to_string(),
        format!("Number of Rows: {}", thousands(table.row_count() as u64)),
        format!("Number of Columns: {}", table.column_count()),
        String::new(),
        "Column Information:".to_string(),
        "-".repeat(30),
    ];

    for (i, column) in table.columns().iter().enumerate() {
        lines.push(format!("Column {}: {}", i + 1, column.name()));
        lines.push(format!("    Type: {}", column.inferred_type()));
        if let Some(label) = column.label().filter(|l| !l.trim().is_empty()) {
            lines.push(format!("    Label: {label}"));
        }
        lines.push(String::new());
    }

    let metadata = table.metadata();
    lines.extend(
        [
            ("File Encoding", &metadata.encoding),
            ("Table Name", &metadata.table_name),
            ("File Label", &metadata.file_label),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|value| format!("{key}: {value}"))),
    );

    lines.extend([
        String::new(),
        format!("Data Preview (first {PREVIEW_ROWS} rows):"),
        "-".repeat(30),
        preview(table),
        String::new(),
        "Data Types Summary:".to_string(),
        "-".repeat(20),
    ]);

    let types: Vec<InferredType> = table.columns().iter().map(|c| c.inferred_type()).collect();
    let width = table.column_names().map(str::len).max().unwrap_or(0);
    for (name, kind) in table.column_names().zip(&types) {
        lines.push(format!("{name:<width$}  {kind}"));
    }
    for (kind, count) in InferredType::tally(types) {
        let noun = if count == 1 { "column" } else { "columns" };
        lines.push(format!("{kind}: {count} {noun}"));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// First rows as a text table. Wide tables keep the first and last
/// columns around a `...` column.
fn preview(table: &Table) -> String {
    let names: Vec<&str> = table.column_names().collect();
    let shown: Vec<Option<usize>> = if names.len() > 2 * PREVIEW_EDGE_COLUMNS {
        (0..PREVIEW_EDGE_COLUMNS)
            .map(Some)
            .chain(std::iter::once(None))
            .chain((names.len() - PREVIEW_EDGE_COLUMNS..names.len()).map(Some))
            .collect()
    } else {
        (0..names.len()).map(Some).collect()
    };

    let mut text = TextTable::new();
    text.load_preset(ASCII_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(shown.iter().map(|i| i.map_or("...", |i| names[i])));

    for row in table.rows().take(PREVIEW_ROWS) {
        text.add_row(
            shown
                .iter()
                .map(|i| i.map_or_else(|| "...".to_string(), |i| row[i].to_string())),
        );
    }
    for (index, column) in shown.iter().enumerate() {
        let numeric = column.is_some_and(|i| table.columns()[i].inferred_type().is_numeric());
        if let (true, Some(col)) = (numeric, text.column_mut(index)) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
    text.to_string()
}

/// Format with `,` thousands separators.
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use nhanes_model::{Column, ColumnMetadata, DatasetMetadata, SourceFormat, Value};
    use std::path::PathBuf;

    fn source() -> SourceFile {
        SourceFile {
            path: PathBuf::from("downloads/DEMO_J.xpt"),
            size: 3_411_200,
            modified: Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).single(),
        }
    }

    fn table() -> Table {
        let columns = vec![
            Column::new(
                ColumnMetadata::numeric("SEQN").with_label(Some("Respondent sequence number")),
                (0..7).map(|i| Value::Number(f64::from(93703 + i))).collect(),
            ),
            Column::new(
                ColumnMetadata::character("RIAGENDR").with_label(Some("")),
                (0..7)
                    .map(|i| Value::Text(String::from(if i % 2 == 0 { "F" } else { "M" })))
                    .collect(),
            ),
            Column::new(
                ColumnMetadata::numeric("INDFMPIR"),
                (0..7).map(|i| Value::Number(f64::from(i) / 2.0)).collect(),
            ),
        ];
        let metadata = DatasetMetadata::new(SourceFormat::TransportV5)
            .with_table_name("DEMO_J")
            .with_encoding(Some("US-ASCII".to_string()));
        Table::new(columns, metadata).unwrap()
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000), "1,000");
        assert_eq!(thousands(3_411_200), "3,411,200");
    }

    #[test]
    fn test_report_header() {
        let report = render_description(&source(), &table());
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "XPT File Description");
        assert_eq!(lines[1], "=".repeat(50));
        assert_eq!(lines[2], "File Name: DEMO_J.xpt");
        assert_eq!(lines[3], "File Size: 3,411,200 bytes (3.25 MB)");
        assert_eq!(lines[4], "Last Modified: 2024-03-05 14:07:09");
        assert_eq!(lines[7], "Number of Rows: 7");
        assert_eq!(lines[8], "Number of Columns: 3");
    }

    #[test]
    fn test_report_columns_and_summary() {
        let report = render_description(&source(), &table());
        assert!(report.contains(
            "Column 1: SEQN\n    Type: integer\n    Label: Respondent sequence number\n\n"
        ));
        // blank labels are omitted
        assert!(report.contains("Column 2: RIAGENDR\n    Type: text\n\n"));
        assert!(report.contains("Column 3: INDFMPIR\n    Type: float\n\n"));
        assert!(report.contains("File Encoding: US-ASCII\nTable Name: DEMO_J\n"));
        assert!(!report.contains("File Label:"));

        let summary = report.split("Data Types Summary:\n").nth(1).unwrap();
        assert!(summary.contains("SEQN      integer\n"));
        assert!(summary.contains("RIAGENDR  text\n"));
        assert!(summary.contains("integer: 1 column\n"));
        assert!(summary.contains("float: 1 column\n"));
    }

    #[test]
    fn test_preview_limits_rows() {
        let text = preview(&table());
        assert!(text.contains("93703"));
        assert!(text.contains("93707"));
        assert!(!text.contains("93708"));
    }

    #[test]
    fn test_wide_preview_elides_columns() {
        let columns = (0..30)
            .map(|i| Column::new(ColumnMetadata::numeric(format!("V{i:02}")), vec![Value::Missing]))
            .collect();
        let table = Table::new(columns, DatasetMetadata::default()).unwrap();
        let text = preview(&table);
        assert!(text.contains("V09"));
        assert!(text.contains("..."));
        assert!(!text.contains("V15"));
        assert!(text.contains("V29"));
    }

    #[test]
    fn test_missing_file_reports_error_line() {
        let description = describe_file(Path::new("/nonexistent/DEMO_J.xpt"));
        assert!(description.is_failed());
        assert!(description.text().starts_with("Error processing DEMO_J.xpt: "));
        assert_eq!(description.text().lines().count(), 1);
    }
}
