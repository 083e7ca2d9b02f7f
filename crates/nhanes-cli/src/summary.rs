use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use nhanes_convert::{BatchReport, Step, StepResult};

pub fn print_summary(report: &BatchReport) {
    println!("Input: {}", report.input_dir().display());
    if report.attempted() > 0 {
        println!("{}", summary_table(report));
    }
    println!("{}", report.summary());
}

/// One row per file and step, then a total row.
#[must_use]
pub fn summary_table(report: &BatchReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Step"),
        header_cell("Strategy"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Fallbacks"),
        header_cell("Result"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);

    let mut total_rows = 0usize;
    for file in report.files() {
        for step in &file.steps {
            let row = match step {
                StepResult::Converted {
                    strategy,
                    rows,
                    columns,
                    output,
                    fallbacks,
                } => {
                    total_rows += rows;
                    vec![
                        Cell::new(&file.file),
                        Cell::new("convert"),
                        Cell::new(strategy),
                        Cell::new(rows),
                        Cell::new(columns),
                        count_cell(fallbacks.len(), Color::Yellow),
                        Cell::new(output.display()).fg(Color::Green),
                    ]
                }
                StepResult::Described { output } => vec![
                    Cell::new(&file.file),
                    Cell::new("describe"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    Cell::new(output.display()).fg(Color::Green),
                ],
                StepResult::Failed { step, error } => vec![
                    Cell::new(&file.file),
                    Cell::new(step_name(*step)),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    Cell::new(error).fg(Color::Red),
                ],
            };
            table.add_row(row);
        }
    }

    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        count_cell(report.errors(), Color::Red).add_attribute(Attribute::Bold),
    ]);
    table
}

fn step_name(step: Step) -> &'static str {
    match step {
        Step::Convert => "convert",
        Step::Describe => "describe",
    }
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
