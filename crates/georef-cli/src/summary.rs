use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use georef_cli::report::InspectReport;
use georef_model::ConversionStatus;

use crate::commands::NormalizeResult;

pub fn print_normalize_summary(result: &NormalizeResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Record"),
        header_cell("Status"),
        header_cell("Errors"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);
    let mut total_errors = 0usize;
    for row in &result.rows {
        total_errors += row.messages.len();
        table.add_row(vec![
            Cell::new(&row.label),
            status_cell(row.status),
            count_cell(row.messages.len()),
        ]);
    }
    let summary = &result.summary;
    table.add_row(vec![
        Cell::new(format!("TOTAL ({})", summary.total))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!(
            "{} ok / {} error / {} none",
            summary.success, summary.error, summary.no_frame_of_reference
        ))
        .add_attribute(Attribute::Bold),
        count_cell(total_errors).add_attribute(Attribute::Bold),
    ]);
    eprintln!("{table}");

    if total_errors > 0 {
        eprintln!("Diagnostics:");
        for row in &result.rows {
            for message in &row.messages {
                eprintln!("- {}: {message}", row.label);
            }
        }
    }
    if let Some(path) = &result.output {
        eprintln!("Output: {}", path.display());
    }
}

pub fn print_inspect_report(report: &InspectReport) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Property"), header_cell("Value")]);
    apply_table_style(&mut table);
    let valid = if report.valid {
        Cell::new("yes").fg(Color::Green)
    } else {
        Cell::new("no").fg(Color::Red).add_attribute(Attribute::Bold)
    };
    let bbox = report.bbox.as_ref().map_or_else(
        || dim_cell("-"),
        |bbox| {
            let values: Vec<String> = bbox.iter().map(f64::to_string).collect();
            Cell::new(format!("[{}]", values.join(", ")))
        },
    );
    table.add_row(vec![Cell::new("Type"), Cell::new(&report.tag)]);
    table.add_row(vec![Cell::new("Valid"), valid]);
    table.add_row(vec![Cell::new("Dimension"), Cell::new(report.dimension)]);
    table.add_row(vec![Cell::new("Tuples"), Cell::new(report.tuples)]);
    table.add_row(vec![Cell::new("BBox"), bbox]);
    for (tag, count) in &report.nodes {
        table.add_row(vec![dim_cell(format!("  {tag}")), Cell::new(count)]);
    }
    eprintln!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    if table.column_count() >= 3 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Percentage(40)),
            ColumnConstraint::LowerBoundary(Width::Fixed(10)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(status: ConversionStatus) -> Cell {
    match status {
        ConversionStatus::Success => Cell::new(status).fg(Color::Green),
        ConversionStatus::Error => Cell::new(status)
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        ConversionStatus::NoFrameOfReference => dim_cell(status),
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(Color::Red).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
