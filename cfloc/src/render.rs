//! Template rendering for CLI output using outstanding

use cfloclib::{MeasureReport, MetricsTable, TableRow};
use console::Style;
use outstanding::{render_auto, render_with_output, Theme};
use serde::Serialize;

/// Include template at compile time
const METRICS_TABLE_TEMPLATE: &str = include_str!("../templates/metrics_table.jinja");

/// Width of each metric column
const CELL_WIDTH: usize = 10;

/// Re-export OutputMode for callers
pub use outstanding::OutputMode;

/// Column data for template rendering
#[derive(Debug, Serialize)]
struct TemplateColumn {
    /// Column name (e.g., "Code", "Comments")
    name: String,
    /// Pre-formatted with padding
    formatted: String,
}

/// Row data for template rendering (pre-formatted)
#[derive(Debug, Serialize)]
struct TemplateRow {
    /// Pre-padded name (left-aligned, padded to name_width)
    name: String,
    /// Pre-padded cells (right-aligned)
    cells: Vec<String>,
}

/// Data context for the metrics table template
#[derive(Debug, Serialize)]
struct MetricsTableContext {
    name_header_formatted: String,
    columns: Vec<TemplateColumn>,
    /// Separator line (dashes)
    separator: String,
    rows: Vec<TemplateRow>,
    total: TemplateRow,
}

/// Structured output: the table plus the run summary.
#[derive(Debug, Serialize)]
struct StructuredOutput<'a> {
    #[serde(flatten)]
    table: &'a MetricsTable,
    report: &'a MeasureReport,
}

/// Map the `--output` flag onto an outstanding output mode.
pub fn output_mode(name: &str) -> OutputMode {
    match name {
        "json" => OutputMode::Json,
        "text" => OutputMode::Text,
        "term" => OutputMode::Term,
        _ => OutputMode::Auto,
    }
}

/// Create the theme with styles
fn create_theme() -> Theme {
    Theme::new().add("category", Style::new().bold())
}

fn to_template_row(row: &TableRow, name_width: usize) -> TemplateRow {
    TemplateRow {
        name: format!("{:<width$}", row.label, width = name_width),
        cells: row
            .values
            .iter()
            .map(|v| format!("{:>width$}", v, width = CELL_WIDTH))
            .collect(),
    }
}

fn build_context(table: &MetricsTable) -> MetricsTableContext {
    let name_width = table.label_width();
    let (name_header, metric_headers) = match table.headers.split_first() {
        Some((first, rest)) => (first.as_str(), rest),
        None => ("", &[][..]),
    };

    let columns: Vec<TemplateColumn> = metric_headers
        .iter()
        .map(|name| TemplateColumn {
            name: name.clone(),
            formatted: format!("{:>width$}", name, width = CELL_WIDTH),
        })
        .collect();

    MetricsTableContext {
        name_header_formatted: format!("{:<width$}", name_header, width = name_width),
        separator: "-".repeat(name_width + (CELL_WIDTH + 1) * columns.len()),
        columns,
        rows: table
            .rows
            .iter()
            .map(|r| to_template_row(r, name_width))
            .collect(),
        total: to_template_row(&table.footer, name_width),
    }
}

/// Render the metrics table (or, in JSON mode, the table plus the report).
pub fn render_metrics(
    table: &MetricsTable,
    report: &MeasureReport,
    output_mode: OutputMode,
) -> Result<String, Box<dyn std::error::Error>> {
    let theme = create_theme();

    if matches!(output_mode, OutputMode::Json) {
        let output = StructuredOutput { table, report };
        return Ok(render_auto(
            METRICS_TABLE_TEMPLATE,
            &output,
            &theme,
            output_mode,
        )?);
    }

    let context = build_context(table);
    let rendered = render_with_output(METRICS_TABLE_TEMPLATE, &context, &theme, output_mode)?;

    Ok(rendered)
}
