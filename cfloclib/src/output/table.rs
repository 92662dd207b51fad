//! Table-ready data structures for metrics output.
//!
//! `MetricsTable` is a presentation-ready structure that can be printed
//! directly or serialized to JSON. It only formats data; the numbers come
//! from a sink that already holds per-file measures.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::sink::FileMeasures;

/// A single row in the table (data row or footer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Row label (file path or "Total (N files)")
    pub label: String,
    /// Values for each metric column, ready for display
    pub values: Vec<String>,
}

/// Table-ready metrics data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsTable {
    /// Column headers: label header followed by one header per metric
    pub headers: Vec<String>,
    /// Data rows (empty unless per-file rows were requested)
    pub rows: Vec<TableRow>,
    /// Summary row
    pub footer: TableRow,
}

impl MetricsTable {
    /// Build a table from per-file measures.
    ///
    /// Paths are shown relative to `base` when possible. With `by_file`
    /// unset only the footer carries numbers.
    pub fn from_measures(files: &[FileMeasures], base: &Path, by_file: bool) -> Self {
        let rows = if by_file {
            files
                .iter()
                .map(|f| TableRow {
                    label: make_relative(&f.path, base),
                    values: format_measures(f),
                })
                .collect()
        } else {
            Vec::new()
        };

        let total = files.iter().fold(FileMeasures::default(), |acc, f| FileMeasures {
            path: acc.path,
            comment_lines: acc.comment_lines + f.comment_lines,
            lines_of_code: acc.lines_of_code + f.lines_of_code,
            total_lines: acc.total_lines + f.total_lines,
        });

        MetricsTable {
            headers: build_headers(by_file),
            rows,
            footer: TableRow {
                label: format!("Total ({} files)", files.len()),
                values: format_measures(&total),
            },
        }
    }

    /// Width of the label column: the longest label or header.
    pub fn label_width(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.label.len())
            .chain([self.footer.label.len(), self.headers[0].len()])
            .max()
            .unwrap_or(0)
    }
}

fn build_headers(by_file: bool) -> Vec<String> {
    let label = if by_file { "File" } else { "Name" };
    [label, "Code", "Comments", "Total"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn format_measures(m: &FileMeasures) -> Vec<String> {
    vec![
        m.lines_of_code.to_string(),
        m.comment_lines.to_string(),
        m.total_lines.to_string(),
    ]
}

/// Convert a path to a relative path from the base directory.
fn make_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn measures() -> Vec<FileMeasures> {
        vec![
            FileMeasures {
                path: PathBuf::from("/project/app/User.cfc"),
                comment_lines: 4,
                lines_of_code: 20,
                total_lines: 30,
            },
            FileMeasures {
                path: PathBuf::from("/project/index.cfm"),
                comment_lines: 1,
                lines_of_code: 5,
                total_lines: 7,
            },
        ]
    }

    #[test]
    fn test_headers() {
        assert_eq!(build_headers(true), vec!["File", "Code", "Comments", "Total"]);
        assert_eq!(build_headers(false)[0], "Name");
    }

    #[test]
    fn test_table_by_file() {
        let table = MetricsTable::from_measures(&measures(), Path::new("/project"), true);

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].label, "app/User.cfc");
        assert_eq!(table.rows[0].values, vec!["20", "4", "30"]);
        assert_eq!(table.rows[1].label, "index.cfm");
        assert_eq!(table.footer.label, "Total (2 files)");
        assert_eq!(table.footer.values, vec!["25", "5", "37"]);
    }

    #[test]
    fn test_table_totals_only() {
        let table = MetricsTable::from_measures(&measures(), Path::new("/project"), false);

        assert!(table.rows.is_empty());
        assert_eq!(table.footer.values, vec!["25", "5", "37"]);
    }

    #[test]
    fn test_empty_table() {
        let table = MetricsTable::from_measures(&[], Path::new("."), true);

        assert!(table.rows.is_empty());
        assert_eq!(table.footer.label, "Total (0 files)");
        assert_eq!(table.footer.values, vec!["0", "0", "0"]);
    }

    #[test]
    fn test_label_width() {
        let table = MetricsTable::from_measures(&measures(), Path::new("/project"), true);
        assert_eq!(table.label_width(), "Total (2 files)".len());
    }

    #[test]
    fn test_unrelated_base_keeps_full_path() {
        assert_eq!(
            make_relative(Path::new("/a/b.cfm"), Path::new("/other")),
            "/a/b.cfm"
        );
    }

    #[test]
    fn test_json_shape() {
        let table = MetricsTable::from_measures(&measures(), Path::new("/project"), false);
        let json = serde_json::to_value(&table).unwrap();

        assert!(json.get("headers").is_some());
        assert!(json.get("rows").is_some());
        assert_eq!(json["footer"]["label"], "Total (2 files)");
    }
}
