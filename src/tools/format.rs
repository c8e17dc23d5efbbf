//! Output formatting utilities for MCP tools.
//!
//! Table details can be returned as structured JSON or pre-rendered as an
//! ASCII table or a markdown table of the column list.

use crate::models::TableDescriptor;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

/// Output format for table details.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON format (default)
    #[default]
    Json,
    /// ASCII table format (like MySQL CLI)
    Table,
    /// Markdown table format
    Markdown,
}

const COLUMN_HEADERS: [&str; 3] = ["name", "type", "comment"];

fn column_rows(table: &TableDescriptor) -> Vec<[&str; 3]> {
    table
        .columns
        .iter()
        .map(|c| {
            [
                c.name.as_str(),
                c.data_type.as_str(),
                c.comment.as_deref().unwrap_or(""),
            ]
        })
        .collect()
}

fn footer(count: usize) -> String {
    format!("{} column{}", count, if count == 1 { "" } else { "s" })
}

/// Render a table's columns as an ASCII table, with a one-line header
/// naming the table and its storage.
pub fn format_as_table(table: &TableDescriptor) -> String {
    let rows = column_rows(table);
    let mut output = format!("{}.{}", table.database, table.name);
    if !table.format.is_empty() {
        output.push_str(&format!(" ({})", table.format));
    }
    output.push('\n');
    if !table.description.is_empty() {
        output.push_str(&table.description);
        output.push('\n');
    }
    if !table.location.is_empty() {
        output.push_str(&format!("Location: {}\n", table.location));
    }

    if rows.is_empty() {
        output.push_str("Empty set\n");
        return output;
    }

    let mut widths: Vec<usize> = COLUMN_HEADERS.iter().map(|h| h.width()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    let separator: String = widths
        .iter()
        .map(|w| format!("+{}", "-".repeat(w + 2)))
        .collect::<String>()
        + "+\n";

    output.push_str(&separator);
    let header: String = COLUMN_HEADERS
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("| {:^width$} ", h, width = w))
        .collect::<String>()
        + "|\n";
    output.push_str(&header);
    output.push_str(&separator);

    for row in &rows {
        let line: String = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| {
                // pad by display width, not char count
                let pad = w.saturating_sub(cell.width());
                format!("| {}{} ", cell, " ".repeat(pad))
            })
            .collect::<String>()
            + "|\n";
        output.push_str(&line);
    }

    output.push_str(&separator);
    output.push_str(&format!("{} in set\n", footer(rows.len())));
    output
}

/// Render a table's columns as a markdown table.
pub fn format_as_markdown(table: &TableDescriptor) -> String {
    let rows = column_rows(table);
    let mut output = format!("### {}.{}\n\n", table.database, table.name);
    if !table.description.is_empty() {
        output.push_str(&format!("{}\n\n", table.description));
    }
    if !table.location.is_empty() || !table.format.is_empty() {
        output.push_str(&format!(
            "- **Location**: {}\n- **Format**: {}\n\n",
            table.location, table.format
        ));
    }

    if rows.is_empty() {
        output.push_str("*Empty set*");
        return output;
    }

    let header: String = COLUMN_HEADERS
        .iter()
        .map(|h| format!("| {} ", h))
        .collect::<String>()
        + "|\n";
    output.push_str(&header);
    let sep: String = COLUMN_HEADERS.iter().map(|_| "|---").collect::<String>() + "|\n";
    output.push_str(&sep);

    for row in &rows {
        let line: String = row
            .iter()
            .map(|cell| format!("| {} ", cell.replace('|', "\\|")))
            .collect::<String>()
            + "|\n";
        output.push_str(&line);
    }

    output.push_str(&format!("\n*{}*", footer(rows.len())));
    output
}
