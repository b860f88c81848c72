//! Rendering of query results for the command line.
//!
//! Callers pick a format and call [`render`] explicitly; nothing wraps
//! results behind their back.

use crate::query::{QueryResult, Record};
use serde_json::Value;

/// Output format for rendered results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// The JSON response envelope.
    #[default]
    Json,
    /// An aligned text table followed by a summary line.
    Text,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            _ => Err(format!("Invalid output format: {s}. Expected: json or text")),
        }
    }
}

/// Renders a result in the given format.
pub fn render(result: &QueryResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => render_json(result),
        OutputFormat::Text => render_text(result),
    }
}

fn render_json(result: &QueryResult) -> String {
    serde_json::to_string_pretty(result).unwrap_or_else(|e| {
        serde_json::json!({ "success": false, "error": format!("Failed to encode result: {e}") })
            .to_string()
    })
}

fn render_text(result: &QueryResult) -> String {
    let (Some(rows), Some(metadata)) = (result.rows(), result.metadata()) else {
        return format!("Error: {}", result.failure_message().unwrap_or("unknown failure"));
    };

    let headers = if metadata.columns.is_empty() {
        row_keys(rows)
    } else {
        metadata.columns.clone()
    };
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| row.get(h).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    if !headers.is_empty() {
        out.push_str(&format_line(&headers, &widths));
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join("-+-"));
        out.push('\n');
        for row in &cells {
            out.push_str(&format_line(row, &widths));
            out.push('\n');
        }
    }

    let noun = if metadata.row_count == 1 { "row" } else { "rows" };
    out.push_str(&format!(
        "({} {noun}, {} ms)",
        metadata.row_count, metadata.execution_time_ms
    ));
    out
}

/// Column names in first-seen order, for results without shape metadata.
fn row_keys(rows: &[Record]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for key in rows.iter().flat_map(|row| row.keys()) {
        if !keys.contains(key) {
            keys.push(key.clone());
        }
    }
    keys
}

fn format_line(values: &[String], widths: &[usize]) -> String {
    values
        .iter()
        .zip(widths)
        .map(|(v, &w)| format!("{v:<w$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
