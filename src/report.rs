//! Rendering benchmark records for humans and machines
//!
//! Three formats, one row per record and no aggregation:
//! - text: fixed-width table
//! - JSON: pretty array using the stable record field names
//! - CSV: header plus one row per record

use crate::benchmark::BenchmarkRecord;
use clap::ValueEnum;
use serde_json::Value;

/// Output format for benchmark reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable table (default)
    #[default]
    Text,
    /// JSON array for machine parsing
    Json,
    /// CSV for spreadsheet analysis
    Csv,
}

const CSV_HEADER: &str = "label,args,start_time,end_time,total_execution_time_in_seconds,return_value,call_site_file,call_site_line";

/// Render `records` in `format`
pub fn render(records: &[BenchmarkRecord], format: ReportFormat) -> String {
    match format {
        ReportFormat::Text => render_text(records),
        ReportFormat::Json => render_json(records),
        ReportFormat::Csv => render_csv(records),
    }
}

/// Fixed-width table, one line per record
pub fn render_text(records: &[BenchmarkRecord]) -> String {
    if records.is_empty() {
        return "No benchmarks recorded.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:<24} {:>14} {:<24} {:<24} {}\n",
        "Label", "Time", "Args", "Return", "Called From"
    ));
    out.push_str(&"─".repeat(100));
    out.push('\n');

    for record in records {
        out.push_str(&format!(
            "{:<24} {:>13.9}s {:<24} {:<24} {}\n",
            record.label,
            record.total_execution_time_in_seconds,
            truncate(&compact_args(&record.args), 24),
            truncate(&record.return_value.to_string(), 24),
            record.call_site_display()
        ));
    }

    out.push_str(&"─".repeat(100));
    out.push('\n');
    out
}

/// Pretty-printed JSON array
pub fn render_json(records: &[BenchmarkRecord]) -> String {
    // BenchmarkRecord holds only JSON-compatible data
    serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
}

/// CSV with a header row
pub fn render_csv(records: &[BenchmarkRecord]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + records.len() * 96);
    out.push_str(CSV_HEADER);
    out.push('\n');

    for record in records {
        let line = record
            .call_site_line
            .map(|line| line.to_string())
            .unwrap_or_else(|| crate::benchmark::UNKNOWN.to_string());
        let fields = [
            escape_field(&record.label),
            escape_field(&Value::from(record.args.clone()).to_string()),
            record.start_time.to_string(),
            record.end_time.to_string(),
            format!("{:.9}", record.total_execution_time_in_seconds),
            escape_field(&record.return_value.to_string()),
            escape_field(&record.call_site_file),
            line,
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    out
}

/// Print the text table to stderr
pub fn print_summary(records: &[BenchmarkRecord]) {
    eprintln!("\n╔════════════════════════════════════════════════════════════╗");
    eprintln!("║  Benchmark Records (in call order)                         ║");
    eprintln!("╚════════════════════════════════════════════════════════════╝");
    eprint!("{}", render_text(records));
}

fn compact_args(args: &[Value]) -> String {
    args.iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}

/// Quote a CSV field containing a comma, quote or newline
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
