//! 结果表格
//!
//! 一行一个文件；非成功的条目在表格下方附上原始输出

use std::fmt::Write;

use crate::models::{StatusCategory, SubmissionResult};
use crate::utils::truncate_text;

const DETAILS_WIDTH: usize = 60;

/// 渲染结果表格
pub fn render_results(results: &[SubmissionResult]) -> String {
    let headers = ["File Name", "Status", "Assumed URL", "Details"];

    let rows: Vec<[String; 4]> = results
        .iter()
        .map(|r| {
            [
                r.file_name.clone(),
                r.status.to_string(),
                r.assumed_url.clone().unwrap_or_else(|| "-".to_string()),
                truncate_text(&single_line(&r.details), DETAILS_WIDTH),
            ]
        })
        .collect();

    let mut widths = headers.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &headers.map(str::to_string), &widths);
    push_row(&mut out, &widths.map(|w| "-".repeat(w)), &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }

    out
}

/// 非成功条目的原始输出
pub fn render_raw_logs(results: &[SubmissionResult]) -> String {
    let mut out = String::new();
    for result in results.iter().filter(|r| r.status != StatusCategory::Success) {
        let _ = writeln!(out, "▼ {} ({})", result.file_name, result.status);
        let body = if result.raw_output.trim().is_empty() {
            result.details.trim()
        } else {
            result.raw_output.trim()
        };
        for line in body.lines() {
            let _ = writeln!(out, "    {}", line);
        }
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let line = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join(" | ");
    let _ = writeln!(out, "{}", line.trim_end());
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, status: StatusCategory, url: Option<&str>, raw: &str) -> SubmissionResult {
        SubmissionResult {
            file_name: name.to_string(),
            status,
            assumed_url: url.map(str::to_string),
            details: format!("details of {}", name),
            raw_output: raw.to_string(),
        }
    }

    #[test]
    fn test_table_has_one_row_per_result() {
        let results = vec![
            result("a.pdf", StatusCategory::Success, Some("https://x/a.pdf"), "ok"),
            result("b.pdf", StatusCategory::Warning, None, "no marker"),
        ];
        let table = render_results(&results);
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("File Name"));
        assert!(lines[2].contains("https://x/a.pdf"));
        assert!(lines[3].contains("⚠️ Completed with Warning"));
        assert!(lines[3].contains(" - "));
    }

    #[test]
    fn test_raw_logs_only_for_non_success() {
        let results = vec![
            result("a.pdf", StatusCategory::Success, Some("u"), "fine"),
            result("b.pdf", StatusCategory::Failed, None, "line1\nline2"),
            result("c.pdf", StatusCategory::Error, None, ""),
        ];
        let logs = render_raw_logs(&results);

        assert!(!logs.contains("a.pdf"));
        assert!(logs.contains("▼ b.pdf (❌ Failed)\n    line1\n    line2\n"));
        assert!(logs.contains("    details of c.pdf"));
    }

    #[test]
    fn test_details_collapsed_to_single_line() {
        let mut r = result("a.pdf", StatusCategory::Failed, None, "");
        r.details = "Error: Timeout\n  at wait".to_string();
        let table = render_results(&[r]);
        assert!(table.contains("Error: Timeout at wait"));
    }
}
