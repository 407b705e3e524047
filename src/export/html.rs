//! HTML Export Generation
//!
//! Standalone HTML documents with inlined CSS: time reports rendered as a
//! table, and single task descriptions rendered as an article.

use super::rows::{ExportRow, Totals};
use super::{ReportMeta, ReportRenderer};
use crate::document::Document;
use crate::error::Result;
use crate::format::document_to_html;
use crate::format::html::escape_html;

// ─────────────────────────────────────────────────────────────────────────────
// Time Report
// ─────────────────────────────────────────────────────────────────────────────

/// Time report as a standalone HTML page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HtmlReportRenderer;

impl ReportRenderer for HtmlReportRenderer {
    fn content_type(&self) -> &'static str {
        "text/html; charset=utf-8"
    }

    fn file_extension(&self) -> &'static str {
        "html"
    }

    fn render(&self, rows: &[ExportRow], meta: &ReportMeta) -> Result<Vec<u8>> {
        let mut body = String::new();
        body.push_str(&format!("<h1>{}</h1>\n", escape_html(&meta.title)));
        body.push_str(&format!(
            "<p class=\"range\">{} to {}</p>\n",
            meta.start.format("%Y-%m-%d"),
            meta.end.format("%Y-%m-%d")
        ));

        if rows.is_empty() {
            body.push_str("<p class=\"empty\">No time tracked in this period.</p>\n");
        } else {
            body.push_str(&report_table(rows));
        }

        Ok(page(&meta.title, REPORT_CSS, &body).into_bytes())
    }
}

fn report_table(rows: &[ExportRow]) -> String {
    let mut table = String::from(
        "<table>\n<thead><tr><th>Date</th><th>Member</th><th>Project</th><th>Task</th>\
         <th class=\"num\">Hours</th><th class=\"num\">Earnings</th><th class=\"num\">Activity</th></tr></thead>\n<tbody>\n",
    );
    for row in rows {
        table.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td class=\"num\">{:.2}</td><td class=\"num\">{:.2}</td><td class=\"num\">{:.0}%</td></tr>\n",
            row.date.format("%Y-%m-%d"),
            escape_html(&row.member),
            escape_html(&row.project),
            escape_html(&row.task),
            row.tracked_hours,
            row.earnings,
            row.activity_level,
        ));
    }
    let totals = Totals::of(rows);
    table.push_str(&format!(
        "</tbody>\n<tfoot><tr><td colspan=\"4\">Total</td>\
         <td class=\"num\">{:.2}</td><td class=\"num\">{:.2}</td><td class=\"num\">{:.0}%</td></tr></tfoot>\n</table>\n",
        totals.tracked_hours, totals.earnings, totals.activity_level,
    ));
    table
}

// ─────────────────────────────────────────────────────────────────────────────
// Task Description
// ─────────────────────────────────────────────────────────────────────────────

/// Generate a complete HTML document for one task description.
pub fn description_page(document: &Document, title: Option<&str>) -> String {
    let body = format!(
        "<article class=\"description\">\n{}\n</article>",
        document_to_html(document)
    );
    page(title.unwrap_or("Task description"), DESCRIPTION_CSS, &body)
}

// ─────────────────────────────────────────────────────────────────────────────
// Page Shell
// ─────────────────────────────────────────────────────────────────────────────

fn page(title: &str, css: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="taskpad">
    <title>{title}</title>
    <style>
{base_css}
{css}
    </style>
</head>
<body>
{body}
</body>
</html>"#,
        title = escape_html(title),
        base_css = BASE_CSS,
        css = css,
        body = body,
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// CSS
// ─────────────────────────────────────────────────────────────────────────────

const BASE_CSS: &str = r#"
*, *::before, *::after {
    box-sizing: border-box;
}

body {
    max-width: 960px;
    margin: 0 auto;
    padding: 32px 24px;
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
    font-size: 15px;
    line-height: 1.6;
    color: #1f2328;
    background: #ffffff;
}
"#;

const REPORT_CSS: &str = r#"
h1 { font-size: 1.6em; margin-bottom: 4px; }
.range, .empty { color: #59636e; margin-top: 0; }

table {
    border-collapse: collapse;
    width: 100%;
    margin-top: 16px;
}

th, td {
    padding: 6px 10px;
    border: 1px solid #d1d9e0;
    text-align: left;
}

th { font-weight: 600; background: #f6f8fa; }
td.num, th.num { text-align: right; font-variant-numeric: tabular-nums; }
tbody tr:nth-child(even) td { background-color: rgba(128, 128, 128, 0.05); }
tfoot td { font-weight: 600; }
"#;

const DESCRIPTION_CSS: &str = r#"
.description h1, .description h2, .description h3,
.description h4, .description h5, .description h6 {
    margin-top: 24px;
    margin-bottom: 16px;
    font-weight: 600;
    line-height: 1.25;
}

.description blockquote {
    margin: 0 0 16px 0;
    padding: 0 1em;
    color: #59636e;
    border-left: 4px solid #d1d9e0;
}

.description code {
    font-family: 'JetBrains Mono', 'Fira Code', 'Consolas', monospace;
    font-size: 0.9em;
    padding: 0.2em 0.4em;
    border-radius: 4px;
    background: #f6f8fa;
}

.description pre {
    padding: 16px;
    overflow: auto;
    border-radius: 6px;
    background: #f6f8fa;
}

.description pre code { padding: 0; background: transparent; }
.description [data-checked] { list-style: none; }
.description [data-checked="true"] { text-decoration: line-through; color: #59636e; }
"#;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
