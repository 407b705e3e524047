//! CSV time reports

use super::rows::{ExportRow, Totals};
use super::{ReportMeta, ReportRenderer};
use crate::error::Result;

const HEADER: [&str; 7] = [
    "Date",
    "Member",
    "Project",
    "Task",
    "Tracked hours",
    "Earnings",
    "Activity %",
];

/// Comma-separated report with a header row and an optional totals row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvRenderer {
    pub include_totals: bool,
}

impl Default for CsvRenderer {
    fn default() -> Self {
        Self {
            include_totals: true,
        }
    }
}

impl ReportRenderer for CsvRenderer {
    fn content_type(&self) -> &'static str {
        "text/csv; charset=utf-8"
    }

    fn file_extension(&self) -> &'static str {
        "csv"
    }

    fn render(&self, rows: &[ExportRow], _meta: &ReportMeta) -> Result<Vec<u8>> {
        let mut out = String::new();
        push_record(&mut out, HEADER.iter().map(|cell| cell.to_string()));

        for row in rows {
            push_record(
                &mut out,
                [
                    row.date.format("%Y-%m-%d").to_string(),
                    row.member.clone(),
                    row.project.clone(),
                    row.task.clone(),
                    format!("{:.2}", row.tracked_hours),
                    format!("{:.2}", row.earnings),
                    format!("{:.0}", row.activity_level),
                ],
            );
        }

        if self.include_totals && !rows.is_empty() {
            let totals = Totals::of(rows);
            push_record(
                &mut out,
                [
                    "Total".to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                    format!("{:.2}", totals.tracked_hours),
                    format!("{:.2}", totals.earnings),
                    format!("{:.0}", totals.activity_level),
                ],
            );
        }
        Ok(out.into_bytes())
    }
}

fn push_record(out: &mut String, cells: impl IntoIterator<Item = String>) {
    let line: Vec<String> = cells.into_iter().map(|cell| quote(&cell)).collect();
    out.push_str(&line.join(","));
    out.push_str("\r\n");
}

/// Quote a field when it holds a comma, quote, or line break.
fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(member: &str, task: &str, hours: f64) -> ExportRow {
        ExportRow {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            member: member.to_string(),
            project: "Site".to_string(),
            task: task.to_string(),
            tracked_hours: hours,
            earnings: hours * 25.0,
            activity_level: 80.0,
        }
    }

    fn meta() -> ReportMeta {
        ReportMeta::new(
            "March",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap()
    }

    fn render(renderer: CsvRenderer, rows: &[ExportRow]) -> String {
        String::from_utf8(renderer.render(rows, &meta()).unwrap()).unwrap()
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("a,b"), "\"a,b\"");
        assert_eq!(quote("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_render_rows_and_totals() {
        let csv = render(
            CsvRenderer::default(),
            &[row("Ana", "Header", 1.5), row("Ben", "Fix, then ship", 0.25)],
        );
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(
            lines[0],
            "Date,Member,Project,Task,Tracked hours,Earnings,Activity %"
        );
        assert_eq!(lines[1], "2024-03-01,Ana,Site,Header,1.50,37.50,80");
        assert_eq!(lines[2], "2024-03-01,Ben,Site,\"Fix, then ship\",0.25,6.25,80");
        assert_eq!(lines[3], "Total,,,,1.75,43.75,80");
        assert_eq!(lines[4], "");
    }

    #[test]
    fn test_no_totals_when_disabled_or_empty() {
        let csv = render(CsvRenderer { include_totals: false }, &[row("Ana", "a", 1.0)]);
        assert!(!csv.contains("Total"));

        let empty = render(CsvRenderer::default(), &[]);
        assert_eq!(empty.lines().count(), 1);
    }
}
