//! Report Export Module for taskpad
//!
//! Turns nested time logs into flat rows and renders them as downloadable
//! reports. Single task descriptions can also be exported as a standalone
//! HTML page.
//!
//! # Architecture
//!
//! - `rows.rs` - Nested log input and flattened `ExportRow`s
//! - `csv.rs` - CSV report renderer
//! - `html.rs` - Standalone HTML report and description pages

pub mod csv;
pub mod html;
pub mod rows;

pub use csv::CsvRenderer;
pub use html::{description_page, HtmlReportRenderer};
pub use rows::{flatten_logs, rows_from_json, DailyLog, ExportRow, MemberLog, ProjectLog, TaskLog, Totals};

use crate::error::{Error, Result};
use chrono::NaiveDate;
use log::info;

// ─────────────────────────────────────────────────────────────────────────────
// Report Metadata
// ─────────────────────────────────────────────────────────────────────────────

/// Title and inclusive date range of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMeta {
    pub title: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportMeta {
    /// Fails when the range ends before it starts.
    pub fn new(title: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(Error::Export(format!(
                "date range ends ({}) before it starts ({})",
                end, start
            )));
        }
        Ok(Self {
            title: title.into(),
            start,
            end,
        })
    }

    /// File name stem, e.g. `weekly-report_2024-03-01_2024-03-07`.
    pub fn file_stem(&self) -> String {
        let slug: String = self
            .title
            .chars()
            .map(|c| {
                if c.is_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect();
        let slug = slug
            .split('-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        let slug = if slug.is_empty() { "report".to_string() } else { slug };
        format!(
            "{}_{}_{}",
            slug,
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Renderers
// ─────────────────────────────────────────────────────────────────────────────

/// A report output format.
pub trait ReportRenderer {
    fn content_type(&self) -> &'static str;

    fn file_extension(&self) -> &'static str;

    fn render(&self, rows: &[ExportRow], meta: &ReportMeta) -> Result<Vec<u8>>;
}

/// A rendered report ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Flatten `logs` and render them with `renderer`.
pub fn export_report(
    renderer: &dyn ReportRenderer,
    logs: &[DailyLog],
    meta: &ReportMeta,
) -> Result<RenderedReport> {
    let rows = flatten_logs(logs);
    let bytes = renderer.render(&rows, meta)?;
    let file_name = format!("{}.{}", meta.file_stem(), renderer.file_extension());
    info!("Exported {} ({} rows, {} bytes)", file_name, rows.len(), bytes.len());
    Ok(RenderedReport {
        file_name,
        content_type: renderer.content_type(),
        bytes,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
