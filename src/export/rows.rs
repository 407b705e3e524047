//! Time-report rows
//!
//! Time logs arrive nested by day, member, project and task. Reports are
//! rendered from one flat row per task entry.

use crate::error::Result;
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

pub const NO_PROJECT: &str = "No project";
pub const NO_TASK: &str = "No task";

// ─────────────────────────────────────────────────────────────────────────────
// Nested Input
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    pub date: NaiveDate,
    #[serde(default)]
    pub members: Vec<MemberLog>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberLog {
    pub name: String,
    #[serde(default)]
    pub projects: Vec<ProjectLog>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLog {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<TaskLog>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskLog {
    #[serde(default)]
    pub name: String,
    /// Tracked time in seconds
    pub duration: u64,
    #[serde(default)]
    pub earnings: f64,
    /// Activity percentage; values outside 0..=100 are clamped
    #[serde(default)]
    pub activity: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Flat Rows
// ─────────────────────────────────────────────────────────────────────────────

/// One line of a time report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub date: NaiveDate,
    pub member: String,
    pub project: String,
    pub task: String,
    pub tracked_hours: f64,
    pub earnings: f64,
    pub activity_level: f64,
}

/// Flatten nested logs into rows, in input order.
pub fn flatten_logs(logs: &[DailyLog]) -> Vec<ExportRow> {
    let rows: Vec<ExportRow> = logs
        .iter()
        .flat_map(|day| {
            day.members.iter().flat_map(move |member| {
                member.projects.iter().flat_map(move |project| {
                    project.tasks.iter().map(move |task| ExportRow {
                        date: day.date,
                        member: member.name.clone(),
                        project: name_or(&project.name, NO_PROJECT),
                        task: name_or(&task.name, NO_TASK),
                        tracked_hours: task.duration as f64 / 3600.0,
                        earnings: task.earnings,
                        activity_level: clamp_activity(task.activity),
                    })
                })
            })
        })
        .collect();
    debug!("Flattened {} days into {} report rows", logs.len(), rows.len());
    rows
}

/// Parse a JSON array of daily logs and flatten it.
pub fn rows_from_json(json: &str) -> Result<Vec<ExportRow>> {
    let logs: Vec<DailyLog> = serde_json::from_str(json)?;
    Ok(flatten_logs(&logs))
}

fn name_or(name: &str, fallback: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

fn clamp_activity(activity: f64) -> f64 {
    if activity.is_nan() {
        0.0
    } else {
        activity.clamp(0.0, 100.0)
    }
}

/// Column totals of a set of rows.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub tracked_hours: f64,
    pub earnings: f64,
    /// Mean activity weighted by tracked time
    pub activity_level: f64,
}

impl Totals {
    pub fn of(rows: &[ExportRow]) -> Self {
        let tracked_hours: f64 = rows.iter().map(|row| row.tracked_hours).sum();
        let earnings = rows.iter().map(|row| row.earnings).sum();
        let activity_level = if tracked_hours > 0.0 {
            rows.iter()
                .map(|row| row.activity_level * row.tracked_hours)
                .sum::<f64>()
                / tracked_hours
        } else {
            0.0
        };
        Self {
            tracked_hours,
            earnings,
            activity_level,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
