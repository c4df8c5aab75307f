//! DTOs for the save command surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::SaveableSummary;
use crate::service::SaveReport;

/// Request body for the save command.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SaveRequest {
    /// Names of the saveables to save. Empty means "save everything"
    /// with implicit semantics; naming resources makes the saves
    /// explicit, bypassing autosave gates.
    #[serde(default)]
    pub what: Vec<String>,
}

/// One failed resource within a batch save response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SaveErrorDto {
    /// Name the failure applies to.
    pub name: String,
    /// User-visible error message.
    pub message: String,
}

/// Batch save response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SaveReportDto {
    /// Names whose save handler actually ran.
    pub saved: Vec<String>,
    /// Names skipped by the save policy.
    pub skipped: Vec<String>,
    /// Per-resource failures, including unknown names.
    pub errors: Vec<SaveErrorDto>,
    /// Time the batch completed.
    pub timestamp: DateTime<Utc>,
}

impl From<SaveReport> for SaveReportDto {
    fn from(report: SaveReport) -> Self {
        Self {
            saved: report.saved,
            skipped: report.skipped,
            errors: report
                .errors
                .into_iter()
                .map(|f| SaveErrorDto {
                    name: f.name,
                    message: f.message,
                })
                .collect(),
            timestamp: Utc::now(),
        }
    }
}

/// One registered saveable in the listing response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SaveableDto {
    /// Saveable name.
    pub name: String,
    /// Whether the saveable has unsaved changes.
    pub dirty: bool,
    /// Whether the saveable is always saved at exit.
    pub save_on_exit: bool,
    /// Time of the last successful save, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_saved_at: Option<DateTime<Utc>>,
}

impl From<SaveableSummary> for SaveableDto {
    fn from(summary: SaveableSummary) -> Self {
        Self {
            name: summary.name,
            dirty: summary.dirty,
            save_on_exit: summary.save_on_exit,
            last_saved_at: summary.last_saved_at,
        }
    }
}
