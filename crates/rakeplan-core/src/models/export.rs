//! Plan lock and export artifact types.

use std::str::FromStr;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Export artifact formats produced when a plan is locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// File name of the artifact for a date.
    pub fn file_name(&self, date: Date) -> String {
        format!("plan-{date}.{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => Err(format!("Invalid export format: {s}")),
        }
    }
}

/// Which artifacts a lock produced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Exported {
    pub csv: bool,
    pub pdf: bool,
}

/// Result of locking a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LockOutcome {
    pub ok: bool,
    pub date: Date,
    pub message: String,
    pub exported: Exported,
}
