//! Plan model definition and related functionality.

use jiff::{civil::Date, Timestamp};
use serde::{Deserialize, Serialize};

use super::{PlanSummary, RowStatus};

/// One rake dispatch assignment within a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanRow {
    /// Position of the row within its plan
    #[serde(default)]
    pub row_id: u32,

    /// Loading stockyard location
    pub cmo_stockyard_location_id: String,

    pub product_id: String,

    pub customer_id: String,

    /// Customer sidings served by the rake, in visiting order
    #[serde(default)]
    pub destinations: Vec<String>,

    pub quantity_tonnes: f64,

    pub wagons_used: u32,

    pub distance_km: f64,

    pub transport_cost: f64,

    pub loading_cost: f64,

    /// Transport plus loading plus any delay penalty
    pub total_cost: f64,

    /// Fraction of rake capacity in use, 0.0 to 1.0
    #[serde(default)]
    pub utilization: f64,

    #[serde(default)]
    pub status: RowStatus,
}

/// The set of rake dispatch assignments for a date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Calendar date the plan dispatches for
    pub date: Date,

    /// `<date>-r<revision>`
    pub plan_id: String,

    /// Incremented on every write for the date
    pub revision: u32,

    /// Locked plans are final and refuse further writes
    #[serde(default)]
    pub locked: bool,

    /// Timestamp of the write that produced this revision (UTC)
    pub generated_at: Timestamp,

    #[serde(default)]
    pub rows: Vec<PlanRow>,

    pub summary: PlanSummary,
}

impl Plan {
    /// Builds the plan identifier for a date and revision.
    pub fn make_id(date: Date, revision: u32) -> String {
        format!("{date}-r{revision}")
    }

    /// Renumbers rows by their position.
    pub fn normalize_rows(rows: &mut [PlanRow]) {
        for (idx, row) in rows.iter_mut().enumerate() {
            row.row_id = idx as u32;
        }
    }

}

impl PlanRow {
    /// Name of the first numeric field that is NaN or infinite. JSON has no
    /// representation for those, so such a row cannot be stored.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("quantity_tonnes", self.quantity_tonnes),
            ("distance_km", self.distance_km),
            ("transport_cost", self.transport_cost),
            ("loading_cost", self.loading_cost),
            ("total_cost", self.total_cost),
            ("utilization", self.utilization),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
        .map(|(field, _)| field)
    }
}
