//! Request types for updating models.

use serde::{Deserialize, Serialize};

use super::{PlanRow, RowStatus};

/// Manual override of a single plan row.
///
/// Only the fields a planner may override are present; costs are left to
/// the next optimization run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RowEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmo_stockyard_location_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destinations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_tonnes: Option<f64>,
}

impl RowEdit {
    /// True when the edit would change nothing.
    pub fn is_empty(&self) -> bool {
        self.cmo_stockyard_location_id.is_none()
            && self.destinations.is_none()
            && self.quantity_tonnes.is_none()
    }

    /// Apply the override, marking the row pending re-validation.
    pub fn apply(&self, row: &mut PlanRow) {
        if let Some(source) = &self.cmo_stockyard_location_id {
            row.cmo_stockyard_location_id = source.clone();
        }
        if let Some(destinations) = &self.destinations {
            row.destinations = destinations.clone();
        }
        if let Some(quantity) = self.quantity_tonnes {
            row.quantity_tonnes = quantity;
        }
        row.status = RowStatus::Pending;
    }
}
