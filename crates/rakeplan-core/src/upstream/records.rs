//! Record types owned by the optimizer service.
//!
//! Only the fields the dashboard depends on are declared; anything else
//! the service sends is kept in `extra` and passed through untouched.

use std::{fmt, str::FromStr};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::models::{PlanRow, RowStatus};

/// Identifiers arrive as either strings or numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Text(String),
    Number(Number),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Text(text) => f.write_str(text),
            RecordId::Number(number) => write!(f, "{number}"),
        }
    }
}

/// One assignment as produced by the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedPlan {
    pub cmo_stockyard_location_id: String,
    pub product_id: String,
    pub customer_id: String,
    pub quantity_tonnes: f64,
    pub wagons_used: u32,
    pub distance_km: f64,
    pub transport_cost: f64,
    pub loading_cost: f64,
    pub total_cost: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of a nominal open wagon, used when the optimizer does not
/// report utilization itself.
pub const WAGON_CAPACITY_TONNES: f64 = 63.0;

impl OptimizedPlan {
    /// Converts the record into a plan row.
    ///
    /// `destinations` and `utilization` are taken from the record when the
    /// optimizer supplies them. Otherwise the customer is the only
    /// destination and utilization is the load over nominal wagon capacity.
    pub fn into_row(self, row_id: u32) -> PlanRow {
        let destinations = self
            .extra
            .get("destinations")
            .and_then(|value| serde_json::from_value::<Vec<String>>(value.clone()).ok())
            .unwrap_or_else(|| vec![self.customer_id.clone()]);

        let utilization = self
            .extra
            .get("utilization")
            .and_then(Value::as_f64)
            .unwrap_or_else(|| {
                if self.wagons_used == 0 {
                    0.0
                } else {
                    self.quantity_tonnes / (f64::from(self.wagons_used) * WAGON_CAPACITY_TONNES)
                }
            })
            .clamp(0.0, 1.0);

        PlanRow {
            row_id,
            cmo_stockyard_location_id: self.cmo_stockyard_location_id,
            product_id: self.product_id,
            customer_id: self.customer_id,
            destinations,
            quantity_tonnes: self.quantity_tonnes,
            wagons_used: self.wagons_used,
            distance_km: self.distance_km,
            transport_cost: self.transport_cost,
            loading_cost: self.loading_cost,
            total_cost: self.total_cost,
            utilization,
            status: RowStatus::Validated,
        }
    }
}

/// Optimizer-side plan summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub total_cost: Option<f64>,
    #[serde(default)]
    pub avg_utilization: Option<f64>,
    #[serde(default)]
    pub on_time_pct: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProduct {
    pub customer_id: RecordId,
    pub customer_location_id: RecordId,
    pub product_list: Vec<RecordId>,
    pub quantity_list: Vec<f64>,
    pub priority_weight: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockyardProduct {
    pub stockyard_id: RecordId,
    pub product_id: RecordId,
    #[serde(default)]
    pub available_tonnes: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockyardLocation {
    pub stockyard_id: RecordId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceRecord {
    pub from_id: RecordId,
    pub to_id: RecordId,
    pub distance_km: f64,
    /// `rail`, `road` or whatever else the service reports
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Read-only resources proxied from the optimizer service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    OptimizedPlan,
    Summary,
    Datasets,
    Customers,
    CustomerProducts,
    StockyardProducts,
    StockyardLocations,
    StockyardCustomerDistances,
    BokaroStockyardDistances,
}

impl Resource {
    pub const ALL: [Resource; 9] = [
        Resource::OptimizedPlan,
        Resource::Summary,
        Resource::Datasets,
        Resource::Customers,
        Resource::CustomerProducts,
        Resource::StockyardProducts,
        Resource::StockyardLocations,
        Resource::StockyardCustomerDistances,
        Resource::BokaroStockyardDistances,
    ];

    /// Path segment shared by the public route and the service endpoint.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::OptimizedPlan => "get-optimized-plan",
            Resource::Summary => "get-summary",
            Resource::Datasets => "datasets",
            Resource::Customers => "customers",
            Resource::CustomerProducts => "customer_products",
            Resource::StockyardProducts => "stockyard_products",
            Resource::StockyardLocations => "stockyard_locations",
            Resource::StockyardCustomerDistances => "stockyard_customer_distances",
            Resource::BokaroStockyardDistances => "bokaro_stockyard_distances",
        }
    }

    /// Human-readable name used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Resource::OptimizedPlan => "optimized plan",
            Resource::Summary => "summary",
            Resource::Datasets => "datasets",
            Resource::Customers => "customers",
            Resource::CustomerProducts => "customer products",
            Resource::StockyardProducts => "stockyard products",
            Resource::StockyardLocations => "stockyard locations",
            Resource::StockyardCustomerDistances => "stockyard customer distances",
            Resource::BokaroStockyardDistances => "Bokaro stockyard distances",
        }
    }

    /// Checks that `data` has the shape this resource promises.
    pub fn validate(&self, data: &Value) -> Result<(), serde_json::Error> {
        match self {
            Resource::OptimizedPlan => check::<Vec<OptimizedPlan>>(data),
            Resource::Summary => check::<Summary>(data),
            Resource::Datasets => check::<Vec<Dataset>>(data),
            Resource::Customers => check::<Vec<Customer>>(data),
            Resource::CustomerProducts => check::<Vec<CustomerProduct>>(data),
            Resource::StockyardProducts => check::<Vec<StockyardProduct>>(data),
            Resource::StockyardLocations => check::<Vec<StockyardLocation>>(data),
            Resource::StockyardCustomerDistances | Resource::BokaroStockyardDistances => {
                check::<Vec<DistanceRecord>>(data)
            }
        }
    }
}

fn check<T: DeserializeOwned>(data: &Value) -> Result<(), serde_json::Error> {
    T::deserialize(data).map(drop)
}

/// Datasets an administrator may bulk-replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetName {
    BokaroStockyardDistances,
    CustomerLocations,
    CustomerPriority,
    CustomerProducts,
    Customers,
    ProductWagonCompatibility,
    StockyardCustomerDistances,
    StockyardLocations,
    StockyardProducts,
    StockyardRakes,
    StockyardReplenishment,
    StockyardWagons,
    Stockyards,
}

impl DatasetName {
    pub const ALL: [DatasetName; 13] = [
        DatasetName::BokaroStockyardDistances,
        DatasetName::CustomerLocations,
        DatasetName::CustomerPriority,
        DatasetName::CustomerProducts,
        DatasetName::Customers,
        DatasetName::ProductWagonCompatibility,
        DatasetName::StockyardCustomerDistances,
        DatasetName::StockyardLocations,
        DatasetName::StockyardProducts,
        DatasetName::StockyardRakes,
        DatasetName::StockyardReplenishment,
        DatasetName::StockyardWagons,
        DatasetName::Stockyards,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetName::BokaroStockyardDistances => "bokaro_stockyard_distances",
            DatasetName::CustomerLocations => "customer_locations",
            DatasetName::CustomerPriority => "customer_priority",
            DatasetName::CustomerProducts => "customer_products",
            DatasetName::Customers => "customers",
            DatasetName::ProductWagonCompatibility => "product_wagon_compatibility",
            DatasetName::StockyardCustomerDistances => "stockyard_customer_distances",
            DatasetName::StockyardLocations => "stockyard_locations",
            DatasetName::StockyardProducts => "stockyard_products",
            DatasetName::StockyardRakes => "stockyard_rakes",
            DatasetName::StockyardReplenishment => "stockyard_replenishment",
            DatasetName::StockyardWagons => "stockyard_wagons",
            DatasetName::Stockyards => "stockyards",
        }
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatasetName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("Unknown dataset: {s}"))
    }
}
