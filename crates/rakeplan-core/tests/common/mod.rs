#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use rakeplan_core::{
    models::{OptimizationRequest, PlanRow, RowStatus},
    upstream::Optimizer,
    Planner, PlannerBuilder, PlannerError, Result,
};
use tempfile::TempDir;

/// Helper function to create a test planner
pub async fn create_test_planner() -> (TempDir, Planner) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let planner = PlannerBuilder::new()
        .with_database_path(Some(temp_dir.path().join("test.db")))
        .with_exports_dir(Some(temp_dir.path().join("exports")))
        .build()
        .await
        .expect("Failed to create planner");
    (temp_dir, planner)
}

pub fn plan_row(source: &str, customer: &str, tonnes: f64, cost: f64) -> PlanRow {
    PlanRow {
        row_id: 0,
        cmo_stockyard_location_id: source.to_string(),
        product_id: "HR-COIL".to_string(),
        customer_id: customer.to_string(),
        destinations: vec![customer.to_string()],
        quantity_tonnes: tonnes,
        wagons_used: 58,
        distance_km: 250.0,
        transport_cost: cost - 10_000.0,
        loading_cost: 10_000.0,
        total_cost: cost,
        utilization: 0.8,
        status: RowStatus::Validated,
    }
}

/// Optimizer double that answers every request with the same rows and
/// records what it was asked.
pub struct FixedOptimizer {
    pub rows: Vec<PlanRow>,
    pub seen: Mutex<Vec<OptimizationRequest>>,
}

impl FixedOptimizer {
    pub fn new(rows: Vec<PlanRow>) -> Self {
        Self {
            rows,
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Optimizer for FixedOptimizer {
    async fn optimize(&self, request: &OptimizationRequest) -> Result<Vec<PlanRow>> {
        self.seen.lock().unwrap().push(request.clone());
        Ok(self.rows.clone())
    }
}

/// Optimizer double that always reports the service as down.
pub struct FailingOptimizer;

#[async_trait]
impl Optimizer for FailingOptimizer {
    async fn optimize(&self, _request: &OptimizationRequest) -> Result<Vec<PlanRow>> {
        Err(PlannerError::upstream(
            "Failed to fetch optimized plan from optimizer service",
            Some("connection refused".to_string()),
        ))
    }
}
