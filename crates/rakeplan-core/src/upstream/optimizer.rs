//! The optimization seam used by the dispatch workers.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use super::{fetch_resource, proxy::MALFORMED_RESPONSE, OptimizedPlan, Resource, Upstream};
use crate::{
    config::JOB_GRACE,
    error::{PlannerError, Result},
    models::{OptimizationRequest, PlanRow},
};

/// Produces plan rows for an optimization request.
#[async_trait]
pub trait Optimizer: Send + Sync {
    async fn optimize(&self, request: &OptimizationRequest) -> Result<Vec<PlanRow>>;
}

/// Runs optimizations on the external service's optimized-plan endpoint.
#[derive(Clone)]
pub struct UpstreamOptimizer {
    upstream: Arc<dyn Upstream>,
}

impl UpstreamOptimizer {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self { upstream }
    }
}

#[async_trait]
impl Optimizer for UpstreamOptimizer {
    async fn optimize(&self, request: &OptimizationRequest) -> Result<Vec<PlanRow>> {
        let query = vec![
            ("date".to_string(), request.date.to_string()),
            ("horizon_hours".to_string(), request.horizon_hours.to_string()),
            ("use_forecast".to_string(), request.use_forecast.to_string()),
            ("quick".to_string(), request.quick.to_string()),
            (
                "time_limit_seconds".to_string(),
                request.time_limit_seconds.to_string(),
            ),
        ];
        let timeout = Duration::from_secs(u64::from(request.time_limit_seconds)) + JOB_GRACE;

        let data = fetch_resource(
            self.upstream.as_ref(),
            Resource::OptimizedPlan,
            query,
            Some(timeout),
        )
        .await?;
        let records: Vec<OptimizedPlan> = serde_json::from_value(data)
            .map_err(|e| PlannerError::upstream(MALFORMED_RESPONSE, Some(e.to_string())))?;

        Ok(records
            .into_iter()
            .enumerate()
            .map(|(idx, record)| record.into_row(idx as u32))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use jiff::civil::date;
    use serde_json::json;

    use super::*;
    use crate::upstream::{TransportError, UpstreamRequest, UpstreamResponse};

    struct RecordingUpstream {
        body: serde_json::Value,
        seen: Mutex<Option<UpstreamRequest>>,
    }

    #[async_trait]
    impl Upstream for RecordingUpstream {
        async fn send(
            &self,
            request: UpstreamRequest,
        ) -> std::result::Result<UpstreamResponse, TransportError> {
            *self.seen.lock().unwrap() = Some(request);
            Ok(UpstreamResponse {
                status: 200,
                body: self.body.to_string().into_bytes(),
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn test_optimize_forwards_request_and_maps_rows() {
        let upstream = Arc::new(RecordingUpstream {
            body: json!({"status": "success", "data": [
                {
                    "cmo_stockyard_location_id": "SY-BOK",
                    "product_id": "HR-COIL",
                    "customer_id": "CUST-KOL",
                    "quantity_tonnes": 990.0,
                    "wagons_used": 58,
                    "distance_km": 310.0,
                    "transport_cost": 41000.0,
                    "loading_cost": 12200.0,
                    "total_cost": 53200.0
                },
                {
                    "cmo_stockyard_location_id": "SY-RKL",
                    "product_id": "PLATE",
                    "customer_id": "CUST-RAN",
                    "quantity_tonnes": 960.0,
                    "wagons_used": 57,
                    "distance_km": 180.0,
                    "transport_cost": 38800.0,
                    "loading_cost": 11000.0,
                    "total_cost": 49800.0
                }
            ]}),
            seen: Mutex::new(None),
        });
        let optimizer = UpstreamOptimizer::new(upstream.clone());

        let request = OptimizationRequest {
            horizon_hours: 24,
            use_forecast: true,
            quick: true,
            time_limit_seconds: 60,
            date: date(2025, 10, 5),
        };
        let rows = optimizer.optimize(&request).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].row_id, 1);
        assert_eq!(rows[1].customer_id, "CUST-RAN");

        let seen = upstream.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.path, "get-optimized-plan");
        assert_eq!(seen.timeout, Some(Duration::from_secs(65)));
        assert!(seen
            .query
            .contains(&("date".to_string(), "2025-10-05".to_string())));
        assert!(seen
            .query
            .contains(&("quick".to_string(), "true".to_string())));
    }
}
