//! Tests for the planner module.

use std::time::Duration;

use jiff::civil::date;
use tempfile::TempDir;

use super::*;
use crate::{
    models::{ExportFormat, JobStatus, PlanRow, RowEdit, RowStatus},
    params::{AppendAudit, EditRow, JobId, Simulate, SubmitOptimization},
};

/// Helper function to create a test planner
async fn create_test_planner() -> (TempDir, Planner) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let planner = PlannerBuilder::new()
        .with_database_path(Some(temp_dir.path().join("test.db")))
        .build()
        .await
        .expect("Failed to create planner");
    (temp_dir, planner)
}

fn row(source: &str, customer: &str, tonnes: f64, cost: f64) -> PlanRow {
    PlanRow {
        row_id: 0,
        cmo_stockyard_location_id: source.to_string(),
        product_id: "HR-COIL".to_string(),
        customer_id: customer.to_string(),
        destinations: vec![customer.to_string()],
        quantity_tonnes: tonnes,
        wagons_used: 58,
        distance_km: 300.0,
        transport_cost: cost * 0.8,
        loading_cost: cost * 0.2,
        total_cost: cost,
        utilization: 0.85,
        status: RowStatus::Validated,
    }
}

fn two_rows() -> Vec<PlanRow> {
    vec![
        row("SY-BOK", "CUST-KOL", 990.0, 53_200.0),
        row("SY-RKL", "CUST-RAN", 960.0, 49_800.0),
    ]
}

fn job_id(id: &str) -> JobId {
    JobId { id: id.to_string() }
}

#[tokio::test]
async fn test_submitted_job_is_pollable() {
    let (_temp_dir, planner) = create_test_planner().await;

    let job = planner
        .submit_job(SubmitOptimization::default())
        .await
        .expect("Failed to submit job");
    assert_eq!(job.status, JobStatus::Submitted);
    assert_eq!(job.request.date, today());

    let view = planner.poll_job(&job_id(&job.id)).await.unwrap();
    assert_eq!(view.status, JobStatus::Submitted);
    assert_eq!(view.progress, 0);
    assert!(view.result_url.is_none());
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let (_temp_dir, planner) = create_test_planner().await;

    let err = planner.poll_job(&job_id("no-such-job")).await.unwrap_err();
    assert!(matches!(err, PlannerError::JobNotFound { .. }));
}

#[tokio::test]
async fn test_completed_job_points_at_its_plan() {
    let (_temp_dir, planner) = create_test_planner().await;
    let plan_date = date(2025, 10, 5);

    let job = planner
        .submit_job(SubmitOptimization {
            date: Some(plan_date),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(planner.start_job(&job.id).await.unwrap());

    let plan = planner
        .complete_job(&job, two_rows())
        .await
        .unwrap()
        .expect("running job should publish its plan");
    assert_eq!(plan.revision, 1);
    assert_eq!(plan.summary.total_cost, 103_000.0);

    let first = planner.poll_job(&job_id(&job.id)).await.unwrap();
    let second = planner.poll_job(&job_id(&job.id)).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.status, JobStatus::Completed);
    assert_eq!(first.progress, 100);
    assert_eq!(first.result_url.as_deref(), Some("/api/plans/2025-10-05"));
}

#[tokio::test]
async fn test_cancel_is_idempotent() {
    let (_temp_dir, planner) = create_test_planner().await;
    let job = planner
        .submit_job(SubmitOptimization::default())
        .await
        .unwrap();

    let first = planner.cancel_job(&job_id(&job.id)).await.unwrap();
    let second = planner.cancel_job(&job_id(&job.id)).await.unwrap();

    assert_eq!(first.status, JobStatus::Failed);
    assert_eq!(first.error.as_deref(), Some("cancelled"));
    assert_eq!(first, second);

    // A cancelled job never starts
    assert!(!planner.start_job(&job.id).await.unwrap());
}

#[tokio::test]
async fn test_expired_job_is_stale() {
    let (_temp_dir, planner) = create_test_planner().await;
    let job = planner
        .submit_job(SubmitOptimization::default())
        .await
        .unwrap();
    planner.fail_job(&job.id, "optimizer unavailable").await.unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    let expired = planner.purge_expired_jobs(Duration::ZERO).await.unwrap();
    assert_eq!(expired, 1);

    let err = planner.poll_job(&job_id(&job.id)).await.unwrap_err();
    assert!(matches!(err, PlannerError::StaleJob { .. }));
}

#[tokio::test]
async fn test_live_jobs_survive_purge() {
    let (_temp_dir, planner) = create_test_planner().await;
    let job = planner
        .submit_job(SubmitOptimization::default())
        .await
        .unwrap();

    assert_eq!(planner.purge_expired_jobs(Duration::ZERO).await.unwrap(), 0);
    assert!(planner.poll_job(&job_id(&job.id)).await.is_ok());
}

#[tokio::test]
async fn test_interrupted_jobs_fail_on_startup() {
    let (_temp_dir, planner) = create_test_planner().await;
    let queued = planner
        .submit_job(SubmitOptimization::default())
        .await
        .unwrap();
    let running = planner
        .submit_job(SubmitOptimization::default())
        .await
        .unwrap();
    planner.start_job(&running.id).await.unwrap();

    assert_eq!(planner.fail_interrupted_jobs().await.unwrap(), 2);
    for id in [&queued.id, &running.id] {
        let view = planner.poll_job(&job_id(id)).await.unwrap();
        assert_eq!(view.status, JobStatus::Failed);
        assert_eq!(view.error.as_deref(), Some("interrupted"));
    }
}

#[tokio::test]
async fn test_lock_exports_and_freezes_plan() {
    let (_temp_dir, planner) = create_test_planner().await;
    let plan_date = date(2025, 10, 5);
    planner.put_plan(plan_date, two_rows()).await.unwrap();

    let outcome = planner.lock_plan(plan_date).await.unwrap();
    assert!(outcome.ok);
    assert_eq!(outcome.message, "Plan locked");
    assert!(outcome.exported.csv);
    assert!(outcome.exported.pdf);

    let csv = planner
        .export_plan(plan_date, ExportFormat::Csv)
        .await
        .unwrap();
    let csv = String::from_utf8(csv).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("SY-RKL"));

    let pdf = planner
        .export_plan(plan_date, ExportFormat::Pdf)
        .await
        .unwrap();
    assert!(pdf.starts_with(b"%PDF-"));

    let err = planner.put_plan(plan_date, Vec::new()).await.unwrap_err();
    assert!(matches!(err, PlannerError::PlanLocked { .. }));
    assert!(planner.get_plan(plan_date).await.unwrap().locked);
}

#[tokio::test]
async fn test_lock_missing_plan() {
    let (_temp_dir, planner) = create_test_planner().await;

    let err = planner.lock_plan(date(2025, 10, 5)).await.unwrap_err();
    assert!(matches!(err, PlannerError::PlanNotFound { .. }));

    let err = planner
        .export_plan(date(2025, 10, 5), ExportFormat::Csv)
        .await
        .unwrap_err();
    assert!(matches!(err, PlannerError::ExportNotFound { .. }));
}

#[tokio::test]
async fn test_edit_row_records_audit_entry() {
    let (_temp_dir, planner) = create_test_planner().await;
    let plan_date = date(2025, 10, 5);
    planner.put_plan(plan_date, two_rows()).await.unwrap();

    let (plan, entry) = planner
        .edit_plan_row(
            plan_date,
            1,
            &EditRow {
                user: Some("shift-lead".to_string()),
                reason: "Rourkela siding under maintenance".to_string(),
                edit: RowEdit {
                    cmo_stockyard_location_id: Some("SY-BOK".to_string()),
                    ..Default::default()
                },
                reoptimize: false,
            },
        )
        .await
        .unwrap();

    assert_eq!(plan.revision, 2);
    assert_eq!(plan.rows[1].cmo_stockyard_location_id, "SY-BOK");
    assert_eq!(plan.rows[1].status, RowStatus::Pending);
    assert_eq!(plan.rows[0].status, RowStatus::Validated);

    let log = planner.list_audit().await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0], entry);
    assert_eq!(entry.user, "shift-lead");
}

#[tokio::test]
async fn test_edit_without_reason_changes_nothing() {
    let (_temp_dir, planner) = create_test_planner().await;
    let plan_date = date(2025, 10, 5);
    planner.put_plan(plan_date, two_rows()).await.unwrap();

    let err = planner
        .edit_plan_row(
            plan_date,
            0,
            &EditRow {
                reason: "   ".to_string(),
                edit: RowEdit {
                    quantity_tonnes: Some(900.0),
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PlannerError::InvalidInput { .. }));

    assert_eq!(planner.get_plan(plan_date).await.unwrap().revision, 1);
    assert!(planner.list_audit().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_audit_append_then_list() {
    let (_temp_dir, planner) = create_test_planner().await;

    planner
        .append_audit(&AppendAudit {
            user: None,
            reason: "Customer requested hold".to_string(),
            change: serde_json::json!({"row_id": 2}),
        })
        .await
        .unwrap();
    planner
        .append_audit(&AppendAudit {
            user: Some("ops".to_string()),
            reason: "Hold released".to_string(),
            change: serde_json::Value::Null,
        })
        .await
        .unwrap();

    let log = planner.list_audit().await.unwrap();
    assert_eq!(log.len(), 2);
    assert!(log[0].id < log[1].id);
    assert_eq!(log[0].user, crate::params::DEFAULT_AUDIT_USER);
    assert_eq!(log[1].reason, "Hold released");
}

#[tokio::test]
async fn test_simulation_commits_only_on_request() {
    let (_temp_dir, planner) = create_test_planner().await;
    let plan_date = date(2025, 10, 5);
    planner.put_plan(plan_date, two_rows()).await.unwrap();

    let params = Simulate {
        delay_min: 30.0,
        load_delta: -10.0,
        date: Some(plan_date),
        rows: Some(vec![0]),
        commit: false,
    };
    let dry_run = planner.simulate(&params).await.unwrap();
    assert_eq!(dry_run.deltas.cost_delta, 300.0);
    assert_eq!(dry_run.deltas.delayed_rows, 1);
    assert_eq!(planner.get_plan(plan_date).await.unwrap().revision, 1);

    let committed = planner
        .simulate(&Simulate {
            commit: true,
            ..params
        })
        .await
        .unwrap();
    assert_eq!(committed.plan.revision, 2);
    assert_eq!(committed.deltas, dry_run.deltas);

    let kpis = planner.kpis(plan_date).await.unwrap();
    assert_eq!(kpis.active_rakes, 2);
    assert_eq!(kpis.delayed_rakes, 1);
    assert_eq!(kpis.on_time_pct, 50.0);
}

#[tokio::test]
async fn test_oversized_simulation_is_rejected_and_plan_stays_readable() {
    let (_temp_dir, planner) = create_test_planner().await;
    let plan_date = date(2025, 10, 5);
    planner.put_plan(plan_date, two_rows()).await.unwrap();

    let err = planner
        .simulate(&Simulate {
            delay_min: 1e308,
            date: Some(plan_date),
            commit: true,
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PlannerError::InvalidInput { ref field, .. } if field == "delayMin"));

    let err = planner
        .simulate(&Simulate {
            load_delta: -1e12,
            date: Some(plan_date),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PlannerError::InvalidInput { ref field, .. } if field == "loadDelta"));

    let plan = planner.get_plan(plan_date).await.unwrap();
    assert_eq!(plan.revision, 1);
    planner.put_plan(plan_date, two_rows()).await.unwrap();
}

#[tokio::test]
async fn test_non_finite_rows_are_never_stored() {
    let (_temp_dir, planner) = create_test_planner().await;
    let plan_date = date(2025, 10, 5);
    planner.put_plan(plan_date, two_rows()).await.unwrap();

    let mut rows = two_rows();
    rows[1].total_cost = f64::INFINITY;
    let err = planner.put_plan(plan_date, rows).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid input for field 'total_cost': row 1 must hold a finite number"
    );

    let err = planner
        .edit_plan_row(
            plan_date,
            0,
            &EditRow {
                reason: "scale misread".to_string(),
                edit: RowEdit {
                    quantity_tonnes: Some(f64::NAN),
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PlannerError::InvalidInput { .. }));

    // Nothing was written and the plan still reads back
    let plan = planner.get_plan(plan_date).await.unwrap();
    assert_eq!(plan.revision, 1);
    assert!(planner.list_audit().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_export_leaves_plan_unlocked() {
    let (temp_dir, planner) = create_test_planner().await;
    let plan_date = date(2025, 10, 5);
    planner.put_plan(plan_date, two_rows()).await.unwrap();

    // A regular file where the exports directory should be
    let exports = temp_dir.path().join("exports");
    std::fs::remove_dir_all(&exports).unwrap();
    std::fs::write(&exports, b"not a directory").unwrap();

    let err = planner.lock_plan(plan_date).await.unwrap_err();
    assert!(matches!(err, PlannerError::FileSystem { .. }));

    let plan = planner.get_plan(plan_date).await.unwrap();
    assert!(!plan.locked);
    planner.put_plan(plan_date, two_rows()).await.unwrap();
}

#[tokio::test]
async fn test_date_locks_are_released_after_writes() {
    let (_temp_dir, planner) = create_test_planner().await;
    for day in 1..=5 {
        planner.put_plan(date(2025, 10, day), two_rows()).await.unwrap();
    }
    assert_eq!(planner.date_locks.tracked(), 0);

    let held = planner.lock_date(date(2025, 10, 1)).await;
    assert_eq!(planner.date_locks.tracked(), 1);
    drop(held);
    assert_eq!(planner.date_locks.tracked(), 0);
}
