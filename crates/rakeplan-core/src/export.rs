//! Lock-time export artifacts.
//!
//! Locking a plan writes `plan-<date>.csv` and `plan-<date>.pdf` into the
//! exports directory. The CSV carries every row; the PDF is a one-page
//! summary sheet for sign-off.

use std::{
    fmt::Write as _,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use jiff::civil::Date;

use crate::{
    error::{PlannerError, Result},
    models::{ExportFormat, Exported, Plan},
};

const CSV_HEADER: &str = "row_id,cmo_stockyard_location_id,product_id,customer_id,destinations,\
quantity_tonnes,wagons_used,distance_km,transport_cost,loading_cost,total_cost,utilization,status";

/// Quote a CSV field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render every row of a plan as CSV. Destinations are joined with `;`.
pub fn render_csv(plan: &Plan) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for row in &plan.rows {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{},{:.2},{:.2},{:.2},{:.4},{}",
            row.row_id,
            csv_field(&row.cmo_stockyard_location_id),
            csv_field(&row.product_id),
            csv_field(&row.customer_id),
            csv_field(&row.destinations.join(";")),
            row.quantity_tonnes,
            row.wagons_used,
            row.distance_km,
            row.transport_cost,
            row.loading_cost,
            row.total_cost,
            row.utilization,
            row.status.as_str(),
        );
    }
    out
}

/// Escape text for a PDF literal string.
fn pdf_text(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii)
        .flat_map(|c| match c {
            '(' | ')' | '\\' => vec!['\\', c],
            _ => vec![c],
        })
        .collect()
}

/// Render a one-page PDF summary sheet for a plan.
pub fn render_pdf(plan: &Plan) -> Vec<u8> {
    let mut lines = vec![
        format!("Rake dispatch plan {}", plan.plan_id),
        format!("Date: {}", plan.date),
        format!("Rakes: {}", plan.rows.len()),
        format!("Total cost: {:.2}", plan.summary.total_cost),
        format!(
            "Average utilization: {:.1}%",
            plan.summary.avg_utilization * 100.0
        ),
    ];
    lines.extend(plan.rows.iter().take(40).map(|row| {
        format!(
            "#{} {} -> {} {} {:.0} t {:.2}",
            row.row_id,
            row.cmo_stockyard_location_id,
            row.destinations.join("/"),
            row.product_id,
            row.quantity_tonnes,
            row.total_cost,
        )
    }));

    let mut content = String::from("BT /F1 10 Tf 50 800 Td 14 TL\n");
    for line in &lines {
        let _ = writeln!(content, "({}) Tj T*", pdf_text(line));
    }
    content.push_str("ET\n");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (idx, object) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        let _ = write!(pdf, "{} 0 obj\n{}\nendobj\n", idx + 1, object);
    }
    let xref = pdf.len();
    let _ = write!(pdf, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = writeln!(pdf, "{offset:010} 00000 n ");
    }
    let _ = write!(
        pdf,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref
    );
    pdf.into_bytes()
}

fn artifact_path(dir: &Path, date: Date, format: ExportFormat) -> PathBuf {
    dir.join(format.file_name(date))
}

fn write_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|e| PlannerError::FileSystem {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write both artifacts for a plan, replacing earlier ones.
pub fn write_exports(dir: &Path, plan: &Plan) -> Result<Exported> {
    fs::create_dir_all(dir).map_err(|e| PlannerError::FileSystem {
        path: dir.to_path_buf(),
        source: e,
    })?;

    write_artifact(
        &artifact_path(dir, plan.date, ExportFormat::Csv),
        render_csv(plan).as_bytes(),
    )?;
    write_artifact(
        &artifact_path(dir, plan.date, ExportFormat::Pdf),
        &render_pdf(plan),
    )?;

    Ok(Exported {
        csv: true,
        pdf: true,
    })
}

/// Read a previously written artifact.
pub fn read_export(dir: &Path, date: Date, format: ExportFormat) -> Result<Vec<u8>> {
    let path = artifact_path(dir, date, format);
    fs::read(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PlannerError::ExportNotFound {
            date,
            format: format.extension().to_string(),
        },
        _ => PlannerError::FileSystem { path, source: e },
    })
}

#[cfg(test)]
mod tests {
    use jiff::{civil::date, Timestamp};
    use tempfile::TempDir;

    use super::*;
    use crate::models::{PlanRow, PlanSummary, RowStatus};

    fn create_test_plan() -> Plan {
        let rows = vec![PlanRow {
            row_id: 0,
            cmo_stockyard_location_id: "SY-BOK".to_string(),
            product_id: "HR-COIL".to_string(),
            customer_id: "Tata, Jamshedpur".to_string(),
            destinations: vec!["Kolkata".to_string(), "Haldia".to_string()],
            quantity_tonnes: 990.0,
            wagons_used: 58,
            distance_km: 310.0,
            transport_cost: 41_000.0,
            loading_cost: 12_200.0,
            total_cost: 53_200.0,
            utilization: 0.9,
            status: RowStatus::Delayed,
        }];
        Plan {
            date: date(2025, 10, 5),
            plan_id: Plan::make_id(date(2025, 10, 5), 3),
            revision: 3,
            locked: true,
            generated_at: Timestamp::UNIX_EPOCH,
            summary: PlanSummary::from_rows(&rows),
            rows,
        }
    }

    #[test]
    fn test_csv_quotes_fields_with_commas() {
        let csv = render_csv(&create_test_plan());
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        let row = lines.next().unwrap();
        assert!(row.starts_with("0,SY-BOK,HR-COIL,\"Tata, Jamshedpur\",Kolkata;Haldia,"));
        assert!(row.ends_with(",delayed"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_pdf_is_well_formed() {
        let pdf = render_pdf(&create_test_plan());
        let text = String::from_utf8(pdf).unwrap();
        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("2025-10-05-r3"));

        let xref = text.find("xref\n").unwrap();
        let startxref: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert_eq!(startxref, xref);
    }

    #[test]
    fn test_write_then_read_exports() {
        let dir = TempDir::new().unwrap();
        let plan = create_test_plan();

        let exported = write_exports(dir.path(), &plan).unwrap();
        assert!(exported.csv && exported.pdf);
        assert!(dir.path().join("plan-2025-10-05.csv").exists());

        let csv = read_export(dir.path(), plan.date, ExportFormat::Csv).unwrap();
        assert_eq!(csv, render_csv(&plan).into_bytes());
    }

    #[test]
    fn test_missing_export_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = read_export(dir.path(), date(2025, 10, 5), ExportFormat::Pdf).unwrap_err();
        assert!(matches!(err, PlannerError::ExportNotFound { .. }));
    }
}
