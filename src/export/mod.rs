//! Writing a monthly report to a file named `Reporte-<month>.<ext>`.

mod pdf;

pub use pdf::{render_pdf, FontSource, DEFAULT_FONT_FAMILY};

use crate::model::MonthKey;
use crate::report::{render_table, render_trend, MonthlyReport};
use crate::{utils, Result};
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const FILE_STEM: &str = "Reporte";

/// The file formats a report can be exported to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One row per expense and a final totals row. Amounts are plain numbers.
    Csv,
    /// The full report: records, totals, category breakdown and daily trend.
    Json,
    /// The report as Markdown tables with the daily trend as a bar chart.
    #[default]
    Md,
    /// An A4 document with the same sections as the Markdown export.
    Pdf,
}

serde_plain::derive_display_from_serialize!(ReportFormat);
serde_plain::derive_fromstr_from_deserialize!(ReportFormat);

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
            ReportFormat::Md => "md",
            ReportFormat::Pdf => "pdf",
        }
    }
}

/// The name of the exported file, e.g. `Reporte-2025-09.csv`.
pub fn report_file_name(month: MonthKey, format: ReportFormat) -> String {
    format!("{FILE_STEM}-{month}.{}", format.extension())
}

/// Renders `report` in `format`. Only PDF output uses `fonts`.
///
/// # Errors
/// - Returns an error if the report cannot be serialized or, for PDF, if no fonts are found.
pub fn render_report(
    report: &MonthlyReport,
    format: ReportFormat,
    fonts: &FontSource,
) -> Result<Vec<u8>> {
    match format {
        ReportFormat::Csv => render_csv(report).map(String::into_bytes),
        ReportFormat::Json => {
            serde_json::to_vec_pretty(report).context("Unable to serialize the report")
        }
        ReportFormat::Md => Ok(format!(
            "{}\n{}",
            render_table(report),
            render_trend(&report.trend)
        )
        .into_bytes()),
        ReportFormat::Pdf => render_pdf(report, fonts),
    }
}

/// Writes `report` into `dir` and returns the path of the new file. `dir` is created if needed and
/// an existing file with the same name is replaced.
///
/// # Errors
/// - Returns an error if the format cannot be rendered or the file cannot be written. Nothing is
///   written when rendering fails.
pub async fn export_report(
    report: &MonthlyReport,
    format: ReportFormat,
    dir: &Path,
    fonts: &FontSource,
) -> Result<PathBuf> {
    let contents = render_report(report, format, fonts)?;
    utils::make_dir(dir).await?;
    let path = dir.join(report_file_name(report.month, format));
    utils::write(&path, contents).await?;
    debug!("Exported {} expenses to {}", report.records.len(), path.display());
    Ok(path)
}

fn render_csv(report: &MonthlyReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "Id",
        "Fecha",
        "Evento",
        "Detalle",
        "Comida",
        "Combustible",
        "Otros",
        "Total",
    ])?;
    for r in &report.records {
        wtr.write_record([
            r.id().to_string(),
            r.date().to_string(),
            r.event().to_string(),
            r.detail().to_string(),
            r.food().value().to_string(),
            r.fuel().value().to_string(),
            r.other().value().to_string(),
            r.total().value().to_string(),
        ])?;
    }
    let t = &report.totals;
    wtr.write_record([
        String::new(),
        "TOTALES".to_string(),
        String::new(),
        String::new(),
        t.food.value().to_string(),
        t.fuel.value().to_string(),
        t.other.value().to_string(),
        t.total.value().to_string(),
    ])?;
    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow!("Unable to finish writing the CSV report: {e}"))?;
    String::from_utf8(bytes).context("The CSV report is not valid UTF-8")
}
