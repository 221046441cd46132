use crate::args::ExportArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::export::export_report;
use crate::{Config, Result};
use std::path::PathBuf;

/// Writes the report for the month in `args`, or the current month, to `Reporte-<month>.<ext>` in
/// the output directory.
///
/// # Errors
/// - Returns an export error if the report cannot be rendered, e.g. a PDF without fonts, or the
///   file cannot be written. The stored expenses are never touched.
pub async fn export(config: Config, args: ExportArgs) -> Result<Out<PathBuf>> {
    let mut session = config.session().await;
    if let Some(month) = args.month() {
        session.select(month);
    }
    let report = session.report();
    let path = export_report(&report, args.format(), args.out(), &config.font_source())
        .await
        .pub_result(ErrorType::Export)?;
    let message = format!(
        "Exported {} expenses of {} to {}",
        report.records.len(),
        report.month,
        path.display()
    );
    Ok(Out::new(message, path))
}
