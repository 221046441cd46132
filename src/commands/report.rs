use crate::args::{OutputFormat, ReportArgs};
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::report::{render_table, render_trend, MonthlyReport};
use crate::{Config, Result};
use anyhow::Context;

/// Builds the report for the month in `args`, or the current month, and renders it for stdout.
pub async fn report(config: Config, args: ReportArgs) -> Result<Out<MonthlyReport>> {
    let mut session = config.session().await;
    if let Some(month) = args.month() {
        session.select(month);
    }
    let report = session.report();
    let text = match args.format() {
        OutputFormat::Table => {
            format!("{}\n{}", render_table(&report), render_trend(&report.trend))
        }
        OutputFormat::Json => serde_json::to_string_pretty(&report)
            .context("Unable to serialize the report")
            .pub_result(ErrorType::Export)?,
    };
    let message = if report.is_empty() {
        format!("No expenses in {}", report.month)
    } else {
        format!(
            "{} expenses in {}, total {}",
            report.records.len(),
            report.month,
            report.totals.total
        )
    };
    Ok(Out::new(message, report).with_text(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, MonthKey};
    use crate::test::TestEnv;
    use std::str::FromStr;

    fn september() -> Option<MonthKey> {
        Some(MonthKey::from_str("2025-09").unwrap())
    }

    #[tokio::test]
    async fn test_report_seed_month() {
        let env = TestEnv::new().await;
        let out = report(env.config(), ReportArgs::new(september(), OutputFormat::Table))
            .await
            .unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.records.len(), 10);
        assert_eq!(report.totals.total, Amount::from_pesos(16585));
        assert_eq!(out.message(), "10 expenses in 2025-09, total RD$16,585.00");
        let text = out.text().unwrap();
        assert!(text.contains("REPORTE DE GASTOS"));
        assert!(text.contains("Evolución diaria"));
    }

    #[tokio::test]
    async fn test_report_json() {
        let env = TestEnv::new().await;
        let out = report(env.config(), ReportArgs::new(september(), OutputFormat::Json))
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(out.text().unwrap()).unwrap();
        assert_eq!(value["totals"]["food"], 4500);
    }

    #[tokio::test]
    async fn test_report_empty_month() {
        let env = TestEnv::new().await;
        let month = Some(MonthKey::from_str("2024-02").unwrap());
        let out = report(env.config(), ReportArgs::new(month, OutputFormat::Table))
            .await
            .unwrap();
        assert!(out.structure().unwrap().is_empty());
        assert_eq!(out.message(), "No expenses in 2024-02");
        assert!(out.text().unwrap().contains("(sin gastos)"));
    }

    #[tokio::test]
    async fn test_report_defaults_to_current_month() {
        let env = TestEnv::new().await;
        let out = report(env.config(), ReportArgs::new(None, OutputFormat::Table))
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().month, MonthKey::current());
    }
}
