use crate::commands::Out;
use crate::model::{Amount, MonthKey};
use crate::report::monthly_report;
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Write;

/// A month that has expenses, with how many and their total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    pub month: MonthKey,
    pub count: usize,
    pub total: Amount,
}

/// Lists the months that have expenses, oldest first.
pub async fn months(config: Config) -> Result<Out<Vec<MonthSummary>>> {
    let session = config.session().await;
    let summaries: Vec<MonthSummary> = session
        .months()
        .into_iter()
        .map(|month| {
            let report = monthly_report(session.records(), month);
            MonthSummary {
                month,
                count: report.records.len(),
                total: report.totals.total,
            }
        })
        .collect();

    let mut text = String::new();
    for s in &summaries {
        let _ = writeln!(text, "{}  {:>4}  {:>14}", s.month, s.count, s.total.to_string());
    }
    let message = format!(
        "{} month{} with expenses",
        summaries.len(),
        if summaries.len() == 1 { "" } else { "s" }
    );
    Ok(Out::new(message, summaries).with_text(text.trim_end()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::AddArgs;
    use crate::commands::add;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_months_seed() {
        let env = TestEnv::new().await;
        let out = months(env.config()).await.unwrap();
        let summaries = out.structure().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].month.to_string(), "2025-09");
        assert_eq!(summaries[0].count, 10);
        assert_eq!(summaries[0].total, Amount::from_pesos(16585));
        assert_eq!(out.message(), "1 month with expenses");
    }

    #[tokio::test]
    async fn test_months_sorted() {
        let env = TestEnv::empty().await;
        for date in ["2025-11-02", "2024-12-31", "2025-11-20", "no-date"] {
            add(env.config(), AddArgs::new(date, "x").with_amounts("1", "", ""))
                .await
                .unwrap();
        }
        let out = months(env.config()).await.unwrap();
        let months: Vec<String> = out
            .structure()
            .unwrap()
            .iter()
            .map(|s| s.month.to_string())
            .collect();
        assert_eq!(months, vec!["2024-12", "2025-11"]);
        assert_eq!(out.structure().unwrap()[1].count, 2);
    }

    #[tokio::test]
    async fn test_months_empty() {
        let env = TestEnv::empty().await;
        let out = months(env.config()).await.unwrap();
        assert!(out.structure().unwrap().is_empty());
        assert_eq!(out.message(), "0 months with expenses");
    }
}
