//! Plain-text rendering of a `MonthlyReport` for the terminal and for Markdown exports.

use crate::model::Amount;
use crate::report::{DailyPoint, MonthlyReport};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt::Write;

pub(crate) const TITLE: &str = "REPORTE DE GASTOS";
const BAR_WIDTH: u32 = 30;

/// Renders the report as Markdown: a header with the month and grand total, the record table with
/// a totals row, and the category breakdown with each category's share of the total.
pub fn render_table(report: &MonthlyReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {TITLE}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Mes: {}", report.month);
    let _ = writeln!(out, "Total: {}", report.totals.total);
    let _ = writeln!(out);

    let headers = [
        "Id",
        "Fecha",
        "Evento",
        "Detalle",
        "Comida",
        "Combustible",
        "Otros",
        "Total",
    ];
    let mut rows: Vec<Vec<String>> = report
        .records
        .iter()
        .map(|r| {
            vec![
                r.id().to_string(),
                r.date().to_string(),
                r.event().to_string(),
                r.detail().to_string(),
                r.food().to_string(),
                r.fuel().to_string(),
                r.other().to_string(),
                r.total().to_string(),
            ]
        })
        .collect();
    let t = &report.totals;
    rows.push(vec![
        String::new(),
        "TOTALES".to_string(),
        String::new(),
        String::new(),
        t.food.to_string(),
        t.fuel.to_string(),
        t.other.to_string(),
        t.total.to_string(),
    ]);
    // Amount columns are right-aligned
    out.push_str(&markdown_table(&headers, &rows, 4));
    let _ = writeln!(out);

    let _ = writeln!(out, "## Distribución por categoría");
    let _ = writeln!(out);
    let slices: Vec<Vec<String>> = report
        .breakdown
        .iter()
        .map(|s| {
            vec![
                s.label.clone(),
                s.value.to_string(),
                percent(s.value, report.totals.total),
            ]
        })
        .collect();
    out.push_str(&markdown_table(&["Categoría", "Monto", "%"], &slices, 1));
    out
}

/// Renders the daily trend as one line per day with a bar scaled to the busiest day.
pub fn render_trend(trend: &[DailyPoint]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## Evolución diaria del gasto");
    let _ = writeln!(out);
    if trend.is_empty() {
        let _ = writeln!(out, "(sin gastos)");
        return out;
    }
    let max = trend
        .iter()
        .map(|p| p.total.value())
        .max()
        .unwrap_or_default();
    let width = trend
        .iter()
        .map(|p| p.total.to_string().chars().count())
        .max()
        .unwrap_or_default();
    for point in trend {
        let _ = writeln!(
            out,
            "{}  {:>width$}  {}",
            point.date,
            point.total.to_string(),
            "#".repeat(bar_len(point.total, max)),
        );
    }
    out
}

/// The length of the bar for `value` when the busiest day gets `BAR_WIDTH` marks.
pub(crate) fn bar_len(value: Amount, max: Decimal) -> usize {
    if max.is_zero() || value.is_zero() {
        return 0;
    }
    let scaled = (value.value() * Decimal::from(BAR_WIDTH) / max).round();
    scaled.to_usize().unwrap_or_default().max(1)
}

/// The share of `part` in `whole` with one decimal, e.g. `56.0%`.
pub(crate) fn percent(part: Amount, whole: Amount) -> String {
    if whole.is_zero() {
        return "0.0%".to_string();
    }
    let pct = (part.value() * Decimal::ONE_HUNDRED / whole.value()).round_dp(1);
    format!("{pct:.1}%")
}

/// Makes free text safe inside a table cell: pipes are escaped and line breaks become spaces.
fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Builds a Markdown table. Columns at index `first_numeric` and beyond are right-aligned.
fn markdown_table(headers: &[&str], rows: &[Vec<String>], first_numeric: usize) -> String {
    let headers: Vec<String> = headers.iter().map(|h| escape_cell(h)).collect();
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| escape_cell(cell)).collect())
        .collect();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (ix, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(ix) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &mut dyn Iterator<Item = (usize, String)>| -> String {
        let parts: Vec<String> = cells
            .map(|(ix, cell)| {
                let w = widths[ix];
                if ix >= first_numeric {
                    format!("{cell:>w$}")
                } else {
                    format!("{cell:<w$}")
                }
            })
            .collect();
        format!("| {} |\n", parts.join(" | "))
    };

    let mut out = line(&mut headers.iter().cloned().enumerate());
    let separators: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(ix, w)| {
            if ix >= first_numeric {
                format!("{}:", "-".repeat(w.saturating_sub(1).max(1)))
            } else {
                "-".repeat((*w).max(1))
            }
        })
        .collect();
    out.push_str(&format!("| {} |\n", separators.join(" | ")));
    for row in &rows {
        out.push_str(&line(&mut row.iter().cloned().enumerate()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{seed_records, ExpenseDraft, MonthKey};
    use crate::report::monthly_report;
    use std::str::FromStr;

    fn september() -> MonthlyReport {
        monthly_report(&seed_records(), MonthKey::from_str("2025-09").unwrap())
    }

    #[test]
    fn test_render_table() {
        let text = render_table(&september());
        assert!(text.contains("Mes: 2025-09"));
        assert!(text.contains("Total: RD$16,585.00"));
        assert!(text.contains("TOTALES"));
        assert!(text.contains("seed-01"));
        assert!(text.contains("| Combustible |"));
        assert!(text.contains("RD$9,285.00"));
        assert!(text.contains("56.0%"));
    }

    #[test]
    fn test_render_table_escapes_pipes() {
        let record = ExpenseDraft::new("2025-09-05", "A | B")
            .detail("Peajes\nida")
            .amounts("10", "", "")
            .normalize("exp-1".to_string(), "Peajes")
            .unwrap();
        let report = monthly_report(&[record], MonthKey::from_str("2025-09").unwrap());
        let text = render_table(&report);
        let header = text.lines().find(|l| l.starts_with("| Id")).unwrap();
        let row = text.lines().find(|l| l.starts_with("| exp-1")).unwrap();
        assert!(row.contains("A \\| B"));
        assert!(row.contains("Peajes ida"));
        let columns = |line: &str| line.matches(" | ").count();
        assert_eq!(columns(row), columns(header));
    }

    #[test]
    fn test_render_table_empty_month() {
        let report = monthly_report(&seed_records(), MonthKey::from_str("2024-01").unwrap());
        let text = render_table(&report);
        assert!(text.contains("Total: RD$0.00"));
        assert!(text.contains("0.0%"));
    }

    #[test]
    fn test_render_trend() {
        let text = render_trend(&september().trend);
        assert_eq!(text.lines().filter(|l| l.starts_with("2025-09-")).count(), 9);
        // 2025-09-03 is the busiest day and gets the full bar
        let busiest = text.lines().find(|l| l.starts_with("2025-09-03")).unwrap();
        assert!(busiest.ends_with(&"#".repeat(BAR_WIDTH as usize)));
    }

    #[test]
    fn test_render_trend_empty() {
        assert!(render_trend(&[]).contains("(sin gastos)"));
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(Amount::from_pesos(1), Amount::from_pesos(3)), "33.3%");
        assert_eq!(percent(Amount::from_pesos(5), Amount::ZERO), "0.0%");
    }
}
