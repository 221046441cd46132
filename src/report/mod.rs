//! Aggregation of expense records into monthly reports.
//!
//! Everything in this module is a pure function of its inputs. Records whose date does not parse
//! belong to no month: they never appear in a month-filtered view or a trend.

mod render;

pub use render::{render_table, render_trend};
pub(crate) use render::{bar_len, percent, TITLE};

use crate::model::{Amount, ExpenseRecord, MonthKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The three cost categories of an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Food,
    Fuel,
    Other,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

impl Category {
    /// All categories in report order.
    pub const ALL: [Category; 3] = [Category::Food, Category::Fuel, Category::Other];

    /// The label shown in reports and charts.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Food => "Comida",
            Category::Fuel => "Combustible",
            Category::Other => "Otros",
        }
    }
}

/// Sums over a set of records. `total` is always `food + fuel + other`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub food: Amount,
    pub fuel: Amount,
    pub other: Amount,
    pub total: Amount,
}

impl Totals {
    pub fn get(&self, category: Category) -> Amount {
        match category {
            Category::Food => self.food,
            Category::Fuel => self.fuel,
            Category::Other => self.other,
        }
    }
}

/// Spending on one day: the sum of all categories of every record with this exact `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: String,
    pub total: Amount,
}

/// One slice of the category breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySlice {
    pub category: Category,
    pub label: String,
    pub value: Amount,
}

/// Everything a presentation of one month needs: the records of the month, their totals, the
/// category breakdown and the daily trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub month: MonthKey,
    pub records: Vec<ExpenseRecord>,
    pub totals: Totals,
    pub breakdown: Vec<CategorySlice>,
    pub trend: Vec<DailyPoint>,
}

impl MonthlyReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Returns the records that belong to `month`, in their original order.
pub fn filter_by_month(records: &[ExpenseRecord], month: MonthKey) -> Vec<ExpenseRecord> {
    records
        .iter()
        .filter(|r| r.month_key() == Some(month))
        .cloned()
        .collect()
}

/// Sums each category independently. An empty slice yields all zeros.
pub fn compute_totals(records: &[ExpenseRecord]) -> Totals {
    let mut totals = Totals::default();
    for record in records {
        totals.food += record.food();
        totals.fuel += record.fuel();
        totals.other += record.other();
    }
    totals.total = totals.food + totals.fuel + totals.other;
    totals
}

/// Groups records by their exact `date` string and returns one point per distinct date, sorted
/// ascending. ISO dates sort chronologically as strings. Records without a valid date are skipped.
pub fn compute_daily_trend(records: &[ExpenseRecord]) -> Vec<DailyPoint> {
    let mut days: BTreeMap<&str, Amount> = BTreeMap::new();
    for record in records.iter().filter(|r| r.month_key().is_some()) {
        *days.entry(record.date()).or_default() += record.total();
    }
    days.into_iter()
        .map(|(date, total)| DailyPoint {
            date: date.to_string(),
            total,
        })
        .collect()
}

/// Always returns three slices, food, fuel and other, in that order. Zero slices are kept.
pub fn compute_category_breakdown(totals: &Totals) -> Vec<CategorySlice> {
    Category::ALL
        .iter()
        .map(|&category| CategorySlice {
            category,
            label: category.label().to_string(),
            value: totals.get(category),
        })
        .collect()
}

/// Builds the report for `month`.
pub fn monthly_report(records: &[ExpenseRecord], month: MonthKey) -> MonthlyReport {
    let records = filter_by_month(records, month);
    let totals = compute_totals(&records);
    let breakdown = compute_category_breakdown(&totals);
    let trend = compute_daily_trend(&records);
    MonthlyReport {
        month,
        records,
        totals,
        breakdown,
        trend,
    }
}

/// The distinct months that have at least one record, oldest first.
pub fn months_with_records(records: &[ExpenseRecord]) -> Vec<MonthKey> {
    records
        .iter()
        .filter_map(ExpenseRecord::month_key)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
