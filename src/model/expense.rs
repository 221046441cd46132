use crate::model::month::{month_key_of, MonthKey};
use crate::model::Amount;
use crate::Result;
use anyhow::ensure;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The `detail` given to new expenses when none is entered.
pub const DEFAULT_DETAIL: &str = "Peajes";

/// One expense: what it was for, when, and how much was spent on food, fuel and everything else.
///
/// Records are immutable once stored. They are created from an `ExpenseDraft` by the record store
/// and can only be removed, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExpenseRecord {
    /// Stable identifier assigned at insertion. Documents written before ids existed have none;
    /// the store assigns one when it loads them.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    id: String,
    /// `YYYY-MM-DD`
    date: String,
    event: String,
    #[serde(default)]
    detail: String,
    #[serde(default)]
    food: Amount,
    #[serde(default)]
    fuel: Amount,
    #[serde(default)]
    other: Amount,
}

impl ExpenseRecord {
    pub(crate) fn new(
        id: impl Into<String>,
        date: impl Into<String>,
        event: impl Into<String>,
        detail: impl Into<String>,
        food: Amount,
        fuel: Amount,
        other: Amount,
    ) -> Self {
        Self {
            id: id.into(),
            date: date.into(),
            event: event.into(),
            detail: detail.into(),
            food,
            fuel,
            other,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn food(&self) -> Amount {
        self.food
    }

    pub fn fuel(&self) -> Amount {
        self.fuel
    }

    pub fn other(&self) -> Amount {
        self.other
    }

    /// `food + fuel + other`
    pub fn total(&self) -> Amount {
        self.food + self.fuel + self.other
    }

    /// The month this expense belongs to, `None` if its date does not parse.
    pub fn month_key(&self) -> Option<MonthKey> {
        month_key_of(&self.date)
    }

    pub(crate) fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    pub(crate) fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }
}

/// An expense as typed into the form: every field is raw text. Amount fields may be blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub date: String,
    pub event: String,
    /// `None` means the default detail.
    pub detail: Option<String>,
    pub food: String,
    pub fuel: String,
    pub other: String,
}

impl ExpenseDraft {
    pub fn new(date: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            event: event.into(),
            ..Default::default()
        }
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn amounts(
        mut self,
        food: impl Into<String>,
        fuel: impl Into<String>,
        other: impl Into<String>,
    ) -> Self {
        self.food = food.into();
        self.fuel = fuel.into();
        self.other = other.into();
        self
    }

    /// Validates the draft and turns it into a record with the given `id`.
    ///
    /// - `date` and `event` must not be blank.
    /// - Blank amounts are zero. Amounts that are not numbers are zero too, with a warning.
    /// - Negative amounts are rejected.
    ///
    /// # Errors
    /// - Returns an error naming the offending field when validation fails.
    pub(crate) fn normalize(self, id: String, default_detail: &str) -> Result<ExpenseRecord> {
        let date = self.date.trim().to_string();
        let event = self.event.trim().to_string();
        ensure!(
            !date.is_empty() && !event.is_empty(),
            "Date and event are required"
        );

        let food = coerce_amount("food", &self.food)?;
        let fuel = coerce_amount("fuel", &self.fuel)?;
        let other = coerce_amount("other", &self.other)?;

        let detail = self.detail.unwrap_or_else(|| default_detail.to_string());

        Ok(ExpenseRecord::new(id, date, event, detail, food, fuel, other))
    }
}

fn coerce_amount(field: &str, raw: &str) -> Result<Amount> {
    let (amount, discarded) = Amount::coerce(raw);
    if discarded {
        warn!("The {field} amount '{raw}' is not a number, using 0");
    }
    ensure!(
        !amount.is_negative(),
        "The {field} amount cannot be negative, got {raw}"
    );
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(draft: ExpenseDraft) -> Result<ExpenseRecord> {
        draft.normalize("exp-1".to_string(), DEFAULT_DETAIL)
    }

    #[test]
    fn test_normalize_full_draft() {
        let record = normalize(
            ExpenseDraft::new("2025-09-30", "Test")
                .detail("Peajes")
                .amounts("100", "200", ""),
        )
        .unwrap();
        assert_eq!(record.id(), "exp-1");
        assert_eq!(record.date(), "2025-09-30");
        assert_eq!(record.event(), "Test");
        assert_eq!(record.detail(), "Peajes");
        assert_eq!(record.food(), Amount::from_pesos(100));
        assert_eq!(record.fuel(), Amount::from_pesos(200));
        assert_eq!(record.other(), Amount::ZERO);
        assert_eq!(record.total(), Amount::from_pesos(300));
    }

    #[test]
    fn test_normalize_blank_amounts_are_zero() {
        let record = normalize(ExpenseDraft::new("2025-09-01", "Juego")).unwrap();
        assert!(record.total().is_zero());
        assert_eq!(record.detail(), DEFAULT_DETAIL);
    }

    #[test]
    fn test_normalize_non_numeric_amount_is_zero() {
        let record =
            normalize(ExpenseDraft::new("2025-09-01", "Juego").amounts("abc", "50", "")).unwrap();
        assert!(record.food().is_zero());
        assert_eq!(record.fuel(), Amount::from_pesos(50));
    }

    #[test]
    fn test_normalize_missing_event() {
        let err = normalize(ExpenseDraft::new("2025-09-01", "")).unwrap_err();
        assert!(err.to_string().contains("Date and event are required"));
    }

    #[test]
    fn test_normalize_blank_date() {
        assert!(normalize(ExpenseDraft::new("  ", "Juego")).is_err());
    }

    #[test]
    fn test_normalize_negative_amount() {
        let err =
            normalize(ExpenseDraft::new("2025-09-01", "Juego").amounts("", "-5", "")).unwrap_err();
        assert!(err.to_string().contains("fuel"));
    }

    #[test]
    fn test_legacy_record_without_id_deserializes() {
        let json = r#"{"date":"2025-09-02","event":"Acad","detail":"Peajes","food":500,"fuel":"1115","other":""}"#;
        let record: ExpenseRecord = serde_json::from_str(json).unwrap();
        assert!(!record.has_id());
        assert_eq!(record.fuel(), Amount::from_pesos(1115));
        assert!(record.other().is_zero());
    }

    #[test]
    fn test_serialized_amounts_are_numbers() {
        let record = normalize(ExpenseDraft::new("2025-09-01", "Juego").amounts("500", "", ""))
            .unwrap();
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""food":500"#), "{json}");
        assert!(json.contains(r#""fuel":0"#), "{json}");
    }
}
