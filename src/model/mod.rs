//! Types that represent the core data model, such as `ExpenseRecord` and `MonthKey`.
mod amount;
mod expense;
mod month;
mod seed;

pub use amount::{Amount, AmountError, CURRENCY_SYMBOL};
pub use expense::{ExpenseDraft, ExpenseRecord, DEFAULT_DETAIL};
pub use month::{month_key_of, parse_date, MonthKey};
pub use seed::seed_records;
