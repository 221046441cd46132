use crate::args::AddArgs;
use crate::commands::{Out, NOT_SAVED};
use crate::error::{ErrorType, IntoResult};
use crate::model::{ExpenseDraft, ExpenseRecord, MonthKey};
use crate::report::Totals;
use crate::{Config, Result};
use serde::Serialize;

/// The structured output of `gastos add`.
#[derive(Debug, Clone, Serialize)]
pub struct Added {
    pub record: ExpenseRecord,
    pub saved: bool,
    /// The month selected after the insert, the month of the new expense when its date parses.
    pub month: MonthKey,
    pub totals: Totals,
}

/// Adds an expense and reports the totals of its month.
///
/// # Errors
/// - Returns a validation error if the date or event is blank or an amount is negative.
/// - Returns a storage error if the stored expenses belong to a newer version of gastos.
pub async fn add(config: Config, args: AddArgs) -> Result<Out<Added>> {
    let mut draft = ExpenseDraft::new(args.date(), args.event()).amounts(
        args.food(),
        args.fuel(),
        args.other(),
    );
    if let Some(detail) = args.detail() {
        draft = draft.detail(detail);
    }

    let mut session = config.session().await;
    let change = session
        .add(draft)
        .await
        .pub_result(ErrorType::Validation)?;

    let report = session.report();
    let mut message = format!(
        "Added expense {} on {}. Total for {}: {}",
        change.record.id(),
        change.record.date(),
        report.month,
        report.totals.total
    );
    if !change.saved {
        message.push_str(NOT_SAVED);
    }
    Ok(Out::new(
        message,
        Added {
            record: change.record,
            saved: change.saved,
            month: report.month,
            totals: report.totals,
        },
    ))
}
