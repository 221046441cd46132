//! Delete command handler.

use crate::args::DeleteArgs;
use crate::commands::{Out, NOT_SAVED};
use crate::error::{ErrorType, IntoResult};
use crate::model::ExpenseRecord;
use crate::{Config, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use tracing::warn;

/// Deletes the expense with the id in `args`.
///
/// `confirm` is asked before anything is removed, unless `args.yes()` is set. When it declines,
/// nothing changes and the output has no structure.
///
/// # Errors
/// - Returns a not-found error if no expense has the id.
pub async fn delete<F>(config: Config, args: DeleteArgs, confirm: F) -> Result<Out<ExpenseRecord>>
where
    F: FnOnce(&ExpenseRecord) -> bool,
{
    let yes = args.yes();
    let mut session = config.session().await;
    let change = session
        .delete(args.id(), |record| yes || confirm(record))
        .await
        .pub_result(ErrorType::NotFound)?;

    let Some(change) = change else {
        return Ok(format!("Kept expense {}", args.id()).into());
    };
    let mut message = format!(
        "Deleted expense {} on {} ({})",
        change.record.id(),
        change.record.date(),
        change.record.total()
    );
    if !change.saved {
        message.push_str(NOT_SAVED);
    }
    Ok(Out::new(message, change.record))
}

/// Asks on the terminal whether `record` should be deleted. Anything but an explicit yes, including
/// a terminal that cannot prompt, keeps the record.
pub fn confirm_delete(record: &ExpenseRecord) -> bool {
    let prompt = format!(
        "Delete the expense of {} '{}' ({})?",
        record.date(),
        record.event(),
        record.total()
    );
    match Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
    {
        Ok(answer) => answer,
        Err(e) => {
            warn!("Unable to ask for confirmation, keeping the expense: {e}");
            false
        }
    }
}
