//! Due-expression derivation.
//!
//! Both expressions are anchored on the caller's zoned "now": a task is due
//! today, and its reminder fires today at the task's time of day.

use chrono::DateTime;
use chrono_tz::Tz;

use crate::types::{DueExpression, TimeOfDay};

const TASK_DUE_STRING: &str = "every day";

/// Due expression for the task itself: today's date, no time component.
pub fn task_due(now: &DateTime<Tz>, lang: &str) -> DueExpression {
    DueExpression {
        lang: lang.to_string(),
        is_recurring: false,
        string: TASK_DUE_STRING.to_string(),
        date: now.format("%Y-%m-%d").to_string(),
        timezone: now.timezone().name().to_string(),
    }
}

/// Due expression for a reminder at `at` on today's date.
pub fn reminder_due(now: &DateTime<Tz>, at: TimeOfDay, lang: &str) -> DueExpression {
    let date = now.date_naive();
    DueExpression {
        lang: lang.to_string(),
        is_recurring: false,
        string: format!("{} {at}", date.format("%d %b")),
        date: format!("{}T{at}:00", date.format("%Y-%m-%d")),
        timezone: now.timezone().name().to_string(),
    }
}
