use chrono::{Months, NaiveDate};

use super::error::{PayoffError, Result};

/// Same day next month, clamped to that month's last day (Jan 31 -> Feb 28/29).
pub fn next_month(date: NaiveDate) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(1))
        .ok_or(PayoffError::DateOutOfRange(date))
}
