// Stay pricing: nights between two dates and the resulting cost

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::InventoryError;

// Whole nights between check-in and check-out; dates carry no time of day
pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}

// Same as `nights`, with the time of day dropped first
pub fn nights_between(check_in: NaiveDateTime, check_out: NaiveDateTime) -> i64 {
    nights(check_in.date(), check_out.date())
}

pub fn validate_stay(check_in: NaiveDate, check_out: NaiveDate) -> Result<i64, InventoryError> {
    let n = nights(check_in, check_out);
    if n < 1 {
        return Err(InventoryError::InvalidDateRange {
            check_in,
            check_out,
        });
    }
    Ok(n)
}

pub fn cost(price_per_night: f64, check_in: NaiveDate, check_out: NaiveDate) -> Result<f64, InventoryError> {
    let n = validate_stay(check_in, check_out)?;
    Ok(price_per_night * n as f64)
}
