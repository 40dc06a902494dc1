use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
};

use crate::error::ApiError;

pub const ADULT_AGE: i32 = 18;

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (its calendar date is used).
pub fn parse_birth_date(raw: &str) -> Result<Date, ApiError> {
    let raw = raw.trim();
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .or_else(|_| OffsetDateTime::parse(raw, &Rfc3339).map(|dt| dt.date()))
        .map_err(|_| ApiError::validation("Invalid date of birth"))
}

/// Whole years between `dob` and `today`. A birthday falling on `today`
/// counts as already reached.
pub fn age_on(dob: Date, today: Date) -> i32 {
    let mut age = today.year() - dob.year();
    if (today.month() as u8, today.day()) < (dob.month() as u8, dob.day()) {
        age -= 1;
    }
    age
}

pub fn is_at_least_18(dob: Date, today: Date) -> bool {
    age_on(dob, today) >= ADULT_AGE
}

pub fn is_adult_today(dob: Date) -> bool {
    is_at_least_18(dob, OffsetDateTime::now_utc().date())
}
