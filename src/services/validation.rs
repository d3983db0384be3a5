use crate::error::{AppError, AppResult};

pub const MAX_TITLE_LEN: usize = 128;
pub const MAX_DESCRIPTION_LEN: usize = 512;
pub const MIN_NAME_LEN: usize = 2;
pub const MAX_NAME_LEN: usize = 64;
pub const USER_ID_LEN: usize = 36;

/// Trims `value` and checks its length in characters.
pub fn text(value: &str, field: &str, min: usize, max: usize) -> AppResult<String> {
    let value = value.trim();
    let len = value.chars().count();
    if len < min || len > max {
        return Err(AppError::invalid(if min == 0 {
            format!("{field} must be at most {max} characters")
        } else {
            format!("{field} must be between {min} and {max} characters")
        }));
    }
    Ok(value.to_string())
}

pub fn user_id(value: &str, field: &str) -> AppResult<String> {
    let value = value.trim();
    if value.chars().count() != USER_ID_LEN {
        return Err(AppError::invalid(format!(
            "{field} must be a {USER_ID_LEN}-character id"
        )));
    }
    Ok(value.to_string())
}

/// Accepts `YYYY-MM-DD`, optionally followed by a `T` or space and a time.
///
/// Dates are stored as text; once this holds, string order is date order.
pub fn date(value: &str, field: &str) -> AppResult<String> {
    let value = value.trim();
    let bytes = value.as_bytes();
    let shaped = bytes.len() >= 10
        && bytes[..10].iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
        && (bytes.len() == 10 || matches!(bytes[10], b'T' | b' '));
    if !shaped {
        return Err(AppError::invalid(format!(
            "{field} must be an ISO 8601 date"
        )));
    }

    let month: u32 = value[5..7].parse().unwrap_or(0);
    let day: u32 = value[8..10].parse().unwrap_or(0);
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(AppError::invalid(format!("{field} is not a valid date")));
    }
    Ok(value.to_string())
}

pub fn date_range(start_at: &str, end_at: &str) -> AppResult<()> {
    if start_at > end_at {
        return Err(AppError::invalid("startAt must not be after endAt"));
    }
    Ok(())
}

pub fn non_negative(value: i64, field: &str) -> AppResult<i64> {
    if value < 0 {
        return Err(AppError::invalid(format!("{field} must not be negative")));
    }
    Ok(value)
}
