// Ledger services
pub mod movements;
pub mod products;
pub mod stock;
pub mod suppliers;

// Reporting
pub mod reports;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::errors::ServiceError;

/// One page of a list request. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Zero-based row offset, saturating for out-of-range pages
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Row offset if it fits a signed 64-bit SQL `OFFSET`
    pub fn checked_offset(&self) -> Option<u64> {
        self.page
            .saturating_sub(1)
            .checked_mul(self.page_size)
            .filter(|offset| i64::try_from(*offset).is_ok())
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

/// A page of results along with the unpaginated total.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}

/// Trims a required text field, rejecting blank input.
pub(crate) fn required_text(field: &str, value: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::ValidationError(format!(
            "{} is required",
            field
        )));
    }
    Ok(trimmed.to_string())
}

/// Trims optional text, mapping blank input to `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Prices are non-negative and in whole cents, so `quantity × price` is exact.
pub(crate) fn ensure_price(field: &str, value: Decimal) -> Result<(), ServiceError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ServiceError::ValidationError(format!(
            "{} must be greater than or equal to 0",
            field
        )));
    }
    if value.normalize().scale() > 2 {
        return Err(ServiceError::ValidationError(format!(
            "{} must have at most 2 decimal places",
            field
        )));
    }
    Ok(())
}

/// Parses a movement date given as an RFC 3339 timestamp or a bare `YYYY-MM-DD`
/// (midnight UTC).
pub fn parse_movement_date(raw: &str) -> Result<DateTime<Utc>, ServiceError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(start_of_day)
        .map_err(|_| ServiceError::ValidationError(format!("Invalid date: {}", raw)))
}

/// Parses a filter day (`YYYY-MM-DD`, or the date part of an RFC 3339 timestamp).
pub fn parse_filter_day(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, ServiceError> {
    let raw = match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(None),
    };
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(day));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| Some(ts.with_timezone(&Utc).date_naive()))
        .map_err(|_| ServiceError::ValidationError(format!("Invalid {}: {}", field, raw)))
}

pub(crate) fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Inclusive calendar-day range turned into `[start, end)` instants.
pub(crate) fn day_bounds(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    (
        start.map(start_of_day),
        end.and_then(|d| d.succ_opt()).map(start_of_day),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_clamps_to_first_page() {
        let page = PageRequest::new(0, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 1);
        assert_eq!(PageRequest::new(3, 20).offset(), 40);
    }

    #[test]
    fn offset_never_overflows() {
        let page = PageRequest::new(u64::MAX, 20);
        assert_eq!(page.offset(), u64::MAX);
        assert_eq!(page.checked_offset(), None);
        assert_eq!(PageRequest::new(3, 20).checked_offset(), Some(40));
    }

    #[test]
    fn movement_date_accepts_both_formats() {
        let day = parse_movement_date("2024-03-05").unwrap();
        assert_eq!(day.to_rfc3339(), "2024-03-05T00:00:00+00:00");

        let ts = parse_movement_date("2024-03-05T10:30:00+08:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-05T02:30:00+00:00");

        assert!(parse_movement_date("05/03/2024").is_err());
    }

    #[test]
    fn filter_days_tolerate_blank_input() {
        assert_eq!(parse_filter_day("startDate", Some("")).unwrap(), None);
        assert_eq!(
            parse_filter_day("startDate", Some("2024-02-29")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert!(parse_filter_day("endDate", Some("yesterday")).is_err());
    }

    #[test]
    fn day_bounds_cover_the_whole_end_day() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1);
        let end = NaiveDate::from_ymd_opt(2024, 1, 31);
        let (from, to) = day_bounds(start, end);
        assert_eq!(from.unwrap().to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(to.unwrap().to_rfc3339(), "2024-02-01T00:00:00+00:00");
    }

    #[test]
    fn blank_text_is_rejected_or_dropped() {
        assert!(required_text("name", "   ").is_err());
        assert_eq!(required_text("name", " 可乐 ").unwrap(), "可乐");
        assert_eq!(optional_text(Some("  ".into())), None);
    }

    #[test]
    fn negative_prices_are_rejected() {
        assert!(ensure_price("price", Decimal::new(-1, 2)).is_err());
        assert!(ensure_price("price", Decimal::ZERO).is_ok());
        assert!(ensure_price("price", Decimal::new(333, 3)).is_err());
        assert!(ensure_price("price", Decimal::new(2500, 3)).is_ok());
    }
}
