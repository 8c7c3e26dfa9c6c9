use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, Utc};

use crate::error::{ProcessingError, Result};

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Month end `months` months after the month ending at `month_end_date`.
pub fn add_months_end(month_end_date: NaiveDate, months: u32) -> NaiveDate {
    let first = month_end_date.with_day(1).unwrap_or(month_end_date);
    first
        .checked_add_months(Months::new(months))
        .map(month_end)
        .unwrap_or(month_end_date)
}

/// Whole months from the month of `start` to the month of `end`.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32
}

/// Time unit of a CF-convention `units` attribute, e.g. `seconds since 1970-01-01 00:00:00`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CfTimeUnits {
    pub seconds_per_unit: f64,
    pub epoch: NaiveDateTime,
}

impl CfTimeUnits {
    pub fn parse(units: &str) -> Result<Self> {
        let (unit, epoch) = units.split_once(" since ").ok_or_else(|| {
            ProcessingError::InvalidFormat(format!("Unrecognised time units: '{}'", units))
        })?;

        let seconds_per_unit = match unit.trim().to_ascii_lowercase().as_str() {
            "seconds" | "second" | "s" => 1.0,
            "minutes" | "minute" => 60.0,
            "hours" | "hour" | "h" => 3600.0,
            "days" | "day" | "d" => 86_400.0,
            other => {
                return Err(ProcessingError::InvalidFormat(format!(
                    "Unsupported time unit: '{}'",
                    other
                )))
            }
        };

        let epoch = epoch.trim().trim_end_matches(" UTC").trim_end_matches('Z');
        let epoch = NaiveDateTime::parse_from_str(epoch, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(epoch, "%Y-%m-%dT%H:%M:%S"))
            .or_else(|_| {
                NaiveDate::parse_from_str(epoch, "%Y-%m-%d")
                    .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
            })?;

        Ok(Self {
            seconds_per_unit,
            epoch,
        })
    }

    /// Decodes an offset into a UTC timestamp. Non-finite offsets yield `None`.
    pub fn decode(&self, offset: f64) -> Option<DateTime<Utc>> {
        if !offset.is_finite() {
            return None;
        }
        let millis = (offset * self.seconds_per_unit * 1000.0).round() as i64;
        self.epoch
            .checked_add_signed(Duration::milliseconds(millis))
            .map(|t| t.and_utc())
    }
}

impl Default for CfTimeUnits {
    fn default() -> Self {
        Self {
            seconds_per_unit: 1.0,
            epoch: DateTime::<Utc>::UNIX_EPOCH.naive_utc(),
        }
    }
}
