use crate::error::{ProcessingError, Result};
use crate::models::{CountryDailyMean, MonthlyMean};
use crate::processors::MeanAccumulator;
use crate::utils::dates::{add_months_end, month_end, months_between};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Date-ordered daily series of one country.
pub fn country_series(rows: &[CountryDailyMean], country: &str) -> Result<Vec<(NaiveDate, f64)>> {
    let mut series: Vec<(NaiveDate, f64)> = rows
        .iter()
        .filter(|row| row.country == country)
        .map(|row| (row.date, row.xco2))
        .collect();

    if series.is_empty() {
        return Err(ProcessingError::CountryNotFound {
            country: country.to_string(),
        });
    }

    series.sort_by_key(|(date, _)| *date);
    Ok(series)
}

/// Calendar-month means from the first to the last observed month. Months
/// without observations are kept as gaps rather than interpolated.
pub fn monthly_means(series: &[(NaiveDate, f64)]) -> Vec<MonthlyMean> {
    let mut months: BTreeMap<NaiveDate, MeanAccumulator> = BTreeMap::new();
    for &(date, value) in series {
        months.entry(month_end(date)).or_default().add(value);
    }

    let (Some(&first), Some(&last)) = (months.keys().next(), months.keys().next_back()) else {
        return Vec::new();
    };

    (0..=months_between(first, last).max(0) as u32)
        .map(|offset| {
            let label = add_months_end(first, offset);
            MonthlyMean {
                month_end: label,
                xco2: months.get(&label).and_then(|acc| acc.mean()),
            }
        })
        .collect()
}
