//! Statistical helpers for incident analytics

use crate::models::{DailyCounts, Incident, RollingStats};
use chrono::{Duration, NaiveDate};

/// Tally incidents into per-date counts.
///
/// Each incident's timestamp is normalized to its UTC calendar date via
/// [`Incident::occurred_on`]. Dates with no incidents are absent from
/// the map; gap-filling happens in the rolling-window step, not here.
/// An empty input yields an empty map.
pub fn daily_counts<'a, I>(incidents: I) -> DailyCounts
where
    I: IntoIterator<Item = &'a Incident>,
{
    let mut counts = DailyCounts::new();
    for incident in incidents {
        *counts.entry(incident.occurred_on()).or_insert(0) += 1;
    }
    counts
}

/// Mean and standard deviation of daily counts over the trailing
/// `window_days` ending at `end` (inclusive).
///
/// Days absent from `counts` contribute zero, so the series always has
/// exactly `window_days` samples. The standard deviation uses sample
/// variance (divide by N−1); a series with fewer than 2 samples yields
/// `std_dev = 0`, and a zero-length window yields all zeros.
pub fn rolling_stats(counts: &DailyCounts, end: NaiveDate, window_days: u32) -> RollingStats {
    if window_days == 0 {
        return RollingStats {
            mean: 0.0,
            std_dev: 0.0,
        };
    }

    let values: Vec<f64> = (0..window_days)
        .map(|i| {
            let date = end - Duration::days(i64::from(i));
            counts.get(&date).copied().unwrap_or(0) as f64
        })
        .collect();

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;

    if values.len() < 2 {
        return RollingStats { mean, std_dev: 0.0 };
    }

    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);

    RollingStats {
        mean,
        std_dev: variance.sqrt(),
    }
}

/// Mean daily count over the trailing `period_days` ending at `end`
/// (inclusive), with absent days contributing zero.
///
/// Callers must pass a positive period; a zero period yields 0.0.
pub fn period_average(counts: &DailyCounts, end: NaiveDate, period_days: u32) -> f64 {
    if period_days == 0 {
        return 0.0;
    }

    let sum: u64 = (0..period_days)
        .map(|i| {
            let date = end - Duration::days(i64::from(i));
            counts.get(&date).copied().unwrap_or(0)
        })
        .sum();

    sum as f64 / f64::from(period_days)
}
