//! Incident analytics engine
//!
//! Transforms a raw incident collection into the per-area and
//! county-wide analysis snapshot: daily bucketing, rolling baseline
//! statistics, deviation scores and severity classification.

use crate::analytics::error::{AnalyticsError, AnalyticsResult};
use crate::analytics::statistics::{daily_counts, period_average, rolling_stats};
use crate::models::{AnalysisResult, AreaAnalysis, Incident, Severity};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Z-score thresholds of the published severity scale, evaluated in
/// order with first match winning.
const CRITICAL_Z_SCORE: f64 = 3.0;
const HIGH_Z_SCORE: f64 = 2.0;
const MODERATE_Z_SCORE: f64 = 1.5;
const WATCH_Z_SCORE: f64 = 1.0;

/// Fatality-rate override: an area whose trailing-7-day fatal share
/// strictly exceeds this percentage is Critical regardless of z-score.
const CRITICAL_FATAL_PERCENT: f64 = 20.0;

/// Configuration for the analytics engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Trailing baseline window length in days
    #[serde(default = "default_baseline_window_days")]
    pub baseline_window_days: u32,

    /// Trailing current-period length in days
    #[serde(default = "default_current_period_days")]
    pub current_period_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            baseline_window_days: default_baseline_window_days(),
            current_period_days: default_current_period_days(),
        }
    }
}

impl EngineConfig {
    /// Validate window lengths.
    ///
    /// A baseline window needs at least 2 samples for a standard
    /// deviation to be meaningful, and the current period must be
    /// non-empty.
    pub fn validate(&self) -> AnalyticsResult<()> {
        if self.baseline_window_days < 2 {
            return Err(AnalyticsError::InvalidConfiguration(format!(
                "baseline_window_days must be at least 2, got {}",
                self.baseline_window_days
            )));
        }
        if self.current_period_days < 1 {
            return Err(AnalyticsError::InvalidConfiguration(
                "current_period_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_baseline_window_days() -> u32 {
    28
}

fn default_current_period_days() -> u32 {
    7
}

/// The incident analytics engine.
///
/// A pure, synchronous computation over its input: no I/O, no shared
/// state, no mutation of the incident collection. Re-running on the
/// same input with the same reference instant produces identical
/// output, which is what makes caller-side caching of the result safe.
pub struct AnalyticsEngine {
    config: EngineConfig,
}

impl AnalyticsEngine {
    /// Create a new engine, rejecting unusable window lengths
    pub fn new(config: EngineConfig) -> AnalyticsResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create with the default 28-day baseline and 7-day current period
    pub fn with_defaults() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze an incident collection using the current processing time
    /// as the reference instant.
    pub fn analyze(&self, incidents: &[Incident]) -> AnalysisResult {
        self.analyze_at(incidents, Utc::now())
    }

    /// Analyze an incident collection against an explicit reference
    /// instant.
    ///
    /// The reference instant is captured once and threaded through
    /// every window computation, so a single invocation is internally
    /// consistent and repeat invocations are reproducible.
    pub fn analyze_at(&self, incidents: &[Incident], now: DateTime<Utc>) -> AnalysisResult {
        if incidents.is_empty() {
            return AnalysisResult::empty();
        }

        let today = now.date_naive();
        let period = i64::from(self.config.current_period_days);
        let period_start = now - Duration::days(period);
        let prior_period_start = now - Duration::days(period * 2);

        let total_last_7_days = incidents
            .iter()
            .filter(|i| i.date_time >= period_start)
            .count() as u64;
        let total_prior_7_days = incidents
            .iter()
            .filter(|i| i.date_time >= prior_period_start && i.date_time < period_start)
            .count() as u64;

        // Going from zero prior-week incidents to any incidents this
        // week reports a flat +100%, not an unbounded ratio.
        let percent_change_last_7_days = if total_prior_7_days > 0 {
            (total_last_7_days as f64 - total_prior_7_days as f64) / total_prior_7_days as f64
                * 100.0
        } else if total_last_7_days > 0 {
            100.0
        } else {
            0.0
        };

        let county_daily_counts = daily_counts(incidents);
        let county_stats = rolling_stats(
            &county_daily_counts,
            today,
            self.config.baseline_window_days,
        );

        // Partition by area code. The ordered map makes grouping
        // insertion-order-independent and the output deterministic.
        let mut groups: BTreeMap<&str, Vec<&Incident>> = BTreeMap::new();
        for incident in incidents {
            groups
                .entry(incident.area_code.as_str())
                .or_default()
                .push(incident);
        }

        // Per-area computations are independent; fan out and reassemble
        // in area-code order once all of them complete.
        let groups: Vec<(&str, Vec<&Incident>)> = groups.into_iter().collect();
        let area_analyses: Vec<AreaAnalysis> = groups
            .into_par_iter()
            .map(|(area_code, members)| self.analyze_area(area_code, &members, today, period_start))
            .collect();

        AnalysisResult {
            total_incidents: incidents.len() as u64,
            total_last_7_days,
            percent_change_last_7_days,
            county_daily_counts,
            county_rolling_28_day_mean: county_stats.mean,
            county_rolling_28_day_std_dev: county_stats.std_dev,
            area_analyses,
        }
    }

    fn analyze_area(
        &self,
        area_code: &str,
        incidents: &[&Incident],
        today: NaiveDate,
        period_start: DateTime<Utc>,
    ) -> AreaAnalysis {
        let counts = daily_counts(incidents.iter().copied());
        let stats = rolling_stats(&counts, today, self.config.baseline_window_days);
        let current_avg = period_average(&counts, today, self.config.current_period_days);

        let std_devs_from_mean = if stats.std_dev > 0.0 {
            (current_avg - stats.mean) / stats.std_dev
        } else {
            0.0
        };

        let recent_total = incidents
            .iter()
            .filter(|i| i.date_time >= period_start)
            .count();
        let recent_fatal = incidents
            .iter()
            .filter(|i| i.date_time >= period_start && i.is_fatal())
            .count();
        let fatal_outcome_percent = if recent_total > 0 {
            recent_fatal as f64 / recent_total as f64 * 100.0
        } else {
            0.0
        };

        AreaAnalysis {
            area_code: area_code.to_string(),
            total_incidents: incidents.len() as u64,
            current_7_day_avg: current_avg,
            rolling_28_day_mean: stats.mean,
            rolling_28_day_std_dev: stats.std_dev,
            std_devs_from_mean,
            severity: classify_severity(std_devs_from_mean, fatal_outcome_percent),
            daily_counts: counts,
        }
    }
}

/// Classify an area's risk tier from its deviation score and
/// trailing-7-day fatality rate. Thresholds are evaluated in order;
/// the first match wins.
pub fn classify_severity(std_devs_from_mean: f64, fatal_outcome_percent: f64) -> Severity {
    if std_devs_from_mean >= CRITICAL_Z_SCORE || fatal_outcome_percent > CRITICAL_FATAL_PERCENT {
        Severity::Critical
    } else if std_devs_from_mean >= HIGH_Z_SCORE {
        Severity::High
    } else if std_devs_from_mean >= MODERATE_Z_SCORE {
        Severity::Moderate
    } else if std_devs_from_mean >= WATCH_Z_SCORE {
        Severity::Watch
    } else {
        Severity::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Outcome;
    use chrono::TimeZone;

    fn incident(date_time: DateTime<Utc>, area_code: &str, outcome: Outcome) -> Incident {
        Incident::new(date_time, area_code.to_string(), false, 0, outcome)
    }

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 30, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert!(EngineConfig::default().validate().is_ok());

        let too_small = EngineConfig {
            baseline_window_days: 1,
            current_period_days: 7,
        };
        assert!(AnalyticsEngine::new(too_small).is_err());

        let empty_period = EngineConfig {
            baseline_window_days: 28,
            current_period_days: 0,
        };
        assert!(AnalyticsEngine::new(empty_period).is_err());
    }

    #[test]
    fn test_empty_input_returns_zero_snapshot() {
        let engine = AnalyticsEngine::with_defaults();
        let result = engine.analyze_at(&[], reference());
        assert_eq!(result, AnalysisResult::empty());
    }

    #[test]
    fn test_area_coverage_is_exact() {
        let now = reference();
        let incidents = vec![
            incident(now - Duration::days(1), "46619", Outcome::NonFatal),
            incident(now - Duration::days(2), "46601", Outcome::NonFatal),
            incident(now - Duration::days(3), "46619", Outcome::Fatal),
            incident(now - Duration::days(4), "46628", Outcome::NonFatal),
            incident(now - Duration::days(5), "46601", Outcome::NonFatal),
        ];

        let engine = AnalyticsEngine::with_defaults();
        let result = engine.analyze_at(&incidents, now);

        let codes: Vec<&str> = result
            .area_analyses
            .iter()
            .map(|a| a.area_code.as_str())
            .collect();
        assert_eq!(codes, vec!["46601", "46619", "46628"]);

        let area = result
            .area_analyses
            .iter()
            .find(|a| a.area_code == "46619")
            .unwrap();
        assert_eq!(area.total_incidents, 2);
    }

    #[test]
    fn test_determinism() {
        let now = reference();
        let incidents: Vec<Incident> = (0..40i64)
            .map(|i| {
                let area = if i % 3 == 0 { "46619" } else { "46601" };
                let outcome = if i % 7 == 0 {
                    Outcome::Fatal
                } else {
                    Outcome::NonFatal
                };
                incident(now - Duration::hours(i * 13), area, outcome)
            })
            .collect();

        let engine = AnalyticsEngine::with_defaults();
        let first = engine.analyze_at(&incidents, now);
        let second = engine.analyze_at(&incidents, now);
        assert_eq!(first, second);

        // Input order must not matter either
        let mut reversed = incidents.clone();
        reversed.reverse();
        let third = engine.analyze_at(&reversed, now);
        assert_eq!(first, third);
    }

    #[test]
    fn test_percent_change_discontinuity() {
        let now = reference();
        let engine = AnalyticsEngine::with_defaults();

        // 5 incidents this week, none the week before
        let incidents: Vec<Incident> = (0..5i64)
            .map(|i| incident(now - Duration::days(i), "46619", Outcome::NonFatal))
            .collect();
        let result = engine.analyze_at(&incidents, now);
        assert_eq!(result.total_last_7_days, 5);
        assert_eq!(result.percent_change_last_7_days, 100.0);

        // No incidents in either window (one old incident keeps the
        // input non-empty)
        let old = vec![incident(
            now - Duration::days(60),
            "46619",
            Outcome::NonFatal,
        )];
        let result = engine.analyze_at(&old, now);
        assert_eq!(result.total_last_7_days, 0);
        assert_eq!(result.percent_change_last_7_days, 0.0);
    }

    #[test]
    fn test_percent_change_against_prior_week() {
        let now = reference();
        let engine = AnalyticsEngine::with_defaults();

        // 6 incidents this week, 4 the week before: +50%
        let mut incidents = Vec::new();
        for i in 0..6i64 {
            incidents.push(incident(now - Duration::hours(i * 20), "46619", Outcome::NonFatal));
        }
        for i in 0..4i64 {
            incidents.push(incident(
                now - Duration::days(8) - Duration::hours(i * 10),
                "46619",
                Outcome::NonFatal,
            ));
        }

        let result = engine.analyze_at(&incidents, now);
        assert_eq!(result.total_last_7_days, 6);
        assert!((result.percent_change_last_7_days - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_severity_boundaries() {
        assert_eq!(classify_severity(3.0, 0.0), Severity::Critical);
        assert_eq!(classify_severity(2.0, 0.0), Severity::High);
        assert_eq!(classify_severity(2.9, 0.0), Severity::High);
        assert_eq!(classify_severity(1.5, 0.0), Severity::Moderate);
        assert_eq!(classify_severity(1.0, 0.0), Severity::Watch);
        assert_eq!(classify_severity(0.99, 0.0), Severity::None);
        assert_eq!(classify_severity(-2.0, 0.0), Severity::None);
    }

    #[test]
    fn test_fatality_override() {
        // 30% fatal with no volume deviation is still Critical
        assert_eq!(classify_severity(0.0, 30.0), Severity::Critical);
        // Exactly 20% is not above the threshold
        assert_eq!(classify_severity(0.0, 20.0), Severity::None);
        // z = 3 is Critical regardless of fatality rate
        assert_eq!(classify_severity(3.0, 0.0), Severity::Critical);
    }

    #[test]
    fn test_fatality_rate_from_trailing_week() {
        let now = reference();
        let engine = AnalyticsEngine::with_defaults();

        // 3 of 10 incidents in the trailing 7 days are fatal (30%);
        // older fatal incidents are ignored by the override.
        let mut incidents = Vec::new();
        for i in 0..10u32 {
            let outcome = if i < 3 { Outcome::Fatal } else { Outcome::NonFatal };
            incidents.push(incident(
                now - Duration::hours(i64::from(i) * 16),
                "46619",
                outcome,
            ));
        }
        for i in 0..5i64 {
            incidents.push(incident(
                now - Duration::days(20 + i),
                "46619",
                Outcome::Fatal,
            ));
        }

        let result = engine.analyze_at(&incidents, now);
        let area = &result.area_analyses[0];
        assert_eq!(area.severity, Severity::Critical);
    }

    #[test]
    fn test_zero_std_dev_yields_zero_z_score() {
        let now = reference();
        let engine = AnalyticsEngine::with_defaults();

        // One incident every day for the whole baseline window: the
        // series is constant, so the z-score must be defined as 0.
        let incidents: Vec<Incident> = (0..28i64)
            .map(|i| incident(now - Duration::days(i), "46619", Outcome::NonFatal))
            .collect();

        let result = engine.analyze_at(&incidents, now);
        let area = &result.area_analyses[0];
        assert!(area.rolling_28_day_std_dev.abs() < 1e-9);
        assert_eq!(area.std_devs_from_mean, 0.0);
        assert_eq!(area.severity, Severity::None);
    }

    #[test]
    fn test_spike_scenario() {
        // 30 consecutive days in one area: 1 incident/day for days
        // 1..=27, then 8/day for the trailing 3 days, analyzed at the
        // end of day 30. The 28-day window covers days 3..=30.
        let now = Utc.with_ymd_and_hms(2024, 3, 30, 23, 0, 0).unwrap();
        let mut incidents = Vec::new();
        for day in 0..30i64 {
            let per_day = if day < 3 { 8 } else { 1 };
            for n in 0..per_day {
                incidents.push(incident(
                    now - Duration::days(day) - Duration::minutes(n * 17),
                    "46619",
                    Outcome::NonFatal,
                ));
            }
        }

        let engine = AnalyticsEngine::with_defaults();
        let result = engine.analyze_at(&incidents, now);

        assert_eq!(result.total_incidents, 51);
        assert_eq!(result.area_analyses.len(), 1);
        let area = &result.area_analyses[0];

        // Trailing 7 days: 4 days of 1 + 3 days of 8
        assert!((area.current_7_day_avg - 28.0 / 7.0).abs() < 1e-9);
        // 28-day window: 25 days of 1 + 3 days of 8
        assert!((area.rolling_28_day_mean - 49.0 / 28.0).abs() < 1e-9);
        // Sample std-dev of that series is ~2.20, putting the 7-day
        // average about one deviation above baseline
        assert!((area.rolling_28_day_std_dev - 2.2048).abs() < 1e-3);
        assert!(area.std_devs_from_mean >= 1.0);
        assert_ne!(area.severity, Severity::None);
    }

    #[test]
    fn test_county_and_area_stats_agree_for_single_area() {
        let now = reference();
        let engine = AnalyticsEngine::with_defaults();

        let incidents: Vec<Incident> = (0..14i64)
            .map(|i| incident(now - Duration::days(i % 7), "46619", Outcome::NonFatal))
            .collect();

        let result = engine.analyze_at(&incidents, now);
        let area = &result.area_analyses[0];
        assert_eq!(result.county_daily_counts, area.daily_counts);
        assert!((result.county_rolling_28_day_mean - area.rolling_28_day_mean).abs() < 1e-9);
        assert!(
            (result.county_rolling_28_day_std_dev - area.rolling_28_day_std_dev).abs() < 1e-9
        );
    }
}
