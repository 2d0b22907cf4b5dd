use crate::models::forecast::{Forecast, StoredRecommendation};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

/// Incident count per UTC calendar date.
///
/// Keys are present only for dates with at least one incident; absent
/// dates implicitly mean zero. The ordered map keeps serialized output
/// deterministic.
pub type DailyCounts = BTreeMap<NaiveDate, u64>;

/// Mean and standard deviation of daily counts over a fixed trailing
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingStats {
    pub mean: f64,
    pub std_dev: f64,
}

/// Discrete risk tier for a reporting area, most urgent first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, EnumString, Display)]
pub enum Severity {
    Critical,
    High,
    Moderate,
    Watch,
    None,
}

impl Severity {
    /// Get numeric priority (lower is more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Moderate => 2,
            Severity::Watch => 3,
            Severity::None => 4,
        }
    }

    /// Check if this tier warrants forecasting and intervention
    /// recommendations
    pub fn is_elevated(&self) -> bool {
        matches!(self, Severity::Critical | Severity::High)
    }
}

/// Derived statistics for a single reporting area.
///
/// Recomputed from scratch on every analysis run; never mutated
/// incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaAnalysis {
    /// 5-digit postal code of the area
    pub area_code: String,

    /// All-time incident count for the area
    pub total_incidents: u64,

    /// Mean daily count over the trailing 7 days
    pub current_7_day_avg: f64,

    /// Mean daily count over the trailing 28-day baseline window
    pub rolling_28_day_mean: f64,

    /// Standard deviation of daily counts over the baseline window
    pub rolling_28_day_std_dev: f64,

    /// Z-score of the 7-day average against the 28-day baseline
    pub std_devs_from_mean: f64,

    /// Classified risk tier
    pub severity: Severity,

    /// Daily incident counts for the area
    pub daily_counts: DailyCounts,
}

/// Top-level analysis snapshot for the whole jurisdiction.
///
/// The sole output of the analytics engine and the unit persisted and
/// cached by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// All-time incident count
    pub total_incidents: u64,

    /// Incidents in the trailing 7 days
    pub total_last_7_days: u64,

    /// Percent change of the trailing 7 days vs the prior 7-day window.
    /// Reported as a flat +100% when the prior window had no incidents
    /// but the current one does, and 0 when both are empty.
    pub percent_change_last_7_days: f64,

    /// County-wide daily incident counts
    pub county_daily_counts: DailyCounts,

    /// County-wide 28-day rolling mean
    pub county_rolling_28_day_mean: f64,

    /// County-wide 28-day rolling standard deviation
    pub county_rolling_28_day_std_dev: f64,

    /// Per-area analyses, one entry per distinct area code in the
    /// input, ordered by area code
    pub area_analyses: Vec<AreaAnalysis>,
}

impl AnalysisResult {
    /// The canonical zero-value result returned for an empty incident
    /// set.
    pub fn empty() -> Self {
        Self {
            total_incidents: 0,
            total_last_7_days: 0,
            percent_change_last_7_days: 0.0,
            county_daily_counts: DailyCounts::new(),
            county_rolling_28_day_mean: 0.0,
            county_rolling_28_day_std_dev: 0.0,
            area_analyses: Vec::new(),
        }
    }

    /// Areas classified `Critical` or `High`, in area-code order
    pub fn elevated_areas(&self) -> Vec<&AreaAnalysis> {
        self.area_analyses
            .iter()
            .filter(|a| a.severity.is_elevated())
            .collect()
    }
}

/// The persisted dashboard snapshot: analysis plus the forecast and
/// recommendations generated from it, keyed by user in the snapshot
/// store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub analysis: AnalysisResult,
    pub forecast: Forecast,
    pub recommendations: Vec<StoredRecommendation>,
    pub created_at: DateTime<Utc>,
}
