pub mod analysis;
pub mod forecast;
pub mod incident;

pub use analysis::{
    AnalysisResult, AnalysisSnapshot, AreaAnalysis, DailyCounts, RollingStats, Severity,
};
pub use forecast::{Forecast, Recommendation, StoredRecommendation};
pub use incident::{Incident, Outcome, AREA_CODE_RE};
