use serde::{Deserialize, Serialize};

/// Risk forecast for the jurisdiction, produced by the generative
/// forecasting collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Risk level for the next 3 days (e.g. "High Risk")
    pub three_day: String,

    /// Brief summary for the 3-day outlook
    pub three_day_summary: String,

    /// Risk level for the next 7 days
    pub seven_day: String,

    /// Brief summary for the 7-day outlook
    pub seven_day_summary: String,
}

impl Forecast {
    /// The degraded placeholder used when no areas are spiking or the
    /// collaborator is unavailable. Collaborator failures must never
    /// block or corrupt a computed analysis.
    pub fn low_risk() -> Self {
        Self {
            three_day: "Low Risk".to_string(),
            three_day_summary: "No major spikes detected.".to_string(),
            seven_day: "Low Risk".to_string(),
            seven_day_summary: "Trends appear stable.".to_string(),
        }
    }
}

/// A single prioritized intervention recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Specific, actionable step (e.g. "Deploy 2 mobile teams to 46619")
    pub action: String,

    /// Why this action is recommended
    pub rationale: String,

    /// Urgency score from 1 to 100
    pub priority_score: u8,
}

/// A recommendation as persisted in a snapshot, carrying its completion
/// state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecommendation {
    #[serde(flatten)]
    pub recommendation: Recommendation,

    /// Whether the responding team has marked this action done
    pub completed: bool,
}

impl From<Recommendation> for StoredRecommendation {
    fn from(recommendation: Recommendation) -> Self {
        Self {
            recommendation,
            completed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_risk_placeholder() {
        let forecast = Forecast::low_risk();
        assert_eq!(forecast.three_day, "Low Risk");
        assert_eq!(forecast.seven_day, "Low Risk");
    }

    #[test]
    fn test_stored_recommendation_starts_incomplete() {
        let stored: StoredRecommendation = Recommendation {
            action: "Deploy mobile team".to_string(),
            rationale: "Incidents up 42% vs baseline".to_string(),
            priority_score: 90,
        }
        .into();

        assert!(!stored.completed);
        assert_eq!(stored.recommendation.priority_score, 90);
    }

    #[test]
    fn test_stored_recommendation_flattens() {
        let stored: StoredRecommendation = Recommendation {
            action: "a".to_string(),
            rationale: "r".to_string(),
            priority_score: 10,
        }
        .into();

        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["action"], "a");
        assert_eq!(json["completed"], false);
    }
}
