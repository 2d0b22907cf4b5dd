use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};
use validator::Validate;

/// Area codes are 5-digit postal codes identifying a geographic
/// reporting unit.
pub static AREA_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}$").unwrap());

/// One observed overdose event.
///
/// Incidents are immutable once created; the system only ever appends
/// new records, it never edits or removes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Incident {
    /// When the overdose occurred (UTC)
    pub date_time: DateTime<Utc>,

    /// 5-digit postal code of the reporting area
    #[validate(regex(path = *AREA_CODE_RE, message = "must be exactly 5 digits"))]
    pub area_code: String,

    /// Whether naloxone was administered on scene
    pub naloxone_administered: bool,

    /// Number of naloxone doses administered
    pub naloxone_doses: u32,

    /// Outcome of the incident
    pub outcome: Outcome,
}

impl Incident {
    /// Create a new incident record
    pub fn new(
        date_time: DateTime<Utc>,
        area_code: String,
        naloxone_administered: bool,
        naloxone_doses: u32,
        outcome: Outcome,
    ) -> Self {
        Self {
            date_time,
            area_code,
            naloxone_administered,
            naloxone_doses,
            outcome,
        }
    }

    /// The UTC calendar date this incident is bucketed under.
    ///
    /// This is the single normalization rule used everywhere in the
    /// analytics pipeline, for freshly parsed and deserialized
    /// timestamps alike.
    pub fn occurred_on(&self) -> NaiveDate {
        self.date_time.date_naive()
    }

    /// Check if the outcome was fatal
    pub fn is_fatal(&self) -> bool {
        self.outcome == Outcome::Fatal
    }
}

/// Categorical incident outcome.
///
/// The analytics pipeline only distinguishes `Fatal` from everything
/// else; unrecognized outcome strings are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(from = "String", into = "String")]
pub enum Outcome {
    Fatal,
    #[strum(serialize = "Non-Fatal")]
    NonFatal,
    #[strum(default)]
    Other(String),
}

impl From<String> for Outcome {
    fn from(s: String) -> Self {
        // The catch-all variant makes parsing infallible
        Outcome::from_str(&s).unwrap_or(Outcome::Other(s))
    }
}

impl From<Outcome> for String {
    fn from(outcome: Outcome) -> Self {
        outcome.to_string()
    }
}
