//! Mission definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::requirement::Requirement;
use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionType {
    Daily,
    Weekly,
    /// Permanent storyline missions
    Narrative,
    /// Seasonal missions with a validity window
    Event,
}

impl MissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Narrative => "narrative",
            Self::Event => "event",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "narrative" => Some(Self::Narrative),
            "event" => Some(Self::Event),
            _ => None,
        }
    }
}

/// How often progress for a mission is zeroed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetCadence {
    Daily,
    Weekly,
    Monthly,
    Never,
}

impl ResetCadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Never => "never",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "never" => Some(Self::Never),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResetCadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A completable task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    pub title: String,
    pub mission_type: MissionType,
    pub xp_reward: u32,
    pub badge_reward: Option<String>,
    pub requirement: Requirement,
    pub reset_cadence: ResetCadence,
    pub active: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl Mission {
    /// Progress needed to complete the mission
    pub fn target(&self) -> u32 {
        self.requirement.target()
    }

    /// Active and inside its validity window at `now`
    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        self.active
            && self.starts_at.is_none_or(|start| now >= start)
            && self.ends_at.is_none_or(|end| now < end)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| EngineError::InvalidMission {
            id: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id must not be empty"));
        }
        if let (Some(start), Some(end)) = (self.starts_at, self.ends_at) {
            if end <= start {
                return Err(invalid("validity window ends before it starts"));
            }
        }
        match (self.mission_type, self.reset_cadence) {
            (MissionType::Daily, cadence) if cadence != ResetCadence::Daily => {
                return Err(invalid("daily missions must reset daily"));
            }
            (MissionType::Weekly, cadence) if cadence != ResetCadence::Weekly => {
                return Err(invalid("weekly missions must reset weekly"));
            }
            (MissionType::Narrative, cadence) if cadence != ResetCadence::Never => {
                return Err(invalid("narrative missions never reset"));
            }
            _ => {}
        }
        self.requirement.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Action;
    use chrono::TimeZone;

    fn mission() -> Mission {
        Mission {
            id: "m_reviews".to_string(),
            title: "Write reviews".to_string(),
            mission_type: MissionType::Event,
            xp_reward: 50,
            badge_reward: None,
            requirement: Requirement::count(Action::WriteReview, 5),
            reset_cadence: ResetCadence::Never,
            active: true,
            starts_at: Some(Utc.with_ymd_and_hms(2026, 12, 1, 0, 0, 0).unwrap()),
            ends_at: Some(Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_validity_window() {
        let m = mission();
        assert!(!m.is_available(Utc.with_ymd_and_hms(2026, 11, 30, 23, 59, 59).unwrap()));
        assert!(m.is_available(Utc.with_ymd_and_hms(2026, 12, 1, 0, 0, 0).unwrap()));
        assert!(!m.is_available(Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap()));

        let inactive = Mission { active: false, ..m };
        assert!(!inactive.is_available(Utc.with_ymd_and_hms(2026, 12, 5, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_type_and_cadence_must_agree() {
        let daily_never = Mission {
            mission_type: MissionType::Daily,
            ..mission()
        };
        assert!(daily_never.validate().is_err());

        let narrative = Mission {
            mission_type: MissionType::Narrative,
            starts_at: None,
            ends_at: None,
            ..mission()
        };
        assert!(narrative.validate().is_ok());
    }

    #[test]
    fn test_inverted_window_is_rejected() {
        let m = mission();
        let inverted = Mission {
            starts_at: m.ends_at,
            ends_at: m.starts_at,
            ..m
        };
        assert!(inverted.validate().is_err());
    }
}
