//! Structured mission requirements
//!
//! Missions used to carry free-form JSON interpreted per mission type.
//! Requirements are now a closed set of variants validated when the
//! mission is defined, so evaluation never has to guess.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A user action that can move mission progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    WriteReview,
    WriteMeaningfulReview,
    CheckIn,
    VerifiedCheckIn,
    /// Distinct establishments the user has checked in at
    VisitEstablishments,
    CastVote,
    ReceiveHelpfulVote,
    Follow,
    UploadPhoto,
    UploadHighResPhoto,
}

/// How progress for an action is tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tracking {
    /// Each event adds to the stored counter (`record_progress`)
    Counter,
    /// The producer supplies the authoritative total (`set_progress_absolute`)
    Absolute,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WriteReview => "write_review",
            Self::WriteMeaningfulReview => "write_meaningful_review",
            Self::CheckIn => "check_in",
            Self::VerifiedCheckIn => "verified_check_in",
            Self::VisitEstablishments => "visit_establishments",
            Self::CastVote => "cast_vote",
            Self::ReceiveHelpfulVote => "receive_helpful_vote",
            Self::Follow => "follow",
            Self::UploadPhoto => "upload_photo",
            Self::UploadHighResPhoto => "upload_high_res_photo",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|a| a.as_str() == s)
    }

    pub fn all() -> &'static [Action] {
        &[
            Self::WriteReview,
            Self::WriteMeaningfulReview,
            Self::CheckIn,
            Self::VerifiedCheckIn,
            Self::VisitEstablishments,
            Self::CastVote,
            Self::ReceiveHelpfulVote,
            Self::Follow,
            Self::UploadPhoto,
            Self::UploadHighResPhoto,
        ]
    }

    pub fn tracking(&self) -> Tracking {
        match self {
            Self::VisitEstablishments | Self::UploadPhoto | Self::UploadHighResPhoto => {
                Tracking::Absolute
            }
            _ => Tracking::Counter,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_target() -> u32 {
    1
}

/// What a user must do to complete a mission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    /// Perform `action` `target` times
    Count {
        action: Action,
        #[serde(default = "default_target")]
        target: u32,
    },
    /// Perform `action` on establishments of one category
    Category {
        action: Action,
        category: String,
        #[serde(default = "default_target")]
        target: u32,
    },
    /// Perform `action` on establishments inside one zone
    Zone {
        action: Action,
        zone: String,
        #[serde(default = "default_target")]
        target: u32,
    },
    /// Reach a producer-computed distinct total
    Distinct {
        action: Action,
        #[serde(default = "default_target")]
        target: u32,
    },
}

/// Establishment context attached to an action, used by filtered requirements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionContext {
    pub category: Option<String>,
    pub zone: Option<String>,
}

impl Requirement {
    pub fn count(action: Action, target: u32) -> Self {
        Self::Count { action, target }
    }

    pub fn action(&self) -> Action {
        match self {
            Self::Count { action, .. }
            | Self::Category { action, .. }
            | Self::Zone { action, .. }
            | Self::Distinct { action, .. } => *action,
        }
    }

    /// Required progress; never below 1
    pub fn target(&self) -> u32 {
        let target = match self {
            Self::Count { target, .. }
            | Self::Category { target, .. }
            | Self::Zone { target, .. }
            | Self::Distinct { target, .. } => *target,
        };
        target.max(1)
    }

    /// Whether an occurrence of `action` in `context` counts towards this requirement
    pub fn applies_to(&self, action: Action, context: &ActionContext) -> bool {
        if self.action() != action {
            return false;
        }
        match self {
            Self::Count { .. } | Self::Distinct { .. } => true,
            Self::Category { category, .. } => context
                .category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category)),
            Self::Zone { zone, .. } => context
                .zone
                .as_deref()
                .is_some_and(|z| z.eq_ignore_ascii_case(zone)),
        }
    }

    /// Reject combinations the engine cannot evaluate
    pub fn validate(&self) -> Result<()> {
        let tracking = self.action().tracking();
        match self {
            Self::Count { target: 0, .. }
            | Self::Category { target: 0, .. }
            | Self::Zone { target: 0, .. }
            | Self::Distinct { target: 0, .. } => Err(EngineError::InvalidRequirement(
                "target must be at least 1".to_string(),
            )),
            Self::Category { category, .. } if category.trim().is_empty() => Err(
                EngineError::InvalidRequirement("category must not be empty".to_string()),
            ),
            Self::Zone { zone, .. } if zone.trim().is_empty() => Err(
                EngineError::InvalidRequirement("zone must not be empty".to_string()),
            ),
            Self::Category { action, .. } | Self::Zone { action, .. }
                if tracking == Tracking::Absolute =>
            {
                Err(EngineError::InvalidRequirement(format!(
                    "{action} is tracked as a total and cannot be filtered by category or zone"
                )))
            }
            Self::Distinct { action, .. } if tracking == Tracking::Counter => {
                Err(EngineError::InvalidRequirement(format!(
                    "{action} is a counter and cannot be used as a distinct total"
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate a stored requirement
    pub fn from_json(json: &str) -> Result<Self> {
        let requirement: Self = serde_json::from_str(json)?;
        requirement.validate()?;
        Ok(requirement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_defaults_to_one() {
        let req = Requirement::from_json(r#"{"kind":"count","action":"write_review"}"#).unwrap();
        assert_eq!(req.target(), 1);
        assert_eq!(req.action(), Action::WriteReview);
    }

    #[test]
    fn test_category_matching_is_case_insensitive() {
        let req = Requirement::Category {
            action: Action::WriteReview,
            category: "Bakery".to_string(),
            target: 3,
        };
        let ctx = ActionContext {
            category: Some("bakery".to_string()),
            zone: None,
        };
        assert!(req.applies_to(Action::WriteReview, &ctx));
        assert!(!req.applies_to(Action::CheckIn, &ctx));
        assert!(!req.applies_to(Action::WriteReview, &ActionContext::default()));
    }

    #[test]
    fn test_validation_rejects_mismatched_tracking() {
        let filtered_total = Requirement::Zone {
            action: Action::UploadPhoto,
            zone: "north".to_string(),
            target: 2,
        };
        assert!(filtered_total.validate().is_err());

        let distinct_counter = Requirement::Distinct {
            action: Action::CastVote,
            target: 2,
        };
        assert!(distinct_counter.validate().is_err());

        let zero = Requirement::count(Action::Follow, 0);
        assert!(zero.validate().is_err());

        let ok = Requirement::Distinct {
            action: Action::VisitEstablishments,
            target: 10,
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert!(Requirement::from_json(r#"{"kind":"streak","days":3}"#).is_err());
    }
}
