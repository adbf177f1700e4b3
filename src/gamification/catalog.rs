//! Built-in missions and badges
//!
//! Inserted by `questboard seed`. Seeding is idempotent: existing ids are
//! left untouched, so operator edits survive a re-seed.

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::error::Result;
use crate::models::{
    Action, ActivityMetric, Badge, BadgeCategory, BadgeRarity, BadgeRequirement, Mission,
    MissionType, Requirement, ResetCadence, Tracking,
};
use crate::store::{badges, missions};

/// Establishment filter of a seed mission
#[derive(Debug, Clone, Copy)]
pub enum SeedFilter {
    Any,
    Category(&'static str),
    Zone(&'static str),
}

/// Static mission definition
#[derive(Debug, Clone, Copy)]
pub struct SeedMission {
    pub id: &'static str,
    pub title: &'static str,
    pub mission_type: MissionType,
    pub action: Action,
    pub filter: SeedFilter,
    pub target: u32,
    pub xp_reward: u32,
    pub badge_reward: Option<&'static str>,
    pub reset_cadence: ResetCadence,
}

/// Static badge definition
#[derive(Debug, Clone, Copy)]
pub struct SeedBadge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: BadgeCategory,
    pub rarity: BadgeRarity,
    /// `None` for mission-reward badges
    pub unlock: Option<(ActivityMetric, u32)>,
    pub hidden: bool,
}

impl SeedMission {
    pub fn requirement(&self) -> Requirement {
        let (action, target) = (self.action, self.target);
        match (self.filter, action.tracking()) {
            (_, Tracking::Absolute) => Requirement::Distinct { action, target },
            (SeedFilter::Any, Tracking::Counter) => Requirement::Count { action, target },
            (SeedFilter::Category(category), Tracking::Counter) => Requirement::Category {
                action,
                category: category.to_string(),
                target,
            },
            (SeedFilter::Zone(zone), Tracking::Counter) => Requirement::Zone {
                action,
                zone: zone.to_string(),
                target,
            },
        }
    }

    pub fn to_mission(&self) -> Mission {
        Mission {
            id: self.id.to_string(),
            title: self.title.to_string(),
            mission_type: self.mission_type,
            xp_reward: self.xp_reward,
            badge_reward: self.badge_reward.map(str::to_string),
            requirement: self.requirement(),
            reset_cadence: self.reset_cadence,
            active: true,
            starts_at: None,
            ends_at: None,
        }
    }
}

impl SeedBadge {
    pub fn to_badge(&self) -> Badge {
        Badge {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            category: self.category,
            rarity: self.rarity,
            requirement: self
                .unlock
                .map(|(metric, threshold)| BadgeRequirement { metric, threshold }),
            active: true,
            hidden: self.hidden,
        }
    }
}

/// All built-in badges
pub static BADGES: &[SeedBadge] = &[
    // === REVIEWS ===
    SeedBadge {
        id: "first-review",
        name: "First Words",
        description: "Write your first review",
        category: BadgeCategory::Reviews,
        rarity: BadgeRarity::Common,
        unlock: Some((ActivityMetric::ReviewsWritten, 1)),
        hidden: false,
    },
    SeedBadge {
        id: "critic",
        name: "Critic",
        description: "Write 10 reviews",
        category: BadgeCategory::Reviews,
        rarity: BadgeRarity::Uncommon,
        unlock: Some((ActivityMetric::ReviewsWritten, 10)),
        hidden: false,
    },
    SeedBadge {
        id: "thoughtful",
        name: "Thoughtful",
        description: "Write 25 meaningful reviews",
        category: BadgeCategory::Reviews,
        rarity: BadgeRarity::Rare,
        unlock: Some((ActivityMetric::MeaningfulReviews, 25)),
        hidden: false,
    },
    // === CHECK-INS ===
    SeedBadge {
        id: "first-check-in",
        name: "Checked In",
        description: "Check in for the first time",
        category: BadgeCategory::CheckIns,
        rarity: BadgeRarity::Common,
        unlock: Some((ActivityMetric::CheckIns, 1)),
        hidden: false,
    },
    SeedBadge {
        id: "regular",
        name: "Regular",
        description: "Make 20 verified check-ins",
        category: BadgeCategory::CheckIns,
        rarity: BadgeRarity::Rare,
        unlock: Some((ActivityMetric::VerifiedCheckIns, 20)),
        hidden: false,
    },
    // === EXPLORATION ===
    SeedBadge {
        id: "wanderer",
        name: "Wanderer",
        description: "Visit 10 different establishments",
        category: BadgeCategory::Exploration,
        rarity: BadgeRarity::Uncommon,
        unlock: Some((ActivityMetric::UniqueEstablishments, 10)),
        hidden: false,
    },
    SeedBadge {
        id: "globetrotter",
        name: "Globetrotter",
        description: "Visit 50 different establishments",
        category: BadgeCategory::Exploration,
        rarity: BadgeRarity::Epic,
        unlock: Some((ActivityMetric::UniqueEstablishments, 50)),
        hidden: false,
    },
    SeedBadge {
        id: "city-explorer",
        name: "City Explorer",
        description: "Finish the explorer storyline",
        category: BadgeCategory::Exploration,
        rarity: BadgeRarity::Rare,
        unlock: None,
        hidden: false,
    },
    // === PHOTOS ===
    SeedBadge {
        id: "shutterbug",
        name: "Shutterbug",
        description: "Upload 10 photos",
        category: BadgeCategory::Photos,
        rarity: BadgeRarity::Common,
        unlock: Some((ActivityMetric::PhotosUploaded, 10)),
        hidden: false,
    },
    SeedBadge {
        id: "sharp-eye",
        name: "Sharp Eye",
        description: "Upload 10 high-resolution photos",
        category: BadgeCategory::Photos,
        rarity: BadgeRarity::Uncommon,
        unlock: Some((ActivityMetric::HighResPhotos, 10)),
        hidden: false,
    },
    SeedBadge {
        id: "curator",
        name: "Curator",
        description: "Have 25 photos approved",
        category: BadgeCategory::Photos,
        rarity: BadgeRarity::Rare,
        unlock: Some((ActivityMetric::PhotosApproved, 25)),
        hidden: false,
    },
    // === SOCIAL ===
    SeedBadge {
        id: "civic-duty",
        name: "Civic Duty",
        description: "Cast 50 votes",
        category: BadgeCategory::Social,
        rarity: BadgeRarity::Common,
        unlock: Some((ActivityMetric::VotesCast, 50)),
        hidden: false,
    },
    SeedBadge {
        id: "helpful",
        name: "Helpful",
        description: "Receive 10 helpful votes",
        category: BadgeCategory::Social,
        rarity: BadgeRarity::Uncommon,
        unlock: Some((ActivityMetric::HelpfulVotesReceived, 10)),
        hidden: false,
    },
    SeedBadge {
        id: "connected",
        name: "Connected",
        description: "Follow 10 people",
        category: BadgeCategory::Social,
        rarity: BadgeRarity::Common,
        unlock: Some((ActivityMetric::Follows, 10)),
        hidden: false,
    },
    // === PROGRESSION ===
    SeedBadge {
        id: "on-a-roll",
        name: "On a Roll",
        description: "Be active 7 days in a row",
        category: BadgeCategory::Progression,
        rarity: BadgeRarity::Rare,
        unlock: Some((ActivityMetric::LongestStreak, 7)),
        hidden: false,
    },
    SeedBadge {
        id: "connoisseur",
        name: "Connoisseur",
        description: "Reach level 5",
        category: BadgeCategory::Progression,
        rarity: BadgeRarity::Epic,
        unlock: Some((ActivityMetric::Level, 5)),
        hidden: false,
    },
    SeedBadge {
        id: "legend",
        name: "Legend",
        description: "Reach the top level",
        category: BadgeCategory::Progression,
        rarity: BadgeRarity::Legendary,
        unlock: Some((ActivityMetric::Level, 7)),
        hidden: true,
    },
    // === MISSIONS ===
    SeedBadge {
        id: "taskmaster",
        name: "Taskmaster",
        description: "Complete 10 missions",
        category: BadgeCategory::Missions,
        rarity: BadgeRarity::Uncommon,
        unlock: Some((ActivityMetric::MissionsCompleted, 10)),
        hidden: false,
    },
];

/// All built-in missions
pub static MISSIONS: &[SeedMission] = &[
    // === DAILY ===
    SeedMission {
        id: "daily-review",
        title: "Write a review today",
        mission_type: MissionType::Daily,
        action: Action::WriteReview,
        filter: SeedFilter::Any,
        target: 1,
        xp_reward: 20,
        badge_reward: None,
        reset_cadence: ResetCadence::Daily,
    },
    SeedMission {
        id: "daily-check-in",
        title: "Check in somewhere today",
        mission_type: MissionType::Daily,
        action: Action::CheckIn,
        filter: SeedFilter::Any,
        target: 1,
        xp_reward: 15,
        badge_reward: None,
        reset_cadence: ResetCadence::Daily,
    },
    SeedMission {
        id: "daily-votes",
        title: "Vote on three reviews",
        mission_type: MissionType::Daily,
        action: Action::CastVote,
        filter: SeedFilter::Any,
        target: 3,
        xp_reward: 10,
        badge_reward: None,
        reset_cadence: ResetCadence::Daily,
    },
    // === WEEKLY ===
    SeedMission {
        id: "weekly-meaningful-reviews",
        title: "Write three detailed reviews this week",
        mission_type: MissionType::Weekly,
        action: Action::WriteMeaningfulReview,
        filter: SeedFilter::Any,
        target: 3,
        xp_reward: 75,
        badge_reward: None,
        reset_cadence: ResetCadence::Weekly,
    },
    SeedMission {
        id: "weekly-verified-check-ins",
        title: "Make five verified check-ins this week",
        mission_type: MissionType::Weekly,
        action: Action::VerifiedCheckIn,
        filter: SeedFilter::Any,
        target: 5,
        xp_reward: 60,
        badge_reward: None,
        reset_cadence: ResetCadence::Weekly,
    },
    SeedMission {
        id: "weekly-follows",
        title: "Follow two new people this week",
        mission_type: MissionType::Weekly,
        action: Action::Follow,
        filter: SeedFilter::Any,
        target: 2,
        xp_reward: 30,
        badge_reward: None,
        reset_cadence: ResetCadence::Weekly,
    },
    // === NARRATIVE ===
    SeedMission {
        id: "story-explorer",
        title: "Visit ten different establishments",
        mission_type: MissionType::Narrative,
        action: Action::VisitEstablishments,
        filter: SeedFilter::Any,
        target: 10,
        xp_reward: 150,
        badge_reward: Some("city-explorer"),
        reset_cadence: ResetCadence::Never,
    },
    SeedMission {
        id: "story-photographer",
        title: "Upload twenty photos",
        mission_type: MissionType::Narrative,
        action: Action::UploadPhoto,
        filter: SeedFilter::Any,
        target: 20,
        xp_reward: 100,
        badge_reward: None,
        reset_cadence: ResetCadence::Never,
    },
    SeedMission {
        id: "story-helpful",
        title: "Receive 25 helpful votes",
        mission_type: MissionType::Narrative,
        action: Action::ReceiveHelpfulVote,
        filter: SeedFilter::Any,
        target: 25,
        xp_reward: 120,
        badge_reward: None,
        reset_cadence: ResetCadence::Never,
    },
    // === EVENTS ===
    SeedMission {
        id: "bakery-month",
        title: "Review four bakeries this month",
        mission_type: MissionType::Event,
        action: Action::WriteReview,
        filter: SeedFilter::Category("bakery"),
        target: 4,
        xp_reward: 80,
        badge_reward: None,
        reset_cadence: ResetCadence::Monthly,
    },
    SeedMission {
        id: "downtown-tour",
        title: "Check in three times downtown",
        mission_type: MissionType::Event,
        action: Action::CheckIn,
        filter: SeedFilter::Zone("downtown"),
        target: 3,
        xp_reward: 50,
        badge_reward: None,
        reset_cadence: ResetCadence::Never,
    },
];

/// What a seed run inserted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub badges_added: usize,
    pub missions_added: usize,
}

/// Insert every built-in badge, then every mission (missions may
/// reference badges). Existing ids are skipped.
pub fn seed(conn: &Connection, now: DateTime<Utc>) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();
    for badge in BADGES {
        if badges::insert_if_absent(conn, &badge.to_badge())? {
            summary.badges_added += 1;
        }
    }
    for mission in MISSIONS {
        if missions::insert_if_absent(conn, &mission.to_mission(), now)? {
            summary.missions_added += 1;
        }
    }
    tracing::debug!(
        "Seeded {} badges and {} missions",
        summary.badges_added,
        summary.missions_added
    );
    Ok(summary)
}
