//! Mapping from domain events to engine steps
//!
//! Pure planning: turns one [`DomainEvent`] into the progress, counter and
//! XP changes the engine then applies inside a single transaction.

use crate::config::RewardSettings;
use crate::models::{
    Action, ActionContext, ActivityMetric, CounterUpdate, DomainEvent, RelatedEntity, UserId,
    XpReason,
};

/// One change requested by an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Feed every matching mission of `action`. `value` is an increment
    /// for counter actions and the authoritative total for absolute ones.
    Progress {
        user_id: UserId,
        action: Action,
        context: ActionContext,
        value: u32,
    },
    Counter {
        user_id: UserId,
        metric: ActivityMetric,
        update: CounterUpdate,
    },
    Xp {
        user_id: UserId,
        amount: u32,
        reason: XpReason,
        related: RelatedEntity,
    },
}

impl Step {
    pub fn user_id(&self) -> UserId {
        match self {
            Self::Progress { user_id, .. }
            | Self::Counter { user_id, .. }
            | Self::Xp { user_id, .. } => *user_id,
        }
    }

    /// Apply order inside the transaction: progress rows before user rows
    pub fn phase(&self) -> u8 {
        match self {
            Self::Progress { .. } => 0,
            Self::Counter { .. } => 1,
            Self::Xp { .. } => 2,
        }
    }
}

/// Collects steps, dropping zero XP grants
#[derive(Default)]
struct Planner {
    steps: Vec<Step>,
}

impl Planner {
    fn progress(&mut self, user_id: UserId, action: Action, context: &ActionContext, value: u32) {
        self.steps.push(Step::Progress {
            user_id,
            action,
            context: context.clone(),
            value,
        });
    }

    fn count(&mut self, user_id: UserId, metric: ActivityMetric) {
        self.counter(user_id, metric, CounterUpdate::Add(1));
    }

    fn counter(&mut self, user_id: UserId, metric: ActivityMetric, update: CounterUpdate) {
        self.steps.push(Step::Counter {
            user_id,
            metric,
            update,
        });
    }

    fn xp(&mut self, user_id: UserId, amount: u32, reason: XpReason, related: RelatedEntity) {
        if amount > 0 {
            self.steps.push(Step::Xp {
                user_id,
                amount,
                reason,
                related,
            });
        }
    }
}

/// Steps for `event`, in apply order
pub fn plan(event: &DomainEvent, rewards: &RewardSettings) -> Vec<Step> {
    let mut p = Planner::default();

    match event {
        DomainEvent::ReviewCreated {
            user_id,
            review_id,
            category,
            zone,
            meaningful,
        } => {
            let user = *user_id;
            let ctx = ActionContext {
                category: category.clone(),
                zone: zone.clone(),
            };
            let related = RelatedEntity::Review(review_id.clone());

            p.progress(user, Action::WriteReview, &ctx, 1);
            p.count(user, ActivityMetric::ReviewsWritten);
            p.xp(user, rewards.review, XpReason::ReviewWritten, related.clone());
            if *meaningful {
                p.progress(user, Action::WriteMeaningfulReview, &ctx, 1);
                p.count(user, ActivityMetric::MeaningfulReviews);
                p.xp(
                    user,
                    rewards.meaningful_review_bonus,
                    XpReason::MeaningfulReview,
                    related,
                );
            }
        }
        DomainEvent::CheckInCreated {
            user_id,
            check_in_id,
            category,
            zone,
            verified,
            unique_establishments,
        } => {
            let user = *user_id;
            let ctx = ActionContext {
                category: category.clone(),
                zone: zone.clone(),
            };
            let related = RelatedEntity::CheckIn(check_in_id.clone());

            p.progress(user, Action::CheckIn, &ctx, 1);
            p.count(user, ActivityMetric::CheckIns);
            if *verified {
                p.progress(user, Action::VerifiedCheckIn, &ctx, 1);
                p.count(user, ActivityMetric::VerifiedCheckIns);
                p.xp(
                    user,
                    rewards.verified_check_in,
                    XpReason::VerifiedCheckIn,
                    related,
                );
            } else {
                p.xp(user, rewards.check_in, XpReason::CheckIn, related);
            }
            p.progress(
                user,
                Action::VisitEstablishments,
                &ctx,
                *unique_establishments,
            );
            p.counter(
                user,
                ActivityMetric::UniqueEstablishments,
                CounterUpdate::AtLeast(*unique_establishments),
            );
        }
        DomainEvent::VoteCast {
            voter_id,
            vote_id,
            review_author_id,
            helpful,
        } => {
            let ctx = ActionContext::default();
            let related = RelatedEntity::Vote(vote_id.clone());

            p.progress(*voter_id, Action::CastVote, &ctx, 1);
            p.count(*voter_id, ActivityMetric::VotesCast);
            p.xp(*voter_id, rewards.vote, XpReason::VoteCast, related.clone());
            if *helpful {
                let author = *review_author_id;
                p.progress(author, Action::ReceiveHelpfulVote, &ctx, 1);
                p.count(author, ActivityMetric::HelpfulVotesReceived);
                p.xp(
                    author,
                    rewards.helpful_vote,
                    XpReason::HelpfulVoteReceived,
                    related,
                );
            }
        }
        // No action describes being followed, so the followee is left alone
        DomainEvent::FollowCreated {
            follower_id,
            follow_id,
            ..
        } => {
            let related = RelatedEntity::Follow(follow_id.clone());
            p.progress(*follower_id, Action::Follow, &ActionContext::default(), 1);
            p.count(*follower_id, ActivityMetric::Follows);
            p.xp(*follower_id, rewards.follow, XpReason::FollowCreated, related);
        }
        DomainEvent::PhotoUploaded {
            user_id,
            photo_id,
            upload_count,
            high_res_count,
            high_resolution,
        } => {
            let user = *user_id;
            let ctx = ActionContext::default();
            let related = RelatedEntity::Photo(photo_id.clone());

            p.progress(user, Action::UploadPhoto, &ctx, *upload_count);
            p.counter(
                user,
                ActivityMetric::PhotosUploaded,
                CounterUpdate::AtLeast(*upload_count),
            );
            if *high_res_count > 0 {
                p.progress(user, Action::UploadHighResPhoto, &ctx, *high_res_count);
                p.counter(
                    user,
                    ActivityMetric::HighResPhotos,
                    CounterUpdate::AtLeast(*high_res_count),
                );
            }
            p.xp(user, rewards.photo, XpReason::PhotoUploaded, related.clone());
            if *high_resolution {
                p.xp(
                    user,
                    rewards.high_res_photo_bonus,
                    XpReason::HighResPhoto,
                    related,
                );
            }
        }
        DomainEvent::PhotoApproved { user_id, .. } => {
            p.count(*user_id, ActivityMetric::PhotosApproved);
        }
    }

    // Stable: keeps per-user order inside each phase
    p.steps.sort_by_key(Step::phase);
    p.steps
}

/// Users an event touches, in first-seen order
pub fn participants(steps: &[Step]) -> Vec<UserId> {
    let mut users: Vec<UserId> = Vec::new();
    for step in steps {
        let user = step.user_id();
        if !users.contains(&user) {
            users.push(user);
        }
    }
    users
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn phases(steps: &[Step]) -> Vec<u8> {
        steps.iter().map(Step::phase).collect()
    }

    #[test]
    fn test_meaningful_review_plan() {
        let user_id = Uuid::new_v4();
        let event = DomainEvent::ReviewCreated {
            user_id,
            review_id: "r-1".to_string(),
            category: Some("bakery".to_string()),
            zone: None,
            meaningful: true,
        };
        let steps = plan(&event, &RewardSettings::default());

        let xp: Vec<u32> = steps
            .iter()
            .filter_map(|s| match s {
                Step::Xp { amount, .. } => Some(*amount),
                _ => None,
            })
            .collect();
        assert_eq!(xp, vec![10, 5]);
        assert_eq!(phases(&steps), vec![0, 0, 1, 1, 2, 2]);
        assert_eq!(participants(&steps), vec![user_id]);
    }

    #[test]
    fn test_helpful_vote_touches_author() {
        let voter = Uuid::new_v4();
        let author = Uuid::new_v4();
        let event = DomainEvent::VoteCast {
            voter_id: voter,
            vote_id: "v-1".to_string(),
            review_author_id: author,
            helpful: true,
        };
        let steps = plan(&event, &RewardSettings::default());
        assert_eq!(participants(&steps), vec![voter, author]);
        assert!(steps.contains(&Step::Xp {
            user_id: author,
            amount: 2,
            reason: XpReason::HelpfulVoteReceived,
            related: RelatedEntity::Vote("v-1".to_string()),
        }));

        let unhelpful = DomainEvent::VoteCast {
            voter_id: voter,
            vote_id: "v-2".to_string(),
            review_author_id: author,
            helpful: false,
        };
        let steps = plan(&unhelpful, &RewardSettings::default());
        assert_eq!(participants(&steps), vec![voter]);
    }

    #[test]
    fn test_follow_credits_only_the_follower() {
        let follower = Uuid::new_v4();
        let followee = Uuid::new_v4();
        let event = DomainEvent::FollowCreated {
            follower_id: follower,
            follow_id: "f-1".to_string(),
            followee_id: followee,
        };
        let steps = plan(&event, &RewardSettings::default());

        assert_eq!(steps.len(), 3);
        assert_eq!(participants(&steps), vec![follower]);
        assert!(steps.iter().all(|s| s.user_id() != followee));
    }

    #[test]
    fn test_zero_rewards_are_dropped() {
        let rewards = RewardSettings {
            follow: 0,
            ..Default::default()
        };
        let event = DomainEvent::FollowCreated {
            follower_id: Uuid::new_v4(),
            follow_id: "f-1".to_string(),
            followee_id: Uuid::new_v4(),
        };
        let steps = plan(&event, &rewards);
        assert!(steps.iter().all(|s| !matches!(s, Step::Xp { .. })));
        assert_eq!(steps.len(), 2);
    }

    #[test]
    fn test_photo_totals_are_absolute() {
        let user_id = Uuid::new_v4();
        let event = DomainEvent::PhotoUploaded {
            user_id,
            photo_id: "p-9".to_string(),
            upload_count: 9,
            high_res_count: 0,
            high_resolution: false,
        };
        let steps = plan(&event, &RewardSettings::default());
        assert!(steps.contains(&Step::Counter {
            user_id,
            metric: ActivityMetric::PhotosUploaded,
            update: CounterUpdate::AtLeast(9),
        }));
        assert!(!steps.iter().any(|s| matches!(
            s,
            Step::Progress {
                action: Action::UploadHighResPhoto,
                ..
            }
        )));
    }
}
