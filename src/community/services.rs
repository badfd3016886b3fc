//! Vote tally rules for community foods.

use uuid::Uuid;

use crate::error::ApiError;

/// Foods whose score drops below this are hidden from default listings.
pub const COMMUNITY_FOOD_HIDE_THRESHOLD: i32 = -3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Like,
    Dislike,
}

impl Vote {
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(Vote::Like),
            -1 => Some(Vote::Dislike),
            _ => None,
        }
    }

    pub fn value(self) -> i16 {
        match self {
            Vote::Like => 1,
            Vote::Dislike => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub likes: i32,
    pub dislikes: i32,
}

impl Tally {
    pub fn score(self) -> i32 {
        self.likes - self.dislikes
    }

    pub fn hidden(self) -> bool {
        is_hidden(self.score())
    }

    fn shift(self, likes: i32, dislikes: i32) -> Self {
        Self {
            likes: (self.likes + likes).max(0),
            dislikes: (self.dislikes + dislikes).max(0),
        }
    }
}

pub fn is_hidden(score: i32) -> bool {
    score < COMMUNITY_FOOD_HIDE_THRESHOLD
}

/// Applies `vote` on top of the voter's `previous` vote. Returns the new
/// tally and the vote to store (`None` removes it).
pub fn apply_vote(tally: Tally, previous: Option<Vote>, vote: Vote) -> (Tally, Option<Vote>) {
    match (previous, vote) {
        (Some(prev), _) if prev == vote => match vote {
            Vote::Like => (tally.shift(-1, 0), None),
            Vote::Dislike => (tally.shift(0, -1), None),
        },
        (Some(_), Vote::Like) => (tally.shift(1, -1), Some(vote)),
        (Some(_), Vote::Dislike) => (tally.shift(-1, 1), Some(vote)),
        (None, Vote::Like) => (tally.shift(1, 0), Some(vote)),
        (None, Vote::Dislike) => (tally.shift(0, 1), Some(vote)),
    }
}

/// Contributors may not vote on the foods they shared.
pub fn ensure_not_contributor(contributor_id: Uuid, voter_id: Uuid) -> Result<(), ApiError> {
    if contributor_id == voter_id {
        return Err(ApiError::Forbidden("Cannot vote on your own food".into()));
    }
    Ok(())
}
