//! Review and acknowledgment domain models.
//!
//! A review is a member's retrospective follow-through rating plus an
//! optional reflection, created once and immutable. An acknowledgment
//! records that a member has seen the completed Will's summary and
//! releases that member's eligibility to start a new Will.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;

/// Maximum reflection length, in characters.
pub const MAX_REFLECTION_LEN: usize = 300;

/// Self-assessed follow-through over the Will's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowThrough {
    Yes,
    Mostly,
    No,
}

impl FollowThrough {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::Mostly => "mostly",
            Self::No => "no",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "yes" => Some(Self::Yes),
            "mostly" => Some(Self::Mostly),
            "no" => Some(Self::No),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub will_id: Uuid,
    pub user_id: Uuid,
    pub follow_through: FollowThrough,
    pub reflection: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(
        will_id: Uuid,
        user_id: Uuid,
        follow_through: FollowThrough,
        reflection: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            will_id,
            user_id,
            follow_through,
            reflection,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(text) = &self.reflection {
            if text.chars().count() > MAX_REFLECTION_LEN {
                return Err(DomainError::Validation(format!(
                    "reflection exceeds {MAX_REFLECTION_LEN} characters"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgment {
    pub id: Uuid,
    pub will_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Acknowledgment {
    pub fn new(will_id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            will_id,
            user_id,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflection_length_limit() {
        let ok = Review::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            FollowThrough::Mostly,
            Some("a".repeat(MAX_REFLECTION_LEN)),
        );
        assert!(ok.validate().is_ok());

        let too_long = Review::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            FollowThrough::Mostly,
            Some("a".repeat(MAX_REFLECTION_LEN + 1)),
        );
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_follow_through_round_trip() {
        for ft in [FollowThrough::Yes, FollowThrough::Mostly, FollowThrough::No] {
            assert_eq!(FollowThrough::from_str(ft.as_str()), Some(ft));
        }
        assert_eq!(FollowThrough::from_str("maybe"), None);
    }
}
