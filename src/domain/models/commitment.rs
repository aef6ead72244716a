//! Commitment domain model.
//!
//! One per member per Will: what the member commits to and why. Owned
//! exclusively by the declaring member and immutable once the Will
//! leaves the pending/scheduled states.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;

/// Maximum length of the `what` and `why` fields, in characters.
pub const MAX_COMMITMENT_TEXT_LEN: usize = 75;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub id: Uuid,
    pub will_id: Uuid,
    pub user_id: Uuid,
    pub what: String,
    pub why: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Commitment {
    pub fn new(
        will_id: Uuid,
        user_id: Uuid,
        what: impl Into<String>,
        why: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            will_id,
            user_id,
            what: what.into(),
            why: why.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.what.trim().is_empty() {
            return Err(DomainError::Validation(
                "commitment 'what' cannot be empty".into(),
            ));
        }
        if self.what.chars().count() > MAX_COMMITMENT_TEXT_LEN {
            return Err(DomainError::Validation(format!(
                "commitment 'what' exceeds {MAX_COMMITMENT_TEXT_LEN} characters"
            )));
        }
        if self.why.chars().count() > MAX_COMMITMENT_TEXT_LEN {
            return Err(DomainError::Validation(format!(
                "commitment 'why' exceeds {MAX_COMMITMENT_TEXT_LEN} characters"
            )));
        }
        Ok(())
    }
}
