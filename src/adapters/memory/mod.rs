//! In-memory repository implementations.
//!
//! Plain `Mutex<HashMap>` stores used by service-level tests and
//! available as a throwaway backend. Lock scopes are kept tight; no
//! await happens while a lock is held.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Acknowledgment, CheckIn, Commitment, EndRoomStatus, Review, Will, WillStatus,
};
use crate::domain::ports::{
    AcknowledgmentRepository, CheckInRepository, CommitmentRepository, ReviewRepository,
    WillFilter, WillRepository,
};

#[derive(Default)]
pub struct MemoryWillRepository {
    wills: Mutex<HashMap<Uuid, Will>>,
}

impl MemoryWillRepository {
    /// Put a Will in place directly, bypassing create/update checks.
    /// Test setup helper.
    pub fn insert(&self, will: Will) {
        self.wills.lock().unwrap().insert(will.id, will);
    }
}

#[async_trait]
impl WillRepository for MemoryWillRepository {
    async fn create(&self, will: &Will) -> DomainResult<()> {
        let mut wills = self.wills.lock().unwrap();
        if wills.contains_key(&will.id) {
            return Err(DomainError::Validation(format!(
                "will {} already exists",
                will.id
            )));
        }
        wills.insert(will.id, will.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Will>> {
        Ok(self.wills.lock().unwrap().get(&id).cloned())
    }

    async fn update(&self, will: &Will) -> DomainResult<()> {
        let mut wills = self.wills.lock().unwrap();
        let Some(stored) = wills.get(&will.id) else {
            return Err(DomainError::WillNotFound(will.id));
        };
        // Caller bumped the version; the stored row must still hold
        // the snapshot the write was built from.
        if stored.version + 1 != will.version {
            return Err(DomainError::Conflict(format!(
                "will {} was modified concurrently",
                will.id
            )));
        }
        wills.insert(will.id, will.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        self.wills
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::WillNotFound(id))
    }

    async fn list(&self, filter: WillFilter) -> DomainResult<Vec<Will>> {
        let wills = self.wills.lock().unwrap();
        let mut matched: Vec<Will> = wills
            .values()
            .filter(|w| filter.status.is_none_or(|s| w.status == s))
            .filter(|w| filter.member_id.is_none_or(|m| w.is_member(m)))
            .filter(|w| filter.mode.is_none_or(|m| w.mode == m))
            .cloned()
            .collect();
        matched.sort_by_key(|w| w.created_at);
        Ok(matched)
    }

    async fn list_non_terminal(&self) -> DomainResult<Vec<Will>> {
        let wills = self.wills.lock().unwrap();
        let mut matched: Vec<Will> = wills
            .values()
            .filter(|w| !w.status.is_terminal())
            .cloned()
            .collect();
        matched.sort_by_key(|w| w.created_at);
        Ok(matched)
    }

    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: WillStatus,
        next: WillStatus,
    ) -> DomainResult<bool> {
        let mut wills = self.wills.lock().unwrap();
        let Some(will) = wills.get_mut(&id) else {
            return Err(DomainError::WillNotFound(id));
        };
        if will.status != expected {
            return Ok(false);
        }
        will.status = next;
        will.updated_at = Utc::now();
        will.version += 1;
        Ok(true)
    }

    async fn set_end_room_status(&self, id: Uuid, status: EndRoomStatus) -> DomainResult<()> {
        let mut wills = self.wills.lock().unwrap();
        let Some(will) = wills.get_mut(&id) else {
            return Err(DomainError::WillNotFound(id));
        };
        will.end_room_status = Some(status);
        will.updated_at = Utc::now();
        Ok(())
    }
}


#[derive(Default)]
pub struct MemoryCheckInRepository {
    check_ins: Mutex<HashMap<(Uuid, NaiveDate), CheckIn>>,
}

#[async_trait]
impl CheckInRepository for MemoryCheckInRepository {
    async fn upsert(&self, check_in: &CheckIn) -> DomainResult<CheckIn> {
        let mut check_ins = self.check_ins.lock().unwrap();
        let key = (check_in.will_id, check_in.date);
        let stored = match check_ins.get(&key) {
            Some(existing) => CheckIn {
                id: existing.id,
                created_at: existing.created_at,
                updated_at: Utc::now(),
                ..check_in.clone()
            },
            None => check_in.clone(),
        };
        check_ins.insert(key, stored.clone());
        Ok(stored)
    }

    async fn get(&self, will_id: Uuid, date: NaiveDate) -> DomainResult<Option<CheckIn>> {
        Ok(self.check_ins.lock().unwrap().get(&(will_id, date)).cloned())
    }

    async fn list_for_will(&self, will_id: Uuid) -> DomainResult<Vec<CheckIn>> {
        let check_ins = self.check_ins.lock().unwrap();
        let mut matched: Vec<CheckIn> = check_ins
            .values()
            .filter(|c| c.will_id == will_id)
            .cloned()
            .collect();
        matched.sort_by_key(|c| c.date);
        Ok(matched)
    }

    async fn count_for_will(&self, will_id: Uuid) -> DomainResult<u64> {
        let check_ins = self.check_ins.lock().unwrap();
        Ok(check_ins.values().filter(|c| c.will_id == will_id).count() as u64)
    }
}

#[derive(Default)]
pub struct MemoryCommitmentRepository {
    commitments: Mutex<HashMap<(Uuid, Uuid), Commitment>>,
}

#[async_trait]
impl CommitmentRepository for MemoryCommitmentRepository {
    async fn create(&self, commitment: &Commitment) -> DomainResult<()> {
        let mut commitments = self.commitments.lock().unwrap();
        let key = (commitment.will_id, commitment.user_id);
        if commitments.contains_key(&key) {
            return Err(DomainError::Validation(
                "commitment already exists for this member".into(),
            ));
        }
        commitments.insert(key, commitment.clone());
        Ok(())
    }

    async fn get(&self, will_id: Uuid, user_id: Uuid) -> DomainResult<Option<Commitment>> {
        Ok(self
            .commitments
            .lock()
            .unwrap()
            .get(&(will_id, user_id))
            .cloned())
    }

    async fn list_for_will(&self, will_id: Uuid) -> DomainResult<Vec<Commitment>> {
        let commitments = self.commitments.lock().unwrap();
        let mut matched: Vec<Commitment> = commitments
            .values()
            .filter(|c| c.will_id == will_id)
            .cloned()
            .collect();
        matched.sort_by_key(|c| c.created_at);
        Ok(matched)
    }

    async fn count_for_will(&self, will_id: Uuid) -> DomainResult<u64> {
        let commitments = self.commitments.lock().unwrap();
        Ok(commitments.values().filter(|c| c.will_id == will_id).count() as u64)
    }

    async fn update(&self, commitment: &Commitment) -> DomainResult<()> {
        let mut commitments = self.commitments.lock().unwrap();
        let key = (commitment.will_id, commitment.user_id);
        if !commitments.contains_key(&key) {
            return Err(DomainError::Validation(
                "no commitment to update for this member".into(),
            ));
        }
        commitments.insert(key, commitment.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryReviewRepository {
    reviews: Mutex<HashMap<(Uuid, Uuid), Review>>,
}

#[async_trait]
impl ReviewRepository for MemoryReviewRepository {
    async fn create(&self, review: &Review) -> DomainResult<()> {
        let mut reviews = self.reviews.lock().unwrap();
        let key = (review.will_id, review.user_id);
        if reviews.contains_key(&key) {
            return Err(DomainError::Validation(
                "review already exists for this member".into(),
            ));
        }
        reviews.insert(key, review.clone());
        Ok(())
    }

    async fn get(&self, will_id: Uuid, user_id: Uuid) -> DomainResult<Option<Review>> {
        Ok(self.reviews.lock().unwrap().get(&(will_id, user_id)).cloned())
    }

    async fn list_for_will(&self, will_id: Uuid) -> DomainResult<Vec<Review>> {
        let reviews = self.reviews.lock().unwrap();
        let mut matched: Vec<Review> = reviews
            .values()
            .filter(|r| r.will_id == will_id)
            .cloned()
            .collect();
        matched.sort_by_key(|r| r.created_at);
        Ok(matched)
    }

    async fn count_for_will(&self, will_id: Uuid) -> DomainResult<u64> {
        let reviews = self.reviews.lock().unwrap();
        Ok(reviews.values().filter(|r| r.will_id == will_id).count() as u64)
    }
}

#[derive(Default)]
pub struct MemoryAcknowledgmentRepository {
    acknowledgments: Mutex<HashMap<(Uuid, Uuid), Acknowledgment>>,
}

#[async_trait]
impl AcknowledgmentRepository for MemoryAcknowledgmentRepository {
    async fn create(&self, acknowledgment: &Acknowledgment) -> DomainResult<()> {
        let mut acknowledgments = self.acknowledgments.lock().unwrap();
        let key = (acknowledgment.will_id, acknowledgment.user_id);
        if acknowledgments.contains_key(&key) {
            return Err(DomainError::Validation(
                "acknowledgment already exists for this member".into(),
            ));
        }
        acknowledgments.insert(key, acknowledgment.clone());
        Ok(())
    }

    async fn get(&self, will_id: Uuid, user_id: Uuid) -> DomainResult<Option<Acknowledgment>> {
        Ok(self
            .acknowledgments
            .lock()
            .unwrap()
            .get(&(will_id, user_id))
            .cloned())
    }

    async fn count_for_will(&self, will_id: Uuid) -> DomainResult<u64> {
        let acknowledgments = self.acknowledgments.lock().unwrap();
        Ok(acknowledgments
            .values()
            .filter(|a| a.will_id == will_id)
            .count() as u64)
    }
}
