//! Waitlist queries and status transitions.

use super::today;
use crate::Repository;
use kennel_core::derived::{active_queue, queue_position};
use kennel_core::{
    CustomerId, DepositTransfer, KennelResult, LitterId, PuppyId, WaitlistEntry,
    WaitlistEntryId, WaitlistStatus,
};

impl Repository<WaitlistEntry> {
    pub fn get_by_status(&self, status: WaitlistStatus) -> Vec<WaitlistEntry> {
        self.filter(|e| e.status == status)
    }

    pub fn get_by_litter(&self, litter_id: &LitterId) -> Vec<WaitlistEntry> {
        self.filter(|e| e.assigned_litter_id.as_ref() == Some(litter_id))
    }

    /// Entries holding a queue place, in queue order.
    pub fn get_active_queue(&self) -> Vec<WaitlistEntry> {
        self.cache()
            .read(|s| active_queue(&s.waitlist).into_iter().cloned().collect())
    }

    /// 1-based queue position, or `None` when the entry holds no place.
    pub fn get_position(&self, id: &WaitlistEntryId) -> Option<usize> {
        self.cache().read(|s| queue_position(&s.waitlist, id))
    }

    /// Move the entry's deposit to another litter, recording the move in its
    /// transfer history. No other entity is touched.
    pub async fn transfer_deposit(
        &self,
        id: &WaitlistEntryId,
        to_litter: Option<LitterId>,
        notes: Option<String>,
    ) -> KennelResult<WaitlistEntry> {
        let mut entry = self.fetch(id).await?;
        entry.deposit_transfers.push(DepositTransfer {
            from_litter: entry.assigned_litter_id.clone(),
            to_litter: to_litter.clone(),
            date: Some(today()),
            notes,
        });
        entry.assigned_litter_id = to_litter;
        self.save(&entry).await
    }

    /// Mark the entry fulfilled with the puppy it received.
    pub async fn fulfill(
        &self,
        id: &WaitlistEntryId,
        puppy_id: Option<PuppyId>,
        customer_id: Option<CustomerId>,
    ) -> KennelResult<WaitlistEntry> {
        let mut entry = self.fetch(id).await?;
        entry.status = WaitlistStatus::Fulfilled;
        entry.fulfilled_date = Some(today());
        if puppy_id.is_some() {
            entry.puppy_id = puppy_id;
        }
        if customer_id.is_some() {
            entry.customer_id = customer_id;
        }
        self.save(&entry).await
    }

    pub async fn cancel(
        &self,
        id: &WaitlistEntryId,
        reason: Option<String>,
    ) -> KennelResult<WaitlistEntry> {
        let mut entry = self.fetch(id).await?;
        entry.status = WaitlistStatus::Cancelled;
        entry.cancelled_date = Some(today());
        entry.cancellation_reason = reason;
        self.save(&entry).await
    }
}
