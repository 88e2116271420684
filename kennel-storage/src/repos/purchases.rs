//! Purchases and the puppy bookkeeping they drive.
//!
//! A puppy is sold exactly while a purchase points at it. Saving a purchase
//! marks its puppy sold to the purchase's customer, and releases the puppy a
//! previous version of the purchase pointed at. Deleting a purchase makes its
//! puppy available again. Each sequence runs as a [`Saga`]. A puppy already
//! held by one purchase cannot be claimed by another.

use crate::saga::{Saga, Undo};
use crate::store::{Filter, ListQuery};
use crate::Repository;
use kennel_core::derived::sum_amounts;
use kennel_core::{
    Amount, Collection, CustomerId, KennelError, KennelResult, Purchase, PurchaseId, Puppy,
    PuppyId, PuppyStatus, StorageError, StoreRecord, ValidationError,
};
use std::ops::Deref;
use tracing::warn;

impl Repository<Purchase> {
    pub fn get_by_customer(&self, customer_id: &CustomerId) -> Vec<Purchase> {
        self.filter(|p| p.customer_id.as_ref() == Some(customer_id))
    }

    /// The purchase of a puppy, if any. There is at most one.
    pub fn get_by_puppy(&self, puppy_id: &PuppyId) -> Option<Purchase> {
        self.filter(|p| p.puppy_id.as_ref() == Some(puppy_id))
            .into_iter()
            .next()
    }

    pub fn total_revenue(&self) -> Amount {
        self.cache().read(|s| sum_amounts(&s.purchases, |p| p.amount))
    }

    pub fn total_deposits(&self) -> Amount {
        self.cache()
            .read(|s| sum_amounts(&s.purchases, |p| p.deposit_amount))
    }
}

/// Purchase repository with puppy side effects.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    purchases: Repository<Purchase>,
    puppies: Repository<Puppy>,
}

impl Deref for PurchaseRepository {
    type Target = Repository<Purchase>;

    fn deref(&self) -> &Self::Target {
        &self.purchases
    }
}

impl PurchaseRepository {
    pub fn new(purchases: Repository<Purchase>, puppies: Repository<Puppy>) -> Self {
        Self { purchases, puppies }
    }

    /// Save the purchase, then bring the linked puppies in line with it.
    ///
    /// If a puppy write fails, the purchase write and any earlier puppy write
    /// are undone.
    pub async fn save(&self, purchase: &Purchase) -> KennelResult<Purchase> {
        self.purchases.validate_references(purchase)?;
        self.ensure_puppy_unclaimed(purchase).await?;
        let previous = match &purchase.id {
            Some(id) => Some(self.purchases.fetch(id).await?),
            None => None,
        };
        let released = previous
            .as_ref()
            .and_then(|p| p.puppy_id.clone())
            .filter(|old| Some(old) != purchase.puppy_id.as_ref());

        let mut saga = Saga::new("save purchase");
        let saved = saga
            .step(
                "save purchase",
                self.purchases.save(purchase),
                |saved| self.undo_purchase_save(saved, previous.clone()),
            )
            .await?;

        if let Some(old_puppy) = released {
            saga.step(
                "release previous puppy",
                self.set_puppy(&old_puppy, PuppyStatus::Available, None),
                |before| self.restore_puppy(before),
            )
            .await?;
        }

        if let Some(puppy_id) = &saved.puppy_id {
            saga.finish(
                "mark puppy sold",
                self.set_puppy(puppy_id, PuppyStatus::Sold, saved.customer_id.clone()),
            )
            .await?;
        }
        Ok(saved)
    }

    /// Release the purchase's puppy, then delete the purchase. If the delete
    /// fails the puppy is restored.
    pub async fn delete(&self, id: &PurchaseId) -> KennelResult<()> {
        let purchase = self.purchases.fetch(id).await?;

        let mut saga = Saga::new("delete purchase");
        if let Some(puppy_id) = &purchase.puppy_id {
            saga.step(
                "release puppy",
                self.set_puppy(puppy_id, PuppyStatus::Available, None),
                |before| self.restore_puppy(before),
            )
            .await?;
        }
        saga.finish("delete purchase", self.purchases.delete(id)).await
    }

    /// Reject a purchase whose puppy another purchase already holds. Asks
    /// the store when the purchases collection failed to load.
    async fn ensure_puppy_unclaimed(&self, purchase: &Purchase) -> KennelResult<()> {
        let Some(puppy_id) = &purchase.puppy_id else {
            return Ok(());
        };
        let holders = if self.purchases.cache().is_failed(Collection::Purchases) {
            let query = ListQuery::new().filter(Filter::eq("puppy_id", puppy_id.as_str()));
            let rows = self
                .purchases
                .store()
                .list(Purchase::COLLECTION, &query)
                .await?;
            rows.iter()
                .map(Purchase::from_row)
                .collect::<KennelResult<Vec<_>>>()?
        } else {
            self.purchases.filter(|p| p.puppy_id.as_ref() == Some(puppy_id))
        };

        let holder = holders
            .into_iter()
            .filter_map(|p| p.id)
            .find(|id| Some(id) != purchase.id.as_ref());
        match holder {
            Some(holder) => Err(ValidationError::AlreadyClaimed {
                field: "puppy_id".to_string(),
                collection: Collection::Purchases,
                id: puppy_id.to_string(),
                holder: holder.to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }

    /// Set a puppy's sale status and buyer. Returns the puppy as it was
    /// before, or `None` when the puppy no longer exists. Only the sale
    /// fields change, so the puppy's other references are not re-checked.
    async fn set_puppy(
        &self,
        puppy_id: &PuppyId,
        status: PuppyStatus,
        customer_id: Option<CustomerId>,
    ) -> KennelResult<Option<Puppy>> {
        let before = match self.puppies.fetch(puppy_id).await {
            Ok(puppy) => puppy,
            Err(KennelError::Storage(StorageError::NotFound { .. })) => {
                warn!(puppy_id = %puppy_id, "Purchase points at a missing puppy, skipping");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        if before.status == status && before.customer_id == customer_id {
            return Ok(None);
        }

        let updated = Puppy {
            status,
            customer_id,
            ..before.clone()
        };
        self.puppies.write_through(&updated).await?;
        Ok(Some(before))
    }

    fn restore_puppy(&self, before: &Option<Puppy>) -> Option<Undo> {
        let before = before.clone()?;
        let puppies = self.puppies.clone();
        Some(Box::pin(async move { puppies.write_through(&before).await.map(|_| ()) }))
    }

    fn undo_purchase_save(&self, saved: &Purchase, previous: Option<Purchase>) -> Option<Undo> {
        let purchases = self.purchases.clone();
        match previous {
            Some(previous) => Some(Box::pin(async move {
                purchases.save(&previous).await.map(|_| ())
            })),
            None => {
                let id = saved.id.clone()?;
                Some(Box::pin(async move { purchases.delete(&id).await }))
            }
        }
    }
}
