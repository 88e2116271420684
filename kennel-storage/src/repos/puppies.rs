use crate::Repository;
use kennel_core::{CustomerId, KennelResult, LitterId, Puppy, PuppyStatus};
use std::ops::Deref;
use tracing::debug;

impl Repository<Puppy> {
    pub fn get_by_litter(&self, litter_id: &LitterId) -> Vec<Puppy> {
        self.filter(|p| p.litter_id.as_ref() == Some(litter_id))
    }

    pub fn get_by_status(&self, status: PuppyStatus) -> Vec<Puppy> {
        self.filter(|p| p.status == status)
    }

    pub fn get_available(&self) -> Vec<Puppy> {
        self.get_by_status(PuppyStatus::Available)
    }

    pub fn get_public(&self) -> Vec<Puppy> {
        self.filter(|p| p.is_public)
    }

    pub fn get_by_customer(&self, customer_id: &CustomerId) -> Vec<Puppy> {
        self.filter(|p| p.customer_id.as_ref() == Some(customer_id))
    }
}

/// Puppy repository for direct edits.
///
/// The sale fields belong to purchases: a direct save never marks a puppy
/// sold, never un-sells one, and never changes its buyer.
#[derive(Debug, Clone)]
pub struct PuppyRepository {
    puppies: Repository<Puppy>,
}

impl Deref for PuppyRepository {
    type Target = Repository<Puppy>;

    fn deref(&self) -> &Self::Target {
        &self.puppies
    }
}

impl PuppyRepository {
    pub fn new(puppies: Repository<Puppy>) -> Self {
        Self { puppies }
    }

    /// Save a puppy, keeping its sale fields as purchases last set them.
    pub async fn save(&self, puppy: &Puppy) -> KennelResult<Puppy> {
        let stored = match &puppy.id {
            Some(id) => Some(self.puppies.fetch(id).await?),
            None => None,
        };
        let edited = keep_sale_fields(puppy, stored.as_ref());
        if edited.status != puppy.status || edited.customer_id != puppy.customer_id {
            debug!(
                puppy = %puppy.name,
                requested = ?puppy.status,
                kept = ?edited.status,
                "Sale fields are set by purchases, keeping stored values"
            );
        }
        self.puppies.save(&edited).await
    }
}

/// Apply a direct edit without touching the sale state. Available and
/// reserved may be switched freely while the puppy is unsold.
fn keep_sale_fields(requested: &Puppy, stored: Option<&Puppy>) -> Puppy {
    let (status, customer_id) = match stored {
        Some(stored) if stored.status == PuppyStatus::Sold => {
            (PuppyStatus::Sold, stored.customer_id.clone())
        }
        Some(stored) if requested.status == PuppyStatus::Sold => {
            (stored.status, stored.customer_id.clone())
        }
        Some(stored) => (requested.status, stored.customer_id.clone()),
        None if requested.status == PuppyStatus::Sold => (PuppyStatus::Available, None),
        None => (requested.status, None),
    };
    Puppy {
        status,
        customer_id,
        ..requested.clone()
    }
}
