use super::text_matches;
use crate::repos::PurchaseRepository;
use crate::store::{Filter, ListQuery};
use crate::Repository;
use kennel_core::{Collection, Customer, CustomerId, KennelResult, Purchase, StoreRecord};
use std::ops::Deref;
use tracing::{debug, warn};

impl Repository<Customer> {
    /// Search name, email, phone and city.
    pub fn search(&self, query: &str) -> Vec<Customer> {
        self.filter(|c| {
            text_matches(
                query,
                [
                    Some(c.name.as_str()),
                    c.email.as_deref(),
                    c.phone.as_deref(),
                    c.city.as_deref(),
                ],
            )
        })
    }

    pub fn get_guardians(&self) -> Vec<Customer> {
        self.filter(|c| c.is_guardian)
    }

    pub fn get_website_visible(&self) -> Vec<Customer> {
        self.filter(|c| c.show_on_website)
    }
}

/// Customer repository whose delete cascades to purchases.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    customers: Repository<Customer>,
    purchases: PurchaseRepository,
}

impl Deref for CustomerRepository {
    type Target = Repository<Customer>;

    fn deref(&self) -> &Self::Target {
        &self.customers
    }
}

impl CustomerRepository {
    pub fn new(customers: Repository<Customer>, purchases: PurchaseRepository) -> Self {
        Self {
            customers,
            purchases,
        }
    }

    /// Delete every purchase of the customer (releasing their puppies), then
    /// the customer. Stops at the first failure; purchases deleted before it
    /// stay deleted and the customer is kept.
    pub async fn delete(&self, id: &CustomerId) -> KennelResult<()> {
        let purchases = self.purchases_of(id).await?;
        for purchase in &purchases {
            if let Some(purchase_id) = &purchase.id {
                self.purchases.delete(purchase_id).await?;
            }
        }
        debug!(
            customer_id = %id,
            purchases = purchases.len(),
            "Cascaded customer purchases"
        );
        self.customers.delete(id).await
    }

    /// Purchases referencing the customer. Asks the store directly when the
    /// purchases collection failed to load.
    async fn purchases_of(&self, id: &CustomerId) -> KennelResult<Vec<Purchase>> {
        if !self.cache().is_failed(Collection::Purchases) {
            return Ok(self.purchases.get_by_customer(id));
        }

        warn!(customer_id = %id, "Purchases not cached, listing from store");
        let query = ListQuery::new().filter(Filter::eq("customer_id", id.as_str()));
        let rows = self
            .purchases
            .store()
            .list(Purchase::COLLECTION, &query)
            .await?;
        rows.iter().map(Purchase::from_row).collect()
    }
}
