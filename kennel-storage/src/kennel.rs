//! Application facade owning the cache and every repository.

use crate::cache::{LoadReport, LocalCache};
use crate::memory::MemoryStore;
use crate::repos::{
    CustomerRepository, PurchaseRepository, PuppyRepository, SettingsRepository,
    TestimonialRepository,
};
use crate::rest::{RestStore, RestStoreConfig};
use crate::store::RemoteStore;
use crate::Repository;
use kennel_core::{
    AlertConfig, Collection, Dog, Expense, FaqItem, FileRecord, GalleryItem, KennelConfig,
    KennelResult, Litter, Reminder, StoreConfig, VetRecord, WaitlistEntry,
};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// One application instance: a store, its cache and the repositories over
/// them.
///
/// Construct once, call [`Kennel::load`] before serving reads, and
/// [`Kennel::shutdown`] when done.
#[derive(Clone)]
pub struct Kennel {
    cache: Arc<LocalCache>,
    store: Arc<dyn RemoteStore>,
    alerts: AlertConfig,
    pub dogs: Repository<Dog>,
    pub litters: Repository<Litter>,
    pub puppies: PuppyRepository,
    pub customers: CustomerRepository,
    pub purchases: PurchaseRepository,
    pub expenses: Repository<Expense>,
    pub vet_records: Repository<VetRecord>,
    pub waitlist: Repository<WaitlistEntry>,
    pub reminders: Repository<Reminder>,
    pub files: Repository<FileRecord>,
    pub testimonials: TestimonialRepository,
    pub gallery: Repository<GalleryItem>,
    pub faq: Repository<FaqItem>,
    pub settings: SettingsRepository,
}

impl fmt::Debug for Kennel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kennel")
            .field("backend", &self.store.backend())
            .field("loaded", &self.is_loaded())
            .field("alerts", &self.alerts)
            .finish_non_exhaustive()
    }
}

impl Kennel {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self::with_alerts(store, AlertConfig::default())
    }

    pub fn with_alerts(store: Arc<dyn RemoteStore>, alerts: AlertConfig) -> Self {
        let cache = Arc::new(LocalCache::new());
        let puppies = Repository::new(Arc::clone(&store), Arc::clone(&cache));
        let purchases = PurchaseRepository::new(
            Repository::new(Arc::clone(&store), Arc::clone(&cache)),
            puppies.clone(),
        );
        let puppies = PuppyRepository::new(puppies);
        let customers = CustomerRepository::new(
            Repository::new(Arc::clone(&store), Arc::clone(&cache)),
            purchases.clone(),
        );
        let testimonials =
            TestimonialRepository::new(Repository::new(Arc::clone(&store), Arc::clone(&cache)));

        Self {
            dogs: Repository::new(Arc::clone(&store), Arc::clone(&cache)),
            litters: Repository::new(Arc::clone(&store), Arc::clone(&cache)),
            puppies,
            customers,
            purchases,
            expenses: Repository::new(Arc::clone(&store), Arc::clone(&cache)),
            vet_records: Repository::new(Arc::clone(&store), Arc::clone(&cache)),
            waitlist: Repository::new(Arc::clone(&store), Arc::clone(&cache)),
            reminders: Repository::new(Arc::clone(&store), Arc::clone(&cache)),
            files: Repository::new(Arc::clone(&store), Arc::clone(&cache)),
            testimonials,
            gallery: Repository::new(Arc::clone(&store), Arc::clone(&cache)),
            faq: Repository::new(Arc::clone(&store), Arc::clone(&cache)),
            settings: SettingsRepository::new(Arc::clone(&store), Arc::clone(&cache)),
            cache,
            store,
            alerts,
        }
    }

    /// Build the configured store backend and wrap it.
    pub fn from_config(config: &KennelConfig) -> KennelResult<Self> {
        config.validate()?;
        let store: Arc<dyn RemoteStore> = match &config.store {
            StoreConfig::Memory => Arc::new(MemoryStore::new()),
            StoreConfig::Rest {
                base_url,
                api_key,
                schema,
            } => Arc::new(RestStore::new(&RestStoreConfig {
                base_url: base_url.clone(),
                api_key: api_key.clone(),
                schema: schema.clone(),
                request_timeout: Duration::from_millis(config.request_timeout_ms),
            })?),
        };
        info!(backend = store.backend(), "Store configured");
        Ok(Self::with_alerts(store, config.alerts.clone()))
    }

    /// Bulk load every collection into the cache. Safe to call again to
    /// refresh; the previous contents are replaced.
    pub async fn load(&self) -> LoadReport {
        self.cache.load(self.store.as_ref()).await
    }

    /// Drop the cached mirror and mark it unloaded.
    pub fn shutdown(&self) {
        self.cache.clear();
        info!("Cache torn down");
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.is_loaded()
    }

    pub fn failed_collections(&self) -> Vec<Collection> {
        self.cache.failed_collections()
    }

    pub fn cache(&self) -> &Arc<LocalCache> {
        &self.cache
    }

    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.store
    }

    pub fn alerts(&self) -> &AlertConfig {
        &self.alerts
    }
}
