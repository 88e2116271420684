//! Local cache: the in-process mirror of every collection.
//!
//! Lifecycle: empty and unloaded on construction, filled by one bulk load,
//! then changed only by successful repository writes until [`LocalCache::clear`].
//! Reads never fail; a poisoned lock is recovered because the state is only
//! ever replaced wholesale or edited by single-entry operations.

use crate::store::{ListQuery, RemoteStore};
use kennel_core::schema::row_id;
use kennel_core::{
    Collection, Customer, Dog, EntityIdType, Expense, FaqItem, FileRecord, GalleryItem,
    InsertPosition, KennelError, KennelResult, Litter, Purchase, Puppy, Reminder, Settings,
    StoreRecord, Testimonial, VetRecord, WaitlistEntry,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;
use tracing::{info, warn};

// ============================================================================
// STATE
// ============================================================================

/// Everything the cache holds. Each sequence keeps its collection's declared
/// ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheState {
    pub loaded: bool,
    pub dogs: Vec<Dog>,
    pub litters: Vec<Litter>,
    pub puppies: Vec<Puppy>,
    pub customers: Vec<Customer>,
    pub purchases: Vec<Purchase>,
    pub expenses: Vec<Expense>,
    pub vet_records: Vec<VetRecord>,
    pub waitlist: Vec<WaitlistEntry>,
    pub reminders: Vec<Reminder>,
    pub files: Vec<FileRecord>,
    pub testimonials: Vec<Testimonial>,
    pub gallery: Vec<GalleryItem>,
    pub faq: Vec<FaqItem>,
    pub settings: Settings,
    pub failed: BTreeSet<Collection>,
}

/// An entity kind with its own ordered sequence in [`CacheState`].
pub trait CachedEntity: StoreRecord {
    fn slot(state: &CacheState) -> &Vec<Self>;
    fn slot_mut(state: &mut CacheState) -> &mut Vec<Self>;
}

macro_rules! cached_entities {
    ($($ty:ty => $field:ident),* $(,)?) => {
        $(
            impl CachedEntity for $ty {
                fn slot(state: &CacheState) -> &Vec<Self> {
                    &state.$field
                }

                fn slot_mut(state: &mut CacheState) -> &mut Vec<Self> {
                    &mut state.$field
                }
            }
        )*
    };
}

cached_entities! {
    Dog => dogs,
    Litter => litters,
    Puppy => puppies,
    Customer => customers,
    Purchase => purchases,
    Expense => expenses,
    VetRecord => vet_records,
    WaitlistEntry => waitlist,
    Reminder => reminders,
    FileRecord => files,
    Testimonial => testimonials,
    GalleryItem => gallery,
    FaqItem => faq,
}

impl CacheState {
    /// Whether a collection holds an entity with this raw id.
    pub fn contains(&self, collection: Collection, id: &str) -> bool {
        fn has<E: CachedEntity>(state: &CacheState, id: &str) -> bool {
            E::slot(state)
                .iter()
                .any(|e| e.id().is_some_and(|eid| eid.as_str() == id))
        }

        match collection {
            Collection::Dogs => has::<Dog>(self, id),
            Collection::Litters => has::<Litter>(self, id),
            Collection::Puppies => has::<Puppy>(self, id),
            Collection::Customers => has::<Customer>(self, id),
            Collection::Purchases => has::<Purchase>(self, id),
            Collection::Expenses => has::<Expense>(self, id),
            Collection::VetRecords => has::<VetRecord>(self, id),
            Collection::Waitlist => has::<WaitlistEntry>(self, id),
            Collection::Reminders => has::<Reminder>(self, id),
            Collection::Files => has::<FileRecord>(self, id),
            Collection::Testimonials => has::<Testimonial>(self, id),
            Collection::Gallery => has::<GalleryItem>(self, id),
            Collection::Faq => has::<FaqItem>(self, id),
            Collection::Settings => self
                .settings
                .id
                .as_ref()
                .is_some_and(|sid| sid.as_str() == id),
        }
    }
}

// ============================================================================
// LOAD REPORT
// ============================================================================

/// Outcome of a bulk load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Entities cached per collection.
    pub loaded: BTreeMap<Collection, usize>,
    /// Collections whose list request failed; they are cached empty.
    pub failed: BTreeMap<Collection, KennelError>,
    /// Rows that could not be decoded, per collection.
    pub skipped_rows: BTreeMap<Collection, usize>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_collections(&self) -> Vec<Collection> {
        self.failed.keys().copied().collect()
    }

    pub fn total_loaded(&self) -> usize {
        self.loaded.values().sum()
    }
}

// ============================================================================
// LOCAL CACHE
// ============================================================================

/// Shared in-process mirror of the remote store.
#[derive(Debug, Default)]
pub struct LocalCache {
    state: RwLock<CacheState>,
}

impl LocalCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a closure against the current state.
    pub fn read<R>(&self, f: impl FnOnce(&CacheState) -> R) -> R {
        f(&self.read_guard())
    }

    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut CacheState) -> R) -> R {
        f(&mut self.write_guard())
    }

    pub fn is_loaded(&self) -> bool {
        self.read(|s| s.loaded)
    }

    /// Collections whose last bulk load failed. Their cached sequence is empty
    /// whether or not the store has rows.
    pub fn failed_collections(&self) -> Vec<Collection> {
        self.read(|s| s.failed.iter().copied().collect())
    }

    pub fn is_failed(&self, collection: Collection) -> bool {
        self.read(|s| s.failed.contains(&collection))
    }

    /// Copy of the full state.
    pub fn snapshot(&self) -> CacheState {
        self.read(CacheState::clone)
    }

    pub fn all<E: CachedEntity>(&self) -> Vec<E> {
        self.read(|s| E::slot(s).clone())
    }

    pub fn find<E: CachedEntity>(&self, id: &E::Id) -> Option<E> {
        self.read(|s| E::slot(s).iter().find(|e| e.id() == Some(id)).cloned())
    }

    pub fn filter<E, P>(&self, predicate: P) -> Vec<E>
    where
        E: CachedEntity,
        P: Fn(&E) -> bool,
    {
        self.read(|s| E::slot(s).iter().filter(|e| predicate(*e)).cloned().collect())
    }

    pub fn count<E: CachedEntity>(&self) -> usize {
        self.read(|s| E::slot(s).len())
    }

    pub fn contains(&self, collection: Collection, id: &str) -> bool {
        self.read(|s| s.contains(collection, id))
    }

    /// Insert a freshly created entity at its collection's insert position.
    pub(crate) fn insert<E: CachedEntity>(&self, entity: E) {
        self.write(|s| {
            let slot = E::slot_mut(s);
            match E::COLLECTION.insert_position() {
                InsertPosition::Append => slot.push(entity),
                InsertPosition::Prepend => slot.insert(0, entity),
            }
        });
    }

    /// Replace the entry with the same id in place, or insert it when the
    /// cache does not hold it yet.
    pub(crate) fn replace<E: CachedEntity>(&self, entity: E) {
        let existing = self.write(|s| {
            let slot = E::slot_mut(s);
            let position = slot.iter().position(|e| e.id().is_some() && e.id() == entity.id());
            match position {
                Some(index) => {
                    slot[index] = entity.clone();
                    true
                }
                None => false,
            }
        });
        if !existing {
            self.insert(entity);
        }
    }

    pub(crate) fn remove<E: CachedEntity>(&self, id: &E::Id) {
        self.write(|s| E::slot_mut(s).retain(|e| e.id() != Some(id)));
    }

    pub fn settings(&self) -> Settings {
        self.read(|s| s.settings.clone())
    }

    pub(crate) fn set_settings(&self, settings: Settings) {
        self.write(|s| s.settings = settings);
    }

    /// Tear the mirror down: drop every entry and mark the cache unloaded.
    pub fn clear(&self) {
        self.write(|s| *s = CacheState::default());
    }

    /// Bulk load every collection concurrently and replace the cached state.
    ///
    /// A failed collection is cached empty and recorded in the report and in
    /// [`LocalCache::failed_collections`]; the cache is marked loaded either
    /// way. Rows that fail to decode are skipped.
    pub async fn load(&self, store: &dyn RemoteStore) -> LoadReport {
        let started = Instant::now();
        let (
            dogs,
            litters,
            puppies,
            customers,
            purchases,
            expenses,
            vet_records,
            waitlist,
            reminders,
            files,
            testimonials,
            gallery,
            faq,
            settings,
        ) = tokio::join!(
            fetch::<Dog>(store),
            fetch::<Litter>(store),
            fetch::<Puppy>(store),
            fetch::<Customer>(store),
            fetch::<Purchase>(store),
            fetch::<Expense>(store),
            fetch::<VetRecord>(store),
            fetch::<WaitlistEntry>(store),
            fetch::<Reminder>(store),
            fetch::<FileRecord>(store),
            fetch::<Testimonial>(store),
            fetch::<GalleryItem>(store),
            fetch::<FaqItem>(store),
            fetch::<Settings>(store),
        );

        let mut report = LoadReport::default();
        let mut state = CacheState {
            loaded: true,
            ..CacheState::default()
        };
        state.dogs = absorb(&mut report, &mut state.failed, dogs);
        state.litters = absorb(&mut report, &mut state.failed, litters);
        state.puppies = absorb(&mut report, &mut state.failed, puppies);
        state.customers = absorb(&mut report, &mut state.failed, customers);
        state.purchases = absorb(&mut report, &mut state.failed, purchases);
        state.expenses = absorb(&mut report, &mut state.failed, expenses);
        state.vet_records = absorb(&mut report, &mut state.failed, vet_records);
        state.waitlist = absorb(&mut report, &mut state.failed, waitlist);
        state.reminders = absorb(&mut report, &mut state.failed, reminders);
        state.files = absorb(&mut report, &mut state.failed, files);
        state.testimonials = absorb(&mut report, &mut state.failed, testimonials);
        state.gallery = absorb(&mut report, &mut state.failed, gallery);
        state.faq = absorb(&mut report, &mut state.failed, faq);
        state.settings = absorb(&mut report, &mut state.failed, settings)
            .into_iter()
            .next()
            .unwrap_or_default();

        self.write(|s| *s = state);

        info!(
            backend = store.backend(),
            entities = report.total_loaded(),
            failed = report.failed.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Cache loaded"
        );
        report
    }
}

/// Rows of one collection plus the number of undecodable rows skipped.
type Fetched<E> = (Collection, KennelResult<(Vec<E>, usize)>);

async fn fetch<E: StoreRecord>(store: &dyn RemoteStore) -> Fetched<E> {
    let collection = E::COLLECTION;
    let query = ListQuery::for_collection(collection);
    let result = store.list(collection, &query).await.map(|rows| {
        let mut skipped = 0;
        let entities = rows
            .iter()
            .filter_map(|row| match E::from_row(row) {
                Ok(entity) => Some(entity),
                Err(err) => {
                    skipped += 1;
                    warn!(
                        %collection,
                        id = row_id(row).unwrap_or("<none>"),
                        error = %err,
                        "Skipping undecodable row"
                    );
                    None
                }
            })
            .collect();
        (entities, skipped)
    });
    (collection, result)
}

fn absorb<E>(
    report: &mut LoadReport,
    failed: &mut BTreeSet<Collection>,
    fetched: Fetched<E>,
) -> Vec<E> {
    let (collection, result) = fetched;
    match result {
        Ok((entities, skipped)) => {
            report.loaded.insert(collection, entities.len());
            if skipped > 0 {
                report.skipped_rows.insert(collection, skipped);
            }
            entities
        }
        Err(err) => {
            warn!(%collection, error = %err, "Collection failed to load, caching it empty");
            failed.insert(collection);
            report.loaded.insert(collection, 0);
            report.failed.insert(collection, err);
            Vec::new()
        }
    }
}
