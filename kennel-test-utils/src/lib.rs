//! KENNEL Test Utilities
//!
//! Shared test infrastructure for the KENNEL workspace:
//! - A fault-injecting store wrapper
//! - Proptest generators for entity types
//! - Fixtures for common scenarios
//! - Assertions for kennel error shapes

// Re-export the store backends tests usually start from
pub use kennel_storage::{Kennel, MemoryStore, RemoteStore};

// Re-export core types for convenience
pub use kennel_core::{
    Amount, Collection, ConsistencyError, Customer, CustomerId, Dog, DogId, DogLocation,
    FaqItem, Gender, KennelError, KennelResult, Litter, LitterId, LitterStatus, Purchase,
    PurchaseId, Puppy, PuppyId, PuppyStatus, Reminder, Row, Settings, StorageError, Testimonial,
    Timestamp, ValidationError, VetRecord, VetRecordType, WaitlistEntry, WaitlistEntryId,
    WaitlistStatus,
};

use async_trait::async_trait;
use kennel_storage::ListQuery;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

// ============================================================================
// FAULT INJECTION
// ============================================================================

/// A remote store operation, for selecting which calls a [`FaultyStore`]
/// fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreOp {
    List,
    Get,
    Insert,
    Update,
    Delete,
}

/// Wraps a store and fails chosen operations on chosen collections with a
/// backend error. Every call is recorded, failed or not.
pub struct FaultyStore {
    inner: Arc<dyn RemoteStore>,
    faults: Mutex<BTreeSet<(StoreOp, Collection)>>,
    calls: Mutex<Vec<(StoreOp, Collection)>>,
}

impl FaultyStore {
    pub fn new(inner: Arc<dyn RemoteStore>) -> Self {
        Self {
            inner,
            faults: Mutex::new(BTreeSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail every later `op` on `collection` until [`FaultyStore::heal`].
    pub fn fail(&self, op: StoreOp, collection: Collection) {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((op, collection));
    }

    /// Stop injecting failures.
    pub fn heal(&self) {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Every call seen so far, in order.
    pub fn calls(&self) -> Vec<(StoreOp, Collection)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls of `op` against `collection`.
    pub fn count(&self, op: StoreOp, collection: Collection) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == (op, collection))
            .count()
    }

    fn check(&self, op: StoreOp, collection: Collection) -> KennelResult<()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((op, collection));
        let failing = self
            .faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(op, collection));
        if failing {
            return Err(StorageError::Backend {
                collection,
                status: Some(503),
                message: format!("injected {op:?} failure"),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for FaultyStore {
    fn backend(&self) -> &'static str {
        "faulty"
    }

    async fn list(&self, collection: Collection, query: &ListQuery) -> KennelResult<Vec<Row>> {
        self.check(StoreOp::List, collection)?;
        self.inner.list(collection, query).await
    }

    async fn get(&self, collection: Collection, id: &str) -> KennelResult<Row> {
        self.check(StoreOp::Get, collection)?;
        self.inner.get(collection, id).await
    }

    async fn insert(&self, collection: Collection, row: Row) -> KennelResult<Row> {
        self.check(StoreOp::Insert, collection)?;
        self.inner.insert(collection, row).await
    }

    async fn update(&self, collection: Collection, id: &str, row: Row) -> KennelResult<Row> {
        self.check(StoreOp::Update, collection)?;
        self.inner.update(collection, id, row).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> KennelResult<()> {
        self.check(StoreOp::Delete, collection)?;
        self.inner.delete(collection, id).await
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for kennel entity types.

    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use proptest::prelude::*;

    /// A calendar date between 2015 and the end of 2029.
    pub fn arb_date() -> impl Strategy<Value = NaiveDate> {
        (0i64..5479).prop_map(|offset| fixtures::date(2015, 1, 1) + Duration::days(offset))
    }

    /// A timestamp between 2020 and 2030, whole seconds.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1577836800i64..1893456000i64).prop_map(|secs| {
            Utc.timestamp_opt(secs, 0)
                .single()
                .unwrap_or_else(Utc::now)
        })
    }

    /// An amount in whole cents up to 10,000.00.
    pub fn arb_amount() -> impl Strategy<Value = Amount> {
        (0u32..1_000_000).prop_map(|cents| Amount::new(f64::from(cents) / 100.0))
    }

    pub fn arb_gender() -> impl Strategy<Value = Gender> {
        prop_oneof![Just(Gender::Male), Just(Gender::Female)]
    }

    pub fn arb_dog_location() -> impl Strategy<Value = DogLocation> {
        prop_oneof![Just(DogLocation::Home), Just(DogLocation::Guardian)]
    }

    pub fn arb_puppy_status() -> impl Strategy<Value = PuppyStatus> {
        prop_oneof![
            Just(PuppyStatus::Available),
            Just(PuppyStatus::Reserved),
            Just(PuppyStatus::Sold),
        ]
    }

    pub fn arb_waitlist_status() -> impl Strategy<Value = WaitlistStatus> {
        prop_oneof![
            Just(WaitlistStatus::Pending),
            Just(WaitlistStatus::Active),
            Just(WaitlistStatus::Fulfilled),
            Just(WaitlistStatus::Cancelled),
        ]
    }

    pub fn arb_vet_record_type() -> impl Strategy<Value = VetRecordType> {
        prop_oneof![
            Just(VetRecordType::Rabies),
            Just(VetRecordType::Vaccination),
            Just(VetRecordType::Checkup),
            Just(VetRecordType::Surgery),
            "[a-z]{3,10}".prop_map(VetRecordType::Other),
        ]
    }

    /// An unsaved dog with arbitrary breeding attributes.
    pub fn arb_dog() -> impl Strategy<Value = Dog> {
        (
            "[A-Z][a-z]{2,10}",
            proptest::option::of(arb_gender()),
            proptest::option::of(arb_date()),
            arb_dog_location(),
            any::<bool>(),
            proptest::option::of(arb_date()),
            proptest::option::of(60u32..400),
        )
            .prop_map(
                |(name, gender, birthday, location, is_breeding, last_heat_date, cycle)| Dog {
                    name,
                    breed: "Goldendoodle".to_string(),
                    gender,
                    birthday,
                    location,
                    is_breeding,
                    last_heat_date,
                    heat_cycle_length: cycle,
                    ..Default::default()
                },
            )
    }

    /// A stored waitlist entry: id and creation time assigned.
    pub fn arb_waitlist_entry() -> impl Strategy<Value = WaitlistEntry> {
        (
            "[a-f0-9]{12}",
            "[A-Z][a-z]{2,8}",
            arb_waitlist_status(),
            any::<bool>(),
            proptest::option::of(arb_timestamp()),
        )
            .prop_map(|(id, first_name, status, deposit_paid, created_at)| {
                WaitlistEntry {
                    id: Some(WaitlistEntryId::new(id)),
                    first_name,
                    status,
                    deposit_paid,
                    created_at,
                    ..Default::default()
                }
            })
    }

    /// A list of stored waitlist entries with distinct ids.
    pub fn arb_waitlist(max: usize) -> impl Strategy<Value = Vec<WaitlistEntry>> {
        proptest::collection::vec(arb_waitlist_entry(), 0..max).prop_map(|entries| {
            entries
                .into_iter()
                .enumerate()
                .map(|(i, mut entry)| {
                    entry.id = Some(WaitlistEntryId::new(format!("entry-{i}")));
                    entry
                })
                .collect()
        })
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built entities and kennels for common scenarios.

    use super::*;
    use chrono::{NaiveDate, Utc};

    /// A calendar date. Out-of-range parts give `NaiveDate::MIN`.
    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
    }

    /// Midnight UTC of `date`.
    pub fn midnight(date: NaiveDate) -> Timestamp {
        date.and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now)
    }

    pub fn dog(name: &str) -> Dog {
        Dog {
            name: name.to_string(),
            breed: "Goldendoodle".to_string(),
            color: "apricot".to_string(),
            is_public: true,
            location: DogLocation::Home,
            ..Default::default()
        }
    }

    /// A breeding female kept at home.
    pub fn breeding_female(name: &str) -> Dog {
        Dog {
            gender: Some(Gender::Female),
            is_breeding: true,
            ..dog(name)
        }
    }

    pub fn stud(name: &str) -> Dog {
        Dog {
            gender: Some(Gender::Male),
            is_breeding: true,
            ..dog(name)
        }
    }

    /// A dog living with a guardian family.
    pub fn guardian_dog(name: &str) -> Dog {
        Dog {
            location: DogLocation::Guardian,
            guardian_family: Some(kennel_core::GuardianFamily {
                name: format!("{name}'s family"),
                ..Default::default()
            }),
            ..dog(name)
        }
    }

    pub fn litter(name: &str) -> Litter {
        Litter {
            name: name.to_string(),
            breed: "Goldendoodle".to_string(),
            status: LitterStatus::Planned,
            ..Default::default()
        }
    }

    pub fn puppy(name: &str, price: f64) -> Puppy {
        Puppy {
            name: name.to_string(),
            color: "cream".to_string(),
            status: PuppyStatus::Available,
            price: Amount::new(price),
            is_public: true,
            ..Default::default()
        }
    }

    pub fn customer(name: &str) -> Customer {
        Customer {
            name: name.to_string(),
            email: Some(format!(
                "{}@example.com",
                name.to_lowercase().replace(' ', ".")
            )),
            ..Default::default()
        }
    }

    pub fn purchase(customer_id: &CustomerId, puppy_id: &PuppyId, amount: f64) -> Purchase {
        Purchase {
            customer_id: Some(customer_id.clone()),
            puppy_id: Some(puppy_id.clone()),
            amount: Amount::new(amount),
            deposit_amount: Amount::new(300.0),
            purchase_date: Some(date(2024, 3, 1)),
            payment_method: Some("card".to_string()),
            ..Default::default()
        }
    }

    pub fn vet_record(
        dog_id: &DogId,
        record_type: VetRecordType,
        visit_date: NaiveDate,
        expiration_date: Option<NaiveDate>,
    ) -> VetRecord {
        VetRecord {
            dog_id: Some(dog_id.clone()),
            record_type,
            visit_date: Some(visit_date),
            expiration_date,
            ..Default::default()
        }
    }

    pub fn waitlist_entry(first_name: &str, status: WaitlistStatus, deposit_paid: bool) -> WaitlistEntry {
        WaitlistEntry {
            first_name: first_name.to_string(),
            last_name: "Family".to_string(),
            status,
            deposit_paid,
            ..Default::default()
        }
    }

    pub fn reminder(title: &str, date: NaiveDate) -> Reminder {
        Reminder {
            title: title.to_string(),
            date: Some(date),
            ..Default::default()
        }
    }

    pub fn testimonial(author_name: &str) -> Testimonial {
        Testimonial {
            author_name: author_name.to_string(),
            content: "Our puppy is the best thing that happened to us.".to_string(),
            rating: Some(5),
            ..Default::default()
        }
    }

    pub fn faq(question: &str, category: &str) -> FaqItem {
        FaqItem {
            question: question.to_string(),
            answer: "Yes.".to_string(),
            category: Some(category.to_string()),
            is_public: true,
            ..Default::default()
        }
    }

    /// A kennel over `store`, bulk loaded.
    pub async fn kennel_over(store: Arc<dyn RemoteStore>) -> Kennel {
        let kennel = Kennel::new(store);
        kennel.load().await;
        kennel
    }

    /// A loaded kennel over an empty in-memory store. The store handle is
    /// returned for direct inspection.
    pub async fn memory_kennel() -> (Arc<MemoryStore>, Kennel) {
        let store = Arc::new(MemoryStore::new());
        let kennel = kennel_over(store.clone()).await;
        (store, kennel)
    }

    /// A loaded kennel whose store can be told to fail.
    pub async fn faulty_kennel() -> (Arc<FaultyStore>, Kennel) {
        let store = Arc::new(FaultyStore::new(Arc::new(MemoryStore::new())));
        let kennel = kennel_over(store.clone()).await;
        (store, kennel)
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for kennel error shapes.

    use super::*;

    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &KennelResult<T>, collection: Collection) {
        match result {
            Err(KennelError::Storage(StorageError::NotFound { collection: c, .. })) => {
                assert_eq!(*c, collection, "Wrong collection in NotFound error");
            }
            other => panic!("Expected NotFound for {collection}, got: {other:?}"),
        }
    }

    /// Assert the write was rejected for pointing at a missing entity.
    #[track_caller]
    pub fn assert_dangling_reference<T: std::fmt::Debug>(result: &KennelResult<T>, field: &str) {
        match result {
            Err(KennelError::Validation(ValidationError::DanglingReference { field: f, .. })) => {
                assert_eq!(f, field, "Wrong field in DanglingReference error");
            }
            other => panic!("Expected DanglingReference on {field}, got: {other:?}"),
        }
    }

    /// Assert the store itself reported the failure.
    #[track_caller]
    pub fn assert_remote_error<T: std::fmt::Debug>(result: &KennelResult<T>) {
        match result {
            Err(err) if err.is_remote() => {}
            other => panic!("Expected a remote store error, got: {other:?}"),
        }
    }

    /// Assert a side effect failed and whether it was rolled back.
    #[track_caller]
    pub fn assert_side_effect_failed<T: std::fmt::Debug>(
        result: &KennelResult<T>,
        step: &str,
        compensated: bool,
    ) {
        match result {
            Err(KennelError::Consistency(ConsistencyError::SideEffectFailed {
                step: s,
                compensated: c,
                ..
            })) => {
                assert_eq!(s, step, "Wrong failed step");
                assert_eq!(*c, compensated, "Wrong compensation flag");
            }
            other => panic!("Expected SideEffectFailed on '{step}', got: {other:?}"),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use kennel_core::derived::{active_queue, queue_position};
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_faulty_store_fails_selected_ops_only() {
        let store = FaultyStore::new(Arc::new(MemoryStore::new()));
        store.fail(StoreOp::Insert, Collection::Dogs);

        let result = store.insert(Collection::Dogs, Row::new()).await;
        assertions::assert_remote_error(&result);
        assert!(store.insert(Collection::Litters, Row::new()).await.is_ok());
        assert!(store.list(Collection::Dogs, &ListQuery::new()).await.is_ok());

        store.heal();
        assert!(store.insert(Collection::Dogs, Row::new()).await.is_ok());
        assert_eq!(store.count(StoreOp::Insert, Collection::Dogs), 2);
        assert_eq!(store.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_memory_kennel_is_loaded_and_empty() {
        let (store, kennel) = fixtures::memory_kennel().await;
        assert!(kennel.is_loaded());
        assert!(kennel.failed_collections().is_empty());
        assert!(kennel.dogs.get_all().is_empty());
        assert!(store.is_empty(Collection::Dogs));
    }

    #[test]
    fn test_fixture_dates() {
        assert_eq!(fixtures::date(2024, 2, 29).to_string(), "2024-02-29");
        assert_eq!(fixtures::date(2023, 2, 29), chrono::NaiveDate::MIN);
        assert_eq!(
            fixtures::midnight(fixtures::date(2024, 1, 1)).to_rfc3339(),
            "2024-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_guardian_fixture_is_not_home() {
        let dog = fixtures::guardian_dog("Maple");
        assert!(!dog.is_home());
        assert!(fixtures::breeding_female("Juniper").is_female());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_queue_positions_are_contiguous(entries in generators::arb_waitlist(12)) {
            let queue: Vec<WaitlistEntryId> = active_queue(&entries)
                .into_iter()
                .filter_map(|e| e.id.clone())
                .collect();
            for (index, id) in queue.iter().enumerate() {
                prop_assert_eq!(queue_position(&entries, id), Some(index + 1));
            }
            for entry in entries.iter().filter(|e| !e.holds_queue_place()) {
                let id = entry.id.clone().unwrap_or_else(|| WaitlistEntryId::new(""));
                prop_assert_eq!(queue_position(&entries, &id), None);
            }
        }

        #[test]
        fn prop_generated_dogs_encode(dog in generators::arb_dog()) {
            use kennel_core::StoreRecord;
            let row = dog.to_row().map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert!(row.contains_key("heat_cycle_days"));
            prop_assert!(!row.contains_key("id"));
        }
    }
}
