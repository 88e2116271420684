//! Property-Based Tests for the Local Cache
//!
//! **Property: Cache mirrors store**
//!
//! For any set of saved dogs, a fresh bulk load yields the same entities in
//! the collection's declared order, and loading again changes nothing.
//!
//! **Property: Failed writes are invisible**
//!
//! For any entity and any failing store operation, the cache snapshot after
//! the failed write equals the snapshot before it.

use kennel_core::{Collection, Dog};
use kennel_test_utils::{fixtures, generators, StoreOp};
use proptest::prelude::*;
use tokio::runtime::{Builder, Runtime};

fn test_runtime() -> Result<Runtime, TestCaseError> {
    Builder::new_current_thread()
        .build()
        .map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}

fn failing_op() -> impl Strategy<Value = StoreOp> {
    prop_oneof![Just(StoreOp::Insert), Just(StoreOp::Update)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_reload_mirrors_saved_dogs(dogs in proptest::collection::vec(generators::arb_dog(), 0..8)) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let (_store, kennel) = fixtures::memory_kennel().await;
            let mut saved = Vec::new();
            for dog in &dogs {
                let stored = kennel
                    .dogs
                    .save(dog)
                    .await
                    .map_err(|e| TestCaseError::fail(e.to_string()))?;
                saved.push(stored);
            }

            let report = kennel.load().await;
            prop_assert!(report.is_complete());
            let first = kennel.cache().snapshot();
            kennel.load().await;
            prop_assert_eq!(&kennel.cache().snapshot(), &first);

            let names: Vec<&str> = first.dogs.iter().map(|d| d.name.as_str()).collect();
            let mut sorted = names.clone();
            sorted.sort_unstable();
            prop_assert_eq!(names, sorted);

            prop_assert_eq!(first.dogs.len(), saved.len());
            for dog in &saved {
                prop_assert!(first.dogs.contains(dog));
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn prop_failed_write_leaves_snapshot(
        existing in generators::arb_dog(),
        incoming in generators::arb_dog(),
        op in failing_op(),
    ) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let (store, kennel) = fixtures::faulty_kennel().await;
            let existing = kennel
                .dogs
                .save(&existing)
                .await
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            let before = kennel.cache().snapshot();

            store.fail(op, Collection::Dogs);
            let attempt = match op {
                StoreOp::Update => Dog {
                    id: existing.id.clone(),
                    ..incoming
                },
                _ => incoming,
            };
            prop_assert!(kennel.dogs.save(&attempt).await.is_err());
            prop_assert_eq!(&kennel.cache().snapshot(), &before);
            Ok::<(), TestCaseError>(())
        })?;
    }
}
