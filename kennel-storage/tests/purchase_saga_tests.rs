//! Purchase side effects on puppies, customer cascades, and compensation
//! when a follow-up write fails.

use kennel_core::{
    Collection, ConsistencyError, Customer, KennelError, KennelResult, Purchase, Puppy,
    PuppyStatus, ValidationError,
};
use kennel_storage::Kennel;
use kennel_test_utils::{assertions, fixtures, FaultyStore, StoreOp};

async fn seed_sale(kennel: &Kennel) -> (Customer, Puppy) {
    let customer = kennel
        .customers
        .save(&fixtures::customer("Ada Park"))
        .await
        .unwrap();
    let puppy = kennel
        .puppies
        .save(&fixtures::puppy("Biscuit", 2800.0))
        .await
        .unwrap();
    (customer, puppy)
}

fn sale(customer: &Customer, puppy: &Puppy) -> Purchase {
    fixtures::purchase(
        customer.id.as_ref().unwrap(),
        puppy.id.as_ref().unwrap(),
        2800.0,
    )
}

#[track_caller]
fn assert_already_claimed<T: std::fmt::Debug>(result: &KennelResult<T>, holder: &Purchase) {
    match result {
        Err(KennelError::Validation(ValidationError::AlreadyClaimed {
            field,
            collection,
            holder: held_by,
            ..
        })) => {
            assert_eq!(field, "puppy_id");
            assert_eq!(*collection, Collection::Purchases);
            assert_eq!(held_by, holder.id.as_ref().unwrap().as_str());
        }
        other => panic!("expected AlreadyClaimed, got {other:?}"),
    }
}

// ============================================================================
// PUPPY STATUS
// ============================================================================

#[tokio::test]
async fn purchase_marks_puppy_sold_and_delete_releases_it() {
    let (_store, kennel) = fixtures::memory_kennel().await;
    let (customer, puppy) = seed_sale(&kennel).await;
    let puppy_id = puppy.id.clone().unwrap();

    let purchase = kennel.purchases.save(&sale(&customer, &puppy)).await.unwrap();
    let sold = kennel.puppies.get_by_id(&puppy_id).unwrap();
    assert_eq!(sold.status, PuppyStatus::Sold);
    assert_eq!(sold.customer_id, customer.id);
    assert_eq!(kennel.purchases.get_by_puppy(&puppy_id), Some(purchase.clone()));

    kennel.purchases.delete(purchase.id.as_ref().unwrap()).await.unwrap();
    let released = kennel.puppies.get_by_id(&puppy_id).unwrap();
    assert_eq!(released.status, PuppyStatus::Available);
    assert_eq!(released.customer_id, None);
    assert!(kennel.purchases.get_all().is_empty());
}

#[tokio::test]
async fn moving_a_purchase_releases_the_previous_puppy() {
    let (_store, kennel) = fixtures::memory_kennel().await;
    let (customer, first) = seed_sale(&kennel).await;
    let second = kennel
        .puppies
        .save(&fixtures::puppy("Waffles", 2600.0))
        .await
        .unwrap();

    let purchase = kennel.purchases.save(&sale(&customer, &first)).await.unwrap();
    let moved = Purchase {
        puppy_id: second.id.clone(),
        ..purchase
    };
    kennel.purchases.save(&moved).await.unwrap();

    let first = kennel.puppies.get_by_id(first.id.as_ref().unwrap()).unwrap();
    let second = kennel.puppies.get_by_id(second.id.as_ref().unwrap()).unwrap();
    assert_eq!(first.status, PuppyStatus::Available);
    assert_eq!(first.customer_id, None);
    assert_eq!(second.status, PuppyStatus::Sold);
    assert_eq!(kennel.purchases.count(), 1);
}

#[tokio::test]
async fn purchase_totals() {
    let (_store, kennel) = fixtures::memory_kennel().await;
    let (customer, puppy) = seed_sale(&kennel).await;
    let other = kennel
        .puppies
        .save(&fixtures::puppy("Waffles", 2600.0))
        .await
        .unwrap();

    kennel.purchases.save(&sale(&customer, &puppy)).await.unwrap();
    let mut second = sale(&customer, &other);
    second.amount = 2600.0.into();
    kennel.purchases.save(&second).await.unwrap();

    assert_eq!(kennel.purchases.total_revenue().value(), 5400.0);
    assert_eq!(kennel.purchases.total_deposits().value(), 600.0);
    assert_eq!(
        kennel.purchases.get_by_customer(customer.id.as_ref().unwrap()).len(),
        2
    );
}

#[tokio::test]
async fn sold_puppy_cannot_be_bought_twice() {
    let (store, kennel) = fixtures::memory_kennel().await;
    let (ada, puppy) = seed_sale(&kennel).await;
    let ben = kennel.customers.save(&fixtures::customer("Ben Lee")).await.unwrap();
    let puppy_id = puppy.id.clone().unwrap();

    let first = kennel.purchases.save(&sale(&ada, &puppy)).await.unwrap();
    let result = kennel.purchases.save(&sale(&ben, &puppy)).await;

    assert_already_claimed(&result, &first);
    assert_eq!(store.len(Collection::Purchases), 1);
    let held = kennel.puppies.get_by_id(&puppy_id).unwrap();
    assert_eq!(held.status, PuppyStatus::Sold);
    assert_eq!(held.customer_id, ada.id);

    // Re-saving the holding purchase is not a second claim.
    let mut edited = first.clone();
    edited.payment_status = Some("paid".to_string());
    kennel.purchases.save(&edited).await.unwrap();

    kennel.purchases.delete(first.id.as_ref().unwrap()).await.unwrap();
    assert_eq!(
        kennel.puppies.get_by_id(&puppy_id).unwrap().status,
        PuppyStatus::Available
    );
    kennel.purchases.save(&sale(&ben, &puppy)).await.unwrap();
    assert_eq!(kennel.puppies.get_by_id(&puppy_id).unwrap().customer_id, ben.id);
}

#[tokio::test]
async fn moving_a_purchase_onto_a_sold_puppy_is_rejected() {
    let (_store, kennel) = fixtures::memory_kennel().await;
    let (ada, first) = seed_sale(&kennel).await;
    let ben = kennel.customers.save(&fixtures::customer("Ben Lee")).await.unwrap();
    let second = kennel
        .puppies
        .save(&fixtures::puppy("Waffles", 2600.0))
        .await
        .unwrap();

    let ada_purchase = kennel.purchases.save(&sale(&ada, &first)).await.unwrap();
    let ben_purchase = kennel.purchases.save(&sale(&ben, &second)).await.unwrap();

    let moved = Purchase {
        puppy_id: first.id.clone(),
        ..ben_purchase.clone()
    };
    let result = kennel.purchases.save(&moved).await;

    assert_already_claimed(&result, &ada_purchase);
    assert_eq!(kennel.purchases.get_by_id(ben_purchase.id.as_ref().unwrap()), Some(ben_purchase));
    let second = kennel.puppies.get_by_id(second.id.as_ref().unwrap()).unwrap();
    assert_eq!(second.status, PuppyStatus::Sold);
    assert_eq!(second.customer_id, ben.id);
}

#[tokio::test]
async fn claim_check_asks_the_store_when_purchases_are_not_cached() {
    let (store, kennel) = fixtures::faulty_kennel().await;
    let (ada, puppy) = seed_sale(&kennel).await;
    let ben = kennel.customers.save(&fixtures::customer("Ben Lee")).await.unwrap();
    let first = kennel.purchases.save(&sale(&ada, &puppy)).await.unwrap();

    store.fail(StoreOp::List, Collection::Purchases);
    kennel.load().await;
    store.heal();
    assert!(kennel.purchases.get_all().is_empty());

    let result = kennel.purchases.save(&sale(&ben, &puppy)).await;
    assert_already_claimed(&result, &first);
    assert_eq!(store.count(StoreOp::Insert, Collection::Purchases), 1);
}

#[tokio::test]
async fn puppy_of_a_deleted_litter_can_still_be_sold() {
    let (_store, kennel) = fixtures::memory_kennel().await;
    let customer = kennel.customers.save(&fixtures::customer("Ada Park")).await.unwrap();
    let litter = kennel.litters.save(&fixtures::litter("Spring")).await.unwrap();
    let puppy = kennel
        .puppies
        .save(&Puppy {
            litter_id: litter.id.clone(),
            ..fixtures::puppy("Biscuit", 2800.0)
        })
        .await
        .unwrap();
    kennel.litters.delete(litter.id.as_ref().unwrap()).await.unwrap();

    let purchase = kennel.purchases.save(&sale(&customer, &puppy)).await.unwrap();

    let sold = kennel.puppies.get_by_id(puppy.id.as_ref().unwrap()).unwrap();
    assert_eq!(sold.status, PuppyStatus::Sold);
    assert_eq!(sold.litter_id, litter.id);

    kennel.purchases.delete(purchase.id.as_ref().unwrap()).await.unwrap();
    let released = kennel.puppies.get_by_id(puppy.id.as_ref().unwrap()).unwrap();
    assert_eq!(released.status, PuppyStatus::Available);
}

#[tokio::test]
async fn direct_puppy_edits_keep_the_sale() {
    let (_store, kennel) = fixtures::memory_kennel().await;
    let (customer, puppy) = seed_sale(&kennel).await;
    kennel.purchases.save(&sale(&customer, &puppy)).await.unwrap();
    let sold = kennel.puppies.get_by_id(puppy.id.as_ref().unwrap()).unwrap();

    let edited = kennel
        .puppies
        .save(&Puppy {
            personality: Some("Bold and curious".to_string()),
            status: PuppyStatus::Available,
            customer_id: None,
            ..sold
        })
        .await
        .unwrap();
    assert_eq!(edited.personality.as_deref(), Some("Bold and curious"));
    assert_eq!(edited.status, PuppyStatus::Sold);
    assert_eq!(edited.customer_id, customer.id);

    let unsold = kennel
        .puppies
        .save(&Puppy {
            status: PuppyStatus::Sold,
            customer_id: customer.id.clone(),
            ..fixtures::puppy("Waffles", 2600.0)
        })
        .await
        .unwrap();
    assert_eq!(unsold.status, PuppyStatus::Available);
    assert_eq!(unsold.customer_id, None);
    assert_eq!(kennel.puppies.get_by_status(PuppyStatus::Sold).len(), 1);
}

// ============================================================================
// COMPENSATION
// ============================================================================

#[tokio::test]
async fn failed_puppy_update_rolls_back_the_purchase() {
    let (store, kennel) = fixtures::faulty_kennel().await;
    let (customer, puppy) = seed_sale(&kennel).await;
    let before = kennel.cache().snapshot();

    store.fail(StoreOp::Update, Collection::Puppies);
    let result = kennel.purchases.save(&sale(&customer, &puppy)).await;

    assertions::assert_side_effect_failed(&result, "mark puppy sold", true);
    assert_eq!(kennel.cache().snapshot(), before);
    assert_eq!(store.count(StoreOp::Delete, Collection::Purchases), 1);

    store.heal();
    kennel.load().await;
    assert!(kennel.purchases.get_all().is_empty());
    assert_eq!(
        kennel.puppies.get_by_id(puppy.id.as_ref().unwrap()).unwrap().status,
        PuppyStatus::Available
    );
}

#[tokio::test]
async fn failed_undo_reports_divergence() {
    let (store, kennel) = fixtures::faulty_kennel().await;
    let (customer, puppy) = seed_sale(&kennel).await;

    store.fail(StoreOp::Update, Collection::Puppies);
    store.fail(StoreOp::Delete, Collection::Purchases);
    let result = kennel.purchases.save(&sale(&customer, &puppy)).await;

    match result {
        Err(KennelError::Consistency(ConsistencyError::CompensationFailed { step, .. })) => {
            assert_eq!(step, "mark puppy sold");
        }
        other => panic!("expected CompensationFailed, got {other:?}"),
    }
    // The purchase write stuck; the cache reflects what the store holds.
    assert_eq!(kennel.purchases.count(), 1);
}

#[tokio::test]
async fn failed_purchase_insert_touches_nothing() {
    let (store, kennel) = fixtures::faulty_kennel().await;
    let (customer, puppy) = seed_sale(&kennel).await;
    let before = kennel.cache().snapshot();

    store.fail(StoreOp::Insert, Collection::Purchases);
    let result = kennel.purchases.save(&sale(&customer, &puppy)).await;

    assertions::assert_remote_error(&result);
    assert_eq!(kennel.cache().snapshot(), before);
    assert_eq!(store.count(StoreOp::Update, Collection::Puppies), 0);
}

#[tokio::test]
async fn failed_purchase_delete_restores_the_puppy() {
    let (store, kennel) = fixtures::faulty_kennel().await;
    let (customer, puppy) = seed_sale(&kennel).await;
    let purchase = kennel.purchases.save(&sale(&customer, &puppy)).await.unwrap();
    let before = kennel.cache().snapshot();

    store.fail(StoreOp::Delete, Collection::Purchases);
    let result = kennel.purchases.delete(purchase.id.as_ref().unwrap()).await;

    assertions::assert_side_effect_failed(&result, "delete purchase", true);
    let restored = kennel.puppies.get_by_id(puppy.id.as_ref().unwrap()).unwrap();
    assert_eq!(restored.status, PuppyStatus::Sold);
    assert_eq!(restored.customer_id, customer.id);
    assert_eq!(kennel.purchases.count(), 1);
    assert_eq!(
        before.puppies.len(),
        kennel.cache().snapshot().puppies.len()
    );
}

// ============================================================================
// CUSTOMER CASCADE
// ============================================================================

#[tokio::test]
async fn deleting_a_customer_deletes_purchases_and_releases_puppies() {
    let (store, kennel) = fixtures::memory_kennel().await;
    let (customer, puppy) = seed_sale(&kennel).await;
    let other = kennel
        .puppies
        .save(&fixtures::puppy("Waffles", 2600.0))
        .await
        .unwrap();
    kennel.purchases.save(&sale(&customer, &puppy)).await.unwrap();
    kennel.purchases.save(&sale(&customer, &other)).await.unwrap();

    kennel.customers.delete(customer.id.as_ref().unwrap()).await.unwrap();

    assert!(kennel.customers.get_all().is_empty());
    assert!(kennel.purchases.get_all().is_empty());
    assert!(store.is_empty(Collection::Purchases));
    assert!(kennel
        .puppies
        .get_all()
        .iter()
        .all(|p| p.status == PuppyStatus::Available && p.customer_id.is_none()));
}

#[tokio::test]
async fn customer_cascade_lists_purchases_from_store_when_not_cached() {
    let store = std::sync::Arc::new(FaultyStore::new(std::sync::Arc::new(
        kennel_storage::MemoryStore::new(),
    )));
    let kennel = fixtures::kennel_over(store.clone()).await;
    let (customer, puppy) = seed_sale(&kennel).await;
    kennel.purchases.save(&sale(&customer, &puppy)).await.unwrap();

    store.fail(StoreOp::List, Collection::Purchases);
    kennel.load().await;
    store.heal();
    assert!(kennel.purchases.get_all().is_empty());

    kennel.customers.delete(customer.id.as_ref().unwrap()).await.unwrap();

    assert!(kennel.customers.get_all().is_empty());
    assert_eq!(store.count(StoreOp::Delete, Collection::Purchases), 1);
    let puppy = kennel.puppies.get_by_id(puppy.id.as_ref().unwrap()).unwrap();
    assert_eq!(puppy.status, PuppyStatus::Available);
}

#[tokio::test]
async fn customer_is_kept_when_cascade_fails() {
    let (store, kennel) = fixtures::faulty_kennel().await;
    let (customer, puppy) = seed_sale(&kennel).await;
    kennel.purchases.save(&sale(&customer, &puppy)).await.unwrap();

    store.fail(StoreOp::Delete, Collection::Purchases);
    let result = kennel.customers.delete(customer.id.as_ref().unwrap()).await;

    assert!(result.is_err());
    assert_eq!(kennel.customers.count(), 1);
    assert_eq!(store.count(StoreOp::Delete, Collection::Customers), 0);
}
