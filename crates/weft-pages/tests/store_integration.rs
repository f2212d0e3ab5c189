//! StateStore integration tests
//!
//! Success Criteria:
//! 1. Values round-trip through set_state/get_state (literal and updater)
//! 2. Subscribers run once per update while subscribed, never after
//! 3. Unknown keys degrade to sentinels and no-ops
//! 4. Notification passes are snapshot-based
//! 5. Subscriber failures are reported without cancelling the pass

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use proptest::prelude::*;
use rstest::*;
use weft_pages::store::{BoxError, StateStore, StateUpdate, StoreError, SubscriptionId};

#[fixture]
fn store() -> StateStore {
	StateStore::new()
}

fn counter() -> (Rc<Cell<usize>>, impl Fn() + 'static) {
	let count = Rc::new(Cell::new(0));
	let handle = count.clone();
	(count, move || handle.set(handle.get() + 1))
}

// ============================================================================
// Scenarios
// ============================================================================

#[rstest]
fn test_literal_set(store: StateStore) {
	store.init_state("count", 0_i32);

	store.set_state::<i32>("count").set(5).unwrap();

	assert_eq!(store.get_state::<i32>("count"), Some(5));
}

#[rstest]
fn test_sequential_updaters(store: StateStore) {
	let count = store.init_state("count", 0_i32).unwrap();

	store.set_state(&count).update(|n| n + 1).unwrap();
	store.set_state(&count).update(|n| n + 1).unwrap();

	assert_eq!(store.get_state(&count), Some(2));
}

#[rstest]
fn test_apply_accepts_both_forms(store: StateStore) {
	let name = store.init_state("name", String::from("a")).unwrap();
	let updater = store.set_state(&name);

	updater.apply(String::from("b")).unwrap();
	updater
		.apply(StateUpdate::with(|old: &String| format!("{old}!")))
		.unwrap();

	assert_eq!(store.get_state(&name).as_deref(), Some("b!"));
}

#[rstest]
fn test_init_state_is_idempotent(store: StateStore) {
	assert!(store.init_state("k", 1_u8).is_some());
	assert!(store.init_state("k", 2_u8).is_none());
	assert_eq!(store.get_state::<u8>("k"), Some(1));
}

// ============================================================================
// Subscriptions
// ============================================================================

#[rstest]
fn test_subscriber_invoked_once_per_update(store: StateStore) {
	let key = store.init_state("k", 0_u32).unwrap();
	let (count, callback) = counter();
	let id = store.subscribe("k", callback).unwrap();

	for value in 1..=3 {
		store.set_state(&key).set(value).unwrap();
	}
	assert_eq!(count.get(), 3);

	assert!(store.unsubscribe("k", id));
	store.set_state(&key).set(9).unwrap();
	assert_eq!(count.get(), 3);
	assert!(!store.unsubscribe("k", id));
}

#[rstest]
fn test_notification_in_subscription_order(store: StateStore) {
	let key = store.init_state("k", 0_u32).unwrap();
	let order = Rc::new(RefCell::new(Vec::new()));
	for label in ["first", "second", "third"] {
		let order = order.clone();
		store.subscribe("k", move || order.borrow_mut().push(label));
	}

	store.set_state(&key).set(1).unwrap();

	assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
}

#[rstest]
fn test_subscriber_sees_new_value(store: StateStore) {
	let key = store.init_state("k", 0_u32).unwrap();
	let seen = Rc::new(Cell::new(0));
	let reader = store.clone();
	let sink = seen.clone();
	store.subscribe("k", move || sink.set(reader.get_state::<u32>("k").unwrap_or(0)));

	store.set_state(&key).set(7).unwrap();

	assert_eq!(seen.get(), 7);
}

// ============================================================================
// Unknown keys
// ============================================================================

#[rstest]
fn test_unknown_key_degrades(store: StateStore) {
	let (count, callback) = counter();

	assert_eq!(store.get_state::<i32>("missing"), None);
	assert!(store.set_state::<i32>("missing").set(1).is_ok());
	assert!(store.subscribe("missing", callback).is_none());
	assert!(!store.unsubscribe("missing", store_token(&store)));
	assert!(!store.contains("missing"));
	assert_eq!(count.get(), 0);
}

fn store_token(store: &StateStore) -> SubscriptionId {
	store.init_state("token-source", ());
	store.subscribe("token-source", || {}).unwrap()
}

#[rstest]
fn test_type_mismatch_degrades(store: StateStore) {
	let (count, callback) = counter();
	store.init_state("k", 1_i32);
	store.subscribe("k", callback);

	assert_eq!(store.get_state::<String>("k"), None);
	store.set_state::<String>("k").set("x".to_string()).unwrap();

	assert_eq!(store.get_state::<i32>("k"), Some(1));
	assert_eq!(count.get(), 0);
}

// ============================================================================
// Snapshot semantics
// ============================================================================

#[rstest]
fn test_self_unsubscribe_during_notification(store: StateStore) {
	let key = store.init_state("k", 0_u32).unwrap();
	let calls = Rc::new(Cell::new(0));
	let token: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));

	let handle = store.clone();
	let own = token.clone();
	let counted = calls.clone();
	let id = store
		.subscribe("k", move || {
			counted.set(counted.get() + 1);
			if let Some(id) = own.get() {
				handle.unsubscribe("k", id);
			}
		})
		.unwrap();
	token.set(Some(id));
	let (after, callback) = counter();
	store.subscribe("k", callback);

	store.set_state(&key).set(1).unwrap();
	store.set_state(&key).set(2).unwrap();

	assert_eq!(calls.get(), 1);
	assert_eq!(after.get(), 2);
	assert_eq!(store.subscriber_count("k"), 1);
}

#[rstest]
fn test_subscribe_during_notification_joins_next_pass(store: StateStore) {
	let key = store.init_state("k", 0_u32).unwrap();
	let (late, late_callback) = counter();
	let late_callback = Rc::new(late_callback);
	let handle = store.clone();
	let added = Cell::new(false);

	store.subscribe("k", move || {
		if !added.replace(true) {
			let callback = late_callback.clone();
			handle.subscribe("k", move || callback());
		}
	});

	store.set_state(&key).set(1).unwrap();
	assert_eq!(late.get(), 0);

	store.set_state(&key).set(2).unwrap();
	assert_eq!(late.get(), 1);
}

#[rstest]
fn test_removed_peer_still_runs_in_current_pass(store: StateStore) {
	let key = store.init_state("k", 0_u32).unwrap();
	let victim: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));
	let handle = store.clone();
	let target = victim.clone();
	store.subscribe("k", move || {
		if let Some(id) = target.take() {
			handle.unsubscribe("k", id);
		}
	});
	let (count, callback) = counter();
	victim.set(store.subscribe("k", callback));

	store.set_state(&key).set(1).unwrap();
	store.set_state(&key).set(2).unwrap();

	assert_eq!(count.get(), 1);
}

// ============================================================================
// Failures
// ============================================================================

#[rstest]
fn test_failures_collected_without_cancelling(store: StateStore) {
	let key = store.init_state("k", 0_u32).unwrap();
	store.subscribe_fallible("k", || Err::<(), BoxError>("first".into()));
	let (count, callback) = counter();
	store.subscribe("k", callback);
	store.subscribe_fallible("k", || Err::<(), BoxError>("second".into()));

	let error = store.set_state(&key).set(1).unwrap_err();

	assert_eq!(count.get(), 1);
	assert_eq!(store.get_state(&key), Some(1));
	let StoreError::Notify { key, failures } = error;
	assert_eq!(key, "k");
	let messages: Vec<String> = failures.iter().map(|e| e.to_string()).collect();
	assert_eq!(messages, vec!["first", "second"]);
}

// ============================================================================
// Property-based
// ============================================================================

proptest! {
	#[test]
	fn prop_set_then_get(initial in any::<i64>(), value in any::<i64>()) {
		let store = StateStore::new();
		let key = store.init_state("v", initial).unwrap();

		store.set_state(&key).set(value).unwrap();
		prop_assert_eq!(store.get_state(&key), Some(value));
	}

	#[test]
	fn prop_update_applies_function(initial in -1000_i64..1000, delta in -1000_i64..1000) {
		let store = StateStore::new();
		let key = store.init_state("v", initial).unwrap();

		store.set_state(&key).update(move |n| n * 2 + delta).unwrap();
		prop_assert_eq!(store.get_state(&key), Some(initial * 2 + delta));
	}

	#[test]
	fn prop_invocations_match_updates(updates in 0_usize..10) {
		let store = StateStore::new();
		let key = store.init_state("v", 0_usize).unwrap();
		let (count, callback) = counter();
		store.subscribe("v", callback);

		for i in 0..updates {
			store.set_state(&key).set(i).unwrap();
		}
		prop_assert_eq!(count.get(), updates);
	}
}
