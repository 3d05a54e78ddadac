use super::*;
use std::cell::RefCell;
use std::rc::Rc;

type Listener = dyn Fn(&i32) -> Result<(), String>;

fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Rc<Listener>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let make = move |name: &str| -> Rc<Listener> {
        let sink = Rc::clone(&sink);
        let name = name.to_owned();
        Rc::new(move |value: &i32| {
            sink.borrow_mut().push(format!("{name}:{value}"));
            Ok::<(), String>(())
        })
    };
    (log, make)
}

fn run(registry: &Registry<String, Listener>, key: &str, value: i32) -> Vec<String> {
    let mut failures = Vec::new();
    registry.dispatch(key, |f| f(&value), |err| failures.push(err));
    failures
}

// =============================================================
// ListenerOutcome
// =============================================================

#[test]
fn unit_outcome_is_success() {
    assert_eq!(().into_outcome(), Ok(()));
}

#[test]
fn result_outcome_renders_error() {
    let failed: Result<(), &str> = Err("boom");
    assert_eq!(failed.into_outcome(), Err("boom".to_owned()));
}

// =============================================================
// Subscription
// =============================================================

#[test]
fn subscription_runs_cancel_once() {
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    let sub = Subscription::new(move || *counter.borrow_mut() += 1);
    assert!(sub.is_active());
    sub.unsubscribe();
    sub.unsubscribe();
    assert_eq!(*calls.borrow(), 1);
    assert!(!sub.is_active());
}

#[test]
fn inert_subscription_is_inactive() {
    let sub = Subscription::inert();
    assert!(!sub.is_active());
    assert_eq!(sub.listener_id(), None);
    sub.unsubscribe();
}

// =============================================================
// Registry
// =============================================================

#[test]
fn dispatch_preserves_insertion_order() {
    let (log, make) = recorder();
    let registry: Registry<String, Listener> = Registry::new();
    registry.insert("k".to_owned(), make("a"), false);
    registry.insert("k".to_owned(), make("b"), false);
    registry.insert("other".to_owned(), make("c"), false);

    assert!(run(&registry, "k", 1).is_empty());
    assert_eq!(*log.borrow(), vec!["a:1", "b:1"]);
}

#[test]
fn same_callback_registered_twice_gets_two_ids() {
    let (log, make) = recorder();
    let registry: Registry<String, Listener> = Registry::new();
    let callback = make("a");
    let first = registry.insert("k".to_owned(), Rc::clone(&callback), false);
    let second = registry.insert("k".to_owned(), callback, false);
    assert_ne!(first.listener_id(), second.listener_id());

    first.unsubscribe();
    run(&registry, "k", 2);
    assert_eq!(*log.borrow(), vec!["a:2"]);
    assert_eq!(registry.len("k"), 1);
}

#[test]
fn failures_are_reported_and_do_not_stop_dispatch() {
    let (log, make) = recorder();
    let registry: Registry<String, Listener> = Registry::new();
    registry.insert("k".to_owned(), Rc::new(|_: &i32| Err::<(), String>("bad".to_owned())), false);
    registry.insert("k".to_owned(), make("after"), false);

    let failures = run(&registry, "k", 3);
    assert_eq!(failures, vec!["bad"]);
    assert_eq!(*log.borrow(), vec!["after:3"]);
}

#[test]
fn once_entries_are_removed_before_running() {
    let (log, make) = recorder();
    let registry: Registry<String, Listener> = Registry::new();
    registry.insert("k".to_owned(), make("once"), true);

    run(&registry, "k", 1);
    run(&registry, "k", 2);
    assert_eq!(*log.borrow(), vec!["once:1"]);
    assert_eq!(registry.len("k"), 0);
}

#[test]
fn listener_removed_mid_dispatch_is_skipped() {
    let (log, make) = recorder();
    let registry: Rc<Registry<String, Listener>> = Rc::new(Registry::new());
    let victim: Rc<RefCell<Option<ListenerId>>> = Rc::new(RefCell::new(None));

    let reg = Rc::clone(&registry);
    let target = Rc::clone(&victim);
    registry.insert(
        "k".to_owned(),
        Rc::new(move |_: &i32| {
            if let Some(id) = *target.borrow() {
                reg.remove("k", id);
            }
            Ok::<(), String>(())
        }),
        false,
    );
    let second = registry.insert("k".to_owned(), make("second"), false);
    *victim.borrow_mut() = second.listener_id();

    run(&registry, "k", 1);
    assert!(log.borrow().is_empty());
}

#[test]
fn clear_and_clear_all_drop_entries() {
    let (_log, make) = recorder();
    let registry: Registry<String, Listener> = Registry::new();
    registry.insert("a".to_owned(), make("a"), false);
    registry.insert("b".to_owned(), make("b"), false);

    registry.clear("a");
    assert_eq!(registry.len("a"), 0);
    assert_eq!(registry.len("b"), 1);

    registry.clear_all();
    assert_eq!(registry.len("b"), 0);
}

#[test]
fn unsubscribe_after_clear_is_harmless() {
    let (_log, make) = recorder();
    let registry: Registry<String, Listener> = Registry::new();
    let sub = registry.insert("a".to_owned(), make("a"), false);
    registry.clear_all();
    sub.unsubscribe();
    assert_eq!(registry.len("a"), 0);
}

#[test]
fn borrowed_keys_reach_owned_entries() {
    let (log, make) = recorder();
    let registry: Registry<String, Listener> = Registry::new();
    let sub = registry.insert("points".to_owned(), make("p"), false);
    let id = sub.listener_id().expect("registered listener has an id");

    assert!(registry.contains("points", id));
    assert_eq!(registry.len("points"), 1);
    assert!(run(&registry, "points", 3).is_empty());
    assert_eq!(*log.borrow(), vec!["p:3"]);

    assert!(registry.remove("points", id));
    assert!(!registry.remove("points", id));
    assert_eq!(registry.len("points"), 0);
}
