use super::*;
use std::cell::Cell;
use std::rc::Rc;

fn counting(location: &MemoryLocation) -> (Rc<Cell<usize>>, Subscription) {
    let hits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hits);
    let sub = location.on_change(Rc::new(move || counter.set(counter.get() + 1)));
    (hits, sub)
}

#[test]
fn starts_empty_without_pending_events() {
    let location = MemoryLocation::new();
    assert_eq!(location.hash(), "");
    assert_eq!(location.pending(), 0);
}

#[test]
fn starting_at_normalizes_missing_hash_sign() {
    let location = MemoryLocation::starting_at("/main");
    assert_eq!(location.hash(), "#/main");
    assert_eq!(location.pending(), 0);
}

#[test]
fn set_hash_queues_until_flush() {
    let location = MemoryLocation::new();
    let (hits, _sub) = counting(&location);

    location.set_hash("#/main");
    assert_eq!(location.hash(), "#/main");
    assert_eq!(hits.get(), 0);

    assert_eq!(location.flush(), 1);
    assert_eq!(hits.get(), 1);
}

#[test]
fn unchanged_hash_does_not_notify() {
    let location = MemoryLocation::starting_at("#/login");
    let (hits, _sub) = counting(&location);

    location.set_hash("#/login");
    assert_eq!(location.flush(), 0);
    assert_eq!(hits.get(), 0);
}

#[test]
fn each_change_is_its_own_notification() {
    let location = MemoryLocation::new();
    let (hits, _sub) = counting(&location);

    location.set_hash("#/a");
    location.set_hash("#/b");
    assert_eq!(location.pending(), 2);
    location.flush();
    assert_eq!(hits.get(), 2);
    assert_eq!(location.hash(), "#/b");
}

#[test]
fn notifications_queued_during_flush_are_delivered() {
    let location = Rc::new(MemoryLocation::new());
    let inner = Rc::clone(&location);
    let _sub = location.on_change(Rc::new(move || {
        if inner.hash() == "#/a" {
            inner.set_hash("#/b");
        }
    }));

    location.set_hash("#/a");
    assert_eq!(location.flush(), 2);
    assert_eq!(location.hash(), "#/b");
}

#[test]
fn unsubscribed_listener_is_not_notified() {
    let location = MemoryLocation::new();
    let (hits, sub) = counting(&location);
    sub.unsubscribe();

    location.set_hash("#/a");
    location.flush();
    assert_eq!(hits.get(), 0);
}

#[test]
fn runaway_listener_is_capped() {
    let location = Rc::new(MemoryLocation::new());
    let inner = Rc::clone(&location);
    let _sub = location.on_change(Rc::new(move || {
        let next = if inner.hash() == "#/a" { "#/b" } else { "#/a" };
        inner.set_hash(next);
    }));

    location.set_hash("#/a");
    assert_eq!(location.flush(), MAX_FLUSH);
    assert_eq!(location.pending(), 0);
}
