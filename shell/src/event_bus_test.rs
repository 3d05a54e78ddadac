use super::*;
use crate::events;
use std::cell::{Cell, RefCell};

fn recorder(bus: &EventBus<String>, event: &str) -> (Rc<RefCell<Vec<String>>>, Subscription) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    let sub = bus.on(event, move |payload: &String| log.borrow_mut().push(payload.clone()));
    (seen, sub)
}

// =============================================================================
// on / emit
// =============================================================================

#[test]
fn emit_delivers_payload_to_subscribers() {
    let bus = EventBus::new();
    let (seen, _sub) = recorder(&bus, events::ui::TOAST_SHOW);

    bus.emit(events::ui::TOAST_SHOW, &"saved".to_owned());
    assert_eq!(*seen.borrow(), vec!["saved".to_owned()]);
}

#[test]
fn emit_without_listeners_is_a_no_op() {
    let bus: EventBus<String> = EventBus::new();
    bus.emit("nobody:listens", &String::new());
    assert_eq!(bus.listener_count("nobody:listens"), 0);
}

#[test]
fn listeners_run_in_subscription_order() {
    let bus: EventBus<i32> = EventBus::new();
    let order = Rc::new(RefCell::new(Vec::new()));
    for tag in ["a", "b", "c"] {
        let log = Rc::clone(&order);
        bus.on("tick", move |_: &i32| log.borrow_mut().push(tag));
    }

    bus.emit("tick", &1);
    assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
}

#[test]
fn other_events_are_not_delivered() {
    let bus = EventBus::new();
    let (seen, _sub) = recorder(&bus, events::auth::LOGIN);
    bus.emit(events::auth::LOGOUT, &"u1".to_owned());
    assert!(seen.borrow().is_empty());
}

#[test]
fn failing_listener_does_not_block_the_rest() {
    let bus: EventBus<i32> = EventBus::new();
    let hits = Rc::new(Cell::new(0));

    bus.on("save", |_: &i32| Err::<(), _>("disk full"));
    let counter = Rc::clone(&hits);
    bus.on("save", move |_: &i32| counter.set(counter.get() + 1));

    bus.emit("save", &0);
    bus.emit("save", &0);
    assert_eq!(hits.get(), 2);
}

// =============================================================================
// once
// =============================================================================

#[test]
fn once_fires_a_single_time_with_first_payload() {
    let bus: EventBus<i32> = EventBus::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    bus.once("x", move |payload: &i32| log.borrow_mut().push(*payload));

    bus.emit("x", &1);
    bus.emit("x", &2);
    assert_eq!(*seen.borrow(), vec![1]);
    assert_eq!(bus.listener_count("x"), 0);
}

#[test]
fn once_listener_reemitting_does_not_recurse() {
    let bus: EventBus<i32> = EventBus::new();
    let hits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hits);
    let inner = bus.clone();
    bus.once("x", move |payload: &i32| {
        counter.set(counter.get() + 1);
        inner.emit("x", &(payload + 1));
    });

    bus.emit("x", &1);
    assert_eq!(hits.get(), 1);
}

#[test]
fn once_can_be_cancelled_before_it_fires() {
    let bus: EventBus<i32> = EventBus::new();
    let hits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hits);
    let sub = bus.once("x", move |_: &i32| counter.set(counter.get() + 1));

    sub.unsubscribe();
    bus.emit("x", &1);
    assert_eq!(hits.get(), 0);
}

// =============================================================================
// off / clear
// =============================================================================

#[test]
fn off_removes_one_registration() {
    let bus = EventBus::new();
    let (seen, sub) = recorder(&bus, "e");
    let (_, _other) = recorder(&bus, "e");
    let Some(id) = sub.listener_id() else {
        panic!("registry subscription carries an id");
    };

    assert!(bus.off("e", id));
    assert!(!bus.off("e", id));
    assert_eq!(bus.listener_count("e"), 1);

    bus.emit("e", &"p".to_owned());
    assert!(seen.borrow().is_empty());
}

#[test]
fn unsubscribe_handle_is_idempotent() {
    let bus = EventBus::new();
    let (seen, sub) = recorder(&bus, "e");

    sub.unsubscribe();
    sub.unsubscribe();
    assert!(!sub.is_active());

    bus.emit("e", &"p".to_owned());
    assert!(seen.borrow().is_empty());
}

#[test]
fn clear_one_event_keeps_the_others() {
    let bus = EventBus::new();
    let (first, _a) = recorder(&bus, "a");
    let (second, _b) = recorder(&bus, "b");

    bus.clear(Some("a"));
    bus.emit("a", &"1".to_owned());
    bus.emit("b", &"2".to_owned());

    assert!(first.borrow().is_empty());
    assert_eq!(*second.borrow(), vec!["2".to_owned()]);
}

#[test]
fn clear_all_drops_everything() {
    let bus = EventBus::new();
    let (_, _a) = recorder(&bus, "a");
    let (_, _b) = recorder(&bus, "b");

    bus.clear(None);
    assert_eq!(bus.listener_count("a"), 0);
    assert_eq!(bus.listener_count("b"), 0);
}

#[test]
fn clones_share_listeners() {
    let bus = EventBus::new();
    let (seen, _sub) = recorder(&bus, "e");
    bus.clone().emit("e", &"via clone".to_owned());
    assert_eq!(seen.borrow().len(), 1);
}
