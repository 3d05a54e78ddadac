use super::*;
use futures::executor::block_on;
use std::cell::Cell;

fn recorder() -> (Rc<RefCell<Vec<Option<String>>>>, AuthStateCallback) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    let callback: AuthStateCallback = Rc::new(move |identity: Option<Rc<Identity>>| {
        log.borrow_mut().push(identity.map(|i| i.uid.clone()));
    });
    (seen, callback)
}

// =============================================================================
// MemoryAuth
// =============================================================================

#[test]
fn auth_state_reports_current_value_immediately() {
    let auth = MemoryAuth::with_demo_account();
    let (seen, callback) = recorder();
    let _sub = auth.on_auth_state_changed(callback);
    assert_eq!(*seen.borrow(), vec![None]);
}

#[test]
fn sign_in_and_out_are_reported() {
    let auth = MemoryAuth::with_demo_account();
    let (seen, callback) = recorder();
    let _sub = auth.on_auth_state_changed(callback);

    let identity = block_on(auth.sign_in(DEMO_EMAIL, DEMO_PASSWORD)).expect("demo credentials");
    assert_eq!(identity.uid, DEMO_UID);
    assert_eq!(auth.current_user().map(|i| i.uid.clone()).as_deref(), Some(DEMO_UID));

    block_on(auth.sign_out()).expect("sign out");
    assert_eq!(*seen.borrow(), vec![None, Some(DEMO_UID.to_owned()), None]);
}

#[test]
fn same_session_keeps_one_identity_handle() {
    let auth = MemoryAuth::with_demo_account();
    let first = block_on(auth.sign_in(DEMO_EMAIL, DEMO_PASSWORD)).expect("sign in");
    let second = block_on(auth.sign_in(DEMO_EMAIL, DEMO_PASSWORD)).expect("sign in");
    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn sign_in_errors_carry_codes() {
    let auth = MemoryAuth::with_demo_account();
    let code = |result: Result<Rc<Identity>, ServiceError>| result.err().and_then(|e| e.code);

    assert_eq!(code(block_on(auth.sign_in("not-an-email", "x"))), Some(ErrorCode::InvalidEmail));
    assert_eq!(code(block_on(auth.sign_in("nobody@example.com", "x"))), Some(ErrorCode::UserNotFound));
    assert_eq!(code(block_on(auth.sign_in(DEMO_EMAIL, "nope"))), Some(ErrorCode::WrongPassword));
    assert!(auth.current_user().is_none());
}

#[test]
fn sign_up_registers_and_signs_in() {
    let auth = MemoryAuth::new();
    let identity = block_on(auth.sign_up("new@example.com", "longpassword")).expect("sign up");
    assert!(auth.has_account("new@example.com"));
    assert_eq!(identity.email.as_deref(), Some("new@example.com"));
    assert!(!identity.email_verified);
    assert!(auth.current_user().is_some());

    let again = block_on(auth.sign_up("new@example.com", "longpassword")).err();
    assert_eq!(again.and_then(|e| e.code), Some(ErrorCode::EmailAlreadyInUse));
}

#[test]
fn injected_failure_applies_once() {
    let auth = MemoryAuth::with_demo_account();
    auth.fail_next(ServiceError::new(ErrorCode::NetworkRequestFailed, "offline"));

    let err = block_on(auth.sign_in(DEMO_EMAIL, DEMO_PASSWORD)).err();
    assert_eq!(err.and_then(|e| e.code), Some(ErrorCode::NetworkRequestFailed));
    assert!(block_on(auth.sign_in(DEMO_EMAIL, DEMO_PASSWORD)).is_ok());
}

#[test]
fn update_password_changes_credentials() {
    let auth = MemoryAuth::with_demo_account();
    block_on(auth.sign_in(DEMO_EMAIL, DEMO_PASSWORD)).expect("sign in");
    block_on(auth.update_password("brand-new-secret")).expect("update");
    block_on(auth.sign_out()).expect("sign out");

    assert!(block_on(auth.sign_in(DEMO_EMAIL, DEMO_PASSWORD)).is_err());
    assert!(block_on(auth.sign_in(DEMO_EMAIL, "brand-new-secret")).is_ok());
}

#[test]
fn delete_requires_a_session_and_ends_it() {
    let auth = MemoryAuth::with_demo_account();
    let err = block_on(auth.delete_current_user()).err();
    assert_eq!(err.and_then(|e| e.code), Some(ErrorCode::RequiresRecentLogin));

    block_on(auth.sign_in(DEMO_EMAIL, DEMO_PASSWORD)).expect("sign in");
    block_on(auth.delete_current_user()).expect("delete");
    assert!(auth.current_user().is_none());
    assert!(!auth.has_account(DEMO_EMAIL));
}

// =============================================================================
// MemoryDocuments
// =============================================================================

#[test]
fn get_returns_stored_document_or_none() {
    let docs = MemoryDocuments::with_demo_data();
    let user = block_on(docs.get(&DocPath::new("users", DEMO_UID))).expect("read");
    assert_eq!(user.and_then(|u| u.get("role").cloned()), Some(json!("USER")));
    assert_eq!(block_on(docs.get(&DocPath::new("users", "ghost"))).expect("read"), None);
}

#[test]
fn watch_delivers_initial_and_updated_snapshots() {
    let docs = MemoryDocuments::new();
    let sizes = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&sizes);
    let query = Query::where_eq("userPoints", "userId", "u1");
    let sub = docs.watch(&query, Rc::new(move |snap: &Snapshot| log.borrow_mut().push(snap.records.len())));

    docs.put(&DocPath::new("userPoints", "a"), json!({ "userId": "u1" }));
    docs.put(&DocPath::new("userPoints", "b"), json!({ "userId": "u2" }));
    docs.put(&DocPath::new("cafes", "c"), json!({ "name": "x" }));
    sub.unsubscribe();
    docs.put(&DocPath::new("userPoints", "d"), json!({ "userId": "u1" }));

    assert_eq!(*sizes.borrow(), vec![0, 1, 1]);
}

#[test]
fn set_honours_injected_failure() {
    let docs = MemoryDocuments::new();
    let writes = Rc::new(Cell::new(0));
    let counter = Rc::clone(&writes);
    let query = Query::where_eq("users", "userId", "u1");
    let _sub = docs.watch(&query, Rc::new(move |_: &Snapshot| counter.set(counter.get() + 1)));

    docs.fail_next(ServiceError::new(ErrorCode::PermissionDenied, "rules"));
    let path = DocPath::new("users", "u1");
    assert!(block_on(docs.set(&path, json!({ "userId": "u1" }))).is_err());
    assert_eq!(docs.read(&path), None);

    block_on(docs.set(&path, json!({ "userId": "u1" }))).expect("write");
    assert_eq!(writes.get(), 2);
}
