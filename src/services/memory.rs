//! In-memory identity and document services.
//!
//! Back the client in mock mode (no hosted backend configured) and in tests.
//! Both seed a demo account and its loyalty data so every screen has
//! something to show.
//!
//! Each service holds at most one injected failure ([`MemoryAuth::fail_next`],
//! [`MemoryDocuments::fail_next`]) that the next async call returns instead
//! of doing its work.

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use async_trait::async_trait;
use serde_json::{Value, json};
use shell::{EventBus, Subscription};

use super::auth::{AuthProvider, AuthStateCallback};
use super::documents::{DocPath, DocumentStore, Query, Record, Snapshot, SnapshotCallback};
use super::{ErrorCode, Identity, ServiceError};
use crate::validation;

pub const DEMO_UID: &str = "test-user-id";
pub const DEMO_EMAIL: &str = "test@example.com";
pub const DEMO_PASSWORD: &str = "password123";

/// Shortest password the identity service itself accepts.
const PROVIDER_MIN_PASSWORD: usize = 6;

const AUTH_CHANGED: &str = "auth:state";

struct Account {
    password: String,
    identity: Rc<Identity>,
}

/// Identity service holding accounts keyed by email.
pub struct MemoryAuth {
    accounts: RefCell<HashMap<String, Account>>,
    current: RefCell<Option<Rc<Identity>>>,
    changes: EventBus<Option<Rc<Identity>>>,
    failure: RefCell<Option<ServiceError>>,
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self {
            accounts: RefCell::new(HashMap::new()),
            current: RefCell::new(None),
            changes: EventBus::new(),
            failure: RefCell::new(None),
        }
    }
}

impl MemoryAuth {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Service with the demo account registered (signed out).
    #[must_use]
    pub fn with_demo_account() -> Self {
        let auth = Self::new();
        auth.add_account(
            DEMO_EMAIL,
            DEMO_PASSWORD,
            Identity {
                uid: DEMO_UID.to_owned(),
                email: Some(DEMO_EMAIL.to_owned()),
                display_name: Some("Test User".to_owned()),
                email_verified: true,
            },
        );
        auth
    }

    pub fn add_account(&self, email: &str, password: &str, identity: Identity) {
        self.accounts
            .borrow_mut()
            .insert(email.to_owned(), Account { password: password.to_owned(), identity: Rc::new(identity) });
    }

    #[must_use]
    pub fn has_account(&self, email: &str) -> bool {
        self.accounts.borrow().contains_key(email)
    }

    /// Make the next async call fail with `err`.
    pub fn fail_next(&self, err: ServiceError) {
        *self.failure.borrow_mut() = Some(err);
    }

    fn take_failure(&self) -> Result<(), ServiceError> {
        match self.failure.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn set_current(&self, identity: Option<Rc<Identity>>) {
        self.current.borrow_mut().clone_from(&identity);
        self.changes.emit(AUTH_CHANGED, &identity);
    }

    fn check_email(email: &str) -> Result<(), ServiceError> {
        if validation::is_valid_email(email) {
            Ok(())
        } else {
            Err(ServiceError::new(ErrorCode::InvalidEmail, format!("malformed email {email:?}")))
        }
    }
}

#[async_trait(?Send)]
impl AuthProvider for MemoryAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Rc<Identity>, ServiceError> {
        self.take_failure()?;
        Self::check_email(email)?;
        let identity = {
            let accounts = self.accounts.borrow();
            let account = accounts
                .get(email)
                .ok_or_else(|| ServiceError::new(ErrorCode::UserNotFound, format!("no account for {email}")))?;
            if account.password != password {
                return Err(ServiceError::new(ErrorCode::WrongPassword, "password does not match"));
            }
            Rc::clone(&account.identity)
        };
        log::debug!("memory auth: signed in {}", identity.uid);
        self.set_current(Some(Rc::clone(&identity)));
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Rc<Identity>, ServiceError> {
        self.take_failure()?;
        Self::check_email(email)?;
        if self.has_account(email) {
            return Err(ServiceError::new(ErrorCode::EmailAlreadyInUse, format!("{email} is registered")));
        }
        if password.chars().count() < PROVIDER_MIN_PASSWORD {
            return Err(ServiceError::new(ErrorCode::WeakPassword, "password should be at least 6 characters"));
        }

        let identity = Identity {
            uid: uuid::Uuid::new_v4().to_string(),
            email: Some(email.to_owned()),
            display_name: None,
            email_verified: false,
        };
        self.add_account(email, password, identity);
        let identity = self
            .accounts
            .borrow()
            .get(email)
            .map(|account| Rc::clone(&account.identity))
            .ok_or_else(|| ServiceError::uncoded("account vanished after sign-up"))?;
        log::debug!("memory auth: signed up {}", identity.uid);
        self.set_current(Some(Rc::clone(&identity)));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), ServiceError> {
        self.take_failure()?;
        self.set_current(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ServiceError> {
        self.take_failure()?;
        Self::check_email(email)?;
        log::info!("memory auth: password reset requested for {email}");
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> Result<(), ServiceError> {
        self.take_failure()?;
        let Some(current) = self.current_user() else {
            return Err(ServiceError::new(ErrorCode::RequiresRecentLogin, "no signed-in user"));
        };
        if new_password.chars().count() < PROVIDER_MIN_PASSWORD {
            return Err(ServiceError::new(ErrorCode::WeakPassword, "password should be at least 6 characters"));
        }
        let mut accounts = self.accounts.borrow_mut();
        match accounts.values_mut().find(|account| account.identity.uid == current.uid) {
            Some(account) => {
                new_password.clone_into(&mut account.password);
                Ok(())
            }
            None => Err(ServiceError::new(ErrorCode::UserNotFound, "signed-in account no longer exists")),
        }
    }

    async fn delete_current_user(&self) -> Result<(), ServiceError> {
        self.take_failure()?;
        let Some(current) = self.current_user() else {
            return Err(ServiceError::new(ErrorCode::RequiresRecentLogin, "no signed-in user"));
        };
        self.accounts.borrow_mut().retain(|_, account| account.identity.uid != current.uid);
        self.set_current(None);
        Ok(())
    }

    fn current_user(&self) -> Option<Rc<Identity>> {
        self.current.borrow().clone()
    }

    fn on_auth_state_changed(&self, callback: AuthStateCallback) -> Subscription {
        let sub = self.changes.on(AUTH_CHANGED, {
            let callback = Rc::clone(&callback);
            move |identity: &Option<Rc<Identity>>| callback(identity.clone())
        });
        callback(self.current_user());
        sub
    }
}

type Collections = Rc<RefCell<HashMap<String, BTreeMap<String, Value>>>>;

/// Document store with collections of JSON documents, ordered by id.
pub struct MemoryDocuments {
    collections: Collections,
    writes: EventBus<()>,
    failure: RefCell<Option<ServiceError>>,
}

impl Default for MemoryDocuments {
    fn default() -> Self {
        Self { collections: Rc::new(RefCell::new(HashMap::new())), writes: EventBus::new(), failure: RefCell::new(None) }
    }
}

impl MemoryDocuments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the demo user's profile, points, cafes, and products.
    #[must_use]
    pub fn with_demo_data() -> Self {
        let docs = Self::new();
        docs.put(
            &DocPath::new("users", DEMO_UID),
            json!({
                "userId": DEMO_UID,
                "email": DEMO_EMAIL,
                "role": "USER",
                "totalPoints": 1250,
                "visitCount": 5,
            }),
        );
        docs.put(&DocPath::new("cafes", "cafe-central"), json!({ "name": "Central Perk" }));
        docs.put(&DocPath::new("cafes", "cafe-harbor"), json!({ "name": "Harbor Roasters" }));
        docs.put(&DocPath::new("products", "latte"), json!({ "name": "Latte", "scaleSize": 6 }));
        docs.put(&DocPath::new("products", "espresso"), json!({ "name": "Espresso" }));
        docs.put(
            &DocPath::new("userPoints", "points-1"),
            json!({
                "userId": DEMO_UID,
                "cafeId": "cafe-central",
                "productId": "latte",
                "currentProgress": 4,
                "totalPoints": 16,
                "lastUpdated": 1_700_000_000_000_i64,
            }),
        );
        docs.put(
            &DocPath::new("userPoints", "points-2"),
            json!({
                "userId": DEMO_UID,
                "cafeId": "cafe-harbor",
                "productId": "espresso",
                "currentProgress": 7,
                "totalPoints": 27,
                "rewardsReceived": 2,
                "lastUpdated": 1_700_000_500_000_i64,
            }),
        );
        docs
    }

    /// Write a document and notify watchers of its collection.
    pub fn put(&self, path: &DocPath, data: Value) {
        self.collections
            .borrow_mut()
            .entry(path.collection.clone())
            .or_default()
            .insert(path.id.clone(), data);
        self.writes.emit(&path.collection, &());
    }

    #[must_use]
    pub fn read(&self, path: &DocPath) -> Option<Value> {
        self.collections.borrow().get(&path.collection).and_then(|docs| docs.get(&path.id)).cloned()
    }

    /// Make the next async call fail with `err`.
    pub fn fail_next(&self, err: ServiceError) {
        *self.failure.borrow_mut() = Some(err);
    }

    fn take_failure(&self) -> Result<(), ServiceError> {
        match self.failure.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn run_query(collections: &Collections, query: &Query) -> Snapshot {
    let collections = collections.borrow();
    let records = collections
        .get(&query.collection)
        .map(|docs| {
            docs.iter()
                .filter(|(_, data)| query.matches(data))
                .map(|(id, data)| Record { id: id.clone(), data: data.clone() })
                .collect()
        })
        .unwrap_or_default();
    Snapshot { records }
}

#[async_trait(?Send)]
impl DocumentStore for MemoryDocuments {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, ServiceError> {
        self.take_failure()?;
        Ok(self.read(path))
    }

    async fn set(&self, path: &DocPath, data: Value) -> Result<(), ServiceError> {
        self.take_failure()?;
        log::debug!("memory documents: set {path}");
        self.put(path, data);
        Ok(())
    }

    fn watch(&self, query: &Query, callback: SnapshotCallback) -> Subscription {
        let collections = Rc::clone(&self.collections);
        let query = query.clone();
        let collection = query.collection.clone();
        callback(&run_query(&collections, &query));
        self.writes.on(&collection, move |_: &()| callback(&run_query(&collections, &query)))
    }
}
