use super::*;
use crate::services::{MemoryAuth, MemoryDocuments};
use shell::platform::MemoryPlatform;
use shell::{EventBus, Navigator, StateStore, StoreOptions};

struct Nowhere;

impl Navigator for Nowhere {
    fn navigate(&self, _path: &str) {}
}

fn context() -> ScreenContext {
    let platform = MemoryPlatform::new();
    let store: StateStore<Identity> = StateStore::from_platform(&platform.platform(), &StoreOptions::default());
    let documents = Rc::new(MemoryDocuments::new());
    let actions = AccountActions::new(
        store.clone(),
        EventBus::new(),
        Rc::new(Nowhere),
        Rc::new(MemoryAuth::new()),
        documents.clone(),
    );
    ScreenContext {
        actions: Rc::new(actions),
        user: None,
        language: store.language(),
        theme: store.theme(),
        documents,
        storage: platform.storage.clone(),
    }
}

/// Logs renders and teardowns; settings renders leave nothing to clean up.
#[derive(Default)]
struct Recorder {
    log: Rc<RefCell<Vec<String>>>,
}

impl ScreenRenderer<&'static str> for Recorder {
    fn render(&self, screen: Screen, container: &&'static str, _ctx: ScreenContext) -> Option<Teardown> {
        self.log.borrow_mut().push(format!("render {screen} into {container}"));
        if screen == Screen::Settings {
            return None;
        }
        let log = Rc::clone(&self.log);
        Some(Teardown::new(move || log.borrow_mut().push(format!("teardown {screen}"))))
    }
}

fn host() -> (ScreenHost<&'static str>, Rc<RefCell<Vec<String>>>) {
    let recorder = Recorder::default();
    let log = Rc::clone(&recorder.log);
    (ScreenHost::new(Rc::new(recorder)), log)
}

// =============================================================================
// Screen
// =============================================================================

#[test]
fn every_screen_round_trips_through_its_route() {
    for screen in Screen::ALL {
        assert_eq!(Screen::from_route(screen.route()), Some(screen));
        assert_eq!(screen.to_string(), screen.route());
    }
    assert_eq!(Screen::from_route("admin"), None);
    assert_eq!(Screen::from_route(""), None);
}

#[test]
fn signed_in_screens_require_auth() {
    let private: Vec<_> = Screen::ALL.into_iter().filter(|s| s.requires_auth()).collect();
    assert_eq!(private, vec![Screen::Main, Screen::Settings, Screen::NewPassword]);
}

// =============================================================================
// ScreenHost
// =============================================================================

#[test]
fn previous_screen_is_torn_down_before_the_next_render() {
    let (host, log) = host();
    host.show(Screen::Login, &"app", context());
    host.show(Screen::Main, &"app", context());

    assert_eq!(*log.borrow(), vec!["render login into app", "teardown login", "render main into app"]);
    assert_eq!(host.active(), Some(Screen::Main));
}

#[test]
fn screens_without_cleanup_are_still_tracked() {
    let (host, log) = host();
    host.show(Screen::Settings, &"app", context());
    assert_eq!(host.active(), Some(Screen::Settings));

    host.show(Screen::Main, &"app", context());
    assert_eq!(*log.borrow(), vec!["render settings into app", "render main into app"]);
}

#[test]
fn teardown_runs_once() {
    let (host, log) = host();
    host.show(Screen::Register, &"app", context());

    host.teardown();
    host.teardown();
    assert_eq!(host.active(), None);
    assert_eq!(log.borrow().iter().filter(|line| line.starts_with("teardown")).count(), 1);
}

// =============================================================================
// Teardown
// =============================================================================

#[test]
fn teardown_from_subscription_unsubscribes() {
    let bus: EventBus<()> = EventBus::new();
    let sub = bus.on("points:changed", |_: &()| {});
    assert_eq!(bus.listener_count("points:changed"), 1);

    Teardown::from(sub).run();
    assert_eq!(bus.listener_count("points:changed"), 0);
}
