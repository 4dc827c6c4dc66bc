#![forbid(unsafe_code)]

//! Session lifecycle: gate, load, autosave, projects.

use std::time::Duration;

use storyboard::prelude::*;
use storyboard::runtime::gate::EMAIL_KEY;
use storyboard::runtime::persistence::{DOCUMENT_KEY, PROJECTS_KEY};
use storyboard::{
    ClientContext, Error, GateError, InterestPayload, MemoryStorage, NotifyError, SignupNotifier,
    SignupPayload,
};
use web_time::Instant;

#[derive(Default)]
struct Webhook {
    offline: bool,
    signups: usize,
}

impl SignupNotifier for Webhook {
    fn notify_signup(&mut self, _: &SignupPayload) -> std::result::Result<(), NotifyError> {
        if self.offline {
            return Err(NotifyError::new("offline"));
        }
        self.signups += 1;
        Ok(())
    }

    fn notify_interest(&mut self, _: &InterestPayload) -> std::result::Result<(), NotifyError> {
        Err(NotifyError::new("offline"))
    }
}

fn first(session: &Session<MemoryStorage>) -> (GroupId, ItemId) {
    let group = &session.store().current().groups()[0];
    (group.id().clone(), group.items()[0].id.clone())
}

#[test]
fn closed_gate_never_autosaves() {
    let mut session = Session::open(MemoryStorage::new(), StoreConfig::default()).unwrap();
    assert!(!session.gate().is_open());
    session.store_mut().add_group();
    assert!(!session.autosave().unwrap());
    assert!(session.backend().load(DOCUMENT_KEY).unwrap().is_none());
}

#[test]
fn failed_signup_keeps_gate_closed() {
    let mut session = Session::open(MemoryStorage::new(), StoreConfig::default()).unwrap();
    let mut hook = Webhook {
        offline: true,
        ..Default::default()
    };
    let err = session
        .submit_email("me@example.com", &ClientContext::default(), &mut hook)
        .unwrap_err();
    assert!(matches!(err, Error::Gate(GateError::Notify(_))));
    assert!(!session.gate().is_open());
    assert!(session.register_ai_interest(&mut hook));
}

#[test]
fn full_session_round_trip() {
    let mut session = Session::open(MemoryStorage::new(), StoreConfig::default()).unwrap();
    let mut hook = Webhook::default();
    session
        .submit_email("me@example.com", &ClientContext::default(), &mut hook)
        .unwrap();
    assert_eq!(hook.signups, 1);

    let (g, i) = first(&session);
    let t0 = Instant::now();
    session.store_mut().update_text_at(&g, &i, "Opening hook", t0);
    assert!(session.tick_at(t0 + Duration::from_millis(500)).unwrap());
    assert_eq!(session.store().past_len(), 1);

    let project = session.save_project("Launch week").unwrap().unwrap();
    assert!(session.save_project("   ").unwrap().is_none());
    assert!(session.backend().load(PROJECTS_KEY).unwrap().is_some());

    // Reopen over the same storage: gate open, document and library restored.
    let backend = session.into_backend();
    let mut reopened = Session::open(backend, StoreConfig::default()).unwrap();
    assert!(reopened.gate().is_open());
    let (g, i) = first(&reopened);
    assert_eq!(
        reopened.store().current().item(&g, &i).unwrap().text,
        "Opening hook"
    );
    assert!(!reopened.store().can_undo());
    assert_eq!(reopened.library().len(), 1);
    assert!(!reopened.autosave().unwrap());

    reopened.store_mut().add_group();
    assert!(reopened.load_project(&project));
    assert_eq!(reopened.store().current().len(), 1);

    assert!(reopened.delete_project(&project).unwrap());
    assert!(!reopened.delete_project(&project).unwrap());
    assert!(reopened.library().is_empty());
}

fn signed_up_backend() -> MemoryStorage {
    let mut backend = MemoryStorage::new();
    backend.save(EMAIL_KEY, "me@example.com").unwrap();
    backend
}

#[test]
fn corrupt_document_opens_with_fresh_document() {
    let mut backend = signed_up_backend();
    backend.save(DOCUMENT_KEY, "{not json").unwrap();

    let mut session = Session::open(backend, StoreConfig::default()).unwrap();
    assert!(session.gate().is_open());
    assert_eq!(session.store().current().len(), 1);
    assert_eq!(session.store().current().total_items(), 1);
    assert!(!session.store().can_undo());

    // Nothing is rewritten until the user edits.
    assert!(!session.autosave().unwrap());
    session.store_mut().add_group();
    assert!(session.autosave().unwrap());
    let stored = session.backend().load(DOCUMENT_KEY).unwrap().unwrap();
    assert!(stored.starts_with('['));
}

#[test]
fn corrupt_library_opens_empty_and_keeps_document() {
    let mut seed = Session::open(signed_up_backend(), StoreConfig::default()).unwrap();
    let (g, i) = first(&seed);
    seed.store_mut().set_text(&g, &i, "kept");
    assert!(seed.autosave().unwrap());
    let mut backend = seed.into_backend();
    backend.save(PROJECTS_KEY, "not a library").unwrap();

    let mut session = Session::open(backend, StoreConfig::default()).unwrap();
    assert!(session.library().is_empty());
    let (g, i) = first(&session);
    assert_eq!(session.store().current().item(&g, &i).unwrap().text, "kept");

    assert!(session.save_project("Fresh").unwrap().is_some());
    assert_eq!(session.library().len(), 1);
}

#[test]
fn signup_over_corrupt_data_still_opens() {
    let mut backend = MemoryStorage::new();
    backend.save(DOCUMENT_KEY, "{not json").unwrap();
    backend.save(PROJECTS_KEY, "[").unwrap();

    let mut session = Session::open(backend, StoreConfig::default()).unwrap();
    session
        .submit_email("me@example.com", &ClientContext::default(), &mut Webhook::default())
        .unwrap();
    assert!(session.gate().is_open());
    assert!(session.library().is_empty());
    assert_eq!(session.store().current().len(), 1);
}
