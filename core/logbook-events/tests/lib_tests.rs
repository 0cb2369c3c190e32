use logbook_events::{
    InconsistencyWarning, ReconcileDecision, SagaStep, TransitionLocks, VisibilityError,
};
use logbook_remote::RemoteError;
use logbook_types::{EventId, PublicEventId, Visibility};

// ── Transition locks ────────────────────────────────────────────

#[test]
fn lock_is_exclusive_per_event() {
    let locks = TransitionLocks::new();
    let e1 = EventId::from("e1");
    let e2 = EventId::from("e2");

    let guard = locks.try_acquire(&e1).unwrap();
    assert_eq!(guard.event(), &e1);
    assert!(locks.try_acquire(&e1).is_none());
    assert!(locks.try_acquire(&e2).is_some());

    drop(guard);
    assert!(!locks.is_held(&e1));
    assert!(locks.try_acquire(&e1).is_some());
}

#[test]
fn cloned_locks_share_state() {
    let locks = TransitionLocks::new();
    let clone = locks.clone();
    let e1 = EventId::from("e1");

    let _guard = locks.try_acquire(&e1).unwrap();
    assert!(clone.is_held(&e1));
    assert!(clone.try_acquire(&e1).is_none());
}

// ── Display ─────────────────────────────────────────────────────

#[test]
fn step_and_decision_display() {
    assert_eq!(SagaStep::LinkMirror.to_string(), "link mirror");
    assert_eq!(
        ReconcileDecision::ReuseMirror(PublicEventId::from("pe2")).to_string(),
        "reuse mirror pe2"
    );
    assert_eq!(ReconcileDecision::RevertToPrivate.to_string(), "revert to private");
}

#[test]
fn error_messages_name_the_state() {
    let err = VisibilityError::Stranded {
        event: EventId::from("e1"),
        state: Visibility::PendingPublic,
    };
    assert_eq!(
        err.to_string(),
        "event e1 is stranded (pending public (no mirror)); reconcile it first"
    );
    assert_eq!(err.stranded_state(), Some(Visibility::PendingPublic));

    let err = VisibilityError::InvalidDecision {
        state: Visibility::Private,
        decision: ReconcileDecision::Republish,
    };
    assert!(err.to_string().contains("republish"));
    assert_eq!(err.stranded_state(), None);

    let err = VisibilityError::TransitionInFlight(EventId::from("e9"));
    assert!(err.to_string().contains("e9"));
    assert!(err.snapshot().is_none());
}

#[test]
fn remote_error_is_the_source() {
    use std::error::Error;

    let err = VisibilityError::Remote {
        step: SagaStep::CreateMirror,
        event: Box::new(logbook_types::Event {
            id: EventId::from("e1"),
            note: Default::default(),
            time: chrono::Utc::now(),
            filenames: vec![],
            hidden: false,
            project: None,
            public_event: None,
            version: 2,
        }),
        state: Visibility::PendingPublic,
        orphan: None,
        source: RemoteError::GraphQl("boom".to_string()),
    };
    assert!(err.to_string().starts_with("create mirror failed for event e1"));
    assert!(err.source().unwrap().to_string().contains("boom"));
    assert_eq!(err.snapshot().unwrap().version, 2);
}

#[test]
fn warnings_serialize_with_kind() {
    let warning = InconsistencyWarning::MirrorAlreadyDeleted {
        event: EventId::from("e1"),
        mirror: PublicEventId::from("pe1"),
    };
    let json = serde_json::to_value(&warning).unwrap();
    assert_eq!(json["kind"], "mirror_already_deleted");
    assert_eq!(json["mirror"], "pe1");
    assert_eq!(warning.to_string(), "mirror pe1 of event e1 was already deleted");
}
