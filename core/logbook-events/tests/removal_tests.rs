use chrono::{TimeZone, Utc};
use logbook_blobstore::MemoryObjectStore;
use logbook_events::{EventService, FileFailure, RemovalOutcome};
use logbook_remote::{InMemoryDataService, MutationKind, RemoteCall};
use logbook_types::{
    EncodedNote, Event, EventId, Project, ProjectId, PublicEvent, PublicEventId, PublicProjectId,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn project() -> Project {
    Project {
        id: ProjectId::from("proj"),
        name: "Renovation".to_string(),
        public_project: Some(PublicProjectId::from("p1")),
    }
}

fn event(filenames: &[&str], mirror: Option<&str>) -> Event {
    Event {
        id: EventId::from("e1"),
        note: EncodedNote::encode("Tiles delivered"),
        time: Utc.with_ymd_and_hms(2020, 9, 9, 17, 45, 0).unwrap(),
        filenames: filenames.iter().map(|f| f.to_string()).collect(),
        hidden: mirror.is_none(),
        project: Some(project().to_ref()),
        public_event: mirror.map(PublicEventId::from),
        version: 1,
    }
}

struct Fixture {
    data: Arc<InMemoryDataService>,
    store: Arc<MemoryObjectStore>,
    service: EventService,
}

fn setup(event: &Event) -> Fixture {
    let data = Arc::new(InMemoryDataService::new());
    data.insert_project(project());
    data.insert_event(event.clone());
    let store = Arc::new(MemoryObjectStore::with_objects(event.filenames.clone()));
    let service = EventService::new(data.clone(), store.clone());
    Fixture {
        data,
        store,
        service,
    }
}

#[tokio::test]
async fn deletes_event_and_all_files() {
    let e1 = event(&["a.jpg", "b.jpg"], None);
    let f = setup(&e1);

    let report = f.service.delete_event(&e1).await;

    assert_eq!(report.event, RemovalOutcome::Deleted);
    assert_eq!(report.mirror, RemovalOutcome::Skipped);
    assert_eq!(report.removed, vec!["a.jpg".to_string(), "b.jpg".to_string()]);
    assert!(report.is_complete());
    assert!(f.data.event(&e1.id).is_none());
    assert!(f.store.keys().is_empty());
    assert_eq!(
        f.data.calls(),
        vec![RemoteCall::Submit(vec![MutationKind::DeleteEvent])]
    );
}

#[tokio::test]
async fn one_failed_removal_does_not_stop_the_rest() {
    let e1 = event(&["a.jpg", "b.jpg", "c.jpg", "d.jpg"], None);
    let f = setup(&e1);
    f.store.fail_on("b.jpg");

    let report = f.service.delete_event(&e1).await;

    assert_eq!(f.store.removal_attempts(), e1.filenames);
    assert_eq!(
        report.removed,
        vec!["a.jpg".to_string(), "c.jpg".to_string(), "d.jpg".to_string()]
    );
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].key, "b.jpg");
    assert!(!report.is_complete());
    assert_eq!(report.event, RemovalOutcome::Deleted);
    assert_eq!(f.store.keys(), vec!["b.jpg".to_string()]);
}

#[tokio::test]
async fn deletes_mirror_in_the_same_request() {
    let e1 = event(&[], Some("pe1"));
    let f = setup(&e1);
    f.data.insert_public_event(PublicEvent {
        id: PublicEventId::from("pe1"),
        filenames: vec![],
        note: e1.note.clone(),
        time: e1.time,
        public_project: Some(PublicProjectId::from("p1")),
    });

    let report = f.service.delete_event(&e1).await;

    assert_eq!(report.event, RemovalOutcome::Deleted);
    assert_eq!(report.mirror, RemovalOutcome::Deleted);
    assert!(f.data.public_events().is_empty());
    assert_eq!(
        f.data.calls(),
        vec![RemoteCall::Submit(vec![
            MutationKind::DeleteEvent,
            MutationKind::DeletePublicEvent,
        ])]
    );
}

#[tokio::test]
async fn missing_mirror_counts_as_gone() {
    let e1 = event(&[], Some("pe9"));
    let f = setup(&e1);

    let report = f.service.delete_event(&e1).await;

    assert_eq!(report.event, RemovalOutcome::Deleted);
    assert_eq!(report.mirror, RemovalOutcome::AlreadyGone);
    assert!(report.is_complete());
}

#[tokio::test]
async fn files_are_removed_even_when_the_request_fails() {
    let e1 = event(&["a.jpg", "b.jpg"], Some("pe1"));
    let f = setup(&e1);
    f.data.fail_next_request("connection reset");

    let report = f.service.delete_event(&e1).await;

    assert!(report.event.is_failed());
    assert!(report.mirror.is_failed());
    assert_eq!(report.removed.len(), 2);
    assert!(f.data.event(&e1.id).is_some());
}

#[tokio::test]
async fn rejected_event_delete_is_reported() {
    let e1 = event(&["a.jpg"], None);
    let f = setup(&e1);
    f.data.fail_next(MutationKind::DeleteEvent, "not owner");
    f.store.fail_on("a.jpg");

    let report = f.service.delete_event(&e1).await;

    assert!(matches!(report.event, RemovalOutcome::Failed(ref m) if m.contains("not owner")));
    assert_eq!(
        report.failed,
        vec![FileFailure {
            key: "a.jpg".to_string(),
            error: "S3 operation failed: access denied: a.jpg".to_string(),
        }]
    );
}
