use chrono::{TimeZone, Utc};
use logbook_remote::{
    CreateEventInput, CreateProjectInput, CreatePublicEventInput, DataService,
    InMemoryDataService, Mutation, MutationBatch, MutationKind, RemoteCall, RemoteError,
    UpdateEventInput,
};
use logbook_types::{EncodedNote, Event, EventId, Project, ProjectId, PublicProjectId};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn seeded() -> InMemoryDataService {
    let service = InMemoryDataService::new();
    let project = Project {
        id: ProjectId::from("proj"),
        name: "Thesis".to_string(),
        public_project: Some(PublicProjectId::from("p1")),
    };
    service.insert_event(Event {
        id: EventId::from("e1"),
        note: EncodedNote::encode("first"),
        time: Utc.with_ymd_and_hms(2021, 3, 4, 9, 30, 0).unwrap(),
        filenames: vec!["f1".into()],
        hidden: true,
        project: Some(project.to_ref()),
        public_event: None,
        version: 1,
    });
    service.insert_project(project);
    service
}

#[tokio::test]
async fn update_bumps_version_and_honors_expected_version() {
    let service = seeded();

    let event = service
        .update_event(
            UpdateEventInput::new(EventId::from("e1"))
                .hidden(false)
                .expected_version(1),
        )
        .await
        .unwrap();
    assert!(!event.hidden);
    assert_eq!(event.version, 2);

    let err = service
        .update_event(
            UpdateEventInput::new(EventId::from("e1"))
                .hidden(true)
                .expected_version(1),
        )
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert!(!service.event(&EventId::from("e1")).unwrap().hidden);
}

#[tokio::test]
async fn event_reads_reflect_current_project() {
    let service = seeded();
    service.set_public_project(&ProjectId::from("proj"), None);

    let event = service.get_event(&EventId::from("e1")).await.unwrap().unwrap();
    assert_eq!(event.public_project(), None);
}

#[tokio::test]
async fn public_event_ids_are_sequential() {
    let service = seeded();
    let input = CreatePublicEventInput {
        filenames: vec![],
        note: EncodedNote::default(),
        time: Utc::now(),
        public_project_id: PublicProjectId::from("p1"),
    };

    let first = service.create_public_event(input.clone()).await.unwrap();
    let second = service.create_public_event(input).await.unwrap();
    assert_eq!(first.id.as_str(), "pe1");
    assert_eq!(second.id.as_str(), "pe2");
    assert_eq!(service.public_events().len(), 2);
}

#[tokio::test]
async fn deleting_a_mirror_does_not_touch_references() {
    let service = seeded();
    let mirror = service
        .create_public_event(CreatePublicEventInput {
            filenames: vec![],
            note: EncodedNote::default(),
            time: Utc::now(),
            public_project_id: PublicProjectId::from("p1"),
        })
        .await
        .unwrap();
    service
        .update_event(UpdateEventInput::new(EventId::from("e1")).link_mirror(mirror.id.clone()))
        .await
        .unwrap();

    service.delete_public_event(mirror.id.clone()).await.unwrap();

    let event = service.event(&EventId::from("e1")).unwrap();
    assert_eq!(event.public_event, Some(mirror.id.clone()));
    assert!(service.public_event(&mirror.id).is_none());
    let err = service.delete_public_event(mirror.id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn batch_mutations_fail_independently() {
    let service = seeded();
    service.fail_next(MutationKind::DeleteEvent, "injected");

    let response = service
        .submit(
            MutationBatch::new()
                .with(Mutation::delete_event(EventId::from("e1")))
                .with(Mutation::delete_project(ProjectId::from("proj"))),
        )
        .await
        .unwrap();

    assert!(response.outcome(0).unwrap().is_err());
    assert!(response.outcome(1).unwrap().is_ok());
    assert!(service.event(&EventId::from("e1")).is_some());
    assert!(service.project(&ProjectId::from("proj")).is_none());
}

#[tokio::test]
async fn failure_rules_count_down() {
    let service = seeded();
    service.fail_times(MutationKind::CreateProject, 2, "quota");

    for _ in 0..2 {
        let err = service
            .create_project(CreateProjectInput {
                id: None,
                name: "x".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Rejected { .. }));
    }
    let project = service
        .create_project(CreateProjectInput {
            id: None,
            name: "x".into(),
        })
        .await
        .unwrap();
    assert_eq!(project.id.as_str(), "project-1");
}

#[tokio::test]
async fn zero_failures_is_a_no_op() {
    let service = seeded();
    service.fail_times(MutationKind::UpdateEvent, 0, "never");

    let event = service
        .update_event(UpdateEventInput::new(EventId::from("e1")).hidden(false))
        .await
        .unwrap();
    assert!(!event.hidden);
}

#[tokio::test]
async fn fail_after_lets_earlier_mutations_through() {
    let service = seeded();
    service.fail_after(MutationKind::UpdateEvent, 1, "throttled");

    service
        .update_event(UpdateEventInput::new(EventId::from("e1")).hidden(false))
        .await
        .unwrap();
    let err = service
        .update_event(UpdateEventInput::new(EventId::from("e1")).hidden(true))
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Rejected { .. }));

    let event = service
        .update_event(UpdateEventInput::new(EventId::from("e1")).hidden(true))
        .await
        .unwrap();
    assert!(event.hidden);
    assert_eq!(event.version, 3);
}

#[tokio::test]
async fn request_failure_fails_before_anything_applies() {
    let service = seeded();
    service.fail_next_request("connection reset");

    let err = service.delete_event(EventId::from("e1")).await.unwrap_err();
    assert!(matches!(err, RemoteError::Api { status: 503, .. }));
    assert!(service.event(&EventId::from("e1")).is_some());
}

#[tokio::test]
async fn duplicate_ids_are_rejected() {
    let service = seeded();
    let err = service
        .create_event(CreateEventInput {
            id: Some(EventId::from("e1")),
            project_id: ProjectId::from("proj"),
            note: EncodedNote::default(),
            time: Utc::now(),
            filenames: vec![],
            hidden: true,
        })
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn calls_are_recorded_in_order() {
    let service = seeded();
    service.list_projects().await.unwrap();
    service.delete_event(EventId::from("e1")).await.unwrap();
    service.list_events(&ProjectId::from("proj")).await.unwrap();

    assert_eq!(
        service.calls(),
        vec![
            RemoteCall::Query("listProjects"),
            RemoteCall::Submit(vec![MutationKind::DeleteEvent]),
            RemoteCall::Query("eventsByProject"),
        ]
    );
    service.clear_calls();
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn paused_mutation_waits_for_release() {
    let service = Arc::new(seeded());
    let pause = service.pause_next(MutationKind::UpdateEvent);

    let task = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .update_event(UpdateEventInput::new(EventId::from("e1")).hidden(false))
                .await
        })
    };

    pause.reached().await;
    assert!(service.event(&EventId::from("e1")).unwrap().hidden);

    pause.release();
    let event = task.await.unwrap().unwrap();
    assert!(!event.hidden);
}
