use logbook_types::{Event, EventId, Project, PublicEvent, PublicEventId, PublicProjectId, Visibility};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn event_flattens_nested_references() {
    let event: Event = serde_json::from_value(json!({
        "id": "e1",
        "note": "hello",
        "time": "2021-03-04T09:30:00.000Z",
        "filenames": ["f1", "f2"],
        "hidden": false,
        "project": { "id": "proj", "publicProject": { "id": "p1" } },
        "publicEvent": { "id": "pe1" },
        "_version": 3
    }))
    .unwrap();

    assert_eq!(event.id, EventId::from("e1"));
    assert_eq!(event.filenames, vec!["f1", "f2"]);
    assert_eq!(event.public_event, Some(PublicEventId::from("pe1")));
    assert_eq!(event.public_project(), Some(&PublicProjectId::from("p1")));
    assert_eq!(event.version, 3);
    assert_eq!(
        event.visibility(),
        Visibility::Public {
            mirror: PublicEventId::from("pe1")
        }
    );
}

#[test]
fn event_nulls_read_as_defaults() {
    let event: Event = serde_json::from_value(json!({
        "id": "e1",
        "note": null,
        "time": "2021-03-04T09:30:00Z",
        "filenames": null,
        "hidden": null,
        "project": { "id": "proj", "publicProject": null },
        "publicEvent": null
    }))
    .unwrap();

    assert!(event.note.is_empty());
    assert!(event.filenames.is_empty());
    assert!(event.hidden);
    assert_eq!(event.public_project(), None);
    assert_eq!(event.version, 0);
    assert_eq!(event.visibility(), Visibility::Private);
}

#[test]
fn event_missing_optional_fields() {
    let event: Event = serde_json::from_value(json!({
        "id": "e1",
        "time": "2021-03-04T09:30:00Z"
    }))
    .unwrap();

    assert!(event.hidden);
    assert!(event.project.is_none());
    assert!(event.public_event.is_none());
}

#[test]
fn event_serializes_back_to_wire_shape() {
    let event: Event = serde_json::from_value(json!({
        "id": "e1",
        "time": "2021-03-04T09:30:00Z",
        "hidden": false,
        "publicEvent": { "id": "pe1" },
        "_version": 2
    }))
    .unwrap();

    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["publicEvent"], json!({ "id": "pe1" }));
    assert_eq!(value["_version"], json!(2));
    assert_eq!(value["project"], json!(null));

    let back: Event = serde_json::from_value(value).unwrap();
    assert_eq!(back, event);
}

#[test]
fn project_public_capability() {
    let private: Project = serde_json::from_value(json!({ "id": "a", "name": "Garden" })).unwrap();
    assert!(!private.is_public_capable());

    let public: Project = serde_json::from_value(json!({
        "id": "b",
        "name": "Thesis",
        "publicProject": { "id": "p1" }
    }))
    .unwrap();
    assert!(public.is_public_capable());
    assert_eq!(public.to_ref().public_project, Some(PublicProjectId::from("p1")));
}

#[test]
fn public_event_keeps_filename_order() {
    let mirror: PublicEvent = serde_json::from_value(json!({
        "id": "pe1",
        "filenames": ["z.png", "a.png", "m.png"],
        "note": "hi",
        "time": "2021-03-04T09:30:00Z",
        "publicProject": { "id": "p1" }
    }))
    .unwrap();
    assert_eq!(mirror.filenames, vec!["z.png", "a.png", "m.png"]);
    assert_eq!(mirror.public_project, Some(PublicProjectId::from("p1")));
}
