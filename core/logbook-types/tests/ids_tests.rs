use logbook_types::{EventId, ProjectId, PublicEventId, PublicProjectId};
use std::collections::HashSet;

#[test]
fn generated_ids_are_unique() {
    let ids: HashSet<EventId> = (0..100).map(|_| EventId::generate()).collect();
    assert_eq!(ids.len(), 100);
}

#[test]
fn generated_ids_are_time_ordered() {
    let a = ProjectId::generate();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let b = ProjectId::generate();
    assert!(a < b);
}

#[test]
fn imported_ids_are_preserved_verbatim() {
    let id = EventId::from("legacy event #7");
    assert_eq!(id.as_str(), "legacy event #7");
    assert_eq!(id.to_string(), "legacy event #7");
    assert_eq!(id.into_inner(), "legacy event #7");
}

#[test]
fn id_serializes_as_plain_string() {
    let id = PublicEventId::from("pe1");
    assert_eq!(serde_json::to_string(&id).unwrap(), r#""pe1""#);

    let parsed: PublicProjectId = serde_json::from_str(r#""p1""#).unwrap();
    assert_eq!(parsed.as_ref(), "p1");
}
