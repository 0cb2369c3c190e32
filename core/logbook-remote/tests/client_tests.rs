use logbook_remote::{
    DataService, GraphqlClient, GraphqlConfig, Mutation, MutationBatch, RemoteError,
    UpdateEventInput,
};
use logbook_types::{EventId, ProjectId};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GraphqlClient {
    GraphqlClient::new(GraphqlConfig {
        endpoint: format!("{}/graphql", server.uri()),
        api_key: Some("da2-test".to_string()),
        auth_token: Some("jwt-token".to_string()),
        timeout_secs: 5,
    })
    .unwrap()
}

// ── Config ──────────────────────────────────────────────────────

#[test]
fn config_default() {
    let cfg = GraphqlConfig::default();
    assert_eq!(cfg.endpoint, "http://localhost:20002/graphql");
    assert_eq!(cfg.timeout_secs, 30);
    assert!(cfg.api_key.is_none());
    assert!(cfg.validate().is_ok());
}

#[test]
fn config_rejects_bad_endpoints() {
    for endpoint in ["", "   ", "ftp://example.com/graphql"] {
        let cfg = GraphqlConfig {
            endpoint: endpoint.to_string(),
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(RemoteError::Config(_))), "{endpoint:?}");
    }
    assert!(GraphqlClient::new(GraphqlConfig {
        timeout_secs: 0,
        ..Default::default()
    })
    .is_err());
}

#[test]
fn config_serde_fills_defaults() {
    let cfg: GraphqlConfig =
        serde_json::from_value(json!({ "endpoint": "https://api.example.com/graphql" })).unwrap();
    assert_eq!(cfg.endpoint, "https://api.example.com/graphql");
    assert_eq!(cfg.timeout_secs, 30);
}

// ── Requests ────────────────────────────────────────────────────

#[tokio::test]
async fn submit_posts_batch_with_auth_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("x-api-key", "da2-test"))
        .and(header("authorization", "jwt-token"))
        .and(body_partial_json(json!({
            "operationName": "Batch",
            "variables": { "m0": { "id": "e1", "hidden": true } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "m0": {
                    "id": "e1",
                    "note": "n",
                    "time": "2021-03-04T09:30:00Z",
                    "hidden": true,
                    "publicEvent": null,
                    "_version": 2
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let event = client
        .update_event(UpdateEventInput::new(EventId::from("e1")).hidden(true))
        .await
        .unwrap();

    assert!(event.hidden);
    assert_eq!(event.version, 2);
}

#[tokio::test]
async fn submit_keeps_partial_failures_per_mutation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "m0": { "id": "e1" }, "m1": null },
            "errors": [{ "message": "boom", "path": ["m1"] }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .submit(
            MutationBatch::new()
                .with(Mutation::delete_event(EventId::from("e1")))
                .with(Mutation::delete_event(EventId::from("e2"))),
        )
        .await
        .unwrap();

    assert!(response.outcome(0).unwrap().is_ok());
    assert!(response.outcome(1).unwrap().is_err());
}

#[tokio::test]
async fn non_success_status_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("UnauthorizedException"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.list_projects().await.unwrap_err();
    match err {
        RemoteError::Api { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Unauthorized"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn list_projects_follows_next_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "nextToken": null } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "listProjects": {
                "items": [{ "id": "a", "name": "Garden", "publicProject": null }],
                "nextToken": "page-2"
            } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "nextToken": "page-2" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "listProjects": {
                "items": [{ "id": "b", "name": "Thesis", "publicProject": { "id": "p1" } }],
                "nextToken": null
            } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let projects = client.list_projects().await.unwrap();

    let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Garden", "Thesis"]);
    assert!(projects[1].is_public_capable());
}

#[tokio::test]
async fn get_event_missing_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "getEvent": null } })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.get_event(&EventId::from("nope")).await.unwrap().is_none());
}

#[tokio::test]
async fn list_events_sorts_by_time() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "operationName": "EventsByProject" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "getProject": { "events": {
                "items": [
                    { "id": "late", "time": "2021-03-05T09:00:00Z" },
                    { "id": "early", "time": "2021-03-04T09:00:00Z" }
                ],
                "nextToken": null
            } } }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let events = client.list_events(&ProjectId::from("proj")).await.unwrap();
    let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["early", "late"]);
}

#[tokio::test]
async fn list_events_unknown_project_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "getProject": null } })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.list_events(&ProjectId::from("proj")).await.unwrap_err();
    assert!(err.is_not_found());
}
