//! GraphQL request construction and response splitting.
//!
//! Documents are assembled only from static operation names, type names
//! and selection sets. All values, including note text and ids, are passed
//! in `variables`, so user content can never change the shape of a request.

use crate::error::{RemoteError, RemoteResult};
use crate::mutation::{
    BatchResponse, MutationBatch, MutationFailure, MutationKind, MutationOutcome, EVENT_FIELDS,
    PROJECT_FIELDS, PUBLIC_EVENT_FIELDS,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Page size requested from list queries.
pub const PAGE_SIZE: u32 = 100;

/// A GraphQL request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub query: String,
    pub variables: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl GraphqlRequest {
    fn new(operation_name: &str, query: String) -> Self {
        Self {
            query,
            variables: Map::new(),
            operation_name: Some(operation_name.to_string()),
        }
    }

    fn variable(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.variables.insert(name.to_string(), value.into());
        self
    }
}

/// A GraphQL response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

/// One entry of a response's `errors` list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlError {
    pub message: String,
    #[serde(default)]
    pub path: Vec<Value>,
    #[serde(default)]
    pub error_type: Option<String>,
}

impl GraphqlError {
    fn root_field(&self) -> Option<&str> {
        self.path.first().and_then(Value::as_str)
    }
}

/// Alias of the `index`-th mutation of a batch.
pub fn alias(index: usize) -> String {
    format!("m{index}")
}

/// Builds one request carrying every mutation of `batch`.
///
/// The `index`-th mutation is aliased `m<index>` and reads its input from
/// the variable of the same name.
pub fn batch_request(batch: &MutationBatch) -> RemoteResult<GraphqlRequest> {
    let mut params = Vec::with_capacity(batch.len());
    let mut fields = Vec::with_capacity(batch.len());
    let mut variables = Map::new();

    for (index, mutation) in batch.iter().enumerate() {
        let kind = mutation.kind();
        let alias = alias(index);
        params.push(format!("${alias}: {}!", kind.input_type()));
        fields.push(format!(
            "  {alias}: {}(input: ${alias}) {{ {} }}",
            kind.operation_name(),
            kind.selection()
        ));
        variables.insert(alias, mutation.input_json()?);
    }

    Ok(GraphqlRequest {
        query: format!("mutation Batch({}) {{\n{}\n}}", params.join(", "), fields.join("\n")),
        variables,
        operation_name: Some("Batch".to_string()),
    })
}

/// Splits a batch response into per-mutation outcomes.
///
/// Errors whose path starts at a mutation's alias belong to that mutation.
/// Errors without a path fail the whole request.
pub fn split_batch_response(
    kinds: &[MutationKind],
    response: GraphqlResponse,
) -> RemoteResult<BatchResponse> {
    let GraphqlResponse { data, errors } = response;

    let request_errors: Vec<&GraphqlError> =
        errors.iter().filter(|e| e.root_field().is_none()).collect();
    if !request_errors.is_empty() {
        return Err(RemoteError::GraphQl(join_messages(request_errors)));
    }

    let mut data = match data {
        Some(Value::Object(map)) => map,
        Some(Value::Null) | None => Map::new(),
        Some(other) => {
            return Err(RemoteError::GraphQl(format!(
                "expected an object as data, got {other}"
            )));
        }
    };

    let outcomes = kinds
        .iter()
        .enumerate()
        .map(|(index, &kind)| {
            let alias = alias(index);
            if let Some(error) = errors.iter().find(|e| e.root_field() == Some(alias.as_str())) {
                let failure = MutationFailure::new(kind, error.message.clone());
                return Err(match &error.error_type {
                    Some(error_type) => failure.with_type(error_type.clone()),
                    None => failure,
                });
            }
            match data.remove(&alias) {
                Some(Value::Null) | None => Err(MutationFailure::new(kind, "returned no data")),
                Some(value) => kind
                    .parse_output(value)
                    .map_err(|e| MutationFailure::new(kind, format!("malformed result: {e}"))),
            }
        })
        .collect::<Vec<MutationOutcome>>();

    Ok(BatchResponse::new(outcomes))
}

/// Extracts the top-level `field` of a query response.
///
/// A `null` field reads as `None`; any error fails the query.
pub fn query_field<T: DeserializeOwned>(
    response: GraphqlResponse,
    field: &str,
) -> RemoteResult<Option<T>> {
    if !response.errors.is_empty() {
        return Err(RemoteError::GraphQl(join_messages(response.errors.iter())));
    }
    match response.data.and_then(|mut data| data.get_mut(field).map(Value::take)) {
        Some(Value::Null) | None => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
    }
}

fn join_messages<'a>(errors: impl IntoIterator<Item = &'a GraphqlError>) -> String {
    errors
        .into_iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A page of a list query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next_token: Option<String>,
}

pub fn list_projects_request(next_token: Option<&str>) -> GraphqlRequest {
    GraphqlRequest::new(
        "ListProjects",
        format!(
            "query ListProjects($limit: Int, $nextToken: String) {{ \
             listProjects(limit: $limit, nextToken: $nextToken) {{ items {{ {PROJECT_FIELDS} }} nextToken }} }}"
        ),
    )
    .variable("limit", PAGE_SIZE)
    .variable("nextToken", next_token.map(str::to_string))
}

pub fn get_project_request(id: &str) -> GraphqlRequest {
    GraphqlRequest::new(
        "GetProject",
        format!("query GetProject($id: ID!) {{ getProject(id: $id) {{ {PROJECT_FIELDS} }} }}"),
    )
    .variable("id", id)
}

pub fn get_event_request(id: &str) -> GraphqlRequest {
    GraphqlRequest::new(
        "GetEvent",
        format!("query GetEvent($id: ID!) {{ getEvent(id: $id) {{ {EVENT_FIELDS} }} }}"),
    )
    .variable("id", id)
}

pub fn get_public_event_request(id: &str) -> GraphqlRequest {
    GraphqlRequest::new(
        "GetPublicEvent",
        format!(
            "query GetPublicEvent($id: ID!) {{ getPublicEvent(id: $id) {{ {PUBLIC_EVENT_FIELDS} }} }}"
        ),
    )
    .variable("id", id)
}

pub fn events_by_project_request(project_id: &str, next_token: Option<&str>) -> GraphqlRequest {
    GraphqlRequest::new(
        "EventsByProject",
        format!(
            "query EventsByProject($projectId: ID!, $limit: Int, $nextToken: String) {{ \
             getProject(id: $projectId) {{ events(limit: $limit, nextToken: $nextToken) \
             {{ items {{ {EVENT_FIELDS} }} nextToken }} }} }}"
        ),
    )
    .variable("projectId", project_id)
    .variable("limit", PAGE_SIZE)
    .variable("nextToken", next_token.map(str::to_string))
}
