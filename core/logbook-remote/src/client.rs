//! GraphQL-over-HTTP implementation of [`DataService`].

use crate::error::{RemoteError, RemoteResult};
use crate::graphql::{self, GraphqlRequest, GraphqlResponse, Page};
use crate::mutation::{BatchResponse, MutationBatch};
use crate::service::DataService;
use async_trait::async_trait;
use logbook_types::{Event, EventId, Project, ProjectId, PublicEvent, PublicEventId};
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Connection settings for the GraphQL endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphqlConfig {
    /// Full URL of the GraphQL endpoint.
    pub endpoint: String,
    /// Sent as `x-api-key` when set.
    pub api_key: Option<String>,
    /// Sent as `Authorization` when set (e.g. a user pool JWT).
    pub auth_token: Option<String>,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for GraphqlConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:20002/graphql".to_string(),
            api_key: None,
            auth_token: None,
            timeout_secs: 30,
        }
    }
}

impl GraphqlConfig {
    /// Checks the settings before any request is made.
    pub fn validate(&self) -> RemoteResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(RemoteError::Config("endpoint is empty".to_string()));
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(RemoteError::Config(format!(
                "endpoint must be an http(s) URL: {}",
                self.endpoint
            )));
        }
        if self.timeout_secs == 0 {
            return Err(RemoteError::Config("timeout must be positive".to_string()));
        }
        Ok(())
    }
}

/// Remote data service reached over HTTP.
pub struct GraphqlClient {
    config: GraphqlConfig,
    client: Client,
}

impl GraphqlClient {
    /// Creates a client after validating `config`.
    pub fn new(config: GraphqlConfig) -> RemoteResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GraphqlConfig {
        &self.config
    }

    /// Posts one request and decodes the GraphQL envelope.
    pub async fn execute(&self, request: &GraphqlRequest) -> RemoteResult<GraphqlResponse> {
        debug!(
            "POST {} ({})",
            self.config.endpoint,
            request.operation_name.as_deref().unwrap_or("anonymous")
        );

        let mut builder = self.client.post(&self.config.endpoint).json(request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.header("x-api-key", api_key);
        }
        if let Some(token) = &self.config.auth_token {
            builder = builder.header(AUTHORIZATION, token);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    async fn query<T: serde::de::DeserializeOwned>(
        &self,
        request: GraphqlRequest,
        field: &str,
    ) -> RemoteResult<Option<T>> {
        let response = self.execute(&request).await?;
        graphql::query_field(response, field)
    }
}

#[derive(Deserialize)]
struct ProjectEvents {
    events: Option<Page<Event>>,
}

#[async_trait]
impl DataService for GraphqlClient {
    fn service_name(&self) -> &'static str {
        "GraphQL"
    }

    async fn submit(&self, batch: MutationBatch) -> RemoteResult<BatchResponse> {
        let request = graphql::batch_request(&batch)?;
        let response = self.execute(&request).await?;
        graphql::split_batch_response(&batch.kinds(), response)
    }

    async fn list_projects(&self) -> RemoteResult<Vec<Project>> {
        let mut projects = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let page: Page<Project> = self
                .query(
                    graphql::list_projects_request(next_token.as_deref()),
                    "listProjects",
                )
                .await?
                .ok_or_else(|| RemoteError::MissingData("listProjects".to_string()))?;

            projects.extend(page.items);
            next_token = page.next_token;
            if next_token.is_none() {
                break;
            }
        }

        Ok(projects)
    }

    async fn get_project(&self, id: &ProjectId) -> RemoteResult<Option<Project>> {
        self.query(graphql::get_project_request(id.as_str()), "getProject")
            .await
    }

    async fn get_event(&self, id: &EventId) -> RemoteResult<Option<Event>> {
        self.query(graphql::get_event_request(id.as_str()), "getEvent")
            .await
    }

    async fn get_public_event(&self, id: &PublicEventId) -> RemoteResult<Option<PublicEvent>> {
        self.query(graphql::get_public_event_request(id.as_str()), "getPublicEvent")
            .await
    }

    async fn list_events(&self, project_id: &ProjectId) -> RemoteResult<Vec<Event>> {
        let mut events = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let project: ProjectEvents = self
                .query(
                    graphql::events_by_project_request(project_id.as_str(), next_token.as_deref()),
                    "getProject",
                )
                .await?
                .ok_or_else(|| RemoteError::NotFound {
                    operation: "getProject",
                    message: format!("project {project_id}"),
                })?;

            let Some(page) = project.events else { break };
            events.extend(page.items);
            next_token = page.next_token;
            if next_token.is_none() {
                break;
            }
        }

        events.sort_by(|a, b| a.time.cmp(&b.time));
        Ok(events)
    }
}
