//! Configuration for the `logbook` command-line client.

use clap::ValueEnum;
use logbook_blobstore::S3Config;
use logbook_events::ReconcileDecision;
use logbook_remote::GraphqlConfig;
use logbook_types::PublicEventId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors in loading or checking the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Client configuration, read from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogbookConfig {
    pub graphql: GraphqlConfig,
    pub storage: S3Config,
}

/// Values given on the command line or in the environment. Set values win
/// over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub auth_token: Option<String>,
    pub bucket: Option<String>,
    pub identity: Option<String>,
}

impl LogbookConfig {
    /// Reads a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Reads `path` if given, otherwise starts from the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(endpoint) = &overrides.endpoint {
            self.graphql.endpoint = endpoint.clone();
        }
        if let Some(api_key) = &overrides.api_key {
            self.graphql.api_key = Some(api_key.clone());
        }
        if let Some(auth_token) = &overrides.auth_token {
            self.graphql.auth_token = Some(auth_token.clone());
        }
        if let Some(bucket) = &overrides.bucket {
            self.storage.bucket = bucket.clone();
        }
        if let Some(identity) = &overrides.identity {
            self.storage.identity_id = Some(identity.clone());
        }
        self
    }

    /// Checks the settings every command needs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.graphql.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("graphql endpoint is empty".to_string()));
        }
        self.graphql
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Checks the attachment storage settings. Only event commands touch
    /// storage.
    pub fn validate_storage(&self) -> Result<(), ConfigError> {
        if self.storage.bucket.trim().is_empty() {
            return Err(ConfigError::Invalid("storage bucket is empty".to_string()));
        }
        self.storage
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Reconcile decision as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DecisionArg {
    ReuseMirror,
    CreateMirror,
    RevertToPrivate,
    DeleteMirror,
    Republish,
}

impl DecisionArg {
    /// Builds the decision; `reuse-mirror` needs the mirror id.
    pub fn into_decision(
        self,
        mirror: Option<PublicEventId>,
    ) -> Result<ReconcileDecision, ConfigError> {
        Ok(match self {
            DecisionArg::ReuseMirror => ReconcileDecision::ReuseMirror(mirror.ok_or_else(|| {
                ConfigError::Invalid("reuse-mirror needs --mirror <id>".to_string())
            })?),
            DecisionArg::CreateMirror => ReconcileDecision::CreateMirror,
            DecisionArg::RevertToPrivate => ReconcileDecision::RevertToPrivate,
            DecisionArg::DeleteMirror => ReconcileDecision::DeleteMirror,
            DecisionArg::Republish => ReconcileDecision::Republish,
        })
    }
}
