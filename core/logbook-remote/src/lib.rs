//! Remote data service client for Logbook.
//!
//! Provides the [`DataService`] seam the rest of the workspace talks to and
//! two backends behind it:
//! - [`GraphqlClient`] posts parameterized GraphQL documents over HTTP
//! - [`InMemoryDataService`] keeps records in process, for tests and dry runs
//!
//! Several mutations can travel in one request as a [`MutationBatch`]. The
//! service executes each on its own, so a batch reports one outcome per
//! mutation rather than a single success flag.
//!
//! # Example
//!
//! ```
//! use logbook_remote::{graphql, Mutation, MutationBatch, UpdateEventInput};
//! use logbook_types::{EncodedNote, EventId};
//!
//! let note = EncodedNote::encode(r#"injected""") { id } }"#);
//! let batch = MutationBatch::single(Mutation::UpdateEvent(
//!     UpdateEventInput::new(EventId::from("e1")).note(note),
//! ));
//!
//! let request = graphql::batch_request(&batch).unwrap();
//! assert!(!request.query.contains("injected"));
//! assert_eq!(request.variables["m0"]["id"], "e1");
//! ```

mod client;
mod error;
pub mod graphql;
mod memory;
mod mutation;
mod service;

pub use client::{GraphqlClient, GraphqlConfig};
pub use error::{RemoteError, RemoteResult};
pub use memory::{InMemoryDataService, PauseHandle, RemoteCall};
pub use mutation::{
    BatchResponse, CreateEventInput, CreateProjectInput, CreatePublicEventInput, DeleteInput,
    Mutation, MutationBatch, MutationFailure, MutationKind, MutationOutcome, MutationOutput,
    UpdateEventInput, UpdatePublicEventInput, CONFLICT_ERROR_TYPES, NOT_FOUND_ERROR_TYPE,
};
pub use service::DataService;
