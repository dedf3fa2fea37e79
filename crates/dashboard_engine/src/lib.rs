//! Dashboard engine: backend API client, pollers and effect execution.
//!
//! The engine owns all IO. It runs a tokio runtime on a dedicated thread,
//! receives [`EngineCommand`]s from the shell and reports back through
//! [`EngineEvent`]s, so the core state machine stays free of async code.

pub mod api;
pub mod cache;
pub mod engine;
pub mod normalize;
pub mod poller;
pub mod query;
pub mod types;
pub mod upload;

pub use api::{ApiClient, ApiSettings, ReqwestApiClient};
pub use cache::DocsCache;
pub use engine::{run_engine, EngineCommand, EngineConfig, EngineHandle};
pub use poller::{
    run_chain_poll, run_status_poll, ChannelEventSink, EventSink, PollSettings, PollState,
};
pub use query::{run_query, should_fall_back};
pub use types::{ApiError, ApiErrorKind, EngineEvent, QueryOutcome, QueryStatus, UploadInit};
pub use upload::run_upload;
