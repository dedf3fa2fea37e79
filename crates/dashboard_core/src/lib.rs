//! Dashboard core: pure session state machine and view-model helpers.
mod effect;
mod msg;
mod records;
mod state;
mod status;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use records::{
    ChainEntry, ChatMessage, ChatRole, DocumentRecord, GraphEdge, GraphNode, JobStatusSnapshot,
    MessageId, Reference, SentenceChain,
};
pub use state::AppState;
pub use status::{derive_status, format_status_label, StatusCategory};
pub use update::update;
pub use view_model::{
    ActivePanel, AppViewModel, DocumentRowView, Notice, NoticeSeverity, ProgressView,
};
