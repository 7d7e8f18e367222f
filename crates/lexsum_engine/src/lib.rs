//! Lexsum engine: backend IO and effect execution.
mod api;
mod chat;
mod controller;
mod notify;
mod persist;
mod recent;
mod tabs;
mod timers;
mod types;
mod wire;

pub use api::{ApiSettings, BackendApi, ReqwestBackend};
pub use chat::{ChatMessage, ChatRole, ChatSession};
pub use controller::SessionController;
pub use notify::{CompletionNotifier, SessionCompleted};
pub use persist::{ensure_data_dir, DataDir, PersistError};
pub use recent::{
    Clock, RecentDocumentRecord, RecentDocumentStore, RecentDocuments, RecentList,
    RecentStoreError, RECENT_FILENAME, SCHEMA_VERSION,
};
pub use tabs::{resolve_all_tabs, resolve_tab, SliceSource, TabSlice};
pub use timers::{PollSettings, TimerSet};
pub use types::{ApiError, FailureKind, UploadFile};
pub use wire::{decode_chat_reply, decode_progress, decode_result, decode_tab, decode_upload_ack};
