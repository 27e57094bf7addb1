pub mod config;
pub mod context;
pub mod date_key;
pub mod db;
pub mod errors;
pub mod journal_root;
pub mod models;
pub mod orchestrator;
pub mod resolver;
pub mod service;
pub mod store;
pub mod ui;

pub use crate::config::read_stream_definitions;
pub use crate::context::classify_page;
pub use crate::date_key::parse_date_key;
pub use crate::db::SqliteStore;
pub use crate::errors::{AppError, AppResult};
pub use crate::journal_root::get_journal_root;
pub use crate::models::{
    ColorClass, DateKey, EntryOutcome, JournalRoot, Level, NavigationMode, NodeId, OutlineNode, PageContext,
    StreamDefinition, SubjournalSettings,
};
pub use crate::orchestrator::{create_entry, EntryOptions};
pub use crate::service::SubjournalsCore;
pub use crate::store::memory::MemoryStore;
pub use crate::store::{ChildFilter, HostStore};
pub use crate::ui::{HeadlessUi, HostUi};

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// Installs the JSON file logger under `<log_dir>/logs`. `RUST_LOG` overrides
/// the default `info` filter.
pub fn init_tracing(log_dir: &Path) -> AppResult<()> {
    let log_dir = log_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|error| AppError::Internal(error.to_string()))?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "subjournals.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| AppError::Internal(error.to_string()))
}
