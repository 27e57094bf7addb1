use crate::errors::{AppError, AppResult};
use crate::models::{ColorClass, DateKey, JournalRoot, Level, NodeId, SubjournalSettings};
use crate::resolver::{resolve_level, InFlight, LevelText, Resolution};
use crate::store::HostStore;
use tokio::time::{Duration, Instant};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EntryOptions {
    pub timeout: Duration,
    pub retry_delay: Duration,
    /// Initial text of the new leaf.
    pub leaf_text: String,
}

impl Default for EntryOptions {
    fn default() -> Self {
        Self::from_settings(&SubjournalSettings::default())
    }
}

impl EntryOptions {
    pub fn from_settings(settings: &SubjournalSettings) -> Self {
        Self {
            timeout: Duration::from_millis(settings.timeout_ms),
            retry_delay: Duration::from_millis(settings.retry_delay_ms),
            leaf_text: String::new(),
        }
    }

    pub fn with_leaf_text(mut self, text: impl Into<String>) -> Self {
        self.leaf_text = text.into();
        self
    }
}

struct Cascade {
    year: LevelText,
    month: LevelText,
    day: LevelText,
}

/// Resolves (or creates) the year, month and day scaffold for `date` under
/// the journal container and appends a new entry under the day node.
///
/// Every step is re-derived from fresh queries on each iteration; store
/// errors end the iteration and are retried until `options.timeout` runs
/// out, at which point the level last attempted is reported.
pub async fn create_entry(
    store: &dyn HostStore,
    root: &JournalRoot,
    date: &DateKey,
    color: ColorClass,
    options: &EntryOptions,
) -> AppResult<NodeId> {
    let operation_id = Uuid::new_v4();
    let cascade = Cascade {
        year: LevelText::year(date, color),
        month: LevelText::month(date, color),
        day: LevelText::day(date, color),
    };
    let started = Instant::now();
    let deadline = started + options.timeout;
    let mut in_flight = InFlight::new();
    let mut level = Level::Year;
    let mut iterations: u32 = 0;

    while Instant::now() < deadline {
        iterations += 1;
        match run_iteration(store, &mut in_flight, root, &cascade, &options.leaf_text, &mut level).await {
            Ok(Some(entry_id)) => {
                tracing::info!(
                    operation_id = %operation_id,
                    date = %date.full_date_text,
                    entry_id = %entry_id,
                    iterations,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "created journal entry"
                );
                return Ok(entry_id);
            }
            Ok(None) => {
                tracing::debug!(operation_id = %operation_id, level = %level, iterations, "level not visible yet");
            }
            Err(error) => {
                tracing::warn!(
                    operation_id = %operation_id,
                    level = %level,
                    iterations,
                    error = %error,
                    "entry iteration failed, retrying"
                );
            }
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        if options.retry_delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(options.retry_delay.min(remaining)).await;
        }
    }

    let elapsed_ms = started.elapsed().as_millis() as u64;
    tracing::warn!(
        operation_id = %operation_id,
        date = %date.full_date_text,
        level = %level,
        iterations,
        elapsed_ms,
        "gave up creating journal entry"
    );
    Err(AppError::Timeout {
        level,
        iterations,
        elapsed_ms,
    })
}

async fn run_iteration(
    store: &dyn HostStore,
    in_flight: &mut InFlight,
    root: &JournalRoot,
    cascade: &Cascade,
    leaf_text: &str,
    level: &mut Level,
) -> AppResult<Option<NodeId>> {
    let mut parent = root.container_id.clone();
    for (step, text) in [
        (Level::Year, &cascade.year),
        (Level::Month, &cascade.month),
        (Level::Day, &cascade.day),
    ] {
        *level = step;
        match resolve_level(store, in_flight, &parent, step, text).await? {
            Resolution::Found(id) => parent = id,
            Resolution::Pending => return Ok(None),
        }
    }

    *level = Level::Entry;
    let entry_id = store.generate_id();
    store.create_child(&parent, &entry_id, leaf_text, 0).await?;
    Ok(Some(entry_id))
}
