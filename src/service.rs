use crate::config::{find_stream, read_stream_definitions};
use crate::context::{classify_page, navigation_mode};
use crate::date_key::parse_date_key;
use crate::errors::{AppError, AppResult};
use crate::journal_root::get_journal_root;
use crate::models::{
    ColorClass, DateKey, EntryOutcome, JournalRoot, NodeId, PageContext, StreamDefinition, SubjournalSettings,
};
use crate::orchestrator::{create_entry, EntryOptions};
use crate::store::HostStore;
use crate::ui::{request_focus, HostUi};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Duration;

const FALLBACK_DISPLAY_NAME: &str = "User";

/// Entry point for the host's UI layer: reads configuration, classifies
/// pages, files new entries and asks the host to show them.
pub struct SubjournalsCore {
    store: Arc<dyn HostStore>,
    ui: Arc<dyn HostUi>,
    settings: RwLock<SubjournalSettings>,
}

impl SubjournalsCore {
    pub fn new(store: Arc<dyn HostStore>, ui: Arc<dyn HostUi>, settings: SubjournalSettings) -> Arc<Self> {
        Arc::new(Self {
            store,
            ui,
            settings: RwLock::new(settings),
        })
    }

    pub async fn settings(&self) -> SubjournalSettings {
        self.settings.read().await.clone()
    }

    pub async fn update_settings(&self, update: serde_json::Value) -> AppResult<SubjournalSettings> {
        let mut settings = self.settings.write().await;
        let merged = settings.merged(update)?;
        *settings = merged.clone();
        tracing::info!(
            multi_user_mode = merged.multi_user_mode,
            preferred_mode = merged.preferred_mode.as_str(),
            "settings updated"
        );
        Ok(merged)
    }

    pub async fn streams(&self) -> AppResult<Vec<StreamDefinition>> {
        let settings = self.settings().await;
        read_stream_definitions(
            self.store.as_ref(),
            &settings.config_page_title,
            &settings.stream_list_label,
        )
        .await
    }

    /// Classifies a page title. Without a stream configuration only daily
    /// pages are recognised.
    pub async fn classify(&self, title: Option<&str>) -> AppResult<PageContext> {
        let streams = match self.streams().await {
            Ok(streams) => streams,
            Err(AppError::MissingConfiguration(reason)) => {
                tracing::debug!(reason = %reason, "classifying without stream configuration");
                Vec::new()
            }
            Err(error) => return Err(error),
        };
        Ok(classify_page(title, &streams))
    }

    pub async fn journal_root(&self, stream_name: &str) -> AppResult<JournalRoot> {
        let label = self.settings.read().await.journal_container_label.clone();
        get_journal_root(self.store.as_ref(), stream_name, &label).await
    }

    pub async fn create_entry(&self, root: &JournalRoot, date: &DateKey, color: ColorClass) -> AppResult<NodeId> {
        let settings = self.settings().await;
        let options = EntryOptions::from_settings(&settings).with_leaf_text(self.leaf_text(&settings).await);
        create_entry(self.store.as_ref(), root, date, color, &options).await
    }

    /// Files an entry for the daily page `title` into the configured stream
    /// `stream_name`.
    pub async fn add_from_date_page(&self, title: &str, stream_name: &str) -> AppResult<EntryOutcome> {
        let Some(date) = parse_date_key(title) else {
            return Err(AppError::NotADatePage(title.to_string()));
        };
        let stream = self.configured_stream(stream_name).await?;
        let context = PageContext::Date(date.clone());
        self.add_entry(stream, date, &context).await
    }

    /// Files an entry for today into `stream`, as done from the stream's own
    /// page.
    pub async fn add_on_stream_page(&self, stream: StreamDefinition) -> AppResult<EntryOutcome> {
        let context = PageContext::Stream(stream.clone());
        self.add_entry(stream, DateKey::today(), &context).await
    }

    pub async fn add_for_context(&self, context: &PageContext, stream_name: Option<&str>) -> AppResult<EntryOutcome> {
        match context {
            PageContext::Date(date) => {
                let Some(stream_name) = stream_name else {
                    return Err(AppError::UnknownStream("no stream selected".to_string()));
                };
                let stream = self.configured_stream(stream_name).await?;
                self.add_entry(stream, date.clone(), context).await
            }
            PageContext::Stream(stream) => self.add_on_stream_page(stream.clone()).await,
            PageContext::Other => Err(AppError::NotADatePage(
                "current page is neither a daily page nor a stream".to_string(),
            )),
        }
    }

    async fn configured_stream(&self, stream_name: &str) -> AppResult<StreamDefinition> {
        let streams = self.streams().await?;
        find_stream(&streams, stream_name)
            .cloned()
            .ok_or_else(|| AppError::UnknownStream(stream_name.to_string()))
    }

    async fn add_entry(&self, stream: StreamDefinition, date: DateKey, context: &PageContext) -> AppResult<EntryOutcome> {
        let settings = self.settings().await;
        let root = get_journal_root(self.store.as_ref(), &stream.name, &settings.journal_container_label).await?;
        let entry_id = self.create_entry(&root, &date, stream.color).await?;

        let mode = navigation_mode(context, settings.preferred_mode);
        let _ = request_focus(
            self.ui.clone(),
            mode,
            root.page_id.clone(),
            entry_id.clone(),
            Duration::from_millis(settings.focus_delay_ms),
        );
        tracing::info!(
            stream = %stream.name,
            date = %date.full_date_text,
            entry_id = %entry_id,
            mode = mode.as_str(),
            "entry added"
        );

        Ok(EntryOutcome {
            stream,
            date,
            root,
            entry_id,
            mode,
        })
    }

    async fn leaf_text(&self, settings: &SubjournalSettings) -> String {
        if !settings.multi_user_mode {
            return String::new();
        }
        let name = match self.store.current_user_display_name().await {
            Ok(Some(name)) if !name.trim().is_empty() => name,
            Ok(_) => FALLBACK_DISPLAY_NAME.to_string(),
            Err(error) => {
                tracing::warn!(error = %error, "could not look up display name");
                FALLBACK_DISPLAY_NAME.to_string()
            }
        };
        format!("#[[{}]] ", name.trim())
    }
}
