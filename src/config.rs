use crate::errors::{AppError, AppResult};
use crate::models::{ColorClass, StreamDefinition};
use crate::store::{ChildFilter, HostStore};
use once_cell::sync::Lazy;

static COLOR_LINE_RE: Lazy<regex::Regex> =
    Lazy::new(|| regex::Regex::new(r"(?i)color\s*:\s*(\w+)").expect("valid color line regex"));

static COLOR_PREFIX_RE: Lazy<regex::Regex> =
    Lazy::new(|| regex::Regex::new(r"(?i)^color\s*:").expect("valid color prefix regex"));

pub const DEFAULT_CONFIG_PAGE: &str = "roam/subjournals";
pub const DEFAULT_STREAM_LIST_LABEL: &str = "My Subjournals:";

/// Reads the configured streams: every child of the stream-list block on the
/// configuration page names a stream, and an optional `Color: <name>` child
/// picks its color (blue when absent or unknown).
pub async fn read_stream_definitions(
    store: &dyn HostStore,
    config_page_title: &str,
    stream_list_label: &str,
) -> AppResult<Vec<StreamDefinition>> {
    let Some(page_id) = store.find_page_by_title(config_page_title).await? else {
        return Err(AppError::MissingConfiguration(format!(
            "configuration page [[{}]] does not exist",
            config_page_title
        )));
    };

    let label = stream_list_label.trim();
    let list = store
        .query_children(&page_id, &ChildFilter::Contains(label.to_string()))
        .await?
        .into_iter()
        .find(|node| node.text.trim() == label);
    let Some(list) = list else {
        return Err(AppError::MissingConfiguration(format!(
            "no \"{}\" block on [[{}]]",
            label, config_page_title
        )));
    };

    let mut streams = Vec::new();
    for entry in store.query_children(&list.id, &ChildFilter::All).await? {
        let name = entry.text.trim();
        if name.is_empty() || COLOR_PREFIX_RE.is_match(name) {
            continue;
        }

        let children = store.query_children(&entry.id, &ChildFilter::All).await?;
        let color = children
            .iter()
            .find_map(|child| COLOR_LINE_RE.captures(&child.text))
            .and_then(|captures| captures.get(1))
            .map(|raw| {
                ColorClass::parse(raw.as_str()).unwrap_or_else(|| {
                    tracing::warn!(stream = %name, color = %raw.as_str(), "unknown stream color, using blue");
                    ColorClass::Blue
                })
            })
            .unwrap_or_default();

        streams.push(StreamDefinition {
            name: name.to_string(),
            color,
        });
    }

    tracing::debug!(count = streams.len(), "read stream definitions");
    Ok(streams)
}

pub fn find_stream<'a>(streams: &'a [StreamDefinition], name: &str) -> Option<&'a StreamDefinition> {
    streams.iter().find(|stream| stream.name == name)
}
