use crate::errors::AppResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identifier of a page or block.
pub type NodeId = String;

/// A child block as returned by a store query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineNode {
    pub id: NodeId,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorClass {
    Red,
    Orange,
    Yellow,
    Green,
    #[default]
    Blue,
    Purple,
    Brown,
    Grey,
    White,
    Black,
}

impl ColorClass {
    pub const ALL: [ColorClass; 10] = [
        Self::Red,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Blue,
        Self::Purple,
        Self::Brown,
        Self::Grey,
        Self::White,
        Self::Black,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Brown => "brown",
            Self::Grey => "grey",
            Self::White => "white",
            Self::Black => "black",
        }
    }

    /// Styling tag attached to scaffold nodes, without the leading `#`.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Red => "clr-lgt-red-act",
            Self::Orange => "clr-lgt-orn-act",
            Self::Yellow => "clr-lgt-ylo-act",
            Self::Green => "clr-lgt-grn-act",
            Self::Blue => "clr-lgt-blu-act",
            Self::Purple => "clr-lgt-ppl-act",
            Self::Brown => "clr-lgt-brn-act",
            Self::Grey => "clr-lgt-gry-act",
            Self::White => "clr-wht-act",
            Self::Black => "clr-blk-act",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|color| color.as_str() == needle)
    }

    /// Parses a user-supplied color name, falling back to blue.
    pub fn parse_or_default(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_default()
    }
}

impl fmt::Display for ColorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A step of the entry cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Year,
    Month,
    Day,
    Entry,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Entry => "entry",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured form of a daily page title such as `January 15th, 2025`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateKey {
    pub year: i32,
    pub month_name: String,
    pub day: u32,
    pub day_name: String,
    pub full_date_text: String,
    pub full_month_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamDefinition {
    pub name: String,
    pub color: ColorClass,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalRoot {
    pub page_id: NodeId,
    pub container_id: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PageContext {
    Date(DateKey),
    Stream(StreamDefinition),
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavigationMode {
    Sidebar,
    Focus,
    #[default]
    Ask,
}

impl NavigationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sidebar => "sidebar",
            Self::Focus => "focus",
            Self::Ask => "ask",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubjournalSettings {
    pub config_page_title: String,
    pub stream_list_label: String,
    pub journal_container_label: String,
    pub timeout_ms: u64,
    pub retry_delay_ms: u64,
    pub multi_user_mode: bool,
    pub preferred_mode: NavigationMode,
    pub focus_delay_ms: u64,
}

impl Default for SubjournalSettings {
    fn default() -> Self {
        Self {
            config_page_title: "roam/subjournals".to_string(),
            stream_list_label: "My Subjournals:".to_string(),
            journal_container_label: "Journal Entries:".to_string(),
            timeout_ms: 3_000,
            retry_delay_ms: 20,
            multi_user_mode: false,
            preferred_mode: NavigationMode::Ask,
            focus_delay_ms: 800,
        }
    }
}

impl SubjournalSettings {
    /// Overlays a partial settings object on top of the defaults.
    pub fn from_json(update: serde_json::Value) -> AppResult<Self> {
        Self::default().merged(update)
    }

    pub fn merged(&self, update: serde_json::Value) -> AppResult<Self> {
        let mut merged = serde_json::to_value(self)?;
        merge_json(&mut merged, update);
        Ok(serde_json::from_value(merged)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryOutcome {
    pub stream: StreamDefinition,
    pub date: DateKey,
    pub root: JournalRoot,
    pub entry_id: NodeId,
    pub mode: NavigationMode,
}

fn merge_json(target: &mut serde_json::Value, update: serde_json::Value) {
    match (target, update) {
        (serde_json::Value::Object(target_map), serde_json::Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_json(target_map.entry(key).or_insert(serde_json::Value::Null), value);
            }
        }
        (target, update) => {
            *target = update;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorClass, Level, NavigationMode, SubjournalSettings};

    #[test]
    fn color_names_are_case_insensitive() {
        assert_eq!(ColorClass::parse(" Purple "), Some(ColorClass::Purple));
        assert_eq!(ColorClass::parse("GREY"), Some(ColorClass::Grey));
        assert_eq!(ColorClass::parse("teal"), None);
        assert_eq!(ColorClass::parse_or_default("teal"), ColorClass::Blue);
    }

    #[test]
    fn every_color_has_a_distinct_tag() {
        let mut tags = ColorClass::ALL.iter().map(|color| color.tag()).collect::<Vec<_>>();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), ColorClass::ALL.len());
        assert_eq!(ColorClass::Blue.tag(), "clr-lgt-blu-act");
        assert_eq!(ColorClass::Black.tag(), "clr-blk-act");
    }

    #[test]
    fn partial_settings_keep_defaults() {
        let settings = SubjournalSettings::from_json(serde_json::json!({
            "timeoutMs": 500,
            "multiUserMode": true,
            "preferredMode": "focus"
        }))
        .expect("settings");
        assert_eq!(settings.timeout_ms, 500);
        assert!(settings.multi_user_mode);
        assert_eq!(settings.preferred_mode, NavigationMode::Focus);
        assert_eq!(settings.config_page_title, "roam/subjournals");
        assert_eq!(settings.retry_delay_ms, 20);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let result = SubjournalSettings::from_json(serde_json::json!({ "preferredMode": "popup" }));
        assert!(result.is_err());
    }

    #[test]
    fn levels_render_lowercase() {
        assert_eq!(Level::Year.to_string(), "year");
        assert_eq!(Level::Entry.as_str(), "entry");
    }
}
