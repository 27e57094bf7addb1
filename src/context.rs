use crate::config::find_stream;
use crate::date_key::parse_date_key;
use crate::models::{NavigationMode, PageContext, StreamDefinition};

/// Classifies the page the user is looking at. Daily pages win over a stream
/// that happens to share the title.
pub fn classify_page(title: Option<&str>, streams: &[StreamDefinition]) -> PageContext {
    let Some(title) = title.map(str::trim).filter(|title| !title.is_empty()) else {
        return PageContext::Other;
    };

    if let Some(date) = parse_date_key(title) {
        return PageContext::Date(date);
    }
    match find_stream(streams, title) {
        Some(stream) => PageContext::Stream(stream.clone()),
        None => PageContext::Other,
    }
}

/// Where a new entry should be shown: date pages open the stream in the
/// sidebar, stream pages zoom into the entry, unless the user prefers one.
pub fn navigation_mode(context: &PageContext, preferred: NavigationMode) -> NavigationMode {
    match (preferred, context) {
        (NavigationMode::Sidebar | NavigationMode::Focus, _) => preferred,
        (NavigationMode::Ask, PageContext::Stream(_)) => NavigationMode::Focus,
        (NavigationMode::Ask, _) => NavigationMode::Sidebar,
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_page, navigation_mode};
    use crate::models::{ColorClass, NavigationMode, PageContext, StreamDefinition};

    fn streams() -> Vec<StreamDefinition> {
        vec![
            StreamDefinition {
                name: "Therapy Journal".to_string(),
                color: ColorClass::Blue,
            },
            StreamDefinition {
                name: "March 3rd, 2024".to_string(),
                color: ColorClass::Red,
            },
        ]
    }

    #[test]
    fn recognises_date_pages() {
        match classify_page(Some("March 3rd, 2024"), &streams()) {
            PageContext::Date(date) => assert_eq!(date.day_name, "Sunday"),
            other => panic!("unexpected context: {other:?}"),
        }
    }

    #[test]
    fn recognises_stream_pages_by_exact_name() {
        match classify_page(Some("Therapy Journal"), &streams()) {
            PageContext::Stream(stream) => assert_eq!(stream.color, ColorClass::Blue),
            other => panic!("unexpected context: {other:?}"),
        }
        assert_eq!(classify_page(Some("therapy journal"), &streams()), PageContext::Other);
    }

    #[test]
    fn everything_else_is_other() {
        assert_eq!(classify_page(None, &streams()), PageContext::Other);
        assert_eq!(classify_page(Some("   "), &streams()), PageContext::Other);
        assert_eq!(classify_page(Some("Reading List"), &[]), PageContext::Other);
    }

    #[test]
    fn ask_mode_follows_the_page() {
        let stream = classify_page(Some("Therapy Journal"), &streams());
        let date = classify_page(Some("March 3rd, 2024"), &streams());
        assert_eq!(navigation_mode(&stream, NavigationMode::Ask), NavigationMode::Focus);
        assert_eq!(navigation_mode(&date, NavigationMode::Ask), NavigationMode::Sidebar);
        assert_eq!(navigation_mode(&date, NavigationMode::Focus), NavigationMode::Focus);
    }
}
