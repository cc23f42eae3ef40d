use serde::Deserialize;

/// One observable page section (breadcrumbs, stack trace, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct Section {
    pub name: String,
    pub visible: bool,
}

/// Snapshot of the watched page, as written by the browser side. Unknown
/// fields are ignored and missing fields default, so snapshot producers
/// can evolve independently.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct PageSnapshot {
    pub url: String,
    pub issue_count: u64,
    pub resolve_clicks: u64,
    pub sections: Vec<Section>,
}

/// A meaningful change between two consecutive snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSignal {
    ErrorsIncreased { from: u64, to: u64 },
    ResolveClicked,
    EnteredIssueDetail,
    LeftIssueDetail,
    SectionShown(String),
}

/// Parse a snapshot file's contents. `None` for anything unreadable; the
/// caller keeps its previous snapshot and tries again next poll.
pub fn parse_snapshot(content: &str) -> Option<PageSnapshot> {
    serde_json::from_str(content).ok()
}

/// An issue detail view is any path with a numeric id directly under
/// `/issues/`.
pub fn is_issue_detail_url(url: &str) -> bool {
    let path = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(url);
    let Some(idx) = path.find("/issues/") else {
        return false;
    };
    let after = &path[idx + "/issues/".len()..];
    let id = after
        .split(|c| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or("");
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

/// Signals implied by moving from `prev` to `next`. Decreases and
/// unchanged values are silent; only newly visible sections fire.
pub fn diff(prev: &PageSnapshot, next: &PageSnapshot) -> Vec<PageSignal> {
    let mut signals = Vec::new();

    if next.issue_count > prev.issue_count {
        signals.push(PageSignal::ErrorsIncreased {
            from: prev.issue_count,
            to: next.issue_count,
        });
    }

    if next.resolve_clicks > prev.resolve_clicks {
        signals.push(PageSignal::ResolveClicked);
    }

    let was_detail = is_issue_detail_url(&prev.url);
    let is_detail = is_issue_detail_url(&next.url);
    if !was_detail && is_detail {
        signals.push(PageSignal::EnteredIssueDetail);
    } else if was_detail && !is_detail {
        signals.push(PageSignal::LeftIssueDetail);
    }

    for section in &next.sections {
        if !section.visible {
            continue;
        }
        let previously_visible = prev
            .sections
            .iter()
            .any(|s| s.name == section.name && s.visible);
        if !previously_visible {
            signals.push(PageSignal::SectionShown(section.name.clone()));
        }
    }

    signals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(url: &str, issues: u64, clicks: u64) -> PageSnapshot {
        PageSnapshot {
            url: url.to_string(),
            issue_count: issues,
            resolve_clicks: clicks,
            sections: Vec::new(),
        }
    }

    #[test]
    fn parses_full_snapshot() {
        let snap = parse_snapshot(
            r#"{
                "url": "https://example.io/org/issues/123/",
                "issue_count": 7,
                "resolve_clicks": 2,
                "sections": [{"name": "breadcrumbs", "visible": true}]
            }"#,
        )
        .unwrap();
        assert_eq!(snap.issue_count, 7);
        assert_eq!(snap.sections.len(), 1);
        assert!(snap.sections[0].visible);
    }

    #[test]
    fn parses_partial_snapshot_with_defaults() {
        let snap = parse_snapshot(r#"{"url": "https://example.io/"}"#).unwrap();
        assert_eq!(snap.issue_count, 0);
        assert!(snap.sections.is_empty());
    }

    #[test]
    fn garbage_is_none() {
        assert!(parse_snapshot("{oops").is_none());
        assert!(parse_snapshot("").is_none());
    }

    #[test]
    fn issue_detail_url_matching() {
        assert!(is_issue_detail_url("https://example.io/org/issues/12345/"));
        assert!(is_issue_detail_url("https://example.io/issues/9?query=x"));
        assert!(!is_issue_detail_url("https://example.io/org/issues/"));
        assert!(!is_issue_detail_url("https://example.io/org/issues/new"));
        assert!(!is_issue_detail_url("https://example.io/dashboard"));
    }

    #[test]
    fn errors_increase_fires_with_counts() {
        let signals = diff(&snap("u", 2, 0), &snap("u", 5, 0));
        assert_eq!(signals, vec![PageSignal::ErrorsIncreased { from: 2, to: 5 }]);
    }

    #[test]
    fn errors_decrease_is_silent() {
        assert!(diff(&snap("u", 5, 0), &snap("u", 2, 0)).is_empty());
        assert!(diff(&snap("u", 5, 0), &snap("u", 5, 0)).is_empty());
    }

    #[test]
    fn resolve_click_fires_once_per_diff() {
        let signals = diff(&snap("u", 0, 1), &snap("u", 0, 3));
        assert_eq!(signals, vec![PageSignal::ResolveClicked]);
    }

    #[test]
    fn issue_detail_enter_and_leave() {
        let list = snap("https://example.io/org/issues/", 0, 0);
        let detail = snap("https://example.io/org/issues/42/", 0, 0);
        assert_eq!(diff(&list, &detail), vec![PageSignal::EnteredIssueDetail]);
        assert_eq!(diff(&detail, &list), vec![PageSignal::LeftIssueDetail]);
        assert!(diff(&detail, &detail).is_empty());
    }

    #[test]
    fn newly_visible_section_fires() {
        let mut prev = snap("u", 0, 0);
        prev.sections = vec![Section {
            name: "tags".into(),
            visible: false,
        }];
        let mut next = prev.clone();
        next.sections[0].visible = true;
        assert_eq!(
            diff(&prev, &next),
            vec![PageSignal::SectionShown("tags".into())]
        );
        // Staying visible is silent.
        assert!(diff(&next, &next).is_empty());
    }

    #[test]
    fn combined_changes_all_fire() {
        let prev = snap("https://example.io/org/issues/", 1, 0);
        let mut next = snap("https://example.io/org/issues/7/", 3, 1);
        next.sections = vec![Section {
            name: "stacktrace".into(),
            visible: true,
        }];
        let signals = diff(&prev, &next);
        assert!(signals.contains(&PageSignal::ErrorsIncreased { from: 1, to: 3 }));
        assert!(signals.contains(&PageSignal::ResolveClicked));
        assert!(signals.contains(&PageSignal::EnteredIssueDetail));
        assert!(signals.contains(&PageSignal::SectionShown("stacktrace".into())));
    }
}
