//! Path → suite resolution.

use suitegate_core::{SuiteCatalog, SuiteId};

/// Path portion of a location, without query string or fragment.
fn path_only(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or_default()
}

/// Suite named by the first path segment, if it is a catalog member.
pub fn suite_from_path(path: &str, catalog: &SuiteCatalog) -> Option<SuiteId> {
    let segment = path_only(path)
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default();

    if segment.is_empty() {
        return None;
    }
    catalog.resolve(segment)
}

/// The landing page is suite-agnostic; an empty path counts as landing too.
pub fn is_landing_path(path: &str, landing: &str) -> bool {
    let path = path_only(path);
    path.is_empty() || path == landing
}

/// Whether `path` lives under `prefix`, segment-wise (`/ops` covers `/ops`
/// and `/ops/tasks` but not `/opsx`).
pub fn path_within(path: &str, prefix: &str) -> bool {
    match path_only(path).strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> SuiteCatalog {
        SuiteCatalog::standard()
    }

    #[test]
    fn first_segment_names_the_suite() {
        assert_eq!(suite_from_path("/revenue/deals", &catalog()), Some(SuiteId::from("revenue")));
        assert_eq!(suite_from_path("/people", &catalog()), Some(SuiteId::from("people")));
        assert_eq!(suite_from_path("ops/tasks", &catalog()), Some(SuiteId::from("ops")));
        assert_eq!(suite_from_path("/ops?tab=2", &catalog()), Some(SuiteId::from("ops")));
    }

    #[test]
    fn unknown_or_missing_segments_resolve_to_none() {
        assert_eq!(suite_from_path("/", &catalog()), None);
        assert_eq!(suite_from_path("", &catalog()), None);
        assert_eq!(suite_from_path("/finance/ledger", &catalog()), None);
        assert_eq!(suite_from_path("/deals/revenue", &catalog()), None);
        assert_eq!(suite_from_path("/Ops", &catalog()), None);
    }

    #[test]
    fn landing_detection_ignores_query() {
        assert!(is_landing_path("/", "/"));
        assert!(is_landing_path("", "/"));
        assert!(is_landing_path("/?welcome=1", "/"));
        assert!(!is_landing_path("/ops", "/"));
    }

    #[test]
    fn prefix_match_is_segment_aware() {
        assert!(path_within("/ops", "/ops"));
        assert!(path_within("/ops/tasks/7", "/ops"));
        assert!(path_within("/ops?x=1", "/ops"));
        assert!(!path_within("/opsx", "/ops"));
        assert!(!path_within("/revenue/deals", "/ops"));
    }
}
