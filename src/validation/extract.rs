use rustc_hash::FxHashSet;

/// Split a reference field into candidate URL tokens.
///
/// Any run of whitespace (spaces, tabs, newlines) separates tokens. Order is
/// kept and duplicates are not removed.
pub fn extract_urls(field: &str) -> Vec<&str> {
    field.split_whitespace().collect()
}

/// References that must never be flagged, whatever a check would say.
#[derive(Debug, Clone, Default)]
pub struct IgnoreList {
    urls: FxHashSet<String>,
}

impl IgnoreList {
    pub fn new<S: Into<String>>(urls: impl IntoIterator<Item = S>) -> Self {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact membership; no normalisation is applied.
    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_urls_single() {
        assert_eq!(extract_urls("http://a.test"), vec!["http://a.test"]);
    }

    #[test]
    fn test_extract_urls_mixed_separators() {
        let field = "http://a.test http://b.test\nhttp://c.test\r\n\thttp://d.test  ";
        assert_eq!(
            extract_urls(field),
            vec![
                "http://a.test",
                "http://b.test",
                "http://c.test",
                "http://d.test"
            ]
        );
    }

    #[test]
    fn test_extract_urls_empty_and_blank() {
        assert!(extract_urls("").is_empty());
        assert!(extract_urls(" \n\t ").is_empty());
    }

    #[test]
    fn test_extract_urls_keeps_duplicates() {
        assert_eq!(
            extract_urls("http://a.test http://a.test"),
            vec!["http://a.test", "http://a.test"]
        );
    }

    #[test]
    fn test_ignore_list_exact_match() {
        let list = IgnoreList::new(["http://www.climatechange.gov.au"]);

        assert!(list.contains("http://www.climatechange.gov.au"));
        assert!(!list.contains("http://www.climatechange.gov.au/"));
        assert!(!list.contains("https://www.climatechange.gov.au"));
    }

    #[test]
    fn test_ignore_list_default_matches_nothing() {
        let list = IgnoreList::default();
        assert!(!list.contains(""));
        assert!(!list.contains("http://www.climatechange.gov.au"));
    }
}
