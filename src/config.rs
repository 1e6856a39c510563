use serde::Deserialize;

/// Page size used when a request does not name one.
pub const DEFAULT_PAGE_SIZE: u64 = 10_000;

/// Search limits of an [`EntityStore`](crate::EntityStore).
///
/// Deserializable so a host application can keep it next to its own settings:
///
/// ```rust,ignore
/// let config: SearchConfig = serde_json::from_str(r#"{"maxPageSize": 500}"#)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
    pub default_page_size: u64,
    /// Upper bound for `pageSize`; larger requests are clamped. The page number
    /// then counts pages of the clamped size, so consecutive pages never skip rows.
    pub max_page_size: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: None,
        }
    }
}

impl SearchConfig {
    /// Page size actually used for a requested size, `None` meaning the default.
    #[must_use]
    pub fn effective_page_size(&self, requested: Option<u64>) -> u64 {
        let requested = requested.unwrap_or(self.default_page_size);
        match self.max_page_size {
            Some(max) => requested.min(max),
            None => requested,
        }
    }
}
