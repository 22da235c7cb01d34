//! Paging and search caps applied while building a specification.

use crate::schema::ListingSchema;

pub const DEFAULT_MAX_SEARCH_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    /// Used when `limit` is absent or unusable.
    pub default_limit: u64,
    /// Requested limits above this are clamped.
    pub max_limit: u64,
    /// Search text is truncated to this many characters.
    pub max_search_len: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            default_limit: 12,
            max_limit: 100,
            max_search_len: DEFAULT_MAX_SEARCH_LEN,
        }
    }
}

impl QueryLimits {
    #[must_use]
    pub fn for_schema(schema: &ListingSchema) -> Self {
        Self {
            default_limit: schema.default_limit,
            max_limit: schema.max_limit,
            max_search_len: DEFAULT_MAX_SEARCH_LEN,
        }
    }

    #[must_use]
    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit;
        self
    }

    #[must_use]
    pub fn with_max_limit(mut self, limit: u64) -> Self {
        self.max_limit = limit;
        self
    }

    #[must_use]
    pub fn with_max_search_len(mut self, len: usize) -> Self {
        self.max_search_len = len;
        self
    }

    /// Upper bound, never below 1.
    #[must_use]
    pub fn effective_max(&self) -> u64 {
        self.max_limit.max(1)
    }

    /// Default limit kept inside `1..=effective_max()`.
    #[must_use]
    pub fn effective_default(&self) -> u64 {
        self.default_limit.clamp(1, self.effective_max())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::kind::ListingKind;

    #[test]
    fn schema_limits_are_picked_up() {
        let limits = QueryLimits::for_schema(ListingKind::Jobs.schema());
        assert_eq!(limits.default_limit, 10);
        assert_eq!(limits.max_limit, 100);
        assert_eq!(limits.max_search_len, DEFAULT_MAX_SEARCH_LEN);
    }

    #[test]
    fn effective_bounds_never_reach_zero() {
        let limits = QueryLimits::default().with_default_limit(0).with_max_limit(0);
        assert_eq!(limits.effective_max(), 1);
        assert_eq!(limits.effective_default(), 1);

        let limits = QueryLimits::default().with_default_limit(500).with_max_limit(50);
        assert_eq!(limits.effective_default(), 50);
    }
}
