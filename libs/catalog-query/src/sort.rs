use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SortDir {
    #[serde(rename = "asc")]
    Asc,
    #[serde(rename = "desc")]
    Desc,
}

impl SortDir {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

/// Named orderings a listing request may ask for.
///
/// Each listing schema supports a subset; anything else falls back to the
/// schema's default entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Newest,
    Oldest,
    Popularity,
    Rating,
    PriceLow,
    PriceHigh,
    Salary,
    Deadline,
    Amount,
    Title,
}

impl SortKey {
    pub const ALL: &'static [SortKey] = &[
        SortKey::Newest,
        SortKey::Oldest,
        SortKey::Popularity,
        SortKey::Rating,
        SortKey::PriceLow,
        SortKey::PriceHigh,
        SortKey::Salary,
        SortKey::Deadline,
        SortKey::Amount,
        SortKey::Title,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::Popularity => "popularity",
            SortKey::Rating => "rating",
            SortKey::PriceLow => "price_low",
            SortKey::PriceHigh => "price_high",
            SortKey::Salary => "salary",
            SortKey::Deadline => "deadline",
            SortKey::Amount => "amount",
            SortKey::Title => "title",
        }
    }

    /// Lenient parse: surrounding whitespace, case and `-`/`_` are ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let wanted = raw.trim().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(&wanted))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderKey {
    pub column: &'static str,
    pub dir: SortDir,
}

impl OrderKey {
    #[must_use]
    pub const fn asc(column: &'static str) -> Self {
        Self {
            column,
            dir: SortDir::Asc,
        }
    }

    #[must_use]
    pub const fn desc(column: &'static str) -> Self {
        Self {
            column,
            dir: SortDir::Desc,
        }
    }
}

/// One row of a schema's fixed sort table.
#[derive(Clone, Copy, Debug)]
pub struct SortRule {
    pub key: SortKey,
    pub order: &'static [OrderKey],
}

/// Fully resolved ordering, always ending in the tiebreaker.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct SortOrder(pub Vec<OrderKey>);

impl SortOrder {
    pub fn from_rule(rule: &SortRule) -> Self {
        Self(rule.order.to_vec())
    }

    /// Append tiebreaker if missing
    pub fn ensure_tiebreaker(mut self, column: &'static str, dir: SortDir) -> Self {
        if !self.0.iter().any(|k| k.column == column) {
            self.0.push(OrderKey { column, dir });
        }
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &OrderKey> {
        self.0.iter()
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(none)");
        }
        let formatted: Vec<String> = self
            .0
            .iter()
            .map(|k| format!("{} {}", k.column, k.dir.as_str()))
            .collect();
        write!(f, "{}", formatted.join(", "))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn parse_is_lenient_about_case_and_separators() {
        assert_eq!(SortKey::parse("Newest"), Some(SortKey::Newest));
        assert_eq!(SortKey::parse(" price-low "), Some(SortKey::PriceLow));
        assert_eq!(SortKey::parse("PRICE_HIGH"), Some(SortKey::PriceHigh));
        assert_eq!(SortKey::parse("newest; DROP TABLE courses"), None);
        assert_eq!(SortKey::parse(""), None);
    }

    #[test]
    fn tiebreaker_is_appended_once() {
        let order = SortOrder(vec![OrderKey::desc("rating")])
            .ensure_tiebreaker("id", SortDir::Desc)
            .ensure_tiebreaker("id", SortDir::Desc);
        assert_eq!(order.0.len(), 2);
        assert_eq!(order.to_string(), "rating desc, id desc");
    }

    #[test]
    fn tiebreaker_already_present_is_kept() {
        let order = SortOrder(vec![OrderKey::asc("id")]).ensure_tiebreaker("id", SortDir::Desc);
        assert_eq!(order.0, vec![OrderKey::asc("id")]);
    }
}
