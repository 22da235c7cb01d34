//! [`ListingFilter`] → parameterized SQL.
//!
//! Every user-supplied value travels as a bound parameter; identifiers come
//! only from the static schema. The page query and the count query share
//! one [`Condition`], so the reported total always describes the rows the
//! page was cut from.
//!
//! Free-text search is one substring match on the folded
//! [`SEARCH_COLUMN`](catalog_query::SEARCH_COLUMN) with a needle folded the
//! same way.

use catalog_query::{
    ListingFilter, ListingSchema, PUBLIC_VISIBILITY, SEARCH_COLUMN, SortDir, SortOrder, SpecView, VISIBILITY_COLUMN,
    Visibility, fold,
};
use sea_orm::sea_query::{
    Alias, Asterisk, Condition, Expr, LikeExpr, Order, Query, QueryBuilder, SelectStatement, Values,
};

/// Alias of the windowed total carried on every page row.
pub const TOTAL_ALIAS: &str = "__total";
/// Alias of the standalone count.
pub const COUNT_ALIAS: &str = "total";

const LIKE_ESCAPE: char = '\\';

/// Escape `LIKE` metacharacters so the needle matches literally.
#[must_use]
pub fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            out.push(LIKE_ESCAPE);
        }
        out.push(ch);
    }
    out
}

/// Compiled relational listing query.
#[derive(Debug, Clone)]
pub struct RelationalQuery {
    pub schema: &'static ListingSchema,
    pub condition: Condition,
    pub order: SortOrder,
    pub limit: u64,
    pub offset: u64,
}

impl RelationalQuery {
    #[must_use]
    pub fn compile(filter: &ListingFilter) -> Self {
        Self::from_view(&filter.view())
    }

    #[must_use]
    pub fn from_view(view: &SpecView<'_>) -> Self {
        let mut condition = Condition::all();

        if view.visibility == Visibility::Public {
            condition = condition.add(Expr::col(Alias::new(VISIBILITY_COLUMN)).eq(PUBLIC_VISIBILITY));
        }

        for facet in &view.facets {
            let values: Vec<String> = facet.values.iter().map(|v| (*v).to_owned()).collect();
            condition = condition.add(Expr::col(Alias::new(facet.column)).is_in(values));
        }

        if let Some(search) = view.search {
            let pattern = format!("%{}%", like_escape(&fold(search)));
            condition = condition
                .add(Expr::col(Alias::new(SEARCH_COLUMN)).like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)));
        }

        Self {
            schema: view.schema,
            condition,
            order: view.order.clone(),
            limit: view.limit,
            offset: view.offset(),
        }
    }

    #[must_use]
    pub fn table(&self) -> &'static str {
        self.schema.collection
    }

    /// Page query; every row also carries the full match count as
    /// [`TOTAL_ALIAS`].
    #[must_use]
    pub fn select(&self) -> SelectStatement {
        let mut stmt = Query::select();
        stmt.column(Asterisk)
            .expr_as(Expr::cust("COUNT(*) OVER ()"), Alias::new(TOTAL_ALIAS))
            .from(Alias::new(self.table()))
            .cond_where(self.condition.clone());
        for key in self.order.keys() {
            let dir = match key.dir {
                SortDir::Asc => Order::Asc,
                SortDir::Desc => Order::Desc,
            };
            stmt.order_by(Alias::new(key.column), dir);
        }
        stmt.limit(self.limit).offset(self.offset);
        stmt
    }

    /// Count under the identical predicate, used when the page is empty.
    #[must_use]
    pub fn count(&self) -> SelectStatement {
        Query::select()
            .expr_as(Expr::col(Asterisk).count(), Alias::new(COUNT_ALIAS))
            .from(Alias::new(self.table()))
            .cond_where(self.condition.clone())
            .to_owned()
    }

    pub fn render<B: QueryBuilder>(&self, builder: B) -> (String, Values) {
        self.select().build(builder)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use catalog_query::{ListingKind, QueryLimits, RawParams};
    use sea_orm::sea_query::{PostgresQueryBuilder, SqliteQueryBuilder};

    fn compile(kind: ListingKind, raw: &RawParams, visibility: Visibility) -> RelationalQuery {
        let limits = QueryLimits::for_schema(kind.schema());
        RelationalQuery::compile(&ListingFilter::build(kind, raw, visibility, &limits))
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(like_escape("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(like_escape("plain"), "plain");
    }

    #[test]
    fn public_listing_filters_on_visibility() {
        let q = compile(ListingKind::Courses, &RawParams::new(), Visibility::Public);
        let (sql, values) = q.render(SqliteQueryBuilder);
        assert!(sql.contains(r#""visibility" = ?"#), "{sql}");
        assert_eq!(values.0.len(), 3, "visibility, limit, offset: {values:?}");

        let q = compile(ListingKind::Courses, &RawParams::new(), Visibility::Any);
        let (sql, _) = q.render(SqliteQueryBuilder);
        assert!(!sql.contains("visibility"), "{sql}");
    }

    #[test]
    fn hostile_search_stays_a_parameter() {
        let needle = "'; DROP TABLE courses; --";
        let raw = RawParams::new().with("search", needle);
        let q = compile(ListingKind::Courses, &raw, Visibility::Public);
        let (sql, values) = q.render(PostgresQueryBuilder);
        assert!(!sql.to_lowercase().contains("drop table"), "{sql}");
        assert!(sql.contains(r#""search_text" LIKE $"#), "{sql}");
        assert!(!sql.contains("LOWER"), "{sql}");
        assert!(sql.contains("ESCAPE"), "{sql}");
        let rendered = format!("{values:?}");
        assert!(rendered.contains("drop table"), "needle must be bound: {rendered}");
    }

    #[test]
    fn needle_is_folded_once_and_bound() {
        let raw = RawParams::new().with("search", "ÉCOLE");
        let q = compile(ListingKind::Jobs, &raw, Visibility::Any);
        let (sql, values) = q.render(SqliteQueryBuilder);
        assert_eq!(sql.matches("LIKE").count(), 1, "{sql}");
        assert!(format!("{values:?}").contains("%école%"), "{values:?}");
    }

    #[test]
    fn huge_page_renders_a_bindable_offset() {
        let raw = RawParams::new().with("page", i64::MAX.to_string());
        let q = compile(ListingKind::Courses, &raw, Visibility::Public);
        assert!(i64::try_from(q.offset).is_ok(), "{}", q.offset);
        let (_, values) = q.render(SqliteQueryBuilder);
        assert_eq!(values.0.len(), 3, "{values:?}");
    }

    #[test]
    fn facets_compile_to_in_lists() {
        let raw = RawParams::new()
            .with("level", "Beginner")
            .with("level", "Advanced")
            .with("platform", "Coursera");
        let q = compile(ListingKind::Courses, &raw, Visibility::Any);
        let (sql, _) = q.render(SqliteQueryBuilder);
        assert!(sql.contains(r#""level" IN (?, ?)"#), "{sql}");
        assert!(sql.contains(r#""platform" IN (?)"#), "{sql}");
    }

    #[test]
    fn order_by_follows_sort_table_and_ends_with_id() {
        let raw = RawParams::new().with("sort", "salary");
        let q = compile(ListingKind::Jobs, &raw, Visibility::Public);
        let (sql, _) = q.render(SqliteQueryBuilder);
        assert!(
            sql.contains(r#"ORDER BY "salary_max" DESC, "salary_min" DESC, "id" DESC"#),
            "{sql}"
        );
        assert!(sql.contains("LIMIT ? OFFSET ?"), "{sql}");
    }

    #[test]
    fn count_shares_the_page_predicate() {
        let raw = RawParams::new().with("search", "data").with("country", "DE");
        let q = compile(ListingKind::Scholarships, &raw, Visibility::Public);
        let (page_sql, _) = q.select().build(SqliteQueryBuilder);
        let (count_sql, _) = q.count().build(SqliteQueryBuilder);
        let where_of = |sql: &str| {
            let start = sql.find("WHERE").unwrap();
            let end = sql.find("ORDER BY").unwrap_or(sql.len());
            sql[start..end].trim().to_owned()
        };
        assert_eq!(where_of(&page_sql), where_of(&count_sql));
        assert!(count_sql.contains(r#"COUNT(*) AS "total""#), "{count_sql}");
    }
}
