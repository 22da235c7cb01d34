//! Execution of compiled listing queries and single-row writes.

use catalog_query::{FieldDef, FieldKind, ListingSchema, RawPage, SEARCH_COLUMN, TIEBREAKER, search_text, touches_search};
use sea_orm::sea_query::{Alias, Asterisk, Expr, Query, SimpleExpr, Value as SqlValue};
use sea_orm::{ConnectionTrait, DbErr, QueryResult};
use serde_json::{Map, Value};

use super::query::{COUNT_ALIAS, RelationalQuery, TOTAL_ALIAS};
use crate::error::StoreError;

fn optional<T>(row: &QueryResult, column: &str) -> Result<Option<T>, DbErr>
where
    T: sea_orm::TryGetable,
{
    row.try_get::<Option<T>>("", column)
}

fn read_field(row: &QueryResult, field: &FieldDef) -> Result<Value, DbErr> {
    let column = field.column;
    let value = match field.kind {
        FieldKind::String | FieldKind::DateTimeUtc | FieldKind::Composite(_) => {
            optional::<String>(row, column)?.map_or(Value::Null, Value::String)
        }
        FieldKind::I64 => optional::<i64>(row, column)?.map_or(Value::Null, Value::from),
        FieldKind::F64 => optional::<f64>(row, column)?.map_or(Value::Null, Value::from),
        FieldKind::Bool => optional::<bool>(row, column)?.map_or(Value::Null, Value::Bool),
    };
    Ok(value)
}

/// Storage row keyed by column name, typed by the schema.
fn read_row(row: &QueryResult, schema: &ListingSchema) -> Result<Map<String, Value>, DbErr> {
    let mut out = Map::new();
    for field in schema.fields {
        out.insert(field.column.to_owned(), read_field(row, field)?);
    }
    Ok(out)
}

fn sql_value(value: &Value, kind: FieldKind) -> SqlValue {
    match kind {
        FieldKind::String | FieldKind::DateTimeUtc => match value {
            Value::Null => SqlValue::String(None),
            Value::String(s) => s.clone().into(),
            other => other.to_string().into(),
        },
        FieldKind::Composite(_) => match value {
            Value::Null => SqlValue::String(None),
            Value::String(s) => s.clone().into(),
            native => native.to_string().into(),
        },
        FieldKind::I64 => value.as_i64().into(),
        FieldKind::F64 => value.as_f64().into(),
        FieldKind::Bool => value.as_bool().into(),
    }
}

fn assignments(schema: &ListingSchema, row: &Map<String, Value>) -> Vec<(Alias, SimpleExpr)> {
    schema
        .fields
        .iter()
        .filter_map(|field| {
            row.get(field.column)
                .map(|v| (Alias::new(field.column), SimpleExpr::Value(sql_value(v, field.kind))))
        })
        .collect()
}

fn search_assignment(schema: &ListingSchema, row: &Map<String, Value>) -> (Alias, SimpleExpr) {
    (
        Alias::new(SEARCH_COLUMN),
        SimpleExpr::Value(SqlValue::from(search_text(schema, row))),
    )
}

/// Run the page query, falling back to the count query when the page
/// comes back empty.
///
/// # Errors
/// Backend failures, classified against the query's schema.
pub async fn fetch_page<C: ConnectionTrait>(conn: &C, query: &RelationalQuery) -> Result<RawPage, StoreError> {
    let backend = conn.get_database_backend();
    let schema = query.schema;
    let classify = |e: DbErr| StoreError::from_db(e, schema);

    let select = backend.build(&query.select());
    tracing::debug!(table = schema.collection, sql = %select.sql, "compiled listing query");
    let rows = conn.query_all(select).await.map_err(classify)?;

    let total = match rows.first() {
        Some(first) => first.try_get::<i64>("", TOTAL_ALIAS).map_err(classify)?,
        None => {
            let counted = conn.query_one(backend.build(&query.count())).await.map_err(classify)?;
            match counted {
                Some(row) => row.try_get::<i64>("", COUNT_ALIAS).map_err(classify)?,
                None => 0,
            }
        }
    };

    let rows = rows
        .iter()
        .map(|row| read_row(row, schema))
        .collect::<Result<Vec<_>, _>>()
        .map_err(classify)?;

    tracing::debug!(
        table = schema.collection,
        rows = rows.len(),
        total,
        "relational listing page fetched"
    );
    Ok(RawPage {
        rows,
        total: u64::try_from(total).unwrap_or(0),
    })
}

/// # Errors
/// Backend failures.
pub async fn find_row<C: ConnectionTrait>(
    conn: &C,
    schema: &'static ListingSchema,
    id: &str,
) -> Result<Option<Map<String, Value>>, StoreError> {
    let stmt = Query::select()
        .column(Asterisk)
        .from(Alias::new(schema.collection))
        .and_where(Expr::col(Alias::new(TIEBREAKER)).eq(id))
        .limit(1)
        .to_owned();
    let backend = conn.get_database_backend();
    let row = conn
        .query_one(backend.build(&stmt))
        .await
        .map_err(|e| StoreError::from_db(e, schema))?;
    row.map(|r| read_row(&r, schema))
        .transpose()
        .map_err(|e| StoreError::from_db(e, schema))
}

/// Insert one storage row. Only declared columns present in `row` are
/// written, plus the derived search column.
///
/// # Errors
/// `StoreError::UniqueViolation` on a unique-index clash,
/// `StoreError::ValueTooLarge` when the engine rejects a value's length.
pub async fn insert_row<C: ConnectionTrait>(
    conn: &C,
    schema: &'static ListingSchema,
    row: &Map<String, Value>,
) -> Result<(), StoreError> {
    let mut assigned = assignments(schema, row);
    assigned.push(search_assignment(schema, row));
    let (columns, values): (Vec<Alias>, Vec<SimpleExpr>) = assigned.into_iter().unzip();
    let mut stmt = Query::insert();
    stmt.into_table(Alias::new(schema.collection)).columns(columns);
    stmt.values(values).map_err(|e| StoreError::Query(e.to_string()))?;

    let backend = conn.get_database_backend();
    conn.execute(backend.build(&stmt))
        .await
        .map_err(|e| StoreError::from_db(e, schema))?;
    Ok(())
}

/// Update the given columns of the row with `id`. Returns the number of
/// rows matched. The search column is recomputed from the merged row when
/// any search column changes.
///
/// # Errors
/// Same classification as [`insert_row`].
pub async fn update_row<C: ConnectionTrait>(
    conn: &C,
    schema: &'static ListingSchema,
    id: &str,
    row: &Map<String, Value>,
) -> Result<u64, StoreError> {
    let mut values = assignments(schema, row);
    if values.is_empty() {
        return Ok(u64::from(find_row(conn, schema, id).await?.is_some()));
    }
    if touches_search(schema, row) {
        let Some(mut merged) = find_row(conn, schema, id).await? else {
            return Ok(0);
        };
        merged.extend(row.iter().map(|(k, v)| (k.clone(), v.clone())));
        values.push(search_assignment(schema, &merged));
    }
    let stmt = Query::update()
        .table(Alias::new(schema.collection))
        .values(values)
        .and_where(Expr::col(Alias::new(TIEBREAKER)).eq(id))
        .to_owned();
    let backend = conn.get_database_backend();
    let res = conn
        .execute(backend.build(&stmt))
        .await
        .map_err(|e| StoreError::from_db(e, schema))?;
    Ok(res.rows_affected())
}

/// Recompute the search column of every row in the schema's table.
pub(crate) async fn backfill_search_text<C: ConnectionTrait>(
    conn: &C,
    schema: &'static ListingSchema,
) -> Result<u64, DbErr> {
    let backend = conn.get_database_backend();
    let stmt = Query::select()
        .column(Asterisk)
        .from(Alias::new(schema.collection))
        .to_owned();
    let rows = conn.query_all(backend.build(&stmt)).await?;
    let mut updated = 0;
    for row in &rows {
        let row = read_row(row, schema)?;
        let Some(Value::String(id)) = row.get(TIEBREAKER) else {
            continue;
        };
        let stmt = Query::update()
            .table(Alias::new(schema.collection))
            .values([search_assignment(schema, &row)])
            .and_where(Expr::col(Alias::new(TIEBREAKER)).eq(id.as_str()))
            .to_owned();
        updated += conn.execute(backend.build(&stmt)).await?.rows_affected();
    }
    tracing::info!(table = schema.collection, updated, "search column backfilled");
    Ok(updated)
}
