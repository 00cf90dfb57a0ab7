use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};

pub mod admin_service;
pub mod cart_service;
pub mod collection_service;
pub mod customer_service;
pub mod order_service;
pub mod product_service;
pub mod promotion_service;
pub mod tag_service;

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Case-insensitive `column LIKE '%term%'`.
pub(crate) fn contains<C: ColumnTrait>(column: C, term: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
    Expr::expr(Func::lower(Expr::col(column.as_column_ref())))
        .like(LikeExpr::new(pattern).escape('\\'))
}

/// Case-insensitive `column LIKE 'term%'`.
pub(crate) fn starts_with<C: ColumnTrait>(column: C, term: &str) -> SimpleExpr {
    let pattern = format!("{}%", escape_like(&term.to_lowercase()));
    Expr::expr(Func::lower(Expr::col(column.as_column_ref())))
        .like(LikeExpr::new(pattern).escape('\\'))
}

/// Trimmed search term, or `None` when blank.
pub(crate) fn search_term(q: Option<&str>) -> Option<&str> {
    q.map(str::trim).filter(|s| !s.is_empty())
}

/// `SELECT group_column, COUNT(*) ... WHERE group_column IN (ids) GROUP BY group_column`
/// as a map. Ids without rows are absent from the map.
pub(crate) async fn grouped_counts<E, C>(
    db: &C,
    group_column: E::Column,
    ids: &[i32],
) -> Result<HashMap<i32, u64>, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i32, i64)> = E::find()
        .select_only()
        .column(group_column)
        .column_as(Expr::col(group_column.as_column_ref()).count(), "row_count")
        .filter(group_column.is_in(ids.iter().copied()))
        .group_by(group_column)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(id, count)| (id, u64::try_from(count).unwrap_or_default()))
        .collect())
}

/// Primary keys of the `E` rows whose `foreign_key` equals `id`.
pub(crate) async fn referencing_ids<E, C>(
    db: &C,
    id_column: E::Column,
    foreign_key: E::Column,
    id: i32,
) -> Result<Vec<i32>, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    E::find()
        .select_only()
        .column(id_column)
        .filter(foreign_key.eq(id))
        .order_by_asc(id_column)
        .into_tuple()
        .all(db)
        .await
}
