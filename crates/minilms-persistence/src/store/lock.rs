//! Write locks for backends without row locks

use sea_orm::sea_query::Expr;
use sea_orm::*;

/// Start the surrounding transaction as a writer on SQLite
///
/// SQLite ignores `FOR UPDATE` and opens every transaction as a reader. Two
/// readers that later try to write cannot both upgrade, and the loser fails
/// with `SQLITE_BUSY` without consulting the busy timeout. A no-op update of
/// `touch` on the row issued before any read takes the database write lock
/// up front, so competing transactions wait on the busy timeout instead.
///
/// Other backends rely on the `FOR UPDATE` row lock and skip this.
pub async fn reserve_write<E, C>(
    conn: &C,
    id_column: E::Column,
    touch: E::Column,
    id: i32,
) -> Result<(), DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    if conn.get_database_backend() != DbBackend::Sqlite {
        return Ok(());
    }

    E::update_many()
        .col_expr(touch, Expr::col(touch).into())
        .filter(id_column.eq(id))
        .exec(conn)
        .await?;

    Ok(())
}
