//! Class listing with occupancy

use sea_orm::*;

use crate::entity::{class, enrollment};
use crate::model::ClassOccupancy;

/// Classes with their enrollment counts, ascending by class id
///
/// Classes without enrollments are kept by the outer join and report 0.
pub async fn list_classes_with_counts<C: ConnectionTrait>(
    conn: &C,
    offset: u64,
    limit: u64,
) -> Result<Vec<ClassOccupancy>, DbErr> {
    let mut select = class::Entity::find()
        .column_as(enrollment::Column::Id.count(), "current_students")
        .left_join(enrollment::Entity);

    // Group by every selected class column so strict SQL modes accept the query
    for column in class::Column::iter() {
        select = select.group_by(column);
    }

    let rows = select
        .order_by_asc(class::Column::Id)
        .offset(offset)
        .limit(limit)
        .into_model::<ClassOccupancy>()
        .all(conn)
        .await?;

    tracing::debug!(offset, limit, rows = rows.len(), "Listed classes with occupancy");

    Ok(rows)
}
