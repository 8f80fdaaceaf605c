//! Subscription queries

use sea_orm::*;

use super::lock::reserve_write;
use crate::entity::subscription;

/// Get a subscription by id and lock its row until the surrounding transaction ends
pub async fn get_subscription_for_update<C: ConnectionTrait>(
    conn: &C,
    subscription_id: i32,
) -> Result<Option<subscription::Model>, DbErr> {
    reserve_write::<subscription::Entity, _>(
        conn,
        subscription::Column::Id,
        subscription::Column::UsedSessions,
        subscription_id,
    )
    .await?;

    subscription::Entity::find_by_id(subscription_id)
        .lock_exclusive()
        .one(conn)
        .await
}
