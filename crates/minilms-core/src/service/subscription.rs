//! Subscription service layer
//!
//! A subscription is a prepaid package of sessions. Using a session is the
//! only operation that consumes it; the subscription deactivates itself in
//! the same write that uses up its last session.

use sea_orm::*;

use minilms_common::{ConflictReason, EntityKind, LmsError};
use minilms_persistence::entity::{student, subscription};
use minilms_persistence::store;

use crate::model::{NewSubscription, SubscriptionPatch};
use crate::validation::{check, validate_date_range, validate_name, validate_sessions};

/// Find subscriptions, ascending by id
pub async fn find_all(
    db: &DatabaseConnection,
    offset: u64,
    limit: u64,
) -> anyhow::Result<Vec<subscription::Model>> {
    Ok(subscription::Entity::find()
        .order_by_asc(subscription::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?)
}

/// Find a subscription by id
pub async fn find_by_id(
    db: &DatabaseConnection,
    subscription_id: i32,
) -> anyhow::Result<subscription::Model> {
    subscription::Entity::find_by_id(subscription_id)
        .one(db)
        .await?
        .ok_or_else(|| LmsError::NotFound(EntityKind::Subscription).into())
}

/// Subscriptions held by a student, ascending by id
pub async fn find_by_student(
    db: &DatabaseConnection,
    student_id: i32,
) -> anyhow::Result<Vec<subscription::Model>> {
    Ok(subscription::Entity::find()
        .filter(subscription::Column::StudentId.eq(student_id))
        .order_by_asc(subscription::Column::Id)
        .all(db)
        .await?)
}

/// Create a new, active subscription with no sessions used
pub async fn create(
    db: &DatabaseConnection,
    data: NewSubscription,
) -> anyhow::Result<subscription::Model> {
    check(validate_name("package_name", &data.package_name))?;
    check(validate_sessions(data.total_sessions, 0))?;
    check(validate_date_range(data.start_date, data.end_date))?;

    student::Entity::find_by_id(data.student_id)
        .one(db)
        .await?
        .ok_or(LmsError::NotFound(EntityKind::Student))?;

    let created = subscription::ActiveModel {
        student_id: Set(data.student_id),
        package_name: Set(data.package_name),
        total_sessions: Set(data.total_sessions),
        used_sessions: Set(0),
        start_date: Set(data.start_date),
        end_date: Set(data.end_date),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(
        subscription_id = created.id,
        student_id = created.student_id,
        total_sessions = created.total_sessions,
        "Subscription created"
    );

    Ok(created)
}

/// Update a subscription
///
/// Counters must keep `used_sessions <= total_sessions`; reaching
/// `used_sessions == total_sessions` deactivates the subscription.
pub async fn update(
    db: &DatabaseConnection,
    subscription_id: i32,
    patch: SubscriptionPatch,
) -> anyhow::Result<subscription::Model> {
    let current = find_by_id(db, subscription_id).await?;

    let package_name = patch
        .package_name
        .unwrap_or_else(|| current.package_name.clone());
    let total_sessions = patch.total_sessions.unwrap_or(current.total_sessions);
    let used_sessions = patch.used_sessions.unwrap_or(current.used_sessions);
    let start_date = patch.start_date.unwrap_or(current.start_date);
    let end_date = patch.end_date.unwrap_or(current.end_date);

    check(validate_name("package_name", &package_name))?;
    check(validate_sessions(total_sessions, used_sessions))?;
    check(validate_date_range(start_date, end_date))?;

    let is_active =
        patch.is_active.unwrap_or(current.is_active) && used_sessions < total_sessions;

    let mut active: subscription::ActiveModel = current.into();
    active.package_name = Set(package_name);
    active.total_sessions = Set(total_sessions);
    active.used_sessions = Set(used_sessions);
    active.start_date = Set(start_date);
    active.end_date = Set(end_date);
    active.is_active = Set(is_active);

    let updated = active.update(db).await?;

    tracing::info!(subscription_id, "Subscription updated");

    Ok(updated)
}

/// Consume one session
///
/// A subscription with no sessions left reports `exhausted` even though it is
/// also inactive; otherwise an inactive subscription reports `inactive`. When
/// the last session is used the subscription becomes inactive in the same
/// update.
pub async fn use_session(
    db: &DatabaseConnection,
    subscription_id: i32,
) -> anyhow::Result<subscription::Model> {
    let txn = db.begin().await?;

    let current = store::get_subscription_for_update(&txn, subscription_id)
        .await?
        .ok_or(LmsError::NotFound(EntityKind::Subscription))?;

    if current.used_sessions >= current.total_sessions {
        return Err(LmsError::from(ConflictReason::Exhausted).into());
    }
    if !current.is_active {
        return Err(LmsError::from(ConflictReason::Inactive).into());
    }

    let used_sessions = current.used_sessions + 1;
    let exhausted = used_sessions >= current.total_sessions;

    let mut active: subscription::ActiveModel = current.into();
    active.used_sessions = Set(used_sessions);
    if exhausted {
        active.is_active = Set(false);
    }

    let updated = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        subscription_id,
        used_sessions = updated.used_sessions,
        total_sessions = updated.total_sessions,
        is_active = updated.is_active,
        "Session used"
    );

    Ok(updated)
}

/// Delete a subscription
pub async fn delete(db: &DatabaseConnection, subscription_id: i32) -> anyhow::Result<()> {
    let res = subscription::Entity::delete_by_id(subscription_id)
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(LmsError::NotFound(EntityKind::Subscription).into());
    }

    tracing::info!(subscription_id, "Subscription deleted");

    Ok(())
}
