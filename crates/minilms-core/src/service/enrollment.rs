//! Enrollment engine
//!
//! Registration runs every check inside one transaction after locking the
//! class row and then the student row. Two registrations for the same class,
//! or for the same student, therefore serialise in the store, which keeps
//! occupancy within `max_students` and a student's timetable free of
//! overlaps. The unique `(class_id, student_id)` index backs up the duplicate
//! check. The listing cache is only touched after commit.

use sea_orm::{DatabaseConnection, TransactionTrait};

use minilms_common::{ConflictReason, EntityKind, LmsError};
use minilms_persistence::ClassOccupancy;
use minilms_persistence::entity::{class, enrollment, student};
use minilms_persistence::store;

use crate::cache::ListingCache;
use crate::schedule::{self, TimeSlot};
use crate::service::is_unique_violation;

/// Enroll a student in a class
///
/// Checks run in this order and the first failure wins: class exists, student
/// exists, not already registered, class not full, no same-day overlap with
/// the student's other classes.
pub async fn register(
    db: &DatabaseConnection,
    cache: &ListingCache,
    class_id: i32,
    student_id: i32,
) -> anyhow::Result<enrollment::Model> {
    let txn = db.begin().await?;

    let class = store::get_class_for_update(&txn, class_id)
        .await?
        .ok_or(LmsError::NotFound(EntityKind::Class))?;

    store::get_student_for_update(&txn, student_id)
        .await?
        .ok_or(LmsError::NotFound(EntityKind::Student))?;

    if store::find_enrollment(&txn, class_id, student_id)
        .await?
        .is_some()
    {
        return Err(LmsError::from(ConflictReason::AlreadyRegistered).into());
    }

    let max = u32::try_from(class.max_students).unwrap_or_default();
    let current = store::count_enrollments(&txn, class_id).await?;
    if current >= u64::from(max) {
        return Err(LmsError::from(ConflictReason::ClassFull { current, max }).into());
    }

    let timetable = store::list_student_classes(&txn, student_id).await?;
    schedule::ensure_no_overlap(&TimeSlot::of(&class), &timetable, None)?;

    let created = match store::create_enrollment(&txn, class_id, student_id).await {
        Ok(created) => created,
        Err(e) if is_unique_violation(&e) => {
            return Err(LmsError::from(ConflictReason::AlreadyRegistered).into());
        }
        Err(e) => return Err(e.into()),
    };

    txn.commit().await?;

    tracing::info!(
        class_id,
        student_id,
        enrollment_id = created.id,
        "Student registered"
    );

    cache.invalidate().await;

    Ok(created)
}

/// Remove a student from a class
pub async fn unregister(
    db: &DatabaseConnection,
    cache: &ListingCache,
    class_id: i32,
    student_id: i32,
) -> anyhow::Result<()> {
    let txn = db.begin().await?;

    // Serializes with registrations for the same class
    store::get_class_for_update(&txn, class_id).await?;

    let enrollment = store::find_enrollment(&txn, class_id, student_id)
        .await?
        .ok_or(LmsError::NotFound(EntityKind::Registration))?;

    if !store::delete_enrollment(&txn, enrollment.id).await? {
        return Err(LmsError::NotFound(EntityKind::Registration).into());
    }

    txn.commit().await?;

    tracing::info!(class_id, student_id, "Student unregistered");

    cache.invalidate().await;

    Ok(())
}

/// Students enrolled in a class, ascending by id
pub async fn list_class_students(
    db: &DatabaseConnection,
    class_id: i32,
) -> anyhow::Result<Vec<student::Model>> {
    store::get_class(db, class_id)
        .await?
        .ok_or(LmsError::NotFound(EntityKind::Class))?;

    Ok(store::list_class_students(db, class_id).await?)
}

/// Classes a student is enrolled in, ascending by id
pub async fn list_student_classes(
    db: &DatabaseConnection,
    student_id: i32,
) -> anyhow::Result<Vec<class::Model>> {
    store::get_student(db, student_id)
        .await?
        .ok_or(LmsError::NotFound(EntityKind::Student))?;

    Ok(store::list_student_classes(db, student_id).await?)
}

/// Classes with their occupancy
///
/// The canonical window (offset 0, the configured page limit) reads through
/// the listing cache; any other window goes straight to the store.
pub async fn list_classes_with_occupancy(
    db: &DatabaseConnection,
    cache: &ListingCache,
    offset: u64,
    limit: u64,
) -> anyhow::Result<Vec<ClassOccupancy>> {
    let canonical = cache.is_canonical(offset, limit);

    if canonical && let Some(snapshot) = cache.fetch().await {
        return Ok(snapshot);
    }

    let rows = store::list_classes_with_counts(db, offset, limit).await?;

    if canonical {
        cache.store(rows.clone()).await;
    }

    Ok(rows)
}
