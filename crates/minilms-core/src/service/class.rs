//! Class service layer
//!
//! Every successful write drops the cached class listing.

use sea_orm::*;

use minilms_common::{ConflictReason, EntityKind, LmsError};
use minilms_persistence::entity::class;
use minilms_persistence::store;

use crate::cache::ListingCache;
use crate::model::{ClassPatch, NewClass};
use crate::schedule::{self, TimeSlot};
use crate::validation::{
    check, validate_day_of_week, validate_max_students, validate_name, validate_time_range,
};

/// Find a class by id
pub async fn find_by_id(db: &DatabaseConnection, class_id: i32) -> anyhow::Result<class::Model> {
    store::get_class(db, class_id)
        .await?
        .ok_or_else(|| LmsError::NotFound(EntityKind::Class).into())
}

fn validate_class(
    name: &str,
    subject: &str,
    teacher_name: &str,
    slot: &TimeSlot,
    max_students: i32,
) -> Result<(), LmsError> {
    check(validate_name("name", name))?;
    check(validate_name("subject", subject))?;
    check(validate_name("teacher_name", teacher_name))?;
    check(validate_day_of_week(slot.day_of_week))?;
    check(validate_time_range(slot.start, slot.end))?;
    check(validate_max_students(max_students))
}

/// Create a new class
pub async fn create(
    db: &DatabaseConnection,
    cache: &ListingCache,
    data: NewClass,
) -> anyhow::Result<class::Model> {
    let slot = TimeSlot::new(data.day_of_week, data.time_start, data.time_end);
    validate_class(
        &data.name,
        &data.subject,
        &data.teacher_name,
        &slot,
        data.max_students,
    )?;

    let created = class::ActiveModel {
        name: Set(data.name),
        subject: Set(data.subject),
        teacher_name: Set(data.teacher_name),
        day_of_week: Set(data.day_of_week),
        time_start: Set(data.time_start),
        time_end: Set(data.time_end),
        max_students: Set(data.max_students),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(class_id = created.id, name = %created.name, "Class created");

    cache.invalidate().await;

    Ok(created)
}

/// Update a class
///
/// Capacity may not drop below the current occupancy, and a new day or time
/// may not collide with another class of any enrolled student.
pub async fn update(
    db: &DatabaseConnection,
    cache: &ListingCache,
    class_id: i32,
    patch: ClassPatch,
) -> anyhow::Result<class::Model> {
    let txn = db.begin().await?;

    let current = store::get_class_for_update(&txn, class_id)
        .await?
        .ok_or(LmsError::NotFound(EntityKind::Class))?;

    let name = patch.name.clone().unwrap_or_else(|| current.name.clone());
    let subject = patch
        .subject
        .clone()
        .unwrap_or_else(|| current.subject.clone());
    let teacher_name = patch
        .teacher_name
        .clone()
        .unwrap_or_else(|| current.teacher_name.clone());
    let slot = TimeSlot::new(
        patch.day_of_week.unwrap_or(current.day_of_week),
        patch.time_start.unwrap_or(current.time_start),
        patch.time_end.unwrap_or(current.time_end),
    );
    let max_students = patch.max_students.unwrap_or(current.max_students);

    validate_class(&name, &subject, &teacher_name, &slot, max_students)?;

    if max_students < current.max_students {
        let occupancy = store::count_enrollments(&txn, class_id).await?;
        let requested = u32::try_from(max_students).unwrap_or_default();
        if occupancy > u64::from(requested) {
            return Err(LmsError::from(ConflictReason::CapacityBelowOccupancy {
                current: occupancy,
                requested,
            })
            .into());
        }
    }

    if patch.moves_slot() && slot != TimeSlot::of(&current) {
        for student in store::list_class_students(&txn, class_id).await? {
            store::get_student_for_update(&txn, student.id).await?;
            let timetable = store::list_student_classes(&txn, student.id).await?;
            schedule::ensure_no_overlap(&slot, &timetable, Some(class_id))?;
        }
    }

    let mut active: class::ActiveModel = current.into();
    active.name = Set(name);
    active.subject = Set(subject);
    active.teacher_name = Set(teacher_name);
    active.day_of_week = Set(slot.day_of_week);
    active.time_start = Set(slot.start);
    active.time_end = Set(slot.end);
    active.max_students = Set(max_students);

    let updated = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(class_id, "Class updated");

    cache.invalidate().await;

    Ok(updated)
}

/// Delete a class together with its enrollments
pub async fn delete(
    db: &DatabaseConnection,
    cache: &ListingCache,
    class_id: i32,
) -> anyhow::Result<()> {
    let res = class::Entity::delete_by_id(class_id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(LmsError::NotFound(EntityKind::Class).into());
    }

    tracing::info!(class_id, "Class deleted");

    cache.invalidate().await;

    Ok(())
}
