//! Enrollment queries

use sea_orm::*;

use super::lock::reserve_write;
use crate::entity::{class, enrollment, student};

/// Get a class by id
pub async fn get_class<C: ConnectionTrait>(
    conn: &C,
    class_id: i32,
) -> Result<Option<class::Model>, DbErr> {
    class::Entity::find_by_id(class_id).one(conn).await
}

/// Get a class by id and lock its row until the surrounding transaction ends
///
/// On SQLite this takes the database write lock instead, see [`reserve_write`].
pub async fn get_class_for_update<C: ConnectionTrait>(
    conn: &C,
    class_id: i32,
) -> Result<Option<class::Model>, DbErr> {
    reserve_write::<class::Entity, _>(conn, class::Column::Id, class::Column::Name, class_id)
        .await?;

    class::Entity::find_by_id(class_id)
        .lock_exclusive()
        .one(conn)
        .await
}

/// Get a student by id
pub async fn get_student<C: ConnectionTrait>(
    conn: &C,
    student_id: i32,
) -> Result<Option<student::Model>, DbErr> {
    student::Entity::find_by_id(student_id).one(conn).await
}

/// Get a student by id and lock its row until the surrounding transaction ends
pub async fn get_student_for_update<C: ConnectionTrait>(
    conn: &C,
    student_id: i32,
) -> Result<Option<student::Model>, DbErr> {
    reserve_write::<student::Entity, _>(
        conn,
        student::Column::Id,
        student::Column::Name,
        student_id,
    )
    .await?;

    student::Entity::find_by_id(student_id)
        .lock_exclusive()
        .one(conn)
        .await
}

/// All classes a student is enrolled in, ascending by class id
pub async fn list_student_classes<C: ConnectionTrait>(
    conn: &C,
    student_id: i32,
) -> Result<Vec<class::Model>, DbErr> {
    class::Entity::find()
        .inner_join(enrollment::Entity)
        .filter(enrollment::Column::StudentId.eq(student_id))
        .order_by_asc(class::Column::Id)
        .all(conn)
        .await
}

/// All students enrolled in a class, ascending by student id
pub async fn list_class_students<C: ConnectionTrait>(
    conn: &C,
    class_id: i32,
) -> Result<Vec<student::Model>, DbErr> {
    student::Entity::find()
        .inner_join(enrollment::Entity)
        .filter(enrollment::Column::ClassId.eq(class_id))
        .order_by_asc(student::Column::Id)
        .all(conn)
        .await
}

/// Occupancy of a class
pub async fn count_enrollments<C: ConnectionTrait>(conn: &C, class_id: i32) -> Result<u64, DbErr> {
    enrollment::Entity::find()
        .filter(enrollment::Column::ClassId.eq(class_id))
        .count(conn)
        .await
}

/// The enrollment for exactly this pair, if any
pub async fn find_enrollment<C: ConnectionTrait>(
    conn: &C,
    class_id: i32,
    student_id: i32,
) -> Result<Option<enrollment::Model>, DbErr> {
    enrollment::Entity::find()
        .filter(enrollment::Column::ClassId.eq(class_id))
        .filter(enrollment::Column::StudentId.eq(student_id))
        .one(conn)
        .await
}

/// Insert an enrollment row stamped with the current time
pub async fn create_enrollment<C: ConnectionTrait>(
    conn: &C,
    class_id: i32,
    student_id: i32,
) -> Result<enrollment::Model, DbErr> {
    enrollment::ActiveModel {
        class_id: Set(class_id),
        student_id: Set(student_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await
}

/// Delete an enrollment row, returns whether a row was removed
pub async fn delete_enrollment<C: ConnectionTrait>(
    conn: &C,
    enrollment_id: i32,
) -> Result<bool, DbErr> {
    let res = enrollment::Entity::delete_by_id(enrollment_id)
        .exec(conn)
        .await?;

    Ok(res.rows_affected > 0)
}
