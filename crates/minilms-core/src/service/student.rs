//! Student service layer

use sea_orm::*;

use minilms_common::{EntityKind, LmsError};
use minilms_persistence::entity::{parent, student};

use crate::cache::ListingCache;
use crate::model::{NewStudent, StudentPatch, StudentWithParent};
use crate::validation::{check, validate_gender, validate_name};

/// Find students with their parent's name, ascending by id
pub async fn find_all(
    db: &DatabaseConnection,
    offset: u64,
    limit: u64,
) -> anyhow::Result<Vec<StudentWithParent>> {
    let rows = student::Entity::find()
        .find_also_related(parent::Entity)
        .order_by_asc(student::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(student, parent)| StudentWithParent::new(student, parent))
        .collect())
}

/// Find a student by id
pub async fn find_by_id(
    db: &DatabaseConnection,
    student_id: i32,
) -> anyhow::Result<StudentWithParent> {
    let (student, parent) = student::Entity::find_by_id(student_id)
        .find_also_related(parent::Entity)
        .one(db)
        .await?
        .ok_or(LmsError::NotFound(EntityKind::Student))?;

    Ok(StudentWithParent::new(student, parent))
}

async fn ensure_parent(db: &DatabaseConnection, parent_id: i32) -> anyhow::Result<()> {
    parent::Entity::find_by_id(parent_id)
        .one(db)
        .await?
        .ok_or(LmsError::NotFound(EntityKind::Parent))?;

    Ok(())
}

/// Create a new student under an existing parent
pub async fn create(db: &DatabaseConnection, data: NewStudent) -> anyhow::Result<student::Model> {
    check(validate_name("name", &data.name))?;
    if let Some(gender) = &data.gender {
        check(validate_gender(gender))?;
    }

    ensure_parent(db, data.parent_id).await?;

    let created = student::ActiveModel {
        name: Set(data.name),
        dob: Set(data.dob),
        gender: Set(data.gender),
        current_grade: Set(data.current_grade),
        parent_id: Set(data.parent_id),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(
        student_id = created.id,
        parent_id = created.parent_id,
        "Student created"
    );

    Ok(created)
}

/// Update a student, a new parent must exist
pub async fn update(
    db: &DatabaseConnection,
    student_id: i32,
    patch: StudentPatch,
) -> anyhow::Result<student::Model> {
    let current = student::Entity::find_by_id(student_id)
        .one(db)
        .await?
        .ok_or(LmsError::NotFound(EntityKind::Student))?;

    let name = patch.name.unwrap_or_else(|| current.name.clone());
    check(validate_name("name", &name))?;

    let gender = patch.gender.or_else(|| current.gender.clone());
    if let Some(gender) = &gender {
        check(validate_gender(gender))?;
    }

    let parent_id = match patch.parent_id {
        Some(parent_id) if parent_id != current.parent_id => {
            ensure_parent(db, parent_id).await?;
            parent_id
        }
        _ => current.parent_id,
    };

    let dob = patch.dob.or(current.dob);
    let current_grade = patch.current_grade.or(current.current_grade);

    let mut active: student::ActiveModel = current.into();
    active.name = Set(name);
    active.dob = Set(dob);
    active.gender = Set(gender);
    active.current_grade = Set(current_grade);
    active.parent_id = Set(parent_id);

    let updated = active.update(db).await?;

    tracing::info!(student_id, "Student updated");

    Ok(updated)
}

/// Delete a student, cascading to enrollments and subscriptions
pub async fn delete(
    db: &DatabaseConnection,
    cache: &ListingCache,
    student_id: i32,
) -> anyhow::Result<()> {
    let res = student::Entity::delete_by_id(student_id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(LmsError::NotFound(EntityKind::Student).into());
    }

    tracing::info!(student_id, "Student deleted");

    cache.invalidate().await;

    Ok(())
}
