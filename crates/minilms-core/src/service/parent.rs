//! Parent service layer

use sea_orm::*;

use minilms_common::{ConflictReason, EntityKind, LmsError};
use minilms_persistence::entity::{parent, student};

use crate::cache::ListingCache;
use crate::model::{NewParent, ParentPatch};
use crate::service::is_unique_violation;
use crate::validation::{check, validate_email, validate_name, validate_phone};

/// Find parents, ascending by id
pub async fn find_all(
    db: &DatabaseConnection,
    offset: u64,
    limit: u64,
) -> anyhow::Result<Vec<parent::Model>> {
    Ok(parent::Entity::find()
        .order_by_asc(parent::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?)
}

/// Find a parent by id
pub async fn find_by_id(db: &DatabaseConnection, parent_id: i32) -> anyhow::Result<parent::Model> {
    parent::Entity::find_by_id(parent_id)
        .one(db)
        .await?
        .ok_or_else(|| LmsError::NotFound(EntityKind::Parent).into())
}

/// Children of a parent, ascending by id
pub async fn find_students(
    db: &DatabaseConnection,
    parent_id: i32,
) -> anyhow::Result<Vec<student::Model>> {
    let parent = find_by_id(db, parent_id).await?;

    Ok(parent
        .find_related(student::Entity)
        .order_by_asc(student::Column::Id)
        .all(db)
        .await?)
}

async fn phone_exists(db: &DatabaseConnection, phone: &str) -> anyhow::Result<bool> {
    let count = parent::Entity::find()
        .filter(parent::Column::Phone.eq(phone))
        .count(db)
        .await?;

    Ok(count > 0)
}

fn phone_taken(phone: &str, err: DbErr) -> anyhow::Error {
    if is_unique_violation(&err) {
        LmsError::from(ConflictReason::PhoneTaken(phone.to_string())).into()
    } else {
        err.into()
    }
}

/// Create a new parent, the phone number must not be in use
pub async fn create(db: &DatabaseConnection, data: NewParent) -> anyhow::Result<parent::Model> {
    check(validate_name("name", &data.name))?;
    check(validate_phone(&data.phone))?;
    if let Some(email) = &data.email {
        check(validate_email(email))?;
    }

    if phone_exists(db, &data.phone).await? {
        return Err(LmsError::from(ConflictReason::PhoneTaken(data.phone)).into());
    }

    let phone = data.phone.clone();
    let created = parent::ActiveModel {
        name: Set(data.name),
        phone: Set(data.phone),
        email: Set(data.email),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| phone_taken(&phone, e))?;

    tracing::info!(parent_id = created.id, "Parent created");

    Ok(created)
}

/// Update a parent
///
/// Phone uniqueness is re-checked only when the phone number changes.
pub async fn update(
    db: &DatabaseConnection,
    parent_id: i32,
    patch: ParentPatch,
) -> anyhow::Result<parent::Model> {
    let current = find_by_id(db, parent_id).await?;

    let name = patch.name.unwrap_or_else(|| current.name.clone());
    check(validate_name("name", &name))?;

    let email = patch.email.or_else(|| current.email.clone());
    if let Some(email) = &email {
        check(validate_email(email))?;
    }

    let phone = match patch.phone {
        Some(phone) if phone != current.phone => {
            check(validate_phone(&phone))?;
            if phone_exists(db, &phone).await? {
                return Err(LmsError::from(ConflictReason::PhoneTaken(phone)).into());
            }
            phone
        }
        _ => current.phone.clone(),
    };

    let mut active: parent::ActiveModel = current.into();
    active.name = Set(name);
    active.email = Set(email);
    active.phone = Set(phone.clone());

    let updated = active.update(db).await.map_err(|e| phone_taken(&phone, e))?;

    tracing::info!(parent_id, "Parent updated");

    Ok(updated)
}

/// Delete a parent, cascading to students, their enrollments and subscriptions
pub async fn delete(
    db: &DatabaseConnection,
    cache: &ListingCache,
    parent_id: i32,
) -> anyhow::Result<()> {
    let res = parent::Entity::delete_by_id(parent_id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(LmsError::NotFound(EntityKind::Parent).into());
    }

    tracing::info!(parent_id, "Parent deleted");

    cache.invalidate().await;

    Ok(())
}
