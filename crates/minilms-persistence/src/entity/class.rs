//! Class entity
//!
//! A weekly recurring class slot: one day of the week and a half-open
//! `[time_start, time_end)` range of that day.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "classes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub subject: String,
    pub teacher_name: String,
    /// 0 = Sunday, 1 = Monday, ..., 6 = Saturday
    pub day_of_week: i32,
    pub time_start: Time,
    pub time_end: Time,
    pub max_students: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollment,
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
