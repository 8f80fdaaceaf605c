use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub student_id: i32,
    pub package_name: String,
    pub total_sessions: i32,
    /// Never exceeds `total_sessions`
    pub used_sessions: i32,
    pub start_date: Date,
    pub end_date: Date,
    /// Cleared in the same statement that uses up the last session
    pub is_active: bool,
}

impl Model {
    pub fn remaining_sessions(&self) -> i32 {
        self.total_sessions - self.used_sessions
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id",
        on_delete = "Cascade"
    )]
    Student,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
