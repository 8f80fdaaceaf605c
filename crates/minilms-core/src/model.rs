//! Service input and output types
//!
//! `New*` types carry every field a create needs; `*Patch` types carry the
//! fields an update changes, leaving `None` fields untouched.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use minilms_common::DEFAULT_MAX_STUDENTS;
use minilms_persistence::entity::{parent, student};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParent {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub current_grade: Option<i32>,
    pub parent_id: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub current_grade: Option<i32>,
    pub parent_id: Option<i32>,
}

/// A student row together with its parent's name
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentWithParent {
    #[serde(flatten)]
    pub student: student::Model,
    pub parent_name: Option<String>,
}

impl StudentWithParent {
    pub fn new(student: student::Model, parent: Option<parent::Model>) -> Self {
        Self {
            student,
            parent_name: parent.map(|p| p.name),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClass {
    pub name: String,
    pub subject: String,
    pub teacher_name: String,
    /// 0 = Sunday, 1 = Monday, ..., 6 = Saturday
    pub day_of_week: i32,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
    #[serde(default = "default_max_students")]
    pub max_students: i32,
}

fn default_max_students() -> i32 {
    DEFAULT_MAX_STUDENTS
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassPatch {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub teacher_name: Option<String>,
    pub day_of_week: Option<i32>,
    pub time_start: Option<NaiveTime>,
    pub time_end: Option<NaiveTime>,
    pub max_students: Option<i32>,
}

impl ClassPatch {
    /// Whether applying the patch can move the class in the week
    pub fn moves_slot(&self) -> bool {
        self.day_of_week.is_some() || self.time_start.is_some() || self.time_end.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubscription {
    pub student_id: i32,
    pub package_name: String,
    pub total_sessions: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPatch {
    pub package_name: Option<String>,
    pub total_sessions: Option<i32>,
    pub used_sessions: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}
