//! Entity Store primitives used by the enrollment engine
//!
//! Every function is generic over [`ConnectionTrait`](sea_orm::ConnectionTrait)
//! so it runs equally on a pooled connection or inside the caller's
//! `DatabaseTransaction`. Functions return `DbErr` unchanged so callers can
//! inspect constraint violations.

pub mod enrollment;
pub mod listing;
pub mod lock;
pub mod subscription;

pub use enrollment::{
    count_enrollments, create_enrollment, delete_enrollment, find_enrollment, get_class,
    get_class_for_update, get_student, get_student_for_update, list_class_students,
    list_student_classes,
};
pub use listing::list_classes_with_counts;
pub use lock::reserve_write;
pub use subscription::get_subscription_for_update;
