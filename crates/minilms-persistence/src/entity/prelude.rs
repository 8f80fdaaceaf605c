pub use super::class::Entity as Class;
pub use super::enrollment::Entity as Enrollment;
pub use super::parent::Entity as Parent;
pub use super::student::Entity as Student;
pub use super::subscription::Entity as Subscription;
