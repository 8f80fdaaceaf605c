//! Demo data for a fresh database
//!
//! Everything is created through the services, so seeded registrations pass
//! the same capacity and overlap checks as any other registration.

use chrono::{NaiveDate, NaiveTime};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use serde::Serialize;

use minilms_common::LmsError;
use minilms_core::ListingCache;
use minilms_core::model::{NewClass, NewParent, NewStudent, NewSubscription, SubscriptionPatch};
use minilms_core::service::{class, enrollment, parent, student, subscription};
use minilms_persistence::entity::parent as parent_entity;

/// Rows created by [`seed`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub skipped: bool,
    pub parents: usize,
    pub students: usize,
    pub classes: usize,
    pub registrations: usize,
    pub subscriptions: usize,
}

const PARENTS: &[(&str, &str, &str)] = &[
    ("Nguyen Van A", "0901234567", "nguyenvana@email.com"),
    ("Tran Thi B", "0912345678", "tranthib@email.com"),
    ("Le Van C", "0923456789", "levanc@email.com"),
    ("Pham Thi D", "0934567890", "phamthid@email.com"),
    ("Hoang Van E", "0945678901", "hoangvane@email.com"),
];

// (name, dob, gender, grade, parent index)
const STUDENTS: &[(&str, (i32, u32, u32), &str, i32, usize)] = &[
    ("Nguyen Minh Khoi", (2015, 3, 15), "Male", 4, 0),
    ("Nguyen Thanh Tam", (2017, 7, 20), "Female", 2, 0),
    ("Tran Quoc Bao", (2014, 1, 10), "Male", 5, 1),
    ("Le Hoang Anh", (2016, 5, 5), "Female", 3, 2),
    ("Pham Duc Minh", (2015, 11, 25), "Male", 4, 3),
    ("Hoang Gia Bao", (2016, 9, 8), "Male", 3, 4),
];

struct ClassSeed {
    name: &'static str,
    subject: &'static str,
    teacher: &'static str,
    day_of_week: i32,
    start: (u32, u32),
    end: (u32, u32),
    max_students: i32,
}

const CLASSES: &[ClassSeed] = &[
    ClassSeed {
        name: "Toan Nang Cao 4",
        subject: "Toan",
        teacher: "Co Mai",
        day_of_week: 1,
        start: (8, 0),
        end: (9, 30),
        max_students: 20,
    },
    ClassSeed {
        name: "Tieng Viet 4",
        subject: "Tieng Viet",
        teacher: "Thay Hung",
        day_of_week: 1,
        start: (10, 0),
        end: (11, 30),
        max_students: 20,
    },
    ClassSeed {
        name: "Tieng Anh Giao Tiep",
        subject: "Tieng Anh",
        teacher: "Ms. Sarah",
        day_of_week: 2,
        start: (8, 0),
        end: (9, 30),
        max_students: 15,
    },
    ClassSeed {
        name: "Khoa Hoc Tu Nhien",
        subject: "Khoa Hoc",
        teacher: "Thay Tuan",
        day_of_week: 2,
        start: (14, 0),
        end: (15, 30),
        max_students: 25,
    },
    ClassSeed {
        name: "Ve My Thuat",
        subject: "My Thuat",
        teacher: "Co Lan",
        day_of_week: 3,
        start: (8, 0),
        end: (9, 30),
        max_students: 15,
    },
    ClassSeed {
        name: "Nhac Ly Co Ban",
        subject: "Am Nhac",
        teacher: "Thay Duc",
        day_of_week: 3,
        start: (10, 0),
        end: (11, 30),
        max_students: 20,
    },
    ClassSeed {
        name: "Toan Co Ban 3",
        subject: "Toan",
        teacher: "Co Hoa",
        day_of_week: 4,
        start: (8, 0),
        end: (9, 30),
        max_students: 25,
    },
    ClassSeed {
        name: "The Duc The Thao",
        subject: "The Duc",
        teacher: "Thay Nam",
        day_of_week: 5,
        start: (7, 0),
        end: (8, 30),
        max_students: 30,
    },
    ClassSeed {
        name: "Lap Trinh Scratch",
        subject: "Tin Hoc",
        teacher: "Thay Phong",
        day_of_week: 6,
        start: (9, 0),
        end: (10, 30),
        max_students: 15,
    },
    // Overlaps "Toan Nang Cao 4" on Monday
    ClassSeed {
        name: "Lop Luyen Thi",
        subject: "Toan",
        teacher: "Co Nga",
        day_of_week: 1,
        start: (8, 30),
        end: (10, 0),
        max_students: 10,
    },
];

// (class index, student index)
const REGISTRATIONS: &[(usize, usize)] = &[(0, 0), (2, 0), (1, 1), (4, 2), (6, 3), (7, 4), (8, 5)];

struct SubscriptionSeed {
    student: usize,
    package: &'static str,
    total: i32,
    used: i32,
    start: (i32, u32, u32),
    end: (i32, u32, u32),
}

const SUBSCRIPTIONS: &[SubscriptionSeed] = &[
    SubscriptionSeed {
        student: 0,
        package: "Goi Hoc Ky 1",
        total: 40,
        used: 12,
        start: (2026, 1, 5),
        end: (2026, 6, 30),
    },
    SubscriptionSeed {
        student: 1,
        package: "Goi Thang",
        total: 8,
        used: 3,
        start: (2026, 2, 1),
        end: (2026, 2, 28),
    },
    SubscriptionSeed {
        student: 2,
        package: "Goi Hoc Ky 1",
        total: 40,
        used: 40,
        start: (2025, 9, 1),
        end: (2026, 1, 31),
    },
    SubscriptionSeed {
        student: 3,
        package: "Goi Ca Nhan",
        total: 20,
        used: 5,
        start: (2026, 1, 15),
        end: (2026, 5, 15),
    },
];

fn date((year, month, day): (i32, u32, u32)) -> Result<NaiveDate, LmsError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| LmsError::IllegalArgument(format!("invalid date {year}-{month}-{day}")))
}

fn time((hour, minute): (u32, u32)) -> Result<NaiveTime, LmsError> {
    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| LmsError::IllegalArgument(format!("invalid time {hour}:{minute}")))
}

fn pick<T: Copy>(ids: &[T], index: usize) -> Result<T, LmsError> {
    ids.get(index)
        .copied()
        .ok_or_else(|| LmsError::IllegalArgument(format!("seed index {index} out of range")))
}

/// Load the demo data set, unless the database already holds parents
pub async fn seed(db: &DatabaseConnection, cache: &ListingCache) -> anyhow::Result<SeedReport> {
    let existing = parent_entity::Entity::find().count(db).await?;
    if existing > 0 {
        tracing::info!(existing, "Database already has data, skipping seed");
        return Ok(SeedReport {
            skipped: true,
            ..Default::default()
        });
    }

    let mut report = SeedReport::default();

    let mut parent_ids = Vec::with_capacity(PARENTS.len());
    for (name, phone, email) in PARENTS {
        let created = parent::create(
            db,
            NewParent {
                name: name.to_string(),
                phone: phone.to_string(),
                email: Some(email.to_string()),
            },
        )
        .await?;
        parent_ids.push(created.id);
    }
    report.parents = parent_ids.len();

    let mut student_ids = Vec::with_capacity(STUDENTS.len());
    for (name, dob, gender, grade, parent_index) in STUDENTS {
        let created = student::create(
            db,
            NewStudent {
                name: name.to_string(),
                dob: Some(date(*dob)?),
                gender: Some(gender.to_string()),
                current_grade: Some(*grade),
                parent_id: pick(&parent_ids, *parent_index)?,
            },
        )
        .await?;
        student_ids.push(created.id);
    }
    report.students = student_ids.len();

    let mut class_ids = Vec::with_capacity(CLASSES.len());
    for seed in CLASSES {
        let created = class::create(
            db,
            cache,
            NewClass {
                name: seed.name.to_string(),
                subject: seed.subject.to_string(),
                teacher_name: seed.teacher.to_string(),
                day_of_week: seed.day_of_week,
                time_start: time(seed.start)?,
                time_end: time(seed.end)?,
                max_students: seed.max_students,
            },
        )
        .await?;
        class_ids.push(created.id);
    }
    report.classes = class_ids.len();

    for (class_index, student_index) in REGISTRATIONS {
        enrollment::register(
            db,
            cache,
            pick(&class_ids, *class_index)?,
            pick(&student_ids, *student_index)?,
        )
        .await?;
        report.registrations += 1;
    }

    for seed in SUBSCRIPTIONS {
        let created = subscription::create(
            db,
            NewSubscription {
                student_id: pick(&student_ids, seed.student)?,
                package_name: seed.package.to_string(),
                total_sessions: seed.total,
                start_date: date(seed.start)?,
                end_date: date(seed.end)?,
            },
        )
        .await?;

        if seed.used > 0 {
            subscription::update(
                db,
                created.id,
                SubscriptionPatch {
                    used_sessions: Some(seed.used),
                    ..Default::default()
                },
            )
            .await?;
        }
        report.subscriptions += 1;
    }

    tracing::info!(
        parents = report.parents,
        students = report.students,
        classes = report.classes,
        registrations = report.registrations,
        subscriptions = report.subscriptions,
        "Seed data created"
    );

    Ok(report)
}
