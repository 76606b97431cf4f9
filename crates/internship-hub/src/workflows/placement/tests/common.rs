use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::storage::memory::MemoryTable;
use crate::storage::{
    Changeset, Entity, EntityStore, MemoryStore, PlacementStore, Record, StoreError,
};
use crate::workflows::placement::domain::{
    Application, ApplicationId, ApplicationStatus, CompanyRepresentative, Internship,
    InternshipId, InternshipLevel, InternshipStatus, RepresentativeId, Staff, StaffId, Student,
    StudentId,
};
use crate::workflows::placement::{placement_router, PlacementPolicy, PlacementService};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn today() -> NaiveDate {
    date(2026, 3, 2)
}

pub(super) fn student(id: &str, major: &str, year_of_study: u8) -> Student {
    Student {
        id: StudentId::from(id),
        name: format!("Student {id}"),
        password: "password".to_string(),
        major: major.to_string(),
        year_of_study,
        email: format!("{}@uni.test", id.to_lowercase()),
    }
}

pub(super) fn representative(id: &str, company: &str, approved: bool) -> CompanyRepresentative {
    CompanyRepresentative {
        id: RepresentativeId::from(id),
        name: format!("Rep {id}"),
        password: "password".to_string(),
        company_name: company.to_string(),
        department: "Talent".to_string(),
        position: "Recruiter".to_string(),
        email: id.to_string(),
        approved,
    }
}

pub(super) fn staff(id: &str) -> Staff {
    Staff {
        id: StaffId::from(id),
        name: format!("Staff {id}"),
        password: "password".to_string(),
        role: "Career Advisor".to_string(),
        department: "Career Center".to_string(),
        email: format!("{id}@uni.test"),
    }
}

pub(super) struct PostingFixture<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub representative: &'a str,
    pub company: &'a str,
    pub level: InternshipLevel,
    pub preferred_major: Option<&'a str>,
    pub status: InternshipStatus,
    pub slots: u8,
    pub closing: NaiveDate,
}

impl Default for PostingFixture<'_> {
    fn default() -> Self {
        Self {
            id: "int-000001",
            title: "Platform Intern",
            representative: "hr@acme.test",
            company: "Acme",
            level: InternshipLevel::Basic,
            preferred_major: None,
            status: InternshipStatus::Approved,
            slots: 2,
            closing: date(2026, 3, 31),
        }
    }
}

pub(super) fn internship(fixture: PostingFixture<'_>) -> Internship {
    Internship {
        id: InternshipId::from(fixture.id),
        title: fixture.title.to_string(),
        description: format!("{} role", fixture.title),
        level: fixture.level,
        preferred_major: fixture.preferred_major.map(str::to_string),
        opening_date: date(2026, 2, 1),
        closing_date: fixture.closing,
        status: fixture.status,
        company_name: fixture.company.to_string(),
        representative_id: RepresentativeId::from(fixture.representative),
        visible: matches!(
            fixture.status,
            InternshipStatus::Approved | InternshipStatus::Filled
        ),
        slots: fixture.slots,
        accepted_count: 0,
    }
}

pub(super) fn application(
    id: &str,
    student: &str,
    internship: &str,
    status: ApplicationStatus,
) -> Application {
    Application {
        id: ApplicationId::from(id),
        student_id: StudentId::from(student),
        internship_id: InternshipId::from(internship),
        status,
        withdraw_requested: false,
        student_accepted: false,
        submitted_on: Some(date(2026, 2, 10)),
    }
}

/// Students U1 (CS, year 3), U2 (CS, year 1), U3 (Business, year 4); approved Acme and
/// unapproved Globex representatives; staff-1; four Acme postings.
pub(super) fn seed_records() -> Vec<Record> {
    vec![
        student("U1", "Computer Science", 3).into_record(),
        student("U2", "Computer Science", 1).into_record(),
        student("U3", "Business", 4).into_record(),
        representative("hr@acme.test", "Acme", true).into_record(),
        representative("hr@globex.test", "Globex", false).into_record(),
        staff("staff-1").into_record(),
        internship(PostingFixture::default()).into_record(),
        internship(PostingFixture {
            id: "int-000002",
            title: "ML Research Intern",
            level: InternshipLevel::Advanced,
            preferred_major: Some("any"),
            slots: 1,
            closing: date(2026, 3, 10),
            ..PostingFixture::default()
        })
        .into_record(),
        internship(PostingFixture {
            id: "int-000003",
            title: "analytics intern",
            level: InternshipLevel::Intermediate,
            preferred_major: Some("Business; Finance"),
            slots: 3,
            closing: date(2026, 4, 15),
            ..PostingFixture::default()
        })
        .into_record(),
        internship(PostingFixture {
            id: "int-000004",
            title: "Draft Posting",
            status: InternshipStatus::Pending,
            ..PostingFixture::default()
        })
        .into_record(),
    ]
}

pub(super) fn build_service_with(
    records: Vec<Record>,
) -> (PlacementService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_records(records));
    let service =
        PlacementService::open(store.clone(), PlacementPolicy::default()).expect("open service");
    (service, store)
}

pub(super) fn build_service() -> (PlacementService<MemoryStore>, Arc<MemoryStore>) {
    build_service_with(seed_records())
}

pub(super) fn router_with_service(service: PlacementService<MemoryStore>) -> axum::Router {
    placement_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Reads like a memory store but refuses every commit.
#[derive(Debug, Default)]
pub(super) struct FailingStore {
    inner: MemoryStore,
}

impl FailingStore {
    pub(super) fn with_records(records: Vec<Record>) -> Self {
        Self {
            inner: MemoryStore::with_records(records),
        }
    }
}

impl<T: MemoryTable> EntityStore<T> for FailingStore {
    fn load_all(&self) -> Result<Vec<T>, StoreError> {
        EntityStore::<T>::load_all(&self.inner)
    }

    fn append(&self, _entity: &T) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk full".to_string()))
    }

    fn update(&self, _entity: &T) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk full".to_string()))
    }

    fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk full".to_string()))
    }
}

impl PlacementStore for FailingStore {
    fn commit(&self, _changes: &Changeset) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk full".to_string()))
    }
}
