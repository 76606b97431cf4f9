//! Persistence scenarios for the flat-file store: seeded files, committed transitions, and a
//! restart that reloads exactly what was written.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::TempDir;

use internship_hub::storage::{CsvStore, EntityStore, StoreError};
use internship_hub::workflows::placement::{
    Actor, Application, ApplicationId, ApplicationStatus, Internship, InternshipId,
    InternshipStatus, Outcome, PlacementError, PlacementPolicy, PlacementService,
    RepresentativeId, StaffId, Student, StudentId,
};

const STUDENTS: &str = "\
S100,Avery Stone,secret,Computer Science,3,s100@campus.test,int-000001
S200,Blake Hart,secret,\"Economics, Finance\",2,s200@campus.test
";

const REPRESENTATIVES: &str = "\
talent@northwind.test,Riley Chen,secret,Northwind,Engineering,Recruiter,talent@northwind.test,true
";

const STAFF: &str = "career-01,Morgan Lee,secret,Placement Officer,Career Office,career-01@campus.test\n";

const INTERNSHIPS: &str = "\
int-000001,Backend Intern,Services and APIs,Basic,any,2026-05-01,2026-06-30,Approved,Northwind,talent@northwind.test,true,1,0
int-000002,Research Intern,\"Models, data\",Advanced,Computer Science,2026-05-01,2026-06-30,Approved,Northwind,talent@northwind.test,true,2,0
";

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn seed(root: &Path) {
    fs::write(root.join("students.csv"), STUDENTS).expect("students");
    fs::write(root.join("representatives.csv"), REPRESENTATIVES).expect("representatives");
    fs::write(root.join("staff.csv"), STAFF).expect("staff");
    fs::write(root.join("internships.csv"), INTERNSHIPS).expect("internships");
}

fn open(root: &Path) -> PlacementService<CsvStore> {
    let store = Arc::new(CsvStore::open(root).expect("open store"));
    PlacementService::open(store, PlacementPolicy::default()).expect("open service")
}

fn applied<T: std::fmt::Debug>(result: Result<Outcome<T>, PlacementError>) -> T {
    match result {
        Ok(Outcome::Applied(value)) => value,
        other => panic!("expected applied outcome, got {other:?}"),
    }
}

#[test]
fn seeded_files_load_and_quoted_fields_survive() {
    let dir = TempDir::new().expect("tempdir");
    seed(dir.path());
    let store = CsvStore::open(dir.path()).expect("open store");

    let students: Vec<Student> = store.load_all().expect("students");
    assert_eq!(students.len(), 2);
    assert_eq!(students[1].major, "Economics, Finance");

    let internships: Vec<Internship> = store.load_all().expect("internships");
    assert_eq!(internships[1].description, "Models, data");
    assert_eq!(internships[0].preferred_major.as_deref(), Some("any"));
}

#[test]
fn committed_transitions_are_reloaded_after_restart() {
    let dir = TempDir::new().expect("tempdir");
    seed(dir.path());
    let student = StudentId::from("S100");
    let posting = InternshipId::from("int-000001");
    let representative = RepresentativeId::from("talent@northwind.test");

    let application_id = {
        let service = open(dir.path());
        let application = applied(service.apply(&student, &posting, date(2026, 5, 4)));
        applied(service.approve_application(&representative, &application.id));
        applied(service.accept_offer(&student, &application.id));
        application.id
    };

    let applications = fs::read_to_string(dir.path().join("applications.csv")).expect("read");
    assert_eq!(
        applications,
        "app-000001,S100,int-000001,Successful,false,true,2026-05-04\n"
    );
    let students = fs::read_to_string(dir.path().join("students.csv")).expect("read");
    assert_eq!(students, STUDENTS);

    let service = open(dir.path());
    let changed = service
        .change_password(&Actor::Student(student.clone()), "secret", "rotated")
        .expect("change password");
    assert!(changed.is_applied());
    let students = fs::read_to_string(dir.path().join("students.csv")).expect("read");
    assert!(students.starts_with("S100,Avery Stone,rotated,Computer Science,3,s100@campus.test\n"));
    assert!(students.contains("\"Economics, Finance\""));

    let reloaded = service
        .inspect(|book| book.internship(&posting).cloned())
        .expect("inspect")
        .expect("posting");
    assert_eq!(reloaded.status, InternshipStatus::Filled);
    assert_eq!(reloaded.accepted_count(), 1);

    applied(service.request_withdrawal(&student, &application_id));
    applied(service.approve_withdrawal(&StaffId::from("career-01"), &application_id));

    let store = CsvStore::open(dir.path()).expect("open store");
    let stored: Vec<Application> = store.load_all().expect("applications");
    assert_eq!(stored[0].status, ApplicationStatus::Withdrawn);
    assert!(!stored[0].student_accepted);
    let internship: Option<Internship> = store.find("int-000001").expect("find");
    let internship = internship.expect("posting stored");
    assert_eq!(internship.status, InternshipStatus::Approved);
    assert_eq!(internship.accepted_count(), 0);
}

#[test]
fn no_staged_files_are_left_behind() {
    let dir = TempDir::new().expect("tempdir");
    seed(dir.path());
    let service = open(dir.path());
    applied(service.apply(
        &StudentId::from("S100"),
        &InternshipId::from("int-000002"),
        date(2026, 5, 4),
    ));

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .expect("list")
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "staged"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn unknown_status_stops_loading_with_its_line() {
    let dir = TempDir::new().expect("tempdir");
    seed(dir.path());
    fs::write(
        dir.path().join("applications.csv"),
        "app-000001,S100,int-000001,Pending,false,false\napp-000002,S200,int-000001,Accepted,false,false\n",
    )
    .expect("applications");

    let store = Arc::new(CsvStore::open(dir.path()).expect("open store"));
    match PlacementService::open(store, PlacementPolicy::default()) {
        Err(PlacementError::Store(StoreError::Parse {
            line, field, value, ..
        })) => {
            assert_eq!(line, 2);
            assert_eq!(field, "status");
            assert_eq!(value, "Accepted");
        }
        Err(other) => panic!("expected parse error, got {other:?}"),
        Ok(_) => panic!("expected parse error, got a service"),
    }
}

#[test]
fn malformed_lines_are_skipped_on_load() {
    let dir = TempDir::new().expect("tempdir");
    seed(dir.path());
    fs::write(
        dir.path().join("applications.csv"),
        "app-000001,S100,int-000001,Pending,false,false\nbroken line\napp-000003,S200,int-000001,Pending,maybe,false\n",
    )
    .expect("applications");

    let service = open(dir.path());
    let ids = service
        .inspect(|book| {
            book.applications()
                .map(|application| application.id.clone())
                .collect::<Vec<_>>()
        })
        .expect("inspect");
    assert_eq!(ids, vec![ApplicationId::from("app-000001")]);
    assert_eq!(
        service
            .inspect(|book| book.next_application_id())
            .expect("inspect"),
        ApplicationId::from("app-000002")
    );
}
