use std::collections::BTreeSet;

use super::common::*;

use crate::storage::{Entity, MemoryStore, Record};
use crate::workflows::placement::book::PlacementBook;
use crate::workflows::placement::domain::{
    ApplicationStatus, Internship, InternshipLevel, InternshipStatus, RepresentativeId, StaffId,
    StudentId,
};
use crate::workflows::placement::filter::{
    Choice, ClosingSort, DateRange, PlacementFilter, RepresentativeFilter, StaffFilter,
    StudentFilter, Visibility,
};

fn book_of(records: Vec<Record>) -> PlacementBook {
    PlacementBook::load(&MemoryStore::with_records(records)).expect("load book")
}

fn ids(listed: &[&Internship]) -> Vec<String> {
    listed.iter().map(|posting| posting.id.to_string()).collect()
}

fn staff_ids(book: &PlacementBook, filter: &StaffFilter) -> Vec<String> {
    ids(&filter.apply(book))
}

#[test]
fn students_only_see_visible_approved_postings_sorted_by_title() {
    let mut records = seed_records();
    let mut hidden = internship(PostingFixture {
        id: "int-000005",
        title: "Aardvark Intern",
        ..PostingFixture::default()
    });
    hidden.visible = false;
    records.push(hidden.into_record());
    let book = book_of(records);

    let listed = StudentFilter::default().apply(book.internships());
    assert_eq!(ids(&listed), vec!["int-000003", "int-000002", "int-000001"]);
}

#[test]
fn closing_sort_orders_by_deadline_in_either_direction() {
    let book = book_of(seed_records());

    let soonest = StudentFilter {
        closing_sort: ClosingSort::Soonest,
        ..StudentFilter::default()
    };
    assert_eq!(
        ids(&soonest.apply(book.internships())),
        vec!["int-000002", "int-000001", "int-000003"]
    );

    let latest = StudentFilter {
        closing_sort: ClosingSort::Latest,
        ..StudentFilter::default()
    };
    assert_eq!(
        ids(&latest.apply(book.internships())),
        vec!["int-000003", "int-000001", "int-000002"]
    );
}

#[test]
fn student_criteria_combine() {
    let book = book_of(seed_records());

    let advanced = StudentFilter {
        level: Choice::only(InternshipLevel::Advanced),
        ..StudentFilter::default()
    };
    assert_eq!(ids(&advanced.apply(book.internships())), vec!["int-000002"]);

    let biology = StudentFilter {
        preferred_major: Choice::only("biology".to_string()),
        ..StudentFilter::default()
    };
    assert_eq!(
        ids(&biology.apply(book.internships())),
        vec!["int-000002", "int-000001"]
    );

    let finance_at_acme = StudentFilter {
        company: Choice::only(" ACME ".to_string()),
        preferred_major: Choice::only("Finance".to_string()),
        ..StudentFilter::default()
    };
    assert_eq!(finance_at_acme.apply(book.internships()).len(), 3);

    let globex = StudentFilter {
        company: Choice::only("Globex".to_string()),
        ..StudentFilter::default()
    };
    assert!(globex.apply(book.internships()).is_empty());

    let pending = StudentFilter {
        status: Choice::only(InternshipStatus::Pending),
        ..StudentFilter::default()
    };
    assert!(pending.apply(book.internships()).is_empty());
}

#[test]
fn applying_a_filter_twice_changes_nothing() {
    let book = book_of(seed_records());
    let filter = StudentFilter {
        preferred_major: Choice::only("Business".to_string()),
        closing_sort: ClosingSort::Latest,
        ..StudentFilter::default()
    };

    let once = filter.apply(book.internships());
    let twice = filter.apply(once.iter().copied());
    assert_eq!(once, twice);
}

#[test]
fn unset_criteria_match_the_default_filter() {
    let book = book_of(seed_records());
    let explicit: StudentFilter = serde_json::from_value(serde_json::json!({
        "level": null,
        "company": null,
        "status": null,
        "preferred_major": null,
    }))
    .expect("filter json");
    assert_eq!(explicit, StudentFilter::default());
    assert_eq!(
        explicit.apply(book.internships()),
        StudentFilter::default().apply(book.internships())
    );

    let staff: StaffFilter = serde_json::from_str("{}").expect("staff filter");
    assert_eq!(staff_ids(&book, &staff).len(), 4);
}

#[test]
fn representatives_only_list_their_company() {
    let mut records = seed_records();
    records.push(
        internship(PostingFixture {
            id: "int-000005",
            title: "Globex Intern",
            representative: "hr@globex.test",
            company: "Globex",
            ..PostingFixture::default()
        })
        .into_record(),
    );
    let book = book_of(records);

    let everything = RepresentativeFilter::default().apply("acme", book.internships());
    assert_eq!(
        ids(&everything),
        vec!["int-000003", "int-000004", "int-000002", "int-000001"]
    );

    let hidden = RepresentativeFilter {
        visibility: Choice::only(Visibility::Hidden),
        ..RepresentativeFilter::default()
    };
    assert_eq!(ids(&hidden.apply("Acme", book.internships())), vec!["int-000004"]);

    let globex = RepresentativeFilter {
        status: Choice::only(InternshipStatus::Approved),
        ..RepresentativeFilter::default()
    };
    assert_eq!(ids(&globex.apply("Globex", book.internships())), vec!["int-000005"]);
}

#[test]
fn representative_listing_goes_through_the_service() {
    let (service, _) = build_service();
    let listed = service
        .representative_internships(
            &RepresentativeId::from("hr@acme.test"),
            &RepresentativeFilter {
                level: Choice::only(InternshipLevel::Basic),
                ..RepresentativeFilter::default()
            },
        )
        .expect("list");
    let titles: Vec<_> = listed.iter().map(|posting| posting.title.as_str()).collect();
    assert_eq!(titles, vec!["Draft Posting", "Platform Intern"]);

    let student_view = service
        .student_internships(&StudentId::from("U2"), &StudentFilter::default())
        .expect("student list");
    assert_eq!(student_view.len(), 3);
}

#[test]
fn staff_filters_accept_sets_of_values() {
    let book = book_of(seed_records());

    let approved = StaffFilter {
        statuses: BTreeSet::from([InternshipStatus::Approved]),
        ..StaffFilter::default()
    };
    assert_eq!(
        staff_ids(&book, &approved),
        vec!["int-000001", "int-000002", "int-000003"]
    );

    let basic_or_advanced = StaffFilter {
        levels: BTreeSet::from([InternshipLevel::Basic, InternshipLevel::Advanced]),
        ..StaffFilter::default()
    };
    assert_eq!(
        staff_ids(&book, &basic_or_advanced),
        vec!["int-000001", "int-000002", "int-000004"]
    );

    let biology = StaffFilter {
        majors: vec!["Biology".to_string(), "Physics".to_string()],
        ..StaffFilter::default()
    };
    assert_eq!(
        staff_ids(&book, &biology),
        vec!["int-000001", "int-000002", "int-000004"]
    );

    let companies = StaffFilter {
        companies: vec!["Globex".to_string(), "acme".to_string()],
        ..StaffFilter::default()
    };
    assert_eq!(staff_ids(&book, &companies).len(), 4);
}

#[test]
fn company_names_are_never_split_into_parts() {
    let mut records = seed_records();
    records.push(
        internship(PostingFixture {
            id: "int-000005",
            title: "Tooling Intern",
            company: "Tech-Corp",
            ..PostingFixture::default()
        })
        .into_record(),
    );
    let book = book_of(records);

    let partial = StudentFilter {
        company: Choice::only("Tech".to_string()),
        ..StudentFilter::default()
    };
    assert!(partial.apply(book.internships()).is_empty());

    let whole = StudentFilter {
        company: Choice::only(" tech-corp ".to_string()),
        ..StudentFilter::default()
    };
    assert_eq!(ids(&whole.apply(book.internships())), vec!["int-000005"]);

    let suffix = StaffFilter {
        companies: vec!["Corp".to_string()],
        ..StaffFilter::default()
    };
    assert!(staff_ids(&book, &suffix).is_empty());

    let exact = StaffFilter {
        companies: vec!["TECH-CORP".to_string()],
        ..StaffFilter::default()
    };
    assert_eq!(staff_ids(&book, &exact), vec!["int-000005"]);
}

#[test]
fn staff_filters_on_placement_and_demand() {
    let mut records = seed_records();
    records.retain(|record| record.key() != "int-000002");
    let mut full = internship(PostingFixture {
        id: "int-000002",
        title: "ML Research Intern",
        slots: 1,
        status: InternshipStatus::Filled,
        ..PostingFixture::default()
    });
    full.accepted_count = 1;
    records.push(full.into_record());
    for (id, student, status) in [
        ("app-000001", "U1", ApplicationStatus::Pending),
        ("app-000002", "U3", ApplicationStatus::Unsuccessful),
        ("app-000003", "U2", ApplicationStatus::Withdrawn),
    ] {
        records.push(application(id, student, "int-000001", status).into_record());
    }
    let book = book_of(records);

    let filled = StaffFilter {
        placement: PlacementFilter::Filled,
        ..StaffFilter::default()
    };
    assert_eq!(staff_ids(&book, &filled), vec!["int-000002"]);

    let unfilled = StaffFilter {
        placement: PlacementFilter::Unfilled,
        ..StaffFilter::default()
    };
    assert_eq!(
        staff_ids(&book, &unfilled),
        vec!["int-000001", "int-000003", "int-000004"]
    );

    let popular = StaffFilter {
        min_applications: Some(2),
        ..StaffFilter::default()
    };
    assert_eq!(staff_ids(&book, &popular), vec!["int-000001"]);

    let too_popular = StaffFilter {
        min_applications: Some(3),
        ..StaffFilter::default()
    };
    assert!(staff_ids(&book, &too_popular).is_empty());
}

#[test]
fn staff_date_ranges_are_inclusive() {
    let book = book_of(seed_records());

    let closing_late = StaffFilter {
        closing: DateRange {
            from: Some(date(2026, 3, 31)),
            to: Some(date(2026, 4, 30)),
        },
        ..StaffFilter::default()
    };
    assert_eq!(
        staff_ids(&book, &closing_late),
        vec!["int-000001", "int-000003", "int-000004"]
    );

    let opened_later = StaffFilter {
        opening: DateRange {
            from: Some(date(2026, 2, 2)),
            to: None,
        },
        ..StaffFilter::default()
    };
    assert!(staff_ids(&book, &opened_later).is_empty());
}

#[test]
fn staff_listing_requires_a_staff_account() {
    let (service, _) = build_service();
    let listed = service
        .staff_internships(&StaffId::from("staff-1"), &StaffFilter::default())
        .expect("list");
    assert_eq!(listed.len(), 4);
    assert!(service
        .staff_internships(&StaffId::from("U1"), &StaffFilter::default())
        .is_err());
}
