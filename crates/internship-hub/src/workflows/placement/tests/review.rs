use super::common::*;

use crate::storage::{EntityStore, RecordKind};
use crate::workflows::placement::domain::{
    Actor, CompanyRepresentative, Internship, InternshipId, InternshipLevel, InternshipStatus,
    PostingDraft, RepresentativeId, RepresentativeRegistration, StaffId, StudentId,
};
use crate::workflows::placement::outcome::{Outcome, Refusal};
use crate::workflows::placement::PlacementError;

fn registration(id: &str) -> RepresentativeRegistration {
    RepresentativeRegistration {
        id: RepresentativeId::from(id),
        name: "Dana".to_string(),
        password: "hunter2".to_string(),
        company_name: "Umbrella".to_string(),
        department: "People".to_string(),
        position: "Talent Lead".to_string(),
        email: id.to_string(),
    }
}

fn draft(slots: u8) -> PostingDraft {
    PostingDraft {
        title: "Security Intern".to_string(),
        description: "Threat modelling".to_string(),
        level: InternshipLevel::Intermediate,
        preferred_major: Some("  Any ".to_string()),
        opening_date: date(2026, 3, 1),
        closing_date: date(2026, 4, 30),
        slots,
    }
}

fn staff_id() -> StaffId {
    StaffId::from("staff-1")
}

fn acme() -> RepresentativeId {
    RepresentativeId::from("hr@acme.test")
}

#[test]
fn registered_representatives_wait_for_staff_approval() {
    let (service, _) = build_service();
    let id = RepresentativeId::from("hr@umbrella.test");

    let created = match service.register_representative(registration(id.as_str())) {
        Ok(Outcome::Applied(representative)) => representative,
        other => panic!("expected registration, got {other:?}"),
    };
    assert!(!created.approved);
    assert!(matches!(
        service.login(id.as_str(), "hunter2"),
        Ok(Outcome::Refused(Refusal::RepresentativeNotApproved))
    ));

    let pending = service.pending_representatives(&staff_id()).expect("queue");
    let pending_ids: Vec<_> = pending.iter().map(|rep| rep.id.as_str()).collect();
    assert_eq!(pending_ids, vec!["hr@globex.test", "hr@umbrella.test"]);

    assert!(service
        .approve_representative(&staff_id(), &id)
        .expect("approve")
        .is_applied());
    assert_eq!(
        service.login(id.as_str(), "hunter2").expect("login"),
        Outcome::Applied(Actor::Representative(id.clone()))
    );
    assert_eq!(
        service
            .approve_representative(&staff_id(), &id)
            .expect("second review")
            .refusal(),
        Some(&Refusal::AlreadyReviewed)
    );
}

#[test]
fn rejected_registrations_are_deleted() {
    let (service, store) = build_service();
    let globex = RepresentativeId::from("hr@globex.test");

    assert!(service
        .reject_representative(&staff_id(), &globex)
        .expect("reject")
        .is_applied());

    let stored: Option<CompanyRepresentative> = store.find(globex.as_str()).expect("find");
    assert_eq!(stored, None);
    match service.approve_representative(&staff_id(), &globex) {
        Err(PlacementError::NotFound {
            kind: RecordKind::Representative,
            ..
        }) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn duplicate_accounts_and_bad_students_are_refused() {
    let (service, _) = build_service();

    assert_eq!(
        service
            .register_student(student("staff-1", "Math", 2))
            .expect("register")
            .refusal(),
        Some(&Refusal::DuplicateId)
    );
    assert_eq!(
        service
            .register_student(student("U7", "Math", 0))
            .expect("register")
            .refusal(),
        Some(&Refusal::InvalidYearOfStudy)
    );
    assert!(service
        .register_student(student("U7", "Math", 2))
        .expect("register")
        .is_applied());
}

#[test]
fn login_and_password_change() {
    let (service, _) = build_service();

    assert_eq!(
        service.login("U1", "password").expect("login"),
        Outcome::Applied(Actor::Student(StudentId::from("U1")))
    );
    assert_eq!(
        service.login("U1", "wrong").expect("login").refusal(),
        Some(&Refusal::InvalidCredentials)
    );
    assert_eq!(
        service.login("nobody", "password").expect("login").refusal(),
        Some(&Refusal::InvalidCredentials)
    );

    let actor = Actor::Staff(staff_id());
    assert_eq!(
        service
            .change_password(&actor, "wrong", "s3cret")
            .expect("change")
            .refusal(),
        Some(&Refusal::InvalidCredentials)
    );
    assert_eq!(
        service
            .change_password(&actor, "password", "   ")
            .expect("change")
            .refusal(),
        Some(&Refusal::BlankPassword)
    );
    assert!(service
        .change_password(&actor, "password", "s3cret")
        .expect("change")
        .is_applied());
    assert_eq!(
        service.login("staff-1", "s3cret").expect("login"),
        Outcome::Applied(actor)
    );
}

#[test]
fn new_postings_start_pending_and_hidden_until_reviewed() {
    let (service, store) = build_service();

    let posting = match service.create_posting(&acme(), draft(4)) {
        Ok(Outcome::Applied(posting)) => posting,
        other => panic!("expected posting, got {other:?}"),
    };
    assert_eq!(posting.id.as_str(), "int-000005");
    assert_eq!(posting.status, InternshipStatus::Pending);
    assert!(!posting.visible);
    assert_eq!(posting.company_name, "Acme");
    assert_eq!(posting.preferred_major, None);

    let queue = service.pending_postings(&staff_id()).expect("queue");
    let queued: Vec<_> = queue.iter().map(|posting| posting.id.as_str()).collect();
    assert_eq!(queued, vec!["int-000004", "int-000005"]);

    let approved = match service.approve_posting(&staff_id(), &posting.id) {
        Ok(Outcome::Applied(posting)) => posting,
        other => panic!("expected approval, got {other:?}"),
    };
    assert_eq!(approved.status, InternshipStatus::Approved);
    assert!(approved.visible);

    let rejected = match service.reject_posting(&staff_id(), &InternshipId::from("int-000004")) {
        Ok(Outcome::Applied(posting)) => posting,
        other => panic!("expected rejection, got {other:?}"),
    };
    assert_eq!(rejected.status, InternshipStatus::Rejected);
    assert!(!rejected.visible);
    assert_eq!(
        service
            .reject_posting(&staff_id(), &InternshipId::from("int-000004"))
            .expect("second review")
            .refusal(),
        Some(&Refusal::AlreadyReviewed)
    );

    let stored: Vec<Internship> = store.load_all().expect("load");
    assert_eq!(stored.len(), 5);
}

#[test]
fn posting_constraints_are_enforced() {
    let (service, _) = build_service();

    assert_eq!(
        service
            .create_posting(&acme(), draft(0))
            .expect("create")
            .refusal(),
        Some(&Refusal::SlotsOutOfRange { max: 10, found: 0 })
    );
    assert_eq!(
        service
            .create_posting(&acme(), draft(11))
            .expect("create")
            .refusal(),
        Some(&Refusal::SlotsOutOfRange { max: 10, found: 11 })
    );

    let mut backwards = draft(2);
    backwards.closing_date = date(2026, 2, 1);
    assert_eq!(
        service
            .create_posting(&acme(), backwards)
            .expect("create")
            .refusal(),
        Some(&Refusal::ClosingBeforeOpening)
    );

    assert!(service
        .create_posting(&acme(), draft(10))
        .expect("fifth posting")
        .is_applied());
    assert_eq!(
        service
            .create_posting(&acme(), draft(1))
            .expect("sixth posting")
            .refusal(),
        Some(&Refusal::PostingLimitReached { limit: 5 })
    );

    assert_eq!(
        service
            .create_posting(&RepresentativeId::from("hr@globex.test"), draft(1))
            .expect("create")
            .refusal(),
        Some(&Refusal::RepresentativeNotApproved)
    );
}

#[test]
fn postings_are_editable_only_before_review() {
    let (service, _) = build_service();
    let pending = InternshipId::from("int-000004");
    let approved = InternshipId::from("int-000001");

    let updated = match service.update_posting(&acme(), &pending, draft(3)) {
        Ok(Outcome::Applied(posting)) => posting,
        other => panic!("expected update, got {other:?}"),
    };
    assert_eq!(updated.title, "Security Intern");
    assert_eq!(updated.slots, 3);
    assert_eq!(updated.status, InternshipStatus::Pending);

    assert_eq!(
        service
            .update_posting(&acme(), &approved, draft(3))
            .expect("update")
            .refusal(),
        Some(&Refusal::PostingLocked {
            status: InternshipStatus::Approved
        })
    );
    assert_eq!(
        service
            .delete_posting(&acme(), &approved)
            .expect("delete")
            .refusal(),
        Some(&Refusal::PostingLocked {
            status: InternshipStatus::Approved
        })
    );
    assert!(service
        .delete_posting(&acme(), &pending)
        .expect("delete")
        .is_applied());
    assert!(service.pending_postings(&staff_id()).expect("queue").is_empty());
}

#[test]
fn visibility_is_gated_by_review_status() {
    let (service, _) = build_service();
    let approved = InternshipId::from("int-000001");
    let pending = InternshipId::from("int-000004");

    let hidden = match service.set_visibility(&acme(), &approved, false) {
        Ok(Outcome::Applied(posting)) => posting,
        other => panic!("expected hide, got {other:?}"),
    };
    assert!(!hidden.visible);
    assert!(service
        .student_internships(&StudentId::from("U1"), &Default::default())
        .expect("search")
        .iter()
        .all(|posting| posting.id != approved));

    assert_eq!(
        service
            .set_visibility(&acme(), &pending, true)
            .expect("show")
            .refusal(),
        Some(&Refusal::VisibilityNotAllowed {
            status: InternshipStatus::Pending
        })
    );
    assert!(service
        .set_visibility(&acme(), &approved, true)
        .expect("show")
        .is_applied());
}

#[test]
fn withdrawal_queue_lists_pending_requests() {
    let (service, _) = build_service();
    let student = StudentId::from("U1");
    let first = service
        .apply(&student, &InternshipId::from("int-000001"), today())
        .expect("apply")
        .applied()
        .expect("applied");
    service
        .apply(&student, &InternshipId::from("int-000002"), today())
        .expect("apply");
    service
        .request_withdrawal(&student, &first.id)
        .expect("request");

    let queue = service.pending_withdrawals(&staff_id()).expect("queue");
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].id, first.id);

    match service.pending_withdrawals(&StaffId::from("staff-404")) {
        Err(PlacementError::NotFound {
            kind: RecordKind::Staff,
            ..
        }) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}
