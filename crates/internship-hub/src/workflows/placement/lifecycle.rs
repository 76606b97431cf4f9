//! Application state machine.
//!
//! ```text
//! Pending ──approve──▶ Successful ──accept──▶ Successful + accepted
//!    │                     │                        │
//!    └──reject──▶ Unsuccessful                      │
//!    └──────── withdrawal approved ──▶ Withdrawn ◀──┘ (slot released)
//! ```
//!
//! Each transition reads the book, decides, and writes through the unit of work. A refusal
//! leaves the unit of work empty.

use chrono::NaiveDate;
use serde::Serialize;

use super::book::UnitOfWork;
use super::domain::{
    Application, ApplicationId, ApplicationStatus, CompanyRepresentative, Internship,
    InternshipId, RepresentativeId, Staff, StaffId, Student, StudentId,
};
use super::eligibility::{check_accept, check_apply};
use super::ledger;
use super::outcome::{Outcome, Refusal};
use super::policy::PlacementPolicy;
use super::service::PlacementError;

/// An accepted offer plus the applications it withdrew automatically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Acceptance {
    pub application: Application,
    pub internship: Internship,
    pub withdrawn: Vec<ApplicationId>,
}

pub(crate) fn apply(
    work: &mut UnitOfWork<'_>,
    policy: &PlacementPolicy,
    student_id: &StudentId,
    internship_id: &InternshipId,
    today: NaiveDate,
) -> Result<Outcome<Application>, PlacementError> {
    let book = work.book();
    let student = book.require::<Student>(student_id.as_str())?;
    let internship = book.require::<Internship>(internship_id.as_str())?;

    let standing = book.standing(&student.id, &internship.id);
    if let Err(reason) = check_apply(policy, student, internship, standing, today) {
        return Ok(Refusal::from(reason).into());
    }

    let application = Application {
        id: book.next_application_id(),
        student_id: student.id.clone(),
        internship_id: internship.id.clone(),
        status: ApplicationStatus::Pending,
        withdraw_requested: false,
        student_accepted: false,
        submitted_on: Some(today),
    };
    work.insert(application.clone());
    Ok(Outcome::Applied(application))
}

/// Loads an application on behalf of an approved representative who owns its posting.
fn owned_application(
    work: &UnitOfWork<'_>,
    representative_id: &RepresentativeId,
    application_id: &ApplicationId,
) -> Result<Result<(Application, Internship), Refusal>, PlacementError> {
    let book = work.book();
    let representative =
        book.require::<CompanyRepresentative>(representative_id.as_str())?;
    let application = book.require::<Application>(application_id.as_str())?;
    let internship = book.require::<Internship>(application.internship_id.as_str())?;

    if !representative.approved {
        return Ok(Err(Refusal::RepresentativeNotApproved));
    }
    if internship.representative_id != representative.id {
        return Ok(Err(Refusal::NotOwner));
    }

    Ok(Ok((application.clone(), internship.clone())))
}

pub(crate) fn approve(
    work: &mut UnitOfWork<'_>,
    representative_id: &RepresentativeId,
    application_id: &ApplicationId,
) -> Result<Outcome<Application>, PlacementError> {
    let (mut application, internship) =
        match owned_application(work, representative_id, application_id)? {
            Ok(found) => found,
            Err(refusal) => return Ok(refusal.into()),
        };

    if application.status != ApplicationStatus::Pending {
        return Ok(Refusal::InvalidApplicationState {
            status: application.status,
            action: "approve",
        }
        .into());
    }
    if !internship.has_capacity() {
        return Ok(Refusal::NoCapacity.into());
    }

    application.status = ApplicationStatus::Successful;
    work.save(application.clone());
    Ok(Outcome::Applied(application))
}

pub(crate) fn reject(
    work: &mut UnitOfWork<'_>,
    representative_id: &RepresentativeId,
    application_id: &ApplicationId,
) -> Result<Outcome<Application>, PlacementError> {
    let (mut application, _) = match owned_application(work, representative_id, application_id)? {
        Ok(found) => found,
        Err(refusal) => return Ok(refusal.into()),
    };

    if application.status == ApplicationStatus::Withdrawn {
        return Ok(Refusal::InvalidApplicationState {
            status: application.status,
            action: "reject",
        }
        .into());
    }
    // An accepted offer holds a slot; only an approved withdrawal may release it.
    if application.is_accepted_offer() {
        return Ok(Refusal::OfferAlreadyAccepted.into());
    }

    application.status = ApplicationStatus::Unsuccessful;
    work.save(application.clone());
    Ok(Outcome::Applied(application))
}

pub(crate) fn accept_offer(
    work: &mut UnitOfWork<'_>,
    student_id: &StudentId,
    application_id: &ApplicationId,
) -> Result<Outcome<Acceptance>, PlacementError> {
    let book = work.book();
    let student = book.require::<Student>(student_id.as_str())?;
    let application = book.require::<Application>(application_id.as_str())?;
    let internship = book.require::<Internship>(application.internship_id.as_str())?;

    if application.student_id != student.id {
        return Ok(Refusal::NotOwner.into());
    }
    if let Err(refusal) = check_accept(application, internship) {
        return Ok(refusal.into());
    }
    // A previously accepted offer is withdrawn below and gives its slot back.
    let released = book
        .accepted_offer(&student.id)
        .map(|held| book.require::<Internship>(held.internship_id.as_str()))
        .transpose()?
        .cloned();

    let mut application = application.clone();
    let mut internship = internship.clone();
    let others: Vec<Application> = book
        .applications_of(&student.id)
        .filter(|other| other.id != application.id && other.is_active())
        .cloned()
        .collect();

    if let Err(refusal) = ledger::accept_slot(&mut internship) {
        return Ok(refusal.into());
    }
    application.student_accepted = true;

    if let Some(mut previous) = released {
        ledger::release_slot(&mut previous);
        work.save(previous);
    }

    let mut withdrawn = Vec::with_capacity(others.len());
    for mut other in others {
        other.status = ApplicationStatus::Withdrawn;
        other.withdraw_requested = false;
        other.student_accepted = false;
        withdrawn.push(other.id.clone());
        work.save(other);
    }
    work.save(internship.clone());
    work.save(application.clone());

    Ok(Outcome::Applied(Acceptance {
        application,
        internship,
        withdrawn,
    }))
}

pub(crate) fn request_withdrawal(
    work: &mut UnitOfWork<'_>,
    student_id: &StudentId,
    application_id: &ApplicationId,
) -> Result<Outcome<Application>, PlacementError> {
    let book = work.book();
    let student = book.require::<Student>(student_id.as_str())?;
    let application = book.require::<Application>(application_id.as_str())?;

    if application.student_id != student.id {
        return Ok(Refusal::NotOwner.into());
    }
    if application.status == ApplicationStatus::Withdrawn {
        return Ok(Refusal::InvalidApplicationState {
            status: application.status,
            action: "withdraw",
        }
        .into());
    }

    let mut application = application.clone();
    if !application.withdraw_requested {
        application.withdraw_requested = true;
        work.save(application.clone());
    }
    Ok(Outcome::Applied(application))
}

fn requested_withdrawal(
    work: &UnitOfWork<'_>,
    staff_id: &StaffId,
    application_id: &ApplicationId,
) -> Result<Result<Application, Refusal>, PlacementError> {
    let book = work.book();
    book.require::<Staff>(staff_id.as_str())?;
    let application = book.require::<Application>(application_id.as_str())?;

    if !application.withdraw_requested {
        return Ok(Err(Refusal::WithdrawalNotRequested));
    }
    Ok(Ok(application.clone()))
}

pub(crate) fn approve_withdrawal(
    work: &mut UnitOfWork<'_>,
    staff_id: &StaffId,
    application_id: &ApplicationId,
) -> Result<Outcome<Application>, PlacementError> {
    let mut application = match requested_withdrawal(work, staff_id, application_id)? {
        Ok(application) => application,
        Err(refusal) => return Ok(refusal.into()),
    };

    if application.is_accepted_offer() {
        let mut internship = work
            .book()
            .require::<Internship>(application.internship_id.as_str())?
            .clone();
        ledger::release_slot(&mut internship);
        application.student_accepted = false;
        work.save(internship);
    }

    application.status = ApplicationStatus::Withdrawn;
    application.withdraw_requested = false;
    work.save(application.clone());
    Ok(Outcome::Applied(application))
}

pub(crate) fn reject_withdrawal(
    work: &mut UnitOfWork<'_>,
    staff_id: &StaffId,
    application_id: &ApplicationId,
) -> Result<Outcome<Application>, PlacementError> {
    let mut application = match requested_withdrawal(work, staff_id, application_id)? {
        Ok(application) => application,
        Err(refusal) => return Ok(refusal.into()),
    };

    application.withdraw_requested = false;
    work.save(application.clone());
    Ok(Outcome::Applied(application))
}
