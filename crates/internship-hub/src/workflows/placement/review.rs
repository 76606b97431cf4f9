//! Staff review of representative registrations, postings, and withdrawal requests.

use super::book::{PlacementBook, UnitOfWork};
use super::domain::{
    Application, CompanyRepresentative, Internship, InternshipId, InternshipStatus,
    RepresentativeId, Staff, StaffId,
};
use super::outcome::{Outcome, Refusal};
use super::service::PlacementError;

fn pending_representative(
    work: &UnitOfWork<'_>,
    staff_id: &StaffId,
    representative_id: &RepresentativeId,
) -> Result<Result<CompanyRepresentative, Refusal>, PlacementError> {
    let book = work.book();
    book.require::<Staff>(staff_id.as_str())?;
    let representative =
        book.require::<CompanyRepresentative>(representative_id.as_str())?;
    if representative.approved {
        return Ok(Err(Refusal::AlreadyReviewed));
    }
    Ok(Ok(representative.clone()))
}

pub(crate) fn approve_representative(
    work: &mut UnitOfWork<'_>,
    staff_id: &StaffId,
    representative_id: &RepresentativeId,
) -> Result<Outcome<CompanyRepresentative>, PlacementError> {
    let mut representative = match pending_representative(work, staff_id, representative_id)? {
        Ok(representative) => representative,
        Err(refusal) => return Ok(refusal.into()),
    };

    representative.approved = true;
    work.save(representative.clone());
    Ok(Outcome::Applied(representative))
}

/// Rejected registrations are deleted rather than flagged.
pub(crate) fn reject_representative(
    work: &mut UnitOfWork<'_>,
    staff_id: &StaffId,
    representative_id: &RepresentativeId,
) -> Result<Outcome<CompanyRepresentative>, PlacementError> {
    let representative = match pending_representative(work, staff_id, representative_id)? {
        Ok(representative) => representative,
        Err(refusal) => return Ok(refusal.into()),
    };

    work.remove::<CompanyRepresentative>(representative.id.as_str());
    Ok(Outcome::Applied(representative))
}

fn pending_posting(
    work: &UnitOfWork<'_>,
    staff_id: &StaffId,
    internship_id: &InternshipId,
) -> Result<Result<Internship, Refusal>, PlacementError> {
    let book = work.book();
    book.require::<Staff>(staff_id.as_str())?;
    let internship = book.require::<Internship>(internship_id.as_str())?;
    if internship.status != InternshipStatus::Pending {
        return Ok(Err(Refusal::AlreadyReviewed));
    }
    Ok(Ok(internship.clone()))
}

pub(crate) fn approve_posting(
    work: &mut UnitOfWork<'_>,
    staff_id: &StaffId,
    internship_id: &InternshipId,
) -> Result<Outcome<Internship>, PlacementError> {
    let mut internship = match pending_posting(work, staff_id, internship_id)? {
        Ok(internship) => internship,
        Err(refusal) => return Ok(refusal.into()),
    };

    internship.status = InternshipStatus::Approved;
    internship.visible = true;
    work.save(internship.clone());
    Ok(Outcome::Applied(internship))
}

pub(crate) fn reject_posting(
    work: &mut UnitOfWork<'_>,
    staff_id: &StaffId,
    internship_id: &InternshipId,
) -> Result<Outcome<Internship>, PlacementError> {
    let mut internship = match pending_posting(work, staff_id, internship_id)? {
        Ok(internship) => internship,
        Err(refusal) => return Ok(refusal.into()),
    };

    internship.status = InternshipStatus::Rejected;
    internship.visible = false;
    work.save(internship.clone());
    Ok(Outcome::Applied(internship))
}

pub fn pending_representatives(book: &PlacementBook) -> Vec<&CompanyRepresentative> {
    book.representatives()
        .filter(|representative| !representative.approved)
        .collect()
}

pub fn pending_postings(book: &PlacementBook) -> Vec<&Internship> {
    book.internships()
        .filter(|internship| internship.status == InternshipStatus::Pending)
        .collect()
}

pub fn pending_withdrawals(book: &PlacementBook) -> Vec<&Application> {
    book.applications()
        .filter(|application| application.withdraw_requested)
        .collect()
}
