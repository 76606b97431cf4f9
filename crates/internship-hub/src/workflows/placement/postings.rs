//! Representative-side posting management.

use super::book::UnitOfWork;
use super::domain::{
    CompanyRepresentative, Internship, InternshipId, InternshipStatus, PostingDraft,
    RepresentativeId,
};
use super::filter::matching::is_unrestricted;
use super::outcome::{Outcome, Refusal};
use super::policy::PlacementPolicy;
use super::service::PlacementError;

fn validate_draft(policy: &PlacementPolicy, draft: &PostingDraft) -> Result<(), Refusal> {
    if draft.slots == 0 || draft.slots > policy.max_slots {
        return Err(Refusal::SlotsOutOfRange {
            max: policy.max_slots,
            found: draft.slots,
        });
    }
    if draft.closing_date < draft.opening_date {
        return Err(Refusal::ClosingBeforeOpening);
    }
    Ok(())
}

/// Blank or "any" majors are stored as no preference.
fn preferred_major(draft: &PostingDraft) -> Option<String> {
    let preferred = draft.preferred_major.as_deref();
    if is_unrestricted(preferred) {
        None
    } else {
        preferred.map(|major| major.trim().to_string())
    }
}

fn approved_representative<'w>(
    work: &'w UnitOfWork<'_>,
    representative_id: &RepresentativeId,
) -> Result<Result<&'w CompanyRepresentative, Refusal>, PlacementError> {
    let representative = work
        .book()
        .require::<CompanyRepresentative>(representative_id.as_str())?;
    if representative.approved {
        Ok(Ok(representative))
    } else {
        Ok(Err(Refusal::RepresentativeNotApproved))
    }
}

fn owned_posting(
    work: &UnitOfWork<'_>,
    representative_id: &RepresentativeId,
    internship_id: &InternshipId,
) -> Result<Result<Internship, Refusal>, PlacementError> {
    let representative = match approved_representative(work, representative_id)? {
        Ok(representative) => representative,
        Err(refusal) => return Ok(Err(refusal)),
    };
    let internship = work
        .book()
        .require::<Internship>(internship_id.as_str())?;
    if internship.representative_id != representative.id {
        return Ok(Err(Refusal::NotOwner));
    }
    Ok(Ok(internship.clone()))
}

pub(crate) fn create_posting(
    work: &mut UnitOfWork<'_>,
    policy: &PlacementPolicy,
    representative_id: &RepresentativeId,
    draft: PostingDraft,
) -> Result<Outcome<Internship>, PlacementError> {
    let representative = match approved_representative(work, representative_id)? {
        Ok(representative) => representative,
        Err(refusal) => return Ok(refusal.into()),
    };

    let book = work.book();
    if book.postings_owned_by(&representative.id) >= policy.max_postings_per_representative {
        return Ok(Refusal::PostingLimitReached {
            limit: policy.max_postings_per_representative,
        }
        .into());
    }
    if let Err(refusal) = validate_draft(policy, &draft) {
        return Ok(refusal.into());
    }

    let internship = Internship {
        id: book.next_internship_id(),
        preferred_major: preferred_major(&draft),
        title: draft.title,
        description: draft.description,
        level: draft.level,
        opening_date: draft.opening_date,
        closing_date: draft.closing_date,
        status: InternshipStatus::Pending,
        company_name: representative.company_name.clone(),
        representative_id: representative.id.clone(),
        visible: false,
        slots: draft.slots,
        accepted_count: 0,
    };
    work.insert(internship.clone());
    Ok(Outcome::Applied(internship))
}

/// Edits are only allowed before staff review.
pub(crate) fn update_posting(
    work: &mut UnitOfWork<'_>,
    policy: &PlacementPolicy,
    representative_id: &RepresentativeId,
    internship_id: &InternshipId,
    draft: PostingDraft,
) -> Result<Outcome<Internship>, PlacementError> {
    let mut internship = match owned_posting(work, representative_id, internship_id)? {
        Ok(internship) => internship,
        Err(refusal) => return Ok(refusal.into()),
    };

    if internship.status != InternshipStatus::Pending {
        return Ok(Refusal::PostingLocked {
            status: internship.status,
        }
        .into());
    }
    if let Err(refusal) = validate_draft(policy, &draft) {
        return Ok(refusal.into());
    }

    internship.preferred_major = preferred_major(&draft);
    internship.title = draft.title;
    internship.description = draft.description;
    internship.level = draft.level;
    internship.opening_date = draft.opening_date;
    internship.closing_date = draft.closing_date;
    internship.slots = draft.slots;
    work.save(internship.clone());
    Ok(Outcome::Applied(internship))
}

pub(crate) fn delete_posting(
    work: &mut UnitOfWork<'_>,
    representative_id: &RepresentativeId,
    internship_id: &InternshipId,
) -> Result<Outcome<Internship>, PlacementError> {
    let internship = match owned_posting(work, representative_id, internship_id)? {
        Ok(internship) => internship,
        Err(refusal) => return Ok(refusal.into()),
    };

    if !matches!(
        internship.status,
        InternshipStatus::Pending | InternshipStatus::Rejected
    ) {
        return Ok(Refusal::PostingLocked {
            status: internship.status,
        }
        .into());
    }
    if work.book().applications_for(&internship.id).next().is_some() {
        return Ok(Refusal::PostingHasApplications.into());
    }

    work.remove::<Internship>(internship.id.as_str());
    Ok(Outcome::Applied(internship))
}

/// Hiding is always allowed; showing needs a posting that passed review.
pub(crate) fn set_visibility(
    work: &mut UnitOfWork<'_>,
    representative_id: &RepresentativeId,
    internship_id: &InternshipId,
    visible: bool,
) -> Result<Outcome<Internship>, PlacementError> {
    let mut internship = match owned_posting(work, representative_id, internship_id)? {
        Ok(internship) => internship,
        Err(refusal) => return Ok(refusal.into()),
    };

    if visible
        && !matches!(
            internship.status,
            InternshipStatus::Approved | InternshipStatus::Filled
        )
    {
        return Ok(Refusal::VisibilityNotAllowed {
            status: internship.status,
        }
        .into());
    }

    if internship.visible != visible {
        internship.visible = visible;
        work.save(internship.clone());
    }
    Ok(Outcome::Applied(internship))
}
