//! Pure predicates gating who may apply to, and accept, which internship.

use chrono::NaiveDate;

use super::domain::{Application, ApplicationStatus, Internship, InternshipLevel, Student};
use super::filter::matching::major_admits;
use super::outcome::{Ineligibility, Refusal};
use super::policy::PlacementPolicy;

/// What the rules need to know about a student's existing applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplicantStanding {
    pub active_applications: usize,
    pub has_open_application: bool,
}

pub fn level_allows(policy: &PlacementPolicy, year_of_study: u8, level: InternshipLevel) -> bool {
    year_of_study > policy.junior_year_limit || level == InternshipLevel::Basic
}

/// Checks every apply clause in order, reporting the first one that fails.
pub fn check_apply(
    policy: &PlacementPolicy,
    student: &Student,
    internship: &Internship,
    standing: ApplicantStanding,
    today: NaiveDate,
) -> Result<(), Ineligibility> {
    if !internship.is_open_to_students() {
        return Err(Ineligibility::PostingNotOpen {
            status: internship.status,
            visible: internship.visible,
        });
    }

    if !internship.has_capacity() {
        return Err(Ineligibility::NoCapacity);
    }

    if !internship.is_accepting_on(today) {
        return Err(Ineligibility::OutsideApplicationWindow {
            opens: internship.opening_date,
            closes: internship.closing_date,
        });
    }

    if !level_allows(policy, student.year_of_study, internship.level) {
        return Err(Ineligibility::LevelRestricted {
            level: internship.level,
            year_of_study: student.year_of_study,
        });
    }

    if !major_admits(internship.preferred_major.as_deref(), &student.major) {
        return Err(Ineligibility::MajorMismatch {
            preferred_major: internship.preferred_major.clone().unwrap_or_default(),
        });
    }

    if standing.active_applications >= policy.max_active_applications {
        return Err(Ineligibility::ApplicationLimitReached {
            limit: policy.max_active_applications,
        });
    }

    if standing.has_open_application {
        return Err(Ineligibility::DuplicateApplication);
    }

    Ok(())
}

pub fn can_apply(
    policy: &PlacementPolicy,
    student: &Student,
    internship: &Internship,
    standing: ApplicantStanding,
    today: NaiveDate,
) -> bool {
    check_apply(policy, student, internship, standing, today).is_ok()
}

/// Accepting consumes a slot, so it needs a live offer that is not yet accepted and a free slot.
pub fn check_accept(application: &Application, internship: &Internship) -> Result<(), Refusal> {
    if application.status != ApplicationStatus::Successful {
        return Err(Refusal::InvalidApplicationState {
            status: application.status,
            action: "accept",
        });
    }

    if application.student_accepted {
        return Err(Refusal::OfferAlreadyAccepted);
    }

    if !internship.has_capacity() {
        return Err(Refusal::NoCapacity);
    }

    Ok(())
}
