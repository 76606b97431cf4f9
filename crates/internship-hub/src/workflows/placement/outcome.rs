use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{ApplicationStatus, InternshipLevel, InternshipStatus};

/// Result of a business action: either the effect was applied or a rule refused it.
///
/// Refusals are expected outcomes, not faults, so they are never carried in an `Err`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome<T> {
    Applied(T),
    Refused(Refusal),
}

impl<T> Outcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(value) => Some(value),
            Outcome::Refused(_) => None,
        }
    }

    pub fn refusal(&self) -> Option<&Refusal> {
        match self {
            Outcome::Applied(_) => None,
            Outcome::Refused(refusal) => Some(refusal),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Applied(value) => Outcome::Applied(f(value)),
            Outcome::Refused(refusal) => Outcome::Refused(refusal),
        }
    }
}

impl<T> From<Refusal> for Outcome<T> {
    fn from(refusal: Refusal) -> Self {
        Outcome::Refused(refusal)
    }
}

/// Why a student may not apply to a posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Ineligibility {
    PostingNotOpen {
        status: InternshipStatus,
        visible: bool,
    },
    NoCapacity,
    OutsideApplicationWindow {
        opens: NaiveDate,
        closes: NaiveDate,
    },
    LevelRestricted {
        level: InternshipLevel,
        year_of_study: u8,
    },
    MajorMismatch {
        preferred_major: String,
    },
    ApplicationLimitReached {
        limit: usize,
    },
    DuplicateApplication,
}

impl Ineligibility {
    pub fn summary(&self) -> String {
        match self {
            Ineligibility::PostingNotOpen { status, visible } => format!(
                "posting is not open to applicants (status {}, {})",
                status.label(),
                if *visible { "visible" } else { "hidden" }
            ),
            Ineligibility::NoCapacity => "posting has no remaining slots".to_string(),
            Ineligibility::OutsideApplicationWindow { opens, closes } => {
                format!("applications are accepted from {opens} to {closes}")
            }
            Ineligibility::LevelRestricted {
                level,
                year_of_study,
            } => format!(
                "year {year_of_study} students may not apply to {} internships",
                level.label()
            ),
            Ineligibility::MajorMismatch { preferred_major } => {
                format!("posting prefers {preferred_major} majors")
            }
            Ineligibility::ApplicationLimitReached { limit } => {
                format!("already holding {limit} active applications")
            }
            Ineligibility::DuplicateApplication => {
                "an application for this posting is already in progress".to_string()
            }
        }
    }
}

/// Business-rule refusals surfaced to the acting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum Refusal {
    Ineligible(Ineligibility),
    NotOwner,
    RepresentativeNotApproved,
    InvalidApplicationState {
        status: ApplicationStatus,
        action: &'static str,
    },
    NoCapacity,
    OfferAlreadyAccepted,
    WithdrawalNotRequested,
    AlreadyReviewed,
    PostingLimitReached {
        limit: usize,
    },
    SlotsOutOfRange {
        max: u8,
        found: u8,
    },
    ClosingBeforeOpening,
    PostingLocked {
        status: InternshipStatus,
    },
    PostingHasApplications,
    VisibilityNotAllowed {
        status: InternshipStatus,
    },
    DuplicateId,
    InvalidYearOfStudy,
    InvalidCredentials,
    BlankPassword,
}

impl Refusal {
    pub fn summary(&self) -> String {
        match self {
            Refusal::Ineligible(reason) => format!("not eligible: {}", reason.summary()),
            Refusal::NotOwner => "only the owning representative may act on this".to_string(),
            Refusal::RepresentativeNotApproved => {
                "representative account is awaiting staff approval".to_string()
            }
            Refusal::InvalidApplicationState { status, action } => {
                format!("cannot {action} an application that is {}", status.label())
            }
            Refusal::NoCapacity => "internship has no remaining slots".to_string(),
            Refusal::OfferAlreadyAccepted => "offer has already been accepted".to_string(),
            Refusal::WithdrawalNotRequested => "no withdrawal request is pending".to_string(),
            Refusal::AlreadyReviewed => "item is no longer awaiting review".to_string(),
            Refusal::PostingLimitReached { limit } => {
                format!("representatives may own at most {limit} postings")
            }
            Refusal::SlotsOutOfRange { max, found } => {
                format!("slots must be between 1 and {max} (got {found})")
            }
            Refusal::ClosingBeforeOpening => {
                "closing date must not precede opening date".to_string()
            }
            Refusal::PostingLocked { status } => {
                format!("posting can no longer be changed ({})", status.label())
            }
            Refusal::PostingHasApplications => "posting already has applications".to_string(),
            Refusal::VisibilityNotAllowed { status } => {
                format!("a {} posting cannot be made visible", status.label())
            }
            Refusal::DuplicateId => "an account with this id already exists".to_string(),
            Refusal::InvalidYearOfStudy => "year of study must be at least 1".to_string(),
            Refusal::InvalidCredentials => "invalid id or password".to_string(),
            Refusal::BlankPassword => "new password must not be blank".to_string(),
        }
    }
}

impl From<Ineligibility> for Refusal {
    fn from(reason: Ineligibility) -> Self {
        Refusal::Ineligible(reason)
    }
}
