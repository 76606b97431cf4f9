//! Placement workflow core: the application state machine, capacity ledger, eligibility rules,
//! staff review queues, and role-scoped filters.

mod accounts;
pub mod book;
pub mod domain;
pub mod eligibility;
pub mod filter;
mod ledger;
pub mod lifecycle;
pub mod outcome;
pub mod policy;
mod postings;
pub mod review;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use book::{PlacementBook, UnitOfWork};
pub use domain::{
    Actor, Application, ApplicationId, ApplicationStatus, CompanyRepresentative, Internship,
    InternshipId, InternshipLevel, InternshipStatus, PostingDraft, RepresentativeId,
    RepresentativeRegistration, Staff, StaffId, Student, StudentId, UnknownVariant,
};
pub use eligibility::{can_apply, check_accept, check_apply, level_allows, ApplicantStanding};
pub use filter::{
    Choice, ClosingSort, DateRange, PlacementFilter, RepresentativeFilter, StaffFilter,
    StudentFilter, Visibility,
};
pub use lifecycle::Acceptance;
pub use outcome::{Ineligibility, Outcome, Refusal};
pub use policy::PlacementPolicy;
pub use router::placement_router;
pub use service::{PlacementError, PlacementService};
