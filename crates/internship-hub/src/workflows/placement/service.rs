use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use tracing::{debug, info};

use super::accounts;
use super::book::{PlacementBook, UnitOfWork};
use super::domain::{
    Actor, Application, ApplicationId, CompanyRepresentative, Internship, InternshipId,
    PostingDraft, RepresentativeId, RepresentativeRegistration, Staff, StaffId, Student,
    StudentId,
};
use super::filter::{RepresentativeFilter, StaffFilter, StudentFilter};
use super::lifecycle::{self, Acceptance};
use super::outcome::{Outcome, Refusal};
use super::policy::PlacementPolicy;
use super::postings;
use super::review;
use crate::storage::{PlacementStore, RecordKind, StoreError};

/// Service composing the placement book, the rule engine, and a record store.
///
/// One mutex serialises every transition; each runs in a unit of work whose changes reach the
/// store as a single changeset.
pub struct PlacementService<S> {
    store: Arc<S>,
    policy: PlacementPolicy,
    book: Mutex<PlacementBook>,
}

impl<S> PlacementService<S>
where
    S: PlacementStore + 'static,
{
    pub fn open(store: Arc<S>, policy: PlacementPolicy) -> Result<Self, PlacementError> {
        let book = PlacementBook::load(store.as_ref())?;
        info!(
            students = book.students().count(),
            representatives = book.representatives().count(),
            internships = book.internships().count(),
            applications = book.applications().count(),
            "placement book loaded"
        );

        Ok(Self {
            store,
            policy,
            book: Mutex::new(book),
        })
    }

    pub fn policy(&self) -> &PlacementPolicy {
        &self.policy
    }

    /// Replaces the in-memory book with the store's current contents.
    pub fn reload(&self) -> Result<(), PlacementError> {
        let fresh = PlacementBook::load(self.store.as_ref())?;
        *self.lock()? = fresh;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, PlacementBook>, PlacementError> {
        self.book.lock().map_err(|_| PlacementError::Poisoned)
    }

    fn transact<T>(
        &self,
        action: &'static str,
        actor: &str,
        operation: impl FnOnce(&mut UnitOfWork<'_>) -> Result<Outcome<T>, PlacementError>,
    ) -> Result<Outcome<T>, PlacementError> {
        let mut book = self.lock()?;
        let mut work = UnitOfWork::begin(&mut book);
        let outcome = operation(&mut work)?;

        match &outcome {
            Outcome::Applied(_) => {
                let changes = work.commit(self.store.as_ref())?;
                info!(action, actor, changes, "placement transition committed");
            }
            Outcome::Refused(refusal) => {
                work.rollback();
                debug!(action, actor, reason = %refusal.summary(), "placement action refused");
            }
        }

        Ok(outcome)
    }

    /// Runs a read-only query against the current book.
    pub fn inspect<T>(&self, query: impl FnOnce(&PlacementBook) -> T) -> Result<T, PlacementError> {
        let book = self.lock()?;
        Ok(query(&book))
    }

    fn inspect_as_staff<T>(
        &self,
        staff_id: &StaffId,
        query: impl FnOnce(&PlacementBook) -> T,
    ) -> Result<T, PlacementError> {
        let book = self.lock()?;
        book.require::<Staff>(staff_id.as_str())?;
        Ok(query(&book))
    }

    pub fn register_student(&self, student: Student) -> Result<Outcome<Student>, PlacementError> {
        let id = student.id.clone();
        self.transact("register_student", id.as_str(), |work| {
            Ok(accounts::register_student(work, student))
        })
    }

    pub fn register_representative(
        &self,
        registration: RepresentativeRegistration,
    ) -> Result<Outcome<CompanyRepresentative>, PlacementError> {
        let id = registration.id.clone();
        self.transact("register_representative", id.as_str(), |work| {
            Ok(accounts::register_representative(work, registration))
        })
    }

    pub fn login(&self, id: &str, password: &str) -> Result<Outcome<Actor>, PlacementError> {
        let outcome = self.inspect(|book| accounts::login(book, id, password))?;
        if let Outcome::Refused(refusal) = &outcome {
            debug!(actor = id, reason = %refusal.summary(), "login refused");
        }
        Ok(outcome)
    }

    pub fn change_password(
        &self,
        actor: &Actor,
        current: &str,
        replacement: &str,
    ) -> Result<Outcome<()>, PlacementError> {
        self.transact("change_password", actor.id(), |work| {
            Ok(accounts::change_password(work, actor, current, replacement))
        })
    }

    pub fn apply(
        &self,
        student_id: &StudentId,
        internship_id: &InternshipId,
        today: NaiveDate,
    ) -> Result<Outcome<Application>, PlacementError> {
        let policy = &self.policy;
        self.transact("apply", student_id.as_str(), |work| {
            lifecycle::apply(work, policy, student_id, internship_id, today)
        })
    }

    pub fn approve_application(
        &self,
        representative_id: &RepresentativeId,
        application_id: &ApplicationId,
    ) -> Result<Outcome<Application>, PlacementError> {
        self.transact("approve_application", representative_id.as_str(), |work| {
            lifecycle::approve(work, representative_id, application_id)
        })
    }

    pub fn reject_application(
        &self,
        representative_id: &RepresentativeId,
        application_id: &ApplicationId,
    ) -> Result<Outcome<Application>, PlacementError> {
        self.transact("reject_application", representative_id.as_str(), |work| {
            lifecycle::reject(work, representative_id, application_id)
        })
    }

    pub fn accept_offer(
        &self,
        student_id: &StudentId,
        application_id: &ApplicationId,
    ) -> Result<Outcome<Acceptance>, PlacementError> {
        self.transact("accept_offer", student_id.as_str(), |work| {
            lifecycle::accept_offer(work, student_id, application_id)
        })
    }

    pub fn request_withdrawal(
        &self,
        student_id: &StudentId,
        application_id: &ApplicationId,
    ) -> Result<Outcome<Application>, PlacementError> {
        self.transact("request_withdrawal", student_id.as_str(), |work| {
            lifecycle::request_withdrawal(work, student_id, application_id)
        })
    }

    pub fn approve_withdrawal(
        &self,
        staff_id: &StaffId,
        application_id: &ApplicationId,
    ) -> Result<Outcome<Application>, PlacementError> {
        self.transact("approve_withdrawal", staff_id.as_str(), |work| {
            lifecycle::approve_withdrawal(work, staff_id, application_id)
        })
    }

    pub fn reject_withdrawal(
        &self,
        staff_id: &StaffId,
        application_id: &ApplicationId,
    ) -> Result<Outcome<Application>, PlacementError> {
        self.transact("reject_withdrawal", staff_id.as_str(), |work| {
            lifecycle::reject_withdrawal(work, staff_id, application_id)
        })
    }

    pub fn create_posting(
        &self,
        representative_id: &RepresentativeId,
        draft: PostingDraft,
    ) -> Result<Outcome<Internship>, PlacementError> {
        let policy = &self.policy;
        self.transact("create_posting", representative_id.as_str(), |work| {
            postings::create_posting(work, policy, representative_id, draft)
        })
    }

    pub fn update_posting(
        &self,
        representative_id: &RepresentativeId,
        internship_id: &InternshipId,
        draft: PostingDraft,
    ) -> Result<Outcome<Internship>, PlacementError> {
        let policy = &self.policy;
        self.transact("update_posting", representative_id.as_str(), |work| {
            postings::update_posting(work, policy, representative_id, internship_id, draft)
        })
    }

    pub fn delete_posting(
        &self,
        representative_id: &RepresentativeId,
        internship_id: &InternshipId,
    ) -> Result<Outcome<Internship>, PlacementError> {
        self.transact("delete_posting", representative_id.as_str(), |work| {
            postings::delete_posting(work, representative_id, internship_id)
        })
    }

    pub fn set_visibility(
        &self,
        representative_id: &RepresentativeId,
        internship_id: &InternshipId,
        visible: bool,
    ) -> Result<Outcome<Internship>, PlacementError> {
        self.transact("set_visibility", representative_id.as_str(), |work| {
            postings::set_visibility(work, representative_id, internship_id, visible)
        })
    }

    pub fn approve_representative(
        &self,
        staff_id: &StaffId,
        representative_id: &RepresentativeId,
    ) -> Result<Outcome<CompanyRepresentative>, PlacementError> {
        self.transact("approve_representative", staff_id.as_str(), |work| {
            review::approve_representative(work, staff_id, representative_id)
        })
    }

    pub fn reject_representative(
        &self,
        staff_id: &StaffId,
        representative_id: &RepresentativeId,
    ) -> Result<Outcome<CompanyRepresentative>, PlacementError> {
        self.transact("reject_representative", staff_id.as_str(), |work| {
            review::reject_representative(work, staff_id, representative_id)
        })
    }

    pub fn approve_posting(
        &self,
        staff_id: &StaffId,
        internship_id: &InternshipId,
    ) -> Result<Outcome<Internship>, PlacementError> {
        self.transact("approve_posting", staff_id.as_str(), |work| {
            review::approve_posting(work, staff_id, internship_id)
        })
    }

    pub fn reject_posting(
        &self,
        staff_id: &StaffId,
        internship_id: &InternshipId,
    ) -> Result<Outcome<Internship>, PlacementError> {
        self.transact("reject_posting", staff_id.as_str(), |work| {
            review::reject_posting(work, staff_id, internship_id)
        })
    }

    pub fn student_internships(
        &self,
        student_id: &StudentId,
        filter: &StudentFilter,
    ) -> Result<Vec<Internship>, PlacementError> {
        let book = self.lock()?;
        book.require::<Student>(student_id.as_str())?;
        Ok(filter.apply(book.internships()).into_iter().cloned().collect())
    }

    pub fn representative_internships(
        &self,
        representative_id: &RepresentativeId,
        filter: &RepresentativeFilter,
    ) -> Result<Vec<Internship>, PlacementError> {
        let book = self.lock()?;
        let representative =
            book.require::<CompanyRepresentative>(representative_id.as_str())?;
        Ok(filter
            .apply(&representative.company_name, book.internships())
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn staff_internships(
        &self,
        staff_id: &StaffId,
        filter: &StaffFilter,
    ) -> Result<Vec<Internship>, PlacementError> {
        self.inspect_as_staff(staff_id, |book| {
            filter.apply(book).into_iter().cloned().collect()
        })
    }

    pub fn student_applications(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<Application>, PlacementError> {
        let book = self.lock()?;
        book.require::<Student>(student_id.as_str())?;
        Ok(book.applications_of(student_id).cloned().collect())
    }

    /// Applications for a posting, visible only to its owning representative.
    pub fn internship_applications(
        &self,
        representative_id: &RepresentativeId,
        internship_id: &InternshipId,
    ) -> Result<Outcome<Vec<Application>>, PlacementError> {
        let book = self.lock()?;
        let representative =
            book.require::<CompanyRepresentative>(representative_id.as_str())?;
        let internship = book.require::<Internship>(internship_id.as_str())?;

        if !representative.approved {
            return Ok(Refusal::RepresentativeNotApproved.into());
        }
        if internship.representative_id != representative.id {
            return Ok(Refusal::NotOwner.into());
        }
        Ok(Outcome::Applied(
            book.applications_for(internship_id).cloned().collect(),
        ))
    }

    pub fn pending_representatives(
        &self,
        staff_id: &StaffId,
    ) -> Result<Vec<CompanyRepresentative>, PlacementError> {
        self.inspect_as_staff(staff_id, |book| {
            review::pending_representatives(book)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    pub fn pending_postings(&self, staff_id: &StaffId) -> Result<Vec<Internship>, PlacementError> {
        self.inspect_as_staff(staff_id, |book| {
            review::pending_postings(book).into_iter().cloned().collect()
        })
    }

    pub fn pending_withdrawals(
        &self,
        staff_id: &StaffId,
    ) -> Result<Vec<Application>, PlacementError> {
        self.inspect_as_staff(staff_id, |book| {
            review::pending_withdrawals(book)
                .into_iter()
                .cloned()
                .collect()
        })
    }
}

/// Error raised by the placement service. Business refusals are not errors; see [`Outcome`].
#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: RecordKind, id: String },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("placement book lock poisoned")]
    Poisoned,
}
