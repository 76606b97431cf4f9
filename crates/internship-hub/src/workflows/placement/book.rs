//! In-memory arena of every placement entity, and the unit of work that changes it.

use std::collections::BTreeMap;

use tracing::error;

use super::domain::{
    Application, ApplicationId, ApplicationStatus, CompanyRepresentative, Internship, InternshipId,
    RepresentativeId, Staff, StaffId, Student, StudentId,
};
use super::eligibility::ApplicantStanding;
use super::service::PlacementError;
use crate::storage::{
    Change, Changeset, Entity, EntityStore, PlacementStore, Record, RecordKind, StoreError,
};

/// All entities keyed by id, loaded once from a store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementBook {
    students: BTreeMap<String, Student>,
    representatives: BTreeMap<String, CompanyRepresentative>,
    staff: BTreeMap<String, Staff>,
    internships: BTreeMap<String, Internship>,
    applications: BTreeMap<String, Application>,
}

/// Gives generic code access to the shelf holding one entity type.
pub trait Shelved: Entity {
    fn shelf(book: &PlacementBook) -> &BTreeMap<String, Self>;
    fn shelf_mut(book: &mut PlacementBook) -> &mut BTreeMap<String, Self>;
}

macro_rules! shelved {
    ($entity:ty, $field:ident) => {
        impl Shelved for $entity {
            fn shelf(book: &PlacementBook) -> &BTreeMap<String, Self> {
                &book.$field
            }

            fn shelf_mut(book: &mut PlacementBook) -> &mut BTreeMap<String, Self> {
                &mut book.$field
            }
        }
    };
}

shelved!(Student, students);
shelved!(CompanyRepresentative, representatives);
shelved!(Staff, staff);
shelved!(Internship, internships);
shelved!(Application, applications);

fn keyed<T: Entity>(records: Vec<T>) -> BTreeMap<String, T> {
    records
        .into_iter()
        .map(|record| (record.key().to_string(), record))
        .collect()
}

fn next_sequence<'a>(prefix: &str, keys: impl Iterator<Item = &'a String>) -> u64 {
    keys.filter_map(|key| key.strip_prefix(prefix))
        .filter_map(|suffix| suffix.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
        + 1
}

impl PlacementBook {
    pub fn load<S: PlacementStore + ?Sized>(store: &S) -> Result<Self, StoreError> {
        Ok(Self {
            students: keyed(EntityStore::<Student>::load_all(store)?),
            representatives: keyed(EntityStore::<CompanyRepresentative>::load_all(store)?),
            staff: keyed(EntityStore::<Staff>::load_all(store)?),
            internships: keyed(EntityStore::<Internship>::load_all(store)?),
            applications: keyed(EntityStore::<Application>::load_all(store)?),
        })
    }

    pub fn get<T: Shelved>(&self, key: &str) -> Option<&T> {
        T::shelf(self).get(key)
    }

    pub(crate) fn require<T: Shelved>(&self, key: &str) -> Result<&T, PlacementError> {
        self.get(key).ok_or_else(|| PlacementError::NotFound {
            kind: T::KIND,
            id: key.to_string(),
        })
    }

    pub fn student(&self, id: &StudentId) -> Option<&Student> {
        self.students.get(id.as_str())
    }

    pub fn representative(&self, id: &RepresentativeId) -> Option<&CompanyRepresentative> {
        self.representatives.get(id.as_str())
    }

    pub fn staff_member(&self, id: &StaffId) -> Option<&Staff> {
        self.staff.get(id.as_str())
    }

    pub fn internship(&self, id: &InternshipId) -> Option<&Internship> {
        self.internships.get(id.as_str())
    }

    pub fn application(&self, id: &ApplicationId) -> Option<&Application> {
        self.applications.get(id.as_str())
    }

    pub fn students(&self) -> impl Iterator<Item = &Student> {
        self.students.values()
    }

    pub fn representatives(&self) -> impl Iterator<Item = &CompanyRepresentative> {
        self.representatives.values()
    }

    pub fn staff(&self) -> impl Iterator<Item = &Staff> {
        self.staff.values()
    }

    pub fn internships(&self) -> impl Iterator<Item = &Internship> {
        self.internships.values()
    }

    pub fn applications(&self) -> impl Iterator<Item = &Application> {
        self.applications.values()
    }

    pub fn applications_of<'a>(
        &'a self,
        student: &'a StudentId,
    ) -> impl Iterator<Item = &'a Application> + 'a {
        self.applications
            .values()
            .filter(move |application| &application.student_id == student)
    }

    pub fn applications_for<'a>(
        &'a self,
        internship: &'a InternshipId,
    ) -> impl Iterator<Item = &'a Application> + 'a {
        self.applications
            .values()
            .filter(move |application| &application.internship_id == internship)
    }

    pub fn active_application_count(&self, student: &StudentId) -> usize {
        self.applications_of(student)
            .filter(|application| application.is_active())
            .count()
    }

    /// A non-withdrawn application already links this student and posting.
    pub fn has_open_application(&self, student: &StudentId, internship: &InternshipId) -> bool {
        self.applications_of(student).any(|application| {
            &application.internship_id == internship
                && application.status != ApplicationStatus::Withdrawn
        })
    }

    pub fn accepted_offer<'a>(&'a self, student: &'a StudentId) -> Option<&'a Application> {
        self.applications_of(student)
            .find(|application| application.is_accepted_offer())
    }

    pub fn standing(&self, student: &StudentId, internship: &InternshipId) -> ApplicantStanding {
        ApplicantStanding {
            active_applications: self.active_application_count(student),
            has_open_application: self.has_open_application(student, internship),
        }
    }

    pub fn postings_owned_by(&self, representative: &RepresentativeId) -> usize {
        self.internships
            .values()
            .filter(|internship| &internship.representative_id == representative)
            .count()
    }

    /// Applications still in play for a posting (everything except withdrawn).
    pub fn application_count(&self, internship: &InternshipId) -> usize {
        self.applications_for(internship)
            .filter(|application| application.status != ApplicationStatus::Withdrawn)
            .count()
    }

    /// True when any account of any role already uses `id`.
    pub fn account_exists(&self, id: &str) -> bool {
        self.students.contains_key(id)
            || self.representatives.contains_key(id)
            || self.staff.contains_key(id)
    }

    pub fn next_application_id(&self) -> ApplicationId {
        let sequence = next_sequence("app-", self.applications.keys());
        ApplicationId(format!("app-{sequence:06}"))
    }

    pub fn next_internship_id(&self) -> InternshipId {
        let sequence = next_sequence("int-", self.internships.keys());
        InternshipId(format!("int-{sequence:06}"))
    }

    fn put(&mut self, record: Record) {
        match record {
            Record::Student(entity) => put_into(&mut self.students, entity),
            Record::Representative(entity) => put_into(&mut self.representatives, entity),
            Record::Staff(entity) => put_into(&mut self.staff, entity),
            Record::Internship(entity) => put_into(&mut self.internships, entity),
            Record::Application(entity) => put_into(&mut self.applications, entity),
        }
    }

    fn take(&mut self, kind: RecordKind, key: &str) -> Option<Record> {
        match kind {
            RecordKind::Student => self.students.remove(key).map(Entity::into_record),
            RecordKind::Representative => {
                self.representatives.remove(key).map(Entity::into_record)
            }
            RecordKind::Staff => self.staff.remove(key).map(Entity::into_record),
            RecordKind::Internship => self.internships.remove(key).map(Entity::into_record),
            RecordKind::Application => self.applications.remove(key).map(Entity::into_record),
        }
    }
}

fn put_into<T: Entity>(shelf: &mut BTreeMap<String, T>, entity: T) {
    shelf.insert(entity.key().to_string(), entity);
}

/// What a key looked like before the unit of work first touched it.
#[derive(Debug)]
struct BeforeImage {
    kind: RecordKind,
    key: String,
    record: Option<Record>,
}

/// One logical transition over the book.
///
/// Every write is applied to the book immediately and journaled; [`UnitOfWork::commit`] flushes
/// the combined changeset and restores the journaled images if the store refuses it. Dropping an
/// uncommitted unit of work rolls it back.
#[derive(Debug)]
pub struct UnitOfWork<'a> {
    book: &'a mut PlacementBook,
    journal: Vec<BeforeImage>,
    changes: Changeset,
    settled: bool,
}

impl<'a> UnitOfWork<'a> {
    pub fn begin(book: &'a mut PlacementBook) -> Self {
        Self {
            book,
            journal: Vec::new(),
            changes: Changeset::default(),
            settled: false,
        }
    }

    pub fn book(&self) -> &PlacementBook {
        &*self.book
    }

    pub fn changes(&self) -> &Changeset {
        &self.changes
    }

    fn remember(&mut self, kind: RecordKind, key: &str) {
        let record = match kind {
            RecordKind::Student => self.book.students.get(key).cloned().map(Entity::into_record),
            RecordKind::Representative => self
                .book
                .representatives
                .get(key)
                .cloned()
                .map(Entity::into_record),
            RecordKind::Staff => self.book.staff.get(key).cloned().map(Entity::into_record),
            RecordKind::Internship => self
                .book
                .internships
                .get(key)
                .cloned()
                .map(Entity::into_record),
            RecordKind::Application => self
                .book
                .applications
                .get(key)
                .cloned()
                .map(Entity::into_record),
        };
        self.journal.push(BeforeImage {
            kind,
            key: key.to_string(),
            record,
        });
    }

    pub fn insert<T: Shelved>(&mut self, entity: T) {
        self.remember(T::KIND, entity.key());
        self.changes.push(Change::Insert(entity.clone().into_record()));
        put_into(T::shelf_mut(&mut *self.book), entity);
    }

    pub fn save<T: Shelved>(&mut self, entity: T) {
        self.remember(T::KIND, entity.key());
        self.changes.push(Change::Update(entity.clone().into_record()));
        put_into(T::shelf_mut(&mut *self.book), entity);
    }

    pub fn remove<T: Shelved>(&mut self, key: &str) -> Option<T> {
        let removed = T::shelf(&*self.book).get(key).cloned()?;
        self.remember(T::KIND, key);
        self.changes.push(Change::Delete {
            kind: T::KIND,
            key: key.to_string(),
        });
        T::shelf_mut(&mut *self.book).remove(key);
        Some(removed)
    }

    /// Flushes the changeset, returning how many record changes were written.
    pub fn commit<S: PlacementStore + ?Sized>(mut self, store: &S) -> Result<usize, StoreError> {
        if self.changes.is_empty() {
            self.settled = true;
            return Ok(0);
        }

        match store.commit(&self.changes) {
            Ok(()) => {
                self.settled = true;
                Ok(self.changes.len())
            }
            Err(failure) => {
                error!(
                    changes = self.changes.len(),
                    error = %failure,
                    "store refused changeset; rolling back"
                );
                self.restore();
                Err(failure)
            }
        }
    }

    pub fn rollback(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        while let Some(image) = self.journal.pop() {
            self.book.take(image.kind, &image.key);
            if let Some(record) = image.record {
                self.book.put(record);
            }
        }
        self.changes = Changeset::default();
        self.settled = true;
    }
}

impl Drop for UnitOfWork<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.restore();
        }
    }
}
