//! Record storage for placement entities.
//!
//! Stores expose per-entity CRUD through [`EntityStore`] and accept whole transitions through
//! [`PlacementStore::commit`], so a single logical action touching several collections is
//! flushed as one changeset.

pub mod codec;
pub mod csv_store;
pub mod memory;

use std::collections::BTreeSet;
use std::fmt;

use crate::workflows::placement::domain::{
    Application, CompanyRepresentative, Internship, Staff, Student,
};

pub use csv_store::CsvStore;
pub use memory::MemoryStore;

/// The five persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    Student,
    Representative,
    Staff,
    Internship,
    Application,
}

impl RecordKind {
    pub const fn label(self) -> &'static str {
        match self {
            RecordKind::Student => "student",
            RecordKind::Representative => "company representative",
            RecordKind::Staff => "staff member",
            RecordKind::Internship => "internship",
            RecordKind::Application => "application",
        }
    }

    pub const fn file_name(self) -> &'static str {
        match self {
            RecordKind::Student => "students.csv",
            RecordKind::Representative => "representatives.csv",
            RecordKind::Staff => "staff.csv",
            RecordKind::Internship => "internships.csv",
            RecordKind::Application => "applications.csv",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An entity that lives in one of the stored collections.
pub trait Entity: Clone + Send + Sync + 'static {
    const KIND: RecordKind;

    fn key(&self) -> &str;
    fn into_record(self) -> Record;
}

/// Any stored entity, used where a change spans collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Student(Student),
    Representative(CompanyRepresentative),
    Staff(Staff),
    Internship(Internship),
    Application(Application),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Student(_) => RecordKind::Student,
            Record::Representative(_) => RecordKind::Representative,
            Record::Staff(_) => RecordKind::Staff,
            Record::Internship(_) => RecordKind::Internship,
            Record::Application(_) => RecordKind::Application,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Record::Student(entity) => entity.key(),
            Record::Representative(entity) => entity.key(),
            Record::Staff(entity) => entity.key(),
            Record::Internship(entity) => entity.key(),
            Record::Application(entity) => entity.key(),
        }
    }
}

impl Entity for Student {
    const KIND: RecordKind = RecordKind::Student;

    fn key(&self) -> &str {
        self.id.as_str()
    }

    fn into_record(self) -> Record {
        Record::Student(self)
    }
}

impl Entity for CompanyRepresentative {
    const KIND: RecordKind = RecordKind::Representative;

    fn key(&self) -> &str {
        self.id.as_str()
    }

    fn into_record(self) -> Record {
        Record::Representative(self)
    }
}

impl Entity for Staff {
    const KIND: RecordKind = RecordKind::Staff;

    fn key(&self) -> &str {
        self.id.as_str()
    }

    fn into_record(self) -> Record {
        Record::Staff(self)
    }
}

impl Entity for Internship {
    const KIND: RecordKind = RecordKind::Internship;

    fn key(&self) -> &str {
        self.id.as_str()
    }

    fn into_record(self) -> Record {
        Record::Internship(self)
    }
}

impl Entity for Application {
    const KIND: RecordKind = RecordKind::Application;

    fn key(&self) -> &str {
        self.id.as_str()
    }

    fn into_record(self) -> Record {
        Record::Application(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Insert(Record),
    Update(Record),
    Delete { kind: RecordKind, key: String },
}

impl Change {
    pub fn kind(&self) -> RecordKind {
        match self {
            Change::Insert(record) | Change::Update(record) => record.kind(),
            Change::Delete { kind, .. } => *kind,
        }
    }
}

/// Ordered list of record changes produced by one transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    changes: Vec<Change>,
}

impl Changeset {
    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    pub fn touched_kinds(&self) -> BTreeSet<RecordKind> {
        self.changes.iter().map(Change::kind).collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} store i/o failure: {source}")]
    Io {
        kind: RecordKind,
        #[source]
        source: std::io::Error,
    },
    #[error("{kind} store csv failure: {source}")]
    Csv {
        kind: RecordKind,
        #[source]
        source: csv::Error,
    },
    #[error("{kind} record on line {line}: invalid {field} '{value}'")]
    Parse {
        kind: RecordKind,
        line: u64,
        field: &'static str,
        value: String,
    },
    #[error("{kind} '{key}' already stored")]
    Conflict { kind: RecordKind, key: String },
    #[error("{kind} '{key}' is not stored")]
    Missing { kind: RecordKind, key: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Per-collection record access.
pub trait EntityStore<T: Entity> {
    fn load_all(&self) -> Result<Vec<T>, StoreError>;

    fn find(&self, key: &str) -> Result<Option<T>, StoreError> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|entity| entity.key() == key))
    }

    fn append(&self, entity: &T) -> Result<(), StoreError>;
    fn update(&self, entity: &T) -> Result<(), StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// A store holding every placement collection.
pub trait PlacementStore:
    EntityStore<Student>
    + EntityStore<CompanyRepresentative>
    + EntityStore<Staff>
    + EntityStore<Internship>
    + EntityStore<Application>
    + Send
    + Sync
{
    /// Persists a transition's changes. Implementations should apply all or nothing where
    /// their medium allows; the default applies changes one by one.
    fn commit(&self, changes: &Changeset) -> Result<(), StoreError> {
        for change in changes.iter() {
            apply_change(self, change)?;
        }
        Ok(())
    }
}

fn apply_change<S: PlacementStore + ?Sized>(store: &S, change: &Change) -> Result<(), StoreError> {
    match change {
        Change::Insert(record) => match record {
            Record::Student(entity) => EntityStore::<Student>::append(store, entity),
            Record::Representative(entity) => {
                EntityStore::<CompanyRepresentative>::append(store, entity)
            }
            Record::Staff(entity) => EntityStore::<Staff>::append(store, entity),
            Record::Internship(entity) => EntityStore::<Internship>::append(store, entity),
            Record::Application(entity) => EntityStore::<Application>::append(store, entity),
        },
        Change::Update(record) => match record {
            Record::Student(entity) => EntityStore::<Student>::update(store, entity),
            Record::Representative(entity) => {
                EntityStore::<CompanyRepresentative>::update(store, entity)
            }
            Record::Staff(entity) => EntityStore::<Staff>::update(store, entity),
            Record::Internship(entity) => EntityStore::<Internship>::update(store, entity),
            Record::Application(entity) => EntityStore::<Application>::update(store, entity),
        },
        Change::Delete { kind, key } => match kind {
            RecordKind::Student => EntityStore::<Student>::delete(store, key),
            RecordKind::Representative => EntityStore::<CompanyRepresentative>::delete(store, key),
            RecordKind::Staff => EntityStore::<Staff>::delete(store, key),
            RecordKind::Internship => EntityStore::<Internship>::delete(store, key),
            RecordKind::Application => EntityStore::<Application>::delete(store, key),
        },
    }
}

pub(crate) fn insert_into<T: Entity>(records: &mut Vec<T>, entity: T) -> Result<(), StoreError> {
    if records.iter().any(|existing| existing.key() == entity.key()) {
        return Err(StoreError::Conflict {
            kind: T::KIND,
            key: entity.key().to_string(),
        });
    }
    records.push(entity);
    Ok(())
}

pub(crate) fn replace_in<T: Entity>(records: &mut [T], entity: T) -> Result<(), StoreError> {
    match records
        .iter_mut()
        .find(|existing| existing.key() == entity.key())
    {
        Some(slot) => {
            *slot = entity;
            Ok(())
        }
        None => Err(StoreError::Missing {
            kind: T::KIND,
            key: entity.key().to_string(),
        }),
    }
}

pub(crate) fn remove_from<T: Entity>(records: &mut Vec<T>, key: &str) -> Result<(), StoreError> {
    let before = records.len();
    records.retain(|existing| existing.key() != key);
    if records.len() == before {
        return Err(StoreError::Missing {
            kind: T::KIND,
            key: key.to_string(),
        });
    }
    Ok(())
}
