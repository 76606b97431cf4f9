use std::sync::Mutex;

use super::{
    insert_into, remove_from, replace_in, Change, Changeset, Entity, EntityStore, PlacementStore,
    Record, RecordKind, StoreError,
};
use crate::workflows::placement::domain::{
    Application, CompanyRepresentative, Internship, Staff, Student,
};

#[derive(Debug, Clone, Default)]
pub struct MemoryTables {
    students: Vec<Student>,
    representatives: Vec<CompanyRepresentative>,
    staff: Vec<Staff>,
    internships: Vec<Internship>,
    applications: Vec<Application>,
}

/// Maps an entity onto its table inside [`MemoryTables`].
pub trait MemoryTable: Entity {
    fn table(tables: &mut MemoryTables) -> &mut Vec<Self>;
}

impl MemoryTable for Student {
    fn table(tables: &mut MemoryTables) -> &mut Vec<Self> {
        &mut tables.students
    }
}

impl MemoryTable for CompanyRepresentative {
    fn table(tables: &mut MemoryTables) -> &mut Vec<Self> {
        &mut tables.representatives
    }
}

impl MemoryTable for Staff {
    fn table(tables: &mut MemoryTables) -> &mut Vec<Self> {
        &mut tables.staff
    }
}

impl MemoryTable for Internship {
    fn table(tables: &mut MemoryTables) -> &mut Vec<Self> {
        &mut tables.internships
    }
}

impl MemoryTable for Application {
    fn table(tables: &mut MemoryTables) -> &mut Vec<Self> {
        &mut tables.applications
    }
}

/// In-process store used by the demo walkthrough and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<MemoryTables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a store with existing records, bypassing duplicate checks.
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut tables = MemoryTables::default();
        for record in records {
            match record {
                Record::Student(entity) => tables.students.push(entity),
                Record::Representative(entity) => tables.representatives.push(entity),
                Record::Staff(entity) => tables.staff.push(entity),
                Record::Internship(entity) => tables.internships.push(entity),
                Record::Application(entity) => tables.applications.push(entity),
            }
        }
        Self {
            tables: Mutex::new(tables),
        }
    }

    fn with_tables<R>(
        &self,
        f: impl FnOnce(&mut MemoryTables) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut guard = self
            .tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        f(&mut guard)
    }
}

impl<T: MemoryTable> EntityStore<T> for MemoryStore {
    fn load_all(&self) -> Result<Vec<T>, StoreError> {
        self.with_tables(|tables| Ok(T::table(tables).clone()))
    }

    fn append(&self, entity: &T) -> Result<(), StoreError> {
        self.with_tables(|tables| insert_into(T::table(tables), entity.clone()))
    }

    fn update(&self, entity: &T) -> Result<(), StoreError> {
        self.with_tables(|tables| replace_in(T::table(tables), entity.clone()))
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.with_tables(|tables| remove_from(T::table(tables), key))
    }
}

fn apply(tables: &mut MemoryTables, change: &Change) -> Result<(), StoreError> {
    match change {
        Change::Insert(record) => match record.clone() {
            Record::Student(entity) => insert_into(&mut tables.students, entity),
            Record::Representative(entity) => insert_into(&mut tables.representatives, entity),
            Record::Staff(entity) => insert_into(&mut tables.staff, entity),
            Record::Internship(entity) => insert_into(&mut tables.internships, entity),
            Record::Application(entity) => insert_into(&mut tables.applications, entity),
        },
        Change::Update(record) => match record.clone() {
            Record::Student(entity) => replace_in(&mut tables.students, entity),
            Record::Representative(entity) => replace_in(&mut tables.representatives, entity),
            Record::Staff(entity) => replace_in(&mut tables.staff, entity),
            Record::Internship(entity) => replace_in(&mut tables.internships, entity),
            Record::Application(entity) => replace_in(&mut tables.applications, entity),
        },
        Change::Delete { kind, key } => match kind {
            RecordKind::Student => remove_from(&mut tables.students, key),
            RecordKind::Representative => remove_from(&mut tables.representatives, key),
            RecordKind::Staff => remove_from(&mut tables.staff, key),
            RecordKind::Internship => remove_from(&mut tables.internships, key),
            RecordKind::Application => remove_from(&mut tables.applications, key),
        },
    }
}

impl PlacementStore for MemoryStore {
    /// Applies the changeset to a copy of the tables and swaps it in only if every change fits.
    fn commit(&self, changes: &Changeset) -> Result<(), StoreError> {
        self.with_tables(|tables| {
            let mut next = tables.clone();
            for change in changes.iter() {
                apply(&mut next, change)?;
            }
            *tables = next;
            Ok(())
        })
    }
}
