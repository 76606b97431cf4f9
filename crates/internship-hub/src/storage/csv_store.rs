use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim, WriterBuilder};
use tracing::{debug, warn};

use super::codec::{CsvRecord, RecordError};
use super::{
    insert_into, remove_from, replace_in, Change, Changeset, EntityStore, PlacementStore, Record,
    RecordKind, StoreError,
};
use crate::workflows::placement::domain::{
    Application, CompanyRepresentative, Internship, Staff, Student,
};

/// Directory of headerless CSV files, one per collection.
///
/// Single-entity calls rewrite the whole file; [`PlacementStore::commit`] stages every touched
/// file before renaming any of them into place.
#[derive(Debug, Clone)]
pub struct CsvStore {
    root: PathBuf,
}

impl CsvStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            kind: RecordKind::Student,
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, kind: RecordKind) -> PathBuf {
        self.root.join(kind.file_name())
    }

    fn staging_path_for(&self, kind: RecordKind) -> PathBuf {
        self.root.join(format!("{}.staged", kind.file_name()))
    }

    fn read<T: CsvRecord>(&self) -> Result<Vec<T>, StoreError> {
        let path = self.path_for(T::KIND);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    kind: T::KIND,
                    source,
                })
            }
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(file);

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|source| StoreError::Csv {
                kind: T::KIND,
                source,
            })?;
            let line = row.position().map(|position| position.line()).unwrap_or_default();
            if row.iter().all(str::is_empty) {
                continue;
            }

            match T::from_fields(&row) {
                Ok(entity) => records.push(entity),
                Err(RecordError::Malformed(reason)) => {
                    warn!(
                        collection = T::KIND.label(),
                        line,
                        %reason,
                        "skipping malformed record"
                    );
                }
                Err(RecordError::InvalidEnum { field, value }) => {
                    return Err(StoreError::Parse {
                        kind: T::KIND,
                        line,
                        field,
                        value,
                    });
                }
            }
        }

        Ok(records)
    }

    fn stage<T: CsvRecord>(&self, records: &[T]) -> Result<PathBuf, StoreError> {
        let staged = self.staging_path_for(T::KIND);
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_path(&staged)
            .map_err(|source| StoreError::Csv {
                kind: T::KIND,
                source,
            })?;

        for record in records {
            writer
                .write_record(record.to_fields())
                .map_err(|source| StoreError::Csv {
                    kind: T::KIND,
                    source,
                })?;
        }

        writer.flush().map_err(|source| StoreError::Io {
            kind: T::KIND,
            source,
        })?;
        Ok(staged)
    }

    fn publish(&self, kind: RecordKind, staged: &Path) -> Result<(), StoreError> {
        fs::rename(staged, self.path_for(kind)).map_err(|source| StoreError::Io { kind, source })
    }

    fn rewrite<T: CsvRecord>(&self, records: &[T]) -> Result<(), StoreError> {
        let staged = self.stage(records)?;
        self.publish(T::KIND, &staged)
    }
}

impl<T: CsvRecord> EntityStore<T> for CsvStore {
    fn load_all(&self) -> Result<Vec<T>, StoreError> {
        self.read()
    }

    fn append(&self, entity: &T) -> Result<(), StoreError> {
        let mut records = self.read::<T>()?;
        insert_into(&mut records, entity.clone())?;
        self.rewrite(&records)
    }

    fn update(&self, entity: &T) -> Result<(), StoreError> {
        let mut records = self.read::<T>()?;
        replace_in(&mut records, entity.clone())?;
        self.rewrite(&records)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut records = self.read::<T>()?;
        remove_from(&mut records, key)?;
        self.rewrite(&records)
    }
}

/// Collections loaded lazily while a changeset is applied in memory.
#[derive(Default)]
struct Pending {
    students: Option<Vec<Student>>,
    representatives: Option<Vec<CompanyRepresentative>>,
    staff: Option<Vec<Staff>>,
    internships: Option<Vec<Internship>>,
    applications: Option<Vec<Application>>,
}

fn loaded<'a, T: CsvRecord>(
    store: &CsvStore,
    slot: &'a mut Option<Vec<T>>,
) -> Result<&'a mut Vec<T>, StoreError> {
    if slot.is_none() {
        *slot = Some(store.read::<T>()?);
    }
    Ok(slot.get_or_insert_with(Vec::new))
}

fn apply<T: CsvRecord>(
    store: &CsvStore,
    slot: &mut Option<Vec<T>>,
    edit: Edit<T>,
) -> Result<(), StoreError> {
    let records = loaded(store, slot)?;
    match edit {
        Edit::Insert(entity) => insert_into(records, entity),
        Edit::Update(entity) => replace_in(records, entity),
        Edit::Delete(key) => remove_from(records, &key),
    }
}

/// A change narrowed to one collection.
enum Edit<T> {
    Insert(T),
    Update(T),
    Delete(String),
}

impl Pending {
    fn apply(&mut self, store: &CsvStore, change: &Change) -> Result<(), StoreError> {
        match change {
            Change::Insert(record) | Change::Update(record) => {
                let insert = matches!(change, Change::Insert(_));
                match record.clone() {
                    Record::Student(entity) => {
                        apply(store, &mut self.students, narrow(insert, entity))
                    }
                    Record::Representative(entity) => {
                        apply(store, &mut self.representatives, narrow(insert, entity))
                    }
                    Record::Staff(entity) => apply(store, &mut self.staff, narrow(insert, entity)),
                    Record::Internship(entity) => {
                        apply(store, &mut self.internships, narrow(insert, entity))
                    }
                    Record::Application(entity) => {
                        apply(store, &mut self.applications, narrow(insert, entity))
                    }
                }
            }
            Change::Delete { kind, key } => {
                let key = key.clone();
                match kind {
                    RecordKind::Student => apply(store, &mut self.students, Edit::Delete(key)),
                    RecordKind::Representative => {
                        apply(store, &mut self.representatives, Edit::Delete(key))
                    }
                    RecordKind::Staff => apply(store, &mut self.staff, Edit::Delete(key)),
                    RecordKind::Internship => {
                        apply(store, &mut self.internships, Edit::Delete(key))
                    }
                    RecordKind::Application => {
                        apply(store, &mut self.applications, Edit::Delete(key))
                    }
                }
            }
        }
    }

    fn stage_all(&self, store: &CsvStore) -> Result<Vec<(RecordKind, PathBuf)>, StoreError> {
        let mut staged = Vec::new();
        if let Some(records) = &self.students {
            staged.push((RecordKind::Student, store.stage(records)?));
        }
        if let Some(records) = &self.representatives {
            staged.push((RecordKind::Representative, store.stage(records)?));
        }
        if let Some(records) = &self.staff {
            staged.push((RecordKind::Staff, store.stage(records)?));
        }
        if let Some(records) = &self.internships {
            staged.push((RecordKind::Internship, store.stage(records)?));
        }
        if let Some(records) = &self.applications {
            staged.push((RecordKind::Application, store.stage(records)?));
        }
        Ok(staged)
    }
}

fn narrow<T>(insert: bool, entity: T) -> Edit<T> {
    if insert {
        Edit::Insert(entity)
    } else {
        Edit::Update(entity)
    }
}

impl PlacementStore for CsvStore {
    fn commit(&self, changes: &Changeset) -> Result<(), StoreError> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut pending = Pending::default();
        for change in changes.iter() {
            pending.apply(self, change)?;
        }

        let staged = match pending.stage_all(self) {
            Ok(staged) => staged,
            Err(error) => {
                for kind in changes.touched_kinds() {
                    let _ = fs::remove_file(self.staging_path_for(kind));
                }
                return Err(error);
            }
        };

        for (kind, path) in &staged {
            self.publish(*kind, path)?;
        }

        debug!(
            collections = staged.len(),
            changes = changes.len(),
            root = %self.root.display(),
            "csv changeset committed"
        );
        Ok(())
    }
}
