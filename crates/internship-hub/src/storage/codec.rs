//! Flat comma-delimited record layouts for each collection.
//!
//! Student:        id,name,password,major,year,email[,acceptedInternshipId]
//! Representative: id,name,password,companyName,department,position,email,approved
//! Staff:          id,name,password,role,department,email
//! Internship:     id,title,description,level,preferredMajor,openingDate,closingDate,status,
//!                 companyName,representativeId,visible,slots,acceptedCount
//! Application:    id,studentId,internshipId,status,withdrawRequested,studentAccepted[,submissionDate]

use std::str::FromStr;

use chrono::NaiveDate;
use csv::StringRecord;

use super::Entity;
use crate::workflows::placement::domain::{
    Application, ApplicationId, ApplicationStatus, CompanyRepresentative, Internship,
    InternshipId, InternshipLevel, InternshipStatus, RepresentativeId, Staff, StaffId, Student,
    StudentId, UnknownVariant,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Why a stored line could not become an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Wrong shape or an unreadable scalar; the line is skipped.
    Malformed(String),
    /// A required enumeration holds text outside its vocabulary; loading stops.
    InvalidEnum { field: &'static str, value: String },
}

pub trait CsvRecord: Entity + Sized {
    fn to_fields(&self) -> Vec<String>;
    fn from_fields(record: &StringRecord) -> Result<Self, RecordError>;
}

struct Fields<'a> {
    record: &'a StringRecord,
}

impl<'a> Fields<'a> {
    fn expect_len(record: &'a StringRecord, min: usize, max: usize) -> Result<Self, RecordError> {
        let len = record.len();
        if len < min || len > max {
            return Err(RecordError::Malformed(format!(
                "expected {min}..={max} fields, found {len}"
            )));
        }
        Ok(Self { record })
    }

    fn text(&self, index: usize) -> String {
        self.record.get(index).unwrap_or_default().trim().to_string()
    }

    fn optional_text(&self, index: usize) -> Option<String> {
        let value = self.text(index);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    fn date(&self, index: usize, field: &'static str) -> Result<NaiveDate, RecordError> {
        let raw = self.text(index);
        NaiveDate::parse_from_str(&raw, DATE_FORMAT)
            .map_err(|_| RecordError::Malformed(format!("{field} '{raw}' is not YYYY-MM-DD")))
    }

    fn optional_date(
        &self,
        index: usize,
        field: &'static str,
    ) -> Result<Option<NaiveDate>, RecordError> {
        match self.optional_text(index) {
            Some(_) => self.date(index, field).map(Some),
            None => Ok(None),
        }
    }

    fn flag(&self, index: usize, field: &'static str) -> Result<bool, RecordError> {
        let raw = self.text(index);
        if raw.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if raw.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(RecordError::Malformed(format!("{field} '{raw}' is not a boolean")))
        }
    }

    fn number(&self, index: usize, field: &'static str) -> Result<u8, RecordError> {
        let raw = self.text(index);
        raw.parse::<u8>()
            .map_err(|_| RecordError::Malformed(format!("{field} '{raw}' is not a count")))
    }

    fn variant<T>(&self, index: usize, field: &'static str) -> Result<T, RecordError>
    where
        T: FromStr<Err = UnknownVariant>,
    {
        self.text(index)
            .parse::<T>()
            .map_err(|error| RecordError::InvalidEnum {
                field,
                value: error.value,
            })
    }
}

fn flag_text(value: bool) -> String {
    value.to_string()
}

fn date_text(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

impl CsvRecord for Student {
    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.password.clone(),
            self.major.clone(),
            self.year_of_study.to_string(),
            self.email.clone(),
        ]
    }

    // The optional seventh column held a cached accepted internship; it is derived now.
    fn from_fields(record: &StringRecord) -> Result<Self, RecordError> {
        let fields = Fields::expect_len(record, 6, 7)?;
        let year_of_study = fields.number(4, "year")?;
        if year_of_study == 0 {
            return Err(RecordError::Malformed("year of study must be at least 1".into()));
        }

        Ok(Student {
            id: StudentId(fields.text(0)),
            name: fields.text(1),
            password: fields.text(2),
            major: fields.text(3),
            year_of_study,
            email: fields.text(5),
        })
    }
}

impl CsvRecord for CompanyRepresentative {
    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.password.clone(),
            self.company_name.clone(),
            self.department.clone(),
            self.position.clone(),
            self.email.clone(),
            flag_text(self.approved),
        ]
    }

    fn from_fields(record: &StringRecord) -> Result<Self, RecordError> {
        let fields = Fields::expect_len(record, 8, 8)?;
        Ok(CompanyRepresentative {
            id: RepresentativeId(fields.text(0)),
            name: fields.text(1),
            password: fields.text(2),
            company_name: fields.text(3),
            department: fields.text(4),
            position: fields.text(5),
            email: fields.text(6),
            approved: fields.flag(7, "approved")?,
        })
    }
}

impl CsvRecord for Staff {
    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.password.clone(),
            self.role.clone(),
            self.department.clone(),
            self.email.clone(),
        ]
    }

    fn from_fields(record: &StringRecord) -> Result<Self, RecordError> {
        let fields = Fields::expect_len(record, 6, 6)?;
        Ok(Staff {
            id: StaffId(fields.text(0)),
            name: fields.text(1),
            password: fields.text(2),
            role: fields.text(3),
            department: fields.text(4),
            email: fields.text(5),
        })
    }
}

impl CsvRecord for Internship {
    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.description.clone(),
            self.level.label().to_string(),
            self.preferred_major.clone().unwrap_or_default(),
            date_text(self.opening_date),
            date_text(self.closing_date),
            self.status.label().to_string(),
            self.company_name.clone(),
            self.representative_id.to_string(),
            flag_text(self.visible),
            self.slots.to_string(),
            self.accepted_count.to_string(),
        ]
    }

    fn from_fields(record: &StringRecord) -> Result<Self, RecordError> {
        let fields = Fields::expect_len(record, 13, 13)?;
        let level = fields.variant::<InternshipLevel>(3, "level")?;
        let status = fields.variant::<InternshipStatus>(7, "status")?;
        let opening_date = fields.date(5, "opening date")?;
        let closing_date = fields.date(6, "closing date")?;
        let slots = fields.number(11, "slots")?;
        let accepted_count = fields.number(12, "accepted count")?;

        if closing_date < opening_date {
            return Err(RecordError::Malformed("closing date precedes opening date".into()));
        }
        if slots == 0 || accepted_count > slots {
            return Err(RecordError::Malformed(format!(
                "accepted count {accepted_count} does not fit {slots} slots"
            )));
        }

        Ok(Internship {
            id: InternshipId(fields.text(0)),
            title: fields.text(1),
            description: fields.text(2),
            level,
            preferred_major: fields.optional_text(4),
            opening_date,
            closing_date,
            status,
            company_name: fields.text(8),
            representative_id: RepresentativeId(fields.text(9)),
            visible: fields.flag(10, "visible")?,
            slots,
            accepted_count,
        })
    }
}

impl CsvRecord for Application {
    fn to_fields(&self) -> Vec<String> {
        let mut fields = vec![
            self.id.to_string(),
            self.student_id.to_string(),
            self.internship_id.to_string(),
            self.status.label().to_string(),
            flag_text(self.withdraw_requested),
            flag_text(self.student_accepted),
        ];
        if let Some(submitted_on) = self.submitted_on {
            fields.push(date_text(submitted_on));
        }
        fields
    }

    fn from_fields(record: &StringRecord) -> Result<Self, RecordError> {
        let fields = Fields::expect_len(record, 6, 7)?;
        Ok(Application {
            id: ApplicationId(fields.text(0)),
            student_id: StudentId(fields.text(1)),
            internship_id: InternshipId(fields.text(2)),
            status: fields.variant::<ApplicationStatus>(3, "status")?,
            withdraw_requested: fields.flag(4, "withdraw requested")?,
            student_accepted: fields.flag(5, "student accepted")?,
            submitted_on: fields.optional_date(6, "submission date")?,
        })
    }
}
