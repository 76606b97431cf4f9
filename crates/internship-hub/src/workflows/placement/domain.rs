use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

identifier!(
    /// Matriculation number of a student account.
    StudentId
);
identifier!(
    /// Login identifier of a company representative (usually their work e-mail).
    RepresentativeId
);
identifier!(
    /// Login identifier of a career-center staff member.
    StaffId
);
identifier!(
    /// Identifier of an internship posting.
    InternshipId
);
identifier!(
    /// Identifier of a student application.
    ApplicationId
);

/// Raised when a closed enumeration receives text outside its vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternshipLevel {
    Basic,
    Intermediate,
    Advanced,
}

impl InternshipLevel {
    pub const fn ordered() -> [Self; 3] {
        [Self::Basic, Self::Intermediate, Self::Advanced]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

impl FromStr for InternshipLevel {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|level| level.label().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "internship level",
                value: value.to_string(),
            })
    }
}

/// Review and placement status of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternshipStatus {
    Pending,
    Approved,
    Rejected,
    Filled,
}

impl InternshipStatus {
    pub const fn ordered() -> [Self; 4] {
        [Self::Pending, Self::Approved, Self::Rejected, Self::Filled]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Filled => "Filled",
        }
    }
}

impl FromStr for InternshipStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "internship status",
                value: value.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Successful,
    Unsuccessful,
    Withdrawn,
}

impl ApplicationStatus {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Pending,
            Self::Successful,
            Self::Unsuccessful,
            Self::Withdrawn,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Successful => "Successful",
            Self::Unsuccessful => "Unsuccessful",
            Self::Withdrawn => "Withdrawn",
        }
    }

    /// Pending and successful applications count against the student's quota.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Successful)
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "application status",
                value: value.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub major: String,
    pub year_of_study: u8,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRepresentative {
    pub id: RepresentativeId,
    pub name: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub company_name: String,
    pub department: String,
    pub position: String,
    pub email: String,
    pub approved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub name: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
    pub department: String,
    pub email: String,
}

/// Posting owned by a single representative.
///
/// `accepted_count` is only written by the capacity ledger; everything else reads it through
/// [`Internship::accepted_count`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Internship {
    pub id: InternshipId,
    pub title: String,
    pub description: String,
    pub level: InternshipLevel,
    pub preferred_major: Option<String>,
    pub opening_date: NaiveDate,
    pub closing_date: NaiveDate,
    pub status: InternshipStatus,
    pub company_name: String,
    pub representative_id: RepresentativeId,
    pub visible: bool,
    pub slots: u8,
    pub(crate) accepted_count: u8,
}

impl Internship {
    pub fn accepted_count(&self) -> u8 {
        self.accepted_count
    }

    pub fn remaining_slots(&self) -> u8 {
        self.slots.saturating_sub(self.accepted_count)
    }

    pub fn has_capacity(&self) -> bool {
        self.accepted_count < self.slots
    }

    pub fn is_open_to_students(&self) -> bool {
        self.status == InternshipStatus::Approved && self.visible
    }

    pub fn is_accepting_on(&self, today: NaiveDate) -> bool {
        self.opening_date <= today && today <= self.closing_date
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Application {
    pub id: ApplicationId,
    pub student_id: StudentId,
    pub internship_id: InternshipId,
    pub status: ApplicationStatus,
    pub withdraw_requested: bool,
    pub student_accepted: bool,
    pub submitted_on: Option<NaiveDate>,
}

impl Application {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// A successful application the student has confirmed; it holds one slot.
    pub fn is_accepted_offer(&self) -> bool {
        self.status == ApplicationStatus::Successful && self.student_accepted
    }
}

/// Posting details supplied by a representative when creating or editing a posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingDraft {
    pub title: String,
    pub description: String,
    pub level: InternshipLevel,
    #[serde(default)]
    pub preferred_major: Option<String>,
    pub opening_date: NaiveDate,
    pub closing_date: NaiveDate,
    pub slots: u8,
}

/// Self-service sign-up details for a company representative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepresentativeRegistration {
    pub id: RepresentativeId,
    pub name: String,
    pub password: String,
    pub company_name: String,
    pub department: String,
    pub position: String,
    pub email: String,
}

/// The authenticated party driving an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "snake_case")]
pub enum Actor {
    Student(StudentId),
    Representative(RepresentativeId),
    Staff(StaffId),
}

impl Actor {
    pub const fn role_label(&self) -> &'static str {
        match self {
            Actor::Student(_) => "Student",
            Actor::Representative(_) => "Company Representative",
            Actor::Staff(_) => "Career Center Staff",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Actor::Student(id) => id.as_str(),
            Actor::Representative(id) => id.as_str(),
            Actor::Staff(id) => id.as_str(),
        }
    }
}
