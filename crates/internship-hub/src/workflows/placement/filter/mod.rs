//! Role-scoped listing filters.
//!
//! Each filter is a plain value owned by whoever runs the query; nothing here keeps state
//! between calls. Text criteria match case-insensitively after trimming, and a multi-valued
//! source field (for example `"Computer Science; Data Science"`) matches when any token does.

pub(crate) mod matching;
mod representative;
mod staff;
mod student;

use serde::{Deserialize, Serialize};

pub use representative::{RepresentativeFilter, Visibility};
pub use staff::{DateRange, PlacementFilter, StaffFilter};
pub use student::{ClosingSort, StudentFilter};

/// A single-valued criterion. Serialized as `null` for [`Choice::All`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<T>", into = "Option<T>")]
#[serde(bound(
    serialize = "T: Serialize + Clone",
    deserialize = "T: Deserialize<'de>"
))]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Choice::All
    }
}

impl<T> From<Option<T>> for Choice<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Choice::Only(value),
            None => Choice::All,
        }
    }
}

impl<T> From<Choice<T>> for Option<T> {
    fn from(choice: Choice<T>) -> Self {
        match choice {
            Choice::All => None,
            Choice::Only(value) => Some(value),
        }
    }
}

impl<T> Choice<T> {
    pub fn only(value: T) -> Self {
        Choice::Only(value)
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }

    /// `All` admits everything; `Only` defers to `accepts`.
    pub fn admits(&self, accepts: impl FnOnce(&T) -> bool) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(value) => accepts(value),
        }
    }
}

impl<T: PartialEq> Choice<T> {
    pub fn admits_value(&self, candidate: &T) -> bool {
        self.admits(|wanted| wanted == candidate)
    }
}

impl Choice<String> {
    /// Matches a single-valued name, ignoring case and surrounding spaces.
    pub fn admits_name(&self, source: &str) -> bool {
        self.admits(|wanted| matching::same_text(source, wanted))
    }

    /// Matches a preferred-major field; postings open to any major match every choice.
    pub fn admits_major(&self, preferred: Option<&str>) -> bool {
        self.admits(|wanted| match preferred {
            Some(preferred) if !matching::is_unrestricted(Some(preferred)) => {
                matching::field_matches(preferred, wanted)
            }
            _ => true,
        })
    }
}
