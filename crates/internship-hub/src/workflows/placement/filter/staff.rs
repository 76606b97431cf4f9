use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::matching::{field_matches, is_unrestricted, same_text};
use crate::workflows::placement::book::PlacementBook;
use crate::workflows::placement::domain::{Internship, InternshipLevel, InternshipStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementFilter {
    #[default]
    Any,
    Filled,
    Unfilled,
}

impl PlacementFilter {
    pub fn admits(self, internship: &Internship) -> bool {
        match self {
            PlacementFilter::Any => true,
            PlacementFilter::Filled => !internship.has_capacity(),
            PlacementFilter::Unfilled => internship.has_capacity(),
        }
    }
}

/// Inclusive date bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| from <= date) && self.to.map_or(true, |to| date <= to)
    }
}

/// Staff review filter. Empty sets place no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffFilter {
    pub statuses: BTreeSet<InternshipStatus>,
    pub majors: Vec<String>,
    pub levels: BTreeSet<InternshipLevel>,
    pub companies: Vec<String>,
    pub placement: PlacementFilter,
    pub min_applications: Option<usize>,
    pub opening: DateRange,
    pub closing: DateRange,
}

impl StaffFilter {
    fn admits_major(&self, preferred: Option<&str>) -> bool {
        if self.majors.is_empty() {
            return true;
        }
        match preferred {
            Some(preferred) if !is_unrestricted(Some(preferred)) => self
                .majors
                .iter()
                .any(|wanted| field_matches(preferred, wanted)),
            _ => true,
        }
    }

    fn admits_company(&self, company_name: &str) -> bool {
        self.companies.is_empty()
            || self
                .companies
                .iter()
                .any(|wanted| same_text(company_name, wanted))
    }

    pub fn matches(&self, internship: &Internship, application_count: usize) -> bool {
        (self.statuses.is_empty() || self.statuses.contains(&internship.status))
            && (self.levels.is_empty() || self.levels.contains(&internship.level))
            && self.admits_major(internship.preferred_major.as_deref())
            && self.admits_company(&internship.company_name)
            && self.placement.admits(internship)
            && self
                .min_applications
                .map_or(true, |minimum| application_count >= minimum)
            && self.opening.contains(internship.opening_date)
            && self.closing.contains(internship.closing_date)
    }

    /// Every posting passing the filter, by id. Application counts exclude withdrawn ones.
    pub fn apply<'a>(&self, book: &'a PlacementBook) -> Vec<&'a Internship> {
        let mut listed: Vec<&Internship> = book
            .internships()
            .filter(|internship| self.matches(internship, book.application_count(&internship.id)))
            .collect();
        listed.sort_by(|left, right| left.id.cmp(&right.id));
        listed
    }
}
