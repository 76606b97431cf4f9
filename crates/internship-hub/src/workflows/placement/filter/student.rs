use serde::{Deserialize, Serialize};

use super::matching::normalize;
use super::Choice;
use crate::workflows::placement::domain::{Internship, InternshipLevel, InternshipStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosingSort {
    #[default]
    None,
    Soonest,
    Latest,
}

/// What a student narrows the open postings by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentFilter {
    pub level: Choice<InternshipLevel>,
    pub company: Choice<String>,
    pub status: Choice<InternshipStatus>,
    pub preferred_major: Choice<String>,
    pub closing_sort: ClosingSort,
}

impl StudentFilter {
    pub fn matches(&self, internship: &Internship) -> bool {
        internship.is_open_to_students()
            && self.level.admits_value(&internship.level)
            && self.company.admits_name(&internship.company_name)
            && self.status.admits_value(&internship.status)
            && self
                .preferred_major
                .admits_major(internship.preferred_major.as_deref())
    }

    /// Visible approved postings passing every criterion, by title unless a closing sort is set.
    pub fn apply<'a>(
        &self,
        internships: impl IntoIterator<Item = &'a Internship>,
    ) -> Vec<&'a Internship> {
        let mut listed: Vec<&Internship> = internships
            .into_iter()
            .filter(|internship| self.matches(internship))
            .collect();

        let by_title = |left: &&Internship, right: &&Internship| {
            normalize(&left.title)
                .cmp(&normalize(&right.title))
                .then_with(|| left.id.cmp(&right.id))
        };
        match self.closing_sort {
            ClosingSort::None => listed.sort_by(by_title),
            ClosingSort::Soonest => listed.sort_by(|left, right| {
                left.closing_date
                    .cmp(&right.closing_date)
                    .then_with(|| by_title(left, right))
            }),
            ClosingSort::Latest => listed.sort_by(|left, right| {
                right
                    .closing_date
                    .cmp(&left.closing_date)
                    .then_with(|| by_title(left, right))
            }),
        }
        listed
    }
}
