use serde::{Deserialize, Serialize};

use super::matching::{normalize, same_text};
use super::Choice;
use crate::workflows::placement::domain::{Internship, InternshipLevel, InternshipStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Visibility {
    pub const fn admits(self, visible: bool) -> bool {
        match self {
            Visibility::Visible => visible,
            Visibility::Hidden => !visible,
        }
    }
}

/// Narrows the postings of the representative's own company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepresentativeFilter {
    pub status: Choice<InternshipStatus>,
    pub visibility: Choice<Visibility>,
    pub level: Choice<InternshipLevel>,
    pub preferred_major: Choice<String>,
}

impl RepresentativeFilter {
    pub fn matches(&self, company_name: &str, internship: &Internship) -> bool {
        same_text(&internship.company_name, company_name)
            && self.status.admits_value(&internship.status)
            && self
                .visibility
                .admits(|visibility| visibility.admits(internship.visible))
            && self.level.admits_value(&internship.level)
            && self
                .preferred_major
                .admits_major(internship.preferred_major.as_deref())
    }

    pub fn apply<'a>(
        &self,
        company_name: &str,
        internships: impl IntoIterator<Item = &'a Internship>,
    ) -> Vec<&'a Internship> {
        let mut listed: Vec<&Internship> = internships
            .into_iter()
            .filter(|internship| self.matches(company_name, internship))
            .collect();
        listed.sort_by(|left, right| {
            normalize(&left.title)
                .cmp(&normalize(&right.title))
                .then_with(|| left.id.cmp(&right.id))
        });
        listed
    }
}
