//! The mapping between majors and schools.
//!
//! Majors are matched on their lowercase form. The built-in directory follows the
//! undergraduate catalog; a different one can be assembled with [`Directory::insert`].

use log::debug;
use std::collections::{HashMap, HashSet};

use crate::config::School;

const SES_MAJORS: &[&str] = &[
    "biology",
    "biomedical engineering",
    "chemical biology",
    "chemical engineering",
    "chemistry",
    "civil engineering",
    "computer engineering",
    "computer science",
    "cybersecurity",
    "electrical engineering",
    "engineering physics",
    "environmental engineering",
    "mathematics",
    "mechanical engineering",
    "naval engineering",
    "physics",
    "pure and applied mathematics",
    "undecided engineering",
    "undecided science",
];

const SOB_MAJORS: &[&str] = &[
    "accounting and analytics",
    "business",
    "business and technology",
    "economics",
    "finance",
    "information systems",
    "management",
    "marketing innovation and analytics",
    "quantitative finance",
];

const SSE_MAJORS: &[&str] = &[
    "engineering management",
    "industrial and systems engineering",
    "software engineering",
    "systems engineering",
];

const HASS_MAJORS: &[&str] = &[
    "art and technology",
    "computational science",
    "history",
    "literature",
    "music and technology",
    "philosophy",
    "science and technology studies",
    "social sciences",
    "visual arts and technology",
];

/// Lists the majors of each school.
///
/// The schools are kept in insertion order: when a major appears under several
/// schools, the first one wins.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Directory {
    schools: Vec<(School, HashSet<String>)>,
}

impl Directory {
    /// A directory without any major.
    pub fn new() -> Directory {
        Directory {
            schools: Vec::new(),
        }
    }

    pub fn insert(&mut self, school: School, major: &str) {
        let major = normalize_major(major);
        if let Some((_, majors)) = self.schools.iter_mut().find(|(s, _)| *s == school) {
            majors.insert(major);
        } else {
            self.schools.push((school, HashSet::from([major])));
        }
    }

    pub fn with_majors(mut self, school: School, majors: &[&str]) -> Directory {
        for m in majors {
            self.insert(school, m);
        }
        self
    }

    pub fn school_for_major(&self, major: &str) -> Option<School> {
        let major = normalize_major(major);
        let res = self
            .schools
            .iter()
            .find(|(_, majors)| majors.contains(&major))
            .map(|(school, _)| *school);
        if res.is_none() {
            debug!("school_for_major: no school for major {:?}", major);
        }
        res
    }

    /// The majors that are listed under more than one school, with all the schools
    /// that list them (in lookup order). Sorted by major.
    pub fn ambiguous_majors(&self) -> Vec<(String, Vec<School>)> {
        let mut schools_by_major: HashMap<&String, Vec<School>> = HashMap::new();
        for (school, majors) in self.schools.iter() {
            for major in majors.iter() {
                schools_by_major.entry(major).or_default().push(*school);
            }
        }
        let mut res: Vec<(String, Vec<School>)> = schools_by_major
            .into_iter()
            .filter(|(_, schools)| schools.len() > 1)
            .map(|(major, schools)| (major.clone(), schools))
            .collect();
        res.sort();
        res
    }

    pub fn is_empty(&self) -> bool {
        self.schools.iter().all(|(_, majors)| majors.is_empty())
    }
}

impl Default for Directory {
    fn default() -> Directory {
        Directory::new()
            .with_majors(School::Ses, SES_MAJORS)
            .with_majors(School::Sob, SOB_MAJORS)
            .with_majors(School::Sse, SSE_MAJORS)
            .with_majors(School::Hass, HASS_MAJORS)
    }
}

fn normalize_major(major: &str) -> String {
    major.trim().to_lowercase()
}
