// ********* Input data structures ***********

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

/// The schools that elect their own senators.
///
/// Codes are the lowercase short names used by the election office
/// (`ses`, `sob`, `sse`, `hass`).
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum School {
    /// School of Engineering and Science.
    Ses,
    /// School of Business.
    Sob,
    /// School of Systems and Enterprises.
    Sse,
    /// College of Arts and Letters (humanities, arts and social sciences).
    Hass,
}

impl School {
    /// All the schools, in the order of the nominee questions of the survey.
    pub const ALL: [School; 4] = [School::Ses, School::Sob, School::Sse, School::Hass];

    pub fn code(&self) -> &'static str {
        match self {
            School::Ses => "ses",
            School::Sob => "sob",
            School::Sse => "sse",
            School::Hass => "hass",
        }
    }
}

impl Display for School {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for School {
    type Err = VotingErrors;

    fn from_str(s: &str) -> Result<School, VotingErrors> {
        let code = s.trim().to_lowercase();
        School::ALL
            .iter()
            .find(|school| school.code() == code)
            .copied()
            .ok_or(VotingErrors::UnknownSchool(s.to_string()))
    }
}

/// One row of the student roster.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StudentRecord {
    pub cwid: String,
    pub major: String,
}

impl StudentRecord {
    pub fn new(cwid: &str, major: &str) -> StudentRecord {
        StudentRecord {
            cwid: cwid.trim().to_string(),
            major: major.to_string(),
        }
    }
}

/// The students eligible to vote, indexed by CWID.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Roster {
    majors: HashMap<String, String>,
}

impl Roster {
    pub fn new() -> Roster {
        Roster::default()
    }

    /// Registers a student. When a CWID is already known, the first major is kept
    /// and false is returned.
    pub fn add_student(&mut self, student: StudentRecord) -> bool {
        if self.majors.contains_key(&student.cwid) {
            return false;
        }
        self.majors.insert(student.cwid, student.major);
        true
    }

    pub fn major_of(&self, cwid: &str) -> Option<&str> {
        self.majors.get(cwid.trim()).map(|m| m.as_str())
    }

    pub fn len(&self) -> usize {
        self.majors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.majors.is_empty()
    }
}

impl FromIterator<StudentRecord> for Roster {
    fn from_iter<I: IntoIterator<Item = StudentRecord>>(iter: I) -> Roster {
        let mut roster = Roster::new();
        for student in iter {
            roster.add_student(student);
        }
        roster
    }
}

/// A survey response, as handed over by the readers.
///
/// The nominee fields are kept in the order of the survey columns. A well-formed
/// ballot fills exactly one of them.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Ballot {
    /// Identifies the row in the export (file name and line number).
    pub id: String,
    pub voter_id: String,
    pub nominees: Vec<(School, Option<String>)>,
    /// The original row, as (column, value) pairs. Only used for auditing.
    pub record: Vec<(String, String)>,
}

impl Ballot {
    pub fn new(id: &str, voter_id: &str, nominees: Vec<(School, Option<String>)>) -> Ballot {
        Ballot {
            id: id.to_string(),
            voter_id: voter_id.trim().to_string(),
            nominees,
            record: Vec::new(),
        }
    }

    /// A ballot that only fills the nominee field of one school.
    pub fn single_field(id: &str, voter_id: &str, school: School, candidates: &str) -> Ballot {
        let nominees = School::ALL
            .iter()
            .map(|s| {
                if *s == school {
                    (*s, Some(candidates.to_string()))
                } else {
                    (*s, None)
                }
            })
            .collect();
        Ballot::new(id, voter_id, nominees)
    }

    pub fn with_record(mut self, record: Vec<(String, String)>) -> Ballot {
        self.record = record;
        self
    }

    /// Multi-line rendering of the original row, for the audit trail.
    pub fn describe(&self) -> String {
        let width = self.record.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        let mut lines: Vec<String> = vec![format!("ballot {}", self.id)];
        for (column, value) in self.record.iter() {
            lines.push(format!("{:width$}    {}", column, value, width = width));
        }
        if self.record.is_empty() {
            lines.push(format!("voter: {}", self.voter_id));
            for (school, field) in self.nominees.iter() {
                lines.push(format!("{}: {}", school, field.as_deref().unwrap_or("")));
            }
        }
        lines.join("\n")
    }
}

/// The outcome of the validation of one ballot.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum BallotStatus {
    /// Accepted. Holds the candidates selected on the ballot.
    Valid(Vec<String>),
    /// No nominee field could be read.
    Invalid,
    /// Either the voter or the nominees belong to another school.
    WrongSchool,
    /// The voter already has an accepted ballot.
    Duplicate,
}

/// The reasons for which a ballot is written to the audit log.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum AuditFinding {
    Invalid,
    Duplicate,
}

impl Display for AuditFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditFinding::Invalid => write!(f, "Invalid vote"),
            AuditFinding::Duplicate => write!(f, "Duplicate vote"),
        }
    }
}

// ******** Output data structures *********

/// Counters for the ballots that were read.
///
/// `valid` counts candidate selections, not ballots: a ballot naming three candidates
/// adds three to it. The other counters are incremented once per ballot.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct VotingRecord {
    pub valid: u64,
    pub invalid: u64,
    pub wrong_school: u64,
    pub duplicate: u64,
}

impl VotingRecord {
    /// The ballots that were not accepted.
    pub fn rejected(&self) -> u64 {
        self.invalid + self.wrong_school + self.duplicate
    }

    /// The counters in display order, with their names.
    pub fn entries(&self) -> [(&'static str, u64); 4] {
        [
            ("valid", self.valid),
            ("invalid", self.invalid),
            ("wrong_school", self.wrong_school),
            ("duplicate", self.duplicate),
        ]
    }
}

/// Vote counts per candidate, remembering the order in which candidates first appeared.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Tally {
    order: Vec<String>,
    counts: HashMap<String, u64>,
}

impl Tally {
    pub fn new() -> Tally {
        Tally::default()
    }

    pub fn add_vote(&mut self, candidate: &str) {
        match self.counts.get_mut(candidate) {
            Some(count) => *count += 1,
            None => {
                self.order.push(candidate.to_string());
                self.counts.insert(candidate.to_string(), 1);
            }
        }
    }

    pub fn count(&self, candidate: &str) -> u64 {
        self.counts.get(candidate).cloned().unwrap_or(0)
    }

    /// Candidates with their counts, in first-seen order.
    pub fn entries(&self) -> Vec<(String, u64)> {
        self.order
            .iter()
            .map(|name| (name.clone(), self.count(name)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Who got a seat.
///
/// When `tied` is set, the candidates in it have the same number of votes and there
/// are more of them than the `remaining` seats. They have to be separated by other
/// means than the vote count.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ElectionResult {
    pub elected: Vec<String>,
    pub remaining: Option<u32>,
    pub tied: Option<Vec<String>>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VotingResult {
    pub record: VotingRecord,
    /// Candidates sorted by decreasing number of votes.
    pub tally: Vec<(String, u64)>,
    pub result: ElectionResult,
}

impl VotingResult {
    /// True when every candidate that received a vote got a seat.
    pub fn everyone_elected(&self) -> bool {
        self.result.tied.is_none() && self.result.elected.len() == self.tally.len()
    }
}

/// Errors that prevent the election from being run.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum VotingErrors {
    NoSeats,
    EmptyDirectory,
    UnknownSchool(String),
}

impl Error for VotingErrors {}

impl Display for VotingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingErrors::NoSeats => write!(f, "the number of seats must be at least 1"),
            VotingErrors::EmptyDirectory => write!(f, "the directory of majors is empty"),
            VotingErrors::UnknownSchool(s) => write!(
                f,
                "unknown school {:?} (expected one of ses, sob, sse, hass)",
                s
            ),
        }
    }
}

// ********* Configuration **********

/// The separator between candidate names in a nominee field, as written by the survey tool.
pub const DEFAULT_CANDIDATE_DELIMITER: &str = ", ";

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionRules {
    /// The school whose senators are elected.
    pub school: School,
    pub num_seats: u32,
    pub candidate_delimiter: String,
}

impl ElectionRules {
    pub fn new(school: School, num_seats: u32) -> Result<ElectionRules, VotingErrors> {
        if num_seats == 0 {
            return Err(VotingErrors::NoSeats);
        }
        Ok(ElectionRules {
            school,
            num_seats,
            candidate_delimiter: DEFAULT_CANDIDATE_DELIMITER.to_string(),
        })
    }

    pub fn with_delimiter(mut self, delimiter: &str) -> ElectionRules {
        self.candidate_delimiter = delimiter.to_string();
        self
    }
}
