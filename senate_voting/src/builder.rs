use log::debug;
use std::collections::HashSet;

pub use crate::config::*;
use crate::directory::Directory;
use crate::{
    allocate_seats, classify_ballot, group_by_count, record_votes, sort_tally, AuditLog, LogAudit,
};

/// A builder for processing ballots one at a time.
///
/// It owns the state of the count: the tally, the voting record and the voters
/// that already have an accepted ballot. Ballots must be added in the order in which
/// they were submitted, since only the first ballot of a voter is kept.
///
/// ```
/// use senate_voting::builder::Builder;
/// use senate_voting::{ElectionRules, Roster, School, StudentRecord};
/// # use senate_voting::VotingErrors;
///
/// let roster: Roster = vec![
///     StudentRecord::new("10001", "Computer Science"),
///     StudentRecord::new("10002", "Physics"),
/// ]
/// .into_iter()
/// .collect();
///
/// let mut builder = Builder::new(&ElectionRules::new(School::Ses, 2)?)?.roster(roster);
///
/// builder.add_vote_simple("10001", School::Ses, "Anna, Bob");
/// builder.add_vote_simple("10002", School::Ses, "Anna");
///
/// let res = builder.finish();
/// assert_eq!(res.record.valid, 3);
/// assert_eq!(res.result.elected, vec!["Anna".to_string(), "Bob".to_string()]);
///
/// # Ok::<(), VotingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: ElectionRules,
    pub(crate) _roster: Roster,
    pub(crate) _directory: Directory,
    pub(crate) _tally: Tally,
    pub(crate) _record: VotingRecord,
    pub(crate) _seen_voters: HashSet<String>,
}

impl Builder {
    /// Starts a count with an empty roster and the built-in directory.
    pub fn new(rules: &ElectionRules) -> Result<Builder, VotingErrors> {
        if rules.num_seats == 0 {
            return Err(VotingErrors::NoSeats);
        }
        Ok(Builder {
            _rules: rules.clone(),
            _roster: Roster::new(),
            _directory: Directory::default(),
            _tally: Tally::new(),
            _record: VotingRecord::default(),
            _seen_voters: HashSet::new(),
        })
    }

    pub fn roster(self, roster: Roster) -> Builder {
        Builder {
            _roster: roster,
            ..self
        }
    }

    pub fn directory(self, directory: Directory) -> Builder {
        Builder {
            _directory: directory,
            ..self
        }
    }

    /// Validates a ballot and counts it.
    ///
    /// Returns the status of the ballot. Invalid and duplicate ballots are sent to
    /// the audit log.
    pub fn add_ballot(&mut self, ballot: &Ballot, audit: &mut dyn AuditLog) -> BallotStatus {
        let status = classify_ballot(
            ballot,
            &self._roster,
            &self._directory,
            &mut self._seen_voters,
            &self._rules,
            audit,
        );
        debug!("add_ballot: ballot {}: {:?}", ballot.id, status);
        match &status {
            BallotStatus::Valid(candidates) => {
                record_votes(candidates, &mut self._tally, &mut self._record);
            }
            BallotStatus::Invalid => self._record.invalid += 1,
            BallotStatus::WrongSchool => self._record.wrong_school += 1,
            BallotStatus::Duplicate => self._record.duplicate += 1,
        }
        status
    }

    /// Adds a vote that only fills the nominee field of one school.
    ///
    /// Audit findings go to the log.
    pub fn add_vote_simple(
        &mut self,
        voter_id: &str,
        school: School,
        candidates: &str,
    ) -> BallotStatus {
        let id = format!("ballot-{:08}", self.num_ballots() + 1);
        let ballot = Ballot::single_field(&id, voter_id, school, candidates);
        self.add_ballot(&ballot, &mut LogAudit)
    }

    /// The number of ballots processed so far.
    ///
    /// Valid ballots are counted once each, whatever the number of candidates on them.
    pub fn num_ballots(&self) -> u64 {
        self._seen_voters.len() as u64 + self._record.rejected()
    }

    pub fn voting_record(&self) -> &VotingRecord {
        &self._record
    }

    pub fn tally(&self) -> &Tally {
        &self._tally
    }

    pub fn seen_voters(&self) -> &HashSet<String> {
        &self._seen_voters
    }

    /// Sorts the tally and allocates the seats.
    pub fn finish(self) -> VotingResult {
        let tally = sort_tally(&self._tally);
        let groups = group_by_count(&tally);
        debug!("finish: groups: {:?}", groups);
        let result = allocate_seats(&groups, self._rules.num_seats);
        VotingResult {
            record: self._record,
            tally,
            result,
        }
    }
}
