mod config;
pub mod builder;
pub mod directory;
pub mod manual;

use log::{debug, info, warn};

use std::collections::HashSet;

pub use crate::config::*;
use crate::directory::Directory;

/// Receives the ballots that must be reviewed by hand.
///
/// Invalid and duplicate ballots are reported with their original content. Ballots
/// for another school and valid ballots are not reported.
pub trait AuditLog {
    fn flag(&mut self, finding: AuditFinding, ballot: &Ballot);
}

/// Audit log that forwards the findings to the `log` facade, as warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAudit;

impl AuditLog for LogAudit {
    fn flag(&mut self, finding: AuditFinding, ballot: &Ballot) {
        warn!("{}: {}", finding, ballot.describe());
    }
}

/// The school of a student, derived from the major declared in the roster.
///
/// Returns None if the student is not in the roster or if the major is not
/// in the directory.
pub fn school_of(cwid: &str, roster: &Roster, directory: &Directory) -> Option<School> {
    let major = roster.major_of(cwid)?;
    directory.school_for_major(major)
}

/// The first nominee field that holds a value, with the school it belongs to.
///
/// Blank fields count as empty, so a ballot with only spaces in its nominee fields
/// is invalid.
pub fn nominee_selection(ballot: &Ballot) -> Option<(School, &str)> {
    ballot
        .nominees
        .iter()
        .find_map(|(school, field)| match field.as_deref() {
            Some(s) if !s.trim().is_empty() => Some((*school, s)),
            _ => None,
        })
}

/// Splits the content of a nominee field into candidate names.
///
/// Empty fragments are dropped, names are trimmed.
pub fn split_candidates(field: &str, delimiter: &str) -> Vec<String> {
    let parts: Vec<&str> = if delimiter.is_empty() {
        vec![field]
    } else {
        field.split(delimiter).collect()
    };
    parts
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Decides what to do with one ballot.
///
/// The rules are applied in order:
/// - no nominee field filled: invalid
/// - nominees or voter from another school (or voter of unknown school): wrong school
/// - voter already seen: duplicate
/// - otherwise the ballot is valid and the voter is marked as seen.
///
/// Invalid and duplicate ballots are sent to the audit log.
pub fn classify_ballot(
    ballot: &Ballot,
    roster: &Roster,
    directory: &Directory,
    seen_voters: &mut HashSet<String>,
    rules: &ElectionRules,
    audit: &mut dyn AuditLog,
) -> BallotStatus {
    let voter_school = school_of(&ballot.voter_id, roster, directory);
    let selection = nominee_selection(ballot);
    debug!(
        "classify_ballot: ballot {}: voter {:?} school {:?} selection {:?}",
        ballot.id, ballot.voter_id, voter_school, selection
    );

    let (nominee_school, field) = match selection {
        Some(x) => x,
        None => {
            audit.flag(AuditFinding::Invalid, ballot);
            return BallotStatus::Invalid;
        }
    };

    if nominee_school != rules.school || voter_school != Some(rules.school) {
        return BallotStatus::WrongSchool;
    }

    if seen_voters.contains(&ballot.voter_id) {
        audit.flag(AuditFinding::Duplicate, ballot);
        return BallotStatus::Duplicate;
    }

    seen_voters.insert(ballot.voter_id.clone());
    BallotStatus::Valid(split_candidates(field, &rules.candidate_delimiter))
}

/// Adds the candidates of an accepted ballot to the tally.
///
/// Every candidate also increments the valid counter of the record.
pub fn record_votes(candidates: &[String], tally: &mut Tally, record: &mut VotingRecord) {
    for candidate in candidates.iter() {
        record.valid += 1;
        tally.add_vote(candidate);
    }
}

/// Candidates by decreasing number of votes. Candidates with the same count keep
/// their first-seen order.
pub fn sort_tally(tally: &Tally) -> Vec<(String, u64)> {
    let mut res = tally.entries();
    res.sort_by(|a, b| b.1.cmp(&a.1));
    res
}

/// Groups the candidates that have the same number of votes.
///
/// The groups come out in the order of the input, which is by decreasing
/// count for the output of `sort_tally`.
pub fn group_by_count(sorted_tally: &[(String, u64)]) -> Vec<(u64, Vec<String>)> {
    let mut groups: Vec<(u64, Vec<String>)> = Vec::new();
    for (name, count) in sorted_tally.iter() {
        match groups.iter_mut().find(|(c, _)| c == count) {
            Some((_, names)) => names.push(name.clone()),
            None => groups.push((*count, vec![name.clone()])),
        }
    }
    groups
}

/// Fills the seats with the groups of candidates, from the highest count down.
///
/// A group is elected as a whole when it fits in the seats left. The first group that
/// does not fit stops the allocation: its candidates are tied for the remaining seats.
/// The allocation also stops when all the seats are filled.
pub fn allocate_seats(groups: &[(u64, Vec<String>)], num_seats: u32) -> ElectionResult {
    let mut sorted_groups: Vec<&(u64, Vec<String>)> = groups.iter().collect();
    sorted_groups.sort_by(|a, b| b.0.cmp(&a.0));

    let num_seats = num_seats as usize;
    let mut res = ElectionResult::default();
    for (count, names) in sorted_groups {
        let open_seats = num_seats - res.elected.len();
        if open_seats == 0 {
            break;
        }
        if names.len() <= open_seats {
            debug!("allocate_seats: electing {:?} with {} votes", names, count);
            res.elected.extend(names.iter().cloned());
        } else {
            debug!(
                "allocate_seats: {:?} tied with {} votes for {} seats",
                names, count, open_seats
            );
            res.remaining = Some(open_seats as u32);
            res.tied = Some(names.clone());
            break;
        }
    }
    res
}

/// Runs the election with the given rules for the given ballots.
///
/// Arguments:
/// * `ballots` the survey responses, in the order they were submitted
/// * `roster` the students allowed to vote
/// * `directory` the majors of each school
/// * `rules` the rules that govern this election
/// * `audit` receives the invalid and duplicate ballots
pub fn run_election_stats(
    ballots: &[Ballot],
    roster: &Roster,
    directory: &Directory,
    rules: &ElectionRules,
    audit: &mut dyn AuditLog,
) -> Result<VotingResult, VotingErrors> {
    info!(
        "Processing {:?} ballots, {:?} students, rules: {:?}",
        ballots.len(),
        roster.len(),
        rules
    );
    if rules.num_seats == 0 {
        return Err(VotingErrors::NoSeats);
    }
    if directory.is_empty() {
        return Err(VotingErrors::EmptyDirectory);
    }

    let mut builder = builder::Builder::new(rules)?
        .roster(roster.clone())
        .directory(directory.clone());
    for ballot in ballots.iter() {
        builder.add_ballot(ballot, audit);
    }
    let res = builder.finish();
    info!(
        "Voting record: {:?}, elected: {:?}",
        res.record, res.result.elected
    );
    Ok(res)
}
