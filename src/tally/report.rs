// The outputs of a run: the printed report and the JSON summary.

use serde_json::json;

use crate::tally::*;

fn plural(n: u64, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{} {}", n, one)
    } else {
        format!("{} {}", n, many)
    }
}

/// The human-readable outcome, as printed at the end of a run.
pub fn format_report(result: &VotingResult, num_seats: u32) -> String {
    let mut out = String::from("\nThe voting record is:\n");
    for (key, count) in result.record.entries().iter() {
        out.push_str(&format!("    {}: {}\n", key, count));
    }

    let elected = &result.result.elected;
    let header = if elected.len() == 1 {
        "The 1 elected candidate is".to_string()
    } else {
        format!("The {} elected candidates are", elected.len())
    };
    out.push_str(&format!("\n{}:\n", header));
    for name in elected.iter() {
        out.push_str(&format!("    {}\n", name));
    }

    match (&result.result.tied, result.result.remaining) {
        (Some(tied), Some(remaining)) => {
            let is_are = if remaining == 1 { "is" } else { "are" };
            out.push_str(&format!(
                "\nThere {} {} remaining. The tied candidates are: {}\n",
                is_are,
                plural(remaining as u64, "seat", "seats"),
                tied.join(", ")
            ));
        }
        _ if result.everyone_elected() => {
            let remaining = num_seats.saturating_sub(elected.len() as u32);
            let is_are = if remaining == 1 { "is" } else { "are" };
            out.push_str(&format!(
                "\nEveryone was elected. There {} {} remaining.\n",
                is_are,
                plural(remaining as u64, "seat", "seats")
            ));
        }
        _ => {}
    }
    out
}

/// The JSON summary of a run, written with `--out` and compared with `--reference`.
///
/// Only the file names of the inputs are kept so that the summary does not depend on
/// where the election directory is.
pub fn build_summary_js(settings: &ElectionSettings, result: &VotingResult) -> JSValue {
    let record = &result.record;
    let tally: Vec<JSValue> = result
        .tally
        .iter()
        .map(|(name, votes)| json!({"candidate": name, "votes": votes}))
        .collect();
    json!({
        "config": {
            "school": settings.rules.school.code(),
            "numSeats": settings.rules.num_seats,
            "dataFile": simplify_file_name(&settings.roster_file),
            "votingFile": simplify_file_name(&settings.voting_file),
        },
        "votingRecord": {
            "valid": record.valid,
            "invalid": record.invalid,
            "wrongSchool": record.wrong_school,
            "duplicate": record.duplicate,
        },
        "tally": tally,
        "results": {
            "elected": result.result.elected,
            "remainingSeats": result.result.remaining,
            "tied": result.result.tied,
        },
    })
}
