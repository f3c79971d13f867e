use crate::tally::*;

use chrono::Local;
use senate_voting::directory::Directory;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::tally::audit::default_audit_log_name;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_VOTER_ID_COLUMN: &str = "Campus Wide ID (CWID)";
pub const DEFAULT_ROSTER_ID_COLUMN: &str = "CWID";
pub const DEFAULT_ROSTER_MAJOR_COLUMN: &str = "Major";

/// The content of the configuration file.
///
/// All the fields are optional at this stage, since they can also be passed on the
/// command line. See `resolve_settings` for the required ones.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElectionConfig {
    pub school: Option<String>,
    #[serde(rename = "numSeats")]
    pub num_seats: Option<JSValue>,
    #[serde(rename = "dataFile")]
    pub data_file: Option<String>,
    #[serde(rename = "candidateColumnName")]
    pub candidate_column_name: Option<String>,
    #[serde(rename = "votingFile")]
    pub voting_file: Option<String>,
    #[serde(rename = "voterIdColumnName")]
    pub voter_id_column_name: Option<String>,
    #[serde(rename = "rosterIdColumnName")]
    pub roster_id_column_name: Option<String>,
    #[serde(rename = "rosterMajorColumnName")]
    pub roster_major_column_name: Option<String>,
    #[serde(rename = "nomineeColumnOrder")]
    pub nominee_column_order: Option<Vec<String>>,
    #[serde(rename = "candidateDelimiter")]
    pub candidate_delimiter: Option<String>,
    #[serde(rename = "majorsFile")]
    pub majors_file: Option<String>,
    #[serde(rename = "auditLog")]
    pub audit_log: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

/// The columns to read in the roster.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RosterColumns {
    pub id: String,
    pub major: String,
}

/// The columns to read in the survey export.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BallotColumns {
    pub voter_id: String,
    /// The title of the nominee question. The column of the n-th school in
    /// `nominee_order` is the title followed by `.n` (nothing for the first one).
    pub candidate_column: String,
    pub nominee_order: Vec<School>,
}

impl BallotColumns {
    pub fn nominee_columns(&self) -> Vec<(School, String)> {
        self.nominee_order
            .iter()
            .enumerate()
            .map(|(idx, school)| {
                if idx == 0 {
                    (*school, self.candidate_column.clone())
                } else {
                    (*school, format!("{}.{}", self.candidate_column, idx))
                }
            })
            .collect()
    }
}

/// Everything needed to run an election, once the configuration file and the command
/// line have been merged and checked.
#[derive(Debug, Clone)]
pub struct ElectionSettings {
    pub rules: ElectionRules,
    pub roster_file: PathBuf,
    pub voting_file: PathBuf,
    pub roster_columns: RosterColumns,
    pub ballot_columns: BallotColumns,
    pub directory: Directory,
    pub audit_log: PathBuf,
    /// The worksheet of the survey export, when it is an Excel file.
    pub worksheet: Option<String>,
    pub show_progress: bool,
}

pub fn read_config(path: &str) -> TallyResult<ElectionConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}

/// Merges the configuration file with the command line and checks the result.
///
/// The paths of the configuration file are relative to `root`, the paths of the
/// command line to the working directory.
pub fn resolve_settings(
    config: &ElectionConfig,
    args: &Args,
    root: &Path,
) -> TallyResult<ElectionSettings> {
    let school_s = args
        .school
        .clone()
        .or_else(|| config.school.clone())
        .context(MissingOptionSnafu { name: "school" })?;
    let school: School = school_s.parse().context(RulesSnafu {})?;

    let num_seats: u32 = match args.seats {
        Some(x) => x,
        None => read_js_seats(&config.num_seats)?,
    };

    let mut rules = ElectionRules::new(school, num_seats).context(RulesSnafu {})?;
    if let Some(delim) = config.candidate_delimiter.as_deref() {
        rules = rules.with_delimiter(delim);
    }

    let roster_file = match (&args.data, &config.data_file) {
        (Some(p), _) => PathBuf::from(p),
        (None, Some(p)) => root.join(p),
        (None, None) => {
            return MissingOptionSnafu { name: "dataFile" }.fail();
        }
    };

    let voting_file = match (&args.input, &config.voting_file) {
        (Some(p), _) => PathBuf::from(p),
        (None, Some(p)) => root.join(p),
        (None, None) => find_ballot_file(root, &[roster_file.clone()])?,
    };

    let candidate_column = args
        .candidate_column
        .clone()
        .or_else(|| config.candidate_column_name.clone())
        .context(MissingOptionSnafu {
            name: "candidateColumnName",
        })?;

    let nominee_order = match &config.nominee_column_order {
        Some(codes) => read_nominee_order(codes)?,
        None => School::ALL.to_vec(),
    };

    let directory = match &config.majors_file {
        Some(p) => read_majors_file(&root.join(p))?,
        None => Directory::default(),
    };
    if directory.is_empty() {
        return Err(VotingErrors::EmptyDirectory).context(RulesSnafu {});
    }

    let audit_log = match (&args.audit_log, &config.audit_log) {
        (Some(p), _) => PathBuf::from(p),
        (None, Some(p)) => root.join(p),
        (None, None) => root.join(default_audit_log_name(Local::now().date_naive())),
    };

    Ok(ElectionSettings {
        rules,
        roster_file,
        voting_file,
        roster_columns: RosterColumns {
            id: config
                .roster_id_column_name
                .clone()
                .unwrap_or_else(|| DEFAULT_ROSTER_ID_COLUMN.to_string()),
            major: config
                .roster_major_column_name
                .clone()
                .unwrap_or_else(|| DEFAULT_ROSTER_MAJOR_COLUMN.to_string()),
        },
        ballot_columns: BallotColumns {
            voter_id: config
                .voter_id_column_name
                .clone()
                .unwrap_or_else(|| DEFAULT_VOTER_ID_COLUMN.to_string()),
            candidate_column,
            nominee_order,
        },
        directory,
        audit_log,
        worksheet: args
            .excel_worksheet_name
            .clone()
            .or_else(|| config.excel_worksheet_name.clone()),
        show_progress: !args.verbose,
    })
}

/// The order of the schools in the nominee columns. It must name every school once.
fn read_nominee_order(codes: &[String]) -> TallyResult<Vec<School>> {
    let invalid = || InvalidOptionSnafu {
        name: "nomineeColumnOrder",
        value: format!("{:?}", codes),
    };
    let mut res: Vec<School> = Vec::new();
    for code in codes.iter() {
        let school: School = code.parse().ok().context(invalid())?;
        ensure!(!res.contains(&school), invalid());
        res.push(school);
    }
    ensure!(res.len() == School::ALL.len(), invalid());
    Ok(res)
}

/// A directory of majors in JSON: school code -> list of majors.
///
/// The lookup order is always ses, sob, sse, hass.
pub fn read_majors_file(path: &Path) -> TallyResult<Directory> {
    let path_s = path.display().to_string();
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path: &path_s })?;
    let js: HashMap<String, Vec<String>> =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path: &path_s })?;

    for code in js.keys() {
        ensure!(
            code.parse::<School>().is_ok(),
            InvalidOptionSnafu {
                name: "majorsFile",
                value: format!("unknown school {:?} in {}", code, path_s),
            }
        );
    }

    let mut directory = Directory::new();
    for school in School::ALL.iter() {
        let majors = js
            .iter()
            .filter(|(code, _)| code.parse::<School>().ok() == Some(*school))
            .flat_map(|(_, majors)| majors.iter());
        for major in majors {
            directory.insert(*school, major);
        }
    }
    Ok(directory)
}

pub fn read_summary(path: &str) -> TallyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}

fn read_js_seats(x: &Option<JSValue>) -> TallyResult<u32> {
    let invalid = |v: &JSValue| InvalidOptionSnafu {
        name: "numSeats",
        value: v.to_string(),
    };
    match x {
        Some(v @ JSValue::Number(n)) => n
            .as_u64()
            .and_then(|x| u32::try_from(x).ok())
            .context(invalid(v)),
        Some(v @ JSValue::String(s)) => s.trim().parse::<u32>().ok().context(invalid(v)),
        Some(v) => invalid(v).fail(),
        None => MissingOptionSnafu { name: "numSeats" }.fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn seats_as_number_or_string() {
        assert_eq!(read_js_seats(&Some(serde_json::json!(3))).unwrap(), 3);
        assert_eq!(read_js_seats(&Some(serde_json::json!(" 4 "))).unwrap(), 4);
        assert!(read_js_seats(&Some(serde_json::json!(-1))).is_err());
        assert!(read_js_seats(&Some(serde_json::json!(2.5))).is_err());
        assert!(read_js_seats(&Some(serde_json::json!(true))).is_err());
        assert!(matches!(
            read_js_seats(&None),
            Err(TallyError::MissingOption { .. })
        ));
    }

    #[test]
    fn nominee_columns() {
        let cols = BallotColumns {
            voter_id: DEFAULT_VOTER_ID_COLUMN.to_string(),
            candidate_column: "Nominees".to_string(),
            nominee_order: vec![School::Hass, School::Ses, School::Sob, School::Sse],
        };
        assert_eq!(
            cols.nominee_columns(),
            vec![
                (School::Hass, "Nominees".to_string()),
                (School::Ses, "Nominees.1".to_string()),
                (School::Sob, "Nominees.2".to_string()),
                (School::Sse, "Nominees.3".to_string()),
            ]
        );
    }

    #[test]
    fn nominee_order_must_be_complete() {
        let codes = |l: &[&str]| l.iter().map(|s| s.to_string()).collect::<Vec<String>>();
        assert!(read_nominee_order(&codes(&["sob", "SES", "hass", "sse"])).is_ok());
        assert!(read_nominee_order(&codes(&["ses", "sob", "sse"])).is_err());
        assert!(read_nominee_order(&codes(&["ses", "ses", "sse", "hass"])).is_err());
        assert!(read_nominee_order(&codes(&["ses", "sob", "sse", "law"])).is_err());
    }

    #[test]
    fn majors_file() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("majors.json");
        fs::write(
            &p,
            r#"{"hass": ["Data Science"], "ses": ["data science", "Physics"]}"#,
        )
        .unwrap();
        let d = read_majors_file(&p).unwrap();
        // Lookup order is the school order, not the file order.
        assert_eq!(d.school_for_major("DATA SCIENCE"), Some(School::Ses));
        assert_eq!(d.school_for_major("physics"), Some(School::Ses));
        assert_eq!(d.school_for_major("finance"), None);

        fs::write(&p, r#"{"law": ["torts"]}"#).unwrap();
        assert!(matches!(
            read_majors_file(&p),
            Err(TallyError::InvalidOption { .. })
        ));
    }

    #[test]
    fn parse_full_config() {
        let js = r#"{
            "school": "hass",
            "numSeats": "3",
            "dataFile": "students.xlsx",
            "candidateColumnName": "Nominees",
            "votingFile": "export.csv",
            "voterIdColumnName": "ID",
            "rosterIdColumnName": "Student ID",
            "rosterMajorColumnName": "Program",
            "nomineeColumnOrder": ["hass", "ses", "sob", "sse"],
            "candidateDelimiter": ";",
            "auditLog": "audit.log",
            "excelWorksheetName": "Responses"
        }"#;
        let config: ElectionConfig = serde_json::from_str(js).unwrap();
        let settings = resolve_settings(&config, &Args::default(), Path::new("/elections")).unwrap();
        assert_eq!(settings.rules.school, School::Hass);
        assert_eq!(settings.rules.num_seats, 3);
        assert_eq!(settings.rules.candidate_delimiter, ";");
        assert_eq!(settings.roster_file, PathBuf::from("/elections/students.xlsx"));
        assert_eq!(settings.voting_file, PathBuf::from("/elections/export.csv"));
        assert_eq!(settings.audit_log, PathBuf::from("/elections/audit.log"));
        assert_eq!(settings.roster_columns.id, "Student ID");
        assert_eq!(settings.roster_columns.major, "Program");
        assert_eq!(settings.ballot_columns.voter_id, "ID");
        assert_eq!(settings.ballot_columns.nominee_order[0], School::Hass);
        assert_eq!(settings.worksheet.as_deref(), Some("Responses"));
        assert!(settings.show_progress);

        let verbose = Args {
            verbose: true,
            ..Args::default()
        };
        let settings = resolve_settings(&config, &verbose, Path::new("/elections")).unwrap();
        assert!(!settings.show_progress);
    }

    #[test]
    fn unknown_school() {
        let config = ElectionConfig {
            school: Some("law".to_string()),
            ..ElectionConfig::default()
        };
        let res = resolve_settings(&config, &Args::default(), Path::new("."));
        assert!(matches!(
            res,
            Err(TallyError::Rules {
                source: VotingErrors::UnknownSchool(_)
            })
        ));
    }
}
