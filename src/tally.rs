use log::{debug, info, warn};

use senate_voting::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value as JSValue;
use text_diff::print_diff;

use senate_voting::builder::Builder;

use crate::args::Args;
use crate::tally::audit::AuditFile;
use crate::tally::config_reader::*;
use crate::tally::io_common::*;
use crate::tally::report::*;

mod audit;
mod config_reader;
mod io_common;
mod io_csv;
mod io_xlsx;
mod report;

#[derive(Debug, Snafu)]
pub enum TallyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON content of {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing the summary"))]
    SerializingJson { source: serde_json::Error },

    #[snafu(display(
        "Missing option {name}: set it in the configuration file or on the command line"
    ))]
    MissingOption { name: String },
    #[snafu(display("Invalid value for option {name}: {value}"))]
    InvalidOption { name: String, value: String },
    #[snafu(display("Invalid election rules: {source}"))]
    Rules { source: VotingErrors },

    #[snafu(display("Error listing the files of {dir}"))]
    ListingDirectory {
        source: std::io::Error,
        dir: String,
    },
    #[snafu(display("No ballot file (csv or xlsx) found in {dir}"))]
    NoBallotFile { dir: String },
    #[snafu(display("Multiple ballot files found in {dir}: {files:?}"))]
    MultipleBallotFiles { dir: String, files: Vec<String> },

    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Excel file {path} has no worksheet {name}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display("File {path} has no header row"))]
    EmptyTable { path: String },
    #[snafu(display("Unsupported input format for {path} (expected csv or xlsx)"))]
    UnsupportedFormat { path: String },
    #[snafu(display("Column {column:?} not found in {path}"))]
    MissingColumn { column: String, path: String },

    #[snafu(display("Error writing the audit log {path}"))]
    WritingAudit {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing the summary {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TallyResult<T> = Result<T, TallyError>;

/// Reads the inputs, counts the ballots and allocates the seats.
///
/// Invalid and duplicate ballots are written to the audit log of the settings.
pub fn tabulate(settings: &ElectionSettings) -> TallyResult<VotingResult> {
    for (major, schools) in settings.directory.ambiguous_majors() {
        warn!(
            "Major {:?} is listed under several schools {:?}, its students are counted in {}",
            major, schools, schools[0]
        );
    }

    let roster = read_roster(settings)?;
    info!(
        "Read {} students from {:?}",
        roster.len(),
        settings.roster_file
    );
    let ballots = read_ballots(settings)?;
    info!(
        "Read {} ballots from {:?}",
        ballots.len(),
        settings.voting_file
    );

    let mut audit = AuditFile::create(&settings.audit_log)?;
    let mut builder = Builder::new(&settings.rules)
        .context(RulesSnafu {})?
        .roster(roster)
        .directory(settings.directory.clone());
    let pb = progress_bar(ballots.len(), settings.show_progress);
    for ballot in ballots.iter() {
        builder.add_ballot(ballot, &mut audit);
        pb.inc(1);
    }
    pb.finish_and_clear();
    let res = builder.finish();
    let num_flagged = audit.finish()?;
    info!(
        "{} ballots written to the audit log {:?}",
        num_flagged, settings.audit_log
    );
    debug!("tabulate: result: {:?}", res);
    Ok(res)
}

/// The bar shown while the ballots are checked. It draws on stderr, and only when
/// stderr is a terminal.
fn progress_bar(len: usize, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let style = ProgressStyle::default_bar()
        .template("Checking ballots [{bar:40.cyan/blue}] {pos}/{len}")
        .map(|style| style.progress_chars("=>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    let pb = ProgressBar::new(len as u64);
    pb.set_style(style);
    pb
}

pub fn run_election(args: &Args) -> TallyResult<()> {
    let (config, root) = load_config(args.config.as_deref())?;
    info!("config: {:?}", config);
    let settings = resolve_settings(&config, args, &root)?;
    info!("settings: {:?}", settings);

    println!(
        "\nIdentified the voting file as '{}'",
        simplify_file_name(&settings.voting_file)
    );

    let result = tabulate(&settings)?;
    print!("{}", format_report(&result, settings.rules.num_seats));

    let summary_js = build_summary_js(&settings, &result);
    let pretty_js_stats =
        serde_json::to_string_pretty(&summary_js).context(SerializingJsonSnafu {})?;

    match args.out.as_deref() {
        Some("stdout") => println!("{}", pretty_js_stats),
        Some(out_path) => {
            fs::write(out_path, &pretty_js_stats)
                .context(WritingOutputSnafu { path: out_path })?;
            info!("Summary written to {:?}", out_path);
        }
        None => {}
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = args.reference.as_deref() {
        let summary_ref: JSValue = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(SerializingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(())
}

/// Finds the configuration. Without an explicit path, `config.json` is used if it exists
/// and the options are otherwise expected on the command line.
fn load_config(config_path: Option<&str>) -> TallyResult<(ElectionConfig, PathBuf)> {
    let (path, explicit) = match config_path {
        Some(p) => (PathBuf::from(p), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    let root = parent_dir(&path);
    if !explicit && !path.exists() {
        info!("No configuration file found, using the command line options");
        return Ok((ElectionConfig::default(), root));
    }
    let config = read_config(&path.display().to_string())?;
    Ok((config, root))
}

// The worksheet option names a sheet of the survey export: the roster is always read
// from its first sheet.
fn read_roster(settings: &ElectionSettings) -> TallyResult<Roster> {
    let table = read_table(&settings.roster_file, None)?;
    roster_from_table(&table, &settings.roster_columns)
}

fn read_ballots(settings: &ElectionSettings) -> TallyResult<Vec<Ballot>> {
    let table = read_table(&settings.voting_file, settings.worksheet.as_deref())?;
    ballots_from_table(&table, &settings.ballot_columns)
}

/// The directory that holds a file, for resolving the paths that it mentions.
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
