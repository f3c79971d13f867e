use clap::Parser;

/// This is a tabulation program for school senate elections.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, default config.json) The JSON file describing the election.
    /// The input files it mentions are relative to its directory.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing the outcome of an election in JSON format. If provided, senatetally will
    /// check that the tabulated output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in JSON format to the given
    /// location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The survey export with the ballots. Setting this option overrides the votingFile option
    /// of the configuration. If not specified anywhere, the ballots are searched in the directory of the configuration.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (file path or empty) The roster of the students. Overrides the dataFile option.
    #[clap(short, long, value_parser)]
    pub data: Option<String>,

    /// (ses, sob, sse or hass) The school holding the election. Overrides the school option.
    #[clap(short, long, value_parser)]
    pub school: Option<String>,

    /// (positive number) The number of seats to fill. Overrides the numSeats option.
    #[clap(long, value_parser)]
    pub seats: Option<u32>,

    /// The name of the first nominee column in the survey export. Overrides the candidateColumnName option.
    #[clap(long, value_parser)]
    pub candidate_column: Option<String>,

    /// (file path) Where to write the invalid and duplicate ballots. Overrides the auditLog option.
    #[clap(long, value_parser)]
    pub audit_log: Option<String>,

    /// (default: first sheet) When the ballots are in an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output and hide the
    /// progress bar.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
