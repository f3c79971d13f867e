// The audit log: the ballots that need to be reviewed by hand.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::tally::*;

const SEPARATOR_WIDTH: usize = 100;

/// The dated file name used when no audit log is configured.
pub fn default_audit_log_name(date: NaiveDate) -> String {
    format!("InvalidAndDuplicateVotes_{}.log", date.format("%m-%d-%Y"))
}

/// One entry: a timestamped header line, the content of the ballot, then a separator.
pub fn format_entry(ts: &NaiveDateTime, finding: AuditFinding, ballot: &Ballot) -> String {
    format!(
        "{} - WARNING - {}: {}\n{}\n",
        ts.format("%Y-%m-%d %H:%M:%S,%3f"),
        finding,
        ballot.describe(),
        "-".repeat(SEPARATOR_WIDTH)
    )
}

/// Writes the flagged ballots to a file.
///
/// The audit trait cannot fail, so the first write error is kept and returned by
/// `finish`.
pub struct AuditFile {
    path: String,
    writer: BufWriter<File>,
    error: Option<io::Error>,
    num_entries: u64,
}

impl AuditFile {
    pub fn create(path: &Path) -> TallyResult<AuditFile> {
        let path_s = path.display().to_string();
        let file = File::create(path).context(WritingAuditSnafu { path: &path_s })?;
        info!("Writing the audit log to {:?}", path_s);
        Ok(AuditFile {
            path: path_s,
            writer: BufWriter::new(file),
            error: None,
            num_entries: 0,
        })
    }

    /// Flushes the file. Returns the number of entries written.
    pub fn finish(mut self) -> TallyResult<u64> {
        if let Some(e) = self.error.take() {
            return Err(e).context(WritingAuditSnafu { path: self.path });
        }
        self.writer
            .flush()
            .context(WritingAuditSnafu { path: &self.path })?;
        Ok(self.num_entries)
    }
}

impl AuditLog for AuditFile {
    fn flag(&mut self, finding: AuditFinding, ballot: &Ballot) {
        debug!("audit: {} {}", finding, ballot.id);
        if self.error.is_some() {
            return;
        }
        let entry = format_entry(&Local::now().naive_local(), finding, ballot);
        match self.writer.write_all(entry.as_bytes()) {
            Ok(()) => self.num_entries += 1,
            Err(e) => self.error = Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn ballot() -> Ballot {
        Ballot::single_field("votes.csv-00000003", "1001", School::Ses, "Carl").with_record(
            vec![
                ("CWID".to_string(), "1001".to_string()),
                ("Nominees".to_string(), "Carl".to_string()),
            ],
        )
    }

    #[test]
    fn default_name() {
        let d = NaiveDate::from_ymd_opt(2023, 10, 2).unwrap();
        assert_eq!(
            default_audit_log_name(d),
            "InvalidAndDuplicateVotes_10-02-2023.log"
        );
    }

    #[test]
    fn entry_format() {
        let ts = NaiveDate::from_ymd_opt(2023, 10, 2)
            .unwrap()
            .and_hms_milli_opt(9, 5, 7, 42)
            .unwrap();
        let e = format_entry(&ts, AuditFinding::Duplicate, &ballot());
        let lines: Vec<&str> = e.lines().collect();
        assert_eq!(
            lines[0],
            "2023-10-02 09:05:07,042 - WARNING - Duplicate vote: ballot votes.csv-00000003"
        );
        assert!(lines.contains(&"Nominees    Carl"));
        assert_eq!(lines.last().copied(), Some("-".repeat(100).as_str()));
    }

    #[test]
    fn write_entries() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("audit.log");
        let mut audit = AuditFile::create(&p).unwrap();
        audit.flag(AuditFinding::Invalid, &ballot());
        audit.flag(AuditFinding::Duplicate, &ballot());
        assert_eq!(audit.finish().unwrap(), 2);
        let content = fs::read_to_string(&p).unwrap();
        assert_eq!(content.matches(" - WARNING - ").count(), 2);
        assert!(content.contains("Invalid vote: ballot votes.csv-00000003"));
    }

    #[test]
    fn unwritable_location() {
        let res = AuditFile::create(Path::new("/nonexistent/dir/audit.log"));
        assert!(matches!(res, Err(TallyError::WritingAudit { .. })));
    }
}
