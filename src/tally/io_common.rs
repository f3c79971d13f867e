// Primitives shared by the CSV and Excel readers.

use std::collections::HashMap;

use crate::tally::config_reader::{BallotColumns, RosterColumns};
use crate::tally::*;

/// A table as read from a file: a header row and the rows below it.
///
/// Cells are kept as text, missing cells at the end of a row are empty.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Table {
    pub path: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Builds a table, renaming repeated headers the way survey exports are usually
    /// loaded: the second `Q` becomes `Q.1`, the third `Q.2`, and so on.
    pub fn new(path: &str, headers: Vec<String>, rows: Vec<Vec<String>>) -> Table {
        Table {
            path: path.to_string(),
            headers: dedupe_headers(&headers),
            rows,
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn require_column(&self, name: &str) -> TallyResult<usize> {
        self.column_index(name).context(MissingColumnSnafu {
            column: name,
            path: &self.path,
        })
    }
}

fn dedupe_headers(headers: &[String]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut res: Vec<String> = Vec::new();
    for h in headers.iter() {
        let h = h.trim().to_string();
        let n = seen.entry(h.clone()).or_insert(0);
        if *n == 0 {
            res.push(h);
        } else {
            res.push(format!("{}.{}", h, n));
        }
        *n += 1;
    }
    res
}

pub fn simplify_file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(Path::new(path));
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|s| s.as_str()).unwrap_or("")
}

/// Reads a csv or xlsx file, depending on its extension.
pub fn read_table(path: &Path, worksheet: Option<&str>) -> TallyResult<Table> {
    let path_s = path.display().to_string();
    info!("Attempting to read file {:?}", path_s);
    match extension(path).as_deref() {
        Some("csv") => io_csv::read_csv_table(&path_s),
        Some("xlsx") => io_xlsx::read_xlsx_table(&path_s, worksheet),
        _ => UnsupportedFormatSnafu { path: path_s }.fail(),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Looks for the one ballot file of the directory: the only csv or xlsx file that is
/// not excluded.
pub fn find_ballot_file(dir: &Path, excluded: &[PathBuf]) -> TallyResult<PathBuf> {
    let dir_s = dir.display().to_string();
    let excluded_names: Vec<String> = excluded.iter().map(|p| simplify_file_name(p)).collect();
    let entries = fs::read_dir(dir).context(ListingDirectorySnafu { dir: &dir_s })?;
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry.context(ListingDirectorySnafu { dir: &dir_s })?.path();
        if !path.is_file() {
            continue;
        }
        let name = simplify_file_name(&path);
        // Lock files left by Excel
        if name.starts_with("~$") || excluded_names.contains(&name) {
            continue;
        }
        if matches!(extension(&path).as_deref(), Some("csv") | Some("xlsx")) {
            files.push(path);
        }
    }
    files.sort();
    debug!("find_ballot_file: candidates in {:?}: {:?}", dir_s, files);
    match files.len() {
        0 => NoBallotFileSnafu { dir: dir_s }.fail(),
        1 => Ok(files.remove(0)),
        _ => MultipleBallotFilesSnafu {
            dir: dir_s,
            files: files
                .iter()
                .map(|p| simplify_file_name(p))
                .collect::<Vec<String>>(),
        }
        .fail(),
    }
}

pub fn roster_from_table(table: &Table, columns: &RosterColumns) -> TallyResult<Roster> {
    let id_idx = table.require_column(&columns.id)?;
    let major_idx = table.require_column(&columns.major)?;
    let mut roster = Roster::new();
    for (idx, row) in table.rows.iter().enumerate() {
        let cwid = cell(row, id_idx).trim();
        if cwid.is_empty() {
            debug!("roster_from_table: row {} has no id, skipping", idx + 2);
            continue;
        }
        if !roster.add_student(StudentRecord::new(cwid, cell(row, major_idx))) {
            warn!(
                "Student {} appears several times in {}, keeping the first major",
                cwid, table.path
            );
        }
    }
    Ok(roster)
}

pub fn ballots_from_table(table: &Table, columns: &BallotColumns) -> TallyResult<Vec<Ballot>> {
    let default_id = make_default_id(&table.path);
    let voter_idx = table.require_column(&columns.voter_id)?;
    table.require_column(&columns.candidate_column)?;

    let nominee_idxs: Vec<(School, Option<usize>)> = columns
        .nominee_columns()
        .into_iter()
        .map(|(school, name)| {
            let idx = table.column_index(&name);
            if idx.is_none() {
                warn!(
                    "Column {:?} not found in {}, no ballot can nominate for {}",
                    name, table.path, school
                );
            }
            (school, idx)
        })
        .collect();
    debug!("ballots_from_table: nominee columns: {:?}", nominee_idxs);

    let mut res: Vec<Ballot> = Vec::new();
    for (idx, row) in table.rows.iter().enumerate() {
        // The header is the first line
        let lineno = idx + 2;
        let nominees: Vec<(School, Option<String>)> = nominee_idxs
            .iter()
            .map(|(school, col)| {
                let value = col
                    .map(|c| cell(row, c).trim())
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string());
                (*school, value)
            })
            .collect();
        let record: Vec<(String, String)> = table
            .headers
            .iter()
            .enumerate()
            .map(|(c, h)| (h.clone(), cell(row, c).to_string()))
            .collect();
        let ballot =
            Ballot::new(&default_id(lineno), cell(row, voter_idx), nominees).with_record(record);
        debug!("ballots_from_table: {:?}", ballot);
        res.push(ballot);
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(l: &[&str]) -> Vec<String> {
        l.iter().map(|s| s.to_string()).collect()
    }

    fn columns() -> BallotColumns {
        BallotColumns {
            voter_id: "CWID".to_string(),
            candidate_column: "Nominees".to_string(),
            nominee_order: School::ALL.to_vec(),
        }
    }

    #[test]
    fn repeated_headers() {
        let t = Table::new(
            "votes.csv",
            strings(&["CWID", "Nominees", "Nominees", " Nominees ", "Nominees.1x"]),
            vec![],
        );
        assert_eq!(
            t.headers,
            strings(&["CWID", "Nominees", "Nominees.1", "Nominees.2", "Nominees.1x"])
        );
    }

    #[test]
    fn ballots() {
        let t = Table::new(
            "/tmp/votes.csv",
            strings(&["CWID", "Nominees", "Nominees", "Nominees", "Nominees"]),
            vec![
                strings(&["1001", "Alice, Bob", "", "", ""]),
                strings(&["1002", "", " ", "Carl"]),
                strings(&["1003"]),
            ],
        );
        let b = ballots_from_table(&t, &columns()).unwrap();
        assert_eq!(b.len(), 3);
        assert_eq!(b[0].id, "votes.csv-00000002");
        assert_eq!(b[0].voter_id, "1001");
        assert_eq!(
            b[0].nominees[0],
            (School::Ses, Some("Alice, Bob".to_string()))
        );
        assert_eq!(b[1].nominees[1], (School::Sob, None));
        assert_eq!(b[1].nominees[2], (School::Sse, Some("Carl".to_string())));
        assert_eq!(b[1].nominees[3], (School::Hass, None));
        assert!(b[2].nominees.iter().all(|(_, f)| f.is_none()));
        assert_eq!(b[2].record[1], ("Nominees".to_string(), "".to_string()));
    }

    #[test]
    fn missing_suffixed_columns() {
        let t = Table::new(
            "votes.csv",
            strings(&["CWID", "Nominees"]),
            vec![strings(&["1001", "Alice"])],
        );
        let b = ballots_from_table(&t, &columns()).unwrap();
        assert_eq!(b[0].nominees.len(), 4);
        assert_eq!(b[0].nominees[0], (School::Ses, Some("Alice".to_string())));
        assert_eq!(b[0].nominees[3], (School::Hass, None));
    }

    #[test]
    fn missing_voter_column() {
        let t = Table::new("votes.csv", strings(&["ID", "Nominees"]), vec![]);
        assert!(matches!(
            ballots_from_table(&t, &columns()),
            Err(TallyError::MissingColumn { column, .. }) if column == "CWID"
        ));
    }

    #[test]
    fn roster_keeps_first_major() {
        let t = Table::new(
            "data.csv",
            strings(&["CWID", "Major"]),
            vec![
                strings(&["1001", "Physics"]),
                strings(&["1001", "Finance"]),
                strings(&["", "History"]),
                strings(&["1002"]),
            ],
        );
        let cols = RosterColumns {
            id: "CWID".to_string(),
            major: "Major".to_string(),
        };
        let r = roster_from_table(&t, &cols).unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r.major_of("1001"), Some("Physics"));
        assert_eq!(r.major_of("1002"), Some(""));
    }

    #[test]
    fn unsupported_format() {
        assert!(matches!(
            read_table(Path::new("votes.ods"), None),
            Err(TallyError::UnsupportedFormat { .. })
        ));
    }
}
