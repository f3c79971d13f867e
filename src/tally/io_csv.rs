// Primitives for reading CSV files.

use std::fs::File;

use crate::tally::io_common::Table;
use crate::tally::*;

pub fn read_csv_table(path: &str) -> TallyResult<Table> {
    let mut records = get_records(path)?;

    let headers: Vec<String> = match records.next() {
        Some(line_r) => line_r
            .context(CsvLineParseSnafu { path, lineno: 1usize })?
            .iter()
            .map(|s| s.to_string())
            .collect(),
        None => return EmptyTableSnafu { path }.fail(),
    };
    debug!("read_csv_table: header: {:?}", headers);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        // The header is the first line
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        // Empty lines never reach this point. A line of separators only is a ballot
        // with blank cells.
        let mut row: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        // Exports sometimes drop the trailing empty cells
        if row.len() < headers.len() {
            row.resize(headers.len(), String::new());
        }
        debug!("read_csv_table: lineno: {:?} row: {:?}", lineno, row);
        rows.push(row);
    }
    Ok(Table::new(path, headers, rows))
}

fn get_records(path: &str) -> TallyResult<csv::StringRecordsIntoIter<File>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    Ok(rdr.into_records())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn read_short_rows() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("votes.csv");
        fs::write(
            &p,
            "CWID,Nominees,Nominees\n1001,\"Alice, Bob\"\n\n,,\n1002,,Carl\n",
        )
        .unwrap();
        let t = read_csv_table(&p.display().to_string()).unwrap();
        assert_eq!(t.headers, vec!["CWID", "Nominees", "Nominees.1"]);
        assert_eq!(
            t.rows,
            vec![
                vec!["1001".to_string(), "Alice, Bob".to_string(), "".to_string()],
                vec!["".to_string(), "".to_string(), "".to_string()],
                vec!["1002".to_string(), "".to_string(), "Carl".to_string()],
            ]
        );
    }

    #[test]
    fn empty_file() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("votes.csv");
        fs::write(&p, "").unwrap();
        assert!(matches!(
            read_csv_table(&p.display().to_string()),
            Err(TallyError::EmptyTable { .. })
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            read_csv_table("/nonexistent/votes.csv"),
            Err(TallyError::CsvOpen { .. })
        ));
    }
}
