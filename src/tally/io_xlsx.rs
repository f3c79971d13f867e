// Primitives for reading Excel files.

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::tally::io_common::Table;
use crate::tally::*;

/// Reads the given worksheet, or the first one of the workbook.
pub fn read_xlsx_table(path: &str, worksheet: Option<&str>) -> TallyResult<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { path, name })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyTableSnafu { path })?
            .context(OpeningExcelSnafu { path })?,
    };

    let mut iter = wrange.rows();
    let headers: Vec<String> = iter
        .next()
        .context(EmptyTableSnafu { path })?
        .iter()
        .map(cell_text)
        .collect();
    debug!("read_xlsx_table: header: {:?}", headers);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, row) in iter.enumerate() {
        // Rows without any cell are gaps in the sheet, not ballots. Cells holding
        // only spaces are kept.
        if row.iter().all(|c| *c == DataType::Empty) {
            debug!("read_xlsx_table: skipping empty row {}", idx + 2);
            continue;
        }
        let row: Vec<String> = row.iter().map(cell_text).collect();
        debug!("read_xlsx_table: row: {:?}", row);
        rows.push(row);
    }
    Ok(Table::new(path, headers, rows))
}

/// Excel stores the identifiers typed in a cell as floats: 12345 is read back as 12345.0.
fn cell_text(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Empty => "".to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_cells() {
        assert_eq!(cell_text(&DataType::Float(12345.0)), "12345");
        assert_eq!(cell_text(&DataType::Float(2.5)), "2.5");
        assert_eq!(cell_text(&DataType::Int(7)), "7");
        assert_eq!(cell_text(&DataType::Empty), "");
        assert_eq!(cell_text(&DataType::String("Alice".to_string())), "Alice");
    }

    const BALLOTS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/ballots.xlsx");

    #[test]
    fn named_worksheet() {
        let t = read_xlsx_table(BALLOTS, Some("Form Responses")).unwrap();
        assert_eq!(
            t.headers,
            vec![
                "Timestamp",
                "Campus Wide ID (CWID)",
                "Nominees",
                "Nominees.1",
                "Nominees.2",
                "Nominees.3"
            ]
        );
        // The gap on the third line is dropped, the row of blank cells is not.
        assert_eq!(t.rows.len(), 4);
        assert_eq!(t.rows[0][1], "1001");
        assert_eq!(t.rows[0][2], "Alice, Bob");
        assert_eq!(t.rows[0][3], "");
        assert_eq!(t.rows[2][2], " ");
        assert_eq!(t.rows[3][3], "Dana");
    }

    #[test]
    fn first_worksheet_by_default() {
        let t = read_xlsx_table(BALLOTS, None).unwrap();
        assert_eq!(t.headers, vec!["Responses", "4"]);
        assert!(t.rows.is_empty());
    }

    #[test]
    fn missing_worksheet() {
        assert!(matches!(
            read_xlsx_table(BALLOTS, Some("Sheet1")),
            Err(TallyError::MissingWorksheet { .. })
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            read_xlsx_table("/nonexistent/votes.xlsx", None),
            Err(TallyError::OpeningExcel { .. })
        ));
    }
}
