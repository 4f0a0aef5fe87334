//! Row normalization
//!
//! Zips each data row of a raw grid against the header row.

use super::types::{Cell, RawGrid, Record};

/// Convert a raw grid into records
///
/// Row 0 supplies the field names. Every later row becomes one record by
/// pairing cells with headers positionally. Short rows leave their trailing
/// fields absent rather than null; cells past the last header are dropped.
/// Duplicate header names overwrite the earlier field.
pub fn normalize(grid: RawGrid) -> Vec<Record> {
    let mut rows = grid.into_iter();

    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.into_iter().map(header_name).collect(),
        None => return Vec::new(),
    };

    rows.map(|row| {
        let mut record = Record::new();
        for (header, cell) in headers.iter().zip(row) {
            record.insert(header.clone(), cell);
        }
        record
    })
    .collect()
}

/// Header cells are used as text; non-text headers take their JSON rendering
fn header_name(cell: Cell) -> String {
    match cell {
        Cell::Text(s) => s,
        Cell::Number(n) => n.to_string(),
        Cell::Bool(b) => b.to_string(),
        Cell::Null => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::from(*c)).collect()
    }

    #[test]
    fn test_header_only_grid() {
        let grid = vec![row(&["MEMBER_ID", "7D MEAL LOG %"])];
        assert!(normalize(grid).is_empty());
    }

    #[test]
    fn test_empty_grid() {
        assert!(normalize(Vec::new()).is_empty());
    }

    #[test]
    fn test_rows_zip_against_headers() {
        let grid = vec![
            row(&["MEMBER_ID", "7D MEAL LOG %"]),
            row(&["m1", "80%"]),
            row(&["m2", "40%"]),
        ];

        let records = normalize(grid);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("MEMBER_ID"), Some(&Cell::from("m1")));
        assert_eq!(records[1].get("7D MEAL LOG %"), Some(&Cell::from("40%")));
    }

    #[test]
    fn test_short_row_leaves_fields_absent() {
        let grid = vec![
            row(&["MEMBER_ID", "START WEIGHT", "LAST WEIGHT"]),
            row(&["m1"]),
        ];

        let records = normalize(grid);
        assert_eq!(records[0].len(), 1);
        assert!(records[0].get("START WEIGHT").is_none());
        assert!(records[0].get("LAST WEIGHT").is_none());
    }

    #[test]
    fn test_extra_cells_dropped() {
        let grid = vec![row(&["MEMBER_ID"]), row(&["m1", "stray"])];

        let records = normalize(grid);
        assert_eq!(records[0].len(), 1);
    }

    #[test]
    fn test_duplicate_headers_last_value_wins() {
        let grid = vec![row(&["ID", "ID"]), row(&["first", "second"])];

        let records = normalize(grid);
        assert_eq!(records[0].len(), 1);
        assert_eq!(records[0].get("ID"), Some(&Cell::from("second")));
    }
}
