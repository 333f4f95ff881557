use std::path::Path;

use anyhow::{anyhow, Context, Result};

use super::model::PassengerTable;

/// Serialize the table as CSV: header row, the table's column order, no
/// index column, UTF-8. Missing cells become empty fields; integral floats
/// keep a trailing `.0` so a re-parse reproduces the table exactly.
///
/// Works on any snapshot (raw, derived, filtered or cleaned) and does not
/// depend on the other pipeline stages.
pub fn to_csv_bytes(table: &PassengerTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(&table.columns)
        .context("writing CSV header")?;

    for passenger in &table.passengers {
        let record: Vec<String> = table
            .columns
            .iter()
            .map(|column| passenger.value(column).to_string())
            .collect();
        writer.write_record(&record).context("writing CSV row")?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow!("flushing CSV writer: {e}"))
}

/// Write the table to a file, for the explicit save/download actions.
pub fn save_csv(table: &PassengerTable, path: &Path) -> Result<()> {
    let bytes = to_csv_bytes(table)?;
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::clean::clean;
    use crate::data::derive::derive;
    use crate::data::loader::read_csv;
    use crate::data::testutil::scenario_table;

    #[test]
    fn header_and_order_match_the_table() {
        let table = scenario_table();
        let bytes = to_csv_bytes(&table).expect("export");
        let text = String::from_utf8(bytes).expect("utf-8");

        let header = text.lines().next().expect("header");
        assert_eq!(header, table.columns.join(","));
        assert_eq!(text.lines().count(), table.len() + 1);
    }

    #[test]
    fn missing_cells_export_as_empty_fields() {
        let table = scenario_table();
        let bytes = to_csv_bytes(&table).expect("export");
        let text = String::from_utf8(bytes).expect("utf-8");

        // Row 4 (PassengerId 4) has no cabin and no embarkation port; the
        // record ends with two empty fields.
        let row = text.lines().nth(4).expect("row 4");
        assert!(row.ends_with(",,"), "unexpected row: {row}");
    }

    #[test]
    fn names_with_commas_are_quoted() {
        let table = scenario_table();
        let bytes = to_csv_bytes(&table).expect("export");
        let text = String::from_utf8(bytes).expect("utf-8");
        assert!(text.contains("\"Braund, Mr. Owen Harris\""));
    }

    #[test]
    fn raw_table_round_trips_exactly() {
        let table = scenario_table();
        let bytes = to_csv_bytes(&table).expect("export");
        let reparsed = read_csv(bytes.as_slice()).expect("reparse");
        assert_eq!(reparsed, table);
    }

    #[test]
    fn derived_and_cleaned_tables_round_trip_exactly() {
        let derived = derive(&scenario_table());
        let bytes = to_csv_bytes(&derived).expect("export derived");
        let reparsed = read_csv(bytes.as_slice()).expect("reparse derived");
        assert_eq!(reparsed, derived);

        let (cleaned, _) = clean(&derived);
        let bytes = to_csv_bytes(&cleaned).expect("export cleaned");
        let reparsed = read_csv(bytes.as_slice()).expect("reparse cleaned");
        assert_eq!(reparsed, cleaned);
    }

    #[test]
    fn save_writes_the_same_bytes() {
        let table = scenario_table();
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("filtered.csv");

        save_csv(&table, &path).expect("save");
        let on_disk = std::fs::read(&path).expect("read back");
        assert_eq!(on_disk, to_csv_bytes(&table).expect("export"));
    }
}
