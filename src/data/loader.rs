use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{bail, Context, Result};
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{col, CellValue, Passenger, PassengerTable};

/// Structural load failures with a stable shape; wrapped into the anyhow
/// chain by the loaders.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("missing required column '{0}' in header")]
    MissingColumn(&'static str),
    #[error("row {0}: missing PassengerId")]
    MissingId(usize),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a passenger table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – comma-separated with the canonical Titanic header (recommended)
/// * `.json` – records-oriented array, the default `df.to_json(orient='records')`
pub fn load_file(path: &Path) -> Result<PassengerTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string()).into()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: a header row that must contain all canonical columns
/// (`PassengerId`, `Survived`, `Pclass`, `Name`, `Sex`, `Age`, `SibSp`,
/// `Parch`, `Ticket`, `Fare`, `Cabin`, `Embarked`). Derived and encoded
/// column names are re-ingested into their typed fields, since the app
/// re-reads its own cleaned output. Unknown columns pass through untouched.
fn load_csv(path: &Path) -> Result<PassengerTable> {
    let file = fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    read_csv(file)
}

/// Parse CSV from any reader. Split out so tests and the byte-level
/// round-trip can parse without touching the filesystem.
pub fn read_csv<R: Read>(reader: R) -> Result<PassengerTable> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    for required in col::CANONICAL {
        if !headers.iter().any(|h| h == required) {
            return Err(LoadError::MissingColumn(required).into());
        }
    }

    let mut passengers = Vec::new();

    for (row_no, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let mut passenger = Passenger::default();
        let mut has_id = false;
        for (idx, raw) in record.iter().enumerate() {
            let header = &headers[idx];
            set_csv_field(&mut passenger, header, raw, &mut has_id)
                .with_context(|| format!("CSV row {row_no}, column '{header}'"))?;
        }
        if !has_id {
            return Err(LoadError::MissingId(row_no).into());
        }

        passengers.push(passenger);
    }

    Ok(PassengerTable::new(passengers, headers))
}

fn set_csv_field(
    passenger: &mut Passenger,
    column: &str,
    raw: &str,
    has_id: &mut bool,
) -> Result<()> {
    match column {
        col::PASSENGER_ID => {
            if let Some(id) = parse_opt_i64(raw)? {
                passenger.passenger_id = id;
                *has_id = true;
            }
        }
        col::SURVIVED => passenger.survived = parse_opt_i64(raw)?,
        col::PCLASS => passenger.pclass = parse_opt_i64(raw)?,
        col::NAME => passenger.name = parse_opt_string(raw),
        col::SEX => passenger.sex = parse_opt_string(raw),
        col::AGE => passenger.age = parse_opt_f64(raw)?,
        col::SIBSP => passenger.sib_sp = parse_opt_i64(raw)?,
        col::PARCH => passenger.parch = parse_opt_i64(raw)?,
        col::TICKET => passenger.ticket = parse_opt_string(raw),
        col::FARE => passenger.fare = parse_opt_f64(raw)?,
        col::CABIN => passenger.cabin = parse_opt_string(raw),
        col::EMBARKED => passenger.embarked = parse_opt_string(raw),
        col::DECK => passenger.deck = parse_opt_string(raw),
        col::FAMILY_SIZE => passenger.family_size = parse_opt_i64(raw)?,
        col::TITLE => passenger.title = parse_opt_string(raw),
        col::SEX_CODE => passenger.sex_code = parse_opt_i64(raw)?,
        col::EMBARKED_CODE => passenger.embarked_code = parse_opt_i64(raw)?,
        other => {
            passenger
                .extra
                .insert(other.to_string(), guess_cell_type(raw));
        }
    }
    Ok(())
}

/// Empty field means missing. Integer columns written by pandas may come
/// back as `1.0` after a float cast, so fall back to an integral float.
fn parse_opt_i64(raw: &str) -> Result<Option<i64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Ok(Some(i));
    }
    let f: f64 = trimmed
        .parse()
        .with_context(|| format!("'{trimmed}' is not a number"))?;
    if f.fract() == 0.0 {
        Ok(Some(f as i64))
    } else {
        bail!("'{trimmed}' is not an integer")
    }
}

fn parse_opt_f64(raw: &str) -> Result<Option<f64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let f: f64 = trimmed
        .parse()
        .with_context(|| format!("'{trimmed}' is not a number"))?;
    Ok(Some(f))
}

fn parse_opt_string(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "PassengerId": 1, "Survived": 0, "Pclass": 3, "Name": "...", ... },
///   ...
/// ]
/// ```
///
/// Keys a record omits stay missing; unlike CSV, the canonical header is not
/// enforced, so a JSON table may lack whole columns (derivation still works,
/// e.g. a missing cabin column yields "Unknown" decks everywhere).
fn load_json(path: &Path) -> Result<PassengerTable> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("expected top-level JSON array")?;

    let mut passengers = Vec::with_capacity(records.len());
    let mut columns: Vec<String> = Vec::new();

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("row {i} is not a JSON object"))?;

        let mut passenger = Passenger::default();
        let mut has_id = false;
        for (key, val) in obj {
            set_json_field(&mut passenger, key, val, &mut has_id)
                .with_context(|| format!("row {i}, field '{key}'"))?;
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
        if !has_id {
            return Err(LoadError::MissingId(i).into());
        }

        passengers.push(passenger);
    }

    // serde_json iterates object keys alphabetically; restore the canonical
    // column order for the known columns, extras after them.
    let rank = |c: &String| {
        col::KNOWN
            .iter()
            .position(|k| k == c)
            .unwrap_or(col::KNOWN.len())
    };
    columns.sort_by_key(rank);

    Ok(PassengerTable::new(passengers, columns))
}

fn set_json_field(
    passenger: &mut Passenger,
    key: &str,
    val: &JsonValue,
    has_id: &mut bool,
) -> Result<()> {
    match key {
        col::PASSENGER_ID => {
            if !val.is_null() {
                passenger.passenger_id = val.as_i64().context("expected an integer")?;
                *has_id = true;
            }
        }
        col::SURVIVED => passenger.survived = json_opt_i64(val)?,
        col::PCLASS => passenger.pclass = json_opt_i64(val)?,
        col::NAME => passenger.name = json_opt_string(val)?,
        col::SEX => passenger.sex = json_opt_string(val)?,
        col::AGE => passenger.age = json_opt_f64(val)?,
        col::SIBSP => passenger.sib_sp = json_opt_i64(val)?,
        col::PARCH => passenger.parch = json_opt_i64(val)?,
        col::TICKET => passenger.ticket = json_opt_string(val)?,
        col::FARE => passenger.fare = json_opt_f64(val)?,
        col::CABIN => passenger.cabin = json_opt_string(val)?,
        col::EMBARKED => passenger.embarked = json_opt_string(val)?,
        col::DECK => passenger.deck = json_opt_string(val)?,
        col::FAMILY_SIZE => passenger.family_size = json_opt_i64(val)?,
        col::TITLE => passenger.title = json_opt_string(val)?,
        col::SEX_CODE => passenger.sex_code = json_opt_i64(val)?,
        col::EMBARKED_CODE => passenger.embarked_code = json_opt_i64(val)?,
        other => {
            passenger.extra.insert(other.to_string(), json_to_cell(val));
        }
    }
    Ok(())
}

fn json_opt_i64(val: &JsonValue) -> Result<Option<i64>> {
    if val.is_null() {
        return Ok(None);
    }
    if let Some(i) = val.as_i64() {
        return Ok(Some(i));
    }
    // pandas float-casts integer columns that ever held a NaN.
    match val.as_f64() {
        Some(f) if f.fract() == 0.0 => Ok(Some(f as i64)),
        _ => bail!("expected an integer, got {val}"),
    }
}

fn json_opt_f64(val: &JsonValue) -> Result<Option<f64>> {
    if val.is_null() {
        return Ok(None);
    }
    val.as_f64()
        .map(Some)
        .with_context(|| format!("expected a number, got {val}"))
}

fn json_opt_string(val: &JsonValue) -> Result<Option<String>> {
    if val.is_null() {
        return Ok(None);
    }
    val.as_str()
        .map(|s| Some(s.to_string()))
        .with_context(|| format!("expected a string, got {val}"))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Dataset cache
// ---------------------------------------------------------------------------

/// Bounded in-memory cache for the loaded table: a single entry keyed by
/// file path and modification time. A hit returns the cached table without
/// touching the file contents; a changed mtime reloads.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<CacheEntry>,
}

#[derive(Debug)]
struct CacheEntry {
    path: PathBuf,
    modified: SystemTime,
    table: PassengerTable,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path`, reusing the cached table when path and mtime match.
    pub fn load(&mut self, path: &Path) -> Result<&PassengerTable> {
        let modified = fs::metadata(path)
            .and_then(|m| m.modified())
            .with_context(|| format!("reading metadata for {}", path.display()))?;

        let fresh = self
            .entry
            .as_ref()
            .is_some_and(|e| e.path == path && e.modified == modified);

        if !fresh {
            let table = load_file(path)?;
            self.entry = Some(CacheEntry {
                path: path.to_path_buf(),
                modified,
                table,
            });
        }

        match self.entry.as_ref() {
            Some(entry) => Ok(&entry.table),
            None => bail!("dataset cache is empty after load"),
        }
    }

    /// Drop the cached entry; the next `load` re-reads the file.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked";

    fn parse(text: &str) -> PassengerTable {
        read_csv(text.as_bytes()).expect("parse")
    }

    #[test]
    fn parses_canonical_rows() {
        let table = parse(&format!(
            "{HEADER}\n\
             1,0,3,\"Braund, Mr. Owen Harris\",male,22,1,0,A/5 21171,7.25,,S\n\
             2,1,1,\"Cumings, Mrs. John Bradley\",female,38,1,0,PC 17599,71.2833,C85,C\n"
        ));
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns.len(), 12);

        let first = &table.passengers[0];
        assert_eq!(first.passenger_id, 1);
        assert_eq!(first.survived, Some(0));
        assert_eq!(first.name.as_deref(), Some("Braund, Mr. Owen Harris"));
        assert_eq!(first.age, Some(22.0));
        assert_eq!(first.cabin, None);

        let second = &table.passengers[1];
        assert_eq!(second.fare, Some(71.2833));
        assert_eq!(second.cabin.as_deref(), Some("C85"));
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let err = read_csv("PassengerId,Survived\n1,0\n".as_bytes()).unwrap_err();
        let load_err = err.downcast_ref::<LoadError>().expect("LoadError");
        assert!(matches!(load_err, LoadError::MissingColumn("Pclass")));
    }

    #[test]
    fn malformed_numeric_cell_is_fatal_with_context() {
        let err = parse_err(&format!(
            "{HEADER}\n1,0,3,X,male,twenty,0,0,T,7.25,,S\n"
        ));
        let msg = format!("{err:#}");
        assert!(msg.contains("Age"), "context missing from: {msg}");
    }

    fn parse_err(text: &str) -> anyhow::Error {
        read_csv(text.as_bytes()).unwrap_err()
    }

    #[test]
    fn integer_columns_accept_float_casts() {
        let table = parse(&format!(
            "{HEADER}\n1,1.0,3.0,X,male,22,0,0,T,7.25,,S\n"
        ));
        assert_eq!(table.passengers[0].survived, Some(1));
        assert_eq!(table.passengers[0].pclass, Some(3));
    }

    #[test]
    fn extra_columns_pass_through_with_sniffed_types() {
        let table = parse(&format!(
            "{HEADER},Boat,Body\n1,1,1,X,female,30,0,0,T,10,,S,5,\n"
        ));
        let p = &table.passengers[0];
        assert_eq!(p.extra["Boat"], CellValue::Integer(5));
        assert_eq!(p.extra["Body"], CellValue::Null);
        assert_eq!(table.columns[12], "Boat");
        assert_eq!(table.columns[13], "Body");
    }

    #[test]
    fn derived_headers_reingest_typed() {
        let table = parse(&format!(
            "{HEADER},Deck,Family_Size,Title\n1,0,3,X,male,22,1,0,T,7.25,C85,S,C,2,Mr\n"
        ));
        let p = &table.passengers[0];
        assert_eq!(p.deck.as_deref(), Some("C"));
        assert_eq!(p.family_size, Some(2));
        assert_eq!(p.title.as_deref(), Some("Mr"));
        assert!(p.extra.is_empty());
    }

    #[test]
    fn json_records_load_without_full_header() {
        let text = r#"[
            {"PassengerId": 1, "Sex": "male", "Age": 22.0, "SibSp": 1, "Parch": 0},
            {"PassengerId": 2, "Sex": "female", "Age": null, "SibSp": 0, "Parch": 0, "Boat": 5}
        ]"#;
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("passengers.json");
        fs::write(&path, text).expect("write");

        let table = load_file(&path).expect("load json");
        assert_eq!(table.len(), 2);
        assert!(!table.has_column(col::CABIN));
        assert_eq!(table.passengers[1].age, None);
        assert_eq!(table.passengers[1].extra["Boat"], CellValue::Integer(5));
        // Known columns come first, extras after.
        assert_eq!(table.columns.last().map(String::as_str), Some("Boat"));
        assert_eq!(table.columns[0], col::PASSENGER_ID);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("data.parquet")).unwrap_err();
        let load_err = err.downcast_ref::<LoadError>().expect("LoadError");
        assert!(matches!(load_err, LoadError::UnsupportedExtension(_)));
    }

    #[test]
    fn cache_keys_on_path_and_mtime() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.csv");
        let stamp = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000);

        let write_rows = |rows: &str| {
            fs::write(&path, format!("{HEADER}\n{rows}")).expect("write");
            let file = fs::File::options().write(true).open(&path).expect("open");
            file.set_modified(stamp).expect("set mtime");
        };

        write_rows("1,0,3,X,male,22,0,0,T,7.25,,S\n");
        let mut cache = DatasetCache::new();
        assert_eq!(cache.load(&path).expect("first load").len(), 1);

        // Same path, same mtime: the cached table is served even though the
        // contents changed on disk.
        write_rows("1,0,3,X,male,22,0,0,T,7.25,,S\n2,1,1,Y,female,38,0,0,T,80,,C\n");
        assert_eq!(cache.load(&path).expect("cached load").len(), 1);

        // Explicit invalidation forces a re-read.
        cache.invalidate();
        assert_eq!(cache.load(&path).expect("reload").len(), 2);

        // A different mtime is a different key.
        let file = fs::File::options().write(true).open(&path).expect("open");
        file.set_modified(stamp + std::time::Duration::from_secs(60))
            .expect("set mtime");
        assert_eq!(cache.load(&path).expect("mtime reload").len(), 2);
    }
}
