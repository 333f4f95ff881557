use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Column names as they appear in the CSV header.
pub mod col {
    pub const PASSENGER_ID: &str = "PassengerId";
    pub const SURVIVED: &str = "Survived";
    pub const PCLASS: &str = "Pclass";
    pub const NAME: &str = "Name";
    pub const SEX: &str = "Sex";
    pub const AGE: &str = "Age";
    pub const SIBSP: &str = "SibSp";
    pub const PARCH: &str = "Parch";
    pub const TICKET: &str = "Ticket";
    pub const FARE: &str = "Fare";
    pub const CABIN: &str = "Cabin";
    pub const EMBARKED: &str = "Embarked";

    // Derived columns
    pub const DECK: &str = "Deck";
    pub const FAMILY_SIZE: &str = "Family_Size";
    pub const TITLE: &str = "Title";

    // Encoded columns added by the cleaning stage
    pub const SEX_CODE: &str = "Sex_Code";
    pub const EMBARKED_CODE: &str = "Embarked_Code";

    /// The fixed input header. All of these must be present in a CSV file.
    pub const CANONICAL: [&str; 12] = [
        PASSENGER_ID,
        SURVIVED,
        PCLASS,
        NAME,
        SEX,
        AGE,
        SIBSP,
        PARCH,
        TICKET,
        FARE,
        CABIN,
        EMBARKED,
    ];

    /// Every column with a typed field on [`super::Passenger`], in display
    /// order. Anything else is a passthrough extra.
    pub const KNOWN: [&str; 17] = [
        PASSENGER_ID,
        SURVIVED,
        PCLASS,
        NAME,
        SEX,
        AGE,
        SIBSP,
        PARCH,
        TICKET,
        FARE,
        CABIN,
        EMBARKED,
        DECK,
        FAMILY_SIZE,
        TITLE,
        SEX_CODE,
        EMBARKED_CODE,
    ];

    /// Low-cardinality columns indexed for filter dropdowns and chart hues.
    pub const CATEGORICAL: [&str; 6] = [SURVIVED, PCLASS, SEX, EMBARKED, DECK, TITLE];

    /// Columns covered by the describe-style numeric summary.
    pub const NUMERIC: [&str; 10] = [
        PASSENGER_ID,
        SURVIVED,
        PCLASS,
        AGE,
        SIBSP,
        PARCH,
        FARE,
        FAMILY_SIZE,
        SEX_CODE,
        EMBARKED_CODE,
    ];
}

// ---------------------------------------------------------------------------
// CellValue – a single dynamically-typed cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value, used for passthrough columns and for
/// generic by-name column access. Using `BTreeMap` / `BTreeSet` downstream so
/// `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Float(_) => 2,
                String(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Null => {}
        }
    }
}

/// Renders losslessly: a re-parse of the output yields the same value.
/// Missing renders as the empty string; integral floats keep a trailing `.0`
/// so they read back as floats. This doubles as the CSV field encoding.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => {
                if v.is_finite() && v.fract() == 0.0 {
                    write!(f, "{v:.1}")
                } else {
                    write!(f, "{v}")
                }
            }
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for statistics and plotting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

fn int_cell(v: Option<i64>) -> CellValue {
    v.map_or(CellValue::Null, CellValue::Integer)
}

fn float_cell(v: Option<f64>) -> CellValue {
    v.map_or(CellValue::Null, CellValue::Float)
}

fn str_cell(v: &Option<String>) -> CellValue {
    v.as_ref()
        .map_or(CellValue::Null, |s| CellValue::String(s.clone()))
}

// ---------------------------------------------------------------------------
// Passenger – one row of the table
// ---------------------------------------------------------------------------

/// A single passenger record (one row of the source table).
///
/// The canonical columns have typed fields; any value may be absent except
/// the id. `Deck`, `Family_Size` and `Title` are filled by the derivation
/// stage, `Sex_Code` / `Embarked_Code` by the cleaning stage. Columns beyond
/// the known set live in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Passenger {
    pub passenger_id: i64,
    pub survived: Option<i64>,
    pub pclass: Option<i64>,
    pub name: Option<String>,
    pub sex: Option<String>,
    pub age: Option<f64>,
    pub sib_sp: Option<i64>,
    pub parch: Option<i64>,
    pub ticket: Option<String>,
    pub fare: Option<f64>,
    pub cabin: Option<String>,
    pub embarked: Option<String>,
    pub family_size: Option<i64>,
    pub deck: Option<String>,
    pub title: Option<String>,
    pub sex_code: Option<i64>,
    pub embarked_code: Option<i64>,
    /// Passthrough columns: column_name → value.
    pub extra: BTreeMap<String, CellValue>,
}

impl Passenger {
    /// Generic by-name access, used by export, statistics and table widgets.
    pub fn value(&self, column: &str) -> CellValue {
        match column {
            col::PASSENGER_ID => CellValue::Integer(self.passenger_id),
            col::SURVIVED => int_cell(self.survived),
            col::PCLASS => int_cell(self.pclass),
            col::NAME => str_cell(&self.name),
            col::SEX => str_cell(&self.sex),
            col::AGE => float_cell(self.age),
            col::SIBSP => int_cell(self.sib_sp),
            col::PARCH => int_cell(self.parch),
            col::TICKET => str_cell(&self.ticket),
            col::FARE => float_cell(self.fare),
            col::CABIN => str_cell(&self.cabin),
            col::EMBARKED => str_cell(&self.embarked),
            col::DECK => str_cell(&self.deck),
            col::FAMILY_SIZE => int_cell(self.family_size),
            col::TITLE => str_cell(&self.title),
            col::SEX_CODE => int_cell(self.sex_code),
            col::EMBARKED_CODE => int_cell(self.embarked_code),
            other => self.extra.get(other).cloned().unwrap_or(CellValue::Null),
        }
    }
}

// ---------------------------------------------------------------------------
// PassengerTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed table with ordered columns and a categorical value index.
#[derive(Debug, Clone, PartialEq)]
pub struct PassengerTable {
    /// All rows, in file order.
    pub passengers: Vec<Passenger>,
    /// Column names in display/export order.
    pub columns: Vec<String>,
    /// Sorted distinct present values per categorical column.
    pub unique_values: BTreeMap<String, BTreeSet<CellValue>>,
}

impl PassengerTable {
    pub fn new(passengers: Vec<Passenger>, columns: Vec<String>) -> Self {
        let mut table = PassengerTable {
            passengers,
            columns,
            unique_values: BTreeMap::new(),
        };
        table.rebuild_index();
        table
    }

    /// Recompute `unique_values` for the categorical columns present.
    /// Missing values are not indexed (filter dropdowns list present values).
    pub fn rebuild_index(&mut self) {
        let mut unique: BTreeMap<String, BTreeSet<CellValue>> = BTreeMap::new();
        for column in col::CATEGORICAL {
            if !self.has_column(column) {
                continue;
            }
            let values: BTreeSet<CellValue> = self
                .passengers
                .iter()
                .map(|p| p.value(column))
                .filter(|v| !v.is_null())
                .collect();
            unique.insert(column.to_string(), values);
        }
        self.unique_values = unique;
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Append a column name unless it is already present.
    pub fn push_column(&mut self, name: &str) {
        if !self.has_column(name) {
            self.columns.push(name.to_string());
        }
    }

    /// All present values of a column interpreted as `f64`, in row order.
    pub fn numeric_values(&self, column: &str) -> Vec<f64> {
        self.passengers
            .iter()
            .filter_map(|p| p.value(column).as_f64())
            .collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.passengers.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_display_round_trips() {
        assert_eq!(CellValue::Integer(5).to_string(), "5");
        assert_eq!(CellValue::Float(7.25).to_string(), "7.25");
        // Integral floats keep the decimal point so they re-parse as floats.
        assert_eq!(CellValue::Float(22.0).to_string(), "22.0");
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(
            CellValue::String("Smith, Mr. John".into()).to_string(),
            "Smith, Mr. John"
        );
    }

    #[test]
    fn value_falls_back_to_extras() {
        let mut p = Passenger {
            passenger_id: 1,
            ..Passenger::default()
        };
        p.extra
            .insert("Boat".to_string(), CellValue::String("B5".into()));
        assert_eq!(p.value("Boat"), CellValue::String("B5".into()));
        assert_eq!(p.value("Nonexistent"), CellValue::Null);
        assert_eq!(p.value(col::PASSENGER_ID), CellValue::Integer(1));
        assert_eq!(p.value(col::AGE), CellValue::Null);
    }

    #[test]
    fn index_covers_present_categoricals_only() {
        let rows = vec![
            Passenger {
                passenger_id: 1,
                sex: Some("male".into()),
                pclass: Some(3),
                ..Passenger::default()
            },
            Passenger {
                passenger_id: 2,
                sex: Some("female".into()),
                pclass: Some(1),
                ..Passenger::default()
            },
            Passenger {
                passenger_id: 3,
                pclass: Some(3),
                ..Passenger::default()
            },
        ];
        let columns = vec![
            col::PASSENGER_ID.to_string(),
            col::PCLASS.to_string(),
            col::SEX.to_string(),
        ];
        let table = PassengerTable::new(rows, columns);

        let sexes = &table.unique_values[col::SEX];
        assert_eq!(sexes.len(), 2);
        assert!(sexes.contains(&CellValue::String("male".into())));

        let classes = &table.unique_values[col::PCLASS];
        assert_eq!(classes.len(), 2);

        // Embarked is not a column of this table, so it is not indexed.
        assert!(!table.unique_values.contains_key(col::EMBARKED));
    }
}
