//! Data layer: core types, loading, derivation, filtering, cleaning,
//! statistics and export.
//!
//! Architecture:
//! ```text
//!  .csv / .json
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → PassengerTable (cached by path + mtime)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  derive   │  add Deck, Family_Size, Title
//!   └──────────┘
//!        │
//!        ├────────────────┐
//!        ▼                ▼
//!   ┌──────────┐    ┌──────────┐
//!   │  filter   │    │  clean    │  impute Age/Embarked, encode labels
//!   └──────────┘    └──────────┘
//!        │                │
//!        ▼                ▼
//!   ┌──────────────────────────┐
//!   │          export           │  any snapshot → CSV bytes
//!   └──────────────────────────┘
//! ```
//!
//! Every stage takes a table by reference and returns a new one; nothing
//! mutates shared state.

pub mod clean;
pub mod derive;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;

#[cfg(test)]
pub(crate) mod testutil {
    use super::model::{col, Passenger, PassengerTable};

    pub fn canonical_columns() -> Vec<String> {
        col::CANONICAL.iter().map(|c| c.to_string()).collect()
    }

    /// A bare row with only the id set.
    pub fn passenger(id: i64) -> Passenger {
        Passenger {
            passenger_id: id,
            ..Passenger::default()
        }
    }

    /// Five rows exercising the interesting shapes: row 3 has cabin "C85",
    /// row 4 has no embarkation port, row 5 is the only one without an age.
    pub fn scenario_table() -> PassengerTable {
        let rows = vec![
            Passenger {
                survived: Some(0),
                pclass: Some(3),
                name: Some("Braund, Mr. Owen Harris".into()),
                sex: Some("male".into()),
                age: Some(22.0),
                sib_sp: Some(1),
                parch: Some(0),
                ticket: Some("A/5 21171".into()),
                fare: Some(7.25),
                embarked: Some("S".into()),
                ..passenger(1)
            },
            Passenger {
                survived: Some(1),
                pclass: Some(1),
                name: Some("Cumings, Mrs. John Bradley (Florence Briggs Thayer)".into()),
                sex: Some("female".into()),
                age: Some(38.0),
                sib_sp: Some(1),
                parch: Some(0),
                ticket: Some("PC 17599".into()),
                fare: Some(71.2833),
                embarked: Some("C".into()),
                ..passenger(2)
            },
            Passenger {
                survived: Some(1),
                pclass: Some(1),
                name: Some("Futrelle, Mrs. Jacques Heath (Lily May Peel)".into()),
                sex: Some("female".into()),
                age: Some(30.0),
                sib_sp: Some(1),
                parch: Some(0),
                ticket: Some("113803".into()),
                fare: Some(53.1),
                cabin: Some("C85".into()),
                embarked: Some("S".into()),
                ..passenger(3)
            },
            Passenger {
                survived: Some(0),
                pclass: Some(3),
                name: Some("Allen, Mr. William Henry".into()),
                sex: Some("male".into()),
                age: Some(35.0),
                sib_sp: Some(0),
                parch: Some(0),
                ticket: Some("373450".into()),
                fare: Some(8.05),
                ..passenger(4)
            },
            Passenger {
                survived: Some(1),
                pclass: Some(3),
                name: Some("Moran, Miss. Bridget".into()),
                sex: Some("female".into()),
                age: None,
                sib_sp: Some(0),
                parch: Some(0),
                ticket: Some("330877".into()),
                fare: Some(7.75),
                embarked: Some("Q".into()),
                ..passenger(5)
            },
        ];
        PassengerTable::new(rows, canonical_columns())
    }
}
