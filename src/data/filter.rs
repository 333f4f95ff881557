use super::model::{Passenger, PassengerTable};

// ---------------------------------------------------------------------------
// FilterSpec – the user-selected constraints
// ---------------------------------------------------------------------------

/// One filter pass worth of constraints. `None` is the "All"/unconstrained
/// state for that predicate and matches every row, including rows with a
/// missing value in the field; an unconstrained predicate never evaluates
/// the field at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub sex: Option<String>,
    pub pclass: Option<i64>,
    pub embarked: Option<String>,
    /// Inclusive age range.
    pub age: Option<(f64, f64)>,
    /// Inclusive fare range.
    pub fare: Option<(f64, f64)>,
    /// Inclusive family-size range.
    pub family_size: Option<(i64, i64)>,
}

impl FilterSpec {
    pub fn is_unconstrained(&self) -> bool {
        *self == FilterSpec::default()
    }

    /// All active predicates ANDed together. A constrained predicate only
    /// matches when the field is present; an inverted range (`lo > hi`)
    /// simply matches nothing.
    pub fn matches(&self, passenger: &Passenger) -> bool {
        eq_matches(&self.sex, passenger.sex.as_ref())
            && eq_matches(&self.pclass, passenger.pclass.as_ref())
            && eq_matches(&self.embarked, passenger.embarked.as_ref())
            && range_matches(self.age, passenger.age)
            && range_matches(self.fare, passenger.fare)
            && range_matches(self.family_size, passenger.family_size)
    }
}

fn eq_matches<T: PartialEq>(wanted: &Option<T>, actual: Option<&T>) -> bool {
    match wanted {
        None => true,
        Some(w) => actual == Some(w),
    }
}

fn range_matches<T: PartialOrd>(range: Option<(T, T)>, actual: Option<T>) -> bool {
    match range {
        None => true,
        Some((lo, hi)) => match actual {
            Some(v) => v >= lo && v <= hi,
            None => false,
        },
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Return indices of rows that pass all active predicates, in row order.
/// The UI caches these and renders previews/charts from them.
pub fn matching_indices(table: &PassengerTable, spec: &FilterSpec) -> Vec<usize> {
    table
        .passengers
        .iter()
        .enumerate()
        .filter(|(_, p)| spec.matches(p))
        .map(|(i, _)| i)
        .collect()
}

/// Materialize the filtered subset as a new table, preserving row order and
/// the column layout, plus the surviving row count. The input is untouched.
pub fn apply_filters(table: &PassengerTable, spec: &FilterSpec) -> (PassengerTable, usize) {
    let rows: Vec<Passenger> = table
        .passengers
        .iter()
        .filter(|p| spec.matches(p))
        .cloned()
        .collect();
    let count = rows.len();
    (PassengerTable::new(rows, table.columns.clone()), count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::derive::derive;
    use crate::data::testutil::scenario_table;

    #[test]
    fn unconstrained_spec_returns_everything_in_order() {
        let table = scenario_table();
        let spec = FilterSpec::default();
        assert!(spec.is_unconstrained());

        let (subset, count) = apply_filters(&table, &spec);
        assert_eq!(count, table.len());
        assert_eq!(subset.passengers, table.passengers);
        assert_eq!(subset.columns, table.columns);
        assert_eq!(
            matching_indices(&table, &spec),
            (0..table.len()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn exact_age_range_selects_the_value_and_drops_missing() {
        let table = scenario_table();
        let spec = FilterSpec {
            age: Some((30.0, 30.0)),
            ..FilterSpec::default()
        };

        let (subset, count) = apply_filters(&table, &spec);
        assert!(count >= 1);
        assert!(subset.passengers.iter().all(|p| p.age == Some(30.0)));
    }

    #[test]
    fn inverted_range_yields_empty_not_error() {
        let table = scenario_table();
        let spec = FilterSpec {
            fare: Some((100.0, 10.0)),
            ..FilterSpec::default()
        };
        let (subset, count) = apply_filters(&table, &spec);
        assert_eq!(count, 0);
        assert!(subset.is_empty());
        assert_eq!(subset.columns, table.columns);
    }

    #[test]
    fn constrained_categorical_drops_missing_values() {
        let table = scenario_table();
        // Row 4 has no embarkation port; it must not vacuously pass.
        let spec = FilterSpec {
            embarked: Some("S".to_string()),
            ..FilterSpec::default()
        };
        let (subset, _) = apply_filters(&table, &spec);
        assert!(subset
            .passengers
            .iter()
            .all(|p| p.embarked.as_deref() == Some("S")));
        assert!(!subset.passengers.iter().any(|p| p.passenger_id == 4));
    }

    #[test]
    fn predicates_combine_with_and() {
        let table = scenario_table();
        let spec = FilterSpec {
            sex: Some("female".to_string()),
            pclass: Some(1),
            ..FilterSpec::default()
        };
        let (subset, _) = apply_filters(&table, &spec);
        assert!(subset
            .passengers
            .iter()
            .all(|p| p.sex.as_deref() == Some("female") && p.pclass == Some(1)));
    }

    #[test]
    fn filtering_preserves_relative_order() {
        let table = scenario_table();
        let spec = FilterSpec {
            sex: Some("male".to_string()),
            ..FilterSpec::default()
        };
        let indices = matching_indices(&table, &spec);
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        assert_eq!(indices, sorted);
    }

    /// End-to-end: five rows, row 3 has cabin "C85", all ages present except
    /// row 5. Filtering on sex=female with age in [0, 100] keeps the female
    /// rows with a present age and drops row 5.
    #[test]
    fn female_age_range_scenario() {
        let table = derive(&scenario_table());
        assert_eq!(table.passengers[2].deck.as_deref(), Some("C"));

        let spec = FilterSpec {
            sex: Some("female".to_string()),
            age: Some((0.0, 100.0)),
            ..FilterSpec::default()
        };
        let (subset, count) = apply_filters(&table, &spec);

        assert!(!subset.passengers.iter().any(|p| p.passenger_id == 5));
        assert!(subset
            .passengers
            .iter()
            .all(|p| p.sex.as_deref() == Some("female") && p.age.is_some()));
        assert_eq!(count, 2);
    }

    #[test]
    fn family_size_range_applies_after_derivation() {
        let table = derive(&scenario_table());
        let spec = FilterSpec {
            family_size: Some((2, 10)),
            ..FilterSpec::default()
        };
        let (subset, _) = apply_filters(&table, &spec);
        assert!(subset
            .passengers
            .iter()
            .all(|p| p.family_size.is_some_and(|f| (2..=10).contains(&f))));
        assert!(!subset.is_empty());
    }
}
