use super::model::{col, PassengerTable};
use super::stats;

/// Fixed label → code mapping for the sex column.
pub const SEX_CODES: &[(&str, i64)] = &[("male", 0), ("female", 1)];

/// Fixed label → code mapping for the embarkation port column.
pub const EMBARKED_CODES: &[(&str, i64)] = &[("C", 0), ("Q", 1), ("S", 2)];

/// What the cleaning pass did, for display in the cleaning page.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanReport {
    /// Median used to fill missing ages, `None` when no age was present.
    pub age_median: Option<f64>,
    pub ages_filled: usize,
    /// Mode used to fill missing embarkation ports.
    pub embarked_mode: Option<String>,
    pub embarked_filled: usize,
}

/// Imputation and encoding over a copy of the input:
/// * missing ages become the median of the present ages (computed once, on
///   the input, before any filling),
/// * missing embarkation ports become the most frequent present port, ties
///   broken by first appearance in row order,
/// * `Sex_Code` / `Embarked_Code` are appended using the fixed mappings
///   above; labels outside the mapping encode as absent, never an error.
pub fn clean(table: &PassengerTable) -> (PassengerTable, CleanReport) {
    let ages: Vec<f64> = table.passengers.iter().filter_map(|p| p.age).collect();
    let age_median = stats::median(&ages);
    let embarked_mode =
        mode_first_encountered(table.passengers.iter().filter_map(|p| p.embarked.as_deref()));

    let mut out = table.clone();
    let mut ages_filled = 0;
    let mut embarked_filled = 0;

    for passenger in &mut out.passengers {
        if passenger.age.is_none() {
            if let Some(median) = age_median {
                passenger.age = Some(median);
                ages_filled += 1;
            }
        }
        if passenger.embarked.is_none() {
            if let Some(mode) = &embarked_mode {
                passenger.embarked = Some(mode.clone());
                embarked_filled += 1;
            }
        }
        passenger.sex_code = passenger.sex.as_deref().and_then(|s| encode(SEX_CODES, s));
        passenger.embarked_code = passenger
            .embarked
            .as_deref()
            .and_then(|s| encode(EMBARKED_CODES, s));
    }

    out.push_column(col::SEX_CODE);
    out.push_column(col::EMBARKED_CODE);
    out.rebuild_index();

    let report = CleanReport {
        age_median,
        ages_filled,
        embarked_mode,
        embarked_filled,
    };
    (out, report)
}

fn encode(codes: &[(&str, i64)], label: &str) -> Option<i64> {
    codes
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, code)| *code)
}

/// Most frequent value; on a tie the earliest-seen value wins.
fn mode_first_encountered<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(label, _)| *label == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (label, n) in counts {
        if best.map_or(true, |(_, best_n)| n > best_n) {
            best = Some((label, n));
        }
    }
    best.map(|(label, _)| label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Passenger;
    use crate::data::testutil::{canonical_columns, passenger, scenario_table};

    #[test]
    fn fills_missing_ages_with_the_median() {
        let table = scenario_table();
        let (cleaned, report) = clean(&table);

        // Present ages are 22, 38, 30, 35 → median 32.5 (mean of the middle
        // pair for an even count).
        assert_eq!(report.age_median, Some(32.5));
        assert_eq!(report.ages_filled, 1);
        assert_eq!(cleaned.passengers[4].age, Some(32.5));
        assert!(cleaned.passengers.iter().all(|p| p.age.is_some()));
    }

    #[test]
    fn odd_count_median_is_the_middle_value() {
        let rows = vec![
            Passenger {
                age: Some(10.0),
                ..passenger(1)
            },
            Passenger {
                age: Some(40.0),
                ..passenger(2)
            },
            Passenger {
                age: Some(20.0),
                ..passenger(3)
            },
            passenger(4),
        ];
        let (cleaned, report) = clean(&PassengerTable::new(rows, canonical_columns()));
        assert_eq!(report.age_median, Some(20.0));
        assert_eq!(cleaned.passengers[3].age, Some(20.0));
    }

    #[test]
    fn fills_missing_embarked_with_the_mode() {
        let table = scenario_table();
        let (cleaned, report) = clean(&table);

        // S appears twice, C and Q once each.
        assert_eq!(report.embarked_mode.as_deref(), Some("S"));
        assert_eq!(report.embarked_filled, 1);
        assert_eq!(cleaned.passengers[3].embarked.as_deref(), Some("S"));
    }

    #[test]
    fn mode_ties_break_to_first_encountered() {
        assert_eq!(
            mode_first_encountered(["Q", "S", "S", "Q"].into_iter()),
            Some("Q".to_string())
        );
        assert_eq!(
            mode_first_encountered(["C", "Q", "Q"].into_iter()),
            Some("Q".to_string())
        );
        assert_eq!(mode_first_encountered(std::iter::empty()), None);
    }

    #[test]
    fn encodes_with_the_fixed_mappings() {
        let table = scenario_table();
        let (cleaned, _) = clean(&table);

        for p in &cleaned.passengers {
            match p.sex.as_deref() {
                Some("male") => assert_eq!(p.sex_code, Some(0)),
                Some("female") => assert_eq!(p.sex_code, Some(1)),
                other => panic!("unexpected sex {other:?}"),
            }
            match p.embarked.as_deref() {
                Some("C") => assert_eq!(p.embarked_code, Some(0)),
                Some("Q") => assert_eq!(p.embarked_code, Some(1)),
                Some("S") => assert_eq!(p.embarked_code, Some(2)),
                other => panic!("unexpected embarked {other:?}"),
            }
        }
        assert!(cleaned.has_column(col::SEX_CODE));
        assert!(cleaned.has_column(col::EMBARKED_CODE));
    }

    #[test]
    fn unknown_labels_encode_as_absent() {
        let rows = vec![Passenger {
            sex: Some("unknown".into()),
            embarked: Some("X".into()),
            ..passenger(1)
        }];
        let (cleaned, _) = clean(&PassengerTable::new(rows, canonical_columns()));
        assert_eq!(cleaned.passengers[0].sex_code, None);
        assert_eq!(cleaned.passengers[0].embarked_code, None);
    }

    #[test]
    fn cleaning_does_not_mutate_the_input() {
        let table = scenario_table();
        let before = table.clone();
        let _ = clean(&table);
        assert_eq!(table, before);
    }

    #[test]
    fn all_missing_columns_stay_missing() {
        let rows = vec![passenger(1), passenger(2)];
        let (cleaned, report) = clean(&PassengerTable::new(rows, canonical_columns()));
        assert_eq!(report.age_median, None);
        assert_eq!(report.ages_filled, 0);
        assert_eq!(report.embarked_mode, None);
        assert!(cleaned.passengers.iter().all(|p| p.age.is_none()));
    }
}
