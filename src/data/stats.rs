use super::model::{col, PassengerTable};

// ---------------------------------------------------------------------------
// Scalar helpers
// ---------------------------------------------------------------------------

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n − 1 denominator, the pandas default).
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Quantile with linear interpolation between the two nearest ranks (the
/// pandas default). `q` is clamped to `[0, 1]`.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q = q.clamp(0.0, 1.0);
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let fraction = position - lower as f64;
    if fraction == 0.0 || lower + 1 == sorted.len() {
        return Some(sorted[lower]);
    }
    Some(sorted[lower] + (sorted[lower + 1] - sorted[lower]) * fraction)
}

// ---------------------------------------------------------------------------
// Table-level summaries
// ---------------------------------------------------------------------------

/// Describe-style summary for one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    /// Count of present values.
    pub count: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Summary statistics for every numeric column the table carries, in the
/// table's column order.
pub fn numeric_summary(table: &PassengerTable) -> Vec<ColumnSummary> {
    table
        .columns
        .iter()
        .filter(|c| col::NUMERIC.contains(&c.as_str()))
        .map(|column| {
            let values = table.numeric_values(column);
            ColumnSummary {
                column: column.clone(),
                count: values.len(),
                mean: mean(&values),
                std_dev: std_dev(&values),
                min: quantile(&values, 0.0),
                q25: quantile(&values, 0.25),
                median: quantile(&values, 0.5),
                q75: quantile(&values, 0.75),
                max: quantile(&values, 1.0),
            }
        })
        .collect()
}

/// Count of missing cells per column, in column order. Zero counts included;
/// callers filter if they only want problem columns.
pub fn missing_counts(table: &PassengerTable) -> Vec<(String, usize)> {
    table
        .columns
        .iter()
        .map(|column| {
            let missing = table
                .passengers
                .iter()
                .filter(|p| p.value(column).is_null())
                .count();
            (column.clone(), missing)
        })
        .collect()
}

pub fn total_missing(table: &PassengerTable) -> usize {
    missing_counts(table).iter().map(|(_, n)| n).sum()
}

/// Distinct present values per string-typed column, in column order.
pub fn unique_counts(table: &PassengerTable) -> Vec<(String, usize)> {
    const STRING_COLUMNS: [&str; 7] = [
        col::NAME,
        col::SEX,
        col::TICKET,
        col::CABIN,
        col::EMBARKED,
        col::DECK,
        col::TITLE,
    ];
    table
        .columns
        .iter()
        .filter(|c| STRING_COLUMNS.contains(&c.as_str()))
        .map(|column| {
            let distinct: std::collections::BTreeSet<_> = table
                .passengers
                .iter()
                .map(|p| p.value(column))
                .filter(|v| !v.is_null())
                .collect();
            (column.clone(), distinct.len())
        })
        .collect()
}

/// Mean of the present survived flags, as a fraction in `[0, 1]`.
pub fn survival_rate(table: &PassengerTable) -> Option<f64> {
    let flags: Vec<f64> = table
        .passengers
        .iter()
        .filter_map(|p| p.survived.map(|s| s as f64))
        .collect();
    mean(&flags)
}

/// Min and max of the present values of a numeric column. Seeds the range
/// sliders in the interactive view.
pub fn column_range(table: &PassengerTable, column: &str) -> Option<(f64, f64)> {
    let values = table.numeric_values(column);
    let min = quantile(&values, 0.0)?;
    let max = quantile(&values, 1.0)?;
    Some((min, max))
}
