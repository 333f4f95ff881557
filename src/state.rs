use std::path::{Path, PathBuf};

use crate::data::clean::{clean, CleanReport};
use crate::data::derive::derive;
use crate::data::filter::{matching_indices, FilterSpec};
use crate::data::loader::DatasetCache;
use crate::data::model::{col, PassengerTable};
use crate::data::stats;
use crate::ui::plot::ChartKind;

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// The app's views, one per page of the explorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Overview,
    Visualization,
    Interactive,
    Cleaning,
}

impl Page {
    pub const ALL: [Page; 4] = [
        Page::Overview,
        Page::Visualization,
        Page::Interactive,
        Page::Cleaning,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Page::Overview => "Data Overview",
            Page::Visualization => "Data Visualization",
            Page::Interactive => "Interactive Analysis",
            Page::Cleaning => "Data Cleaning",
        }
    }
}

// ---------------------------------------------------------------------------
// Filter widget state
// ---------------------------------------------------------------------------

/// Widget state for the interactive view's filters. Lowered into a
/// [`FilterSpec`] on every interaction: combos at "All" and sliders at the
/// column's full span contribute no constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterControls {
    pub sex: Option<String>,
    pub pclass: Option<i64>,
    pub embarked: Option<String>,
    pub age: (f64, f64),
    pub age_bounds: (f64, f64),
    pub fare: (f64, f64),
    pub fare_bounds: (f64, f64),
    pub family: (i64, i64),
    pub family_bounds: (i64, i64),
}

impl FilterControls {
    /// Seed slider bounds from the table, with the original app's fallbacks
    /// for columns that are entirely missing.
    pub fn from_table(table: &PassengerTable) -> Self {
        let age_bounds = stats::column_range(table, col::AGE).unwrap_or((0.0, 100.0));
        let fare_bounds = stats::column_range(table, col::FARE).unwrap_or((0.0, 500.0));
        let family_bounds = stats::column_range(table, col::FAMILY_SIZE)
            .map(|(lo, hi)| (lo as i64, hi as i64))
            .unwrap_or((1, 11));

        FilterControls {
            sex: None,
            pclass: None,
            embarked: None,
            age: age_bounds,
            age_bounds,
            fare: fare_bounds,
            fare_bounds,
            family: family_bounds,
            family_bounds,
        }
    }

    /// Back to "All" selections and full-span sliders.
    pub fn reset(&mut self) {
        self.sex = None;
        self.pclass = None;
        self.embarked = None;
        self.age = self.age_bounds;
        self.fare = self.fare_bounds;
        self.family = self.family_bounds;
    }

    /// Lower the widget state into the filter contract. A slider at its full
    /// span is the unconstrained state, so rows with a missing value in that
    /// field stay visible until the user narrows the range.
    pub fn to_spec(&self) -> FilterSpec {
        FilterSpec {
            sex: self.sex.clone(),
            pclass: self.pclass,
            embarked: self.embarked.clone(),
            age: (self.age != self.age_bounds).then_some(self.age),
            fare: (self.fare != self.fare_bounds).then_some(self.fare),
            family_size: (self.family != self.family_bounds).then_some(self.family),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Path + mtime keyed cache for the loaded file.
    pub cache: DatasetCache,
    /// Path of the currently loaded file (None until the user opens one).
    pub source_path: Option<PathBuf>,
    /// Loaded table with derived columns, treated as immutable.
    pub table: Option<PassengerTable>,
    /// Output of the cleaning pass over `table`, if the user ran it.
    pub cleaned: Option<PassengerTable>,
    pub clean_report: Option<CleanReport>,

    pub page: Page,
    pub chart: ChartKind,
    /// Filter widget state (None until a table is loaded).
    pub controls: Option<FilterControls>,
    /// Indices of rows passing the current filters (cached).
    pub visible: Vec<usize>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            cache: DatasetCache::new(),
            source_path: None,
            table: None,
            cleaned: None,
            clean_report: None,
            page: Page::default(),
            chart: ChartKind::SurvivalCounts,
            controls: None,
            visible: Vec::new(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Load (or re-serve from cache) a file, derive its columns and reset
    /// the dependent state. On failure the previous table stays.
    pub fn load_path(&mut self, path: &Path) {
        match self.cache.load(path) {
            Ok(raw) => {
                let table = derive(raw);
                log::info!(
                    "Loaded {} passengers with columns {:?}",
                    table.len(),
                    table.columns
                );
                self.source_path = Some(path.to_path_buf());
                self.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a derived table: seed filters, show everything, drop stale
    /// cleaning output.
    pub fn set_table(&mut self, table: PassengerTable) {
        self.controls = Some(FilterControls::from_table(&table));
        self.visible = (0..table.len()).collect();
        self.cleaned = None;
        self.clean_report = None;
        self.table = Some(table);
        self.status_message = None;
    }

    /// Recompute `visible` after a filter change.
    pub fn refilter(&mut self) {
        if let (Some(table), Some(controls)) = (&self.table, &self.controls) {
            self.visible = matching_indices(table, &controls.to_spec());
        }
    }

    pub fn reset_filters(&mut self) {
        if let Some(controls) = &mut self.controls {
            controls.reset();
        }
        self.refilter();
    }

    /// Run the cleaning pass over the loaded table.
    pub fn run_cleaning(&mut self) {
        if let Some(table) = &self.table {
            let (cleaned, report) = clean(table);
            log::info!(
                "Cleaning filled {} ages and {} embarkation ports",
                report.ages_filled,
                report.embarked_filled
            );
            self.cleaned = Some(cleaned);
            self.clean_report = Some(report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testutil::scenario_table;

    #[test]
    fn controls_seed_bounds_from_the_table() {
        let table = derive(&scenario_table());
        let controls = FilterControls::from_table(&table);
        assert_eq!(controls.age_bounds, (22.0, 38.0));
        assert_eq!(controls.family_bounds, (1, 2));
        assert_eq!(controls.age, controls.age_bounds);
    }

    #[test]
    fn full_span_controls_lower_to_an_unconstrained_spec() {
        let table = derive(&scenario_table());
        let controls = FilterControls::from_table(&table);
        assert!(controls.to_spec().is_unconstrained());
    }

    #[test]
    fn narrowed_slider_becomes_a_range_predicate() {
        let table = derive(&scenario_table());
        let mut controls = FilterControls::from_table(&table);
        controls.age = (25.0, 35.0);
        controls.sex = Some("female".to_string());

        let spec = controls.to_spec();
        assert_eq!(spec.age, Some((25.0, 35.0)));
        assert_eq!(spec.sex.as_deref(), Some("female"));
        assert_eq!(spec.fare, None);

        controls.reset();
        assert!(controls.to_spec().is_unconstrained());
    }

    #[test]
    fn set_table_resets_visibility_and_cleaning_output() {
        let mut state = AppState::default();
        let table = derive(&scenario_table());
        state.set_table(table.clone());

        assert_eq!(state.visible, vec![0, 1, 2, 3, 4]);
        assert!(state.cleaned.is_none());

        state.run_cleaning();
        assert!(state.cleaned.is_some());
        assert_eq!(
            state.clean_report.as_ref().map(|r| r.ages_filled),
            Some(1)
        );

        // Loading a new table drops the stale cleaning output.
        state.set_table(table);
        assert!(state.cleaned.is_none());
        assert!(state.clean_report.is_none());
    }

    #[test]
    fn refilter_tracks_the_controls() {
        let mut state = AppState::default();
        state.set_table(derive(&scenario_table()));

        if let Some(controls) = &mut state.controls {
            controls.sex = Some("male".to_string());
        }
        state.refilter();
        assert_eq!(state.visible, vec![0, 3]);

        state.reset_filters();
        assert_eq!(state.visible, vec![0, 1, 2, 3, 4]);
    }
}
